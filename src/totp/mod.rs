use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow::Borrowed;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::Error;
use crate::secret::Secret;

/// Everything except the RFC 3986 unreserved characters is escaped, so the
/// label can never introduce a path separator, query or fragment.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// An `otpauth://totp/` enrollment URI, as imported by authenticator apps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentUri {
    label: String,
    secret: Secret,
    issuer: Option<String>,
}

impl EnrollmentUri {
    /// An empty issuer is treated as no issuer at all.
    pub fn new(label: &str, secret: Secret, issuer: Option<&str>) -> Result<Self, Error> {
        if label.is_empty() {
            return Err(Error::invalid("label must not be empty"));
        }

        Ok(EnrollmentUri {
            label: label.to_string(),
            secret,
            issuer: issuer.filter(|i| !i.is_empty()).map(String::from),
        })
    }

    /// Parse an enrollment URI.
    ///
    /// Sample url
    /// otpauth://totp/otplib-website:otplib-demo-user?
    /// secret=H4ZWJCQZEREL2IE2&period=30&digits=6
    /// &algorithm=SHA1&issuer=otplib-website
    ///
    /// Parameters other than `secret` and `issuer` are ignored.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let u = Url::parse(s).map_err(|e| Error::invalid(format!("invalid url: {}", e)))?;

        if u.scheme() != "otpauth" {
            return Err(Error::invalid(format!(
                "unsupported scheme {:?}, expected \"otpauth\"",
                u.scheme()
            )));
        }
        if u.host_str() != Some("totp") {
            return Err(Error::invalid("only totp enrollment URIs are supported"));
        }

        let label = percent_decode_str(raw_label(s))
            .decode_utf8()
            .map_err(|e| Error::invalid(format!("label is not valid UTF-8: {}", e)))?;

        let mut secret = None;
        let mut issuer = None;
        for qs in u.query_pairs() {
            match qs {
                (Borrowed("secret"), x) => secret = Some(Secret::from_base32(&x)?),
                (Borrowed("issuer"), x) => issuer = Some(x.into_owned()),
                (_, _) => {}
            }
        }

        let secret = secret.ok_or_else(|| Error::invalid("missing secret parameter"))?;
        EnrollmentUri::new(&label, secret, issuer.as_deref())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }
}

impl fmt::Display for EnrollmentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "otpauth://totp/{}?secret={}",
            utf8_percent_encode(&self.label, COMPONENT),
            self.secret.as_base32()
        )?;
        if let Some(issuer) = &self.issuer {
            write!(f, "&issuer={}", utf8_percent_encode(issuer, COMPONENT))?;
        }
        Ok(())
    }
}

impl FromStr for EnrollmentUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnrollmentUri::parse(s)
    }
}

/// The still-encoded label, taken from the input text rather than from
/// `Url::path`, which drops `.` and `..` segments.
fn raw_label(s: &str) -> &str {
    let after_scheme = s.trim().splitn(2, "://").nth(1).unwrap_or("");
    let path = after_scheme.splitn(2, '/').nth(1).unwrap_or("");
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    &path[..end]
}

/// Render the enrollment URI for `label` and `secret`, with an optional
/// issuer.
pub fn build_uri(label: &str, secret: &Secret, issuer: Option<&str>) -> Result<String, Error> {
    let uri = EnrollmentUri::new(label, secret.clone(), issuer)?;
    Ok(uri.to_string())
}
