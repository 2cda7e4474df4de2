use std::path::Path;
use url::Url;

use crate::error::Error;
use crate::totp::EnrollmentUri;

pub const DEFAULT_CHART_BASE_URL: &str = "https://chart.googleapis.com/chart";
pub const DEFAULT_CHART_SIZE: u32 = 200;

/// Build the URL of a remote chart service that renders `uri` as a QR code
/// image of `size` x `size` pixels. Nothing is fetched.
pub fn chart_url(base: &str, uri: &EnrollmentUri, size: u32) -> Result<String, Error> {
    if size == 0 {
        return Err(Error::invalid("chart size must be positive"));
    }

    let dimensions = format!("{0}x{0}", size);
    let data = uri.to_string();
    let params = [
        ("chs", dimensions.as_str()),
        ("chld", "M|0"),
        ("cht", "qr"),
        ("chl", data.as_str()),
    ];

    let u = Url::parse_with_params(base, params.iter())
        .map_err(|e| Error::invalid(format!("invalid chart base url {:?}: {}", base, e)))?;
    Ok(u.to_string())
}

/// extract_enrollment_uri reads the enrollment URI out of the QR code in
/// the image at `file_path`. This carries the secret, the label and
/// optionally the issuer.
pub fn extract_enrollment_uri<P: AsRef<Path>>(file_path: P) -> Result<EnrollmentUri, Error> {
    let file_path = file_path.as_ref();
    let img = image::open(file_path).map_err(|e| {
        tracing::warn!(path = %file_path.display(), error = %e, "failed to open image");
        Error::QrDecode(format!("failed to open {}: {}", file_path.display(), e))
    })?;

    let decoder = bardecoder::default_decoder();
    let found = decoder.decode(&img);
    tracing::debug!(path = %file_path.display(), codes = found.len(), "scanned image");

    let text = match found.into_iter().next() {
        Some(Ok(text)) => text,
        Some(Err(e)) => {
            return Err(Error::QrDecode(format!(
                "unreadable QR code in {}: {:?}",
                file_path.display(),
                e
            )))
        }
        None => {
            return Err(Error::QrDecode(format!(
                "no QR code found in {}",
                file_path.display()
            )))
        }
    };

    EnrollmentUri::parse(&text)
}
