use data_encoding::{BASE32, BASE32_NOPAD};
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;

use crate::error::Error;

/// 80 bits, the length most authenticator apps expect.
pub const DEFAULT_SECRET_BYTES: i64 = 10;

/// Shorter secrets are still generated; callers may warn about them.
/// RFC 4226 asks for at least 128 bits and recommends 160.
pub const RECOMMENDED_MIN_BYTES: i64 = 10;

/// Far beyond any TOTP key; bounds the allocation.
pub const MAX_SECRET_BYTES: i64 = 1024;

/// A shared TOTP secret: the raw key bytes together with their canonical
/// unpadded Base32 text.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    bytes: Vec<u8>,
    encoded: String,
}

impl Secret {
    fn from_bytes(bytes: Vec<u8>) -> Secret {
        let encoded = BASE32_NOPAD.encode(&bytes);
        Secret { bytes, encoded }
    }

    /// Parse a Base32 secret as typed by a user or found in an enrollment
    /// URI. Lower case, grouping spaces and trailing padding are accepted.
    pub fn from_base32(text: &str) -> Result<Secret, Error> {
        let mut s: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        while s.ends_with('=') {
            s.pop();
        }

        if s.is_empty() {
            return Err(Error::invalid("secret is empty"));
        }
        if let Some(c) = s.chars().find(|c| !is_base32_char(*c)) {
            return Err(Error::invalid(format!(
                "secret contains non-Base32 character {:?}",
                c
            )));
        }

        pad_string_to_base32(&mut s);
        let bytes = BASE32
            .decode(s.as_bytes())
            .map_err(|e| Error::invalid(format!("secret is not valid Base32: {}", e)))?;

        Ok(Secret::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Unpadded upper-case Base32, alphabet `A-Z2-7`.
    pub fn as_base32(&self) -> &str {
        &self.encoded
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("len", &self.bytes.len())
            .field("encoded", &"<redacted>")
            .finish()
    }
}

/// Anything that can fill a buffer with cryptographically secure bytes.
pub trait EntropySource {
    fn fill(&self, dest: &mut [u8]) -> Result<(), Error>;
}

/// The operating system's CSPRNG, via ring. Safe to share between threads.
pub struct SystemEntropy {
    rng: SystemRandom,
}

impl SystemEntropy {
    pub fn new() -> SystemEntropy {
        SystemEntropy {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for SystemEntropy {
    fn default() -> SystemEntropy {
        SystemEntropy::new()
    }
}

impl EntropySource for SystemEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), Error> {
        self.rng.fill(dest).map_err(|_| Error::EntropyUnavailable)
    }
}

/// Generate a fresh secret of `byte_length` bytes from the system CSPRNG.
pub fn generate_secret(byte_length: i64) -> Result<Secret, Error> {
    generate_secret_with(&SystemEntropy::new(), byte_length)
}

/// Generate a secret drawing its bytes from `source`.
pub fn generate_secret_with(source: &dyn EntropySource, byte_length: i64) -> Result<Secret, Error> {
    if byte_length <= 0 || byte_length > MAX_SECRET_BYTES {
        return Err(Error::invalid(format!(
            "secret length must be between 1 and {} bytes, got {}",
            MAX_SECRET_BYTES, byte_length
        )));
    }
    let len = usize::try_from(byte_length)
        .map_err(|_| Error::invalid(format!("secret length {} does not fit", byte_length)))?;

    let mut bytes = vec![0u8; len];
    source.fill(&mut bytes)?;

    Ok(Secret::from_bytes(bytes))
}

fn is_base32_char(c: char) -> bool {
    matches!(c, 'A'..='Z' | '2'..='7')
}

/// Pad the secret to have the length divisible by 8 for it to be
/// decoded as base32.
fn pad_string_to_base32(s: &mut String) {
    let pad_len = (8 - s.len() % 8) % 8;
    for _ in 0..pad_len {
        s.push('=');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FixedEntropy(Vec<u8>);

    impl EntropySource for FixedEntropy {
        fn fill(&self, dest: &mut [u8]) -> Result<(), Error> {
            dest.copy_from_slice(&self.0[..dest.len()]);
            Ok(())
        }
    }

    struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn fill(&self, _dest: &mut [u8]) -> Result<(), Error> {
            Err(Error::EntropyUnavailable)
        }
    }

    #[test]
    fn fixed_bytes_encode_to_rfc4648_text() {
        let source = FixedEntropy((0u8..10).collect());
        let secret = generate_secret_with(&source, 10).unwrap();
        assert_eq!(secret.as_base32(), "AAAQEAYEAUDAOCAJ");
        assert_eq!(secret.as_bytes(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn generated_secret_decodes_to_requested_length() {
        for len in &[1i64, 5, 10, 16, 20, 32] {
            let secret = generate_secret(*len).unwrap();
            assert_eq!(secret.len() as i64, *len);
            assert!(secret.as_base32().chars().all(is_base32_char));
            assert!(!secret.as_base32().contains('='));

            let decoded = BASE32_NOPAD
                .decode(secret.as_base32().as_bytes())
                .unwrap();
            assert_eq!(decoded, secret.as_bytes());
        }
    }

    #[test]
    fn generated_secrets_are_distinct() {
        let seen: HashSet<String> = (0..1000)
            .map(|_| generate_secret(DEFAULT_SECRET_BYTES).unwrap().to_string())
            .collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn non_positive_length_is_rejected() {
        assert!(matches!(generate_secret(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(generate_secret(-1), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn oversized_length_is_rejected() {
        assert!(generate_secret(MAX_SECRET_BYTES).is_ok());
        assert!(matches!(
            generate_secret(MAX_SECRET_BYTES + 1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            generate_secret(i64::MAX),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn entropy_failure_is_reported() {
        let r = generate_secret_with(&BrokenEntropy, 10);
        assert!(matches!(r, Err(Error::EntropyUnavailable)));
    }

    #[test]
    fn parse_accepts_lowercase_spaces_and_padding() {
        let s = Secret::from_base32("jbsw y3dp ehpk 3pxp").unwrap();
        assert_eq!(s.as_base32(), "JBSWY3DPEHPK3PXP");
        assert_eq!(s.as_bytes(), b"Hello!\xde\xad\xbe\xef");

        let padded = Secret::from_base32("GEZDGNA=").unwrap();
        assert_eq!(padded.as_bytes(), b"1234");
        assert_eq!(padded.as_base32(), "GEZDGNA");
    }

    #[test]
    fn parse_rejects_malformed_text() {
        for bad in &["", "   ", "JBSWY3DP1", "JBSW-Y3DP", "A", "ABC"] {
            assert!(
                matches!(Secret::from_base32(bad), Err(Error::InvalidArgument(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let s = Secret::from_base32("JBSWY3DPEHPK3PXP").unwrap();
        assert!(!format!("{:?}", s).contains("JBSW"));
    }

    #[test]
    fn pad_bytes_test() {
        let mut s = String::from("totp");
        pad_string_to_base32(&mut s);
        assert_eq!(String::from("totp===="), s);

        let mut full = String::from("ABCDEFGH");
        pad_string_to_base32(&mut full);
        assert_eq!(full, "ABCDEFGH");
    }
}
