//! Generate TOTP shared secrets and the `otpauth://` enrollment URIs that
//! authenticator apps import.

pub mod config;
pub mod error;
pub mod hostname;
pub mod qrcode;
pub mod secret;
pub mod totp;

pub use error::Error;
pub use secret::{generate_secret, generate_secret_with, EntropySource, Secret, SystemEntropy};
pub use totp::{build_uri, EnrollmentUri};
