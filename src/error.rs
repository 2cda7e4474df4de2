#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("secure random source unavailable")]
    EntropyUnavailable,

    #[error("failed to decode QR code: {0}")]
    QrDecode(String),

    #[error("failed to determine hostname: {0}")]
    Hostname(String),
}

impl Error {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
