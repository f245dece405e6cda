use thiserror::Error;

#[derive(Debug, Error)]
pub enum PixError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Field {tag} would need a length prefix of {length}, the limit is 99")]
    EncodingOverflow { tag: String, length: usize },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("QR encoding error: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl PixError {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> PixError {
        PixError::InvalidInput(msg.into())
    }

    pub(crate) fn malformed<S: Into<String>>(msg: S) -> PixError {
        PixError::MalformedPayload(msg.into())
    }
}
