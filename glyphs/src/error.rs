use thiserror::Error;

/// Errors raised while decoding or re-encoding text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid UTF-8 byte sequence at offset {offset}")]
    InvalidEncoding { offset: usize },

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("conversion from '{from}' to '{to}' failed: {message}")]
    ConversionFailed {
        from: String,
        to: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
