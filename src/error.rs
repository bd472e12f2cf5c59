use thiserror::Error;

#[derive(Debug, Error)]
pub enum FernetError {
    #[error("zero key")]
    ZeroKey,

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("malformed key encoding: {0}")]
    KeyEncoding(#[from] base64::DecodeError),

    #[error("random source failed: {0}")]
    RandomSource(String),

    /// Deliberately carries no reason: every verification failure looks the same.
    #[error("invalid token")]
    InvalidToken,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
