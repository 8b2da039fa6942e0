use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Unexpected signing algorithm: {0}")]
    UnexpectedAlgorithm(String),

    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Failed to decode token: {0}")]
    DecodingFailed(String),
}
