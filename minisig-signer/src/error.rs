/// Error type definitions
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignerError {
    /// Caller-supplied digest is missing, not hex, or the wrong length.
    /// The message is safe to return to the caller.
    #[error("{0}")]
    Validation(String),

    /// Trusted comment is not parseable JSON
    #[error("Malformed trusted comment: {0}")]
    Decode(String),

    /// Trusted comment parsed but carries an unknown `typ`/`v` pair
    #[error("Unrecognized trusted comment: {0}")]
    Schema(String),

    #[error("Failed to encode trusted comment: {0}")]
    Encode(String),

    /// Signature text the primitive cannot parse
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    /// Signing primitive failure. Never shown to remote callers.
    #[error("Internal signing error: {0}")]
    Internal(String),

    #[error("Key error: {0}")]
    Key(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SignerError {
    /// Whether the caller can fix the request and try again.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, SignerError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, SignerError>;
