//! Error types for Gabby Grove encoding, decoding and verification.

use thiserror::Error;

use crate::refs::BinaryRef;

/// Errors returned by the codec and the encoder.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported payload: {0}")]
    UnsupportedPayload(String),

    #[error("content too large: {size} bytes (max 65535)")]
    ContentTooLarge { size: u64 },

    #[error("invalid reference: {0}")]
    InvalidRef(String),

    #[error("unsupported reference algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("malformed transfer: {0}")]
    MalformedTransfer(String),

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("invalid sequence number: {0}")]
    InvalidSequence(u64),

    #[error("sequence {0} requires a previous message reference")]
    MissingPrevious(u64),

    #[error("invalid signature")]
    SignatureInvalid,

    #[error("content mismatch: {0}")]
    ContentMismatch(String),

    #[error("invalid content: {0}")]
    InvalidContent(String),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Verification errors, naming the check that failed.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("content size mismatch: event declares {declared}, transfer carries {actual}")]
    ContentSizeMismatch { declared: u16, actual: usize },

    #[error("content hash does not match event")]
    ContentHashMismatch,

    #[error("signature verification failed")]
    SignatureFailed,

    #[error("invalid sequence number: expected {expected}, got {got}")]
    InvalidSequence { expected: u64, got: u64 },

    #[error("invalid previous: expected {expected}, got {got:?}")]
    InvalidPrevious {
        expected: BinaryRef,
        got: Option<BinaryRef>,
    },

    #[error("author mismatch: expected {expected}, got {got}")]
    AuthorMismatch { expected: BinaryRef, got: BinaryRef },
}

/// Codec errors met while validating mean the entry could not be read,
/// except for a failed signature.
impl From<Error> for ValidationError {
    fn from(e: Error) -> Self {
        match e {
            Error::SignatureInvalid => ValidationError::SignatureFailed,
            other => ValidationError::MalformedEvent(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_from_codec_error() {
        assert!(matches!(
            ValidationError::from(Error::SignatureInvalid),
            ValidationError::SignatureFailed
        ));

        for e in [
            Error::MalformedEvent("expected array".into()),
            Error::ContentMismatch("hash".into()),
            Error::InvalidContent("not JSON".into()),
            Error::ContentTooLarge { size: 70000 },
        ] {
            let msg = e.to_string();
            match ValidationError::from(e) {
                ValidationError::MalformedEvent(got) => assert_eq!(got, msg),
                other => panic!("unexpected mapping: {other:?}"),
            }
        }
    }
}
