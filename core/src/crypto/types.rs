// ## 📂 File: `src/crypto/types.rs`

use thiserror::Error;

use crate::types::ErrorKind;

/// Counter bytes at the tail of every frame IV.
pub const IV_COUNTER_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid key length provided to cipher or KDF.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLen { expected: usize, actual: usize },

    /// IV length does not match the suite.
    #[error("invalid iv length: expected={expected}, actual={actual}")]
    InvalidIvLen { expected: usize, actual: usize },

    /// Tag length does not match the suite.
    #[error("invalid tag length: expected={expected}, actual={actual}")]
    InvalidTagLen { expected: usize, actual: usize },

    /// AEAD tag mismatch (authentication failure).
    #[error("AEAD tag mismatch")]
    TagMismatch,

    /// Trailer signature missing, malformed or not valid for the key.
    #[error("signature verification failed")]
    SignatureMismatch,

    /// Key material was already wiped.
    #[error("key material has been zeroed")]
    KeyZeroed,

    /// General derivation or runtime error with context.
    #[error("crypto failure: {0}")]
    Failure(String),
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::TagMismatch | CryptoError::SignatureMismatch => ErrorKind::Authentication,
            _ => ErrorKind::InputValidation,
        }
    }
}
