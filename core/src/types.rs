use std::fmt;
use std::io;
use thiserror::Error;

use crate::{
    crypto::CryptoError,
    headers::HeaderError,
    materials::MaterialError,
    stream::framing::FrameError,
};

/// Coarse error classes a caller can branch on.
///
/// Every kind is fatal for the message in flight; nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed header, body or trailer structure.
    Format,
    /// Header tag, frame tag, IV or signature did not verify.
    Authentication,
    /// A declared length is above the caller's limit.
    LimitExceeded,
    /// Frames out of order, duplicated or missing.
    Sequence,
    /// Bad caller input or contract violation by a materials provider.
    InputValidation,
    /// Underlying reader or writer failed.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Format => "format",
            ErrorKind::Authentication => "authentication",
            ErrorKind::LimitExceeded => "limit exceeded",
            ErrorKind::Sequence => "sequence",
            ErrorKind::InputValidation => "input validation",
            ErrorKind::Io => "i/o",
        };
        f.write_str(s)
    }
}

/// Unified stream error covering I/O, header, frame, crypto, materials and
/// generic validation.
/// - `From<T>` impls enable `?` across the pipeline.
/// - Messages are stable enough for logs; never include key bytes.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("material error: {0}")]
    Material(#[from] MaterialError),

    /// Declared body or frame size above the configured maximum.
    #[error("declared length {declared} exceeds max body size {max_body_size}")]
    LimitExceeded { declared: u64, max_body_size: u64 },

    /// The pipeline already failed or was disposed; it accepts no more input.
    #[error("pipeline aborted: {0}")]
    Aborted(&'static str),

    #[error("validation error: {0}")]
    Validation(String),
}

impl StreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StreamError::Io(_) => ErrorKind::Io,
            StreamError::Header(_) => ErrorKind::Format,
            StreamError::Frame(e) => e.kind(),
            StreamError::Crypto(e) => e.kind(),
            StreamError::Material(_) => ErrorKind::InputValidation,
            StreamError::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            StreamError::Aborted(_) => ErrorKind::InputValidation,
            StreamError::Validation(_) => ErrorKind::InputValidation,
        }
    }

    #[inline]
    pub fn is_authentication(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }
}
