// ## 📂 File: `src/headers/types.rs`

//! headers/types.rs
//! Message header struct and parsed-header bundle.
//!
//! Industry notes:
//! - Variable-length header: context and encrypted data keys are length-prefixed,
//!   so there is no fixed size and the decoder must handle partial input.
//! - Every field is bound into the header authentication tag; nothing in the
//!   header is trusted until that tag verifies.
//! - Reserved bytes must be zero; they are checked on decode.

use num_enum::TryFromPrimitive;
use thiserror::Error;

use crate::constants::content_type_ids;
use crate::materials::{EncryptedDataKey, EncryptionContext};
use crate::suites::{AlgorithmSuite, AlgorithmSuiteId};
use crate::utils::{enum_name_or_hex, fmt_bytes};

/// Body layout declared by the header.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum ContentType {
    NonFramed = content_type_ids::NON_FRAMED,
    Framed    = content_type_ids::FRAMED,
}

/// Decoded message header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u8,
    pub object_type: u8,
    pub suite_id: AlgorithmSuiteId,
    pub message_id: [u8; 16],
    pub encryption_context: EncryptionContext,
    pub encrypted_data_keys: Vec<EncryptedDataKey>,
    pub content_type: ContentType,
    pub header_iv_length: u8,
    /// Plaintext bytes per regular frame; 0 for non-framed content.
    pub frame_length: u32,
}

impl MessageHeader {
    #[inline]
    pub fn suite(&self) -> &'static AlgorithmSuite {
        self.suite_id.suite()
    }
}

/// A parsed header together with the bytes it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub header: MessageHeader,
    /// Serialized header exactly as read; the AAD of the header tag.
    pub raw_header: Vec<u8>,
    pub header_iv: Vec<u8>,
    pub header_auth_tag: Vec<u8>,
}

impl HeaderInfo {
    /// Total bytes the header occupies on the wire, IV and tag included.
    #[inline]
    pub fn header_len(&self) -> usize {
        self.raw_header.len() + self.header_iv.len() + self.header_auth_tag.len()
    }

    #[inline]
    pub fn suite(&self) -> &'static AlgorithmSuite {
        self.header.suite()
    }
}

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("unsupported serialization version: 0x{0:02x}")]
    UnsupportedVersion(u8),

    #[error("unsupported object type: 0x{0:02x}")]
    UnsupportedObjectType(u8),

    #[error("unknown algorithm suite: {}", enum_name_or_hex::<AlgorithmSuiteId>(*.0))]
    UnknownSuite(u16),

    #[error("header carries no encrypted data keys")]
    NoEncryptedDataKeys,

    #[error("unknown content type: {}", enum_name_or_hex::<ContentType>(*.0))]
    UnknownContentType(u8),

    #[error("reserved bytes must be zero, got {}", fmt_bytes(.0))]
    ReservedNonZero([u8; 4]),

    #[error("header IV length {have} does not match suite IV length {need}")]
    IvLengthMismatch { have: usize, need: usize },

    #[error("frame length {frame_length} invalid for {content_type:?} content")]
    FrameLengthMismatch { content_type: ContentType, frame_length: u32 },

    #[error("duplicate encryption context key {}", fmt_bytes(.0.as_bytes()))]
    DuplicateContextKey(String),

    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    #[error("encryption context length mismatch: declared={declared}, actual={actual}")]
    ContextLengthMismatch { declared: usize, actual: usize },

    #[error("{field} length {len} does not fit a u16 prefix")]
    FieldTooLong { field: &'static str, len: usize },
}
