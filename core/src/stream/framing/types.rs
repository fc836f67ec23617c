use thiserror::Error;

use crate::types::ErrorKind;

/// Largest single-block body AES-GCM can protect under one IV (2^36 - 32 bytes).
pub const MAX_NON_FRAMED_SIZE: u64 = (1 << 36) - 32;

/// Sizes a body codec needs; all come from the authenticated header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLayout {
    pub iv_len: usize,
    pub tag_len: usize,
    pub frame_length: u32,
}

impl BodyLayout {
    /// Wire length of a regular frame.
    pub fn regular_frame_len(&self) -> usize {
        4 + self.iv_len + self.frame_length as usize + self.tag_len
    }

    /// Wire length of a final frame carrying `content_len` bytes.
    pub fn final_frame_len(&self, content_len: usize) -> usize {
        4 + 4 + self.iv_len + 4 + content_len + self.tag_len
    }

    /// Wire length of a single-block body carrying `content_len` bytes.
    pub fn non_framed_len(&self, content_len: usize) -> usize {
        self.iv_len + 8 + content_len + self.tag_len
    }
}

/// Owned, sealed frame ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub sequence_number: u32,
    pub is_final: bool,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub auth_tag: Vec<u8>,
}

/// Borrowed view of one frame inside an input buffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub sequence_number: u32,
    pub is_final: bool,
    pub iv: &'a [u8],
    pub ciphertext: &'a [u8],
    pub auth_tag: &'a [u8],
}

/// Borrowed view of a single-block body.
#[derive(Debug, Clone, Copy)]
pub struct NonFramedView<'a> {
    pub iv: &'a [u8],
    pub ciphertext: &'a [u8],
    pub auth_tag: &'a [u8],
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("final frame length {content_len} exceeds frame length {frame_length}")]
    FinalFrameTooLong { content_len: u32, frame_length: u32 },

    #[error("frame content length {len} does not fit the frame (limit {limit})")]
    ContentTooLong { len: u64, limit: u64 },

    #[error("unexpected sequence number: expected {expected}, got {actual}")]
    BadSequence { expected: u32, actual: u32 },

    #[error("sequence number space exhausted")]
    SequenceExhausted,

    #[error("input ended before the final frame")]
    MissingFinalFrame,

    #[error("frame {sequence_number} IV does not match its sequence number")]
    IvMismatch { sequence_number: u32 },

    #[error("{len} bytes after end of message")]
    TrailingData { len: usize },

    #[error("truncated {0}")]
    Truncated(&'static str),

    #[error("signature length {len} does not fit a u16 prefix")]
    SignatureTooLong { len: usize },
}

impl FrameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameError::BadSequence { .. }
            | FrameError::SequenceExhausted
            | FrameError::MissingFinalFrame => ErrorKind::Sequence,
            FrameError::IvMismatch { .. } => ErrorKind::Authentication,
            FrameError::SignatureTooLong { .. } => ErrorKind::InputValidation,
            _ => ErrorKind::Format,
        }
    }
}
