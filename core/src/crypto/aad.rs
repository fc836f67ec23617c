// ## 📂 File: `src/crypto/aad.rs`

use crate::constants::body_aad;

/// Which body AAD content string a block is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentAadKind {
    Frame,
    FinalFrame,
    SingleBlock,
}

impl ContentAadKind {
    #[inline]
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            ContentAadKind::Frame => body_aad::FRAME,
            ContentAadKind::FinalFrame => body_aad::FINAL_FRAME,
            ContentAadKind::SingleBlock => body_aad::SINGLE_BLOCK,
        }
    }
}

/// Body AAD = `message_id || content string || seq (u32 BE) || content_len (u64 BE)`.
///
/// The final-frame string differs from the regular one, so the final flag is
/// authenticated and a truncated body cannot pass as complete.
#[inline]
pub fn body_aad(message_id: &[u8], kind: ContentAadKind, seq: u32, content_len: u64) -> Vec<u8> {
    let content = kind.as_bytes();
    let mut out = Vec::with_capacity(message_id.len() + content.len() + 4 + 8);
    out.extend_from_slice(message_id);
    out.extend_from_slice(content);
    out.extend_from_slice(&seq.to_be_bytes());
    out.extend_from_slice(&content_len.to_be_bytes());
    out
}
