use crate::crypto::ContentAadKind;
use crate::stream::framing::FrameError;

/// Plaintext handed to a frame worker.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub sequence_number: u32,
    pub is_final: bool,
    pub plaintext: &'a [u8],
}

impl FrameInput<'_> {
    /// AAD content string for this frame.
    pub fn aad_kind(&self) -> ContentAadKind {
        if self.is_final {
            ContentAadKind::FinalFrame
        } else {
            ContentAadKind::Frame
        }
    }

    /// Regular frames must be exactly `frame_length`; final frames at most that.
    pub fn validate(&self, frame_length: u32) -> Result<(), FrameError> {
        let len = self.plaintext.len() as u64;
        let ok = if self.is_final { len <= frame_length as u64 } else { len == frame_length as u64 };
        if !ok {
            return Err(FrameError::ContentTooLong { len, limit: frame_length as u64 });
        }
        Ok(())
    }
}

/// A sealed frame, already encoded.
#[derive(Debug, Clone)]
pub struct EncryptedFrame {
    pub sequence_number: u32,
    pub is_final: bool,
    pub content_len: usize,
    pub wire: Vec<u8>,
}

/// An opened frame.
#[derive(Debug, Clone)]
pub struct DecryptedFrame {
    pub sequence_number: u32,
    pub is_final: bool,
    pub plaintext: Vec<u8>,
}
