use tracing::{trace, warn};

use crate::constants::FIRST_SEQUENCE_NUMBER;
use crate::crypto::{body_aad, frame_iv, ContentAadKind};
use crate::materials::DecryptHelper;
use crate::stream::framing::{FrameError, FrameView, NonFramedView};
use crate::types::StreamError;

use super::types::DecryptedFrame;

/// Opens frames for one message.
#[derive(Debug, Clone)]
pub struct DecryptFrameWorker {
    message_id: [u8; 16],
}

impl DecryptFrameWorker {
    pub fn new(message_id: [u8; 16]) -> Self {
        Self { message_id }
    }

    /// Open `frame`, which must carry `expected_seq`.
    ///
    /// The sequence check runs before any AEAD work, so reordered, duplicated
    /// or dropped frames surface as sequence errors rather than tag failures.
    pub fn decrypt_frame(
        &self,
        helper: &DecryptHelper,
        frame: &FrameView<'_>,
        expected_seq: u32,
    ) -> Result<DecryptedFrame, StreamError> {
        if frame.sequence_number != expected_seq {
            warn!(expected = expected_seq, actual = frame.sequence_number, "out of order frame");
            return Err(FrameError::BadSequence { expected: expected_seq, actual: frame.sequence_number }.into());
        }

        let suite = helper.suite();
        let iv = frame_iv(suite.iv_len, frame.sequence_number)?;
        if frame.iv != iv.as_slice() {
            warn!(seq = frame.sequence_number, "frame IV mismatch");
            return Err(FrameError::IvMismatch { sequence_number: frame.sequence_number }.into());
        }

        let kind = if frame.is_final { ContentAadKind::FinalFrame } else { ContentAadKind::Frame };
        let aad = body_aad(&self.message_id, kind, frame.sequence_number, frame.ciphertext.len() as u64);

        let plaintext = helper
            .get_decipher(frame.iv)?
            .open(&aad, frame.ciphertext, frame.auth_tag)
            .inspect_err(|_| warn!(seq = frame.sequence_number, "frame authentication failed"))?;

        trace!(seq = frame.sequence_number, is_final = frame.is_final, len = plaintext.len(), "frame opened");
        Ok(DecryptedFrame { sequence_number: frame.sequence_number, is_final: frame.is_final, plaintext })
    }

    /// Open a non-framed body.
    pub fn decrypt_single_block(
        &self,
        helper: &DecryptHelper,
        block: &NonFramedView<'_>,
    ) -> Result<DecryptedFrame, StreamError> {
        let aad = body_aad(
            &self.message_id,
            ContentAadKind::SingleBlock,
            FIRST_SEQUENCE_NUMBER,
            block.ciphertext.len() as u64,
        );
        let plaintext = helper
            .get_decipher(block.iv)?
            .open(&aad, block.ciphertext, block.auth_tag)
            .inspect_err(|_| warn!("single block authentication failed"))?;

        trace!(len = plaintext.len(), "single block opened");
        Ok(DecryptedFrame { sequence_number: FIRST_SEQUENCE_NUMBER, is_final: true, plaintext })
    }
}
