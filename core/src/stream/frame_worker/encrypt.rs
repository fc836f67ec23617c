use tracing::trace;

use crate::constants::FIRST_SEQUENCE_NUMBER;
use crate::crypto::{body_aad, frame_iv, ContentAadKind};
use crate::materials::EncryptHelper;
use crate::stream::framing::{encode_frame, encode_non_framed, Frame};
use crate::types::StreamError;

use super::types::{EncryptedFrame, FrameInput};

/// Seals frames for one message.
#[derive(Debug, Clone)]
pub struct EncryptFrameWorker {
    message_id: [u8; 16],
    frame_length: u32,
}

impl EncryptFrameWorker {
    pub fn new(message_id: [u8; 16], frame_length: u32) -> Self {
        Self { message_id, frame_length }
    }

    pub fn encrypt_frame(&self, helper: &EncryptHelper, input: FrameInput<'_>) -> Result<EncryptedFrame, StreamError> {
        input.validate(self.frame_length)?;
        let suite = helper.suite();

        // 1️⃣ AAD binds message id, frame kind, sequence and length
        let aad = body_aad(
            &self.message_id,
            input.aad_kind(),
            input.sequence_number,
            input.plaintext.len() as u64,
        );

        // 2️⃣ IV from sequence number
        let iv = frame_iv(suite.iv_len, input.sequence_number)?;

        // 3️⃣ Seal
        let (ciphertext, auth_tag) = helper.get_cipher(&iv)?.seal(&aad, input.plaintext)?;

        // 4️⃣ Serialize
        let frame = Frame {
            sequence_number: input.sequence_number,
            is_final: input.is_final,
            iv,
            ciphertext,
            auth_tag,
        };
        let wire = encode_frame(&frame)?;

        trace!(seq = input.sequence_number, is_final = input.is_final, len = input.plaintext.len(), "frame sealed");
        Ok(EncryptedFrame {
            sequence_number: input.sequence_number,
            is_final: input.is_final,
            content_len: input.plaintext.len(),
            wire,
        })
    }

    /// Seal the whole plaintext as one non-framed body.
    pub fn encrypt_single_block(&self, helper: &EncryptHelper, plaintext: &[u8]) -> Result<EncryptedFrame, StreamError> {
        let suite = helper.suite();
        let aad = body_aad(
            &self.message_id,
            ContentAadKind::SingleBlock,
            FIRST_SEQUENCE_NUMBER,
            plaintext.len() as u64,
        );
        let iv = frame_iv(suite.iv_len, FIRST_SEQUENCE_NUMBER)?;
        let (ciphertext, auth_tag) = helper.get_cipher(&iv)?.seal(&aad, plaintext)?;

        trace!(len = plaintext.len(), "single block sealed");
        Ok(EncryptedFrame {
            sequence_number: FIRST_SEQUENCE_NUMBER,
            is_final: true,
            content_len: plaintext.len(),
            wire: encode_non_framed(&iv, &ciphertext, &auth_tag),
        })
    }
}
