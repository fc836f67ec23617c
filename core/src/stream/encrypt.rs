//! Incremental encrypt pipeline.
//!
//! Flow: materials → message key → header (+ header tag) → frames → trailer.
//!
//! Output order on the wire is `header_bytes()`, then everything returned by
//! `update`, then what `finish` returns. The signature stage sees the same
//! bytes in the same order.

use std::time::Instant;

use bytes::BytesMut;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;

use crate::constants::{
    FINAL_FRAME_MARKER, FIRST_SEQUENCE_NUMBER, MESSAGE_ID_LEN, OBJECT_TYPE_CUSTOMER_AE_DATA, SERIALIZATION_VERSION_V1,
};
use crate::crypto::{header_auth_iv, kdf_info};
use crate::headers::{serialize_message_header, ContentType, MessageHeader};
use crate::materials::{EncryptHelper, EncryptionRequest, MaterialsManager};
use crate::stream::core::EncryptParams;
use crate::stream::frame_worker::{EncryptFrameWorker, EncryptedFrame, FrameInput};
use crate::stream::framing::{FrameError, MAX_NON_FRAMED_SIZE};
use crate::stream::signature::SignatureStage;
use crate::telemetry::{Stage, StageTimes, TelemetryCounters};
use crate::types::StreamError;

/// Resolve material and build an `Encryptor`.
pub async fn encryptor<M>(manager: &M, params: EncryptParams) -> Result<Encryptor, StreamError>
where
    M: MaterialsManager + ?Sized,
{
    Encryptor::new(manager, params).await
}

pub struct Encryptor {
    helper: EncryptHelper,
    header: MessageHeader,
    header_bytes: Vec<u8>,
    worker: EncryptFrameWorker,
    signature: Option<SignatureStage>,
    buffer: BytesMut,
    next_seq: u32,
    declared_len: Option<u64>,
    bytes_in: u64,
    counters: TelemetryCounters,
    stage_times: StageTimes,
    failed: bool,
    finished: bool,
}

impl Encryptor {
    pub async fn new<M>(manager: &M, params: EncryptParams) -> Result<Self, StreamError>
    where
        M: MaterialsManager + ?Sized,
    {
        params.validate()?;
        let mut stage_times = StageTimes::default();

        let start = Instant::now();
        let request = EncryptionRequest {
            suite_id: params.suite_id,
            context: params.context,
            frame_length: params.frame_length,
            plaintext_length: params.plaintext_length,
        };
        let material = manager.get_encryption_materials(request).await?;
        stage_times.add(Stage::Materials, start.elapsed());

        let start = Instant::now();
        let suite = material.suite();
        let mut message_id = [0u8; MESSAGE_ID_LEN];
        OsRng.fill_bytes(&mut message_id);

        let frame_length = match params.content_type {
            ContentType::Framed => params.frame_length,
            ContentType::NonFramed => 0,
        };
        let header = MessageHeader {
            version: SERIALIZATION_VERSION_V1,
            object_type: OBJECT_TYPE_CUSTOMER_AE_DATA,
            suite_id: suite.id,
            message_id,
            encryption_context: material.context().clone(),
            encrypted_data_keys: material.encrypted_data_keys().to_vec(),
            content_type: params.content_type,
            header_iv_length: suite.iv_len as u8,
            frame_length,
        };

        // Helper owns the material from here on; dropping it on `?` zeroes the key.
        let helper = EncryptHelper::new(material, &kdf_info(suite.id, &message_id))?;

        let raw_header = serialize_message_header(&header)?;
        let header_iv = header_auth_iv(suite.iv_len);
        let (_, header_tag) = helper.get_cipher(&header_iv)?.seal(&raw_header, &[])?;

        let mut header_bytes = raw_header;
        header_bytes.extend_from_slice(&header_iv);
        header_bytes.extend_from_slice(&header_tag);

        let mut signature = SignatureStage::for_encrypt(&helper);
        signature.update(&header_bytes);
        stage_times.add(Stage::Header, start.elapsed());

        let mut counters = TelemetryCounters::default();
        counters.add_header(header_bytes.len());

        debug!(
            suite = %suite.id,
            content_type = ?header.content_type,
            frame_length = header.frame_length,
            header_len = header_bytes.len(),
            signed = signature.is_signed(),
            "encryptor ready"
        );

        Ok(Self {
            worker: EncryptFrameWorker::new(message_id, frame_length),
            helper,
            header,
            header_bytes,
            signature: Some(signature),
            buffer: BytesMut::new(),
            next_seq: FIRST_SEQUENCE_NUMBER,
            declared_len: params.plaintext_length,
            bytes_in: 0,
            counters,
            stage_times,
            failed: false,
            finished: false,
        })
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// Serialized header, header IV and header tag. Written before any body bytes.
    pub fn header_bytes(&self) -> &[u8] {
        &self.header_bytes
    }

    pub fn counters(&self) -> &TelemetryCounters {
        &self.counters
    }

    pub fn stage_times(&self) -> &StageTimes {
        &self.stage_times
    }

    pub fn is_disposed(&self) -> bool {
        self.helper.is_disposed()
    }

    /// Feed plaintext; returns every frame that filled up.
    pub fn update(&mut self, chunk: &[u8]) -> Result<Vec<u8>, StreamError> {
        self.check_open()?;
        let out = self.update_inner(chunk);
        if out.is_err() {
            self.fail();
        }
        out
    }

    /// Seal the final frame (or the single block) and append the trailer.
    ///
    /// Key material is wiped whether or not this succeeds.
    pub fn finish(&mut self) -> Result<Vec<u8>, StreamError> {
        self.check_open()?;
        let out = self.finish_inner();
        match &out {
            Ok(_) => {
                self.finished = true;
                self.helper.dispose();
            }
            Err(_) => self.fail(),
        }
        out
    }

    fn check_open(&self) -> Result<(), StreamError> {
        if self.failed {
            return Err(StreamError::Aborted("encryptor failed"));
        }
        if self.finished {
            return Err(StreamError::Aborted("encryptor finished"));
        }
        Ok(())
    }

    fn fail(&mut self) {
        self.failed = true;
        self.helper.dispose();
    }

    fn update_inner(&mut self, chunk: &[u8]) -> Result<Vec<u8>, StreamError> {
        self.bytes_in += chunk.len() as u64;
        if let Some(declared) = self.declared_len {
            if self.bytes_in > declared {
                return Err(StreamError::Validation(format!(
                    "plaintext longer than declared length {declared}"
                )));
            }
        }
        self.buffer.extend_from_slice(chunk);

        let mut out = Vec::new();
        if self.header.content_type == ContentType::NonFramed {
            if self.buffer.len() as u64 > MAX_NON_FRAMED_SIZE {
                return Err(FrameError::ContentTooLong { len: self.buffer.len() as u64, limit: MAX_NON_FRAMED_SIZE }.into());
            }
            return Ok(out);
        }

        let frame_length = self.header.frame_length as usize;
        while self.buffer.len() >= frame_length {
            let plaintext = self.buffer.split_to(frame_length);
            let seq = self.next_seq;
            let frame = self.seal(FrameInput { sequence_number: seq, is_final: false, plaintext: &plaintext })?;
            self.next_seq = seq
                .checked_add(1)
                .filter(|n| *n < FINAL_FRAME_MARKER)
                .ok_or(FrameError::SequenceExhausted)?;
            out.extend_from_slice(&frame.wire);
        }
        Ok(out)
    }

    fn finish_inner(&mut self) -> Result<Vec<u8>, StreamError> {
        if let Some(declared) = self.declared_len {
            if self.bytes_in != declared {
                return Err(StreamError::Validation(format!(
                    "plaintext length {} does not match declared length {declared}",
                    self.bytes_in
                )));
            }
        }

        let plaintext = self.buffer.split();
        let frame = match self.header.content_type {
            ContentType::Framed => {
                self.seal(FrameInput { sequence_number: self.next_seq, is_final: true, plaintext: &plaintext })?
            }
            ContentType::NonFramed => {
                let start = Instant::now();
                let frame = self.worker.encrypt_single_block(&self.helper, &plaintext)?;
                self.stage_times.add(Stage::Encrypt, start.elapsed());
                self.account(&frame);
                frame
            }
        };
        let mut out = frame.wire;

        let start = Instant::now();
        let stage = self.signature.take().unwrap_or(SignatureStage::Passthrough);
        if let Some(trailer) = stage.finish_sign()? {
            self.counters.add_trailer(trailer.len());
            out.extend_from_slice(&trailer);
            self.stage_times.add(Stage::Sign, start.elapsed());
        }

        debug!(
            frames = self.counters.frames_total(),
            plaintext = self.counters.bytes_plaintext,
            ciphertext = self.counters.wire_bytes(),
            "encryption finished"
        );
        Ok(out)
    }

    fn seal(&mut self, input: FrameInput<'_>) -> Result<EncryptedFrame, StreamError> {
        let start = Instant::now();
        let frame = self.worker.encrypt_frame(&self.helper, input)?;
        self.stage_times.add(Stage::Encrypt, start.elapsed());
        self.account(&frame);
        Ok(frame)
    }

    fn account(&mut self, frame: &EncryptedFrame) {
        let start = Instant::now();
        if let Some(stage) = self.signature.as_mut() {
            stage.update(&frame.wire);
        }
        if self.signature.as_ref().is_some_and(SignatureStage::is_signed) {
            self.stage_times.add(Stage::Sign, start.elapsed());
        }
        self.counters.add_frame(frame.is_final, frame.content_len, frame.wire.len());
    }
}
