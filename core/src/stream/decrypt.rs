//! Incremental decrypt pipeline.
//!
//! `Decryptor` chains the header parser, the frame codec and the signature
//! stage. Callers push ciphertext in chunks of any size and get back typed
//! events: the authenticated header and material notice come first, followed by
//! plaintext released one authenticated frame at a time.
//!
//! Any error poisons the instance: material is disposed and every later call
//! returns `StreamError::Aborted`.

use std::time::Instant;

use bytes::{Buf, Bytes, BytesMut};
use tracing::debug;

use crate::constants::FIRST_SEQUENCE_NUMBER;
use crate::headers::{ContentType, MessageHeader};
use crate::materials::{KeyringTrace, MaterialsManager};
use crate::stream::core::DecryptParams;
use crate::stream::frame_worker::{DecryptFrameWorker, DecryptedFrame};
use crate::stream::framing::{decode_frame, decode_non_framed, decode_trailer, peek_non_framed_len, BodyLayout, FrameError};
use crate::stream::header_parser::{HeaderParser, ParseProgress, VerifyInfo};
use crate::stream::signature::SignatureStage;
use crate::suites::AlgorithmSuiteId;
use crate::telemetry::{Stage, StageTimes, TelemetryCounters};
use crate::types::StreamError;

/// Out-of-band notifications and output of the decrypt pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptEvent {
    /// Header parsed and authenticated.
    MessageHeader(MessageHeader),
    /// Decryption material resolved for the header.
    MaterialReady {
        suite_id: AlgorithmSuiteId,
        signed: bool,
        keyring_trace: Vec<KeyringTrace>,
    },
    /// Plaintext of one authenticated frame (or of the single block).
    Plaintext(Bytes),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyPhase {
    Frames,
    Trailer,
    Done,
}

/// Body side of the pipeline, alive once the header is authenticated.
struct BodyDecryptor {
    verify: VerifyInfo,
    worker: DecryptFrameWorker,
    signature: Option<SignatureStage>,
    layout: BodyLayout,
    buffer: BytesMut,
    expected_seq: u32,
    phase: BodyPhase,
    max_body_size: Option<u64>,
    counters: TelemetryCounters,
    stage_times: StageTimes,
}

impl BodyDecryptor {
    fn new(verify: VerifyInfo, max_body_size: Option<u64>) -> Self {
        let header = &verify.header_info.header;
        let suite = header.suite();
        let layout = BodyLayout { iv_len: suite.iv_len, tag_len: suite.tag_len, frame_length: header.frame_length };

        let mut signature = SignatureStage::for_decrypt(&verify.helper);
        signature.update(&verify.header_info.raw_header);
        signature.update(&verify.header_info.header_iv);
        signature.update(&verify.header_info.header_auth_tag);

        let mut counters = TelemetryCounters::default();
        counters.add_header(verify.header_info.header_len());

        Self {
            worker: DecryptFrameWorker::new(header.message_id),
            signature: Some(signature),
            layout,
            buffer: BytesMut::new(),
            expected_seq: FIRST_SEQUENCE_NUMBER,
            phase: BodyPhase::Frames,
            max_body_size,
            counters,
            stage_times: StageTimes::default(),
            verify,
        }
    }

    fn is_signed(&self) -> bool {
        self.signature.as_ref().is_some_and(SignatureStage::is_signed)
    }

    fn push(&mut self, data: &[u8]) -> Result<Vec<Bytes>, StreamError> {
        self.buffer.extend_from_slice(data);
        let mut out = Vec::new();

        loop {
            match self.phase {
                BodyPhase::Frames => {
                    let step = match self.verify.header_info.header.content_type {
                        ContentType::Framed => self.next_frame()?,
                        ContentType::NonFramed => self.single_block()?,
                    };
                    let Some(frame) = step else { break };
                    if frame.is_final {
                        self.phase = if self.is_signed() { BodyPhase::Trailer } else { BodyPhase::Done };
                    }
                    out.push(Bytes::from(frame.plaintext));
                }
                BodyPhase::Trailer => {
                    let Some((signature, consumed)) = decode_trailer(&self.buffer) else { break };
                    let start = Instant::now();
                    let stage = self.signature.take().unwrap_or(SignatureStage::Passthrough);
                    stage.finish_verify(signature)?;
                    self.stage_times.add(Stage::Verify, start.elapsed());
                    self.counters.add_trailer(consumed);
                    self.buffer.advance(consumed);
                    self.phase = BodyPhase::Done;
                }
                BodyPhase::Done => {
                    if !self.buffer.is_empty() {
                        return Err(FrameError::TrailingData { len: self.buffer.len() }.into());
                    }
                    break;
                }
            }
        }
        Ok(out)
    }

    fn next_frame(&mut self) -> Result<Option<DecryptedFrame>, StreamError> {
        let Some((view, consumed)) = decode_frame(&self.buffer, &self.layout)? else {
            return Ok(None);
        };

        let start = Instant::now();
        let frame = self.worker.decrypt_frame(&self.verify.helper, &view, self.expected_seq)?;
        self.stage_times.add(Stage::Decrypt, start.elapsed());

        self.absorb(consumed, frame.is_final, frame.plaintext.len());
        if !frame.is_final {
            self.expected_seq = self.expected_seq.checked_add(1).ok_or(FrameError::SequenceExhausted)?;
        }
        Ok(Some(frame))
    }

    fn single_block(&mut self) -> Result<Option<DecryptedFrame>, StreamError> {
        let Some(content_len) = peek_non_framed_len(&self.buffer, &self.layout)? else {
            return Ok(None);
        };
        if let Some(max) = self.max_body_size {
            if content_len > max {
                return Err(StreamError::LimitExceeded { declared: content_len, max_body_size: max });
            }
        }
        let Some((view, consumed)) = decode_non_framed(&self.buffer, &self.layout)? else {
            return Ok(None);
        };

        let start = Instant::now();
        let frame = self.worker.decrypt_single_block(&self.verify.helper, &view)?;
        self.stage_times.add(Stage::Decrypt, start.elapsed());

        self.absorb(consumed, true, frame.plaintext.len());
        Ok(Some(frame))
    }

    /// Feed `consumed` wire bytes to the signature stage and drop them.
    fn absorb(&mut self, consumed: usize, is_final: bool, content_len: usize) {
        let start = Instant::now();
        if let Some(stage) = self.signature.as_mut() {
            stage.update(&self.buffer[..consumed]);
        }
        if self.is_signed() {
            self.stage_times.add(Stage::Verify, start.elapsed());
        }
        self.counters.add_frame(is_final, content_len, consumed);
        self.buffer.advance(consumed);
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        match self.phase {
            BodyPhase::Done => Ok(()),
            BodyPhase::Trailer => Err(FrameError::Truncated("signature trailer").into()),
            BodyPhase::Frames => match self.verify.header_info.header.content_type {
                ContentType::Framed => Err(FrameError::MissingFinalFrame.into()),
                ContentType::NonFramed => Err(FrameError::Truncated("message body").into()),
            },
        }
    }
}

/// Start a decryptor over `manager`.
pub fn decryptor<M>(manager: &M, params: DecryptParams) -> Result<Decryptor<'_, M>, StreamError>
where
    M: MaterialsManager + ?Sized,
{
    Decryptor::new(manager, params)
}

pub struct Decryptor<'m, M: ?Sized> {
    manager: &'m M,
    parser: HeaderParser,
    body: Option<BodyDecryptor>,
    max_body_size: Option<u64>,
    materials_time: StageTimes,
    failed: bool,
    finished: bool,
}

impl<'m, M> Decryptor<'m, M>
where
    M: MaterialsManager + ?Sized,
{
    pub fn new(manager: &'m M, params: DecryptParams) -> Result<Self, StreamError> {
        params.validate()?;
        let max_body_size = params.max_body_size.map(|m| m as u64);
        Ok(Self {
            manager,
            parser: HeaderParser::new(max_body_size),
            body: None,
            max_body_size,
            materials_time: StageTimes::default(),
            failed: false,
            finished: false,
        })
    }

    /// Authenticated header, once available.
    pub fn header(&self) -> Option<&MessageHeader> {
        self.body.as_ref().map(|b| &b.verify.header_info.header)
    }

    /// `true` once the key material is wiped (after failure or `finish`).
    /// Also `true` before any material was obtained.
    pub fn is_disposed(&self) -> bool {
        self.body.as_ref().map_or(true, |b| b.verify.helper.is_disposed())
    }

    pub fn counters(&self) -> TelemetryCounters {
        self.body.as_ref().map(|b| b.counters.clone()).unwrap_or_default()
    }

    pub fn stage_times(&self) -> StageTimes {
        let mut times = self.materials_time.clone();
        if let Some(body) = &self.body {
            times.merge(&body.stage_times);
        }
        times
    }

    /// Push ciphertext. Returns events in wire order.
    pub async fn update(&mut self, chunk: &[u8]) -> Result<Vec<DecryptEvent>, StreamError> {
        if self.failed {
            return Err(StreamError::Aborted("decryptor failed"));
        }
        if self.finished {
            return Err(StreamError::Aborted("decryptor finished"));
        }
        let out = self.update_inner(chunk).await;
        if out.is_err() {
            self.fail();
        }
        out
    }

    /// Declare end of input. Fails unless the message was complete.
    pub fn finish(&mut self) -> Result<(), StreamError> {
        if self.failed {
            return Err(StreamError::Aborted("decryptor failed"));
        }
        if self.finished {
            return Ok(());
        }
        let out = match self.body.as_mut() {
            Some(body) => body.finish(),
            None => Err(FrameError::Truncated("message header").into()),
        };
        match &out {
            Ok(()) => {
                self.finished = true;
                self.dispose();
                debug!(frames = self.counters().frames_total(), "decryption finished");
            }
            Err(_) => self.fail(),
        }
        out
    }

    /// Wipe key material now. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(body) = self.body.as_mut() {
            body.verify.helper.dispose();
        }
    }

    fn fail(&mut self) {
        self.failed = true;
        self.dispose();
    }

    async fn update_inner(&mut self, chunk: &[u8]) -> Result<Vec<DecryptEvent>, StreamError> {
        let mut events = Vec::new();
        match self.parser.push(chunk)? {
            ParseProgress::NeedMore => {}
            // Only reachable when an earlier `update` was dropped mid-unwrap.
            ParseProgress::Pending => return Err(StreamError::Aborted("materials request was cancelled")),
            ParseProgress::HeaderParsed(request) => {
                let start = Instant::now();
                let material = self.manager.decrypt_materials(request).await?;
                self.materials_time.add(Stage::Materials, start.elapsed());
                let keyring_trace = material.keyring_trace().to_vec();

                let start = Instant::now();
                let (verify, tail) = self.parser.authenticate(material)?;
                self.materials_time.add(Stage::Header, start.elapsed());

                let header = verify.header_info.header.clone();
                let suite_id = header.suite_id;
                let signed = verify.helper.material().verification_key().is_some();
                events.push(DecryptEvent::MessageHeader(header));
                events.push(DecryptEvent::MaterialReady { suite_id, signed, keyring_trace });

                // Installed before pushing the tail so a body error still disposes.
                let body = self.body.insert(BodyDecryptor::new(verify, self.max_body_size));
                events.extend(body.push(&tail)?.into_iter().map(DecryptEvent::Plaintext));
            }
            ParseProgress::Passthrough(bytes) => {
                let body = self
                    .body
                    .as_mut()
                    .ok_or_else(|| StreamError::Validation("body stage missing after header".into()))?;
                events.extend(body.push(&bytes)?.into_iter().map(DecryptEvent::Plaintext));
            }
        }
        Ok(events)
    }
}
