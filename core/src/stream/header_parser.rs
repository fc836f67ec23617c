//! Header parsing state machine for the decrypt side.
//!
//! ```text
//! Buffering ──parse──▶ Authenticating ──authenticate──▶ Passthrough
//! ```
//!
//! - `Buffering`: chunks accumulate until the header codec returns a full header.
//!   Framed headers whose frame length is above the body limit are rejected here,
//!   before any key material is requested.
//! - `Authenticating`: the caller owns the (async) unwrap call. Bytes pushed in
//!   the meantime are kept.
//! - `Passthrough`: terminal. Input is handed back unchanged.
//!
//! The parser never performs IO and never awaits; the decryptor drives it.

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, warn};

use crate::crypto::kdf_info;
use crate::headers::{deserialize_message_header, ContentType, HeaderInfo};
use crate::materials::{DecryptHelper, DecryptionMaterial, DecryptionRequest};
use crate::types::StreamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Buffering,
    Authenticating,
    Passthrough,
}

/// Result of one `push`.
#[derive(Debug)]
pub enum ParseProgress {
    /// Header still incomplete.
    NeedMore,
    /// Header parsed; resolve this request and call `authenticate`.
    HeaderParsed(DecryptionRequest),
    /// Still waiting on `authenticate`; the chunk was buffered.
    Pending,
    /// Header already authenticated; the chunk passes through untouched.
    Passthrough(Bytes),
}

/// Authenticated header plus the key helper downstream stages decrypt with.
pub struct VerifyInfo {
    pub header_info: HeaderInfo,
    pub helper: DecryptHelper,
}

pub struct HeaderParser {
    state: ParserState,
    buffer: BytesMut,
    max_body_size: Option<u64>,
    header_info: Option<HeaderInfo>,
}

impl HeaderParser {
    pub fn new(max_body_size: Option<u64>) -> Self {
        Self {
            state: ParserState::Buffering,
            buffer: BytesMut::new(),
            max_body_size,
            header_info: None,
        }
    }

    #[inline]
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Bytes held but not yet handed on.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// The parsed (not yet authenticated, while `Authenticating`) header.
    pub fn header_info(&self) -> Option<&HeaderInfo> {
        self.header_info.as_ref()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<ParseProgress, StreamError> {
        match self.state {
            ParserState::Passthrough => Ok(ParseProgress::Passthrough(Bytes::copy_from_slice(chunk))),
            ParserState::Authenticating => {
                self.buffer.extend_from_slice(chunk);
                Ok(ParseProgress::Pending)
            }
            ParserState::Buffering => {
                self.buffer.extend_from_slice(chunk);
                let Some(info) = deserialize_message_header(&self.buffer)? else {
                    return Ok(ParseProgress::NeedMore);
                };

                let header = &info.header;
                if header.content_type == ContentType::Framed {
                    if let Some(max) = self.max_body_size {
                        if header.frame_length as u64 > max {
                            warn!(frame_length = header.frame_length, max_body_size = max, "frame length over limit");
                            return Err(StreamError::LimitExceeded {
                                declared: header.frame_length as u64,
                                max_body_size: max,
                            });
                        }
                    }
                }

                let request = DecryptionRequest {
                    suite_id: header.suite_id,
                    context: header.encryption_context.clone(),
                    encrypted_data_keys: header.encrypted_data_keys.clone(),
                };
                debug!(
                    suite = %header.suite_id,
                    header_len = info.header_len(),
                    frame_length = header.frame_length,
                    "header parsed"
                );
                self.header_info = Some(info);
                self.state = ParserState::Authenticating;
                Ok(ParseProgress::HeaderParsed(request))
            }
        }
    }

    /// Check the header tag with key material for this message.
    ///
    /// On success returns the verify info and every byte buffered past the
    /// header. On failure the helper is disposed before the error is returned.
    pub fn authenticate(&mut self, material: DecryptionMaterial) -> Result<(VerifyInfo, Bytes), StreamError> {
        if self.state != ParserState::Authenticating {
            return Err(StreamError::Validation(format!("authenticate called in state {:?}", self.state)));
        }
        let info = self
            .header_info
            .take()
            .ok_or_else(|| StreamError::Validation("no parsed header".into()))?;
        let header = &info.header;

        if material.suite().id != header.suite_id {
            return Err(StreamError::Validation(format!(
                "material suite {} does not match header suite {}",
                material.suite().id,
                header.suite_id
            )));
        }

        let mut helper = DecryptHelper::new(material, &kdf_info(header.suite_id, &header.message_id))?;
        let opened = helper
            .get_decipher(&info.header_iv)
            .and_then(|d| d.open(&info.raw_header, &[], &info.header_auth_tag));
        if let Err(e) = opened {
            helper.dispose();
            warn!(suite = %header.suite_id, "header authentication failed");
            return Err(e.into());
        }

        self.buffer.advance(info.header_len());
        let tail = self.buffer.split().freeze();
        self.state = ParserState::Passthrough;
        debug!(tail = tail.len(), "header authenticated");

        Ok((VerifyInfo { header_info: info, helper }, tail))
    }
}
