// ## 📂 File: `src/headers/decode.rs`
//! src/headers/decode.rs
//!
//! Header decoding utilities.
//!
//! Design notes:
//! - Incremental: `Ok(None)` means the buffer does not yet hold header + IV + tag;
//!   the caller appends more bytes and retries from the start.
//! - Fail fast: version, object type and suite are checked as soon as they are
//!   readable, so garbage input is rejected without waiting for more bytes.
//! - Field order must match `encode.rs` exactly.

use std::collections::BTreeMap;

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;

use crate::constants::{MESSAGE_ID_LEN, OBJECT_TYPE_CUSTOMER_AE_DATA, SERIALIZATION_VERSION_V1};
use crate::headers::types::{ContentType, HeaderError, HeaderInfo, MessageHeader};
use crate::materials::{EncryptedDataKey, EncryptionContext};
use crate::suites::AlgorithmSuiteId;

/// Bail out with `Ok(None)` when the buffer runs dry.
macro_rules! need {
    ($e:expr) => {
        match $e {
            Some(v) => v,
            None => return Ok(None),
        }
    };
}

/// Forward-only cursor over a byte slice.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Some(out)
    }

    fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn u16(&mut self) -> Option<u16> {
        self.take(2).map(BigEndian::read_u16)
    }

    fn u32(&mut self) -> Option<u32> {
        self.take(4).map(BigEndian::read_u32)
    }

    fn prefixed(&mut self) -> Option<&'a [u8]> {
        let len = self.u16()? as usize;
        self.take(len)
    }
}

fn utf8(field: &'static str, bytes: &[u8]) -> Result<String, HeaderError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| HeaderError::InvalidUtf8(field))
}

/// Parse a complete encryption context section (the `aad_len` bytes).
///
/// The section must hold exactly the declared pairs: running short or leaving
/// bytes over is a length mismatch. Key order is not enforced; duplicates are.
pub fn deserialize_encryption_context(section: &[u8]) -> Result<EncryptionContext, HeaderError> {
    if section.is_empty() {
        return Ok(EncryptionContext::new());
    }
    let mismatch = |actual: usize| HeaderError::ContextLengthMismatch { declared: section.len(), actual };

    let mut cur = Cursor::new(section);
    let count = cur.u16().ok_or_else(|| mismatch(section.len()))?;

    let mut map = BTreeMap::new();
    for _ in 0..count {
        let key = cur.prefixed().ok_or_else(|| mismatch(section.len()))?;
        let value = cur.prefixed().ok_or_else(|| mismatch(section.len()))?;
        let key = utf8("encryption context key", key)?;
        let value = utf8("encryption context value", value)?;
        if map.contains_key(&key) {
            return Err(HeaderError::DuplicateContextKey(key));
        }
        map.insert(key, value);
    }
    if cur.remaining() != 0 {
        return Err(mismatch(cur.pos));
    }
    Ok(EncryptionContext::from(map))
}

/// Parse a message header from the front of `buf`.
///
/// # Returns
/// - `Ok(Some(info))` once header, header IV and header tag are all present;
///   `info.header_len()` bytes were consumed.
/// - `Ok(None)` if more bytes are needed.
/// - `Err(HeaderError)` if the bytes can never form a valid header.
pub fn deserialize_message_header(buf: &[u8]) -> Result<Option<HeaderInfo>, HeaderError> {
    let mut cur = Cursor::new(buf);

    let version = need!(cur.u8());
    if version != SERIALIZATION_VERSION_V1 {
        return Err(HeaderError::UnsupportedVersion(version));
    }
    let object_type = need!(cur.u8());
    if object_type != OBJECT_TYPE_CUSTOMER_AE_DATA {
        return Err(HeaderError::UnsupportedObjectType(object_type));
    }
    let raw_suite = need!(cur.u16());
    let suite_id = AlgorithmSuiteId::try_from(raw_suite).map_err(|_| HeaderError::UnknownSuite(raw_suite))?;
    let suite = suite_id.suite();

    let mut message_id = [0u8; MESSAGE_ID_LEN];
    message_id.copy_from_slice(need!(cur.take(MESSAGE_ID_LEN)));

    let context_section = need!(cur.prefixed());
    let encryption_context = deserialize_encryption_context(context_section)?;

    let edk_count = need!(cur.u16());
    if edk_count == 0 {
        return Err(HeaderError::NoEncryptedDataKeys);
    }
    let mut encrypted_data_keys = Vec::with_capacity(edk_count as usize);
    for _ in 0..edk_count {
        let provider_id = utf8("provider id", need!(cur.prefixed()))?;
        let provider_info = utf8("provider info", need!(cur.prefixed()))?;
        let edk = Bytes::copy_from_slice(need!(cur.prefixed()));
        encrypted_data_keys.push(EncryptedDataKey::new(provider_id, provider_info, edk));
    }

    let raw_content_type = need!(cur.u8());
    let content_type =
        ContentType::try_from(raw_content_type).map_err(|_| HeaderError::UnknownContentType(raw_content_type))?;

    let mut reserved = [0u8; 4];
    reserved.copy_from_slice(need!(cur.take(4)));
    if reserved != crate::constants::HEADER_RESERVED {
        return Err(HeaderError::ReservedNonZero(reserved));
    }

    let header_iv_length = need!(cur.u8());
    if header_iv_length as usize != suite.iv_len {
        return Err(HeaderError::IvLengthMismatch { have: header_iv_length as usize, need: suite.iv_len });
    }

    let frame_length = need!(cur.u32());
    let consistent = match content_type {
        ContentType::Framed => frame_length > 0,
        ContentType::NonFramed => frame_length == 0,
    };
    if !consistent {
        return Err(HeaderError::FrameLengthMismatch { content_type, frame_length });
    }

    let raw_end = cur.pos;
    let header_iv = need!(cur.take(suite.iv_len)).to_vec();
    let header_auth_tag = need!(cur.take(suite.tag_len)).to_vec();

    let header = MessageHeader {
        version,
        object_type,
        suite_id,
        message_id,
        encryption_context,
        encrypted_data_keys,
        content_type,
        header_iv_length,
        frame_length,
    };

    Ok(Some(HeaderInfo {
        header,
        raw_header: buf[..raw_end].to_vec(),
        header_iv,
        header_auth_tag,
    }))
}
