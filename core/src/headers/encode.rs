// ## 📂 File: `src/headers/encode.rs`
//! src/headers/encode.rs
//!
//! Header encoding utilities.
//!
//! Design notes:
//! - Serializes `MessageHeader` big-endian, field order as in `decode.rs`.
//! - Deterministic: the context is written sorted by key bytes, so equal headers
//!   always produce equal bytes (and therefore equal header tags).
//! - The only failure is a field too long for its u16 length prefix.

use bytes::BufMut;

use crate::headers::types::{HeaderError, MessageHeader};
use crate::materials::{EncryptedDataKey, EncryptionContext};

#[inline]
fn u16_len(field: &'static str, len: usize) -> Result<u16, HeaderError> {
    u16::try_from(len).map_err(|_| HeaderError::FieldTooLong { field, len })
}

fn put_prefixed(out: &mut Vec<u8>, field: &'static str, bytes: &[u8]) -> Result<(), HeaderError> {
    out.put_u16(u16_len(field, bytes.len())?);
    out.put_slice(bytes);
    Ok(())
}

/// Serialize an encryption context.
///
/// Empty context ⇒ empty output (the pair count is omitted too). Otherwise
/// `pair_count u16` followed by length-prefixed key/value pairs in key order.
pub fn serialize_encryption_context(context: &EncryptionContext) -> Result<Vec<u8>, HeaderError> {
    let mut out = Vec::new();
    if context.is_empty() {
        return Ok(out);
    }
    out.put_u16(u16_len("encryption context pair count", context.len())?);
    // BTreeMap<String, _> iterates in byte order of the keys.
    for (k, v) in context.iter() {
        put_prefixed(&mut out, "encryption context key", k.as_bytes())?;
        put_prefixed(&mut out, "encryption context value", v.as_bytes())?;
    }
    Ok(out)
}

fn serialize_encrypted_data_keys(out: &mut Vec<u8>, edks: &[EncryptedDataKey]) -> Result<(), HeaderError> {
    out.put_u16(u16_len("encrypted data key count", edks.len())?);
    for edk in edks {
        put_prefixed(out, "provider id", edk.provider_id.as_bytes())?;
        put_prefixed(out, "provider info", edk.provider_info.as_bytes())?;
        put_prefixed(out, "encrypted data key", &edk.encrypted_data_key)?;
    }
    Ok(())
}

/// Serialize a `MessageHeader` (without header IV and tag).
///
/// # Layout
/// ```text
/// version u8 | object_type u8 | suite_id u16 | message_id [16]
/// aad_len u16 | encryption context [aad_len]
/// edk_count u16 | (pid_len pid | pinfo_len pinfo | edk_len edk)*
/// content_type u8 | reserved [4] | iv_len u8 | frame_length u32
/// ```
pub fn serialize_message_header(h: &MessageHeader) -> Result<Vec<u8>, HeaderError> {
    let context = serialize_encryption_context(&h.encryption_context)?;

    let mut out = Vec::with_capacity(64 + context.len());
    out.put_u8(h.version);
    out.put_u8(h.object_type);
    out.put_u16(h.suite_id as u16);
    out.put_slice(&h.message_id);
    put_prefixed(&mut out, "encryption context", &context)?;
    serialize_encrypted_data_keys(&mut out, &h.encrypted_data_keys)?;
    out.put_u8(h.content_type as u8);
    out.put_slice(&crate::constants::HEADER_RESERVED);
    out.put_u8(h.header_iv_length);
    out.put_u32(h.frame_length);

    Ok(out)
}
