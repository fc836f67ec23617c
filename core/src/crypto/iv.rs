// ## 📂 File: `src/crypto/iv.rs`

//! IV derivation for header and body AEAD calls.
//!
//! Design:
//! - Frame IV: `iv_len` bytes, zero except the last four, which carry the frame
//!   sequence number big-endian. Decrypt recomputes it and compares against the
//!   wire value, so a spliced frame fails before its tag is checked.
//! - Header IV: all zero. The header is the only AEAD call that uses it, and the
//!   sequence numbers start at 1, so the two spaces never meet.
//!
//! Security notes:
//! - Uniqueness rests on the per-message key (HKDF over the message id) plus the
//!   strictly increasing sequence number.

use crate::crypto::types::{CryptoError, IV_COUNTER_LEN};

/// Derive the IV for frame `seq`.
#[inline]
pub fn frame_iv(iv_len: usize, seq: u32) -> Result<Vec<u8>, CryptoError> {
    if iv_len < IV_COUNTER_LEN {
        return Err(CryptoError::InvalidIvLen { expected: IV_COUNTER_LEN, actual: iv_len });
    }
    let mut iv = vec![0u8; iv_len];
    iv[iv_len - IV_COUNTER_LEN..].copy_from_slice(&seq.to_be_bytes());
    Ok(iv)
}

/// IV used for the header authentication tag.
#[inline]
pub fn header_auth_iv(iv_len: usize) -> Vec<u8> {
    vec![0u8; iv_len]
}
