// ## src/crypto/kdf.rs

//! crypto/kdf.rs
//! Per-message key derivation from the data key.
//!
//! Design:
//! - `Kdf::None`: the data key is used as the message key (identity copy).
//! - HKDF-SHA256 / HKDF-SHA384: Extract with no salt, Expand with
//!   `info = suite_id (u16 BE) || message_id` to the data key length.
//!
//! Industry notes:
//! - Binding the message id into `info` gives every message its own AEAD key even
//!   when a keyring reuses a data key.

use hkdf::Hkdf;
use sha2::{Sha256, Sha384};

use crate::crypto::types::CryptoError;
use crate::materials::secret::DataKey;
use crate::suites::{AlgorithmSuite, AlgorithmSuiteId, Kdf};

/// Build HKDF `info` for a message.
#[inline]
pub fn kdf_info(suite_id: AlgorithmSuiteId, message_id: &[u8]) -> Vec<u8> {
    let mut info = Vec::with_capacity(2 + message_id.len());
    info.extend_from_slice(&(suite_id as u16).to_be_bytes());
    info.extend_from_slice(message_id);
    info
}

/// Derive the message key for `suite` from `data_key`.
///
/// Errors:
/// - `InvalidKeyLen` when the data key length is not the suite's.
pub fn derive_message_key(
    suite: &AlgorithmSuite,
    data_key: &[u8],
    info: &[u8],
) -> Result<DataKey, CryptoError> {
    if data_key.len() != suite.data_key_len {
        return Err(CryptoError::InvalidKeyLen {
            expected: suite.data_key_len,
            actual: data_key.len(),
        });
    }

    let mut key = vec![0u8; suite.data_key_len];
    match suite.kdf {
        Kdf::None => key.copy_from_slice(data_key),
        Kdf::HkdfSha256 => {
            Hkdf::<Sha256>::new(None, data_key)
                .expand(info, &mut key)
                .map_err(|_| CryptoError::Failure("HKDF expand failed (SHA-256)".into()))?;
        }
        Kdf::HkdfSha384 => {
            Hkdf::<Sha384>::new(None, data_key)
                .expand(info, &mut key)
                .map_err(|_| CryptoError::Failure("HKDF expand failed (SHA-384)".into()))?;
        }
    }
    Ok(DataKey::new(key))
}
