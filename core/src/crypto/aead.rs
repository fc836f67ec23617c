// ## 📂 File: `src/crypto/aead.rs`

//! src/crypto/aead.rs
//! AEAD interface for AES-128/192/256-GCM.
//!
//! Design notes:
//! - All registered suites use 12-byte IVs and 16-byte tags; ciphertext and tag
//!   are kept apart on the wire, so seal/open are detached.
//! - Tag verification is constant-time and fails closed (no partial plaintext).
//! - A `Cipher`/`Decipher` binds exactly one IV and is consumed by a single call,
//!   so an IV cannot be reused by accident.

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};

use crate::crypto::types::CryptoError;
use crate::suites::AlgorithmSuite;

/// AES-192-GCM with the standard 96-bit nonce.
pub type Aes192Gcm = AesGcm<Aes192, U12>;

/// AEAD cipher selected by the suite's data key length.
#[derive(Clone)]
pub enum AeadImpl {
    Aes128Gcm(Aes128Gcm),
    Aes192Gcm(Aes192Gcm),
    Aes256Gcm(Aes256Gcm),
}

impl AeadImpl {
    /// Construct the AEAD for `suite` keyed with the derived message key.
    pub fn from_suite_and_key(suite: &AlgorithmSuite, key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != suite.data_key_len {
            return Err(CryptoError::InvalidKeyLen {
                expected: suite.data_key_len,
                actual: key.len(),
            });
        }
        let bad_len = |_| CryptoError::InvalidKeyLen {
            expected: suite.data_key_len,
            actual: key.len(),
        };

        match suite.data_key_len {
            16 => Ok(Self::Aes128Gcm(Aes128Gcm::new_from_slice(key).map_err(bad_len)?)),
            24 => Ok(Self::Aes192Gcm(Aes192Gcm::new_from_slice(key).map_err(bad_len)?)),
            32 => Ok(Self::Aes256Gcm(Aes256Gcm::new_from_slice(key).map_err(bad_len)?)),
            other => Err(CryptoError::Failure(format!("no AES-GCM variant for {}-byte keys", other))),
        }
    }

    /// Encrypt `plaintext` and return `(ciphertext, tag)`. Empty plaintext is allowed.
    pub fn seal_detached(
        &self,
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        check_iv(iv)?;
        let nonce = GenericArray::from_slice(iv);
        let mut buf = plaintext.to_vec();

        let tag = match self {
            AeadImpl::Aes128Gcm(c) => c.encrypt_in_place_detached(nonce, aad, &mut buf),
            AeadImpl::Aes192Gcm(c) => c.encrypt_in_place_detached(nonce, aad, &mut buf),
            AeadImpl::Aes256Gcm(c) => c.encrypt_in_place_detached(nonce, aad, &mut buf),
        }
        .map_err(|_| CryptoError::Failure("AES-GCM seal failed".into()))?;

        Ok((buf, tag.to_vec()))
    }

    /// Decrypt and authenticate. Returns plaintext only if the tag verifies.
    pub fn open_detached(
        &self,
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        check_iv(iv)?;
        if tag.len() != TAG_LEN {
            return Err(CryptoError::InvalidTagLen { expected: TAG_LEN, actual: tag.len() });
        }
        let nonce = GenericArray::from_slice(iv);
        let tag = GenericArray::from_slice(tag);
        let mut buf = ciphertext.to_vec();

        let opened = match self {
            AeadImpl::Aes128Gcm(c) => c.decrypt_in_place_detached(nonce, aad, &mut buf, tag),
            AeadImpl::Aes192Gcm(c) => c.decrypt_in_place_detached(nonce, aad, &mut buf, tag),
            AeadImpl::Aes256Gcm(c) => c.decrypt_in_place_detached(nonce, aad, &mut buf, tag),
        };
        opened.map_err(|_| CryptoError::TagMismatch)?;

        Ok(buf)
    }
}

const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[inline]
fn check_iv(iv: &[u8]) -> Result<(), CryptoError> {
    if iv.len() != IV_LEN {
        return Err(CryptoError::InvalidIvLen { expected: IV_LEN, actual: iv.len() });
    }
    Ok(())
}

/// One-shot encryptor bound to a single IV.
pub struct Cipher<'a> {
    aead: &'a AeadImpl,
    iv: Vec<u8>,
}

impl<'a> Cipher<'a> {
    pub(crate) fn new(aead: &'a AeadImpl, iv: &[u8]) -> Result<Self, CryptoError> {
        check_iv(iv)?;
        Ok(Self { aead, iv: iv.to_vec() })
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn seal(self, aad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        self.aead.seal_detached(&self.iv, aad, plaintext)
    }
}

/// One-shot decryptor bound to a single IV.
pub struct Decipher<'a> {
    aead: &'a AeadImpl,
    iv: Vec<u8>,
}

impl<'a> Decipher<'a> {
    pub(crate) fn new(aead: &'a AeadImpl, iv: &[u8]) -> Result<Self, CryptoError> {
        check_iv(iv)?;
        Ok(Self { aead, iv: iv.to_vec() })
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn open(self, aad: &[u8], ciphertext: &[u8], tag: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.aead.open_detached(&self.iv, aad, ciphertext, tag)
    }
}
