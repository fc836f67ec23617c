//! Key derivation helpers.
//!
//! A helper owns the material for one message, derives the message key once at
//! construction and hands out single-use ciphers. `dispose` wipes both the
//! message key schedule and the material's data key; it is idempotent and also
//! runs on drop.
//!
//! Material for a signing suite must carry its signing (or verification) key;
//! otherwise construction fails and the data key is wiped.

use crate::crypto::{derive_message_key, AeadImpl, Cipher, CryptoError, Decipher, Signer, Verifier};
use crate::materials::material::{DecryptionMaterial, EncryptionMaterial};
use crate::materials::types::MaterialError;
use crate::suites::AlgorithmSuite;
use crate::types::StreamError;

fn build_aead(suite: &AlgorithmSuite, data_key: &[u8], info: &[u8]) -> Result<AeadImpl, CryptoError> {
    let message_key = derive_message_key(suite, data_key, info)?;
    AeadImpl::from_suite_and_key(suite, message_key.expose()?)
}

fn encrypt_aead(material: &EncryptionMaterial, info: &[u8]) -> Result<AeadImpl, StreamError> {
    let suite = material.suite();
    if suite.is_signed() && material.signature_key().is_none() {
        return Err(MaterialError::MissingSignatureKey(suite.id).into());
    }
    Ok(build_aead(suite, material.unencrypted_data_key()?, info)?)
}

fn decrypt_aead(material: &DecryptionMaterial, info: &[u8]) -> Result<AeadImpl, StreamError> {
    let suite = material.suite();
    if suite.is_signed() && material.verification_key().is_none() {
        return Err(MaterialError::MissingVerificationKey(suite.id).into());
    }
    Ok(build_aead(suite, material.unencrypted_data_key()?, info)?)
}

/// Encrypt-side helper.
pub struct EncryptHelper {
    material: EncryptionMaterial,
    aead: Option<AeadImpl>,
}

impl EncryptHelper {
    /// Derive the message key from `material` with KDF `info`.
    pub fn new(mut material: EncryptionMaterial, info: &[u8]) -> Result<Self, StreamError> {
        match encrypt_aead(&material, info) {
            Ok(aead) => Ok(Self { material, aead: Some(aead) }),
            Err(e) => {
                material.zero_unencrypted_data_key();
                Err(e)
            }
        }
    }

    pub fn material(&self) -> &EncryptionMaterial {
        &self.material
    }

    pub fn suite(&self) -> &'static AlgorithmSuite {
        self.material.suite()
    }

    /// Single-use encryptor for `iv`. Fails after `dispose`.
    pub fn get_cipher(&self, iv: &[u8]) -> Result<Cipher<'_>, CryptoError> {
        let aead = self.aead.as_ref().ok_or(CryptoError::KeyZeroed)?;
        Cipher::new(aead, iv)
    }

    /// Running signer when the suite signs.
    pub fn get_signer(&self) -> Option<Signer> {
        self.material.signature_key().cloned().map(Signer::new)
    }

    pub fn dispose(&mut self) {
        self.aead = None;
        self.material.zero_unencrypted_data_key();
    }

    pub fn is_disposed(&self) -> bool {
        self.aead.is_none()
    }
}

impl Drop for EncryptHelper {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Decrypt-side helper.
pub struct DecryptHelper {
    material: DecryptionMaterial,
    aead: Option<AeadImpl>,
}

impl DecryptHelper {
    /// Derive the message key from `material` with KDF `info`.
    pub fn new(mut material: DecryptionMaterial, info: &[u8]) -> Result<Self, StreamError> {
        match decrypt_aead(&material, info) {
            Ok(aead) => Ok(Self { material, aead: Some(aead) }),
            Err(e) => {
                material.zero_unencrypted_data_key();
                Err(e)
            }
        }
    }

    pub fn material(&self) -> &DecryptionMaterial {
        &self.material
    }

    pub fn suite(&self) -> &'static AlgorithmSuite {
        self.material.suite()
    }

    /// Single-use decryptor for `iv`. Fails after `dispose`.
    pub fn get_decipher(&self, iv: &[u8]) -> Result<Decipher<'_>, CryptoError> {
        let aead = self.aead.as_ref().ok_or(CryptoError::KeyZeroed)?;
        Decipher::new(aead, iv)
    }

    /// Running verifier when the suite signs.
    pub fn get_verify(&self) -> Option<Verifier> {
        self.material.verification_key().cloned().map(Verifier::new)
    }

    pub fn dispose(&mut self) {
        self.aead = None;
        self.material.zero_unencrypted_data_key();
    }

    pub fn is_disposed(&self) -> bool {
        self.aead.is_none()
    }
}

impl Drop for DecryptHelper {
    fn drop(&mut self) {
        self.dispose();
    }
}
