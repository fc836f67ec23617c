//! materials/manager.rs
//! Materials manager: turns requests into complete cryptographic material.
//!
//! Design notes:
//! - The default manager owns one keyring and is the only place that generates
//!   or loads the signature keys.
//! - The signing public key travels in the encryption context under
//!   `aws-crypto-public-key` as base64 of the SEC1 compressed point. Callers may
//!   not set that key themselves.
//! - The caller's context is never modified; a new context is returned.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::debug;

use crate::constants::ENCODED_SIGNER_KEY;
use crate::crypto::{SignatureKey, VerificationKey};
use crate::materials::context::EncryptionContext;
use crate::materials::keyring::Keyring;
use crate::materials::material::{DecryptionMaterial, EncryptionMaterial};
use crate::materials::types::{EncryptedDataKey, MaterialError};
use crate::suites::{AlgorithmSuite, AlgorithmSuiteId};

/// Input to `get_encryption_materials`.
#[derive(Debug, Clone)]
pub struct EncryptionRequest {
    /// `None` picks the default suite.
    pub suite_id: Option<AlgorithmSuiteId>,
    pub context: EncryptionContext,
    pub frame_length: u32,
    /// Declared plaintext length, when known up front.
    pub plaintext_length: Option<u64>,
}

/// Input to `decrypt_materials`, taken from a parsed header.
#[derive(Debug, Clone)]
pub struct DecryptionRequest {
    pub suite_id: AlgorithmSuiteId,
    pub context: EncryptionContext,
    pub encrypted_data_keys: Vec<EncryptedDataKey>,
}

/// Supplies encryption and decryption material.
#[async_trait]
pub trait MaterialsManager: Send + Sync {
    /// Returned material carries the (possibly extended) context to serialize.
    async fn get_encryption_materials(&self, request: EncryptionRequest) -> Result<EncryptionMaterial, MaterialError>;

    async fn decrypt_materials(&self, request: DecryptionRequest) -> Result<DecryptionMaterial, MaterialError>;
}

#[async_trait]
impl<M: MaterialsManager + ?Sized> MaterialsManager for Arc<M> {
    async fn get_encryption_materials(&self, request: EncryptionRequest) -> Result<EncryptionMaterial, MaterialError> {
        (**self).get_encryption_materials(request).await
    }

    async fn decrypt_materials(&self, request: DecryptionRequest) -> Result<DecryptionMaterial, MaterialError> {
        (**self).decrypt_materials(request).await
    }
}

/// Manager that delegates key handling to a single keyring.
#[derive(Debug, Clone)]
pub struct DefaultMaterialsManager<K> {
    keyring: K,
}

impl<K: Keyring> DefaultMaterialsManager<K> {
    pub fn new(keyring: K) -> Self {
        Self { keyring }
    }

    pub fn keyring(&self) -> &K {
        &self.keyring
    }
}

impl<K: Keyring> From<K> for DefaultMaterialsManager<K> {
    fn from(keyring: K) -> Self {
        Self::new(keyring)
    }
}

/// For signing suites: a fresh signing key and `context` extended with its public key.
pub fn generate_signing_key_and_update_context(
    suite: &AlgorithmSuite,
    context: &EncryptionContext,
) -> (Option<SignatureKey>, EncryptionContext) {
    match suite.signature_curve {
        None => (None, context.clone()),
        Some(curve) => {
            let key = SignatureKey::generate(curve);
            let encoded = BASE64.encode(key.verification_key().to_sec1_compressed());
            let context = context.with_entry(ENCODED_SIGNER_KEY, encoded);
            (Some(key), context)
        }
    }
}

/// For signing suites: the verification key named in `context`.
pub fn load_verification_key_from_context(
    suite: &AlgorithmSuite,
    context: &EncryptionContext,
) -> Result<Option<VerificationKey>, MaterialError> {
    let Some(curve) = suite.signature_curve else {
        return Ok(None);
    };
    let encoded = context
        .get(ENCODED_SIGNER_KEY)
        .ok_or_else(|| MaterialError::MissingVerificationKey(suite.id))?;
    let point = BASE64
        .decode(encoded)
        .map_err(|e| MaterialError::InvalidPublicKey(e.to_string()))?;
    let key = VerificationKey::from_sec1(curve, &point)
        .map_err(|e| MaterialError::InvalidPublicKey(e.to_string()))?;
    Ok(Some(key))
}

#[async_trait]
impl<K: Keyring> MaterialsManager for DefaultMaterialsManager<K> {
    async fn get_encryption_materials(&self, request: EncryptionRequest) -> Result<EncryptionMaterial, MaterialError> {
        let suite = request.suite_id.unwrap_or(AlgorithmSuiteId::DEFAULT).suite();

        if request.context.contains_key(ENCODED_SIGNER_KEY) {
            return Err(MaterialError::ReservedContextKey(ENCODED_SIGNER_KEY));
        }

        let (signature_key, context) = generate_signing_key_and_update_context(suite, &request.context);
        let mut material = EncryptionMaterial::new(suite, context);
        if let Some(key) = signature_key {
            material.set_signature_key(key)?;
        }

        let material = self.keyring.on_encrypt(material).await?;

        if !material.has_unencrypted_data_key() {
            return Err(MaterialError::MissingDataKey);
        }
        if material.encrypted_data_keys().is_empty() {
            return Err(MaterialError::NoEncryptedDataKeys);
        }
        if suite.is_signed() != material.signature_key().is_some() {
            return Err(MaterialError::MissingSignatureKey(suite.id));
        }

        debug!(
            suite = %suite.id,
            edks = material.encrypted_data_keys().len(),
            "encryption material ready"
        );
        Ok(material)
    }

    async fn decrypt_materials(&self, request: DecryptionRequest) -> Result<DecryptionMaterial, MaterialError> {
        let suite = request.suite_id.suite();

        if request.encrypted_data_keys.is_empty() {
            return Err(MaterialError::NoEncryptedDataKeys);
        }

        let verification_key = load_verification_key_from_context(suite, &request.context)?;
        let mut material = DecryptionMaterial::new(suite, request.context);
        if let Some(key) = verification_key {
            material.set_verification_key(key)?;
        }

        let material = self.keyring.on_decrypt(material, &request.encrypted_data_keys).await?;

        if !material.has_unencrypted_data_key() {
            return Err(MaterialError::MissingDataKey);
        }

        debug!(suite = %suite.id, "decryption material ready");
        Ok(material)
    }
}
