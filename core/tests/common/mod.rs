//! Shared fixtures: a static-key keyring and a call-counting manager.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use envelope_core::materials::{
    DecryptionMaterial, DecryptionRequest, DefaultMaterialsManager, EncryptedDataKey, EncryptionMaterial,
    EncryptionRequest, Keyring, KeyringTrace, KeyringTraceFlags, MaterialError, MaterialsManager,
};
use envelope_core::suites::AlgorithmSuiteId;

pub const PROVIDER_ID: &str = "test-provider";
pub const KEY_NAME: &str = "static";
/// XOR mask standing in for a real wrapping key.
const WRAP_MASK: u8 = 0x5a;

fn wrap(key: &[u8]) -> Vec<u8> {
    key.iter().map(|b| b ^ WRAP_MASK).collect()
}

/// Keyring that always generates `key_byte` repeated to the suite key length.
#[derive(Debug, Clone)]
pub struct StaticKeyring {
    pub key_byte: u8,
}

impl StaticKeyring {
    pub fn new(key_byte: u8) -> Self {
        Self { key_byte }
    }
}

#[async_trait]
impl Keyring for StaticKeyring {
    async fn on_encrypt(&self, mut material: EncryptionMaterial) -> Result<EncryptionMaterial, MaterialError> {
        let key = vec![self.key_byte; material.suite().data_key_len];
        material.set_unencrypted_data_key(
            key.clone(),
            KeyringTrace::new(PROVIDER_ID, KEY_NAME, KeyringTraceFlags::GENERATED_DATA_KEY),
        )?;
        material.add_encrypted_data_key(
            EncryptedDataKey::new(PROVIDER_ID, KEY_NAME, wrap(&key)),
            KeyringTrace::new(PROVIDER_ID, KEY_NAME, KeyringTraceFlags::ENCRYPTED_DATA_KEY),
        )?;
        Ok(material)
    }

    async fn on_decrypt(
        &self,
        mut material: DecryptionMaterial,
        edks: &[EncryptedDataKey],
    ) -> Result<DecryptionMaterial, MaterialError> {
        if let Some(edk) = edks.iter().find(|e| e.provider_id == PROVIDER_ID) {
            material.set_unencrypted_data_key(
                wrap(&edk.encrypted_data_key),
                KeyringTrace::new(PROVIDER_ID, KEY_NAME, KeyringTraceFlags::DECRYPTED_DATA_KEY),
            )?;
        }
        Ok(material)
    }
}

/// Keyring that never produces a key.
#[derive(Debug, Clone, Default)]
pub struct EmptyKeyring;

#[async_trait]
impl Keyring for EmptyKeyring {
    async fn on_encrypt(&self, material: EncryptionMaterial) -> Result<EncryptionMaterial, MaterialError> {
        Ok(material)
    }

    async fn on_decrypt(
        &self,
        material: DecryptionMaterial,
        _edks: &[EncryptedDataKey],
    ) -> Result<DecryptionMaterial, MaterialError> {
        Ok(material)
    }
}

/// Default manager over `StaticKeyring(0x01)` that counts calls.
#[derive(Debug)]
pub struct CountingManager {
    inner: DefaultMaterialsManager<StaticKeyring>,
    pub encrypt_calls: AtomicUsize,
    pub decrypt_calls: AtomicUsize,
}

impl CountingManager {
    pub fn new() -> Self {
        Self {
            inner: DefaultMaterialsManager::new(StaticKeyring::new(0x01)),
            encrypt_calls: AtomicUsize::new(0),
            decrypt_calls: AtomicUsize::new(0),
        }
    }

    pub fn decrypts(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }

    pub fn encrypts(&self) -> usize {
        self.encrypt_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MaterialsManager for CountingManager {
    async fn get_encryption_materials(&self, request: EncryptionRequest) -> Result<EncryptionMaterial, MaterialError> {
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_encryption_materials(request).await
    }

    async fn decrypt_materials(&self, request: DecryptionRequest) -> Result<DecryptionMaterial, MaterialError> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.decrypt_materials(request).await
    }
}

/// Manager that runs `StaticKeyring(0x01)` but never attaches a signing or
/// verification key, even for signing suites.
#[derive(Debug, Default)]
pub struct KeylessSigningManager;

#[async_trait]
impl MaterialsManager for KeylessSigningManager {
    async fn get_encryption_materials(&self, request: EncryptionRequest) -> Result<EncryptionMaterial, MaterialError> {
        let suite = request.suite_id.unwrap_or(AlgorithmSuiteId::DEFAULT).suite();
        StaticKeyring::new(0x01).on_encrypt(EncryptionMaterial::new(suite, request.context)).await
    }

    async fn decrypt_materials(&self, request: DecryptionRequest) -> Result<DecryptionMaterial, MaterialError> {
        let material = DecryptionMaterial::new(request.suite_id.suite(), request.context);
        StaticKeyring::new(0x01).on_decrypt(material, &request.encrypted_data_keys).await
    }
}

pub fn manager() -> DefaultMaterialsManager<StaticKeyring> {
    DefaultMaterialsManager::new(StaticKeyring::new(0x01))
}

/// Deterministic plaintext of `len` bytes.
pub fn plaintext(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
