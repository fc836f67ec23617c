use std::sync::Arc;
use async_trait::async_trait;

use crate::materials::material::{DecryptionMaterial, EncryptionMaterial};
use crate::materials::types::{EncryptedDataKey, MaterialError};

/// Generates, wraps and unwraps data keys.
///
/// `on_encrypt` must leave the material with a data key and at least one
/// encrypted data key. `on_decrypt` should set the data key if any of `edks` is
/// one it can unwrap, and otherwise return the material unchanged; the caller
/// decides whether a missing key is an error.
#[async_trait]
pub trait Keyring: Send + Sync {
    async fn on_encrypt(&self, material: EncryptionMaterial) -> Result<EncryptionMaterial, MaterialError>;

    async fn on_decrypt(
        &self,
        material: DecryptionMaterial,
        edks: &[EncryptedDataKey],
    ) -> Result<DecryptionMaterial, MaterialError>;
}

#[async_trait]
impl<K: Keyring + ?Sized> Keyring for Arc<K> {
    async fn on_encrypt(&self, material: EncryptionMaterial) -> Result<EncryptionMaterial, MaterialError> {
        (**self).on_encrypt(material).await
    }

    async fn on_decrypt(
        &self,
        material: DecryptionMaterial,
        edks: &[EncryptedDataKey],
    ) -> Result<DecryptionMaterial, MaterialError> {
        (**self).on_decrypt(material, edks).await
    }
}
