// ## 📂 File: `src/materials/types.rs`

use bitflags::bitflags;
use bytes::Bytes;
use thiserror::Error;

use crate::suites::{AlgorithmSuiteId, SignatureCurve};

/// A data key wrapped by one key provider. Opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedDataKey {
    pub provider_id: String,
    pub provider_info: String,
    pub encrypted_data_key: Bytes,
}

impl EncryptedDataKey {
    pub fn new(
        provider_id: impl Into<String>,
        provider_info: impl Into<String>,
        encrypted_data_key: impl Into<Bytes>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            provider_info: provider_info.into(),
            encrypted_data_key: encrypted_data_key.into(),
        }
    }
}

bitflags! {
    /// What a keyring did to the material.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyringTraceFlags: u8 {
        const GENERATED_DATA_KEY = 0b0000_0001;
        const ENCRYPTED_DATA_KEY = 0b0000_0010;
        const DECRYPTED_DATA_KEY = 0b0000_0100;
        const SIGNED_ENC_CTX     = 0b0000_1000;
        const VERIFIED_ENC_CTX   = 0b0001_0000;
    }
}

/// One provenance event recorded on the material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyringTrace {
    pub key_namespace: String,
    pub key_name: String,
    pub flags: KeyringTraceFlags,
}

impl KeyringTrace {
    pub fn new(key_namespace: impl Into<String>, key_name: impl Into<String>, flags: KeyringTraceFlags) -> Self {
        Self { key_namespace: key_namespace.into(), key_name: key_name.into(), flags }
    }
}

#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("unencrypted data key already set")]
    DataKeyAlreadySet,

    #[error("data key length mismatch: expected={expected}, actual={actual}")]
    DataKeyLength { expected: usize, actual: usize },

    #[error("unencrypted data key has been zeroed")]
    DataKeyZeroed,

    #[error("no unencrypted data key")]
    MissingDataKey,

    #[error("keyring trace flags {actual:?} do not include {required:?}")]
    InvalidTraceFlags { required: KeyringTraceFlags, actual: KeyringTraceFlags },

    #[error("signature key already set")]
    SignatureKeyAlreadySet,

    #[error("suite {0} does not sign")]
    UnsignedSuite(AlgorithmSuiteId),

    #[error("signature curve mismatch: suite={expected:?}, key={actual:?}")]
    CurveMismatch { expected: SignatureCurve, actual: SignatureCurve },

    #[error("suite {0} requires a signature key")]
    MissingSignatureKey(AlgorithmSuiteId),

    #[error("suite {0} requires a verification key")]
    MissingVerificationKey(AlgorithmSuiteId),

    #[error("no encrypted data keys")]
    NoEncryptedDataKeys,

    #[error("encryption context uses reserved key `{0}`")]
    ReservedContextKey(&'static str),

    #[error("invalid public key in encryption context: {0}")]
    InvalidPublicKey(String),

    /// Failure reported by a keyring implementation.
    #[error("keyring error: {0}")]
    Keyring(String),
}
