//! envelope-core
//!
//! Pure Rust envelope-encryption message framing.
//! Wrapped data keys, an authenticated header, AEAD frames and an optional
//! ECDSA trailer, produced and consumed incrementally.
//! No FFI, no async runtime: async seams are plain futures.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod suites;

// Building blocks
pub mod crypto;
pub mod materials;
pub mod headers;
pub mod telemetry;

// Pipelines
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::headers::{ContentType, MessageHeader};
    pub use crate::materials::{
        DecryptionMaterial, DefaultMaterialsManager, EncryptedDataKey, EncryptionContext, EncryptionMaterial, Keyring,
        KeyringTrace, KeyringTraceFlags, MaterialError, MaterialsManager,
    };
    pub use crate::stream::{
        decrypt, decrypt_stream, decryptor, encrypt, encrypt_stream, encryptor, ApiConfig, DecryptEvent, DecryptOutput,
        DecryptParams, Decryptor, EncryptOutput, EncryptParams, Encryptor, InputSource, OutputSink,
    };
    pub use crate::suites::{AlgorithmSuite, AlgorithmSuiteId};
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{ErrorKind, StreamError};
}
