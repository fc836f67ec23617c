//! Wire constants, defaults and limits shared by every layer.
//!
//! All multi-byte integers on the wire are big-endian.

/// Serialization version carried in byte 0 of every header.
pub const SERIALIZATION_VERSION_V1: u8 = 0x01;

/// Object type for customer authenticated-encrypted data.
pub const OBJECT_TYPE_CUSTOMER_AE_DATA: u8 = 0x80;

/// Length of the random per-message identifier.
pub const MESSAGE_ID_LEN: usize = 16;

/// Reserved header field, always zero in v1.
pub const HEADER_RESERVED: [u8; 4] = [0u8; 4];

/// Defaults when Option<T> is None
pub const DEFAULT_FRAME_LENGTH: u32 = 4096;

/// Sequence-number slot value that marks the final frame.
pub const FINAL_FRAME_MARKER: u32 = 0xFFFF_FFFF;

/// First sequence number of every body.
pub const FIRST_SEQUENCE_NUMBER: u32 = 1;

/// Encryption-context key reserved for the base64 signing public key.
pub const ENCODED_SIGNER_KEY: &str = "aws-crypto-public-key";

/// Default read size for the streaming I/O drivers.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024; // 64 KiB
/// Max read size sanity bound (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// Body AAD content strings. The final-frame string differs from the regular one so
/// dropping the final frame cannot go unnoticed.
pub mod body_aad {
    pub const FRAME: &[u8] = b"AWSKMSEncryptionClient Frame";
    pub const FINAL_FRAME: &[u8] = b"AWSKMSEncryptionClient Final Frame";
    pub const SINGLE_BLOCK: &[u8] = b"AWSKMSEncryptionClient Single Block";
}

/// Content type identifiers (mirrored in headers).
pub mod content_type_ids {
    pub const NON_FRAMED: u8 = 0x01;
    pub const FRAMED: u8 = 0x02;
}
