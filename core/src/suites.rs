//! suites.rs
//! Algorithm suite registry.
//!
//! A suite is a fixed combination of AEAD cipher, KDF and optional signature
//! algorithm, identified on the wire by a u16. Entries are static; lookups never
//! allocate.

use std::fmt;
use num_enum::TryFromPrimitive;

use crate::utils::enum_name_or_hex;

/// Suite identifiers (mirrored in headers).
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive)]
pub enum AlgorithmSuiteId {
    Aes128GcmIv12Tag16                    = 0x0014,
    Aes192GcmIv12Tag16                    = 0x0046,
    Aes256GcmIv12Tag16                    = 0x0078,
    Aes128GcmIv12Tag16HkdfSha256          = 0x0114,
    Aes192GcmIv12Tag16HkdfSha256          = 0x0146,
    Aes256GcmIv12Tag16HkdfSha256          = 0x0178,
    Aes128GcmIv12Tag16HkdfSha256EcdsaP256 = 0x0214,
    Aes192GcmIv12Tag16HkdfSha384EcdsaP384 = 0x0346,
    Aes256GcmIv12Tag16HkdfSha384EcdsaP384 = 0x0378,
}

impl AlgorithmSuiteId {
    /// Every registered id, in wire order.
    pub const ALL: [AlgorithmSuiteId; 9] = [
        AlgorithmSuiteId::Aes128GcmIv12Tag16,
        AlgorithmSuiteId::Aes192GcmIv12Tag16,
        AlgorithmSuiteId::Aes256GcmIv12Tag16,
        AlgorithmSuiteId::Aes128GcmIv12Tag16HkdfSha256,
        AlgorithmSuiteId::Aes192GcmIv12Tag16HkdfSha256,
        AlgorithmSuiteId::Aes256GcmIv12Tag16HkdfSha256,
        AlgorithmSuiteId::Aes128GcmIv12Tag16HkdfSha256EcdsaP256,
        AlgorithmSuiteId::Aes192GcmIv12Tag16HkdfSha384EcdsaP384,
        AlgorithmSuiteId::Aes256GcmIv12Tag16HkdfSha384EcdsaP384,
    ];

    /// Suite used when the caller does not pick one.
    pub const DEFAULT: AlgorithmSuiteId = AlgorithmSuiteId::Aes256GcmIv12Tag16HkdfSha384EcdsaP384;

    #[inline]
    pub fn suite(self) -> &'static AlgorithmSuite {
        AlgorithmSuite::get(self)
    }
}

impl fmt::Display for AlgorithmSuiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(0x{:04x})", self, *self as u16)
    }
}

/// Key derivation applied to the data key before it reaches the AEAD.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kdf {
    None,
    HkdfSha256,
    HkdfSha384,
}

/// Curve used for the message-wide trailer signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SignatureCurve {
    P256,
    P384,
}

/// Key commitment behaviour. v1 messages never commit to the data key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommitmentPolicy {
    NoCommitment,
}

/// Static cryptographic parameters for one suite.
#[derive(Debug, PartialEq, Eq)]
pub struct AlgorithmSuite {
    pub id: AlgorithmSuiteId,
    pub data_key_len: usize,
    pub iv_len: usize,
    pub tag_len: usize,
    pub kdf: Kdf,
    pub signature_curve: Option<SignatureCurve>,
    pub commitment: CommitmentPolicy,
}

const fn suite(
    id: AlgorithmSuiteId,
    data_key_len: usize,
    kdf: Kdf,
    signature_curve: Option<SignatureCurve>,
) -> AlgorithmSuite {
    AlgorithmSuite {
        id,
        data_key_len,
        iv_len: 12,
        tag_len: 16,
        kdf,
        signature_curve,
        commitment: CommitmentPolicy::NoCommitment,
    }
}

static SUITES: [AlgorithmSuite; 9] = [
    suite(AlgorithmSuiteId::Aes128GcmIv12Tag16, 16, Kdf::None, None),
    suite(AlgorithmSuiteId::Aes192GcmIv12Tag16, 24, Kdf::None, None),
    suite(AlgorithmSuiteId::Aes256GcmIv12Tag16, 32, Kdf::None, None),
    suite(AlgorithmSuiteId::Aes128GcmIv12Tag16HkdfSha256, 16, Kdf::HkdfSha256, None),
    suite(AlgorithmSuiteId::Aes192GcmIv12Tag16HkdfSha256, 24, Kdf::HkdfSha256, None),
    suite(AlgorithmSuiteId::Aes256GcmIv12Tag16HkdfSha256, 32, Kdf::HkdfSha256, None),
    suite(AlgorithmSuiteId::Aes128GcmIv12Tag16HkdfSha256EcdsaP256, 16, Kdf::HkdfSha256, Some(SignatureCurve::P256)),
    suite(AlgorithmSuiteId::Aes192GcmIv12Tag16HkdfSha384EcdsaP384, 24, Kdf::HkdfSha384, Some(SignatureCurve::P384)),
    suite(AlgorithmSuiteId::Aes256GcmIv12Tag16HkdfSha384EcdsaP384, 32, Kdf::HkdfSha384, Some(SignatureCurve::P384)),
];

impl AlgorithmSuite {
    /// Registry lookup by typed id. Total: every id has an entry.
    pub fn get(id: AlgorithmSuiteId) -> &'static AlgorithmSuite {
        use AlgorithmSuiteId::*;
        let idx = match id {
            Aes128GcmIv12Tag16                    => 0,
            Aes192GcmIv12Tag16                    => 1,
            Aes256GcmIv12Tag16                    => 2,
            Aes128GcmIv12Tag16HkdfSha256          => 3,
            Aes192GcmIv12Tag16HkdfSha256          => 4,
            Aes256GcmIv12Tag16HkdfSha256          => 5,
            Aes128GcmIv12Tag16HkdfSha256EcdsaP256 => 6,
            Aes192GcmIv12Tag16HkdfSha384EcdsaP384 => 7,
            Aes256GcmIv12Tag16HkdfSha384EcdsaP384 => 8,
        };
        &SUITES[idx]
    }

    /// Registry lookup by wire id.
    pub fn from_wire(raw: u16) -> Option<&'static AlgorithmSuite> {
        AlgorithmSuiteId::try_from(raw).ok().map(AlgorithmSuite::get)
    }

    #[inline]
    pub fn is_signed(&self) -> bool {
        self.signature_curve.is_some()
    }

    /// Human-readable id for diagnostics.
    pub fn name(raw: u16) -> String {
        enum_name_or_hex::<AlgorithmSuiteId>(raw)
    }
}
