// ## 📂 File: `src/crypto/signature.rs`

//! ECDSA keys and running-digest signer/verifier for the message trailer.
//!
//! Design notes:
//! - P-256 pairs with SHA-256, P-384 with SHA-384; the curve comes from the suite.
//! - The digest runs over every byte of header and body as it is produced, so the
//!   message never has to be held in memory to sign it.
//! - Signatures travel as DER; public keys as SEC1 compressed points.

use std::fmt;

use p256::ecdsa::signature::{DigestSigner, DigestVerifier};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256, Sha384};

use crate::crypto::types::CryptoError;
use crate::suites::SignatureCurve;

/// Private signing key for one message.
#[derive(Clone)]
pub enum SignatureKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

impl SignatureKey {
    /// Fresh random key on `curve`.
    pub fn generate(curve: SignatureCurve) -> Self {
        match curve {
            SignatureCurve::P256 => Self::P256(p256::ecdsa::SigningKey::random(&mut OsRng)),
            SignatureCurve::P384 => Self::P384(p384::ecdsa::SigningKey::random(&mut OsRng)),
        }
    }

    pub fn curve(&self) -> SignatureCurve {
        match self {
            Self::P256(_) => SignatureCurve::P256,
            Self::P384(_) => SignatureCurve::P384,
        }
    }

    pub fn verification_key(&self) -> VerificationKey {
        match self {
            Self::P256(k) => VerificationKey::P256(k.verifying_key().clone()),
            Self::P384(k) => VerificationKey::P384(k.verifying_key().clone()),
        }
    }
}

impl fmt::Debug for SignatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureKey({:?}, <redacted>)", self.curve())
    }
}

/// Public verification key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

impl VerificationKey {
    /// Parse a SEC1 point (compressed or not) on `curve`.
    pub fn from_sec1(curve: SignatureCurve, bytes: &[u8]) -> Result<Self, CryptoError> {
        match curve {
            SignatureCurve::P256 => p256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
                .map(Self::P256)
                .map_err(|_| CryptoError::Failure("invalid P-256 public key".into())),
            SignatureCurve::P384 => p384::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
                .map(Self::P384)
                .map_err(|_| CryptoError::Failure("invalid P-384 public key".into())),
        }
    }

    /// SEC1 compressed encoding.
    pub fn to_sec1_compressed(&self) -> Vec<u8> {
        match self {
            Self::P256(k) => k.to_encoded_point(true).as_bytes().to_vec(),
            Self::P384(k) => k.to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    pub fn curve(&self) -> SignatureCurve {
        match self {
            Self::P256(_) => SignatureCurve::P256,
            Self::P384(_) => SignatureCurve::P384,
        }
    }
}

enum RunningDigest {
    Sha256(Sha256),
    Sha384(Sha384),
}

impl RunningDigest {
    fn for_curve(curve: SignatureCurve) -> Self {
        match curve {
            SignatureCurve::P256 => Self::Sha256(Sha256::new()),
            SignatureCurve::P384 => Self::Sha384(Sha384::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(d) => d.update(data),
            Self::Sha384(d) => d.update(data),
        }
    }
}

/// Accumulates message bytes and produces the trailer signature.
pub struct Signer {
    key: SignatureKey,
    digest: RunningDigest,
}

impl Signer {
    pub fn new(key: SignatureKey) -> Self {
        let digest = RunningDigest::for_curve(key.curve());
        Self { key, digest }
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    /// Sign the accumulated digest; returns a DER signature.
    pub fn finish(self) -> Result<Vec<u8>, CryptoError> {
        let fail = |_| CryptoError::Failure("ECDSA signing failed".into());
        match (self.key, self.digest) {
            (SignatureKey::P256(k), RunningDigest::Sha256(d)) => {
                let sig: p256::ecdsa::Signature = k.try_sign_digest(d).map_err(fail)?;
                Ok(sig.to_der().as_bytes().to_vec())
            }
            (SignatureKey::P384(k), RunningDigest::Sha384(d)) => {
                let sig: p384::ecdsa::Signature = k.try_sign_digest(d).map_err(fail)?;
                Ok(sig.to_der().as_bytes().to_vec())
            }
            _ => Err(CryptoError::Failure("digest does not match signing curve".into())),
        }
    }
}

/// Accumulates message bytes and checks the trailer signature.
pub struct Verifier {
    key: VerificationKey,
    digest: RunningDigest,
}

impl Verifier {
    pub fn new(key: VerificationKey) -> Self {
        let digest = RunningDigest::for_curve(key.curve());
        Self { key, digest }
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    /// Verify a DER signature over the accumulated digest.
    pub fn verify(self, signature_der: &[u8]) -> Result<(), CryptoError> {
        match (self.key, self.digest) {
            (VerificationKey::P256(k), RunningDigest::Sha256(d)) => {
                let sig = p256::ecdsa::Signature::from_der(signature_der)
                    .map_err(|_| CryptoError::SignatureMismatch)?;
                k.verify_digest(d, &sig).map_err(|_| CryptoError::SignatureMismatch)
            }
            (VerificationKey::P384(k), RunningDigest::Sha384(d)) => {
                let sig = p384::ecdsa::Signature::from_der(signature_der)
                    .map_err(|_| CryptoError::SignatureMismatch)?;
                k.verify_digest(d, &sig).map_err(|_| CryptoError::SignatureMismatch)
            }
            _ => Err(CryptoError::SignatureMismatch),
        }
    }
}
