//! Signature stage.
//!
//! Sits at the end of both pipelines and sees every byte of the message body
//! side: header (IV and tag included) and every frame, in wire order.
//!
//! - Encrypt: hashes everything and appends `sig_len u16 | DER signature`.
//! - Decrypt: hashes everything up to the trailer and checks the signature.
//! - Unsigned suites: pure passthrough, no trailer expected or written.

use tracing::{debug, warn};

use crate::crypto::{Signer, Verifier};
use crate::materials::{DecryptHelper, EncryptHelper};
use crate::stream::framing::encode_trailer;
use crate::types::StreamError;

pub enum SignatureStage {
    Sign(Signer),
    Verify(Verifier),
    Passthrough,
}

impl SignatureStage {
    pub fn for_encrypt(helper: &EncryptHelper) -> Self {
        helper.get_signer().map_or(Self::Passthrough, Self::Sign)
    }

    pub fn for_decrypt(helper: &DecryptHelper) -> Self {
        helper.get_verify().map_or(Self::Passthrough, Self::Verify)
    }

    #[inline]
    pub fn is_signed(&self) -> bool {
        !matches!(self, Self::Passthrough)
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sign(s) => s.update(data),
            Self::Verify(v) => v.update(data),
            Self::Passthrough => {}
        }
    }

    /// Encoded trailer for signing stages, `None` otherwise.
    pub fn finish_sign(self) -> Result<Option<Vec<u8>>, StreamError> {
        match self {
            Self::Sign(signer) => {
                let signature = signer.finish()?;
                debug!(len = signature.len(), "message signed");
                Ok(Some(encode_trailer(&signature)?))
            }
            Self::Verify(_) => Err(StreamError::Validation("sign called on a verifying stage".into())),
            Self::Passthrough => Ok(None),
        }
    }

    /// Check the trailer signature. Passthrough stages accept nothing.
    pub fn finish_verify(self, signature_der: &[u8]) -> Result<(), StreamError> {
        match self {
            Self::Verify(verifier) => {
                verifier.verify(signature_der).inspect_err(|_| warn!("message signature did not verify"))?;
                debug!("message signature verified");
                Ok(())
            }
            Self::Sign(_) => Err(StreamError::Validation("verify called on a signing stage".into())),
            Self::Passthrough => Err(StreamError::Validation("unsigned message has no trailer".into())),
        }
    }
}
