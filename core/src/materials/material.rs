//! Per-call cryptographic material.
//!
//! Design notes:
//! - Created by the materials manager, mutated only by the manager and keyring,
//!   then handed to the helper that derives the message key.
//! - Exactly one data key, of the suite's length, may ever be set. Once zeroed it
//!   cannot be read or replaced.
//! - The signing/verification key may only be set once, only for suites that
//!   sign, and only on the suite's curve.

use crate::crypto::{SignatureKey, VerificationKey};
use crate::materials::context::EncryptionContext;
use crate::materials::secret::DataKey;
use crate::materials::types::{EncryptedDataKey, KeyringTrace, KeyringTraceFlags, MaterialError};
use crate::suites::{AlgorithmSuite, SignatureCurve};

fn require_flags(trace: &KeyringTrace, required: KeyringTraceFlags) -> Result<(), MaterialError> {
    if !trace.flags.contains(required) {
        return Err(MaterialError::InvalidTraceFlags { required, actual: trace.flags });
    }
    Ok(())
}

fn check_new_data_key(
    suite: &AlgorithmSuite,
    current: &Option<DataKey>,
    key: &DataKey,
) -> Result<(), MaterialError> {
    if current.is_some() {
        return Err(MaterialError::DataKeyAlreadySet);
    }
    if key.len() != suite.data_key_len {
        return Err(MaterialError::DataKeyLength { expected: suite.data_key_len, actual: key.len() });
    }
    Ok(())
}

fn read_data_key(current: &Option<DataKey>) -> Result<&[u8], MaterialError> {
    match current {
        None => Err(MaterialError::MissingDataKey),
        Some(k) => k.expose().map_err(|_| MaterialError::DataKeyZeroed),
    }
}

fn check_curve(suite: &AlgorithmSuite, actual: SignatureCurve) -> Result<(), MaterialError> {
    match suite.signature_curve {
        None => Err(MaterialError::UnsignedSuite(suite.id)),
        Some(expected) if expected != actual => Err(MaterialError::CurveMismatch { expected, actual }),
        Some(_) => Ok(()),
    }
}

/// Material for one encrypt call.
#[derive(Debug)]
pub struct EncryptionMaterial {
    suite: &'static AlgorithmSuite,
    context: EncryptionContext,
    data_key: Option<DataKey>,
    encrypted_data_keys: Vec<EncryptedDataKey>,
    signature_key: Option<SignatureKey>,
    keyring_trace: Vec<KeyringTrace>,
}

impl EncryptionMaterial {
    pub fn new(suite: &'static AlgorithmSuite, context: EncryptionContext) -> Self {
        Self {
            suite,
            context,
            data_key: None,
            encrypted_data_keys: Vec::new(),
            signature_key: None,
            keyring_trace: Vec::new(),
        }
    }

    pub fn suite(&self) -> &'static AlgorithmSuite {
        self.suite
    }

    pub fn context(&self) -> &EncryptionContext {
        &self.context
    }

    /// Set the plaintext data key. The trace must record that it was generated.
    pub fn set_unencrypted_data_key(
        &mut self,
        key: impl Into<Vec<u8>>,
        trace: KeyringTrace,
    ) -> Result<(), MaterialError> {
        let key = DataKey::new(key.into());
        check_new_data_key(self.suite, &self.data_key, &key)?;
        require_flags(&trace, KeyringTraceFlags::GENERATED_DATA_KEY)?;
        self.data_key = Some(key);
        self.keyring_trace.push(trace);
        Ok(())
    }

    pub fn unencrypted_data_key(&self) -> Result<&[u8], MaterialError> {
        read_data_key(&self.data_key)
    }

    pub fn has_unencrypted_data_key(&self) -> bool {
        self.data_key.as_ref().is_some_and(|k| !k.is_zeroed())
    }

    /// Wipe the data key. Idempotent.
    pub fn zero_unencrypted_data_key(&mut self) {
        if let Some(k) = self.data_key.as_mut() {
            k.zeroize_once();
        }
    }

    /// Attach a wrapped copy of the data key. Requires the data key to be set.
    pub fn add_encrypted_data_key(
        &mut self,
        edk: EncryptedDataKey,
        trace: KeyringTrace,
    ) -> Result<(), MaterialError> {
        read_data_key(&self.data_key)?;
        require_flags(&trace, KeyringTraceFlags::ENCRYPTED_DATA_KEY)?;
        self.encrypted_data_keys.push(edk);
        self.keyring_trace.push(trace);
        Ok(())
    }

    pub fn encrypted_data_keys(&self) -> &[EncryptedDataKey] {
        &self.encrypted_data_keys
    }

    pub fn set_signature_key(&mut self, key: SignatureKey) -> Result<(), MaterialError> {
        if self.signature_key.is_some() {
            return Err(MaterialError::SignatureKeyAlreadySet);
        }
        check_curve(self.suite, key.curve())?;
        self.signature_key = Some(key);
        Ok(())
    }

    pub fn signature_key(&self) -> Option<&SignatureKey> {
        self.signature_key.as_ref()
    }

    pub fn keyring_trace(&self) -> &[KeyringTrace] {
        &self.keyring_trace
    }
}

/// Material for one decrypt call.
#[derive(Debug)]
pub struct DecryptionMaterial {
    suite: &'static AlgorithmSuite,
    context: EncryptionContext,
    data_key: Option<DataKey>,
    verification_key: Option<VerificationKey>,
    keyring_trace: Vec<KeyringTrace>,
}

impl DecryptionMaterial {
    pub fn new(suite: &'static AlgorithmSuite, context: EncryptionContext) -> Self {
        Self {
            suite,
            context,
            data_key: None,
            verification_key: None,
            keyring_trace: Vec::new(),
        }
    }

    pub fn suite(&self) -> &'static AlgorithmSuite {
        self.suite
    }

    pub fn context(&self) -> &EncryptionContext {
        &self.context
    }

    /// Set the unwrapped data key. The trace must record that it was decrypted.
    pub fn set_unencrypted_data_key(
        &mut self,
        key: impl Into<Vec<u8>>,
        trace: KeyringTrace,
    ) -> Result<(), MaterialError> {
        let key = DataKey::new(key.into());
        check_new_data_key(self.suite, &self.data_key, &key)?;
        require_flags(&trace, KeyringTraceFlags::DECRYPTED_DATA_KEY)?;
        self.data_key = Some(key);
        self.keyring_trace.push(trace);
        Ok(())
    }

    pub fn unencrypted_data_key(&self) -> Result<&[u8], MaterialError> {
        read_data_key(&self.data_key)
    }

    pub fn has_unencrypted_data_key(&self) -> bool {
        self.data_key.as_ref().is_some_and(|k| !k.is_zeroed())
    }

    /// Wipe the data key. Idempotent.
    pub fn zero_unencrypted_data_key(&mut self) {
        if let Some(k) = self.data_key.as_mut() {
            k.zeroize_once();
        }
    }

    pub fn set_verification_key(&mut self, key: VerificationKey) -> Result<(), MaterialError> {
        if self.verification_key.is_some() {
            return Err(MaterialError::SignatureKeyAlreadySet);
        }
        check_curve(self.suite, key.curve())?;
        self.verification_key = Some(key);
        Ok(())
    }

    pub fn verification_key(&self) -> Option<&VerificationKey> {
        self.verification_key.as_ref()
    }

    pub fn keyring_trace(&self) -> &[KeyringTrace] {
        &self.keyring_trace
    }
}
