// ECDSA signer/verifier and the pipeline signature stage.

mod common;

#[cfg(test)]
mod tests {
    use super::common::*;

    use envelope_core::crypto::{CryptoError, SignatureKey, Signer, Verifier, VerificationKey};
    use envelope_core::materials::{DecryptHelper, DecryptionMaterial, EncryptHelper, EncryptionRequest, MaterialsManager};
    use envelope_core::materials::{KeyringTrace, KeyringTraceFlags};
    use envelope_core::stream::framing::decode_trailer;
    use envelope_core::stream::SignatureStage;
    use envelope_core::suites::{AlgorithmSuiteId, SignatureCurve};
    use envelope_core::types::ErrorKind;
    use pollster::block_on;

    fn sign(key: &SignatureKey, parts: &[&str]) -> Vec<u8> {
        let mut signer = Signer::new(key.clone());
        for p in parts {
            signer.update(p.as_bytes());
        }
        signer.finish().unwrap()
    }

    fn verify(key: VerificationKey, parts: &[&str], sig: &[u8]) -> Result<(), CryptoError> {
        let mut verifier = Verifier::new(key);
        for p in parts {
            verifier.update(p.as_bytes());
        }
        verifier.verify(sig)
    }

// # ✅ 1. Signer / Verifier

    #[test]
    fn sign_verify_both_curves() {
        for curve in [SignatureCurve::P256, SignatureCurve::P384] {
            let key = SignatureKey::generate(curve);
            let sig = sign(&key, &["header", "frame"]);
            // DER SEQUENCE
            assert_eq!(sig[0], 0x30);
            // digest is streaming: split points do not matter
            verify(key.verification_key(), &["head", "erframe"], &sig).unwrap();
        }
    }

    #[test]
    fn altered_data_or_wrong_key_rejected() {
        let key = SignatureKey::generate(SignatureCurve::P256);
        let sig = sign(&key, &["message"]);

        let err = verify(key.verification_key(), &["messagE"], &sig).unwrap_err();
        assert!(matches!(err, CryptoError::SignatureMismatch));

        let other = SignatureKey::generate(SignatureCurve::P256);
        assert!(verify(other.verification_key(), &["message"], &sig).is_err());

        let p384 = SignatureKey::generate(SignatureCurve::P384);
        assert!(verify(p384.verification_key(), &["message"], &sig).is_err());
    }

    #[test]
    fn malformed_der_rejected() {
        let key = SignatureKey::generate(SignatureCurve::P384);
        let mut sig = sign(&key, &["m"]);
        sig.truncate(sig.len() - 3);
        let err = verify(key.verification_key(), &["m"], &sig).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(verify(key.verification_key(), &["m"], &[]).is_err());
    }

    #[test]
    fn verification_key_sec1_roundtrip() {
        let key = SignatureKey::generate(SignatureCurve::P256);
        let point = key.verification_key().to_sec1_compressed();
        assert_eq!(point.len(), 33);
        let parsed = VerificationKey::from_sec1(SignatureCurve::P256, &point).unwrap();
        let sig = sign(&key, &["abc"]);
        verify(parsed, &["abc"], &sig).unwrap();

        assert!(VerificationKey::from_sec1(SignatureCurve::P384, &point).is_err());
    }

// # ✅ 2. Stage

    fn helpers(suite: AlgorithmSuiteId) -> (EncryptHelper, DecryptHelper) {
        let request = EncryptionRequest {
            suite_id: Some(suite),
            context: Default::default(),
            frame_length: 64,
            plaintext_length: None,
        };
        let material = block_on(manager().get_encryption_materials(request)).unwrap();

        let mut dm = DecryptionMaterial::new(suite.suite(), material.context().clone());
        dm.set_unencrypted_data_key(
            material.unencrypted_data_key().unwrap().to_vec(),
            KeyringTrace::new("t", "t", KeyringTraceFlags::DECRYPTED_DATA_KEY),
        )
        .unwrap();
        if let Some(key) = material.signature_key() {
            dm.set_verification_key(key.verification_key()).unwrap();
        }

        let info = [0u8; 4];
        (EncryptHelper::new(material, &info).unwrap(), DecryptHelper::new(dm, &info).unwrap())
    }

    #[test]
    fn stage_signs_and_verifies_trailer() {
        let (enc, dec) = helpers(AlgorithmSuiteId::Aes128GcmIv12Tag16HkdfSha256EcdsaP256);

        let mut signing = SignatureStage::for_encrypt(&enc);
        assert!(signing.is_signed());
        signing.update(b"header bytes");
        signing.update(b"frame bytes");
        let trailer = signing.finish_sign().unwrap().unwrap();

        let (der, used) = decode_trailer(&trailer).unwrap();
        assert_eq!(used, trailer.len());

        let mut verifying = SignatureStage::for_decrypt(&dec);
        assert!(verifying.is_signed());
        verifying.update(b"header bytesframe bytes");
        verifying.finish_verify(der).unwrap();

        let mut tampered = SignatureStage::for_decrypt(&dec);
        tampered.update(b"header bytesframe bytez");
        let err = tampered.finish_verify(der).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn unsigned_suite_is_passthrough() {
        let (enc, dec) = helpers(AlgorithmSuiteId::Aes256GcmIv12Tag16HkdfSha256);

        let mut stage = SignatureStage::for_encrypt(&enc);
        assert!(!stage.is_signed());
        stage.update(b"ignored");
        assert!(stage.finish_sign().unwrap().is_none());

        let stage = SignatureStage::for_decrypt(&dec);
        assert!(!stage.is_signed());
        let err = stage.finish_verify(b"\x30\x00").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
    }

    #[test]
    fn stage_direction_is_enforced() {
        let (enc, dec) = helpers(AlgorithmSuiteId::Aes256GcmIv12Tag16HkdfSha384EcdsaP384);
        assert!(SignatureStage::for_encrypt(&enc).finish_verify(&[]).is_err());
        assert!(SignatureStage::for_decrypt(&dec).finish_sign().is_err());
    }
}
