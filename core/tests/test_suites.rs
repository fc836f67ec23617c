#[cfg(test)]
mod tests {
    use envelope_core::suites::{AlgorithmSuite, AlgorithmSuiteId, Kdf, SignatureCurve};

    #[test]
    fn every_id_resolves_to_its_own_entry() {
        for id in AlgorithmSuiteId::ALL {
            let suite = id.suite();
            assert_eq!(suite.id, id);
            assert_eq!(AlgorithmSuite::from_wire(id as u16), Some(suite));
            assert_eq!(suite.iv_len, 12);
            assert_eq!(suite.tag_len, 16);
        }
    }

    #[test]
    fn registry_parameters() {
        let s = AlgorithmSuite::get(AlgorithmSuiteId::Aes128GcmIv12Tag16);
        assert_eq!((s.data_key_len, s.kdf, s.signature_curve), (16, Kdf::None, None));

        let s = AlgorithmSuite::get(AlgorithmSuiteId::Aes192GcmIv12Tag16HkdfSha256);
        assert_eq!((s.data_key_len, s.kdf, s.signature_curve), (24, Kdf::HkdfSha256, None));

        let s = AlgorithmSuite::get(AlgorithmSuiteId::Aes128GcmIv12Tag16HkdfSha256EcdsaP256);
        assert_eq!(s.signature_curve, Some(SignatureCurve::P256));
        assert!(s.is_signed());

        let s = AlgorithmSuiteId::DEFAULT.suite();
        assert_eq!(s.id as u16, 0x0378);
        assert_eq!((s.data_key_len, s.kdf, s.signature_curve), (32, Kdf::HkdfSha384, Some(SignatureCurve::P384)));
    }

    #[test]
    fn unknown_wire_ids() {
        assert!(AlgorithmSuite::from_wire(0x0000).is_none());
        assert!(AlgorithmSuite::from_wire(0x0478).is_none());
        assert_eq!(AlgorithmSuite::name(0x0378), "Aes256GcmIv12Tag16HkdfSha384EcdsaP384");
        assert_eq!(AlgorithmSuite::name(0xbeef), "0xbeef");
    }

    #[test]
    fn display_includes_hex_id() {
        let shown = AlgorithmSuiteId::Aes256GcmIv12Tag16.to_string();
        assert!(shown.ends_with("(0x0078)"), "{shown}");
    }
}
