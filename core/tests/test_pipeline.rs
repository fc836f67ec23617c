// End-to-end tests for the encrypt / decrypt pipelines:
//
// * round trip over every suite, framed and non-framed
// * tamper detection (header, header IV/tag, frame IV/ciphertext/tag, trailer)
// * incremental-feed invariance (1-byte and arbitrary chunking)
// * frame-length limit enforced before any key unwrap
// * sequence enforcement (swap, duplicate, drop, early final, truncation)
// * disposal after success and failure
// * concrete scenarios: "asdf" with a 0x01 key, context copy under ECDSA

mod common;

#[cfg(test)]
mod tests {
    use super::common::*;

    use envelope_core::constants::ENCODED_SIGNER_KEY;
    use envelope_core::headers::serialize_message_header;
    use envelope_core::materials::DefaultMaterialsManager;
    use envelope_core::prelude::*;
    use envelope_core::telemetry::Stage;
    use pollster::block_on;
    use proptest::prelude::*;

    const UNSIGNED: AlgorithmSuiteId = AlgorithmSuiteId::Aes256GcmIv12Tag16HkdfSha256;
    const SIGNED: AlgorithmSuiteId = AlgorithmSuiteId::Aes256GcmIv12Tag16HkdfSha384EcdsaP384;

    fn context() -> EncryptionContext {
        [("purpose", "test")].into_iter().collect()
    }

    fn params(suite: AlgorithmSuiteId, frame_length: u32) -> EncryptParams {
        EncryptParams { suite_id: Some(suite), context: context(), frame_length, ..Default::default() }
    }

    fn enc(suite: AlgorithmSuiteId, pt: &[u8], frame_length: u32) -> EncryptOutput {
        block_on(encrypt(&manager(), pt, params(suite, frame_length))).unwrap()
    }

    fn dec(ct: &[u8]) -> Result<DecryptOutput, StreamError> {
        block_on(decrypt(&manager(), ct, DecryptParams::default()))
    }

    /// Header + header IV + header tag.
    fn header_len(out: &EncryptOutput) -> usize {
        let suite = out.message_header.suite();
        serialize_message_header(&out.message_header).unwrap().len() + suite.iv_len + suite.tag_len
    }

    fn without_signer_key(ctx: &EncryptionContext) -> EncryptionContext {
        ctx.iter().filter(|(k, _)| *k != ENCODED_SIGNER_KEY).collect()
    }

    fn decrypt_in_chunks(ct: &[u8], sizes: &[usize]) -> Result<(Vec<DecryptEvent>, Vec<u8>), StreamError> {
        let m = manager();
        let mut d = Decryptor::new(&m, DecryptParams::default())?;
        let mut events = Vec::new();
        let mut pt = Vec::new();
        let mut rest = ct;
        let mut i = 0;
        while !rest.is_empty() {
            let n = sizes[i % sizes.len()].clamp(1, rest.len());
            let (chunk, tail) = rest.split_at(n);
            for ev in block_on(d.update(chunk))? {
                if let DecryptEvent::Plaintext(b) = &ev {
                    pt.extend_from_slice(b);
                }
                events.push(ev);
            }
            rest = tail;
            i += 1;
        }
        d.finish()?;
        Ok((events, pt))
    }

    // # ✅ 1. Round trip

    #[test]
    fn roundtrip_every_suite_and_boundary_length() {
        let frame = 64u32;
        for suite in AlgorithmSuiteId::ALL {
            for len in [0usize, 1, 63, 64, 65, 192, 200] {
                let pt = plaintext(len);
                let out = enc(suite, &pt, frame);
                let back = dec(&out.ciphertext).unwrap();

                assert_eq!(back.plaintext, pt, "suite {suite} len {len}");
                assert_eq!(back.message_header, out.message_header);
                assert_eq!(without_signer_key(&back.message_header.encryption_context), context());
                assert_eq!(
                    back.message_header.encryption_context.contains_key(ENCODED_SIGNER_KEY),
                    suite.suite().is_signed()
                );
            }
        }
    }

    #[test]
    fn roundtrip_non_framed() {
        for suite in [AlgorithmSuiteId::Aes128GcmIv12Tag16, UNSIGNED, SIGNED] {
            for len in [0usize, 1, 5000] {
                let pt = plaintext(len);
                let p = EncryptParams { content_type: ContentType::NonFramed, ..params(suite, 4096) };
                let out = block_on(encrypt(&manager(), &pt, p)).unwrap();
                assert_eq!(out.message_header.content_type, ContentType::NonFramed);
                assert_eq!(out.message_header.frame_length, 0);

                let back = dec(&out.ciphertext).unwrap();
                assert_eq!(back.plaintext, pt);
            }
        }
    }

    #[test]
    fn exact_multiple_of_frame_length_ends_with_empty_final_frame() {
        let out = enc(UNSIGNED, &plaintext(128), 64);
        let h = header_len(&out);
        // two regular frames + empty final frame
        let regular = 4 + 12 + 64 + 16;
        let final_empty = 4 + 4 + 12 + 4 + 16;
        assert_eq!(out.ciphertext.len(), h + 2 * regular + final_empty);
        assert_eq!(&out.ciphertext[h + 2 * regular..h + 2 * regular + 4], &[0xff; 4]);
    }

    #[test]
    fn distinct_messages_get_distinct_ids() {
        let a = enc(UNSIGNED, b"same", 64);
        let b = enc(UNSIGNED, b"same", 64);
        assert_ne!(a.message_header.message_id, b.message_header.message_id);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    // # ✅ 2. Concrete scenarios

    #[test]
    fn asdf_with_unit_key_and_no_kdf() {
        let m = DefaultMaterialsManager::new(StaticKeyring::new(0x01));
        let p = EncryptParams { suite_id: Some(AlgorithmSuiteId::Aes128GcmIv12Tag16), ..Default::default() };
        let out = block_on(encrypt(&m, b"asdf", p)).unwrap();
        assert_eq!(out.message_header.frame_length, 4096);

        let back = block_on(decrypt(&m, &out.ciphertext, DecryptParams::default())).unwrap();
        assert_eq!(back.plaintext, b"asdf");
        assert!(!back.message_header.encryption_context.contains_key(ENCODED_SIGNER_KEY));
        assert!(back.message_header.encryption_context.is_empty());
    }

    #[test]
    fn signing_suite_returns_a_new_context_and_leaves_input_alone() {
        let input = context();
        let p = EncryptParams { suite_id: Some(SIGNED), context: input.clone(), ..Default::default() };
        let out = block_on(encrypt(&manager(), b"asdf", p)).unwrap();

        // caller's value untouched
        assert_eq!(input, context());
        assert!(!input.contains_key(ENCODED_SIGNER_KEY));

        let back = dec(&out.ciphertext).unwrap();
        assert_eq!(back.plaintext, b"asdf");
        let returned = &back.message_header.encryption_context;
        assert!(returned.contains_key(ENCODED_SIGNER_KEY));
        assert_ne!(returned, &input);
        assert_eq!(without_signer_key(returned), input);
    }

    #[test]
    fn default_suite_signs() {
        let out = block_on(encrypt(&manager(), b"x", EncryptParams::default())).unwrap();
        assert_eq!(out.message_header.suite_id, AlgorithmSuiteId::DEFAULT);
        assert!(out.message_header.encryption_context.contains_key(ENCODED_SIGNER_KEY));
    }

    // # ✅ 3. Tamper detection

    fn assert_auth_failure(ct: &[u8], offset: usize) {
        let mut bad = ct.to_vec();
        bad[offset] ^= 0x01;
        let err = dec(&bad).expect_err("tampered message decrypted");
        assert_eq!(err.kind(), ErrorKind::Authentication, "offset {offset}: {err}");
    }

    #[test]
    fn single_byte_flips_fail_authentication_unsigned() {
        // 80 bytes / 32 → two regular frames and a 16-byte final frame
        let out = enc(UNSIGNED, &plaintext(80), 32);
        let ct = &out.ciphertext;
        let h = header_len(&out);
        let regular = 4 + 12 + 32 + 16;
        let final_start = h + 2 * regular;

        let message_id = 4;
        // version, type, suite, id (20) | aad_len | count | klen | "purpose" | vlen | value
        let context_value = 20 + 2 + 2 + 2 + "purpose".len() + 2;
        assert_eq!(&ct[context_value..context_value + 4], b"test");

        let offsets = [
            message_id,
            context_value,
            h - 28,                         // header IV
            h - 1,                          // header tag
            h + 4,                          // frame 1 IV
            h + 16,                         // frame 1 ciphertext
            h + regular - 1,                // frame 1 tag
            h + regular + 20,               // frame 2 ciphertext
            final_start + 8,                // final frame IV
            final_start + 4 + 4 + 12 + 4,   // final frame ciphertext
            ct.len() - 1,                   // final frame tag
        ];
        for offset in offsets {
            assert_auth_failure(ct, offset);
        }
    }

    #[test]
    fn single_byte_flips_fail_authentication_signed() {
        let out = enc(SIGNED, &plaintext(80), 32);
        let ct = &out.ciphertext;
        let h = header_len(&out);

        for offset in [4, h - 20, h - 1, h + 16, h + 70] {
            assert_auth_failure(ct, offset);
        }

        // trailer: flip inside the DER signature body
        assert_auth_failure(ct, ct.len() - 1);
        assert_auth_failure(ct, ct.len() - 10);
    }

    #[test]
    fn signature_from_another_message_is_rejected() {
        let a = enc(SIGNED, b"first", 64);
        let b = enc(SIGNED, b"first", 64);
        let sig_len = |ct: &[u8], h: usize| {
            let body = 4 + 4 + 12 + 4 + 5 + 16;
            u16::from_be_bytes([ct[h + body], ct[h + body + 1]]) as usize + 2
        };
        let (ha, hb) = (header_len(&a), header_len(&b));
        let ta = a.ciphertext.len() - sig_len(&a.ciphertext, ha);
        let tb = b.ciphertext.len() - sig_len(&b.ciphertext, hb);

        let mut spliced = a.ciphertext[..ta].to_vec();
        spliced.extend_from_slice(&b.ciphertext[tb..]);
        let err = dec(&spliced).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn missing_trailer_is_a_format_error() {
        let out = enc(SIGNED, b"abc", 64);
        let h = header_len(&out);
        let body = 4 + 4 + 12 + 4 + 3 + 16;
        let err = dec(&out.ciphertext[..h + body]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    // # ✅ 4. Incremental feed invariance

    #[test]
    fn one_byte_chunks_match_whole_input() {
        for suite in [UNSIGNED, SIGNED] {
            let pt = plaintext(150);
            let out = enc(suite, &pt, 32);
            let whole = dec(&out.ciphertext).unwrap();

            let (events, chunked) = decrypt_in_chunks(&out.ciphertext, &[1]).unwrap();
            assert_eq!(chunked, whole.plaintext);
            match &events[0] {
                DecryptEvent::MessageHeader(h) => assert_eq!(h, &whole.message_header),
                other => panic!("first event was {other:?}"),
            }
            assert!(matches!(events[1], DecryptEvent::MaterialReady { suite_id, .. } if suite_id == suite));
        }
    }

    #[test]
    fn notifications_precede_plaintext() {
        let out = enc(UNSIGNED, &plaintext(100), 16);
        let (events, _) = decrypt_in_chunks(&out.ciphertext, &[out.ciphertext.len()]).unwrap();
        let first_plain = events.iter().position(|e| matches!(e, DecryptEvent::Plaintext(_))).unwrap();
        assert_eq!(first_plain, 2);
        assert!(matches!(events[0], DecryptEvent::MessageHeader(_)));
        assert!(matches!(events[1], DecryptEvent::MaterialReady { signed: false, .. }));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn arbitrary_chunking_yields_same_plaintext(
            len in 0usize..600,
            frame in 1u32..128,
            sizes in proptest::collection::vec(1usize..97, 1..8),
        ) {
            let pt = plaintext(len);
            let out = enc(UNSIGNED, &pt, frame);
            let (events, chunked) = decrypt_in_chunks(&out.ciphertext, &sizes).unwrap();
            prop_assert_eq!(&chunked, &pt);
            let header_events = events.iter().filter(|e| matches!(e, DecryptEvent::MessageHeader(_))).count();
            prop_assert_eq!(header_events, 1);
        }

        #[test]
        fn encrypt_chunking_does_not_change_body_layout(
            len in 0usize..400,
            sizes in proptest::collection::vec(1usize..50, 1..6),
        ) {
            let pt = plaintext(len);
            let m = manager();
            let mut e = block_on(encryptor(&m, params(UNSIGNED, 40))).unwrap();
            let mut ct = e.header_bytes().to_vec();
            let mut rest = pt.as_slice();
            let mut i = 0;
            while !rest.is_empty() {
                let n = sizes[i % sizes.len()].min(rest.len());
                ct.extend_from_slice(&e.update(&rest[..n]).unwrap());
                rest = &rest[n..];
                i += 1;
            }
            ct.extend_from_slice(&e.finish().unwrap());

            let whole = enc(UNSIGNED, &pt, 40);
            prop_assert_eq!(ct.len(), whole.ciphertext.len());
            prop_assert_eq!(dec(&ct).unwrap().plaintext, pt);
        }
    }

    // # ✅ 5. Frame-length bound before unwrap

    #[test]
    fn frame_length_over_limit_rejected_before_unwrap() {
        let out = enc(UNSIGNED, &plaintext(10), 4096);
        let m = CountingManager::new();

        let err = block_on(decrypt(&m, &out.ciphertext, DecryptParams { max_body_size: Some(1024) })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
        assert_eq!(m.decrypts(), 0);

        // byte at a time: still no unwrap
        let mut d = Decryptor::new(&m, DecryptParams { max_body_size: Some(1024) }).unwrap();
        let mut failed = None;
        for b in &out.ciphertext {
            if let Err(e) = block_on(d.update(std::slice::from_ref(b))) {
                failed = Some(e);
                break;
            }
        }
        assert_eq!(failed.unwrap().kind(), ErrorKind::LimitExceeded);
        assert_eq!(m.decrypts(), 0);

        // at the limit is fine
        let ok = block_on(decrypt(&m, &out.ciphertext, DecryptParams { max_body_size: Some(4096) })).unwrap();
        assert_eq!(ok.plaintext, plaintext(10));
        assert_eq!(m.decrypts(), 1);
    }

    #[test]
    fn non_framed_body_limit_applies_after_unwrap() {
        let p = EncryptParams { content_type: ContentType::NonFramed, ..params(UNSIGNED, 4096) };
        let out = block_on(encrypt(&manager(), &plaintext(100), p)).unwrap();
        let m = CountingManager::new();

        let err = block_on(decrypt(&m, &out.ciphertext, DecryptParams { max_body_size: Some(10) })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
        assert_eq!(m.decrypts(), 1);

        let ok = block_on(decrypt(&m, &out.ciphertext, DecryptParams { max_body_size: Some(100) })).unwrap();
        assert_eq!(ok.plaintext, plaintext(100));
    }

    // # ✅ 6. Sequence enforcement

    /// header, three 16-byte regular frames, empty final frame
    fn sequenced() -> (Vec<u8>, Vec<Vec<u8>>, Vec<u8>) {
        let out = enc(UNSIGNED, &plaintext(48), 16);
        let h = header_len(&out);
        let regular = 4 + 12 + 16 + 16;
        let ct = out.ciphertext;
        let frames = (0..3).map(|i| ct[h + i * regular..h + (i + 1) * regular].to_vec()).collect();
        let final_frame = ct[h + 3 * regular..].to_vec();
        (ct[..h].to_vec(), frames, final_frame)
    }

    fn assemble(header: &[u8], parts: &[&[u8]]) -> Vec<u8> {
        let mut out = header.to_vec();
        for p in parts {
            out.extend_from_slice(p);
        }
        out
    }

    #[test]
    fn untouched_sequence_decrypts() {
        let (h, f, fin) = sequenced();
        let ct = assemble(&h, &[&f[0], &f[1], &f[2], &fin]);
        assert_eq!(dec(&ct).unwrap().plaintext, plaintext(48));
    }

    #[test]
    fn sequence_violations_are_sequence_errors() {
        let (h, f, fin) = sequenced();
        let cases: Vec<(&str, Vec<u8>)> = vec![
            ("swap", assemble(&h, &[&f[1], &f[0], &f[2], &fin])),
            ("duplicate", assemble(&h, &[&f[0], &f[0], &f[1], &f[2], &fin])),
            ("drop", assemble(&h, &[&f[0], &f[2], &fin])),
            ("early final", assemble(&h, &[&f[0], &fin])),
            ("truncated", assemble(&h, &[&f[0], &f[1], &f[2]])),
            ("no frames", assemble(&h, &[])),
        ];
        for (name, ct) in cases {
            let err = dec(&ct).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Sequence, "{name}: {err}");
        }
    }

    #[test]
    fn bytes_after_final_frame_are_a_format_error() {
        let (h, f, fin) = sequenced();
        let mut ct = assemble(&h, &[&f[0], &f[1], &f[2], &fin]);
        ct.push(0);
        assert_eq!(dec(&ct).unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn truncated_header_is_a_format_error() {
        let out = enc(UNSIGNED, b"abc", 64);
        let err = dec(&out.ciphertext[..10]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    // # ✅ 7. Disposal

    #[test]
    fn encryptor_disposes_on_finish() {
        let m = manager();
        let mut e = block_on(encryptor(&m, params(SIGNED, 64))).unwrap();
        assert!(!e.is_disposed());
        e.update(b"hello").unwrap();
        e.finish().unwrap();
        assert!(e.is_disposed());
        assert!(matches!(e.update(b"more"), Err(StreamError::Aborted(_))));
    }

    #[test]
    fn decryptor_disposes_on_success_and_failure() {
        let out = enc(UNSIGNED, &plaintext(40), 16);
        let m = manager();

        let mut d = Decryptor::new(&m, DecryptParams::default()).unwrap();
        block_on(d.update(&out.ciphertext)).unwrap();
        assert!(!d.is_disposed());
        d.finish().unwrap();
        assert!(d.is_disposed());
        d.dispose(); // second disposal is a no-op
        assert!(d.is_disposed());

        let mut bad = out.ciphertext.clone();
        let last = bad.len() - 1;
        bad[last] ^= 0xff;
        let mut d = Decryptor::new(&m, DecryptParams::default()).unwrap();
        let err = block_on(d.update(&bad)).unwrap_err();
        assert!(err.is_authentication());
        assert!(d.is_disposed());
        assert!(matches!(block_on(d.update(b"x")), Err(StreamError::Aborted(_))));
        assert!(matches!(d.finish(), Err(StreamError::Aborted(_))));
    }

    #[test]
    fn failed_frame_releases_no_plaintext_from_same_chunk() {
        let (h, f, fin) = sequenced();
        let mut bad = f[2].clone();
        let last = bad.len() - 1;
        bad[last] ^= 0x01; // third frame tag

        let m = manager();
        let mut d = Decryptor::new(&m, DecryptParams::default()).unwrap();
        let released = |events: &[DecryptEvent]| -> Vec<u8> {
            events
                .iter()
                .filter_map(|e| match e {
                    DecryptEvent::Plaintext(b) => Some(b.to_vec()),
                    _ => None,
                })
                .flatten()
                .collect()
        };

        let first = block_on(d.update(&assemble(&h, &[&f[0]]))).unwrap();
        assert_eq!(released(&first), plaintext(48)[..16].to_vec());

        // frame 2 is valid but shares a chunk with the broken frame 3
        let rest = assemble(&[], &[&f[1], &bad, &fin]);
        let err = block_on(d.update(&rest)).unwrap_err();
        assert!(err.is_authentication());
        assert!(d.is_disposed());
        assert!(matches!(block_on(d.update(&fin)), Err(StreamError::Aborted(_))));
    }

    // # ✅ 8. Input validation

    #[test]
    fn reserved_context_key_is_rejected_before_materials() {
        let m = CountingManager::new();
        let p = EncryptParams {
            context: context().with_entry(ENCODED_SIGNER_KEY, "AAAA"),
            ..Default::default()
        };
        let err = block_on(encrypt(&m, b"x", p)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert_eq!(m.encrypts(), 0);
    }

    #[test]
    fn zero_frame_length_is_rejected() {
        let m = CountingManager::new();
        let err = block_on(encrypt(&m, b"x", params(UNSIGNED, 0))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert_eq!(m.encrypts(), 0);
    }

    #[test]
    fn declared_length_must_match() {
        let m = manager();
        let p = EncryptParams { plaintext_length: Some(3), ..params(UNSIGNED, 64) };
        let mut e = block_on(encryptor(&m, p.clone())).unwrap();
        assert_eq!(e.update(b"abcd").unwrap_err().kind(), ErrorKind::InputValidation);
        assert!(e.is_disposed());

        let mut e = block_on(encryptor(&m, p)).unwrap();
        e.update(b"ab").unwrap();
        assert_eq!(e.finish().unwrap_err().kind(), ErrorKind::InputValidation);
    }

    #[test]
    fn keyring_without_key_fails_decrypt() {
        let out = enc(UNSIGNED, b"abc", 64);
        let m = DefaultMaterialsManager::new(EmptyKeyring);
        let err = block_on(decrypt(&m, &out.ciphertext, DecryptParams::default())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
    }

    #[test]
    fn signing_suite_without_signing_key_is_refused() {
        let m = KeylessSigningManager;
        let err = block_on(encrypt(&m, b"hello", params(SIGNED, 64))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert!(matches!(err, StreamError::Material(MaterialError::MissingSignatureKey(SIGNED))));
    }

    #[test]
    fn signing_suite_without_verification_key_is_refused() {
        let out = enc(SIGNED, b"hello", 64);
        let m = KeylessSigningManager;
        let mut d = Decryptor::new(&m, DecryptParams::default()).unwrap();
        let err = block_on(d.update(&out.ciphertext)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert!(matches!(err, StreamError::Material(MaterialError::MissingVerificationKey(SIGNED))));
        assert!(matches!(d.finish(), Err(StreamError::Aborted(_))));
    }

    #[test]
    fn unsigned_suite_works_with_keyless_manager() {
        let m = KeylessSigningManager;
        let out = block_on(encrypt(&m, b"hello", params(UNSIGNED, 64))).unwrap();
        let back = block_on(decrypt(&m, &out.ciphertext, DecryptParams::default())).unwrap();
        assert_eq!(back.plaintext, b"hello");
    }

    #[test]
    fn bare_keyring_converts_into_default_manager() {
        let m: DefaultMaterialsManager<StaticKeyring> = StaticKeyring::new(0x01).into();
        let out = block_on(encrypt(&m, b"abc", params(UNSIGNED, 64))).unwrap();
        assert_eq!(dec(&out.ciphertext).unwrap().plaintext, b"abc");
    }

    #[test]
    fn tampered_edk_fails_header_authentication() {
        let out = enc(UNSIGNED, b"abc", 64);
        let mut ct = out.ciphertext.clone();
        let h = header_len(&out);
        // raw header ends with content_type | reserved[4] | iv_len | frame_length[4]
        let last_edk_byte = h - 28 - 4 - 1 - 4 - 1 - 1;
        ct[last_edk_byte] ^= 0x10;
        let err = dec(&ct).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    // # ✅ 9. Streaming drivers

    #[test]
    fn stream_roundtrip_with_telemetry() {
        let pt = plaintext(10_000);
        let m = manager();
        let config = ApiConfig::new(Some(true), Some(777));

        let enc_snap = block_on(encrypt_stream(
            &m,
            InputSource::Memory(pt.clone()),
            OutputSink::Memory,
            params(SIGNED, 1024),
            config.clone(),
        ))
        .unwrap();
        let ct = enc_snap.output.clone().unwrap();
        assert_eq!(enc_snap.frames_regular, 9);
        assert_eq!(enc_snap.frames_final, 1);
        assert_eq!(enc_snap.bytes_plaintext, pt.len() as u64);
        assert_eq!(enc_snap.wire_bytes(), ct.len() as u64);
        assert!(enc_snap.has_all_stages(&[Stage::Materials, Stage::Header, Stage::Encrypt, Stage::Sign, Stage::Read, Stage::Write]));
        assert!(enc_snap.sanity_check());

        let dec_snap = block_on(decrypt_stream(
            &m,
            InputSource::Memory(ct.clone()),
            OutputSink::Memory,
            DecryptParams::default(),
            config,
        ))
        .unwrap();
        assert_eq!(dec_snap.output.as_deref(), Some(pt.as_slice()));
        assert_eq!(dec_snap.frames_regular, 9);
        assert_eq!(dec_snap.wire_bytes(), ct.len() as u64);
        assert!(dec_snap.has_all_stages(&[Stage::Materials, Stage::Header, Stage::Decrypt, Stage::Verify, Stage::Read]));
        assert!(dec_snap.sanity_check());

        let json = dec_snap.to_json().unwrap();
        assert!(json.contains("\"frames_regular\":9"));
    }

    #[test]
    fn stream_rejects_bad_chunk_size() {
        let m = CountingManager::new();
        let err = block_on(encrypt_stream(
            &m,
            InputSource::Memory(vec![1, 2, 3]),
            OutputSink::Memory,
            EncryptParams::default(),
            ApiConfig::new(None, Some(0)),
        ))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert_eq!(m.encrypts(), 0);
    }
}
