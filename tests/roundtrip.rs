//! Round-trip laws and tamper tests exercised through the public API.

use http_ece::{
    aes128gcm_encrypt, aes128gcm_encrypt_with_keys, aes128gcm_payload_max_length,
    aesgcm_ciphertext_max_length, generate_keypair, webpush_aes128gcm_decrypt,
    webpush_aesgcm_decrypt, webpush_aesgcm_encrypt_with_keys, Error, HEADER_LENGTH,
    PUBLIC_KEY_LENGTH, SALT_LENGTH,
};
use proptest::prelude::*;

const AUTH_SECRET: [u8; 16] = [0x42; 16];
const SALT: [u8; SALT_LENGTH] = [
    0x1f, 0x2e, 0x3d, 0x4c, 0x5b, 0x6a, 0x79, 0x88, 0x97, 0xa6, 0xb5, 0xc4, 0xd3, 0xe2, 0xf1,
    0x00,
];

fn keypair() -> (Vec<u8>, Vec<u8>) {
    let (private, public) = generate_keypair().unwrap();
    (private.to_vec(), public.to_vec())
}

fn encrypt_aes128gcm(
    sender_priv: &[u8],
    recv_pub: &[u8],
    rs: u32,
    pad_len: usize,
    plaintext: &[u8],
) -> Result<Vec<u8>, Error> {
    aes128gcm_encrypt_with_keys(sender_priv, &AUTH_SECRET, &SALT, recv_pub, rs, pad_len, plaintext)
}

// ---------------------------------------------------------------------------
// aes128gcm round trips
// ---------------------------------------------------------------------------

#[test]
fn aes128gcm_roundtrip_basic() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();
    let plaintext = b"I am the walrus";

    for &(rs, pad_len) in &[(4096, 0), (4096, 32), (24, 0), (18, 0), (18, 8), (25, 7)] {
        let payload = encrypt_aes128gcm(&sender_priv, &recv_pub, rs, pad_len, plaintext)
            .unwrap_or_else(|err| panic!("encrypt rs={rs} pad={pad_len}: {err}"));
        assert!(payload.len() <= aes128gcm_payload_max_length(rs, pad_len, plaintext.len()));

        let out = webpush_aes128gcm_decrypt(&recv_priv, &AUTH_SECRET, &payload)
            .unwrap_or_else(|err| panic!("decrypt rs={rs} pad={pad_len}: {err}"));
        assert_eq!(out, plaintext, "rs={rs} pad={pad_len}");
    }
}

#[test]
fn aes128gcm_roundtrip_generated_sender() {
    let (recv_priv, recv_pub) = keypair();
    let plaintext = vec![0xA5u8; 2000];

    let payload = aes128gcm_encrypt(&recv_pub, &AUTH_SECRET, 4096, 0, &plaintext).unwrap();
    let out = webpush_aes128gcm_decrypt(&recv_priv, &AUTH_SECRET, &payload).unwrap();
    assert_eq!(out, plaintext);
}

#[test]
fn aes128gcm_encrypt_is_deterministic() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();
    let plaintext = b"I am the walrus";

    let first = encrypt_aes128gcm(&sender_priv, &recv_pub, 25, 0, plaintext).unwrap();
    let second = encrypt_aes128gcm(&sender_priv, &recv_pub, 25, 0, plaintext).unwrap();
    assert_eq!(first, second);

    let out = webpush_aes128gcm_decrypt(&recv_priv, &AUTH_SECRET, &first).unwrap();
    assert_eq!(out, plaintext);
}

// ---------------------------------------------------------------------------
// aes128gcm tampering
// ---------------------------------------------------------------------------

#[test]
fn aes128gcm_tampered_record_fails() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();
    let payload = encrypt_aes128gcm(&sender_priv, &recv_pub, 4096, 0, b"data").unwrap();

    let ciphertext_start = HEADER_LENGTH + PUBLIC_KEY_LENGTH;
    for i in ciphertext_start..payload.len() {
        let mut tampered = payload.clone();
        tampered[i] ^= 0x01;
        assert_eq!(
            webpush_aes128gcm_decrypt(&recv_priv, &AUTH_SECRET, &tampered),
            Err(Error::Decrypt),
            "byte {i}"
        );
    }
}

#[test]
fn aes128gcm_tampered_salt_fails() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();
    let payload = encrypt_aes128gcm(&sender_priv, &recv_pub, 4096, 0, b"data").unwrap();

    for i in 0..SALT_LENGTH {
        let mut tampered = payload.clone();
        tampered[i] ^= 0x01;
        assert_eq!(
            webpush_aes128gcm_decrypt(&recv_priv, &AUTH_SECRET, &tampered),
            Err(Error::Decrypt),
            "salt byte {i}"
        );
    }
}

#[test]
fn aes128gcm_header_rs_too_small_fails() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();
    let payload = encrypt_aes128gcm(&sender_priv, &recv_pub, 4096, 0, b"data").unwrap();

    for rs in [0u32, 2, 17] {
        let mut tampered = payload.clone();
        tampered[SALT_LENGTH..SALT_LENGTH + 4].copy_from_slice(&rs.to_be_bytes());
        assert_eq!(
            webpush_aes128gcm_decrypt(&recv_priv, &AUTH_SECRET, &tampered),
            Err(Error::InvalidRecordSize),
            "rs={rs}"
        );
    }
}

#[test]
fn aes128gcm_truncated_header_fails() {
    let (recv_priv, _) = keypair();
    for len in [0, 1, 20] {
        assert_eq!(
            webpush_aes128gcm_decrypt(&recv_priv, &AUTH_SECRET, &vec![0u8; len]),
            Err(Error::InvalidHeader),
            "payload of {len} bytes"
        );
    }
}

#[test]
fn aes128gcm_empty_ciphertext_fails() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();
    let payload = encrypt_aes128gcm(&sender_priv, &recv_pub, 4096, 0, b"data").unwrap();

    // Keep the header and key id, drop every record.
    let header_only = &payload[..HEADER_LENGTH + PUBLIC_KEY_LENGTH];
    assert_eq!(
        webpush_aes128gcm_decrypt(&recv_priv, &AUTH_SECRET, header_only),
        Err(Error::ZeroCiphertext)
    );
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[test]
fn rejects_bad_input_lengths() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();

    assert_eq!(
        encrypt_aes128gcm(&sender_priv, &recv_pub, 4096, 0, b""),
        Err(Error::ZeroPlaintext)
    );
    assert_eq!(
        encrypt_aes128gcm(&sender_priv[..31], &recv_pub, 4096, 0, b"x"),
        Err(Error::InvalidPrivateKey)
    );
    assert_eq!(
        encrypt_aes128gcm(&sender_priv, &recv_pub[..64], 4096, 0, b"x"),
        Err(Error::InvalidPublicKey)
    );
    assert_eq!(
        aes128gcm_encrypt_with_keys(&sender_priv, &AUTH_SECRET[..15], &SALT, &recv_pub, 4096, 0, b"x"),
        Err(Error::InvalidAuthSecret)
    );
    assert_eq!(
        aes128gcm_encrypt_with_keys(&sender_priv, &AUTH_SECRET, &SALT[..15], &recv_pub, 4096, 0, b"x"),
        Err(Error::InvalidSalt)
    );
    assert_eq!(
        encrypt_aes128gcm(&sender_priv, &recv_pub, 17, 0, b"x"),
        Err(Error::InvalidRecordSize)
    );

    let payload = encrypt_aes128gcm(&sender_priv, &recv_pub, 4096, 0, b"x").unwrap();
    assert_eq!(
        webpush_aes128gcm_decrypt(&recv_priv, &AUTH_SECRET[..15], &payload),
        Err(Error::InvalidAuthSecret)
    );
}

#[test]
fn rejects_padding_only_trailing_record() {
    let (_, recv_pub) = keypair();
    let (sender_priv, _) = keypair();

    // rs = 20 leaves 3 data bytes per record; one plaintext byte cannot
    // soak up five padding bytes without a trailing padding-only record.
    assert_eq!(
        encrypt_aes128gcm(&sender_priv, &recv_pub, 20, 5, b"x"),
        Err(Error::EncryptPadding)
    );
}

// ---------------------------------------------------------------------------
// aesgcm (legacy)
// ---------------------------------------------------------------------------

#[test]
fn aesgcm_roundtrip_with_headers() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();
    let plaintext = b"I am the walrus";

    // The wire record size excludes the tag, so values down to 3 still
    // leave room for a data byte in each sealed record.
    for &(rs, pad_len) in &[(4096, 0), (4096, 16), (24, 2), (8, 0), (3, 0)] {
        let (ciphertext, headers) = webpush_aesgcm_encrypt_with_keys(
            &sender_priv,
            &AUTH_SECRET,
            &SALT,
            &recv_pub,
            rs,
            pad_len,
            plaintext,
        )
        .unwrap_or_else(|err| panic!("encrypt rs={rs} pad={pad_len}: {err}"));
        let max_len = aesgcm_ciphertext_max_length(rs, pad_len, plaintext.len());
        if max_len > 0 {
            assert!(ciphertext.len() <= max_len);
        }

        let out = webpush_aesgcm_decrypt(
            &recv_priv,
            &AUTH_SECRET,
            &headers.crypto_key,
            &headers.encryption,
            &ciphertext,
        )
        .unwrap_or_else(|err| panic!("decrypt rs={rs} pad={pad_len}: {err}"));
        assert_eq!(out, plaintext, "rs={rs} pad={pad_len}");
    }
}

#[test]
fn aesgcm_appends_trailer_when_records_align() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();

    // Wire rs = 4 seals 20-byte records holding 2 data bytes each; a
    // 2-byte plaintext fills one record exactly, forcing a trailer.
    let (ciphertext, headers) =
        webpush_aesgcm_encrypt_with_keys(&sender_priv, &AUTH_SECRET, &SALT, &recv_pub, 4, 0, b"hi")
            .unwrap();
    assert_eq!(ciphertext.len(), 20 + 18);

    let out = webpush_aesgcm_decrypt(
        &recv_priv,
        &AUTH_SECRET,
        &headers.crypto_key,
        &headers.encryption,
        &ciphertext,
    )
    .unwrap();
    assert_eq!(out, b"hi");
}

#[test]
fn aes128gcm_truncation_at_record_boundary_fails() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();

    // rs = 24 splits 15 bytes into three records. Cutting the payload at a
    // record boundary leaves a last record whose delimiter still marks a
    // middle record.
    let payload = encrypt_aes128gcm(&sender_priv, &recv_pub, 24, 0, b"I am the walrus").unwrap();
    let records_start = HEADER_LENGTH + PUBLIC_KEY_LENGTH;
    assert_eq!(payload.len(), records_start + 24 + 24 + 18);

    let truncated = &payload[..records_start + 24];
    assert_eq!(
        webpush_aes128gcm_decrypt(&recv_priv, &AUTH_SECRET, truncated),
        Err(Error::DecryptPadding)
    );
}

#[test]
fn aesgcm_truncated_mid_record_fails() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();
    let plaintext = vec![0x5Au8; 40];

    let (ciphertext, headers) = webpush_aesgcm_encrypt_with_keys(
        &sender_priv,
        &AUTH_SECRET,
        &SALT,
        &recv_pub,
        16,
        0,
        &plaintext,
    )
    .unwrap();

    // Records are 32 bytes on the wire; cutting into the second one leaves
    // a stub no longer than the tag.
    let truncated = &ciphertext[..33];
    let result = webpush_aesgcm_decrypt(
        &recv_priv,
        &AUTH_SECRET,
        &headers.crypto_key,
        &headers.encryption,
        truncated,
    );
    assert_eq!(result, Err(Error::ShortBlock));
}

#[test]
fn aesgcm_header_parsing_variants() {
    let (recv_priv, recv_pub) = keypair();
    let (sender_priv, _) = keypair();
    let plaintext = b"header syntax test";

    let (ciphertext, headers) = webpush_aesgcm_encrypt_with_keys(
        &sender_priv,
        &AUTH_SECRET,
        &SALT,
        &recv_pub,
        4096,
        0,
        plaintext,
    )
    .unwrap();

    let dh = headers.crypto_key.split("dh=").nth(1).unwrap().to_string();
    let salt_b64 = headers
        .encryption
        .split("salt=")
        .nth(1)
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    // Case-insensitive names, quoted values, reordered parameters, an
    // unrelated entry for another key, and a defaulted rs.
    let cases = [
        (format!("DH={dh}; KEYID=p256dh"), format!("SALT={salt_b64}; RS=4096")),
        (format!("dh=\"{dh}\""), format!("salt=\"{salt_b64}\"; rs=4096")),
        (
            format!("keyid=vapid; p256ecdsa=ignored,keyid=p256dh; dh={dh}"),
            format!("keyid=p256dh; salt={salt_b64}"),
        ),
        (format!(" dh = {dh} "), format!(" salt = {salt_b64} ")),
    ];

    for (crypto_key, encryption) in &cases {
        let out =
            webpush_aesgcm_decrypt(&recv_priv, &AUTH_SECRET, crypto_key, encryption, &ciphertext)
                .unwrap_or_else(|err| panic!("headers `{crypto_key}` / `{encryption}`: {err}"));
        assert_eq!(out, plaintext);
    }
}

#[test]
fn aesgcm_missing_parameters_fail() {
    let (recv_priv, _) = keypair();
    let ciphertext = [0u8; 32];

    assert_eq!(
        webpush_aesgcm_decrypt(&recv_priv, &AUTH_SECRET, "keyid=p256dh", "salt=AAAAAAAAAAAAAAAAAAAAAA", &ciphertext),
        Err(Error::InvalidHeader)
    );
    assert_eq!(
        webpush_aesgcm_decrypt(&recv_priv, &AUTH_SECRET, "dh=AAAA", "rs=4096", &ciphertext),
        Err(Error::InvalidHeader)
    );
    assert_eq!(
        webpush_aesgcm_decrypt(&recv_priv, &AUTH_SECRET, "dh=!!!", "salt=AAAAAAAAAAAAAAAAAAAAAA", &ciphertext),
        Err(Error::InvalidHeader)
    );
}

// ---------------------------------------------------------------------------
// Header codec
// ---------------------------------------------------------------------------

#[test]
fn header_codec_roundtrip() {
    let salt = [0x11u8; SALT_LENGTH];
    for key_id_len in [0usize, 1, 65, 255] {
        let key_id = vec![0xABu8; key_id_len];
        let mut payload = http_ece::wire::encode_header(&salt, 4096, &key_id, 4).unwrap();
        payload.extend_from_slice(&[1, 2, 3, 4]);

        let header = http_ece::wire::decode_header(&payload).unwrap();
        assert_eq!(header.salt, &salt);
        assert_eq!(header.rs, 4096);
        assert_eq!(header.key_id, key_id.as_slice());
        assert_eq!(header.ciphertext, &[1, 2, 3, 4]);
    }
}

#[test]
fn header_codec_rejects_short_payloads() {
    let salt = [0x11u8; SALT_LENGTH];
    let payload = http_ece::wire::encode_header(&salt, 4096, &[0xAB; 65], 0).unwrap();

    // Without records the parse still succeeds; any shorter and the key id
    // overruns the payload.
    assert!(http_ece::wire::decode_header(&payload).is_ok());
    assert_eq!(
        http_ece::wire::decode_header(&payload[..payload.len() - 1]),
        Err(Error::InvalidHeader)
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_aes128gcm_roundtrip(
        plaintext in proptest::collection::vec(any::<u8>(), 1..300),
        rs in 18u32..80,
        pad_len in 0usize..64,
    ) {
        let (recv_priv, recv_pub) = keypair();
        let (sender_priv, _) = keypair();

        match encrypt_aes128gcm(&sender_priv, &recv_pub, rs, pad_len, &plaintext) {
            Ok(payload) => {
                prop_assert!(payload.len() <= aes128gcm_payload_max_length(rs, pad_len, plaintext.len()));
                let out = webpush_aes128gcm_decrypt(&recv_priv, &AUTH_SECRET, &payload).unwrap();
                prop_assert_eq!(out, plaintext);
            }
            // Some padding requests cannot avoid a trailing padding-only
            // record and are rejected by design.
            Err(Error::EncryptPadding) => {}
            Err(err) => panic!("encrypt rs={rs} pad={pad_len}: {err}"),
        }
    }

    #[test]
    fn prop_aesgcm_roundtrip(
        plaintext in proptest::collection::vec(any::<u8>(), 1..300),
        rs in 3u32..80,
        pad_len in 0usize..64,
    ) {
        let (recv_priv, recv_pub) = keypair();
        let (sender_priv, _) = keypair();

        match webpush_aesgcm_encrypt_with_keys(
            &sender_priv, &AUTH_SECRET, &SALT, &recv_pub, rs, pad_len, &plaintext,
        ) {
            Ok((ciphertext, headers)) => {
                prop_assert!(ciphertext.len() <= aesgcm_ciphertext_max_length(rs, pad_len, plaintext.len()));
                let out = webpush_aesgcm_decrypt(
                    &recv_priv, &AUTH_SECRET, &headers.crypto_key, &headers.encryption, &ciphertext,
                ).unwrap();
                prop_assert_eq!(out, plaintext);
            }
            Err(Error::EncryptPadding) => {}
            Err(err) => panic!("encrypt rs={rs} pad={pad_len}: {err}"),
        }
    }
}
