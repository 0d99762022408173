//! Integration tests for the PKESK codec.
//!
//! Round-trips every algorithm with a concrete backend through serialize,
//! parse and decrypt in both packet versions, and checks the version
//! gating, recipient matching and payload-integrity rules.

use hybridpgp::config::Config;
use hybridpgp::crypto::{elgamal, CipherFunction, PublicKeyAlgorithm};
use hybridpgp::entity::new_decrypter;
use hybridpgp::error::Error;
use hybridpgp::packet::encoding::Field;
use hybridpgp::packet::encrypted_key::EncryptedFields;
use hybridpgp::packet::{
    serialize_encrypted_key_aead, serialize_encrypted_key_anonymous, EncryptedKey, KeyMaterial,
    KeyVersion, Packet, PrivateKey,
};
use num_bigint_dig::{BigUint, RandBigInt};
use num_traits::One;
use rand::rngs::OsRng;
use rand::RngCore;

const CREATED: u32 = 1_700_000_000;

/// Builds a decryption-capable private key for the given algorithm.
fn decrypter(algorithm: PublicKeyAlgorithm, curve_name: &str) -> PrivateKey {
    let mut rng = OsRng;
    let config = Config {
        public_key_algorithm: algorithm,
        curve_name: curve_name.to_string(),
        rsa_bits: 1024,
        v6_keys: algorithm.requires_v6(),
        ..Config::default()
    };
    let material = new_decrypter(&mut rng, &config)
        .unwrap_or_else(|e| panic!("key generation failed for {}: {}", algorithm, e));
    PrivateKey::new_decrypter(config.key_version(), CREATED, material)
        .expect("decrypter construction failed")
}

/// Builds an ElGamal key over the RFC 3526 1536-bit MODP group.
fn elgamal_decrypter() -> PrivateKey {
    let mut rng = OsRng;
    let p_hex = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
                 020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
                 4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
                 EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
                 98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
                 9ED529077096966D670C354E4ABC9804F1746C08CA237327FFFFFFFFFFFFFFFF";
    let p = BigUint::parse_bytes(p_hex.as_bytes(), 16).unwrap();
    let g = BigUint::from(2u32);
    let x = rng.gen_biguint_range(&BigUint::one(), &(&p - BigUint::one()));
    let y = g.modpow(&x, &p);

    let material = KeyMaterial::ElGamal(elgamal::PrivateKey {
        public: elgamal::PublicKey { p, g, y },
        x,
    });
    PrivateKey::new_decrypter(KeyVersion::V4, CREATED, material).unwrap()
}

fn random_key(len: usize) -> Vec<u8> {
    let mut key = vec![0u8; len];
    OsRng.fill_bytes(&mut key);
    key
}

fn cipher_for_len(len: usize) -> CipherFunction {
    match len {
        16 => CipherFunction::Aes128,
        24 => CipherFunction::Aes192,
        32 => CipherFunction::Aes256,
        other => panic!("no AES variant with {} byte keys", other),
    }
}

/// Serializes, reparses and decrypts a session key, asserting it survives.
fn round_trip(priv_key: &PrivateKey, aead_supported: bool, session_key: &[u8]) -> EncryptedKey {
    let mut rng = OsRng;
    let cipher = cipher_for_len(session_key.len());

    let mut buf = Vec::new();
    serialize_encrypted_key_aead(
        &mut buf,
        &mut rng,
        &priv_key.public,
        cipher,
        aead_supported,
        session_key,
    )
    .expect("serialization failed");

    let packet = Packet::from_bytes(&buf).expect("packet framing failed");
    let mut parsed = EncryptedKey::from_packet(&packet).expect("parse failed");
    parsed.decrypt(priv_key).expect("decrypt failed");
    assert_eq!(parsed.key, session_key, "session key mismatch");
    parsed
}

#[test]
fn test_round_trip_all_algorithms_both_versions() {
    let keys = [
        decrypter(PublicKeyAlgorithm::Rsa, "curve25519"),
        decrypter(PublicKeyAlgorithm::Ecdh, "curve25519"),
        decrypter(PublicKeyAlgorithm::Ecdh, "nistp256"),
        decrypter(PublicKeyAlgorithm::Ecdh, "nistp384"),
        decrypter(PublicKeyAlgorithm::X25519, "curve25519"),
        decrypter(PublicKeyAlgorithm::X448, "curve448"),
        decrypter(PublicKeyAlgorithm::Kyber768X25519, "curve25519"),
        decrypter(PublicKeyAlgorithm::Kyber1024X448, "curve448"),
        decrypter(PublicKeyAlgorithm::Kyber768P256, "nistp256"),
        decrypter(PublicKeyAlgorithm::Kyber1024P384, "nistp384"),
    ];

    for key in &keys {
        for aead_supported in [false, true] {
            for len in [16usize, 24, 32] {
                let session_key = random_key(len);
                let parsed = round_trip(key, aead_supported, &session_key);
                assert_eq!(parsed.version, if aead_supported { 6 } else { 3 });
            }
        }
    }
}

#[test]
fn test_elgamal_v3_round_trip_and_v6_rejection() {
    let mut rng = OsRng;
    let key = elgamal_decrypter();
    let session_key = random_key(32);

    round_trip(&key, false, &session_key);

    let mut buf = Vec::new();
    let err = serialize_encrypted_key_aead(
        &mut buf,
        &mut rng,
        &key.public,
        CipherFunction::Aes256,
        true,
        &session_key,
    )
    .unwrap_err();
    assert!(
        matches!(err, Error::InvalidArgument(ref m) if m.contains("ElGamal v6")),
        "unexpected error: {}",
        err
    );
}

#[test]
fn test_v3_rsa_recovers_cipher_function() {
    let key = decrypter(PublicKeyAlgorithm::Rsa, "curve25519");
    let session_key = random_key(32);

    let parsed = round_trip(&key, false, &session_key);
    assert_eq!(parsed.cipher_func, Some(CipherFunction::Aes256));
    assert_eq!(parsed.key, session_key);
}

#[test]
fn test_v6_kyber1024_x448_wire_shape() {
    let mut rng = OsRng;
    let key = decrypter(PublicKeyAlgorithm::Kyber1024X448, "curve448");
    let session_key = random_key(32);

    let mut buf = Vec::new();
    serialize_encrypted_key_aead(
        &mut buf,
        &mut rng,
        &key.public,
        CipherFunction::Aes256,
        true,
        &session_key,
    )
    .unwrap();

    let packet = Packet::from_bytes(&buf).unwrap();
    let body = &packet.body;
    assert_eq!(body[0], 6, "packet version");
    assert_eq!(body[1], 6, "recipient key version");
    assert_eq!(&body[2..34], key.public.fingerprint.as_slice());
    assert_eq!(body[34], PublicKeyAlgorithm::Kyber1024X448 as u8);

    let mut parsed = EncryptedKey::from_packet(&packet).unwrap();
    match &parsed.fields {
        EncryptedFields::KyberEcdh {
            ecdh_ephemeral,
            kyber_ciphertext,
            wrapped,
        } => {
            assert_eq!(ecdh_ephemeral.bytes().len(), 56);
            assert_eq!(kyber_ciphertext.bytes().len(), 1568);
            // Fixed components, a length octet, then the wrapped key.
            assert_eq!(body.len() - 35, 56 + 1568 + 1 + wrapped.bytes().len());
        }
        other => panic!("unexpected field layout: {:?}", other),
    }

    parsed.decrypt(&key).unwrap();
    assert_eq!(parsed.key, session_key);
}

#[test]
fn test_corrupted_v3_ecdh_ciphertext_fails_checksum() {
    let mut rng = OsRng;
    let key = decrypter(PublicKeyAlgorithm::Ecdh, "nistp256");
    let session_key = random_key(32);

    let mut buf = Vec::new();
    serialize_encrypted_key_aead(
        &mut buf,
        &mut rng,
        &key.public,
        CipherFunction::Aes256,
        false,
        &session_key,
    )
    .unwrap();

    let last = buf.len() - 1;
    buf[last] ^= 0x01;

    let packet = Packet::from_bytes(&buf).unwrap();
    let mut parsed = EncryptedKey::from_packet(&packet).unwrap();
    let err = parsed.decrypt(&key).unwrap_err();
    assert!(
        matches!(err, Error::Structural(ref m) if m == "session key checksum is incorrect"),
        "unexpected error: {}",
        err
    );
}

#[test]
fn test_v3_cfrg_aes_constraint_on_serialize() {
    let mut rng = OsRng;
    for key in [
        decrypter(PublicKeyAlgorithm::X25519, "curve25519"),
        decrypter(PublicKeyAlgorithm::X448, "curve448"),
    ] {
        let mut buf = Vec::new();
        let err = serialize_encrypted_key_aead(
            &mut buf,
            &mut rng,
            &key.public,
            CipherFunction::Cast5,
            false,
            &random_key(16),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}

#[test]
fn test_v3_cfrg_aes_constraint_on_decrypt() {
    let mut rng = OsRng;
    let key = decrypter(PublicKeyAlgorithm::X25519, "curve25519");
    let session_key = random_key(16);

    let mut buf = Vec::new();
    serialize_encrypted_key_aead(
        &mut buf,
        &mut rng,
        &key.public,
        CipherFunction::Aes128,
        false,
        &session_key,
    )
    .unwrap();

    // The trailing byte of a v3 CFRG envelope is the cipher octet; rewrite
    // it to a non-AES cipher.
    let last = buf.len() - 1;
    assert_eq!(buf[last], CipherFunction::Aes128 as u8);
    buf[last] = CipherFunction::Cast5 as u8;

    let packet = Packet::from_bytes(&buf).unwrap();
    let mut parsed = EncryptedKey::from_packet(&packet).unwrap();
    let err = parsed.decrypt(&key).unwrap_err();
    assert!(
        matches!(err, Error::Structural(ref m) if m.contains("mandates AES")),
        "unexpected error: {}",
        err
    );
}

#[test]
fn test_v3_recipient_key_id_mismatch() {
    let key = decrypter(PublicKeyAlgorithm::X25519, "curve25519");
    let other = decrypter(PublicKeyAlgorithm::X25519, "curve25519");
    let session_key = random_key(16);

    let mut rng = OsRng;
    let mut buf = Vec::new();
    serialize_encrypted_key_aead(
        &mut buf,
        &mut rng,
        &key.public,
        CipherFunction::Aes128,
        false,
        &session_key,
    )
    .unwrap();

    let packet = Packet::from_bytes(&buf).unwrap();
    let mut parsed = EncryptedKey::from_packet(&packet).unwrap();
    assert!(matches!(
        parsed.decrypt(&other),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_v6_recipient_fingerprint_mismatch() {
    let key = decrypter(PublicKeyAlgorithm::Kyber768X25519, "curve25519");
    let other = decrypter(PublicKeyAlgorithm::Kyber768X25519, "curve25519");
    let session_key = random_key(32);

    let mut rng = OsRng;
    let mut buf = Vec::new();
    serialize_encrypted_key_aead(
        &mut buf,
        &mut rng,
        &key.public,
        CipherFunction::Aes256,
        true,
        &session_key,
    )
    .unwrap();

    let packet = Packet::from_bytes(&buf).unwrap();
    let mut parsed = EncryptedKey::from_packet(&packet).unwrap();
    assert!(matches!(
        parsed.decrypt(&other),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_anonymous_v6_decrypts_without_recipient_check() {
    let key = decrypter(PublicKeyAlgorithm::X25519, "curve25519");
    let session_key = random_key(32);

    let mut rng = OsRng;
    let mut buf = Vec::new();
    serialize_encrypted_key_anonymous(
        &mut buf,
        &mut rng,
        &key.public,
        CipherFunction::Aes256,
        &session_key,
    )
    .unwrap();

    let packet = Packet::from_bytes(&buf).unwrap();
    let mut parsed = EncryptedKey::from_packet(&packet).unwrap();
    assert_eq!(parsed.key_version, 0);
    assert!(parsed.key_fingerprint.is_empty());
    parsed.decrypt(&key).unwrap();
    assert_eq!(parsed.key, session_key);
}

#[test]
fn test_dummy_key_rejected() {
    let key = decrypter(PublicKeyAlgorithm::X25519, "curve25519");
    let dummy = PrivateKey::new_dummy(key.public.clone());
    let session_key = random_key(16);

    let mut rng = OsRng;
    let mut buf = Vec::new();
    serialize_encrypted_key_aead(
        &mut buf,
        &mut rng,
        &key.public,
        CipherFunction::Aes128,
        false,
        &session_key,
    )
    .unwrap();

    let packet = Packet::from_bytes(&buf).unwrap();
    let mut parsed = EncryptedKey::from_packet(&packet).unwrap();
    assert!(matches!(parsed.decrypt(&dummy), Err(Error::DummyKey(_))));
}

#[test]
fn test_reserialization_is_byte_identical() {
    let key = decrypter(PublicKeyAlgorithm::Kyber768P256, "nistp256");
    let session_key = random_key(32);

    let mut rng = OsRng;
    let mut buf = Vec::new();
    serialize_encrypted_key_aead(
        &mut buf,
        &mut rng,
        &key.public,
        CipherFunction::Aes256,
        true,
        &session_key,
    )
    .unwrap();

    let packet = Packet::from_bytes(&buf).unwrap();
    let parsed = EncryptedKey::from_packet(&packet).unwrap();

    let mut reserialized = Vec::new();
    parsed.serialize(&mut reserialized).unwrap();
    assert_eq!(reserialized, buf);
}
