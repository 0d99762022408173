//! Integration tests for entity assembly.
//!
//! Covers identity certification, subkey binding (including the embedded
//! primary-key binding on signing subkeys), preferred-list seeding and the
//! post-quantum version gating.

use hybridpgp::config::{AeadConfig, Config};
use hybridpgp::crypto::{
    AeadMode, CipherFunction, CompressionAlgorithm, HashAlgorithm, PublicKeyAlgorithm,
};
use hybridpgp::entity::Entity;
use hybridpgp::error::Error;
use hybridpgp::packet::{KeyVersion, SignatureType};
use rand::rngs::OsRng;

fn ecdsa_p256_config() -> Config {
    Config {
        public_key_algorithm: PublicKeyAlgorithm::Ecdsa,
        curve_name: "nistp256".to_string(),
        hash: HashAlgorithm::Sha256,
        ..Config::default()
    }
}

#[test]
fn test_ecdsa_entity_shape() {
    let mut rng = OsRng;
    let entity = Entity::new(
        "Alice",
        "",
        "alice@example.org",
        &mut rng,
        &ecdsa_p256_config(),
    )
    .expect("entity creation failed");

    assert_eq!(entity.identities.len(), 1);
    let identity = entity
        .identities
        .get("Alice <alice@example.org>")
        .expect("identity keyed by canonical user id");
    assert_eq!(identity.user_id.name, "Alice");
    assert_eq!(identity.user_id.email, "alice@example.org");

    assert_eq!(entity.primary_key().algorithm, PublicKeyAlgorithm::Ecdsa);
    assert_eq!(entity.subkeys.len(), 1);
    assert_eq!(
        entity.subkeys[0].public_key().algorithm,
        PublicKeyAlgorithm::Ecdh
    );

    let sig = &identity.self_signature;
    assert_eq!(sig.preferred_hash, vec![HashAlgorithm::Sha256 as u8]);
    assert_eq!(sig.preferred_symmetric, vec![CipherFunction::Aes128 as u8]);
    assert!(sig.mdc);
    assert!(sig.flag_sign && sig.flag_certify && sig.flags_valid);
    assert_eq!(sig.is_primary_id, Some(true));

    entity.validate().expect("entity validation failed");
}

#[test]
fn test_dilithium_entity_gets_kyber_subkey() {
    let mut rng = OsRng;
    let config = Config {
        public_key_algorithm: PublicKeyAlgorithm::Dilithium3Ed25519,
        v6_keys: true,
        ..Config::default()
    };
    let entity =
        Entity::new("Bob", "", "bob@example.org", &mut rng, &config).expect("entity creation");

    assert_eq!(
        entity.primary_key().algorithm,
        PublicKeyAlgorithm::Dilithium3Ed25519
    );
    assert_eq!(entity.primary_key().version, KeyVersion::V6);
    assert_eq!(entity.primary_key().fingerprint.len(), 32);

    let subkey = entity.encryption_subkey().expect("encryption subkey");
    assert_eq!(
        subkey.public_key().algorithm,
        PublicKeyAlgorithm::Kyber768X25519
    );
    assert_eq!(subkey.public_key().version, KeyVersion::V6);

    entity.validate().expect("entity validation failed");
}

#[test]
fn test_pq_entity_requires_v6() {
    let mut rng = OsRng;
    for algorithm in [
        PublicKeyAlgorithm::Dilithium3Ed25519,
        PublicKeyAlgorithm::Dilithium3P256,
        PublicKeyAlgorithm::SphincsPlusSha2,
    ] {
        let config = Config {
            public_key_algorithm: algorithm,
            v6_keys: false,
            ..Config::default()
        };
        let err = Entity::new("Bob", "", "bob@example.org", &mut rng, &config).unwrap_err();
        assert!(
            matches!(err, Error::InvalidArgument(_)),
            "expected InvalidArgument for {}",
            algorithm
        );
    }
}

#[test]
fn test_invalid_identity_characters() {
    let mut rng = OsRng;
    let config = ecdsa_p256_config();
    for (name, comment, email) in [
        ("Al(ice", "", "alice@example.org"),
        ("Alice", "co)mment", "alice@example.org"),
        ("Alice", "", "alice<@example.org"),
        ("Alice", "", "alice>@example.org"),
        ("Al\0ice", "", "alice@example.org"),
    ] {
        let err = Entity::new(name, comment, email, &mut rng, &config).unwrap_err();
        assert!(
            matches!(
                err,
                Error::InvalidArgument(ref m)
                    if m == "user id field contained invalid characters"
            ),
            "input ({:?}, {:?}, {:?})",
            name,
            comment,
            email
        );
    }
}

#[test]
fn test_duplicate_user_id() {
    let mut rng = OsRng;
    let config = ecdsa_p256_config();
    let mut entity =
        Entity::new("Alice", "", "alice@example.org", &mut rng, &config).expect("entity creation");

    entity
        .add_user_id("Alice", "work", "alice@example.org", &mut rng, &config)
        .expect("distinct user id");
    let err = entity
        .add_user_id("Alice", "", "alice@example.org", &mut rng, &config)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(ref m) if m == "user id exist"));

    // Only the first identity is the primary one.
    assert_eq!(
        entity.identities["Alice <alice@example.org>"]
            .self_signature
            .is_primary_id,
        Some(true)
    );
    assert_eq!(
        entity.identities["Alice (work) <alice@example.org>"]
            .self_signature
            .is_primary_id,
        Some(false)
    );
}

#[test]
fn test_signing_subkey_cross_signature_verifies() {
    let mut rng = OsRng;
    let config = Config {
        public_key_algorithm: PublicKeyAlgorithm::EdDsa,
        curve_name: "ed25519".to_string(),
        ..Config::default()
    };
    let mut entity =
        Entity::new("Alice", "", "alice@example.org", &mut rng, &config).expect("entity creation");
    entity
        .add_signing_subkey(&mut rng, &config)
        .expect("signing subkey");

    let signing = entity.subkeys.last().unwrap();
    assert!(signing.binding.flag_sign);
    let embedded = signing
        .binding
        .embedded_signature
        .as_deref()
        .expect("embedded cross-signature");
    assert_eq!(embedded.sig_type, SignatureType::PrimaryKeyBinding);

    // The cross-signature verifies under the subkey's own public key.
    entity.validate().expect("entity validation failed");

    // A binding with the cross-signature stripped is rejected.
    let mut broken = entity.clone();
    broken
        .subkeys
        .last_mut()
        .unwrap()
        .binding
        .embedded_signature = None;
    assert!(matches!(
        broken.validate(),
        Err(Error::InvalidArgument(ref m)) if m.contains("cross-signature")
    ));
}

#[test]
fn test_preferred_list_laws() {
    let mut rng = OsRng;
    let config = Config {
        public_key_algorithm: PublicKeyAlgorithm::EdDsa,
        curve_name: "ed25519".to_string(),
        hash: HashAlgorithm::Sha512,
        cipher: CipherFunction::Aes256,
        compression: CompressionAlgorithm::Zlib,
        aead: Some(AeadConfig {
            mode: AeadMode::Ocb,
        }),
        ..Config::default()
    };
    let entity =
        Entity::new("Alice", "", "alice@example.org", &mut rng, &config).expect("entity creation");
    let sig = &entity.identities["Alice <alice@example.org>"].self_signature;

    assert_eq!(
        sig.preferred_hash,
        vec![HashAlgorithm::Sha512 as u8, HashAlgorithm::Sha256 as u8]
    );
    assert_eq!(
        sig.preferred_symmetric,
        vec![CipherFunction::Aes256 as u8, CipherFunction::Aes128 as u8]
    );
    assert_eq!(
        sig.preferred_compression,
        vec![
            CompressionAlgorithm::None as u8,
            CompressionAlgorithm::Zlib as u8
        ]
    );
    assert_eq!(
        sig.preferred_aead,
        vec![AeadMode::Ocb as u8, AeadMode::Eax as u8]
    );
    assert!(sig.aead);
}

#[test]
fn test_key_lifetime_recorded() {
    let mut rng = OsRng;
    let config = Config {
        key_lifetime_secs: 86_400,
        ..ecdsa_p256_config()
    };
    let entity =
        Entity::new("Alice", "", "alice@example.org", &mut rng, &config).expect("entity creation");

    let sig = &entity.identities["Alice <alice@example.org>"].self_signature;
    assert_eq!(sig.key_lifetime_secs, Some(86_400));

    // The initial encryption subkey never carries its own expiry.
    assert_eq!(entity.subkeys[0].binding.key_lifetime_secs, Some(0));
}

#[test]
fn test_sphincs_plus_entity() {
    let mut rng = OsRng;
    let config = Config {
        public_key_algorithm: PublicKeyAlgorithm::SphincsPlusShake,
        v6_keys: true,
        ..Config::default()
    };
    let entity =
        Entity::new("Carol", "", "carol@example.org", &mut rng, &config).expect("entity creation");

    assert_eq!(
        entity.primary_key().algorithm,
        PublicKeyAlgorithm::SphincsPlusShake
    );
    // The 128-bit default parameter set pairs with the smaller KEM.
    assert_eq!(
        entity.encryption_subkey().unwrap().public_key().algorithm,
        PublicKeyAlgorithm::Kyber768X25519
    );
    entity.validate().expect("entity validation failed");
}
