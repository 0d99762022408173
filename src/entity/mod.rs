//! Entity assembly: a primary key, certified identities and bound subkeys.
//!
//! A fresh entity carries a signing primary key, one identity with a
//! positive-certification self-signature, and one encryption subkey bound
//! by the primary. Further identities and subkeys can be added; signing
//! subkeys embed a primary-key-binding cross-signature made by the subkey
//! itself.

use crate::config::Config;
use crate::crypto::{CipherFunction, CompressionAlgorithm, HashAlgorithm};
use crate::error::{Error, Result};
use crate::packet::{KeyVersion, PrivateKey, PublicKey, Signature, SignatureType, UserId};
use num_bigint_dig::BigUint;
use rand::{CryptoRng, RngCore};
use std::collections::HashMap;
use tracing::debug;

pub mod factory;

pub use factory::{new_decrypter, new_signer};

/// An identity with its certification signatures.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Canonical user-id string
    pub name: String,
    /// The user id packet
    pub user_id: UserId,
    /// The positive-certification self-signature
    pub self_signature: Signature,
    /// All signatures over this identity, self-signature first
    pub signatures: Vec<Signature>,
}

/// A subkey with its binding signature.
#[derive(Debug, Clone)]
pub struct Subkey {
    /// The subkey pair
    pub private_key: PrivateKey,
    /// The binding signature issued by the primary key
    pub binding: Signature,
}

impl Subkey {
    /// The subkey's public half.
    pub fn public_key(&self) -> &PublicKey {
        &self.private_key.public
    }
}

/// A primary key with identities and subkeys.
#[derive(Debug, Clone)]
pub struct Entity {
    /// The primary key pair
    pub private_key: PrivateKey,
    /// Identities keyed by canonical user-id string
    pub identities: HashMap<String, Identity>,
    /// Subkeys in insertion order
    pub subkeys: Vec<Subkey>,
}

impl Entity {
    /// Creates an entity with a fresh signing primary key, one identity and
    /// one encryption subkey. Name, comment and email may each be empty but
    /// must not contain `(`, `)`, `<`, `>` or NUL.
    pub fn new<R: CryptoRng + RngCore>(
        name: &str,
        comment: &str,
        email: &str,
        rng: &mut R,
        config: &Config,
    ) -> Result<Self> {
        let creation_time = config.creation_time_secs();
        let lifetime = config.key_lifetime_secs;
        let mut feed = config.rsa_primes.clone();

        let material = factory::new_signer_from_feed(rng, config, &mut feed)?;
        let mut primary = PrivateKey::new_signer(KeyVersion::V4, creation_time, material)?;
        if config.v6_keys {
            primary.public.upgrade_to_v6();
        }

        let mut entity = Self {
            private_key: primary,
            identities: HashMap::new(),
            subkeys: Vec::new(),
        };
        debug!(
            key_id = format_args!("{:016x}", entity.primary_key().key_id),
            algorithm = %entity.primary_key().algorithm,
            "created primary key"
        );

        entity.add_user_id_internal(name, comment, email, rng, config, creation_time, lifetime)?;

        // The initial encryption subkey carries no expiry of its own; it is
        // unusable once the primary key expires.
        entity.add_encryption_subkey_internal(rng, config, &mut feed, creation_time, 0)?;

        Ok(entity)
    }

    /// The primary public key.
    pub fn primary_key(&self) -> &PublicKey {
        &self.private_key.public
    }

    /// Adds another identity certified by the primary key.
    pub fn add_user_id<R: CryptoRng + RngCore>(
        &mut self,
        name: &str,
        comment: &str,
        email: &str,
        rng: &mut R,
        config: &Config,
    ) -> Result<()> {
        let creation_time = config.creation_time_secs();
        let lifetime = config.key_lifetime_secs;
        self.add_user_id_internal(name, comment, email, rng, config, creation_time, lifetime)
    }

    #[allow(clippy::too_many_arguments)]
    fn add_user_id_internal<R: CryptoRng + RngCore>(
        &mut self,
        name: &str,
        comment: &str,
        email: &str,
        _rng: &mut R,
        config: &Config,
        creation_time: u32,
        lifetime: u32,
    ) -> Result<()> {
        let uid = UserId::new(name, comment, email)?;
        if self.identities.contains_key(&uid.id) {
            return Err(Error::invalid_argument("user id exist"));
        }

        let primary = &self.private_key;
        let is_primary_id = self.identities.is_empty();

        let mut sig = Signature::new(
            primary.public.version.version_byte(),
            SignatureType::PositiveCert,
            primary.public.algorithm,
            config.hash,
            creation_time,
        );
        sig.key_lifetime_secs = Some(lifetime);
        sig.issuer_key_id = Some(primary.public.key_id);
        sig.issuer_fingerprint = primary.public.fingerprint.clone();
        sig.is_primary_id = Some(is_primary_id);
        sig.flags_valid = true;
        sig.flag_sign = true;
        sig.flag_certify = true;
        sig.mdc = true;
        sig.aead = config.aead.is_some();

        // Preferred hash: the configured algorithm, then the
        // must-implement SHA-256 when it differs.
        sig.preferred_hash = vec![config.hash as u8];
        if config.hash != HashAlgorithm::Sha256 {
            sig.preferred_hash.push(HashAlgorithm::Sha256 as u8);
        }

        // Likewise for the cipher, with AES-128 as the baseline.
        sig.preferred_symmetric = vec![config.cipher as u8];
        if config.cipher != CipherFunction::Aes128 {
            sig.preferred_symmetric.push(CipherFunction::Aes128 as u8);
        }

        // Uncompressed leads the compression list to keep compression
        // side channels opt-in; the configured algorithm follows.
        sig.preferred_compression = vec![CompressionAlgorithm::None as u8];
        if config.compression != CompressionAlgorithm::None {
            sig.preferred_compression.push(config.compression as u8);
        }

        sig.preferred_aead = vec![config.aead_mode() as u8];
        if config.aead_mode() != crate::crypto::AeadMode::Eax {
            sig.preferred_aead.push(crate::crypto::AeadMode::Eax as u8);
        }

        sig.sign_user_id(&uid.id, primary)?;

        self.identities.insert(
            uid.id.clone(),
            Identity {
                name: uid.id.clone(),
                user_id: uid,
                self_signature: sig.clone(),
                signatures: vec![sig],
            },
        );
        Ok(())
    }

    /// Adds a signing subkey. Its binding embeds a primary-key-binding
    /// cross-signature created by the subkey over the key pair.
    pub fn add_signing_subkey<R: CryptoRng + RngCore>(
        &mut self,
        rng: &mut R,
        config: &Config,
    ) -> Result<()> {
        let creation_time = config.creation_time_secs();
        let lifetime = config.key_lifetime_secs;
        let mut feed = config.rsa_primes.clone();

        let material = factory::new_signer_from_feed(rng, config, &mut feed)?;
        let mut sub = PrivateKey::new_signer(KeyVersion::V4, creation_time, material)?;
        if config.v6_keys {
            sub.public.upgrade_to_v6();
        }
        sub.public.is_subkey = true;

        let primary = &self.private_key;
        let mut binding = Signature::new(
            primary.public.version.version_byte(),
            SignatureType::SubkeyBinding,
            primary.public.algorithm,
            config.hash,
            creation_time,
        );
        binding.key_lifetime_secs = Some(lifetime);
        binding.issuer_key_id = Some(primary.public.key_id);
        binding.issuer_fingerprint = primary.public.fingerprint.clone();
        binding.flags_valid = true;
        binding.flag_sign = true;

        let mut embedded = Signature::new(
            primary.public.version.version_byte(),
            SignatureType::PrimaryKeyBinding,
            sub.public.algorithm,
            config.hash,
            creation_time,
        );
        embedded.issuer_key_id = Some(primary.public.key_id);
        embedded.cross_sign_key(&primary.public, &sub)?;
        binding.embedded_signature = Some(Box::new(embedded));

        binding.sign_subkey_binding(primary, &sub.public)?;

        debug!(
            key_id = format_args!("{:016x}", sub.public.key_id),
            algorithm = %sub.public.algorithm,
            "bound signing subkey"
        );
        self.subkeys.push(Subkey {
            private_key: sub,
            binding,
        });
        Ok(())
    }

    /// Adds an encryption subkey bound by the primary key.
    pub fn add_encryption_subkey<R: CryptoRng + RngCore>(
        &mut self,
        rng: &mut R,
        config: &Config,
    ) -> Result<()> {
        let creation_time = config.creation_time_secs();
        let lifetime = config.key_lifetime_secs;
        let mut feed = config.rsa_primes.clone();
        self.add_encryption_subkey_internal(rng, config, &mut feed, creation_time, lifetime)
    }

    fn add_encryption_subkey_internal<R: CryptoRng + RngCore>(
        &mut self,
        rng: &mut R,
        config: &Config,
        feed: &mut Vec<BigUint>,
        creation_time: u32,
        lifetime: u32,
    ) -> Result<()> {
        let material = factory::new_decrypter_from_feed(rng, config, feed)?;
        let mut sub = PrivateKey::new_decrypter(KeyVersion::V4, creation_time, material)?;
        if config.v6_keys {
            sub.public.upgrade_to_v6();
        }
        sub.public.is_subkey = true;

        let primary = &self.private_key;
        let mut binding = Signature::new(
            primary.public.version.version_byte(),
            SignatureType::SubkeyBinding,
            primary.public.algorithm,
            config.hash,
            creation_time,
        );
        binding.key_lifetime_secs = Some(lifetime);
        binding.issuer_key_id = Some(primary.public.key_id);
        binding.issuer_fingerprint = primary.public.fingerprint.clone();
        binding.flags_valid = true;
        binding.flag_encrypt_storage = true;
        binding.flag_encrypt_communications = true;

        binding.sign_subkey_binding(primary, &sub.public)?;

        debug!(
            key_id = format_args!("{:016x}", sub.public.key_id),
            algorithm = %sub.public.algorithm,
            "bound encryption subkey"
        );
        self.subkeys.push(Subkey {
            private_key: sub,
            binding,
        });
        Ok(())
    }

    /// Verifies every self-signature and subkey binding, including the
    /// embedded cross-signature required of signing subkeys.
    pub fn validate(&self) -> Result<()> {
        let primary = self.primary_key();
        for identity in self.identities.values() {
            identity
                .self_signature
                .verify_user_id(&identity.name, primary)?;
        }
        for subkey in &self.subkeys {
            subkey
                .binding
                .verify_subkey_binding(primary, subkey.public_key())?;
        }
        Ok(())
    }

    /// The first subkey capable of encryption, if any.
    pub fn encryption_subkey(&self) -> Option<&Subkey> {
        self.subkeys
            .iter()
            .find(|s| s.public_key().algorithm.can_encrypt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PublicKeyAlgorithm;
    use rand::rngs::OsRng;

    fn ecdsa_config() -> Config {
        Config {
            public_key_algorithm: PublicKeyAlgorithm::Ecdsa,
            curve_name: "nistp256".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_new_entity_shape() {
        let mut rng = OsRng;
        let entity =
            Entity::new("Alice", "", "alice@example.org", &mut rng, &ecdsa_config()).unwrap();

        assert_eq!(entity.identities.len(), 1);
        assert!(entity.identities.contains_key("Alice <alice@example.org>"));
        assert_eq!(entity.subkeys.len(), 1);
        assert_eq!(
            entity.subkeys[0].public_key().algorithm,
            PublicKeyAlgorithm::Ecdh
        );
        assert_eq!(entity.subkeys[0].binding.key_lifetime_secs, Some(0));
        assert!(entity.subkeys[0].public_key().is_subkey);
        entity.validate().unwrap();
    }

    #[test]
    fn test_duplicate_user_id_rejected() {
        let mut rng = OsRng;
        let config = ecdsa_config();
        let mut entity = Entity::new("Alice", "", "alice@example.org", &mut rng, &config).unwrap();

        let err = entity
            .add_user_id("Alice", "", "alice@example.org", &mut rng, &config)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m == "user id exist"));
    }

    #[test]
    fn test_invalid_user_id_characters_rejected() {
        let mut rng = OsRng;
        let err = Entity::new("Al(ice", "", "", &mut rng, &ecdsa_config()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArgument(ref m) if m == "user id field contained invalid characters"
        ));
    }

    #[test]
    fn test_signing_subkey_carries_cross_signature() {
        let mut rng = OsRng;
        let config = ecdsa_config();
        let mut entity = Entity::new("Alice", "", "alice@example.org", &mut rng, &config).unwrap();
        entity.add_signing_subkey(&mut rng, &config).unwrap();

        let signing = entity.subkeys.last().unwrap();
        let embedded = signing.binding.embedded_signature.as_deref().unwrap();
        assert_eq!(embedded.sig_type, SignatureType::PrimaryKeyBinding);
        entity.validate().unwrap();

        // Stripping the cross-signature must make validation fail.
        let mut broken = entity.clone();
        broken.subkeys.last_mut().unwrap().binding.embedded_signature = None;
        assert!(broken.validate().is_err());
    }
}
