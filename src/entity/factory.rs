//! Key factory: generates signing and decryption key material from a
//! configuration.
//!
//! The decrypter path applies the substitution rules: a signing-only
//! classical family yields an ECDH subkey, and a post-quantum signing
//! algorithm yields the Kyber-hybrid KEM sharing its ECC component.

use crate::config::Config;
use crate::crypto::ecc;
use crate::crypto::{
    dilithium_ecdsa, dilithium_eddsa, ecdh, ecdsa, eddsa, kyber_ecdh, rsa, sphincs_plus, x25519,
    x448, CipherFunction, HashAlgorithm, PublicKeyAlgorithm,
};
use crate::error::{Error, Result};
use crate::packet::KeyMaterial;
use num_bigint_dig::BigUint;
use rand::{CryptoRng, RngCore};
use tracing::debug;

/// Generates signing key material for `config.public_key_algorithm`.
pub fn new_signer<R: CryptoRng + RngCore>(rng: &mut R, config: &Config) -> Result<KeyMaterial> {
    let mut feed = config.rsa_primes.clone();
    new_signer_from_feed(rng, config, &mut feed)
}

/// Generates decryption key material, applying the encryption-algorithm
/// substitution rules.
pub fn new_decrypter<R: CryptoRng + RngCore>(rng: &mut R, config: &Config) -> Result<KeyMaterial> {
    let mut feed = config.rsa_primes.clone();
    new_decrypter_from_feed(rng, config, &mut feed)
}

fn generate_rsa<R: CryptoRng + RngCore>(
    rng: &mut R,
    config: &Config,
    feed: &mut Vec<BigUint>,
) -> Result<KeyMaterial> {
    let bits = config.rsa_bits;
    if bits < 1024 {
        return Err(Error::invalid_argument("bits must be >= 1024"));
    }
    let key = if feed.len() >= 2 {
        let primes: Vec<BigUint> = feed.drain(..2).collect();
        rsa::generate_with_primes(rng, 2, bits, primes)?
    } else {
        rsa::generate(rng, bits)?
    };
    Ok(KeyMaterial::Rsa(key))
}

pub(crate) fn new_signer_from_feed<R: CryptoRng + RngCore>(
    rng: &mut R,
    config: &Config,
    feed: &mut Vec<BigUint>,
) -> Result<KeyMaterial> {
    let algorithm = config.public_key_algorithm;
    debug!(%algorithm, "generating signing key material");
    match algorithm {
        PublicKeyAlgorithm::Rsa => generate_rsa(rng, config, feed),
        PublicKeyAlgorithm::EdDsa => {
            let curve = ecc::find_eddsa_by_gen_name(&config.curve_name)
                .ok_or_else(|| Error::invalid_argument("unsupported curve"))?;
            Ok(KeyMaterial::EdDsa(eddsa::generate_key(rng, curve)?))
        }
        PublicKeyAlgorithm::Ecdsa => {
            let curve = ecc::find_ecdsa_by_gen_name(&config.curve_name)
                .ok_or_else(|| Error::invalid_argument("unsupported curve"))?;
            Ok(KeyMaterial::Ecdsa(ecdsa::generate_key(rng, curve)?))
        }
        PublicKeyAlgorithm::Dilithium3P256
        | PublicKeyAlgorithm::Dilithium5P384
        | PublicKeyAlgorithm::Dilithium3Brainpool256
        | PublicKeyAlgorithm::Dilithium5Brainpool384 => {
            if !config.v6_keys {
                return Err(Error::invalid_argument(
                    "cannot create a non-v6 dilithium_ecdsa key",
                ));
            }
            Ok(KeyMaterial::DilithiumEcdsa(dilithium_ecdsa::generate_key(
                rng, algorithm,
            )?))
        }
        PublicKeyAlgorithm::Dilithium3Ed25519 | PublicKeyAlgorithm::Dilithium5Ed448 => {
            if !config.v6_keys {
                return Err(Error::invalid_argument(
                    "cannot create a non-v6 dilithium_eddsa key",
                ));
            }
            Ok(KeyMaterial::DilithiumEdDsa(dilithium_eddsa::generate_key(
                rng, algorithm,
            )?))
        }
        PublicKeyAlgorithm::SphincsPlusSha2 | PublicKeyAlgorithm::SphincsPlusShake => {
            if !config.v6_keys {
                return Err(Error::invalid_argument(
                    "cannot create a non-v6 sphincs+ key",
                ));
            }
            let mode = algorithm.sphincs_plus_mode()?;
            Ok(KeyMaterial::SphincsPlus(sphincs_plus::generate_key(
                rng,
                mode,
                config.sphincs_plus_parameter,
            )?))
        }
        _ => Err(Error::invalid_argument("unsupported public key algorithm")),
    }
}

pub(crate) fn new_decrypter_from_feed<R: CryptoRng + RngCore>(
    rng: &mut R,
    config: &Config,
    feed: &mut Vec<BigUint>,
) -> Result<KeyMaterial> {
    let mut algorithm = config.public_key_algorithm;
    debug!(%algorithm, "generating decryption key material");

    // Post-quantum signing algorithms encrypt with their matching KEM.
    if matches!(
        algorithm,
        PublicKeyAlgorithm::Dilithium3Ed25519
            | PublicKeyAlgorithm::Dilithium5Ed448
            | PublicKeyAlgorithm::Dilithium3P256
            | PublicKeyAlgorithm::Dilithium5P384
            | PublicKeyAlgorithm::Dilithium3Brainpool256
            | PublicKeyAlgorithm::Dilithium5Brainpool384
            | PublicKeyAlgorithm::SphincsPlusSha2
            | PublicKeyAlgorithm::SphincsPlusShake
    ) {
        algorithm = algorithm.matching_kem(config.sphincs_plus_parameter)?;
    }

    match algorithm {
        PublicKeyAlgorithm::Rsa => generate_rsa(rng, config, feed),
        // A signing-only classical family yields an ECDH encryption subkey.
        PublicKeyAlgorithm::EdDsa | PublicKeyAlgorithm::Ecdsa | PublicKeyAlgorithm::Ecdh => {
            let kdf = ecdh::Kdf {
                hash: HashAlgorithm::Sha512,
                cipher: CipherFunction::Aes256,
            };
            let curve = ecc::find_ecdh_by_gen_name(&config.curve_name)
                .ok_or_else(|| Error::invalid_argument("unsupported curve"))?;
            Ok(KeyMaterial::Ecdh(ecdh::generate_key(rng, curve, kdf)?))
        }
        PublicKeyAlgorithm::X25519 => Ok(KeyMaterial::X25519(x25519::generate_key(rng)?)),
        PublicKeyAlgorithm::X448 => Ok(KeyMaterial::X448(x448::generate_key(rng)?)),
        PublicKeyAlgorithm::Kyber768X25519
        | PublicKeyAlgorithm::Kyber1024X448
        | PublicKeyAlgorithm::Kyber768P256
        | PublicKeyAlgorithm::Kyber1024P384
        | PublicKeyAlgorithm::Kyber768Brainpool256
        | PublicKeyAlgorithm::Kyber1024Brainpool384 => {
            if !config.v6_keys {
                return Err(Error::invalid_argument(
                    "cannot create a non-v6 kyber_ecdh key",
                ));
            }
            Ok(KeyMaterial::KyberEcdh(kyber_ecdh::generate_key(
                rng, algorithm,
            )?))
        }
        _ => Err(Error::invalid_argument("unsupported public key algorithm")),
    }
}
