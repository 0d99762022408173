//! Configuration for key generation and packet construction.
//!
//! A plain value type with sensible defaults; there is no absent
//! configuration at run time. The prepared-prime feed for deterministic
//! RSA generation is taken by value when consumed, so the configuration
//! itself is never mutated by key generation.

use crate::crypto::{
    AeadMode, CipherFunction, CompressionAlgorithm, HashAlgorithm, PublicKeyAlgorithm,
    SphincsPlusParameter,
};
use crate::packet::KeyVersion;
use num_bigint_dig::BigUint;
use std::time::{SystemTime, UNIX_EPOCH};

/// AEAD configuration; its presence switches PKESK emission to v6 and sets
/// the AEAD flag on self-signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AeadConfig {
    /// Preferred AEAD mode
    pub mode: AeadMode,
}

impl Default for AeadConfig {
    fn default() -> Self {
        Self {
            mode: AeadMode::Eax,
        }
    }
}

/// Configuration consumed by key generation, entity assembly and the PKESK
/// codec.
#[derive(Clone)]
pub struct Config {
    /// Current-time source
    pub time_source: fn() -> SystemTime,
    /// Default hash for self and binding signatures
    pub hash: HashAlgorithm,
    /// Default symmetric cipher for the preferred list
    pub cipher: CipherFunction,
    /// Default compression for the preferred list
    pub compression: CompressionAlgorithm,
    /// AEAD configuration; `Some` enables v6 PKESK emission
    pub aead: Option<AeadConfig>,
    /// RSA modulus size in bits
    pub rsa_bits: usize,
    /// Prepared primes for deterministic RSA generation
    pub rsa_primes: Vec<BigUint>,
    /// Signing algorithm family
    pub public_key_algorithm: PublicKeyAlgorithm,
    /// Curve generator name for ECDSA/EdDSA/ECDH
    pub curve_name: String,
    /// SPHINCS+ parameter set
    pub sphincs_plus_parameter: SphincsPlusParameter,
    /// Key lifetime in seconds; 0 means no expiry
    pub key_lifetime_secs: u32,
    /// Emit V6 keys (required by every post-quantum algorithm)
    pub v6_keys: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_source: SystemTime::now,
            hash: HashAlgorithm::Sha256,
            cipher: CipherFunction::Aes128,
            compression: CompressionAlgorithm::None,
            aead: None,
            rsa_bits: 2048,
            rsa_primes: Vec::new(),
            public_key_algorithm: PublicKeyAlgorithm::Rsa,
            curve_name: "curve25519".to_string(),
            sphincs_plus_parameter: SphincsPlusParameter::Param128s,
            key_lifetime_secs: 0,
            v6_keys: false,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("hash", &self.hash)
            .field("cipher", &self.cipher)
            .field("compression", &self.compression)
            .field("aead", &self.aead)
            .field("rsa_bits", &self.rsa_bits)
            .field("prepared_primes", &self.rsa_primes.len())
            .field("public_key_algorithm", &self.public_key_algorithm)
            .field("curve_name", &self.curve_name)
            .field("sphincs_plus_parameter", &self.sphincs_plus_parameter)
            .field("key_lifetime_secs", &self.key_lifetime_secs)
            .field("v6_keys", &self.v6_keys)
            .finish()
    }
}

impl Config {
    /// The current time from the configured source.
    pub fn now(&self) -> SystemTime {
        (self.time_source)()
    }

    /// The current time as seconds since the epoch, for packet fields.
    pub fn creation_time_secs(&self) -> u32 {
        self.now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0)
    }

    /// Whether v6 PKESK packets should be emitted.
    pub fn aead_supported(&self) -> bool {
        self.aead.is_some()
    }

    /// The preferred AEAD mode, defaulting to EAX.
    pub fn aead_mode(&self) -> AeadMode {
        self.aead.map(|a| a.mode).unwrap_or(AeadMode::Eax)
    }

    /// The key format version new keys are created with.
    pub fn key_version(&self) -> KeyVersion {
        if self.v6_keys {
            KeyVersion::V6
        } else {
            KeyVersion::V4
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.hash, HashAlgorithm::Sha256);
        assert_eq!(config.cipher, CipherFunction::Aes128);
        assert_eq!(config.compression, CompressionAlgorithm::None);
        assert!(config.aead.is_none());
        assert!(!config.aead_supported());
        assert_eq!(config.aead_mode(), AeadMode::Eax);
        assert_eq!(config.rsa_bits, 2048);
        assert_eq!(config.key_version(), KeyVersion::V4);
    }

    #[test]
    fn test_injected_time_source() {
        let config = Config {
            time_source: || UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000),
            ..Config::default()
        };
        assert_eq!(config.creation_time_secs(), 1_700_000_000);
    }

    #[test]
    fn test_aead_enables_v6_pkesk() {
        let config = Config {
            aead: Some(AeadConfig {
                mode: AeadMode::Ocb,
            }),
            ..Config::default()
        };
        assert!(config.aead_supported());
        assert_eq!(config.aead_mode(), AeadMode::Ocb);
    }
}
