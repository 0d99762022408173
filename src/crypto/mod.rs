//! Algorithm registry and cryptographic facades.
//!
//! This module owns the closed enumeration of OpenPGP public-key algorithm
//! identifiers together with their static metadata (family, version
//! requirements, hybrid parameter sets, fixed component lengths), and the
//! identifier spaces for symmetric ciphers, hashes, compression and AEAD
//! modes. The submodules provide uniform capability shims over the concrete
//! primitive implementations.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt;
use subtle::ConstantTimeEq;

pub mod dilithium_ecdsa;
pub mod dilithium_eddsa;
pub mod ecc;
pub mod ecdh;
pub mod ecdsa;
pub mod eddsa;
pub mod elgamal;
pub mod kyber_ecdh;
pub mod rsa;
pub mod sphincs_plus;
pub(crate) mod wrap;
pub mod x25519;
pub mod x448;

use ecc::CurveId;

/// OpenPGP public-key algorithm identifiers recognized by this crate.
///
/// Values 1..22 are the RFC 4880 registry; 25/26 are the crypto-refresh
/// CFRG algorithms; 29..42 are the experimental post-quantum allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PublicKeyAlgorithm {
    /// RSA (encrypt or sign)
    Rsa = 1,
    /// RSA encrypt-only (deprecated)
    RsaEncryptOnly = 2,
    /// RSA sign-only (deprecated)
    RsaSignOnly = 3,
    /// ElGamal (encrypt-only)
    ElGamal = 16,
    /// DSA
    Dsa = 17,
    /// ECDH
    Ecdh = 18,
    /// ECDSA
    Ecdsa = 19,
    /// EdDSA (legacy encoding)
    EdDsa = 22,
    /// X25519
    X25519 = 25,
    /// X448
    X448 = 26,
    /// Kyber-768 + X25519 hybrid KEM
    Kyber768X25519 = 29,
    /// Kyber-1024 + X448 hybrid KEM
    Kyber1024X448 = 30,
    /// Kyber-768 + NIST P-256 hybrid KEM
    Kyber768P256 = 31,
    /// Kyber-1024 + NIST P-384 hybrid KEM
    Kyber1024P384 = 32,
    /// Kyber-768 + Brainpool P-256r1 hybrid KEM
    Kyber768Brainpool256 = 33,
    /// Kyber-1024 + Brainpool P-384r1 hybrid KEM
    Kyber1024Brainpool384 = 34,
    /// Dilithium3 + Ed25519 hybrid signature
    Dilithium3Ed25519 = 35,
    /// Dilithium5 + Ed448 hybrid signature
    Dilithium5Ed448 = 36,
    /// Dilithium3 + NIST P-256 hybrid signature
    Dilithium3P256 = 37,
    /// Dilithium5 + NIST P-384 hybrid signature
    Dilithium5P384 = 38,
    /// Dilithium3 + Brainpool P-256r1 hybrid signature
    Dilithium3Brainpool256 = 39,
    /// Dilithium5 + Brainpool P-384r1 hybrid signature
    Dilithium5Brainpool384 = 40,
    /// SPHINCS+ with SHA2 internal hashing
    SphincsPlusSha2 = 41,
    /// SPHINCS+ with SHAKE internal hashing
    SphincsPlusShake = 42,
}

/// Capability family of a public-key algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmFamily {
    /// Signing and verification only
    Sign,
    /// Encryption and decryption only
    Encrypt,
    /// Both capabilities
    Both,
}

impl PublicKeyAlgorithm {
    /// Converts a registry byte to an algorithm identifier.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Rsa),
            2 => Some(Self::RsaEncryptOnly),
            3 => Some(Self::RsaSignOnly),
            16 => Some(Self::ElGamal),
            17 => Some(Self::Dsa),
            18 => Some(Self::Ecdh),
            19 => Some(Self::Ecdsa),
            22 => Some(Self::EdDsa),
            25 => Some(Self::X25519),
            26 => Some(Self::X448),
            29 => Some(Self::Kyber768X25519),
            30 => Some(Self::Kyber1024X448),
            31 => Some(Self::Kyber768P256),
            32 => Some(Self::Kyber1024P384),
            33 => Some(Self::Kyber768Brainpool256),
            34 => Some(Self::Kyber1024Brainpool384),
            35 => Some(Self::Dilithium3Ed25519),
            36 => Some(Self::Dilithium5Ed448),
            37 => Some(Self::Dilithium3P256),
            38 => Some(Self::Dilithium5P384),
            39 => Some(Self::Dilithium3Brainpool256),
            40 => Some(Self::Dilithium5Brainpool384),
            41 => Some(Self::SphincsPlusSha2),
            42 => Some(Self::SphincsPlusShake),
            _ => None,
        }
    }

    /// Returns the capability family.
    pub fn family(self) -> AlgorithmFamily {
        match self {
            Self::Rsa => AlgorithmFamily::Both,
            Self::RsaEncryptOnly | Self::ElGamal | Self::Ecdh => AlgorithmFamily::Encrypt,
            Self::X25519 | Self::X448 => AlgorithmFamily::Encrypt,
            Self::Kyber768X25519
            | Self::Kyber1024X448
            | Self::Kyber768P256
            | Self::Kyber1024P384
            | Self::Kyber768Brainpool256
            | Self::Kyber1024Brainpool384 => AlgorithmFamily::Encrypt,
            Self::RsaSignOnly | Self::Dsa | Self::Ecdsa | Self::EdDsa => AlgorithmFamily::Sign,
            Self::Dilithium3Ed25519
            | Self::Dilithium5Ed448
            | Self::Dilithium3P256
            | Self::Dilithium5P384
            | Self::Dilithium3Brainpool256
            | Self::Dilithium5Brainpool384
            | Self::SphincsPlusSha2
            | Self::SphincsPlusShake => AlgorithmFamily::Sign,
        }
    }

    /// Whether keys of this algorithm can produce signatures.
    pub fn can_sign(self) -> bool {
        !matches!(self.family(), AlgorithmFamily::Encrypt)
    }

    /// Whether keys of this algorithm can decrypt session keys.
    pub fn can_encrypt(self) -> bool {
        !matches!(self.family(), AlgorithmFamily::Sign)
    }

    /// True for every Kyber-hybrid, Dilithium-hybrid and SPHINCS+ algorithm:
    /// those exist only in the V6 key format.
    pub fn requires_v6(self) -> bool {
        matches!(
            self,
            Self::Kyber768X25519
                | Self::Kyber1024X448
                | Self::Kyber768P256
                | Self::Kyber1024P384
                | Self::Kyber768Brainpool256
                | Self::Kyber1024Brainpool384
                | Self::Dilithium3Ed25519
                | Self::Dilithium5Ed448
                | Self::Dilithium3P256
                | Self::Dilithium5P384
                | Self::Dilithium3Brainpool256
                | Self::Dilithium5Brainpool384
                | Self::SphincsPlusSha2
                | Self::SphincsPlusShake
        )
    }

    /// Maps a post-quantum signing algorithm to the Kyber-hybrid KEM sharing
    /// its ECC component. SPHINCS+ carries no curve, so its KEM is chosen by
    /// the parameter-set size.
    pub fn matching_kem(self, sphincs_param: SphincsPlusParameter) -> Result<Self> {
        match self {
            Self::Dilithium3Ed25519 => Ok(Self::Kyber768X25519),
            Self::Dilithium5Ed448 => Ok(Self::Kyber1024X448),
            Self::Dilithium3P256 => Ok(Self::Kyber768P256),
            Self::Dilithium5P384 => Ok(Self::Kyber1024P384),
            Self::Dilithium3Brainpool256 => Ok(Self::Kyber768Brainpool256),
            Self::Dilithium5Brainpool384 => Ok(Self::Kyber1024Brainpool384),
            Self::SphincsPlusSha2 | Self::SphincsPlusShake => {
                if sphincs_param.security_bits() <= 128 {
                    Ok(Self::Kyber768X25519)
                } else {
                    Ok(Self::Kyber1024X448)
                }
            }
            _ => Err(Error::invalid_argument(format!(
                "no matching KEM for algorithm {}",
                self as u8
            ))),
        }
    }

    /// Resolves the ECDH curve of a Kyber-hybrid KEM.
    pub fn ecdh_curve_of_hybrid(self) -> Result<CurveId> {
        match self {
            Self::Kyber768X25519 => Ok(CurveId::Curve25519),
            Self::Kyber1024X448 => Ok(CurveId::Curve448),
            Self::Kyber768P256 => Ok(CurveId::NistP256),
            Self::Kyber1024P384 => Ok(CurveId::NistP384),
            Self::Kyber768Brainpool256 => Ok(CurveId::BrainpoolP256),
            Self::Kyber1024Brainpool384 => Ok(CurveId::BrainpoolP384),
            _ => Err(Error::invalid_argument(format!(
                "algorithm {} is not a Kyber-hybrid KEM",
                self as u8
            ))),
        }
    }

    /// Resolves the ECDSA curve of a Dilithium-ECDSA hybrid.
    pub fn ecdsa_curve_of_hybrid(self) -> Result<CurveId> {
        match self {
            Self::Dilithium3P256 => Ok(CurveId::NistP256),
            Self::Dilithium5P384 => Ok(CurveId::NistP384),
            Self::Dilithium3Brainpool256 => Ok(CurveId::BrainpoolP256),
            Self::Dilithium5Brainpool384 => Ok(CurveId::BrainpoolP384),
            _ => Err(Error::invalid_argument(format!(
                "algorithm {} is not a Dilithium-ECDSA hybrid",
                self as u8
            ))),
        }
    }

    /// Resolves the EdDSA curve of a Dilithium-EdDSA hybrid.
    pub fn eddsa_curve_of_hybrid(self) -> Result<CurveId> {
        match self {
            Self::Dilithium3Ed25519 => Ok(CurveId::Ed25519),
            Self::Dilithium5Ed448 => Ok(CurveId::Ed448),
            _ => Err(Error::invalid_argument(format!(
                "algorithm {} is not a Dilithium-EdDSA hybrid",
                self as u8
            ))),
        }
    }

    /// Resolves the Kyber parameter set of a hybrid algorithm.
    pub fn kyber_parameters(self) -> Result<KyberParameters> {
        match self {
            Self::Kyber768X25519 | Self::Kyber768P256 | Self::Kyber768Brainpool256 => {
                Ok(KyberParameters::Kyber768)
            }
            Self::Kyber1024X448 | Self::Kyber1024P384 | Self::Kyber1024Brainpool384 => {
                Ok(KyberParameters::Kyber1024)
            }
            _ => Err(Error::invalid_argument(format!(
                "algorithm {} carries no Kyber component",
                self as u8
            ))),
        }
    }

    /// Resolves the Dilithium parameter set of a hybrid algorithm.
    pub fn dilithium_parameters(self) -> Result<DilithiumParameters> {
        match self {
            Self::Dilithium3Ed25519 | Self::Dilithium3P256 | Self::Dilithium3Brainpool256 => {
                Ok(DilithiumParameters::Dilithium3)
            }
            Self::Dilithium5Ed448 | Self::Dilithium5P384 | Self::Dilithium5Brainpool384 => {
                Ok(DilithiumParameters::Dilithium5)
            }
            _ => Err(Error::invalid_argument(format!(
                "algorithm {} carries no Dilithium component",
                self as u8
            ))),
        }
    }

    /// Resolves the SPHINCS+ internal hashing mode.
    pub fn sphincs_plus_mode(self) -> Result<SphincsPlusMode> {
        match self {
            Self::SphincsPlusSha2 => Ok(SphincsPlusMode::Sha2),
            Self::SphincsPlusShake => Ok(SphincsPlusMode::Shake),
            _ => Err(Error::invalid_argument(format!(
                "algorithm {} is not SPHINCS+",
                self as u8
            ))),
        }
    }

    /// Fixed length in bytes of the ECC ephemeral component in a
    /// Kyber-hybrid PKESK.
    pub fn kyber_ecc_len(self) -> Result<usize> {
        match self {
            Self::Kyber768X25519 => Ok(32),
            Self::Kyber1024X448 => Ok(56),
            Self::Kyber768P256 | Self::Kyber768Brainpool256 => Ok(65),
            Self::Kyber1024P384 | Self::Kyber1024Brainpool384 => Ok(97),
            _ => Err(Error::invalid_argument(format!(
                "algorithm {} is not a Kyber-hybrid KEM",
                self as u8
            ))),
        }
    }

    /// Fixed length in bytes of the Kyber ciphertext in a Kyber-hybrid PKESK.
    pub fn kyber_ct_len(self) -> Result<usize> {
        Ok(self.kyber_parameters()?.ciphertext_len())
    }

    /// Returns the algorithm name as a string.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::RsaEncryptOnly => "RSA (encrypt-only)",
            Self::RsaSignOnly => "RSA (sign-only)",
            Self::ElGamal => "ElGamal",
            Self::Dsa => "DSA",
            Self::Ecdh => "ECDH",
            Self::Ecdsa => "ECDSA",
            Self::EdDsa => "EdDSA",
            Self::X25519 => "X25519",
            Self::X448 => "X448",
            Self::Kyber768X25519 => "Kyber768+X25519",
            Self::Kyber1024X448 => "Kyber1024+X448",
            Self::Kyber768P256 => "Kyber768+P256",
            Self::Kyber1024P384 => "Kyber1024+P384",
            Self::Kyber768Brainpool256 => "Kyber768+Brainpool256",
            Self::Kyber1024Brainpool384 => "Kyber1024+Brainpool384",
            Self::Dilithium3Ed25519 => "Dilithium3+Ed25519",
            Self::Dilithium5Ed448 => "Dilithium5+Ed448",
            Self::Dilithium3P256 => "Dilithium3+P256",
            Self::Dilithium5P384 => "Dilithium5+P384",
            Self::Dilithium3Brainpool256 => "Dilithium3+Brainpool256",
            Self::Dilithium5Brainpool384 => "Dilithium5+Brainpool384",
            Self::SphincsPlusSha2 => "SPHINCS+-SHA2",
            Self::SphincsPlusShake => "SPHINCS+-SHAKE",
        }
    }
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kyber (ML-KEM) parameter sets used by the hybrid KEMs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KyberParameters {
    /// Kyber-768 (ML-KEM-768)
    Kyber768,
    /// Kyber-1024 (ML-KEM-1024)
    Kyber1024,
}

impl KyberParameters {
    /// Ciphertext length in bytes.
    pub fn ciphertext_len(self) -> usize {
        match self {
            Self::Kyber768 => 1088,
            Self::Kyber1024 => 1568,
        }
    }

    /// Public key length in bytes.
    pub fn public_key_len(self) -> usize {
        match self {
            Self::Kyber768 => 1184,
            Self::Kyber1024 => 1568,
        }
    }
}

/// Dilithium (ML-DSA) parameter sets used by the hybrid signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DilithiumParameters {
    /// Dilithium3 (ML-DSA-65)
    Dilithium3,
    /// Dilithium5 (ML-DSA-87)
    Dilithium5,
}

impl DilithiumParameters {
    /// Public key length in bytes.
    pub fn public_key_len(self) -> usize {
        match self {
            Self::Dilithium3 => 1952,
            Self::Dilithium5 => 2592,
        }
    }

    /// Signature length in bytes.
    pub fn signature_len(self) -> usize {
        match self {
            Self::Dilithium3 => 3309,
            Self::Dilithium5 => 4627,
        }
    }
}

/// SPHINCS+ internal hashing mode, fixed by the algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SphincsPlusMode {
    /// SHA2-based parameter sets
    Sha2,
    /// SHAKE-based parameter sets
    Shake,
}

/// SPHINCS+ parameter set, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SphincsPlusParameter {
    /// 128-bit security, small signatures
    Param128s,
    /// 128-bit security, fast signing
    Param128f,
    /// 192-bit security, small signatures
    Param192s,
    /// 192-bit security, fast signing
    Param192f,
    /// 256-bit security, small signatures
    Param256s,
    /// 256-bit security, fast signing
    Param256f,
}

impl SphincsPlusParameter {
    /// Classical security level in bits.
    pub fn security_bits(self) -> u32 {
        match self {
            Self::Param128s | Self::Param128f => 128,
            Self::Param192s | Self::Param192f => 192,
            Self::Param256s | Self::Param256f => 256,
        }
    }
}

/// Symmetric cipher identifiers from the OpenPGP registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CipherFunction {
    /// IDEA
    Idea = 1,
    /// Triple-DES
    TripleDes = 2,
    /// CAST5
    Cast5 = 3,
    /// Blowfish
    Blowfish = 4,
    /// AES with 128-bit key
    Aes128 = 7,
    /// AES with 192-bit key
    Aes192 = 8,
    /// AES with 256-bit key
    Aes256 = 9,
    /// Twofish
    Twofish = 10,
}

impl CipherFunction {
    /// Converts a registry byte to a cipher identifier.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Idea),
            2 => Some(Self::TripleDes),
            3 => Some(Self::Cast5),
            4 => Some(Self::Blowfish),
            7 => Some(Self::Aes128),
            8 => Some(Self::Aes192),
            9 => Some(Self::Aes256),
            10 => Some(Self::Twofish),
            _ => None,
        }
    }

    /// Whether this build can actually encrypt and decrypt with the cipher.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Aes128 | Self::Aes192 | Self::Aes256)
    }

    /// True for the AES family, the only ciphers a v3 CFRG PKESK may carry.
    pub fn is_aes(self) -> bool {
        matches!(self, Self::Aes128 | Self::Aes192 | Self::Aes256)
    }

    /// Key size in bytes.
    pub fn key_size(self) -> usize {
        match self {
            Self::Idea | Self::Cast5 | Self::Blowfish | Self::Aes128 => 16,
            Self::TripleDes | Self::Aes192 => 24,
            Self::Aes256 | Self::Twofish => 32,
        }
    }
}

/// Hash algorithm identifiers from the OpenPGP registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum HashAlgorithm {
    /// SHA-1 (fingerprints of V4 keys only, never signatures)
    Sha1 = 2,
    /// SHA-256
    Sha256 = 8,
    /// SHA-384
    Sha384 = 9,
    /// SHA-512
    Sha512 = 10,
    /// SHA3-256
    Sha3_256 = 12,
    /// SHA3-512
    Sha3_512 = 14,
}

impl HashAlgorithm {
    /// Converts a registry byte to a hash identifier.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            2 => Some(Self::Sha1),
            8 => Some(Self::Sha256),
            9 => Some(Self::Sha384),
            10 => Some(Self::Sha512),
            12 => Some(Self::Sha3_256),
            14 => Some(Self::Sha3_512),
            _ => None,
        }
    }

    /// Digest length in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 | Self::Sha3_256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 | Self::Sha3_512 => 64,
        }
    }

    /// Computes the digest of `data`.
    pub fn digest(self, data: &[u8]) -> Result<Vec<u8>> {
        use sha2::{Sha256, Sha384, Sha512};
        use sha3::Sha3_512;
        match self {
            Self::Sha256 => Ok(Sha256::digest(data).to_vec()),
            Self::Sha384 => Ok(Sha384::digest(data).to_vec()),
            Self::Sha512 => Ok(Sha512::digest(data).to_vec()),
            Self::Sha3_256 => Ok(Sha3_256::digest(data).to_vec()),
            Self::Sha3_512 => Ok(Sha3_512::digest(data).to_vec()),
            Self::Sha1 => Err(Error::unsupported(
                "SHA-1 is not acceptable as a signature hash",
            )),
        }
    }
}

/// Compression algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompressionAlgorithm {
    /// No compression
    None = 0,
    /// ZIP (deflate)
    Zip = 1,
    /// ZLIB
    Zlib = 2,
    /// BZip2
    Bzip2 = 3,
}

/// AEAD mode identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AeadMode {
    /// EAX
    Eax = 1,
    /// OCB
    Ocb = 2,
    /// GCM
    Gcm = 3,
}

/// Cryptographic hash function using SHA3-256, used for key binding hashes.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Constant-time comparison of key IDs to prevent timing side channels.
pub fn key_ids_equal(a: u64, b: u64) -> bool {
    a.to_be_bytes().ct_eq(&b.to_be_bytes()).into()
}

/// Constant-time comparison of fingerprints.
pub fn fingerprints_equal(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
