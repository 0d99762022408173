//! Public key packets.
//!
//! Carries the algorithm-tagged public parameters together with the
//! fingerprint and key id derived from them. V4 keys use 20-byte SHA-1
//! fingerprints; V6 keys use 32-byte SHA-256 fingerprints over an extended
//! hash input.

use crate::crypto::{
    dilithium_ecdsa, dilithium_eddsa, ecdh, ecdsa, eddsa, elgamal, kyber_ecdh, rsa, sphincs_plus,
    x25519, x448, HashAlgorithm, PublicKeyAlgorithm,
};
use crate::error::{Error, Result};
use crate::packet::encoding::{Field, Mpi, OidSlice};
use crate::packet::signature::SignatureMaterial;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Key format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyVersion {
    /// 20-byte SHA-1 fingerprint
    V4,
    /// 32-byte SHA-256 fingerprint, required for post-quantum algorithms
    V6,
}

impl KeyVersion {
    /// The version octet carried in key packets and PKESK v6 headers.
    pub fn version_byte(self) -> u8 {
        match self {
            Self::V4 => 4,
            Self::V6 => 6,
        }
    }

    /// Fingerprint length in bytes.
    pub fn fingerprint_len(self) -> usize {
        match self {
            Self::V4 => 20,
            Self::V6 => 32,
        }
    }
}

/// Algorithm-tagged public parameters.
#[derive(Debug, Clone)]
pub enum PublicParams {
    /// RSA modulus and exponent
    Rsa(rsa::PublicKey),
    /// ElGamal group and public value
    ElGamal(elgamal::PublicKey),
    /// ECDSA curve and point
    Ecdsa(ecdsa::PublicKey),
    /// EdDSA curve and point
    EdDsa(eddsa::PublicKey),
    /// ECDH curve, KDF parameters and point
    Ecdh(ecdh::PublicKey),
    /// X25519 public key
    X25519(x25519::PublicKey),
    /// X448 public key
    X448(x448::PublicKey),
    /// Kyber+ECDH hybrid public components
    KyberEcdh(kyber_ecdh::PublicKey),
    /// Dilithium+ECDSA hybrid public components
    DilithiumEcdsa(dilithium_ecdsa::PublicKey),
    /// Dilithium+EdDSA hybrid public components
    DilithiumEdDsa(dilithium_eddsa::PublicKey),
    /// SPHINCS+ public key
    SphincsPlus(sphincs_plus::PublicKey),
}

impl PublicParams {
    /// Whether the parameter family matches the algorithm identifier.
    pub fn matches(&self, algorithm: PublicKeyAlgorithm) -> bool {
        use PublicKeyAlgorithm as A;
        match self {
            Self::Rsa(_) => {
                matches!(algorithm, A::Rsa | A::RsaEncryptOnly | A::RsaSignOnly)
            }
            Self::ElGamal(_) => algorithm == A::ElGamal,
            Self::Ecdsa(_) => algorithm == A::Ecdsa,
            Self::EdDsa(_) => algorithm == A::EdDsa,
            Self::Ecdh(_) => algorithm == A::Ecdh,
            Self::X25519(_) => algorithm == A::X25519,
            Self::X448(_) => algorithm == A::X448,
            Self::KyberEcdh(k) => algorithm == k.algorithm,
            Self::DilithiumEcdsa(d) => algorithm == d.algorithm,
            Self::DilithiumEdDsa(d) => algorithm == d.algorithm,
            Self::SphincsPlus(s) => {
                algorithm
                    == match s.mode {
                        crate::crypto::SphincsPlusMode::Sha2 => A::SphincsPlusSha2,
                        crate::crypto::SphincsPlusMode::Shake => A::SphincsPlusShake,
                    }
            }
        }
    }

    /// Serializes the algorithm-specific key material.
    fn serialize_material(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Self::Rsa(k) => {
                out.extend_from_slice(&Mpi::new(&k.n.to_bytes_be()).encoded_bytes());
                out.extend_from_slice(&Mpi::new(&k.e.to_bytes_be()).encoded_bytes());
            }
            Self::ElGamal(k) => {
                out.extend_from_slice(&Mpi::new(&k.p.to_bytes_be()).encoded_bytes());
                out.extend_from_slice(&Mpi::new(&k.g.to_bytes_be()).encoded_bytes());
                out.extend_from_slice(&Mpi::new(&k.y.to_bytes_be()).encoded_bytes());
            }
            Self::Ecdsa(k) => {
                out.extend_from_slice(&oid_bytes(k.curve));
                out.extend_from_slice(&Mpi::new(&k.point).encoded_bytes());
            }
            Self::EdDsa(k) => {
                out.extend_from_slice(&oid_bytes(k.curve));
                out.extend_from_slice(
                    &Mpi::new(&ecdh::to_wire_point(k.curve, &k.point)).encoded_bytes(),
                );
            }
            Self::Ecdh(k) => {
                out.extend_from_slice(&oid_bytes(k.curve));
                out.extend_from_slice(
                    &Mpi::new(&ecdh::to_wire_point(k.curve, &k.point)).encoded_bytes(),
                );
                // KDF parameters: length, reserved format octet, hash, cipher.
                out.extend_from_slice(&[0x03, 0x01, k.kdf.hash as u8, k.kdf.cipher as u8]);
            }
            Self::X25519(k) => out.extend_from_slice(&k.point),
            Self::X448(k) => out.extend_from_slice(&k.point),
            Self::KyberEcdh(k) => {
                out.extend_from_slice(&k.ecdh_point);
                out.extend_from_slice(&k.kyber_public);
            }
            Self::DilithiumEcdsa(k) => {
                out.extend_from_slice(&k.ecdsa_point);
                out.extend_from_slice(&k.dilithium_public);
            }
            Self::DilithiumEdDsa(k) => {
                out.extend_from_slice(&k.eddsa_point);
                out.extend_from_slice(&k.dilithium_public);
            }
            Self::SphincsPlus(k) => {
                out.push(k.parameter as u8);
                out.extend_from_slice(&k.public);
            }
        }
        out
    }
}

fn oid_bytes(curve: crate::crypto::ecc::CurveId) -> Vec<u8> {
    OidSlice::new(curve.oid())
        .expect("registry OIDs are short")
        .encoded_bytes()
}

/// A public key packet.
#[derive(Debug, Clone)]
pub struct PublicKey {
    /// Key format version
    pub version: KeyVersion,
    /// Creation time, seconds since the epoch
    pub creation_time: u32,
    /// Algorithm identifier
    pub algorithm: PublicKeyAlgorithm,
    /// Algorithm-specific parameters
    pub params: PublicParams,
    /// V4 20-byte or V6 32-byte fingerprint
    pub fingerprint: Vec<u8>,
    /// Trailing-8-bytes key id derived from the fingerprint
    pub key_id: u64,
    /// Whether this key is bound as a subkey
    pub is_subkey: bool,
}

impl PublicKey {
    /// Builds a public key, computing its fingerprint and key id.
    pub fn new(
        version: KeyVersion,
        creation_time: u32,
        algorithm: PublicKeyAlgorithm,
        params: PublicParams,
    ) -> Result<Self> {
        if !params.matches(algorithm) {
            return Err(Error::invalid_argument(
                "public parameters do not match the algorithm identifier",
            ));
        }
        let mut key = Self {
            version,
            creation_time,
            algorithm,
            params,
            fingerprint: Vec::new(),
            key_id: 0,
            is_subkey: false,
        };
        key.recompute_identity();
        Ok(key)
    }

    /// Upgrades a V4 key to the V6 layout, extending the fingerprint input
    /// and length.
    pub fn upgrade_to_v6(&mut self) {
        self.version = KeyVersion::V6;
        self.recompute_identity();
    }

    fn recompute_identity(&mut self) {
        let hashed = self.serialize_for_hash();
        match self.version {
            KeyVersion::V4 => {
                let digest = Sha1::digest(&hashed);
                self.fingerprint = digest.to_vec();
                let mut id = [0u8; 8];
                id.copy_from_slice(&self.fingerprint[12..20]);
                self.key_id = u64::from_be_bytes(id);
            }
            KeyVersion::V6 => {
                let digest = Sha256::digest(&hashed);
                self.fingerprint = digest.to_vec();
                let mut id = [0u8; 8];
                id.copy_from_slice(&self.fingerprint[0..8]);
                self.key_id = u64::from_be_bytes(id);
            }
        }
    }

    /// Serializes the packet body: version, creation time, algorithm and
    /// key material.
    pub fn serialize_payload(&self) -> Vec<u8> {
        let material = self.params.serialize_material();
        let mut out = Vec::with_capacity(material.len() + 10);
        out.push(self.version.version_byte());
        out.extend_from_slice(&self.creation_time.to_be_bytes());
        out.push(self.algorithm as u8);
        if self.version == KeyVersion::V6 {
            out.extend_from_slice(&(material.len() as u32).to_be_bytes());
        }
        out.extend_from_slice(&material);
        out
    }

    /// The canonical hash input for this key: the payload behind a
    /// version-specific prefix and length.
    pub fn serialize_for_hash(&self) -> Vec<u8> {
        let payload = self.serialize_payload();
        let mut out = Vec::with_capacity(payload.len() + 5);
        match self.version {
            KeyVersion::V4 => {
                out.push(0x99);
                out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
            }
            KeyVersion::V6 => {
                out.push(0x9a);
                out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            }
        }
        out.extend_from_slice(&payload);
        out
    }

    /// Verifies a signature material over `data` under this key.
    pub fn verify_material(
        &self,
        hash: HashAlgorithm,
        data: &[u8],
        material: &SignatureMaterial,
    ) -> Result<()> {
        match (&self.params, material) {
            (PublicParams::Rsa(k), SignatureMaterial::Rsa { s }) => {
                let digest = hash.digest(data)?;
                rsa::verify_pkcs1v15(k, hash, &digest, s)
            }
            (PublicParams::Ecdsa(k), SignatureMaterial::Ecdsa { sig }) => {
                ecdsa::verify(k, data, sig)
            }
            (PublicParams::EdDsa(k), SignatureMaterial::EdDsa { sig }) => {
                eddsa::verify(k, data, sig)
            }
            (
                PublicParams::DilithiumEcdsa(k),
                SignatureMaterial::DilithiumEcdsa { dilithium, ecdsa },
            ) => dilithium_ecdsa::verify(k, data, dilithium, ecdsa),
            (
                PublicParams::DilithiumEdDsa(k),
                SignatureMaterial::DilithiumEdDsa { dilithium, eddsa },
            ) => dilithium_eddsa::verify(k, data, dilithium, eddsa),
            (PublicParams::SphincsPlus(k), SignatureMaterial::SphincsPlus { sig }) => {
                sphincs_plus::verify(k, data, sig)
            }
            _ => Err(Error::invalid_argument(
                "signature material does not match the key algorithm",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ecc::CurveId;
    use rand::rngs::OsRng;

    fn ed25519_key(version: KeyVersion) -> PublicKey {
        let mut rng = OsRng;
        let key = eddsa::generate_key(&mut rng, CurveId::Ed25519).unwrap();
        PublicKey::new(
            version,
            1_700_000_000,
            PublicKeyAlgorithm::EdDsa,
            PublicParams::EdDsa(key.public.clone()),
        )
        .unwrap()
    }

    #[test]
    fn test_v4_fingerprint_and_key_id() {
        let key = ed25519_key(KeyVersion::V4);
        assert_eq!(key.fingerprint.len(), 20);
        let mut expected = [0u8; 8];
        expected.copy_from_slice(&key.fingerprint[12..20]);
        assert_eq!(key.key_id, u64::from_be_bytes(expected));
    }

    #[test]
    fn test_v6_fingerprint_and_key_id() {
        let key = ed25519_key(KeyVersion::V6);
        assert_eq!(key.fingerprint.len(), 32);
        let mut expected = [0u8; 8];
        expected.copy_from_slice(&key.fingerprint[0..8]);
        assert_eq!(key.key_id, u64::from_be_bytes(expected));
    }

    #[test]
    fn test_upgrade_recomputes_identity() {
        let mut key = ed25519_key(KeyVersion::V4);
        let v4_fingerprint = key.fingerprint.clone();
        key.upgrade_to_v6();
        assert_eq!(key.fingerprint.len(), 32);
        assert_ne!(key.fingerprint, v4_fingerprint);
    }

    #[test]
    fn test_params_algorithm_mismatch_rejected() {
        let mut rng = OsRng;
        let key = eddsa::generate_key(&mut rng, CurveId::Ed25519).unwrap();
        assert!(PublicKey::new(
            KeyVersion::V4,
            1_700_000_000,
            PublicKeyAlgorithm::Ecdsa,
            PublicParams::EdDsa(key.public.clone()),
        )
        .is_err());
    }

    #[test]
    fn test_hash_input_is_version_prefixed() {
        let key = ed25519_key(KeyVersion::V4);
        let hashed = key.serialize_for_hash();
        assert_eq!(hashed[0], 0x99);

        let key = ed25519_key(KeyVersion::V6);
        let hashed = key.serialize_for_hash();
        assert_eq!(hashed[0], 0x9a);
    }
}
