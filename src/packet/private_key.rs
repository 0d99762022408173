//! Private key packets.
//!
//! A private key owns its secret material exclusively; the public half may
//! be shared read-only. A dummy key carries only the public half and acts
//! as a marker for secrets held elsewhere.

use crate::crypto::{
    dilithium_ecdsa, dilithium_eddsa, ecdh, ecdsa, eddsa, elgamal, kyber_ecdh, rsa, sphincs_plus,
    x25519, x448, HashAlgorithm, PublicKeyAlgorithm, SphincsPlusMode,
};
use crate::error::{Error, Result};
use crate::packet::public_key::{KeyVersion, PublicKey, PublicParams};
use crate::packet::signature::SignatureMaterial;

/// Algorithm-tagged secret key material.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// RSA private key
    Rsa(rsa::PrivateKey),
    /// ElGamal private key
    ElGamal(elgamal::PrivateKey),
    /// ECDSA private key
    Ecdsa(ecdsa::PrivateKey),
    /// EdDSA private key
    EdDsa(eddsa::PrivateKey),
    /// ECDH private key
    Ecdh(ecdh::PrivateKey),
    /// X25519 private key
    X25519(x25519::PrivateKey),
    /// X448 private key
    X448(x448::PrivateKey),
    /// Kyber+ECDH hybrid private key
    KyberEcdh(kyber_ecdh::PrivateKey),
    /// Dilithium+ECDSA hybrid private key
    DilithiumEcdsa(dilithium_ecdsa::PrivateKey),
    /// Dilithium+EdDSA hybrid private key
    DilithiumEdDsa(dilithium_eddsa::PrivateKey),
    /// SPHINCS+ private key
    SphincsPlus(sphincs_plus::PrivateKey),
    /// Marker with no secret material
    Dummy,
}

impl KeyMaterial {
    /// Derives the algorithm identifier and public parameters.
    pub fn public_half(&self) -> Result<(PublicKeyAlgorithm, PublicParams)> {
        match self {
            Self::Rsa(k) => Ok((PublicKeyAlgorithm::Rsa, PublicParams::Rsa(k.public.clone()))),
            Self::ElGamal(k) => Ok((
                PublicKeyAlgorithm::ElGamal,
                PublicParams::ElGamal(k.public.clone()),
            )),
            Self::Ecdsa(k) => Ok((
                PublicKeyAlgorithm::Ecdsa,
                PublicParams::Ecdsa(k.public.clone()),
            )),
            Self::EdDsa(k) => Ok((
                PublicKeyAlgorithm::EdDsa,
                PublicParams::EdDsa(k.public.clone()),
            )),
            Self::Ecdh(k) => Ok((
                PublicKeyAlgorithm::Ecdh,
                PublicParams::Ecdh(k.public.clone()),
            )),
            Self::X25519(k) => Ok((
                PublicKeyAlgorithm::X25519,
                PublicParams::X25519(k.public.clone()),
            )),
            Self::X448(k) => Ok((
                PublicKeyAlgorithm::X448,
                PublicParams::X448(k.public.clone()),
            )),
            Self::KyberEcdh(k) => Ok((
                k.public.algorithm,
                PublicParams::KyberEcdh(k.public.clone()),
            )),
            Self::DilithiumEcdsa(k) => Ok((
                k.public.algorithm,
                PublicParams::DilithiumEcdsa(k.public.clone()),
            )),
            Self::DilithiumEdDsa(k) => Ok((
                k.public.algorithm,
                PublicParams::DilithiumEdDsa(k.public.clone()),
            )),
            Self::SphincsPlus(k) => {
                let algorithm = match k.public.mode {
                    SphincsPlusMode::Sha2 => PublicKeyAlgorithm::SphincsPlusSha2,
                    SphincsPlusMode::Shake => PublicKeyAlgorithm::SphincsPlusShake,
                };
                Ok((algorithm, PublicParams::SphincsPlus(k.public.clone())))
            }
            Self::Dummy => Err(Error::dummy_key("dummy key has no material")),
        }
    }

    /// Whether the material can produce signatures.
    pub fn can_sign(&self) -> bool {
        matches!(
            self,
            Self::Rsa(_)
                | Self::Ecdsa(_)
                | Self::EdDsa(_)
                | Self::DilithiumEcdsa(_)
                | Self::DilithiumEdDsa(_)
                | Self::SphincsPlus(_)
        )
    }

    /// Whether the material can decrypt session keys.
    pub fn can_decrypt(&self) -> bool {
        matches!(
            self,
            Self::Rsa(_)
                | Self::ElGamal(_)
                | Self::Ecdh(_)
                | Self::X25519(_)
                | Self::X448(_)
                | Self::KyberEcdh(_)
        )
    }
}

/// A private key packet: the public packet plus the secret material.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    /// The public half
    pub public: PublicKey,
    /// Secret material
    pub material: KeyMaterial,
}

impl PrivateKey {
    fn from_material(
        version: KeyVersion,
        creation_time: u32,
        material: KeyMaterial,
    ) -> Result<Self> {
        let (algorithm, params) = material.public_half()?;
        let public = PublicKey::new(version, creation_time, algorithm, params)?;
        Ok(Self { public, material })
    }

    /// Wraps freshly generated signing material into a private key packet.
    pub fn new_signer(
        version: KeyVersion,
        creation_time: u32,
        material: KeyMaterial,
    ) -> Result<Self> {
        if !material.can_sign() {
            return Err(Error::invalid_argument(
                "key material cannot be used for signing",
            ));
        }
        Self::from_material(version, creation_time, material)
    }

    /// Wraps freshly generated decryption material into a private key packet.
    pub fn new_decrypter(
        version: KeyVersion,
        creation_time: u32,
        material: KeyMaterial,
    ) -> Result<Self> {
        if !material.can_decrypt() {
            return Err(Error::invalid_argument(
                "key material cannot be used for decryption",
            ));
        }
        Self::from_material(version, creation_time, material)
    }

    /// Builds a marker-only private key around an existing public key.
    pub fn new_dummy(public: PublicKey) -> Self {
        Self {
            public,
            material: KeyMaterial::Dummy,
        }
    }

    /// True for marker-only keys without secret material.
    pub fn is_dummy(&self) -> bool {
        matches!(self.material, KeyMaterial::Dummy)
    }

    /// Signs `data`, hashing with `hash` where the scheme requires an
    /// external digest.
    pub fn sign_material(&self, hash: HashAlgorithm, data: &[u8]) -> Result<SignatureMaterial> {
        match &self.material {
            KeyMaterial::Rsa(k) => {
                let digest = hash.digest(data)?;
                Ok(SignatureMaterial::Rsa {
                    s: rsa::sign_pkcs1v15(k, hash, &digest)?,
                })
            }
            KeyMaterial::Ecdsa(k) => Ok(SignatureMaterial::Ecdsa {
                sig: ecdsa::sign(k, data)?,
            }),
            KeyMaterial::EdDsa(k) => Ok(SignatureMaterial::EdDsa {
                sig: eddsa::sign(k, data)?,
            }),
            KeyMaterial::DilithiumEcdsa(k) => {
                let (dilithium, ecdsa) = dilithium_ecdsa::sign(k, data)?;
                Ok(SignatureMaterial::DilithiumEcdsa { dilithium, ecdsa })
            }
            KeyMaterial::DilithiumEdDsa(k) => {
                let (dilithium, eddsa) = dilithium_eddsa::sign(k, data)?;
                Ok(SignatureMaterial::DilithiumEdDsa { dilithium, eddsa })
            }
            KeyMaterial::SphincsPlus(k) => Ok(SignatureMaterial::SphincsPlus {
                sig: sphincs_plus::sign(k, data)?,
            }),
            KeyMaterial::Dummy => Err(Error::dummy_key("dummy key found")),
            _ => Err(Error::invalid_argument(
                "key material cannot be used for signing",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ecc::CurveId;
    use rand::rngs::OsRng;

    #[test]
    fn test_signer_construction_and_signing() {
        let mut rng = OsRng;
        let material =
            KeyMaterial::EdDsa(eddsa::generate_key(&mut rng, CurveId::Ed25519).unwrap());
        let key = PrivateKey::new_signer(KeyVersion::V4, 1_700_000_000, material).unwrap();
        assert_eq!(key.public.algorithm, PublicKeyAlgorithm::EdDsa);

        let sig = key
            .sign_material(HashAlgorithm::Sha256, b"signed data")
            .unwrap();
        key.public
            .verify_material(HashAlgorithm::Sha256, b"signed data", &sig)
            .unwrap();
    }

    #[test]
    fn test_decrypter_rejects_signing_material() {
        let mut rng = OsRng;
        let material =
            KeyMaterial::EdDsa(eddsa::generate_key(&mut rng, CurveId::Ed25519).unwrap());
        assert!(PrivateKey::new_decrypter(KeyVersion::V4, 1_700_000_000, material).is_err());
    }

    #[test]
    fn test_dummy_key_cannot_sign() {
        let mut rng = OsRng;
        let material =
            KeyMaterial::EdDsa(eddsa::generate_key(&mut rng, CurveId::Ed25519).unwrap());
        let key = PrivateKey::new_signer(KeyVersion::V4, 1_700_000_000, material).unwrap();
        let dummy = PrivateKey::new_dummy(key.public.clone());

        assert!(dummy.is_dummy());
        assert!(matches!(
            dummy.sign_material(HashAlgorithm::Sha256, b"data"),
            Err(Error::DummyKey(_))
        ));
    }
}
