//! Dilithium + EdDSA hybrid signatures.

use crate::crypto::ecc::CurveId;
use crate::crypto::{eddsa, DilithiumParameters, PublicKeyAlgorithm};
use crate::error::{Error, Result};
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};
use rand::{CryptoRng, RngCore};

/// A Dilithium+EdDSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Owning algorithm identifier
    pub algorithm: PublicKeyAlgorithm,
    /// EdDSA component curve
    pub curve: CurveId,
    /// Dilithium parameter set
    pub parameters: DilithiumParameters,
    /// EdDSA compressed public point
    pub eddsa_point: Vec<u8>,
    /// Dilithium public key bytes
    pub dilithium_public: Vec<u8>,
}

/// A Dilithium+EdDSA private key.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    /// The public half
    pub public: PublicKey,
    /// EdDSA secret seed
    pub eddsa_seed: Vec<u8>,
    /// Dilithium secret key bytes
    pub dilithium_secret: Vec<u8>,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.eddsa_seed.zeroize();
        self.dilithium_secret.zeroize();
    }
}

fn dilithium_keypair(parameters: DilithiumParameters) -> (Vec<u8>, Vec<u8>) {
    match parameters {
        DilithiumParameters::Dilithium3 => {
            let (pk, sk) = pqcrypto_mldsa::mldsa65::keypair();
            (pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
        }
        DilithiumParameters::Dilithium5 => {
            let (pk, sk) = pqcrypto_mldsa::mldsa87::keypair();
            (pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
        }
    }
}

fn dilithium_sign(
    parameters: DilithiumParameters,
    secret: &[u8],
    message: &[u8],
) -> Result<Vec<u8>> {
    match parameters {
        DilithiumParameters::Dilithium3 => {
            let sk = pqcrypto_mldsa::mldsa65::SecretKey::from_bytes(secret)
                .map_err(|_| Error::crypto("dilithium: bad secret key"))?;
            Ok(pqcrypto_mldsa::mldsa65::detached_sign(message, &sk)
                .as_bytes()
                .to_vec())
        }
        DilithiumParameters::Dilithium5 => {
            let sk = pqcrypto_mldsa::mldsa87::SecretKey::from_bytes(secret)
                .map_err(|_| Error::crypto("dilithium: bad secret key"))?;
            Ok(pqcrypto_mldsa::mldsa87::detached_sign(message, &sk)
                .as_bytes()
                .to_vec())
        }
    }
}

fn dilithium_verify(
    parameters: DilithiumParameters,
    public: &[u8],
    message: &[u8],
    sig: &[u8],
) -> Result<()> {
    match parameters {
        DilithiumParameters::Dilithium3 => {
            let pk = pqcrypto_mldsa::mldsa65::PublicKey::from_bytes(public)
                .map_err(|_| Error::crypto("dilithium: bad public key"))?;
            let sig = pqcrypto_mldsa::mldsa65::DetachedSignature::from_bytes(sig)
                .map_err(|_| Error::crypto("dilithium: malformed signature"))?;
            pqcrypto_mldsa::mldsa65::verify_detached_signature(&sig, message, &pk)
                .map_err(|_| Error::crypto("dilithium: signature verification failed"))
        }
        DilithiumParameters::Dilithium5 => {
            let pk = pqcrypto_mldsa::mldsa87::PublicKey::from_bytes(public)
                .map_err(|_| Error::crypto("dilithium: bad public key"))?;
            let sig = pqcrypto_mldsa::mldsa87::DetachedSignature::from_bytes(sig)
                .map_err(|_| Error::crypto("dilithium: malformed signature"))?;
            pqcrypto_mldsa::mldsa87::verify_detached_signature(&sig, message, &pk)
                .map_err(|_| Error::crypto("dilithium: signature verification failed"))
        }
    }
}

/// Generates a hybrid key for a Dilithium-EdDSA algorithm identifier.
pub fn generate_key<R: CryptoRng + RngCore>(
    rng: &mut R,
    algorithm: PublicKeyAlgorithm,
) -> Result<PrivateKey> {
    let curve = algorithm.eddsa_curve_of_hybrid()?;
    let parameters = algorithm.dilithium_parameters()?;
    if !curve.supports_eddsa() {
        return Err(Error::invalid_argument("unsupported curve"));
    }

    let ed = eddsa::generate_key(rng, curve)?;
    let (dilithium_public, dilithium_secret) = dilithium_keypair(parameters);

    Ok(PrivateKey {
        public: PublicKey {
            algorithm,
            curve,
            parameters,
            eddsa_point: ed.public.point.clone(),
            dilithium_public,
        },
        eddsa_seed: ed.seed.clone(),
        dilithium_secret,
    })
}

/// Signs `message`, returning `(dilithium_sig, eddsa_sig)`.
pub fn sign(priv_key: &PrivateKey, message: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let ed = eddsa::PrivateKey {
        public: eddsa::PublicKey {
            curve: priv_key.public.curve,
            point: priv_key.public.eddsa_point.clone(),
        },
        seed: priv_key.eddsa_seed.clone(),
    };
    let eddsa_sig = eddsa::sign(&ed, message)?;
    let dilithium_sig = dilithium_sign(
        priv_key.public.parameters,
        &priv_key.dilithium_secret,
        message,
    )?;
    Ok((dilithium_sig, eddsa_sig))
}

/// Verifies both signature components over `message`.
pub fn verify(
    pub_key: &PublicKey,
    message: &[u8],
    dilithium_sig: &[u8],
    eddsa_sig: &[u8],
) -> Result<()> {
    let ed = eddsa::PublicKey {
        curve: pub_key.curve,
        point: pub_key.eddsa_point.clone(),
    };
    eddsa::verify(&ed, message, eddsa_sig)?;
    dilithium_verify(
        pub_key.parameters,
        &pub_key.dilithium_public,
        message,
        dilithium_sig,
    )
}
