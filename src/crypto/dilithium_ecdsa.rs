//! Dilithium + ECDSA hybrid signatures.
//!
//! A hybrid signature carries one component per scheme; verification
//! succeeds only when both components verify over the same message.

use crate::crypto::ecc::CurveId;
use crate::crypto::{ecdsa, DilithiumParameters, PublicKeyAlgorithm};
use crate::error::{Error, Result};
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};
use rand::{CryptoRng, RngCore};

/// A Dilithium+ECDSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Owning algorithm identifier
    pub algorithm: PublicKeyAlgorithm,
    /// ECDSA component curve
    pub curve: CurveId,
    /// Dilithium parameter set
    pub parameters: DilithiumParameters,
    /// ECDSA public point, SEC1 uncompressed
    pub ecdsa_point: Vec<u8>,
    /// Dilithium public key bytes
    pub dilithium_public: Vec<u8>,
}

/// A Dilithium+ECDSA private key.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    /// The public half
    pub public: PublicKey,
    /// ECDSA secret scalar
    pub ecdsa_secret: Vec<u8>,
    /// Dilithium secret key bytes
    pub dilithium_secret: Vec<u8>,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.ecdsa_secret.zeroize();
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

/// Generates a hybrid key for a Dilithium-ECDSA algorithm identifier.
pub fn generate_key<R: CryptoRng + RngCore>(
    rng: &mut R,
    algorithm: PublicKeyAlgorithm,
) -> Result<PrivateKey> {
    let curve = algorithm.ecdsa_curve_of_hybrid()?;
    let parameters = algorithm.dilithium_parameters()?;
    if !curve.supports_ecdsa() {
        return Err(Error::invalid_argument("unsupported curve"));
    }

    let ec = ecdsa::generate_key(rng, curve)?;
    let (dilithium_public, dilithium_secret) = dilithium_keypair(parameters);

    Ok(PrivateKey {
        public: PublicKey {
            algorithm,
            curve,
            parameters,
            ecdsa_point: ec.public.point.clone(),
            dilithium_public,
        },
        ecdsa_secret: ec.d.clone(),
        dilithium_secret,
    })
}

/// Signs `message`, returning `(dilithium_sig, ecdsa_sig)`.
pub fn sign(priv_key: &PrivateKey, message: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let ec = ecdsa::PrivateKey {
        public: ecdsa::PublicKey {
            curve: priv_key.public.curve,
            point: priv_key.public.ecdsa_point.clone(),
        },
        d: priv_key.ecdsa_secret.clone(),
    };
    let ecdsa_sig = ecdsa::sign(&ec, message)?;
    let dilithium_sig = dilithium_sign(
        priv_key.public.parameters,
        &priv_key.dilithium_secret,
        message,
    )?;
    Ok((dilithium_sig, ecdsa_sig))
}

/// Verifies both signature components over `message`.
pub fn verify(
    pub_key: &PublicKey,
    message: &[u8],
    dilithium_sig: &[u8],
    ecdsa_sig: &[u8],
) -> Result<()> {
    let ec = ecdsa::PublicKey {
        curve: pub_key.curve,
        point: pub_key.ecdsa_point.clone(),
    };
    ecdsa::verify(&ec, message, ecdsa_sig)?;
    dilithium_verify(
        pub_key.parameters,
        &pub_key.dilithium_public,
        message,
        dilithium_sig,
    )
}
