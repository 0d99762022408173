//! EdDSA signing facade.

use crate::crypto::ecc::CurveId;
use crate::error::{Error, Result};
use ed25519_dalek::{Signer, Verifier};
use rand::{CryptoRng, RngCore};

/// An EdDSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Curve identifier
    pub curve: CurveId,
    /// Compressed public point
    pub point: Vec<u8>,
}

/// An EdDSA private key.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    /// The public half
    pub public: PublicKey,
    /// Secret seed
    pub seed: Vec<u8>,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.seed.zeroize();
    }
}

/// Generates an EdDSA key on `curve`.
pub fn generate_key<R: CryptoRng + RngCore>(rng: &mut R, curve: CurveId) -> Result<PrivateKey> {
    match curve {
        CurveId::Ed25519 => {
            let signing = ed25519_dalek::SigningKey::generate(&mut *rng);
            Ok(PrivateKey {
                public: PublicKey {
                    curve,
                    point: signing.verifying_key().to_bytes().to_vec(),
                },
                seed: signing.to_bytes().to_vec(),
            })
        }
        _ => Err(Error::invalid_argument(format!(
            "curve {} has no EdDSA backend",
            curve
        ))),
    }
}

fn signing_key(priv_key: &PrivateKey) -> Result<ed25519_dalek::SigningKey> {
    let seed: [u8; 32] = priv_key
        .seed
        .as_slice()
        .try_into()
        .map_err(|_| Error::crypto("eddsa: bad seed length"))?;
    Ok(ed25519_dalek::SigningKey::from_bytes(&seed))
}

/// Signs `message`, returning the 64-byte `R || S` encoding.
pub fn sign(priv_key: &PrivateKey, message: &[u8]) -> Result<Vec<u8>> {
    match priv_key.public.curve {
        CurveId::Ed25519 => Ok(signing_key(priv_key)?.sign(message).to_bytes().to_vec()),
        curve => Err(Error::invalid_argument(format!(
            "curve {} has no EdDSA backend",
            curve
        ))),
    }
}

/// Verifies an `R || S` signature over `message`.
pub fn verify(pub_key: &PublicKey, message: &[u8], sig: &[u8]) -> Result<()> {
    match pub_key.curve {
        CurveId::Ed25519 => {
            let point: [u8; 32] = pub_key
                .point
                .as_slice()
                .try_into()
                .map_err(|_| Error::crypto("eddsa: bad point length"))?;
            let verifying = ed25519_dalek::VerifyingKey::from_bytes(&point)
                .map_err(|_| Error::crypto("eddsa: bad public point"))?;
            let sig = ed25519_dalek::Signature::from_slice(sig)
                .map_err(|_| Error::crypto("eddsa: malformed signature"))?;
            verifying
                .verify(message, &sig)
                .map_err(|_| Error::crypto("eddsa: signature verification failed"))
        }
        curve => Err(Error::invalid_argument(format!(
            "curve {} has no EdDSA backend",
            curve
        ))),
    }
}
