//! ECDSA signing facade over the NIST curves.

use crate::crypto::ecc::CurveId;
use crate::error::{Error, Result};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{CryptoRng, RngCore};

/// An ECDSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Curve identifier
    pub curve: CurveId,
    /// Public point, SEC1 uncompressed
    pub point: Vec<u8>,
}

/// An ECDSA private key.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    /// The public half
    pub public: PublicKey,
    /// Secret scalar
    pub d: Vec<u8>,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.d.zeroize();
    }
}

/// Generates an ECDSA key on `curve`.
pub fn generate_key<R: CryptoRng + RngCore>(rng: &mut R, curve: CurveId) -> Result<PrivateKey> {
    match curve {
        CurveId::NistP256 => {
            let signing = p256::ecdsa::SigningKey::random(&mut *rng);
            let point = signing
                .verifying_key()
                .to_encoded_point(false)
                .as_bytes()
                .to_vec();
            Ok(PrivateKey {
                public: PublicKey { curve, point },
                d: signing.to_bytes().to_vec(),
            })
        }
        CurveId::NistP384 => {
            let signing = p384::ecdsa::SigningKey::random(&mut *rng);
            let point = signing
                .verifying_key()
                .to_encoded_point(false)
                .as_bytes()
                .to_vec();
            Ok(PrivateKey {
                public: PublicKey { curve, point },
                d: signing.to_bytes().to_vec(),
            })
        }
        _ => Err(Error::invalid_argument(format!(
            "curve {} has no ECDSA backend",
            curve
        ))),
    }
}

/// Signs `message`, returning the fixed-size `r || s` encoding.
pub fn sign(priv_key: &PrivateKey, message: &[u8]) -> Result<Vec<u8>> {
    match priv_key.public.curve {
        CurveId::NistP256 => {
            let signing = p256::ecdsa::SigningKey::from_slice(&priv_key.d)
                .map_err(|_| Error::crypto("ecdsa: bad P-256 scalar"))?;
            let sig: p256::ecdsa::Signature = signing.sign(message);
            Ok(sig.to_bytes().to_vec())
        }
        CurveId::NistP384 => {
            let signing = p384::ecdsa::SigningKey::from_slice(&priv_key.d)
                .map_err(|_| Error::crypto("ecdsa: bad P-384 scalar"))?;
            let sig: p384::ecdsa::Signature = signing.sign(message);
            Ok(sig.to_bytes().to_vec())
        }
        curve => Err(Error::invalid_argument(format!(
            "curve {} has no ECDSA backend",
            curve
        ))),
    }
}

/// Verifies an `r || s` signature over `message`.
pub fn verify(pub_key: &PublicKey, message: &[u8], sig: &[u8]) -> Result<()> {
    match pub_key.curve {
        CurveId::NistP256 => {
            let verifying = p256::ecdsa::VerifyingKey::from_sec1_bytes(&pub_key.point)
                .map_err(|_| Error::crypto("ecdsa: bad P-256 point"))?;
            let sig = p256::ecdsa::Signature::from_slice(sig)
                .map_err(|_| Error::crypto("ecdsa: malformed signature"))?;
            verifying
                .verify(message, &sig)
                .map_err(|_| Error::crypto("ecdsa: signature verification failed"))
        }
        CurveId::NistP384 => {
            let verifying = p384::ecdsa::VerifyingKey::from_sec1_bytes(&pub_key.point)
                .map_err(|_| Error::crypto("ecdsa: bad P-384 point"))?;
            let sig = p384::ecdsa::Signature::from_slice(sig)
                .map_err(|_| Error::crypto("ecdsa: malformed signature"))?;
            verifying
                .verify(message, &sig)
                .map_err(|_| Error::crypto("ecdsa: signature verification failed"))
        }
        curve => Err(Error::invalid_argument(format!(
            "curve {} has no ECDSA backend",
            curve
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_sign_verify_round_trip() {
        let mut rng = OsRng;
        for curve in [CurveId::NistP256, CurveId::NistP384] {
            let key = generate_key(&mut rng, curve).unwrap();
            let sig = sign(&key, b"binding data").unwrap();
            verify(&key.public, b"binding data", &sig).unwrap();
            assert!(verify(&key.public, b"other data", &sig).is_err());
        }
    }

    #[test]
    fn test_unsupported_curve() {
        let mut rng = OsRng;
        assert!(matches!(
            generate_key(&mut rng, CurveId::BrainpoolP384),
            Err(Error::InvalidArgument(_))
        ));
    }
}
