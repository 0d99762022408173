//! SPHINCS+ stateless hash-based signatures.
//!
//! The internal hashing mode (SHA2 or SHAKE) is fixed by the algorithm
//! identifier; the parameter set comes from configuration. The "simple"
//! variants are used throughout.

use crate::crypto::{SphincsPlusMode, SphincsPlusParameter};
use crate::error::{Error, Result};
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};
use rand::{CryptoRng, RngCore};

/// A SPHINCS+ public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Internal hashing mode
    pub mode: SphincsPlusMode,
    /// Parameter set
    pub parameter: SphincsPlusParameter,
    /// Public key bytes
    pub public: Vec<u8>,
}

/// A SPHINCS+ private key.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    /// The public half
    pub public: PublicKey,
    /// Secret key bytes
    pub secret: Vec<u8>,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.secret.zeroize();
    }
}

macro_rules! sphincs_dispatch {
    ($mode:expr, $param:expr, $variant:ident, $body:expr) => {{
        use SphincsPlusMode::*;
        use SphincsPlusParameter::*;
        match ($mode, $param) {
            (Sha2, Param128s) => {
                use pqcrypto_sphincsplus::sphincssha2128ssimple as $variant;
                $body
            }
            (Sha2, Param128f) => {
                use pqcrypto_sphincsplus::sphincssha2128fsimple as $variant;
                $body
            }
            (Sha2, Param192s) => {
                use pqcrypto_sphincsplus::sphincssha2192ssimple as $variant;
                $body
            }
            (Sha2, Param192f) => {
                use pqcrypto_sphincsplus::sphincssha2192fsimple as $variant;
                $body
            }
            (Sha2, Param256s) => {
                use pqcrypto_sphincsplus::sphincssha2256ssimple as $variant;
                $body
            }
            (Sha2, Param256f) => {
                use pqcrypto_sphincsplus::sphincssha2256fsimple as $variant;
                $body
            }
            (Shake, Param128s) => {
                use pqcrypto_sphincsplus::sphincsshake128ssimple as $variant;
                $body
            }
            (Shake, Param128f) => {
                use pqcrypto_sphincsplus::sphincsshake128fsimple as $variant;
                $body
            }
            (Shake, Param192s) => {
                use pqcrypto_sphincsplus::sphincsshake192ssimple as $variant;
                $body
            }
            (Shake, Param192f) => {
                use pqcrypto_sphincsplus::sphincsshake192fsimple as $variant;
                $body
            }
            (Shake, Param256s) => {
                use pqcrypto_sphincsplus::sphincsshake256ssimple as $variant;
                $body
            }
            (Shake, Param256f) => {
                use pqcrypto_sphincsplus::sphincsshake256fsimple as $variant;
                $body
            }
        }
    }};
}

/// Generates a SPHINCS+ key for the given mode and parameter set.
pub fn generate_key<R: CryptoRng + RngCore>(
    _rng: &mut R,
    mode: SphincsPlusMode,
    parameter: SphincsPlusParameter,
) -> Result<PrivateKey> {
    // The pqcrypto keypair routines draw from the library's own CSPRNG.
    let (public, secret) = sphincs_dispatch!(mode, parameter, v, {
        let (pk, sk) = v::keypair();
        (pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
    });
    Ok(PrivateKey {
        public: PublicKey {
            mode,
            parameter,
            public,
        },
        secret,
    })
}

/// Signs `message`, returning the detached signature bytes.
pub fn sign(priv_key: &PrivateKey, message: &[u8]) -> Result<Vec<u8>> {
    sphincs_dispatch!(priv_key.public.mode, priv_key.public.parameter, v, {
        let sk = v::SecretKey::from_bytes(&priv_key.secret)
            .map_err(|_| Error::crypto("sphincs+: bad secret key"))?;
        Ok(v::detached_sign(message, &sk).as_bytes().to_vec())
    })
}

/// Verifies a detached signature over `message`.
pub fn verify(pub_key: &PublicKey, message: &[u8], sig: &[u8]) -> Result<()> {
    sphincs_dispatch!(pub_key.mode, pub_key.parameter, v, {
        let pk = v::PublicKey::from_bytes(&pub_key.public)
            .map_err(|_| Error::crypto("sphincs+: bad public key"))?;
        let sig = v::DetachedSignature::from_bytes(sig)
            .map_err(|_| Error::crypto("sphincs+: malformed signature"))?;
        v::verify_detached_signature(&sig, message, &pk)
            .map_err(|_| Error::crypto("sphincs+: signature verification failed"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_sign_verify_round_trip() {
        let mut rng = OsRng;
        for (mode, parameter) in [
            (SphincsPlusMode::Sha2, SphincsPlusParameter::Param128f),
            (SphincsPlusMode::Shake, SphincsPlusParameter::Param128f),
        ] {
            let key = generate_key(&mut rng, mode, parameter).unwrap();
            let sig = sign(&key, b"binding data").unwrap();
            verify(&key.public, b"binding data", &sig).unwrap();
            assert!(verify(&key.public, b"other data", &sig).is_err());
        }
    }
}
