//! Kyber + ECDH hybrid session-key encryption.
//!
//! The session key is protected by both components: an ephemeral ECDH
//! exchange and a Kyber encapsulation each contribute a shared secret, and
//! the combining KDF additionally absorbs a hash of the recipient's public
//! key, binding the ciphertext to the issuing certificate.

use crate::crypto::ecc::CurveId;
use crate::crypto::{ecdh, wrap, KyberParameters, PublicKeyAlgorithm};
use crate::error::{Error, Result};
use pqcrypto_traits::kem::{Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// A Kyber+ECDH public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Owning algorithm identifier
    pub algorithm: PublicKeyAlgorithm,
    /// ECDH component curve
    pub curve: CurveId,
    /// Kyber parameter set
    pub parameters: KyberParameters,
    /// ECDH public point, native encoding
    pub ecdh_point: Vec<u8>,
    /// Kyber public key bytes
    pub kyber_public: Vec<u8>,
}

/// A Kyber+ECDH private key.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    /// The public half
    pub public: PublicKey,
    /// ECDH secret scalar
    pub ecdh_secret: Vec<u8>,
    /// Kyber secret key bytes
    pub kyber_secret: Vec<u8>,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.ecdh_secret.zeroize();
        self.kyber_secret.zeroize();
    }
}

/// Generates a hybrid key for a Kyber-hybrid algorithm identifier.
pub fn generate_key<R: CryptoRng + RngCore>(
    rng: &mut R,
    algorithm: PublicKeyAlgorithm,
) -> Result<PrivateKey> {
    let curve = algorithm.ecdh_curve_of_hybrid()?;
    let parameters = algorithm.kyber_parameters()?;
    if !curve.supports_ecdh() {
        return Err(Error::invalid_argument("unsupported curve"));
    }

    let (ecdh_secret, ecdh_point) = ecdh::generate_scalar(rng, curve)?;
    // The pqcrypto keypair routines draw from the library's own CSPRNG.
    let (kyber_public, kyber_secret) = match parameters {
        KyberParameters::Kyber768 => {
            let (pk, sk) = pqcrypto_mlkem::mlkem768::keypair();
            (pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
        }
        KyberParameters::Kyber1024 => {
            let (pk, sk) = pqcrypto_mlkem::mlkem1024::keypair();
            (pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
        }
    };

    Ok(PrivateKey {
        public: PublicKey {
            algorithm,
            curve,
            parameters,
            ecdh_point,
            kyber_public,
        },
        ecdh_secret: ecdh_secret.to_vec(),
        kyber_secret,
    })
}

fn encapsulate(
    parameters: KyberParameters,
    kyber_public: &[u8],
) -> Result<(Zeroizing<Vec<u8>>, Vec<u8>)> {
    match parameters {
        KyberParameters::Kyber768 => {
            let pk = pqcrypto_mlkem::mlkem768::PublicKey::from_bytes(kyber_public)
                .map_err(|_| Error::crypto("kyber_ecdh: bad Kyber-768 public key"))?;
            let (ss, ct) = pqcrypto_mlkem::mlkem768::encapsulate(&pk);
            Ok((Zeroizing::new(ss.as_bytes().to_vec()), ct.as_bytes().to_vec()))
        }
        KyberParameters::Kyber1024 => {
            let pk = pqcrypto_mlkem::mlkem1024::PublicKey::from_bytes(kyber_public)
                .map_err(|_| Error::crypto("kyber_ecdh: bad Kyber-1024 public key"))?;
            let (ss, ct) = pqcrypto_mlkem::mlkem1024::encapsulate(&pk);
            Ok((Zeroizing::new(ss.as_bytes().to_vec()), ct.as_bytes().to_vec()))
        }
    }
}

fn decapsulate(
    parameters: KyberParameters,
    kyber_secret: &[u8],
    kyber_ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    match parameters {
        KyberParameters::Kyber768 => {
            let sk = pqcrypto_mlkem::mlkem768::SecretKey::from_bytes(kyber_secret)
                .map_err(|_| Error::crypto("kyber_ecdh: bad Kyber-768 secret key"))?;
            let ct = pqcrypto_mlkem::mlkem768::Ciphertext::from_bytes(kyber_ciphertext)
                .map_err(|_| Error::crypto("kyber_ecdh: bad Kyber-768 ciphertext"))?;
            let ss = pqcrypto_mlkem::mlkem768::decapsulate(&ct, &sk);
            Ok(Zeroizing::new(ss.as_bytes().to_vec()))
        }
        KyberParameters::Kyber1024 => {
            let sk = pqcrypto_mlkem::mlkem1024::SecretKey::from_bytes(kyber_secret)
                .map_err(|_| Error::crypto("kyber_ecdh: bad Kyber-1024 secret key"))?;
            let ct = pqcrypto_mlkem::mlkem1024::Ciphertext::from_bytes(kyber_ciphertext)
                .map_err(|_| Error::crypto("kyber_ecdh: bad Kyber-1024 ciphertext"))?;
            let ss = pqcrypto_mlkem::mlkem1024::decapsulate(&ct, &sk);
            Ok(Zeroizing::new(ss.as_bytes().to_vec()))
        }
    }
}

/// Combines both shared secrets into the key-encryption key, absorbing the
/// components and the recipient public-key hash.
fn combine(
    algorithm: PublicKeyAlgorithm,
    ecdh_shared: &[u8],
    kyber_shared: &[u8],
    ecdh_ephemeral: &[u8],
    kyber_ciphertext: &[u8],
    public_key_hash: &[u8],
) -> Zeroizing<[u8; 32]> {
    let mut ikm = Zeroizing::new(Vec::with_capacity(ecdh_shared.len() + kyber_shared.len()));
    ikm.extend_from_slice(ecdh_shared);
    ikm.extend_from_slice(kyber_shared);

    let mut info =
        Vec::with_capacity(1 + ecdh_ephemeral.len() + kyber_ciphertext.len() + public_key_hash.len());
    info.push(algorithm as u8);
    info.extend_from_slice(ecdh_ephemeral);
    info.extend_from_slice(kyber_ciphertext);
    info.extend_from_slice(public_key_hash);

    wrap::derive_kek_sha3(&ikm, &info)
}

/// Encrypts `key` to `pub_key`. Returns `(kyber_ciphertext,
/// ecdh_ephemeral, wrapped_key)`; `public_key_hash` is the SHA3-256 hash of
/// the recipient's serialized public key.
pub fn encrypt<R: CryptoRng + RngCore>(
    rng: &mut R,
    pub_key: &PublicKey,
    key: &[u8],
    public_key_hash: &[u8],
) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>)> {
    let (ecdh_ephemeral, ecdh_shared) =
        ecdh::ephemeral_exchange(rng, pub_key.curve, &pub_key.ecdh_point)?;
    let (kyber_shared, kyber_ciphertext) = encapsulate(pub_key.parameters, &pub_key.kyber_public)?;

    let kek = combine(
        pub_key.algorithm,
        &ecdh_shared,
        &kyber_shared,
        &ecdh_ephemeral,
        &kyber_ciphertext,
        public_key_hash,
    );
    let wrapped = wrap::seal(rng, &kek, key)?;
    Ok((kyber_ciphertext, ecdh_ephemeral, wrapped))
}

/// Decrypts a wrapped session key from its hybrid ciphertext components.
pub fn decrypt(
    priv_key: &PrivateKey,
    kyber_ciphertext: &[u8],
    ecdh_ephemeral: &[u8],
    wrapped: &[u8],
    public_key_hash: &[u8],
) -> Result<Vec<u8>> {
    let ecdh_shared =
        ecdh::static_exchange(priv_key.public.curve, &priv_key.ecdh_secret, ecdh_ephemeral)?;
    let kyber_shared = decapsulate(
        priv_key.public.parameters,
        &priv_key.kyber_secret,
        kyber_ciphertext,
    )?;

    let kek = combine(
        priv_key.public.algorithm,
        &ecdh_shared,
        &kyber_shared,
        ecdh_ephemeral,
        kyber_ciphertext,
        public_key_hash,
    );
    wrap::open(&kek, wrapped)
}
