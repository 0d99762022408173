//! ECDH session-key encryption.
//!
//! OpenPGP-style ECDH: an ephemeral scalar multiplication produces a shared
//! secret, a KDF binds it to the curve OID and the recipient fingerprint,
//! and the session data is encrypted under the derived key-encryption key.
//! The wrap itself carries no authenticator; integrity of the classical
//! session-key payload comes from its 16-bit checksum.
//!
//! The scalar-exchange helpers operate on native point encodings (raw
//! u-coordinates for the Montgomery curves, SEC1 uncompressed points for
//! the NIST curves) and are shared with the post-quantum hybrid combiner.

use crate::crypto::ecc::CurveId;
use crate::crypto::{wrap, CipherFunction, HashAlgorithm};
use crate::error::{Error, Result};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// KDF parameters advertised with an ECDH key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kdf {
    /// KDF hash
    pub hash: HashAlgorithm,
    /// Key-wrap cipher
    pub cipher: CipherFunction,
}

/// An ECDH public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Curve identifier
    pub curve: CurveId,
    /// KDF parameters
    pub kdf: Kdf,
    /// Public point, native encoding
    pub point: Vec<u8>,
}

/// An ECDH private key.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    /// The public half
    pub public: PublicKey,
    /// Secret scalar, curve-native encoding
    pub d: Vec<u8>,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.d.zeroize();
    }
}

/// Generates a fresh scalar and its public point on `curve`, both in native
/// encoding.
pub(crate) fn generate_scalar<R: CryptoRng + RngCore>(
    rng: &mut R,
    curve: CurveId,
) -> Result<(Zeroizing<Vec<u8>>, Vec<u8>)> {
    match curve {
        CurveId::Curve25519 => {
            let secret = x25519_dalek::StaticSecret::random_from_rng(&mut *rng);
            let public = x25519_dalek::PublicKey::from(&secret);
            Ok((
                Zeroizing::new(secret.to_bytes().to_vec()),
                public.as_bytes().to_vec(),
            ))
        }
        CurveId::Curve448 => {
            let mut raw = [0u8; 56];
            rng.fill_bytes(&mut raw);
            raw[0] &= 252;
            raw[55] |= 128;
            let secret = x448::Secret::from_bytes(&raw)
                .ok_or_else(|| Error::crypto("ecdh: bad curve448 scalar"))?;
            let public = x448::PublicKey::from(&secret);
            Ok((Zeroizing::new(raw.to_vec()), public.as_bytes().to_vec()))
        }
        CurveId::NistP256 => {
            let secret = p256::SecretKey::random(&mut *rng);
            let point = secret.public_key().to_encoded_point(false);
            Ok((
                Zeroizing::new(secret.to_bytes().to_vec()),
                point.as_bytes().to_vec(),
            ))
        }
        CurveId::NistP384 => {
            let secret = p384::SecretKey::random(&mut *rng);
            let point = secret.public_key().to_encoded_point(false);
            Ok((
                Zeroizing::new(secret.to_bytes().to_vec()),
                point.as_bytes().to_vec(),
            ))
        }
        _ => Err(Error::invalid_argument(format!(
            "curve {} has no ECDH backend",
            curve
        ))),
    }
}

/// Performs an ephemeral exchange against `their_point`, returning the
/// ephemeral public point and the shared secret.
pub(crate) fn ephemeral_exchange<R: CryptoRng + RngCore>(
    rng: &mut R,
    curve: CurveId,
    their_point: &[u8],
) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
    let (scalar, point) = generate_scalar(rng, curve)?;
    let shared = static_exchange(curve, &scalar, their_point)?;
    Ok((point, shared))
}

/// Performs an exchange between a stored scalar and a peer point.
pub(crate) fn static_exchange(
    curve: CurveId,
    scalar: &[u8],
    their_point: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    match curve {
        CurveId::Curve25519 => {
            let d: [u8; 32] = scalar
                .try_into()
                .map_err(|_| Error::crypto("ecdh: bad curve25519 scalar length"))?;
            let q: [u8; 32] = their_point
                .try_into()
                .map_err(|_| Error::crypto("ecdh: bad curve25519 point length"))?;
            let secret = x25519_dalek::StaticSecret::from(d);
            let shared = secret.diffie_hellman(&x25519_dalek::PublicKey::from(q));
            Ok(Zeroizing::new(shared.as_bytes().to_vec()))
        }
        CurveId::Curve448 => {
            let secret = x448::Secret::from_bytes(scalar)
                .ok_or_else(|| Error::crypto("ecdh: bad curve448 scalar"))?;
            let public = x448::PublicKey::from_bytes(their_point)
                .ok_or_else(|| Error::crypto("ecdh: bad curve448 point"))?;
            let shared = secret
                .as_diffie_hellman(&public)
                .ok_or_else(|| Error::crypto("ecdh: low-order curve448 point"))?;
            Ok(Zeroizing::new(shared.as_bytes().to_vec()))
        }
        CurveId::NistP256 => {
            let secret = p256::SecretKey::from_slice(scalar)
                .map_err(|_| Error::crypto("ecdh: bad P-256 scalar"))?;
            let public = p256::PublicKey::from_sec1_bytes(their_point)
                .map_err(|_| Error::crypto("ecdh: bad P-256 point"))?;
            let shared =
                p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
            Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
        }
        CurveId::NistP384 => {
            let secret = p384::SecretKey::from_slice(scalar)
                .map_err(|_| Error::crypto("ecdh: bad P-384 scalar"))?;
            let public = p384::PublicKey::from_sec1_bytes(their_point)
                .map_err(|_| Error::crypto("ecdh: bad P-384 point"))?;
            let shared =
                p384::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
            Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
        }
        _ => Err(Error::invalid_argument(format!(
            "curve {} has no ECDH backend",
            curve
        ))),
    }
}

/// Converts a native point to its OpenPGP wire encoding. Montgomery-curve
/// coordinates gain the 0x40 prefix; NIST points are already SEC1-encoded.
pub(crate) fn to_wire_point(curve: CurveId, native: &[u8]) -> Vec<u8> {
    match curve {
        CurveId::Curve25519 | CurveId::Curve448 => {
            let mut out = Vec::with_capacity(native.len() + 1);
            out.push(0x40);
            out.extend_from_slice(native);
            out
        }
        _ => native.to_vec(),
    }
}

/// Inverse of [`to_wire_point`].
pub(crate) fn from_wire_point(curve: CurveId, wire: &[u8]) -> Result<Vec<u8>> {
    match curve {
        CurveId::Curve25519 | CurveId::Curve448 => {
            if wire.first() != Some(&0x40) {
                return Err(Error::structural("ecdh: point lacks native-point prefix"));
            }
            Ok(wire[1..].to_vec())
        }
        _ => Ok(wire.to_vec()),
    }
}

/// Generates an ECDH key on `curve` with the given KDF parameters.
pub fn generate_key<R: CryptoRng + RngCore>(
    rng: &mut R,
    curve: CurveId,
    kdf: Kdf,
) -> Result<PrivateKey> {
    let (scalar, point) = generate_scalar(rng, curve)?;
    Ok(PrivateKey {
        public: PublicKey { curve, kdf, point },
        d: scalar.to_vec(),
    })
}

fn kdf_info(kdf: &Kdf, oid: &[u8], fingerprint: &[u8]) -> Vec<u8> {
    let mut info = Vec::with_capacity(oid.len() + fingerprint.len() + 2);
    info.extend_from_slice(oid);
    info.push(kdf.hash as u8);
    info.push(kdf.cipher as u8);
    info.extend_from_slice(fingerprint);
    info
}

type Aes256Ctr = ctr::Ctr64BE<aes::Aes256>;

/// The KEK is unique per ephemeral exchange, so a fixed IV never repeats
/// under the same key.
fn keystream_crypt(kek: &[u8; 32], data: &mut [u8]) {
    use aes::cipher::{KeyIvInit, StreamCipher};
    let mut cipher = Aes256Ctr::new(kek.into(), &[0u8; 16].into());
    cipher.apply_keystream(data);
}

/// Encrypts `msg` to `pub_key`, returning the wire-encoded ephemeral point
/// and the wrapped session data.
pub fn encrypt<R: CryptoRng + RngCore>(
    rng: &mut R,
    pub_key: &PublicKey,
    msg: &[u8],
    oid: &[u8],
    fingerprint: &[u8],
) -> Result<(Vec<u8>, Vec<u8>)> {
    let (ephemeral, shared) = ephemeral_exchange(rng, pub_key.curve, &pub_key.point)?;
    let kek = wrap::derive_kek(&shared, &kdf_info(&pub_key.kdf, oid, fingerprint));
    let mut wrapped = msg.to_vec();
    keystream_crypt(&kek, &mut wrapped);
    Ok((to_wire_point(pub_key.curve, &ephemeral), wrapped))
}

/// Decrypts the wrapped session data using the wire-encoded ephemeral point.
pub fn decrypt(
    priv_key: &PrivateKey,
    ephemeral: &[u8],
    wrapped: &[u8],
    oid: &[u8],
    fingerprint: &[u8],
) -> Result<Vec<u8>> {
    let native = from_wire_point(priv_key.public.curve, ephemeral)?;
    let shared = static_exchange(priv_key.public.curve, &priv_key.d, &native)?;
    let kek = wrap::derive_kek(&shared, &kdf_info(&priv_key.public.kdf, oid, fingerprint));
    let mut msg = wrapped.to_vec();
    keystream_crypt(&kek, &mut msg);
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn test_kdf() -> Kdf {
        Kdf {
            hash: HashAlgorithm::Sha512,
            cipher: CipherFunction::Aes256,
        }
    }

    #[test]
    fn test_round_trip_all_backends() {
        let mut rng = OsRng;
        for curve in [
            CurveId::Curve25519,
            CurveId::Curve448,
            CurveId::NistP256,
            CurveId::NistP384,
        ] {
            let key = generate_key(&mut rng, curve, test_kdf()).unwrap();
            let oid = curve.oid();
            let fingerprint = [0xabu8; 20];

            let (ephemeral, wrapped) = encrypt(
                &mut rng,
                &key.public,
                b"session key",
                oid,
                &fingerprint,
            )
            .unwrap();
            let pt = decrypt(&key, &ephemeral, &wrapped, oid, &fingerprint).unwrap();
            assert_eq!(pt, b"session key", "curve = {}", curve);
        }
    }

    #[test]
    fn test_fingerprint_binds_kdf() {
        let mut rng = OsRng;
        let key = generate_key(&mut rng, CurveId::NistP256, test_kdf()).unwrap();
        let oid = CurveId::NistP256.oid();

        // A different recipient fingerprint derives a different KEK, so the
        // unwrap yields garbage rather than the session data.
        let (ephemeral, wrapped) =
            encrypt(&mut rng, &key.public, b"session key", oid, &[1u8; 20]).unwrap();
        let unwrapped = decrypt(&key, &ephemeral, &wrapped, oid, &[2u8; 20]).unwrap();
        assert_ne!(unwrapped, b"session key");
    }

    #[test]
    fn test_unsupported_curve() {
        let mut rng = OsRng;
        assert!(matches!(
            generate_key(&mut rng, CurveId::BrainpoolP256, test_kdf()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_wire_point_prefix() {
        let native = vec![5u8; 32];
        let wire = to_wire_point(CurveId::Curve25519, &native);
        assert_eq!(wire.len(), 33);
        assert_eq!(wire[0], 0x40);
        assert_eq!(from_wire_point(CurveId::Curve25519, &wire).unwrap(), native);
        assert!(from_wire_point(CurveId::Curve25519, &native).is_err());
    }
}
