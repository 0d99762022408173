//! X25519 session-key encryption and its PKESK field codec.
//!
//! The wire envelope is a 32-byte ephemeral public key, a 1-byte
//! length-prefixed ciphertext, and — in v3 packets only — a trailing
//! cipher-function octet.

use crate::crypto::wrap;
use crate::error::{Error, Result};
use crate::packet::encoding::PacketReader;
use rand::{CryptoRng, RngCore};
use std::io::Write;

/// Length in bytes of an X25519 public key.
pub const KEY_LEN: usize = 32;

/// An X25519 public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Montgomery u-coordinate
    pub point: [u8; KEY_LEN],
}

/// An X25519 private key.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    /// The public half
    pub public: PublicKey,
    /// Secret scalar
    pub secret: [u8; KEY_LEN],
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.secret.zeroize();
    }
}

/// Generates an X25519 key.
pub fn generate_key<R: CryptoRng + RngCore>(rng: &mut R) -> Result<PrivateKey> {
    let secret = x25519_dalek::StaticSecret::random_from_rng(&mut *rng);
    let public = x25519_dalek::PublicKey::from(&secret);
    Ok(PrivateKey {
        public: PublicKey {
            point: *public.as_bytes(),
        },
        secret: secret.to_bytes(),
    })
}

fn derive_kek(shared: &[u8], ephemeral: &[u8; KEY_LEN], recipient: &[u8; KEY_LEN]) -> [u8; 32] {
    let mut info = Vec::with_capacity(2 * KEY_LEN);
    info.extend_from_slice(ephemeral);
    info.extend_from_slice(recipient);
    *wrap::derive_kek(shared, &info)
}

/// Encrypts `key` to `pub_key`, returning the ephemeral public key and the
/// sealed ciphertext.
pub fn encrypt<R: CryptoRng + RngCore>(
    rng: &mut R,
    pub_key: &PublicKey,
    key: &[u8],
) -> Result<([u8; KEY_LEN], Vec<u8>)> {
    let ephemeral = x25519_dalek::EphemeralSecret::random_from_rng(&mut *rng);
    let ephemeral_public = *x25519_dalek::PublicKey::from(&ephemeral).as_bytes();
    let shared = ephemeral.diffie_hellman(&x25519_dalek::PublicKey::from(pub_key.point));

    let kek = derive_kek(shared.as_bytes(), &ephemeral_public, &pub_key.point);
    let ciphertext = wrap::seal(rng, &kek, key)?;
    Ok((ephemeral_public, ciphertext))
}

/// Decrypts a sealed session key using the packet's ephemeral public key.
pub fn decrypt(
    priv_key: &PrivateKey,
    ephemeral: &[u8; KEY_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let secret = x25519_dalek::StaticSecret::from(priv_key.secret);
    let shared = secret.diffie_hellman(&x25519_dalek::PublicKey::from(*ephemeral));

    let kek = derive_kek(shared.as_bytes(), ephemeral, &priv_key.public.point);
    wrap::open(&kek, ciphertext)
}

/// Decodes the PKESK fields: ephemeral key, ciphertext, and the trailing
/// cipher octet for v3 packets.
pub fn decode_fields(
    r: &mut PacketReader<'_>,
    is_v6: bool,
) -> Result<([u8; KEY_LEN], Vec<u8>, Option<u8>)> {
    let ephemeral: [u8; KEY_LEN] = r
        .read_bytes(KEY_LEN)?
        .try_into()
        .expect("read_bytes returns the requested length");
    let len = r.read_u8()? as usize;
    let ciphertext = r.read_bytes(len)?.to_vec();
    let cipher_byte = if is_v6 { None } else { Some(r.read_u8()?) };
    Ok((ephemeral, ciphertext, cipher_byte))
}

/// Encodes the PKESK fields written by [`decode_fields`]'s inverse.
pub fn encode_fields<W: Write>(
    w: &mut W,
    ephemeral: &[u8; KEY_LEN],
    ciphertext: &[u8],
    cipher_byte: u8,
    is_v6: bool,
) -> Result<()> {
    if ciphertext.len() > 255 {
        return Err(Error::invalid_argument("x25519: ciphertext too long"));
    }
    w.write_all(ephemeral)?;
    w.write_all(&[ciphertext.len() as u8])?;
    w.write_all(ciphertext)?;
    if !is_v6 {
        w.write_all(&[cipher_byte])?;
    }
    Ok(())
}

/// Total encoded length of the PKESK fields.
pub fn encoded_fields_length(ciphertext: &[u8], is_v6: bool) -> usize {
    KEY_LEN + 1 + ciphertext.len() + usize::from(!is_v6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let mut rng = OsRng;
        let key = generate_key(&mut rng).unwrap();
        let session_key = [0x42u8; 32];

        let (ephemeral, ciphertext) = encrypt(&mut rng, &key.public, &session_key).unwrap();
        let pt = decrypt(&key, &ephemeral, &ciphertext).unwrap();
        assert_eq!(pt, session_key);
    }

    #[test]
    fn test_field_codec_round_trip() {
        let ephemeral = [0x11u8; KEY_LEN];
        let ciphertext = vec![0x22u8; 60];

        for is_v6 in [false, true] {
            let mut buf = Vec::new();
            encode_fields(&mut buf, &ephemeral, &ciphertext, 9, is_v6).unwrap();
            assert_eq!(buf.len(), encoded_fields_length(&ciphertext, is_v6));

            let mut r = PacketReader::new(&buf);
            let (e, c, cipher) = decode_fields(&mut r, is_v6).unwrap();
            assert_eq!(e, ephemeral);
            assert_eq!(c, ciphertext);
            assert_eq!(cipher, if is_v6 { None } else { Some(9) });
            assert!(r.is_empty());
        }
    }
}
