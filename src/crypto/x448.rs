//! X448 session-key encryption and its PKESK field codec.
//!
//! Same envelope pattern as X25519 with a 56-byte ephemeral key.

use crate::crypto::wrap;
use crate::error::{Error, Result};
use crate::packet::encoding::PacketReader;
use rand::{CryptoRng, RngCore};
use std::io::Write;

/// Length in bytes of an X448 public key.
pub const KEY_LEN: usize = 56;

/// An X448 public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Montgomery u-coordinate
    pub point: [u8; KEY_LEN],
}

/// An X448 private key.
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

/// Draws a fresh clamped X448 scalar.
fn random_scalar<R: CryptoRng + RngCore>(rng: &mut R) -> [u8; KEY_LEN] {
    let mut raw = [0u8; KEY_LEN];
    rng.fill_bytes(&mut raw);
    raw[0] &= 252;
    raw[KEY_LEN - 1] |= 128;
    raw
}

/// Generates an X448 key.
pub fn generate_key<R: CryptoRng + RngCore>(rng: &mut R) -> Result<PrivateKey> {
    let raw = random_scalar(rng);
    let secret =
        x448::Secret::from_bytes(&raw).ok_or_else(|| Error::crypto("x448: bad scalar"))?;
    let public = x448::PublicKey::from(&secret);

    let mut point = [0u8; KEY_LEN];
    point.copy_from_slice(public.as_bytes());
    Ok(PrivateKey {
        public: PublicKey { point },
        secret: raw,
    })
}

fn derive_kek(shared: &[u8], ephemeral: &[u8; KEY_LEN], recipient: &[u8; KEY_LEN]) -> [u8; 32] {
    let mut info = Vec::with_capacity(2 * KEY_LEN);
    info.extend_from_slice(ephemeral);
    info.extend_from_slice(recipient);
    *wrap::derive_kek(shared, &info)
}

fn exchange(scalar: &[u8; KEY_LEN], point: &[u8; KEY_LEN]) -> Result<Vec<u8>> {
    let secret =
        x448::Secret::from_bytes(scalar).ok_or_else(|| Error::crypto("x448: bad scalar"))?;
    let public =
        x448::PublicKey::from_bytes(point).ok_or_else(|| Error::crypto("x448: bad point"))?;
    let shared = secret
        .as_diffie_hellman(&public)
        .ok_or_else(|| Error::crypto("x448: low-order point"))?;
    Ok(shared.as_bytes().to_vec())
}

/// Encrypts `key` to `pub_key`, returning the ephemeral public key and the
/// sealed ciphertext.
pub fn encrypt<R: CryptoRng + RngCore>(
    rng: &mut R,
    pub_key: &PublicKey,
    key: &[u8],
) -> Result<([u8; KEY_LEN], Vec<u8>)> {
    let raw = random_scalar(rng);
    let ephemeral =
        x448::Secret::from_bytes(&raw).ok_or_else(|| Error::crypto("x448: bad scalar"))?;
    let mut ephemeral_public = [0u8; KEY_LEN];
    ephemeral_public.copy_from_slice(x448::PublicKey::from(&ephemeral).as_bytes());

    let shared = exchange(&raw, &pub_key.point)?;
    let kek = derive_kek(&shared, &ephemeral_public, &pub_key.point);
    let ciphertext = wrap::seal(rng, &kek, key)?;
    Ok((ephemeral_public, ciphertext))
}

/// Decrypts a sealed session key using the packet's ephemeral public key.
pub fn decrypt(
    priv_key: &PrivateKey,
    ephemeral: &[u8; KEY_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let shared = exchange(&priv_key.secret, ephemeral)?;
    let kek = derive_kek(&shared, ephemeral, &priv_key.public.point);
    wrap::open(&kek, ciphertext)
}

/// Decodes the PKESK fields: ephemeral key, ciphertext, and the trailing
/// cipher octet for v3 packets.
pub fn decode_fields(
    r: &mut PacketReader<'_>,
    is_v6: bool,
) -> Result<([u8; KEY_LEN], Vec<u8>, Option<u8>)> {
    let mut ephemeral = [0u8; KEY_LEN];
    ephemeral.copy_from_slice(r.read_bytes(KEY_LEN)?);
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
        return Err(Error::invalid_argument("x448: ciphertext too long"));
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
