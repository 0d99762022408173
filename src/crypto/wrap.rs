//! Session-data wrap shared by the key-agreement facades.
//!
//! A key-encapsulation shared secret is turned into a key-encryption key
//! with HKDF, then the session data is sealed with AES-256-GCM. The nonce
//! is carried in front of the ciphertext.

use crate::error::{Error, Result};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use hkdf::Hkdf;
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use sha3::Sha3_256;
use zeroize::Zeroizing;

/// AES-GCM nonce length in bytes.
pub(crate) const NONCE_LEN: usize = 12;

/// Sealed-output overhead: nonce plus the GCM tag.
pub(crate) const SEAL_OVERHEAD: usize = NONCE_LEN + 16;

/// Derives a 32-byte key-encryption key with HKDF-SHA256.
pub(crate) fn derive_kek(ikm: &[u8], info: &[u8]) -> Zeroizing<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);
    let mut kek = Zeroizing::new([0u8; 32]);
    hk.expand(info, &mut *kek)
        .expect("32 bytes is a valid HKDF-SHA256 output length");
    kek
}

/// Derives a 32-byte key-encryption key with HKDF-SHA3-256, used by the
/// post-quantum combiner.
pub(crate) fn derive_kek_sha3(ikm: &[u8], info: &[u8]) -> Zeroizing<[u8; 32]> {
    let hk = Hkdf::<Sha3_256>::new(None, ikm);
    let mut kek = Zeroizing::new([0u8; 32]);
    hk.expand(info, &mut *kek)
        .expect("32 bytes is a valid HKDF-SHA3-256 output length");
    kek
}

/// Seals `plaintext` under `kek`, returning `nonce || ciphertext || tag`.
pub(crate) fn seal<R: CryptoRng + RngCore>(
    rng: &mut R,
    kek: &[u8; 32],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(kek));
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce);

    let ct = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| Error::crypto("session data seal failed"))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ct.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ct);
    Ok(out)
}

/// Opens a `nonce || ciphertext || tag` blob sealed by [`seal`].
pub(crate) fn open(kek: &[u8; 32], sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < SEAL_OVERHEAD {
        return Err(Error::crypto("sealed session data too short"));
    }
    let (nonce, ct) = sealed.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(kek));
    cipher
        .decrypt(Nonce::from_slice(nonce), ct)
        .map_err(|_| Error::crypto("session data authentication failed"))
}
