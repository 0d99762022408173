//! ElGamal session-key encryption.
//!
//! Operates on externally supplied group parameters; this crate never
//! generates ElGamal keys. Present for decrypting and (v3 only) producing
//! PKESK packets addressed to legacy keys.

use crate::error::{Error, Result};
use num_bigint_dig::{BigUint, RandBigInt};
use num_traits::One;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// An ElGamal public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Group prime
    pub p: BigUint,
    /// Group generator
    pub g: BigUint,
    /// Public value `g^x mod p`
    pub y: BigUint,
}

/// An ElGamal private key.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    /// The public half
    pub public: PublicKey,
    /// Secret exponent
    pub x: BigUint,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.x.zeroize();
    }
}

/// Encrypts `msg` to `pub_key`, returning the ciphertext pair `(c1, c2)`.
pub fn encrypt<R: CryptoRng + RngCore>(
    rng: &mut R,
    pub_key: &PublicKey,
    msg: &[u8],
) -> Result<(BigUint, BigUint)> {
    let m = BigUint::from_bytes_be(msg);
    if m >= pub_key.p {
        return Err(Error::crypto("elgamal: message too long for group"));
    }

    let one = BigUint::one();
    let bound = &pub_key.p - &one;
    let k = rng.gen_biguint_range(&one, &bound);

    let c1 = pub_key.g.modpow(&k, &pub_key.p);
    let c2 = (m * pub_key.y.modpow(&k, &pub_key.p)) % &pub_key.p;
    Ok((c1, c2))
}

/// Decrypts the ciphertext pair `(c1, c2)`.
pub fn decrypt(priv_key: &PrivateKey, c1: &BigUint, c2: &BigUint) -> Result<Vec<u8>> {
    let p = &priv_key.public.p;
    if c1 >= p || c2 >= p {
        return Err(Error::crypto("elgamal: ciphertext out of range"));
    }

    // s = c1^x, m = c2 * s^-1 = c2 * c1^(p-1-x)
    let exp = p - BigUint::one() - &priv_key.x;
    let s_inv = c1.modpow(&exp, p);
    let m = (c2 * s_inv) % p;
    Ok(m.to_bytes_be())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    // RFC 3526 group 5 (1536-bit MODP), generator 2.
    fn test_group() -> (BigUint, BigUint) {
        let p_hex = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
                     020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
                     4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
                     EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
                     98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
                     9ED529077096966D670C354E4ABC9804F1746C08CA237327FFFFFFFFFFFFFFFF";
        let p = BigUint::parse_bytes(p_hex.as_bytes(), 16).unwrap();
        (p, BigUint::from(2u32))
    }

    fn test_key(rng: &mut OsRng) -> PrivateKey {
        let (p, g) = test_group();
        let x = rng.gen_biguint_range(&BigUint::one(), &(&p - BigUint::one()));
        let y = g.modpow(&x, &p);
        PrivateKey {
            public: PublicKey { p, g, y },
            x,
        }
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let mut rng = OsRng;
        let key = test_key(&mut rng);
        let msg = b"\x09session key with cipher prefix";

        let (c1, c2) = encrypt(&mut rng, &key.public, msg).unwrap();
        let pt = decrypt(&key, &c1, &c2).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn test_out_of_range_ciphertext() {
        let mut rng = OsRng;
        let key = test_key(&mut rng);
        let oversized = key.public.p.clone();
        assert!(decrypt(&key, &oversized, &BigUint::one()).is_err());
    }
}
