//! RSA key generation and PKCS#1 v1.5 operations.
//!
//! Key generation supports the multi-prime construction: the modulus is the
//! product of `nprimes >= 2` primes whose bit lengths divide the requested
//! modulus size, with a bit-budget correction for large prime counts and a
//! restart whenever the product misses the target length. Prepared primes
//! can be fed in for deterministic generation.

use crate::crypto::HashAlgorithm;
use crate::error::{Error, Result};
use num_bigint_dig::{BigUint, ModInverse, RandPrime};
use num_traits::One;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// Public RSA exponent used for all generated keys.
const E: u32 = 65537;

/// Generation restarts allowed before giving up. Collisions and product
/// shortfalls are rare, so hitting this bound means the RNG is broken.
const MAX_GENERATION_ATTEMPTS: usize = 128;

/// An RSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Modulus
    pub n: BigUint,
    /// Public exponent
    pub e: BigUint,
}

impl PublicKey {
    /// Modulus size in bytes.
    pub fn size(&self) -> usize {
        (self.n.bits() + 7) / 8
    }
}

/// CRT parameters precomputed at generation time.
#[derive(Debug, Clone)]
pub struct Precomputed {
    /// Per-prime exponents `d mod (p_i - 1)`.
    pub exponents: Vec<BigUint>,
    /// Garner coefficients `(p_1 * ... * p_{i-1})^-1 mod p_i` for `i >= 2`.
    pub coefficients: Vec<BigUint>,
}

/// An RSA private key, possibly multi-prime.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    /// The public half
    pub public: PublicKey,
    /// Private exponent
    pub d: BigUint,
    /// Prime factors of the modulus, at least two
    pub primes: Vec<BigUint>,
    /// CRT acceleration values
    pub precomputed: Precomputed,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.d.zeroize();
        for p in &mut self.primes {
            p.zeroize();
        }
        for e in &mut self.precomputed.exponents {
            e.zeroize();
        }
        for c in &mut self.precomputed.coefficients {
            c.zeroize();
        }
    }
}

/// Generates a two-prime RSA key of the given modulus size.
pub fn generate<R: CryptoRng + RngCore>(rng: &mut R, bits: usize) -> Result<PrivateKey> {
    generate_with_primes(rng, 2, bits, Vec::new())
}

/// Generates a multi-prime RSA key of the given modulus size, drawing
/// primes from `prepopulated` before falling back to the RNG.
pub fn generate_with_primes<R: CryptoRng + RngCore>(
    rng: &mut R,
    nprimes: usize,
    bits: usize,
    prepopulated: Vec<BigUint>,
) -> Result<PrivateKey> {
    if nprimes < 2 {
        return Err(Error::invalid_argument("nprimes must be >= 2"));
    }
    if bits < 1024 {
        return Err(Error::invalid_argument("bits must be >= 1024"));
    }

    let e = BigUint::from(E);
    let one = BigUint::one();
    let mut feed = prepopulated;
    let mut primes: Vec<BigUint> = Vec::with_capacity(nprimes);

    'next_set_of_primes: for _ in 0..MAX_GENERATION_ATTEMPTS {
        primes.clear();
        let mut todo = bits;
        // Each prime has its top two bits set, so it has the form
        // 2^bitlen x 0.11... and the product of nprimes such factors can
        // fall below 2^(bits-1). Shift the budget to compensate: the mean
        // factor is 7/8, so todo + (nprimes-2)/5 recenters the product on
        // the target length.
        if nprimes >= 7 {
            todo += (nprimes - 2) / 5;
        }
        for i in 0..nprimes {
            let prime = if feed.is_empty() {
                rng.gen_prime(todo / (nprimes - i))
            } else {
                feed.remove(0)
            };
            todo = todo.saturating_sub(prime.bits());
            primes.push(prime);
        }

        for i in 0..primes.len() {
            for j in 0..i {
                if primes[i] == primes[j] {
                    continue 'next_set_of_primes;
                }
            }
        }

        let mut n = BigUint::one();
        let mut totient = BigUint::one();
        for prime in &primes {
            n *= prime;
            totient *= prime - &one;
        }
        if n.bits() != bits {
            // Should not happen for nprimes == 2 since the top two bits of
            // each prime are set; for nprimes > 2 we retry.
            continue 'next_set_of_primes;
        }

        let d = match (&e).mod_inverse(&totient).and_then(|d| d.to_biguint()) {
            Some(d) => d,
            None => continue 'next_set_of_primes,
        };

        let precomputed = precompute(&d, &primes);
        return Ok(PrivateKey {
            public: PublicKey { n, e },
            d,
            primes,
            precomputed,
        });
    }

    Err(Error::crypto("rsa: exhausted generation attempts"))
}

fn precompute(d: &BigUint, primes: &[BigUint]) -> Precomputed {
    let one = BigUint::one();
    let exponents = primes.iter().map(|p| d % (p - &one)).collect();

    let mut coefficients = Vec::with_capacity(primes.len().saturating_sub(1));
    let mut product = primes[0].clone();
    for p in &primes[1..] {
        // The running product is coprime to p, so the inverse exists.
        let rem = &product % p;
        let coeff = (&rem)
            .mod_inverse(p)
            .and_then(|c| c.to_biguint())
            .unwrap_or_else(BigUint::one);
        coefficients.push(coeff);
        product *= p;
    }
    Precomputed {
        exponents,
        coefficients,
    }
}

/// Raw RSA private operation via per-prime exponentiation and Garner
/// recombination.
fn decrypt_raw(priv_key: &PrivateKey, c: &BigUint) -> BigUint {
    let pre = &priv_key.precomputed;
    let mut x = (c % &priv_key.primes[0]).modpow(&pre.exponents[0], &priv_key.primes[0]);
    let mut product = priv_key.primes[0].clone();
    for (i, p) in priv_key.primes.iter().enumerate().skip(1) {
        let m_i = (c % p).modpow(&pre.exponents[i], p);
        let x_mod = &x % p;
        let diff = if m_i >= x_mod { m_i - &x_mod } else { p - x_mod + m_i };
        let t = (diff * &pre.coefficients[i - 1]) % p;
        x += &product * t;
        product *= p;
    }
    x
}

/// Encrypts `msg` with RSAES-PKCS1-v1_5.
pub fn encrypt_pkcs1v15<R: CryptoRng + RngCore>(
    rng: &mut R,
    pub_key: &PublicKey,
    msg: &[u8],
) -> Result<Vec<u8>> {
    let k = pub_key.size();
    if msg.len() > k.saturating_sub(11) {
        return Err(Error::crypto("rsa: message too long for modulus"));
    }

    // EM = 0x00 || 0x02 || PS (nonzero) || 0x00 || M
    let mut em = vec![0u8; k];
    em[1] = 0x02;
    let ps_len = k - msg.len() - 3;
    for byte in em[2..2 + ps_len].iter_mut() {
        let mut b = [0u8; 1];
        loop {
            rng.fill_bytes(&mut b);
            if b[0] != 0 {
                break;
            }
        }
        *byte = b[0];
    }
    em[2 + ps_len] = 0x00;
    em[3 + ps_len..].copy_from_slice(msg);

    let m = BigUint::from_bytes_be(&em);
    let c = m.modpow(&pub_key.e, &pub_key.n);
    em.zeroize();
    Ok(c.to_bytes_be())
}

/// Decrypts an RSAES-PKCS1-v1_5 ciphertext. The ciphertext is left-padded
/// to the modulus size before the private operation.
pub fn decrypt_pkcs1v15(priv_key: &PrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let k = priv_key.public.size();
    if ciphertext.len() > k {
        return Err(Error::crypto("rsa: ciphertext longer than modulus"));
    }

    let c = BigUint::from_bytes_be(ciphertext);
    if c >= priv_key.public.n {
        return Err(Error::crypto("rsa: ciphertext out of range"));
    }
    let m = decrypt_raw(priv_key, &c);
    let mut em = vec![0u8; k];
    let m_bytes = m.to_bytes_be();
    em[k - m_bytes.len()..].copy_from_slice(&m_bytes);

    if em[0] != 0x00 || em[1] != 0x02 {
        em.zeroize();
        return Err(Error::crypto("rsa: decryption error"));
    }
    let sep = em[2..]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::crypto("rsa: decryption error"))?;
    if sep < 8 {
        em.zeroize();
        return Err(Error::crypto("rsa: decryption error"));
    }
    let msg = em[2 + sep + 1..].to_vec();
    em.zeroize();
    Ok(msg)
}

/// DER DigestInfo prefix for the signature hash.
fn digest_info_prefix(hash: HashAlgorithm) -> Result<&'static [u8]> {
    match hash {
        HashAlgorithm::Sha256 => Ok(&[
            0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x01, 0x05, 0x00, 0x04, 0x20,
        ]),
        HashAlgorithm::Sha384 => Ok(&[
            0x30, 0x41, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x02, 0x05, 0x00, 0x04, 0x30,
        ]),
        HashAlgorithm::Sha512 => Ok(&[
            0x30, 0x51, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x03, 0x05, 0x00, 0x04, 0x40,
        ]),
        HashAlgorithm::Sha3_256 => Ok(&[
            0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x08, 0x05, 0x00, 0x04, 0x20,
        ]),
        HashAlgorithm::Sha3_512 => Ok(&[
            0x30, 0x51, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x0a, 0x05, 0x00, 0x04, 0x40,
        ]),
        HashAlgorithm::Sha1 => Err(Error::unsupported(
            "SHA-1 is not acceptable as a signature hash",
        )),
    }
}

/// Signs a digest with RSASSA-PKCS1-v1_5.
pub fn sign_pkcs1v15(
    priv_key: &PrivateKey,
    hash: HashAlgorithm,
    digest: &[u8],
) -> Result<Vec<u8>> {
    let prefix = digest_info_prefix(hash)?;
    if digest.len() != hash.digest_len() {
        return Err(Error::crypto("rsa: digest length mismatch"));
    }
    let k = priv_key.public.size();
    let t_len = prefix.len() + digest.len();
    if k < t_len + 11 {
        return Err(Error::crypto("rsa: modulus too small for signature hash"));
    }

    // EM = 0x00 || 0x01 || 0xFF.. || 0x00 || DigestInfo || digest
    let mut em = vec![0xffu8; k];
    em[0] = 0x00;
    em[1] = 0x01;
    em[k - t_len - 1] = 0x00;
    em[k - t_len..k - digest.len()].copy_from_slice(prefix);
    em[k - digest.len()..].copy_from_slice(digest);

    let m = BigUint::from_bytes_be(&em);
    let s = decrypt_raw(priv_key, &m);
    let mut sig = vec![0u8; k];
    let s_bytes = s.to_bytes_be();
    sig[k - s_bytes.len()..].copy_from_slice(&s_bytes);
    Ok(sig)
}

/// Verifies an RSASSA-PKCS1-v1_5 signature over a digest.
pub fn verify_pkcs1v15(
    pub_key: &PublicKey,
    hash: HashAlgorithm,
    digest: &[u8],
    sig: &[u8],
) -> Result<()> {
    let prefix = digest_info_prefix(hash)?;
    let k = pub_key.size();
    let s = BigUint::from_bytes_be(sig);
    if s >= pub_key.n {
        return Err(Error::crypto("rsa: signature out of range"));
    }
    let m = s.modpow(&pub_key.e, &pub_key.n);
    let mut em = vec![0u8; k];
    let m_bytes = m.to_bytes_be();
    em[k - m_bytes.len()..].copy_from_slice(&m_bytes);

    let t_len = prefix.len() + digest.len();
    let mut expected = vec![0xffu8; k];
    expected[0] = 0x00;
    expected[1] = 0x01;
    expected[k - t_len - 1] = 0x00;
    expected[k - t_len..k - digest.len()].copy_from_slice(prefix);
    expected[k - digest.len()..].copy_from_slice(digest);

    if em != expected {
        return Err(Error::crypto("rsa: signature verification failed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use rand::rngs::OsRng;

    fn totient(primes: &[BigUint]) -> BigUint {
        let one = BigUint::one();
        primes.iter().fold(BigUint::one(), |acc, p| acc * (p - &one))
    }

    #[test]
    fn test_two_prime_generation() {
        let mut rng = OsRng;
        let key = generate(&mut rng, 1024).unwrap();

        assert_eq!(key.public.n.bits(), 1024);
        assert_eq!(key.public.e, BigUint::from(65537u32));
        assert_eq!(key.primes.len(), 2);

        let phi = totient(&key.primes);
        assert_eq!((&key.d * &key.public.e) % &phi, BigUint::one());
    }

    #[test]
    fn test_multi_prime_generation() {
        let mut rng = OsRng;
        for nprimes in [3usize, 5] {
            let key = generate_with_primes(&mut rng, nprimes, 1024, Vec::new()).unwrap();
            assert_eq!(key.public.n.bits(), 1024, "nprimes = {}", nprimes);
            assert_eq!(key.primes.len(), nprimes);

            let product: BigUint = key.primes.iter().product();
            assert_eq!(product, key.public.n);

            let phi = totient(&key.primes);
            assert_eq!((&key.d * &key.public.e) % &phi, BigUint::one());
        }
    }

    #[test]
    fn test_invalid_generation_arguments() {
        let mut rng = OsRng;
        assert!(matches!(
            generate_with_primes(&mut rng, 1, 2048, Vec::new()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            generate_with_primes(&mut rng, 2, 512, Vec::new()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_prepopulated_primes_are_consumed_in_order() {
        let mut rng = OsRng;
        let p = rng.gen_prime(512);
        let q = rng.gen_prime(512);
        let key =
            generate_with_primes(&mut rng, 2, 1024, vec![p.clone(), q.clone()]).unwrap();
        assert_eq!(key.primes, vec![p, q]);
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let mut rng = OsRng;
        let key = generate(&mut rng, 1024).unwrap();
        let msg = b"session key material goes here";

        let ct = encrypt_pkcs1v15(&mut rng, &key.public, msg).unwrap();
        let pt = decrypt_pkcs1v15(&key, &ct).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn test_crt_matches_plain_exponentiation() {
        let mut rng = OsRng;
        let key = generate_with_primes(&mut rng, 3, 1024, Vec::new()).unwrap();
        let m = BigUint::from_bytes_be(b"multi prime crt check");
        assert!(!m.is_zero());

        let c = m.modpow(&key.public.e, &key.public.n);
        let plain = c.modpow(&key.d, &key.public.n);
        assert_eq!(decrypt_raw(&key, &c), plain);
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let mut rng = OsRng;
        let key = generate(&mut rng, 1024).unwrap();
        let digest = HashAlgorithm::Sha256.digest(b"signed data").unwrap();

        let sig = sign_pkcs1v15(&key, HashAlgorithm::Sha256, &digest).unwrap();
        verify_pkcs1v15(&key.public, HashAlgorithm::Sha256, &digest, &sig).unwrap();

        let other = HashAlgorithm::Sha256.digest(b"other data").unwrap();
        assert!(verify_pkcs1v15(&key.public, HashAlgorithm::Sha256, &other, &sig).is_err());
    }
}
