//! The Public-Key Encrypted Session Key packet, v3 and v6.
//!
//! The v3 shape addresses the recipient by 64-bit key id; the v6 shape by
//! key version and fingerprint, with key-version 0 denoting an anonymous
//! recipient. The algorithm octet selects the field layout that follows:
//! MPIs for RSA and ElGamal, MPI plus length-prefixed wrapped key for ECDH,
//! the CFRG envelope for X25519/X448, and fixed-length octet arrays plus a
//! wrapped key for the Kyber hybrids.
//!
//! Classical and ECDH payloads carry the session key with a 16-bit checksum
//! (and, in v3, a leading cipher octet); CFRG and Kyber payloads carry the
//! raw key, with the v3 cipher selection moved into the CFRG envelope's
//! trailing octet.

use crate::config::Config;
use crate::crypto::{
    ecdh, elgamal, hash_data, key_ids_equal, kyber_ecdh, rsa, x25519, x448, CipherFunction,
    PublicKeyAlgorithm,
};
use crate::error::{Error, Result};
use crate::packet::encoding::{Field, Mpi, OctetArray, OidSlice, PacketReader};
use crate::packet::private_key::{KeyMaterial, PrivateKey};
use crate::packet::public_key::{PublicKey, PublicParams};
use crate::packet::{serialize_header, Packet, PacketType};
use num_bigint_dig::BigUint;
use rand::{CryptoRng, RngCore};
use std::io::Write;
use subtle::ConstantTimeEq;
use tracing::debug;

/// Algorithm-specific encrypted fields of a PKESK packet.
#[derive(Debug, Clone)]
pub enum EncryptedFields {
    /// One MPI
    Rsa {
        /// PKCS#1 v1.5 ciphertext
        ciphertext: Mpi,
    },
    /// Two MPIs
    ElGamal {
        /// First ciphertext component
        c1: Mpi,
        /// Second ciphertext component
        c2: Mpi,
    },
    /// MPI ephemeral point plus length-prefixed wrapped key
    Ecdh {
        /// Ephemeral public point
        ephemeral: Mpi,
        /// Wrapped session data
        wrapped: OidSlice,
    },
    /// CFRG envelope
    X25519 {
        /// Ephemeral public key
        ephemeral: [u8; x25519::KEY_LEN],
        /// Sealed session key
        ciphertext: Vec<u8>,
        /// Trailing cipher octet, v3 only
        cipher_byte: Option<u8>,
    },
    /// CFRG envelope
    X448 {
        /// Ephemeral public key
        ephemeral: [u8; x448::KEY_LEN],
        /// Sealed session key
        ciphertext: Vec<u8>,
        /// Trailing cipher octet, v3 only
        cipher_byte: Option<u8>,
    },
    /// Fixed-length hybrid components plus wrapped key
    KyberEcdh {
        /// ECC ephemeral component
        ecdh_ephemeral: OctetArray,
        /// Kyber ciphertext
        kyber_ciphertext: OctetArray,
        /// Wrapped session key
        wrapped: OidSlice,
    },
}

/// A parsed or freshly built PKESK packet.
#[derive(Debug, Clone)]
pub struct EncryptedKey {
    /// Packet version, 3 or 6
    pub version: u8,
    /// Recipient key id (v3, or derived from the v6 fingerprint)
    pub key_id: u64,
    /// Recipient key version (v6 only; 0 for anonymous)
    pub key_version: u8,
    /// Recipient fingerprint (v6 only; empty for anonymous)
    pub key_fingerprint: Vec<u8>,
    /// Public-key algorithm
    pub algorithm: PublicKeyAlgorithm,
    /// Algorithm-specific fields
    pub fields: EncryptedFields,
    /// Session cipher; valid after a successful decrypt of a v3 packet
    pub cipher_func: Option<CipherFunction>,
    /// Session key; valid after a successful decrypt
    pub key: Vec<u8>,
}

/// 16-bit wrapping sum of the key bytes.
pub fn checksum_key_material(key: &[u8]) -> u16 {
    key.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16))
}

/// Appends the big-endian 16-bit checksum to the key bytes.
fn encode_checksum_key(key: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.len() + 2);
    out.extend_from_slice(key);
    out.extend_from_slice(&checksum_key_material(key).to_be_bytes());
    out
}

/// Splits and verifies a checksummed key block.
fn decode_checksum_key(msg: &[u8]) -> Result<Vec<u8>> {
    if msg.len() < 2 {
        return Err(Error::structural("session key payload too short"));
    }
    let (key, sum) = msg.split_at(msg.len() - 2);
    let expected = u16::from_be_bytes([sum[0], sum[1]]);
    if checksum_key_material(key) != expected {
        return Err(Error::structural("session key checksum is incorrect"));
    }
    Ok(key.to_vec())
}

/// Whether the algorithm uses the checksummed session-key payload.
fn uses_checksum_payload(algorithm: PublicKeyAlgorithm) -> bool {
    matches!(
        algorithm,
        PublicKeyAlgorithm::Rsa
            | PublicKeyAlgorithm::RsaEncryptOnly
            | PublicKeyAlgorithm::ElGamal
            | PublicKeyAlgorithm::Ecdh
    )
}

fn is_kyber_hybrid(algorithm: PublicKeyAlgorithm) -> bool {
    algorithm.kyber_parameters().is_ok()
}

impl EncryptedKey {
    /// Parses a PKESK packet body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut r = PacketReader::new(body);

        let version = r.read_u8()?;
        if version != 3 && version != 6 {
            return Err(Error::unsupported(format!(
                "unknown encrypted key version {}",
                version
            )));
        }

        let mut key_id = 0u64;
        let mut key_version = 0u8;
        let mut key_fingerprint = Vec::new();
        if version == 6 {
            key_version = r.read_u8()?;
            let fingerprint_len = match key_version {
                0 => 0,
                4 => 20,
                6 => 32,
                v => {
                    return Err(Error::unsupported(format!(
                        "unknown public key version {}",
                        v
                    )))
                }
            };
            key_fingerprint = r.read_bytes(fingerprint_len)?.to_vec();
            key_id = match key_version {
                6 => u64::from_be_bytes(key_fingerprint[0..8].try_into().unwrap()),
                4 => u64::from_be_bytes(key_fingerprint[12..20].try_into().unwrap()),
                _ => 0,
            };
        } else {
            key_id = r.read_u64()?;
        }

        let algorithm_byte = r.read_u8()?;
        let algorithm = PublicKeyAlgorithm::from_byte(algorithm_byte).ok_or_else(|| {
            Error::unsupported(format!("unknown public key algorithm {}", algorithm_byte))
        })?;

        let fields = match algorithm {
            PublicKeyAlgorithm::Rsa | PublicKeyAlgorithm::RsaEncryptOnly => {
                EncryptedFields::Rsa {
                    ciphertext: Mpi::read_from(&mut r)?,
                }
            }
            PublicKeyAlgorithm::ElGamal => EncryptedFields::ElGamal {
                c1: Mpi::read_from(&mut r)?,
                c2: Mpi::read_from(&mut r)?,
            },
            PublicKeyAlgorithm::Ecdh => EncryptedFields::Ecdh {
                ephemeral: Mpi::read_from(&mut r)?,
                wrapped: OidSlice::read_from(&mut r)?,
            },
            PublicKeyAlgorithm::X25519 => {
                let (ephemeral, ciphertext, cipher_byte) =
                    x25519::decode_fields(&mut r, version == 6)?;
                EncryptedFields::X25519 {
                    ephemeral,
                    ciphertext,
                    cipher_byte,
                }
            }
            PublicKeyAlgorithm::X448 => {
                let (ephemeral, ciphertext, cipher_byte) =
                    x448::decode_fields(&mut r, version == 6)?;
                EncryptedFields::X448 {
                    ephemeral,
                    ciphertext,
                    cipher_byte,
                }
            }
            alg if is_kyber_hybrid(alg) => EncryptedFields::KyberEcdh {
                ecdh_ephemeral: OctetArray::read_from(&mut r, alg.kyber_ecc_len()?)?,
                kyber_ciphertext: OctetArray::read_from(&mut r, alg.kyber_ct_len()?)?,
                wrapped: OidSlice::read_from(&mut r)?,
            },
            alg => {
                return Err(Error::unsupported(format!(
                    "cannot parse encrypted session key for algorithm {}",
                    alg
                )))
            }
        };

        if !r.is_empty() {
            return Err(Error::structural(
                "trailing data after encrypted session key",
            ));
        }

        Ok(Self {
            version,
            key_id,
            key_version,
            key_fingerprint,
            algorithm,
            fields,
            cipher_func: None,
            key: Vec::new(),
        })
    }

    /// Parses a PKESK packet from a framed packet.
    pub fn from_packet(packet: &Packet) -> Result<Self> {
        if packet.header.packet_type != PacketType::PublicKeyEncryptedSessionKey {
            return Err(Error::invalid_argument("not an encrypted session key packet"));
        }
        Self::parse(&packet.body)
    }

    fn check_issuer(&self, priv_key: &PrivateKey) -> Result<()> {
        if self.version < 6 && self.key_id != 0 && !key_ids_equal(self.key_id, priv_key.public.key_id)
        {
            return Err(Error::invalid_argument(format!(
                "cannot decrypt encrypted session key for key id {:016x} with private key id {:016x}",
                self.key_id, priv_key.public.key_id
            )));
        }
        if self.version == 6
            && self.key_version != 0
            && !bool::from(
                self.key_fingerprint
                    .as_slice()
                    .ct_eq(&priv_key.public.fingerprint),
            )
        {
            return Err(Error::invalid_argument(format!(
                "cannot decrypt encrypted session key for key fingerprint {} with private key fingerprint {}",
                hex_string(&self.key_fingerprint),
                hex_string(&priv_key.public.fingerprint)
            )));
        }
        Ok(())
    }

    /// Decrypts the session key with the given private key, populating
    /// [`EncryptedKey::key`] and, for v3 packets, [`EncryptedKey::cipher_func`].
    pub fn decrypt(&mut self, priv_key: &PrivateKey) -> Result<()> {
        self.check_issuer(priv_key)?;
        if self.algorithm != priv_key.public.algorithm {
            return Err(Error::invalid_argument(format!(
                "cannot decrypt encrypted session key of type {} with private key of type {}",
                self.algorithm, priv_key.public.algorithm
            )));
        }
        if priv_key.is_dummy() {
            return Err(Error::dummy_key("dummy key found"));
        }

        let plaintext = match (&self.fields, &priv_key.material) {
            (EncryptedFields::Rsa { ciphertext }, KeyMaterial::Rsa(k)) => {
                rsa::decrypt_pkcs1v15(k, ciphertext.bytes())?
            }
            (EncryptedFields::ElGamal { c1, c2 }, KeyMaterial::ElGamal(k)) => {
                let c1 = BigUint::from_bytes_be(c1.bytes());
                let c2 = BigUint::from_bytes_be(c2.bytes());
                elgamal::decrypt(k, &c1, &c2)?
            }
            (EncryptedFields::Ecdh { ephemeral, wrapped }, KeyMaterial::Ecdh(k)) => {
                let oid = OidSlice::new(k.public.curve.oid())?.encoded_bytes();
                ecdh::decrypt(
                    k,
                    ephemeral.bytes(),
                    wrapped.bytes(),
                    &oid,
                    &priv_key.public.fingerprint,
                )?
            }
            (
                EncryptedFields::X25519 {
                    ephemeral,
                    ciphertext,
                    ..
                },
                KeyMaterial::X25519(k),
            ) => x25519::decrypt(k, ephemeral, ciphertext)?,
            (
                EncryptedFields::X448 {
                    ephemeral,
                    ciphertext,
                    ..
                },
                KeyMaterial::X448(k),
            ) => x448::decrypt(k, ephemeral, ciphertext)?,
            (
                EncryptedFields::KyberEcdh {
                    ecdh_ephemeral,
                    kyber_ciphertext,
                    wrapped,
                },
                KeyMaterial::KyberEcdh(k),
            ) => {
                let issuer_hash = hash_data(&priv_key.public.serialize_for_hash());
                kyber_ecdh::decrypt(
                    k,
                    kyber_ciphertext.bytes(),
                    ecdh_ephemeral.bytes(),
                    wrapped.bytes(),
                    &issuer_hash,
                )?
            }
            _ => {
                return Err(Error::invalid_argument(format!(
                    "cannot decrypt encrypted session key with private key of type {}",
                    priv_key.public.algorithm
                )))
            }
        };

        if uses_checksum_payload(self.algorithm) {
            let mut key_offset = 0;
            if self.version < 6 {
                let cipher_byte = *plaintext
                    .first()
                    .ok_or_else(|| Error::structural("empty session key payload"))?;
                let cipher = CipherFunction::from_byte(cipher_byte)
                    .filter(|c| c.is_supported())
                    .ok_or_else(|| Error::unsupported("unsupported encryption function"))?;
                self.cipher_func = Some(cipher);
                key_offset = 1;
            }
            self.key = decode_checksum_key(&plaintext[key_offset..])?;
        } else {
            if self.version < 6 {
                if let EncryptedFields::X25519 { cipher_byte, .. }
                | EncryptedFields::X448 { cipher_byte, .. } = &self.fields
                {
                    let cipher = cipher_byte.and_then(CipherFunction::from_byte);
                    match cipher {
                        Some(c) if c.is_aes() => self.cipher_func = Some(c),
                        _ => {
                            return Err(Error::structural(
                                "v3 PKESK mandates AES as cipher function for x25519 and x448",
                            ))
                        }
                    }
                }
            }
            self.key = plaintext;
        }

        debug!(
            algorithm = %self.algorithm,
            version = self.version,
            key_id = format_args!("{:016x}", self.key_id),
            "decrypted session key packet"
        );
        Ok(())
    }

    /// Serializes the packet, header included, from the stored fields.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<()> {
        let is_v6 = self.version == 6;
        let encoded_length = match &self.fields {
            EncryptedFields::Rsa { ciphertext } => ciphertext.encoded_len(),
            EncryptedFields::ElGamal { c1, c2 } => c1.encoded_len() + c2.encoded_len(),
            EncryptedFields::Ecdh { ephemeral, wrapped } => {
                ephemeral.encoded_len() + wrapped.encoded_len()
            }
            EncryptedFields::X25519 { ciphertext, .. } => {
                x25519::encoded_fields_length(ciphertext, is_v6)
            }
            EncryptedFields::X448 { ciphertext, .. } => {
                x448::encoded_fields_length(ciphertext, is_v6)
            }
            EncryptedFields::KyberEcdh {
                ecdh_ephemeral,
                kyber_ciphertext,
                wrapped,
            } => {
                ecdh_ephemeral.encoded_len() + kyber_ciphertext.encoded_len() + wrapped.encoded_len()
            }
        };

        let header_len = if is_v6 {
            2 + self.key_fingerprint.len()
        } else {
            9
        };
        let packet_len = header_len + 1 + encoded_length;
        serialize_header(w, PacketType::PublicKeyEncryptedSessionKey, packet_len)?;

        w.write_all(&[self.version])?;
        if is_v6 {
            w.write_all(&[self.key_version])?;
            w.write_all(&self.key_fingerprint)?;
        } else {
            w.write_all(&self.key_id.to_be_bytes())?;
        }
        w.write_all(&[self.algorithm as u8])?;

        match &self.fields {
            EncryptedFields::Rsa { ciphertext } => w.write_all(&ciphertext.encoded_bytes())?,
            EncryptedFields::ElGamal { c1, c2 } => {
                w.write_all(&c1.encoded_bytes())?;
                w.write_all(&c2.encoded_bytes())?;
            }
            EncryptedFields::Ecdh { ephemeral, wrapped } => {
                w.write_all(&ephemeral.encoded_bytes())?;
                w.write_all(&wrapped.encoded_bytes())?;
            }
            EncryptedFields::X25519 {
                ephemeral,
                ciphertext,
                cipher_byte,
            } => x25519::encode_fields(
                w,
                ephemeral,
                ciphertext,
                cipher_byte.unwrap_or(0),
                is_v6,
            )?,
            EncryptedFields::X448 {
                ephemeral,
                ciphertext,
                cipher_byte,
            } => x448::encode_fields(
                w,
                ephemeral,
                ciphertext,
                cipher_byte.unwrap_or(0),
                is_v6,
            )?,
            EncryptedFields::KyberEcdh {
                ecdh_ephemeral,
                kyber_ciphertext,
                wrapped,
            } => {
                w.write_all(&ecdh_ephemeral.encoded_bytes())?;
                w.write_all(&kyber_ciphertext.encoded_bytes())?;
                w.write_all(&wrapped.encoded_bytes())?;
            }
        }
        Ok(())
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Serializes a PKESK packet for `key` encrypted to `pub_key`; v6 is used
/// when `config` enables AEAD.
pub fn serialize_encrypted_key<W: Write, R: CryptoRng + RngCore>(
    w: &mut W,
    rng: &mut R,
    pub_key: &PublicKey,
    cipher_func: CipherFunction,
    key: &[u8],
    config: &Config,
) -> Result<()> {
    serialize_encrypted_key_aead(w, rng, pub_key, cipher_func, config.aead_supported(), key)
}

/// Serializes a PKESK packet, choosing v6 when `aead_supported` is set.
pub fn serialize_encrypted_key_aead<W: Write, R: CryptoRng + RngCore>(
    w: &mut W,
    rng: &mut R,
    pub_key: &PublicKey,
    cipher_func: CipherFunction,
    aead_supported: bool,
    key: &[u8],
) -> Result<()> {
    serialize_internal(w, rng, pub_key, cipher_func, aead_supported, false, key)
}

/// Serializes an anonymous-recipient v6 PKESK packet: key version 0 and no
/// fingerprint, still encrypted to `pub_key`.
pub fn serialize_encrypted_key_anonymous<W: Write, R: CryptoRng + RngCore>(
    w: &mut W,
    rng: &mut R,
    pub_key: &PublicKey,
    cipher_func: CipherFunction,
    key: &[u8],
) -> Result<()> {
    serialize_internal(w, rng, pub_key, cipher_func, true, true, key)
}

fn serialize_internal<W: Write, R: CryptoRng + RngCore>(
    w: &mut W,
    rng: &mut R,
    pub_key: &PublicKey,
    cipher_func: CipherFunction,
    aead_supported: bool,
    anonymous: bool,
    key: &[u8],
) -> Result<()> {
    let version: u8 = if aead_supported { 6 } else { 3 };
    let is_v6 = version == 6;
    let algorithm = pub_key.algorithm;

    // An implementation MUST NOT generate ElGamal v6 PKESKs.
    if is_v6 && algorithm == PublicKeyAlgorithm::ElGamal {
        return Err(Error::invalid_argument("ElGamal v6 PKESK are not allowed"));
    }
    if !is_v6
        && matches!(
            algorithm,
            PublicKeyAlgorithm::X25519 | PublicKeyAlgorithm::X448
        )
        && !cipher_func.is_aes()
    {
        return Err(Error::invalid_argument(
            "v3 PKESK mandates AES for x25519 and x448",
        ));
    }

    let mut header = Vec::with_capacity(35);
    header.push(version);
    if is_v6 {
        if anonymous {
            header.push(0);
        } else {
            header.push(pub_key.version.version_byte());
            header.extend_from_slice(&pub_key.fingerprint);
        }
    } else {
        header.extend_from_slice(&pub_key.key_id.to_be_bytes());
    }
    header.push(algorithm as u8);

    let key_block = if uses_checksum_payload(algorithm) {
        let mut block = Vec::with_capacity(key.len() + 3);
        if !is_v6 {
            block.push(cipher_func as u8);
        }
        block.extend_from_slice(&encode_checksum_key(key));
        block
    } else {
        key.to_vec()
    };

    debug!(
        algorithm = %algorithm,
        version,
        "serializing encrypted session key packet"
    );

    match &pub_key.params {
        PublicParams::Rsa(k) => {
            let ciphertext = rsa::encrypt_pkcs1v15(rng, k, &key_block)
                .map_err(|e| Error::invalid_argument(format!("RSA encryption failed: {}", e)))?;
            let mpi = Mpi::new(&ciphertext);
            serialize_header(
                w,
                PacketType::PublicKeyEncryptedSessionKey,
                header.len() + mpi.encoded_len(),
            )?;
            w.write_all(&header)?;
            w.write_all(&mpi.encoded_bytes())?;
            Ok(())
        }
        PublicParams::ElGamal(k) => {
            let (c1, c2) = elgamal::encrypt(rng, k, &key_block)
                .map_err(|e| Error::invalid_argument(format!("ElGamal encryption failed: {}", e)))?;
            let c1 = Mpi::new(&c1.to_bytes_be());
            let c2 = Mpi::new(&c2.to_bytes_be());
            serialize_header(
                w,
                PacketType::PublicKeyEncryptedSessionKey,
                header.len() + c1.encoded_len() + c2.encoded_len(),
            )?;
            w.write_all(&header)?;
            w.write_all(&c1.encoded_bytes())?;
            w.write_all(&c2.encoded_bytes())?;
            Ok(())
        }
        PublicParams::Ecdh(k) => {
            let oid = OidSlice::new(k.curve.oid())?.encoded_bytes();
            let (ephemeral, wrapped) =
                ecdh::encrypt(rng, k, &key_block, &oid, &pub_key.fingerprint)
                    .map_err(|e| Error::invalid_argument(format!("ECDH encryption failed: {}", e)))?;
            let g = Mpi::new(&ephemeral);
            let m = OidSlice::new(&wrapped)?;
            serialize_header(
                w,
                PacketType::PublicKeyEncryptedSessionKey,
                header.len() + g.encoded_len() + m.encoded_len(),
            )?;
            w.write_all(&header)?;
            w.write_all(&g.encoded_bytes())?;
            w.write_all(&m.encoded_bytes())?;
            Ok(())
        }
        PublicParams::X25519(k) => {
            let (ephemeral, ciphertext) = x25519::encrypt(rng, k, &key_block)
                .map_err(|e| Error::invalid_argument(format!("X25519 encryption failed: {}", e)))?;
            serialize_header(
                w,
                PacketType::PublicKeyEncryptedSessionKey,
                header.len() + x25519::encoded_fields_length(&ciphertext, is_v6),
            )?;
            w.write_all(&header)?;
            x25519::encode_fields(w, &ephemeral, &ciphertext, cipher_func as u8, is_v6)
        }
        PublicParams::X448(k) => {
            let (ephemeral, ciphertext) = x448::encrypt(rng, k, &key_block)
                .map_err(|e| Error::invalid_argument(format!("X448 encryption failed: {}", e)))?;
            serialize_header(
                w,
                PacketType::PublicKeyEncryptedSessionKey,
                header.len() + x448::encoded_fields_length(&ciphertext, is_v6),
            )?;
            w.write_all(&header)?;
            x448::encode_fields(w, &ephemeral, &ciphertext, cipher_func as u8, is_v6)
        }
        PublicParams::KyberEcdh(k) => {
            let issuer_hash = hash_data(&pub_key.serialize_for_hash());
            let (kyber_ciphertext, ecdh_ephemeral, wrapped) =
                kyber_ecdh::encrypt(rng, k, &key_block, &issuer_hash).map_err(|e| {
                    Error::invalid_argument(format!("kyber_ecdh encryption failed: {}", e))
                })?;
            let ec = OctetArray::new(&ecdh_ephemeral);
            let kc = OctetArray::new(&kyber_ciphertext);
            let m = OidSlice::new(&wrapped)?;
            serialize_header(
                w,
                PacketType::PublicKeyEncryptedSessionKey,
                header.len() + ec.encoded_len() + kc.encoded_len() + m.encoded_len(),
            )?;
            w.write_all(&header)?;
            w.write_all(&ec.encoded_bytes())?;
            w.write_all(&kc.encoded_bytes())?;
            w.write_all(&m.encoded_bytes())?;
            Ok(())
        }
        PublicParams::Ecdsa(_)
        | PublicParams::EdDsa(_)
        | PublicParams::DilithiumEcdsa(_)
        | PublicParams::DilithiumEdDsa(_)
        | PublicParams::SphincsPlus(_) => Err(Error::invalid_argument(format!(
            "cannot encrypt to public key of type {}",
            algorithm
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_wrapping_sum() {
        assert_eq!(checksum_key_material(&[]), 0);
        assert_eq!(checksum_key_material(&[1, 2, 3]), 6);
        assert_eq!(checksum_key_material(&[0xff; 1024]), (1024 * 0xff_u32 % 65536) as u16);
    }

    #[test]
    fn test_checksum_codec_round_trip() {
        for len in [0usize, 1, 16, 24, 32, 64] {
            let key: Vec<u8> = (0..len).map(|i| (i * 37 + 11) as u8).collect();
            let encoded = encode_checksum_key(&key);
            assert_eq!(encoded.len(), key.len() + 2);
            assert_eq!(decode_checksum_key(&encoded).unwrap(), key);
        }
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let key = [7u8; 32];
        let mut encoded = encode_checksum_key(&key);
        encoded[5] ^= 0x01;
        assert!(matches!(
            decode_checksum_key(&encoded),
            Err(Error::Structural(_))
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_version() {
        let body = [5u8, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        assert!(matches!(
            EncryptedKey::parse(&body),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_parse_rejects_trailing_data() {
        // v3, key id, RSA algorithm, a 1-byte MPI, then a stray byte.
        let mut body = vec![3u8];
        body.extend_from_slice(&[0x11; 8]);
        body.push(1);
        body.extend_from_slice(&[0x00, 0x08, 0xab]);
        body.push(0x99);
        assert!(matches!(
            EncryptedKey::parse(&body),
            Err(Error::Structural(_))
        ));
    }

    #[test]
    fn test_parse_anonymous_v6_header() {
        let mut body = vec![6u8, 0, 1];
        body.extend_from_slice(&[0x00, 0x08, 0xab]);
        let parsed = EncryptedKey::parse(&body).unwrap();
        assert_eq!(parsed.version, 6);
        assert_eq!(parsed.key_version, 0);
        assert!(parsed.key_fingerprint.is_empty());
        assert_eq!(parsed.key_id, 0);
    }
}
