//! Signature packets.
//!
//! Covers the three signature shapes this subsystem emits: positive
//! certifications over user ids (0x13), subkey bindings issued by the
//! primary key (0x18) and the primary-key binding a signing subkey embeds
//! to consent to the binding (0x19). The signed payload always covers the
//! canonical hash input of the keys involved plus the signature's own
//! hashed attributes, so flags and preference lists cannot be stripped.

use crate::crypto::{HashAlgorithm, PublicKeyAlgorithm};
use crate::error::{Error, Result};
use crate::packet::private_key::PrivateKey;
use crate::packet::public_key::PublicKey;

/// Signature type octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SignatureType {
    /// Positive certification of a user id
    PositiveCert = 0x13,
    /// Subkey binding, issued by the primary key
    SubkeyBinding = 0x18,
    /// Primary-key binding, issued by a signing subkey
    PrimaryKeyBinding = 0x19,
}

/// Algorithm-tagged signature material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureMaterial {
    /// RSA PKCS#1 v1.5 signature
    Rsa {
        /// Signature value, modulus-sized
        s: Vec<u8>,
    },
    /// ECDSA signature, fixed-size `r || s`
    Ecdsa {
        /// Signature bytes
        sig: Vec<u8>,
    },
    /// EdDSA signature, `R || S`
    EdDsa {
        /// Signature bytes
        sig: Vec<u8>,
    },
    /// Dilithium+ECDSA hybrid signature
    DilithiumEcdsa {
        /// Dilithium component
        dilithium: Vec<u8>,
        /// ECDSA component
        ecdsa: Vec<u8>,
    },
    /// Dilithium+EdDSA hybrid signature
    DilithiumEdDsa {
        /// Dilithium component
        dilithium: Vec<u8>,
        /// EdDSA component
        eddsa: Vec<u8>,
    },
    /// SPHINCS+ signature
    SphincsPlus {
        /// Signature bytes
        sig: Vec<u8>,
    },
}

/// A signature packet.
#[derive(Debug, Clone)]
pub struct Signature {
    /// Signature packet version (matches the issuing key's version octet)
    pub version: u8,
    /// Signature type
    pub sig_type: SignatureType,
    /// Algorithm of the issuing key
    pub public_key_algorithm: PublicKeyAlgorithm,
    /// Hash algorithm
    pub hash: HashAlgorithm,
    /// Creation time, seconds since the epoch
    pub creation_time: u32,
    /// Key lifetime in seconds; `None` or 0 means no expiry
    pub key_lifetime_secs: Option<u32>,
    /// Issuer key id
    pub issuer_key_id: Option<u64>,
    /// Issuer fingerprint
    pub issuer_fingerprint: Vec<u8>,
    /// Marks the primary user id
    pub is_primary_id: Option<bool>,
    /// Whether the flag octet is meaningful
    pub flags_valid: bool,
    /// Certification capability flag
    pub flag_certify: bool,
    /// Signing capability flag
    pub flag_sign: bool,
    /// Communications-encryption capability flag
    pub flag_encrypt_communications: bool,
    /// Storage-encryption capability flag
    pub flag_encrypt_storage: bool,
    /// Modification-detection-code support
    pub mdc: bool,
    /// AEAD support
    pub aead: bool,
    /// Preferred symmetric algorithms, most preferred first
    pub preferred_symmetric: Vec<u8>,
    /// Preferred hash algorithms
    pub preferred_hash: Vec<u8>,
    /// Preferred compression algorithms
    pub preferred_compression: Vec<u8>,
    /// Preferred AEAD modes
    pub preferred_aead: Vec<u8>,
    /// Cross-signature carried by signing-subkey bindings
    pub embedded_signature: Option<Box<Signature>>,
    /// Leading two bytes of the signed digest
    pub hash_prefix: [u8; 2],
    /// The signature itself, present after signing
    pub material: Option<SignatureMaterial>,
}

impl Signature {
    /// Creates an unsigned signature skeleton; the caller fills in flags
    /// and preferences before signing.
    pub fn new(
        version: u8,
        sig_type: SignatureType,
        public_key_algorithm: PublicKeyAlgorithm,
        hash: HashAlgorithm,
        creation_time: u32,
    ) -> Self {
        Self {
            version,
            sig_type,
            public_key_algorithm,
            hash,
            creation_time,
            key_lifetime_secs: None,
            issuer_key_id: None,
            issuer_fingerprint: Vec::new(),
            is_primary_id: None,
            flags_valid: false,
            flag_certify: false,
            flag_sign: false,
            flag_encrypt_communications: false,
            flag_encrypt_storage: false,
            mdc: false,
            aead: false,
            preferred_symmetric: Vec::new(),
            preferred_hash: Vec::new(),
            preferred_compression: Vec::new(),
            preferred_aead: Vec::new(),
            embedded_signature: None,
            hash_prefix: [0; 2],
            material: None,
        }
    }

    /// Capability flag octet using the RFC 4880 bit assignments.
    fn flag_octet(&self) -> u8 {
        let mut flags = 0u8;
        if self.flag_certify {
            flags |= 0x01;
        }
        if self.flag_sign {
            flags |= 0x02;
        }
        if self.flag_encrypt_communications {
            flags |= 0x04;
        }
        if self.flag_encrypt_storage {
            flags |= 0x08;
        }
        flags
    }

    /// The signature's own hashed attributes, bound into every payload.
    fn hashed_attributes(&self) -> Vec<u8> {
        fn push_list(out: &mut Vec<u8>, list: &[u8]) {
            out.push(list.len() as u8);
            out.extend_from_slice(list);
        }

        let mut out = Vec::new();
        out.push(self.version);
        out.push(self.sig_type as u8);
        out.push(self.public_key_algorithm as u8);
        out.push(self.hash as u8);
        out.extend_from_slice(&self.creation_time.to_be_bytes());
        out.extend_from_slice(&self.key_lifetime_secs.unwrap_or(0).to_be_bytes());
        out.push(if self.flags_valid { self.flag_octet() | 0x80 } else { 0 });
        out.push(u8::from(self.mdc) | (u8::from(self.aead) << 1));
        out.push(match self.is_primary_id {
            None => 0,
            Some(false) => 1,
            Some(true) => 2,
        });
        push_list(&mut out, &self.preferred_symmetric);
        push_list(&mut out, &self.preferred_hash);
        push_list(&mut out, &self.preferred_compression);
        push_list(&mut out, &self.preferred_aead);
        out.extend_from_slice(&self.issuer_key_id.unwrap_or(0).to_be_bytes());
        push_list(&mut out, &self.issuer_fingerprint);
        out
    }

    /// Payload for a user-id certification: the key's hash input, the
    /// length-framed user id, then the hashed attributes.
    fn user_id_payload(&self, user_id: &str, key: &PublicKey) -> Vec<u8> {
        let mut data = key.serialize_for_hash();
        data.push(0xb4);
        data.extend_from_slice(&(user_id.len() as u32).to_be_bytes());
        data.extend_from_slice(user_id.as_bytes());
        data.extend_from_slice(&self.hashed_attributes());
        data
    }

    /// Payload for the key-binding shapes: both keys' hash inputs, then the
    /// hashed attributes.
    fn key_binding_payload(&self, primary: &PublicKey, subkey: &PublicKey) -> Vec<u8> {
        let mut data = primary.serialize_for_hash();
        data.extend_from_slice(&subkey.serialize_for_hash());
        data.extend_from_slice(&self.hashed_attributes());
        data
    }

    /// Hashes `data`, records the digest prefix, and signs with `signer`.
    fn finalize(&mut self, signer: &PrivateKey, data: &[u8]) -> Result<()> {
        let digest = self.hash.digest(data)?;
        self.hash_prefix.copy_from_slice(&digest[..2]);
        self.material = Some(signer.sign_material(self.hash, data)?);
        Ok(())
    }

    fn verify_payload(&self, key: &PublicKey, data: &[u8]) -> Result<()> {
        let material = self
            .material
            .as_ref()
            .ok_or_else(|| Error::invalid_argument("signature carries no material"))?;
        let digest = self.hash.digest(data)?;
        if digest[..2] != self.hash_prefix {
            return Err(Error::crypto("signature digest prefix mismatch"));
        }
        key.verify_material(self.hash, data, material)
    }

    /// Signs a user-id certification with the key owning the id.
    pub fn sign_user_id(&mut self, user_id: &str, signer: &PrivateKey) -> Result<()> {
        let data = self.user_id_payload(user_id, &signer.public);
        self.finalize(signer, &data)
    }

    /// Verifies a user-id certification.
    pub fn verify_user_id(&self, user_id: &str, key: &PublicKey) -> Result<()> {
        let data = self.user_id_payload(user_id, key);
        self.verify_payload(key, &data)
    }

    /// Signs a subkey binding with the primary key.
    pub fn sign_subkey_binding(
        &mut self,
        primary: &PrivateKey,
        subkey: &PublicKey,
    ) -> Result<()> {
        let data = self.key_binding_payload(&primary.public, subkey);
        self.finalize(primary, &data)
    }

    /// Signs a primary-key binding with the subkey itself, producing the
    /// cross-signature embedded into signing-subkey bindings.
    pub fn cross_sign_key(
        &mut self,
        primary: &PublicKey,
        subkey_priv: &PrivateKey,
    ) -> Result<()> {
        let data = self.key_binding_payload(primary, &subkey_priv.public);
        self.finalize(subkey_priv, &data)
    }

    /// Verifies a subkey binding under the primary key. Sign-capable
    /// subkeys must carry a verifying embedded cross-signature.
    pub fn verify_subkey_binding(&self, primary: &PublicKey, subkey: &PublicKey) -> Result<()> {
        if self.sig_type != SignatureType::SubkeyBinding {
            return Err(Error::invalid_argument("not a subkey binding signature"));
        }
        let data = self.key_binding_payload(primary, subkey);
        self.verify_payload(primary, &data)?;

        if subkey.algorithm.can_sign() && self.flag_sign {
            let embedded = self.embedded_signature.as_deref().ok_or_else(|| {
                Error::invalid_argument("signing subkey is missing a cross-signature")
            })?;
            if embedded.sig_type != SignatureType::PrimaryKeyBinding {
                return Err(Error::invalid_argument(
                    "embedded signature has the wrong type",
                ));
            }
            let data = embedded.key_binding_payload(primary, subkey);
            embedded.verify_payload(subkey, &data)?;
        }
        Ok(())
    }
}
