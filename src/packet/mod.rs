//! OpenPGP packet framing and packet types.
//!
//! New-format packet headers (RFC 4880 §4.2.2) with 1-, 2- and 5-byte
//! length encodings, plus the packet bodies this subsystem produces and
//! parses: keys, signatures, user ids and encrypted session keys.

use crate::error::{Error, Result};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};
use std::io::Write;

pub mod encoding;
pub mod encrypted_key;
pub mod private_key;
pub mod public_key;
pub mod signature;

pub use encrypted_key::{
    serialize_encrypted_key, serialize_encrypted_key_aead, serialize_encrypted_key_anonymous,
    EncryptedKey,
};
pub use private_key::{KeyMaterial, PrivateKey};
pub use public_key::{KeyVersion, PublicKey, PublicParams};
pub use signature::{Signature, SignatureMaterial, SignatureType};

/// Packet types used by this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// Public-Key Encrypted Session Key Packet
    PublicKeyEncryptedSessionKey = 1,
    /// Signature Packet
    Signature = 2,
    /// Secret-Key Packet
    SecretKey = 5,
    /// Public-Key Packet
    PublicKey = 6,
    /// Secret-Subkey Packet
    SecretSubkey = 7,
    /// User ID Packet
    UserId = 13,
    /// Public-Subkey Packet
    PublicSubkey = 14,
}

impl PacketType {
    /// Convert packet type to byte value.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Convert byte value to packet type.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::PublicKeyEncryptedSessionKey),
            2 => Some(Self::Signature),
            5 => Some(Self::SecretKey),
            6 => Some(Self::PublicKey),
            7 => Some(Self::SecretSubkey),
            13 => Some(Self::UserId),
            14 => Some(Self::PublicSubkey),
            _ => None,
        }
    }
}

/// New-format packet header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    /// Packet type
    pub packet_type: PacketType,
    /// Packet body length
    pub length: usize,
}

impl PacketHeader {
    /// Create a new packet header.
    pub fn new(packet_type: PacketType, length: usize) -> Self {
        Self {
            packet_type,
            length,
        }
    }

    /// Serialize the header to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.push(0xC0 | self.packet_type.to_byte());

        if self.length < 192 {
            bytes.push(self.length as u8);
        } else if self.length < 8384 {
            let encoded = self.length - 192;
            bytes.push(192 + (encoded >> 8) as u8);
            bytes.push((encoded & 0xFF) as u8);
        } else {
            bytes.push(0xFF);
            bytes.extend_from_slice(&(self.length as u32).to_be_bytes());
        }

        bytes
    }

    /// Parse a header from bytes, returning it and the bytes consumed.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize)> {
        if data.is_empty() {
            return Err(Error::structural("empty packet header"));
        }

        let first_byte = data[0];
        let mut consumed = 1;

        if (first_byte & 0x80) == 0 {
            return Err(Error::structural("invalid packet header: MSB not set"));
        }
        if (first_byte & 0x40) == 0 {
            return Err(Error::unsupported("old packet format not supported"));
        }

        let packet_type_byte = first_byte & 0x3F;
        let packet_type = PacketType::from_byte(packet_type_byte)
            .ok_or_else(|| Error::unsupported(format!("unknown packet type: {}", packet_type_byte)))?;

        if data.len() < 2 {
            return Err(Error::structural("incomplete packet header"));
        }

        let (length, length_bytes) = if data[1] < 192 {
            (data[1] as usize, 1)
        } else if data[1] < 224 {
            if data.len() < 3 {
                return Err(Error::structural("incomplete two-byte length"));
            }
            let len = ((data[1] as usize - 192) << 8) + data[2] as usize + 192;
            (len, 2)
        } else if data[1] == 255 {
            let len = Validator::validate_u32_from_bytes(data, 2)? as usize;
            Validator::validate_packet_size(len)?;
            (len, 5)
        } else {
            return Err(Error::unsupported("partial body lengths not supported"));
        };

        consumed += length_bytes;
        Ok((
            Self {
                packet_type,
                length,
            },
            consumed,
        ))
    }
}

/// Writes a packet header for a body of `length` bytes.
pub fn serialize_header<W: Write>(
    w: &mut W,
    packet_type: PacketType,
    length: usize,
) -> Result<()> {
    w.write_all(&PacketHeader::new(packet_type, length).to_bytes())?;
    Ok(())
}

/// A complete packet with header and body.
#[derive(Debug, Clone)]
pub struct Packet {
    /// Packet header
    pub header: PacketHeader,
    /// Packet body data
    pub body: Vec<u8>,
}

impl Packet {
    /// Create a new packet.
    pub fn new(packet_type: PacketType, body: Vec<u8>) -> Self {
        let header = PacketHeader::new(packet_type, body.len());
        Self { header, body }
    }

    /// Serialize the packet to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.header.to_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }

    /// Parse a packet from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (header, header_len) = PacketHeader::from_bytes(data)?;
        let body = Validator::validate_slice_extraction(data, header_len, header.length)?.to_vec();
        Ok(Self { header, body })
    }
}

/// Characters forbidden in user-id components.
const FORBIDDEN_USER_ID_CHARS: [char; 5] = ['(', ')', '<', '>', '\0'];

/// A user id: full name, optional comment and optional email, plus the
/// canonical `Name (Comment) <email>` string that identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserId {
    /// Canonical id string
    pub id: String,
    /// Full name
    pub name: String,
    /// Comment
    pub comment: String,
    /// Email address
    pub email: String,
}

impl UserId {
    /// Builds a user id from its components. Any component may be empty but
    /// none may contain `(`, `)`, `<`, `>` or NUL.
    pub fn new(name: &str, comment: &str, email: &str) -> Result<Self> {
        for part in [name, comment, email] {
            if part.chars().any(|c| FORBIDDEN_USER_ID_CHARS.contains(&c)) {
                return Err(Error::invalid_argument(
                    "user id field contained invalid characters",
                ));
            }
        }

        let mut id = String::new();
        id.push_str(name);
        if !comment.is_empty() {
            if !id.is_empty() {
                id.push(' ');
            }
            id.push('(');
            id.push_str(comment);
            id.push(')');
        }
        if !email.is_empty() {
            if !id.is_empty() {
                id.push(' ');
            }
            id.push('<');
            id.push_str(email);
            id.push('>');
        }
        Validator::validate_user_id(&id)?;

        Ok(Self {
            id,
            name: name.to_string(),
            comment: comment.to_string(),
            email: email.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_type_conversion() {
        assert_eq!(PacketType::PublicKeyEncryptedSessionKey.to_byte(), 1);
        assert_eq!(
            PacketType::from_byte(1),
            Some(PacketType::PublicKeyEncryptedSessionKey)
        );
        assert_eq!(PacketType::from_byte(255), None);
    }

    #[test]
    fn test_packet_header_length_encoding() {
        let test_cases = vec![
            (50, vec![0xC0 | 6, 50]),
            (200, vec![0xC0 | 6, 192, 8]),
            (10000, vec![0xC0 | 6, 255, 0, 0, 39, 16]),
        ];

        for (length, expected_bytes) in test_cases {
            let header = PacketHeader::new(PacketType::PublicKey, length);
            let bytes = header.to_bytes();
            assert_eq!(bytes, expected_bytes);

            let (parsed, consumed) = PacketHeader::from_bytes(&bytes).unwrap();
            assert_eq!(parsed.length, length);
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn test_packet_round_trip() {
        let body = vec![1, 2, 3, 4, 5];
        let packet = Packet::new(PacketType::UserId, body.clone());
        let bytes = packet.to_bytes();

        let parsed = Packet::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.header.packet_type, PacketType::UserId);
        assert_eq!(parsed.body, body);
    }

    #[test]
    fn test_user_id_canonical_string() {
        let uid = UserId::new("Alice", "", "alice@example.org").unwrap();
        assert_eq!(uid.id, "Alice <alice@example.org>");

        let uid = UserId::new("Bob", "work", "bob@example.org").unwrap();
        assert_eq!(uid.id, "Bob (work) <bob@example.org>");

        let uid = UserId::new("", "", "carol@example.org").unwrap();
        assert_eq!(uid.id, "<carol@example.org>");
    }

    #[test]
    fn test_user_id_forbidden_characters() {
        for bad in ["Al(ice", "Al)ice", "Al<ice", "Al>ice", "Al\0ice"] {
            assert!(matches!(
                UserId::new(bad, "", ""),
                Err(Error::InvalidArgument(_))
            ));
            assert!(UserId::new("Alice", bad, "").is_err());
            assert!(UserId::new("Alice", "", bad).is_err());
        }
    }
}
