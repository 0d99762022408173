//! Elliptic-curve registry.
//!
//! Maps generator names and algorithm identifiers to curve backends, split
//! per capability: a curve may be usable for EdDSA, ECDSA, ECDH, or some
//! combination. Curves without an arithmetic backend in this build
//! (Brainpool families, Ed448 signing) are still identified here so the
//! packet layer can reason about their wire shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies an elliptic curve in the OpenPGP registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveId {
    /// Ed25519 (EdDSA)
    Ed25519,
    /// Ed448 (EdDSA)
    Ed448,
    /// Curve25519 (ECDH / X25519)
    Curve25519,
    /// Curve448 (ECDH / X448)
    Curve448,
    /// NIST P-256
    NistP256,
    /// NIST P-384
    NistP384,
    /// Brainpool P-256r1
    BrainpoolP256,
    /// Brainpool P-384r1
    BrainpoolP384,
}

impl CurveId {
    /// The generator name used by configuration, as in "nistp256".
    pub fn gen_name(self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
            Self::Ed448 => "ed448",
            Self::Curve25519 => "curve25519",
            Self::Curve448 => "curve448",
            Self::NistP256 => "nistp256",
            Self::NistP384 => "nistp384",
            Self::BrainpoolP256 => "brainpoolP256r1",
            Self::BrainpoolP384 => "brainpoolP384r1",
        }
    }

    /// The curve OID payload as serialized into OpenPGP key material.
    pub fn oid(self) -> &'static [u8] {
        match self {
            Self::Ed25519 => &[0x2b, 0x06, 0x01, 0x04, 0x01, 0xda, 0x47, 0x0f, 0x01],
            Self::Ed448 => &[0x2b, 0x65, 0x71],
            Self::Curve25519 => &[0x2b, 0x06, 0x01, 0x04, 0x01, 0x97, 0x55, 0x01, 0x05, 0x01],
            Self::Curve448 => &[0x2b, 0x65, 0x6f],
            Self::NistP256 => &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07],
            Self::NistP384 => &[0x2b, 0x81, 0x04, 0x00, 0x22],
            Self::BrainpoolP256 => &[0x2b, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x07],
            Self::BrainpoolP384 => &[0x2b, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x0b],
        }
    }

    /// Length in bytes of an uncompressed point (or CFRG u-coordinate) on
    /// this curve, as carried in hybrid PKESK fields.
    pub fn point_len(self) -> usize {
        match self {
            Self::Ed25519 | Self::Curve25519 => 32,
            Self::Ed448 => 57,
            Self::Curve448 => 56,
            Self::NistP256 | Self::BrainpoolP256 => 65,
            Self::NistP384 | Self::BrainpoolP384 => 97,
        }
    }

    /// Whether this build carries an EdDSA signing backend for the curve.
    pub fn supports_eddsa(self) -> bool {
        matches!(self, Self::Ed25519)
    }

    /// Whether this build carries an ECDSA signing backend for the curve.
    pub fn supports_ecdsa(self) -> bool {
        matches!(self, Self::NistP256 | Self::NistP384)
    }

    /// Whether this build carries an ECDH backend for the curve.
    pub fn supports_ecdh(self) -> bool {
        matches!(
            self,
            Self::Curve25519 | Self::Curve448 | Self::NistP256 | Self::NistP384
        )
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gen_name())
    }
}

/// Finds a curve usable for EdDSA by its generator name.
pub fn find_eddsa_by_gen_name(name: &str) -> Option<CurveId> {
    match name {
        "ed25519" => Some(CurveId::Ed25519),
        _ => None,
    }
}

/// Finds a curve usable for ECDSA by its generator name.
pub fn find_ecdsa_by_gen_name(name: &str) -> Option<CurveId> {
    match name {
        "nistp256" => Some(CurveId::NistP256),
        "nistp384" => Some(CurveId::NistP384),
        _ => None,
    }
}

/// Finds a curve usable for ECDH by its generator name. EdDSA generator
/// names resolve to their Montgomery counterparts, so a configuration that
/// signs with ed25519 encrypts with curve25519.
pub fn find_ecdh_by_gen_name(name: &str) -> Option<CurveId> {
    match name {
        "curve25519" | "ed25519" => Some(CurveId::Curve25519),
        "curve448" | "ed448" => Some(CurveId::Curve448),
        "nistp256" => Some(CurveId::NistP256),
        "nistp384" => Some(CurveId::NistP384),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_name_lookup() {
        assert_eq!(find_ecdsa_by_gen_name("nistp256"), Some(CurveId::NistP256));
        assert_eq!(find_ecdsa_by_gen_name("nistp521"), None);
        assert_eq!(find_eddsa_by_gen_name("ed25519"), Some(CurveId::Ed25519));
        assert_eq!(find_eddsa_by_gen_name("ed448"), None);
        assert_eq!(
            find_ecdh_by_gen_name("ed25519"),
            Some(CurveId::Curve25519)
        );
        assert_eq!(find_ecdh_by_gen_name("curve448"), Some(CurveId::Curve448));
    }

    #[test]
    fn test_point_lengths_match_pkesk_tables() {
        assert_eq!(CurveId::Curve25519.point_len(), 32);
        assert_eq!(CurveId::Curve448.point_len(), 56);
        assert_eq!(CurveId::NistP256.point_len(), 65);
        assert_eq!(CurveId::NistP384.point_len(), 97);
        assert_eq!(CurveId::BrainpoolP256.point_len(), 65);
        assert_eq!(CurveId::BrainpoolP384.point_len(), 97);
    }

    #[test]
    fn test_backend_capabilities() {
        assert!(CurveId::Ed25519.supports_eddsa());
        assert!(!CurveId::Ed448.supports_eddsa());
        assert!(CurveId::NistP384.supports_ecdsa());
        assert!(!CurveId::BrainpoolP256.supports_ecdsa());
        assert!(CurveId::Curve448.supports_ecdh());
        assert!(!CurveId::BrainpoolP384.supports_ecdh());
    }
}
