//! Input validation and parsing limits for the packet layer.
//!
//! Bounds-checked extraction helpers and size limits used while parsing
//! length-prefixed binary packets, preventing out-of-bounds reads and
//! resource exhaustion on malformed input.

use crate::error::{Error, Result};

/// Maximum allowed packet body size (50MB).
pub const MAX_PACKET_SIZE: usize = 50 * 1024 * 1024;

/// Maximum allowed user-id length (1KB).
pub const MAX_USER_ID_LENGTH: usize = 1024;

/// Maximum allowed MPI length in bytes (generous for multi-prime RSA moduli).
pub const MAX_MPI_LENGTH: usize = 16 * 1024;

/// Validation functions for input data.
pub struct Validator;

impl Validator {
    /// Validate a packet body size.
    pub fn validate_packet_size(size: usize) -> Result<()> {
        if size > MAX_PACKET_SIZE {
            return Err(Error::structural(format!(
                "packet too large: {} bytes exceeds maximum of {} bytes",
                size, MAX_PACKET_SIZE
            )));
        }
        Ok(())
    }

    /// Validate a user-id string length and the absence of control bytes.
    pub fn validate_user_id(user_id: &str) -> Result<()> {
        if user_id.len() > MAX_USER_ID_LENGTH {
            return Err(Error::invalid_argument(format!(
                "user id too long: {} bytes exceeds maximum of {} bytes",
                user_id.len(),
                MAX_USER_ID_LENGTH
            )));
        }
        if user_id.contains('\0') {
            return Err(Error::invalid_argument("user id contains null bytes"));
        }
        Ok(())
    }

    /// Parse a big-endian u16 with bounds checking.
    pub fn validate_u16_from_bytes(data: &[u8], offset: usize) -> Result<u16> {
        if data.len() < offset + 2 {
            return Err(Error::structural(format!(
                "insufficient data for u16: need {} bytes, have {} bytes",
                offset + 2,
                data.len()
            )));
        }
        Ok(u16::from_be_bytes([data[offset], data[offset + 1]]))
    }

    /// Parse a big-endian u32 with bounds checking.
    pub fn validate_u32_from_bytes(data: &[u8], offset: usize) -> Result<u32> {
        if data.len() < offset + 4 {
            return Err(Error::structural(format!(
                "insufficient data for u32: need {} bytes, have {} bytes",
                offset + 4,
                data.len()
            )));
        }
        let bytes = [
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ];
        Ok(u32::from_be_bytes(bytes))
    }

    /// Parse a big-endian u64 with bounds checking.
    pub fn validate_u64_from_bytes(data: &[u8], offset: usize) -> Result<u64> {
        if data.len() < offset + 8 {
            return Err(Error::structural(format!(
                "insufficient data for u64: need {} bytes, have {} bytes",
                offset + 8,
                data.len()
            )));
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&data[offset..offset + 8]);
        Ok(u64::from_be_bytes(bytes))
    }

    /// Extract a sub-slice with bounds checking.
    pub fn validate_slice_extraction(data: &[u8], offset: usize, length: usize) -> Result<&[u8]> {
        if data.len() < offset.saturating_add(length) {
            return Err(Error::structural(format!(
                "slice out of bounds: trying to extract {} bytes at offset {} from {} byte array",
                length,
                offset,
                data.len()
            )));
        }
        Ok(&data[offset..offset + length])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_validation() {
        assert!(Validator::validate_user_id("Alice <alice@example.com>").is_ok());
        assert!(Validator::validate_user_id("Alice\0<alice@example.com>").is_err());

        let long_user_id = "A".repeat(MAX_USER_ID_LENGTH + 1);
        assert!(Validator::validate_user_id(&long_user_id).is_err());
    }

    #[test]
    fn test_bounds_checking() {
        let data = [1, 2, 3, 4, 5, 6, 7, 8];

        assert!(Validator::validate_u16_from_bytes(&data, 0).is_ok());
        assert!(Validator::validate_u32_from_bytes(&data, 0).is_ok());
        assert!(Validator::validate_u64_from_bytes(&data, 0).is_ok());
        assert!(Validator::validate_slice_extraction(&data, 2, 3).is_ok());

        assert!(Validator::validate_u16_from_bytes(&data, 8).is_err());
        assert!(Validator::validate_u32_from_bytes(&data, 6).is_err());
        assert!(Validator::validate_u64_from_bytes(&data, 1).is_err());
        assert!(Validator::validate_slice_extraction(&data, 5, 5).is_err());
    }

    #[test]
    fn test_packet_size_limit() {
        assert!(Validator::validate_packet_size(1024).is_ok());
        assert!(Validator::validate_packet_size(MAX_PACKET_SIZE + 1).is_err());
    }
}
