//! Field encodings for packet bodies.
//!
//! Three length disciplines appear in the PKESK wire format: MPIs (2-byte
//! bit-length prefix), OID-style slices (1-byte length prefix) and octet
//! arrays (fixed length declared by the algorithm registry). All three
//! implement [`Field`] so codec dispatch stays total.

use crate::error::{Error, Result};
use crate::validation::{Validator, MAX_MPI_LENGTH};

/// Bounds-checked cursor over a packet body.
#[derive(Debug)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    /// Creates a reader over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True when the body is fully consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads a single octet.
    pub fn read_u8(&mut self) -> Result<u8> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or_else(|| Error::structural("unexpected end of packet"))?;
        self.pos += 1;
        Ok(b)
    }

    /// Reads a big-endian u16.
    pub fn read_u16(&mut self) -> Result<u16> {
        let v = Validator::validate_u16_from_bytes(self.data, self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    /// Reads a big-endian u64.
    pub fn read_u64(&mut self) -> Result<u64> {
        let v = Validator::validate_u64_from_bytes(self.data, self.pos)?;
        self.pos += 8;
        Ok(v)
    }

    /// Reads exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let s = Validator::validate_slice_extraction(self.data, self.pos, n)?;
        self.pos += n;
        Ok(s)
    }
}

/// A length-disciplined packet field.
pub trait Field {
    /// Total encoded length, prefix included.
    fn encoded_len(&self) -> usize;

    /// The encoded bytes, prefix included.
    fn encoded_bytes(&self) -> Vec<u8>;

    /// The payload without its length prefix.
    fn bytes(&self) -> &[u8];
}

/// A multi-precision integer: 2-byte big-endian bit count, then the
/// magnitude with no leading zero octets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mpi {
    bytes: Vec<u8>,
}

impl Mpi {
    /// Creates an MPI from magnitude bytes, stripping leading zeros.
    pub fn new(bytes: &[u8]) -> Self {
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        Self {
            bytes: bytes[start..].to_vec(),
        }
    }

    /// Exact bit length of the magnitude.
    pub fn bit_len(&self) -> usize {
        match self.bytes.first() {
            None => 0,
            Some(&first) => (self.bytes.len() - 1) * 8 + (8 - first.leading_zeros() as usize),
        }
    }

    /// Reads an MPI from the packet body.
    pub fn read_from(r: &mut PacketReader<'_>) -> Result<Self> {
        let bits = r.read_u16()? as usize;
        let n = bits.div_ceil(8);
        if n > MAX_MPI_LENGTH {
            return Err(Error::structural(format!("MPI too large: {} bits", bits)));
        }
        Ok(Self {
            bytes: r.read_bytes(n)?.to_vec(),
        })
    }
}

impl Field for Mpi {
    fn encoded_len(&self) -> usize {
        2 + self.bytes.len()
    }

    fn encoded_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&(self.bit_len() as u16).to_be_bytes());
        out.extend_from_slice(&self.bytes);
        out
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// An opaque slice with a 1-byte length prefix, as used for curve OIDs and
/// wrapped session keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidSlice {
    bytes: Vec<u8>,
}

impl OidSlice {
    /// Creates an OID-style slice. Fails for payloads over 255 bytes.
    pub fn new(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > 255 {
            return Err(Error::invalid_argument(
                "length-prefixed field exceeds 255 bytes",
            ));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Reads an OID-style slice from the packet body.
    pub fn read_from(r: &mut PacketReader<'_>) -> Result<Self> {
        let len = r.read_u8()? as usize;
        Ok(Self {
            bytes: r.read_bytes(len)?.to_vec(),
        })
    }
}

impl Field for OidSlice {
    fn encoded_len(&self) -> usize {
        1 + self.bytes.len()
    }

    fn encoded_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.push(self.bytes.len() as u8);
        out.extend_from_slice(&self.bytes);
        out
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A fixed-length octet array; the length comes from the algorithm
/// registry, not the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetArray {
    bytes: Vec<u8>,
}

impl OctetArray {
    /// Wraps already-sized payload bytes.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Reads exactly `len` bytes from the packet body.
    pub fn read_from(r: &mut PacketReader<'_>, len: usize) -> Result<Self> {
        Ok(Self {
            bytes: r.read_bytes(len)?.to_vec(),
        })
    }
}

impl Field for OctetArray {
    fn encoded_len(&self) -> usize {
        self.bytes.len()
    }

    fn encoded_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpi_round_trip() {
        let mpi = Mpi::new(&[0x01, 0xff]);
        assert_eq!(mpi.bit_len(), 9);
        let encoded = mpi.encoded_bytes();
        assert_eq!(encoded, vec![0x00, 0x09, 0x01, 0xff]);

        let mut r = PacketReader::new(&encoded);
        let parsed = Mpi::read_from(&mut r).unwrap();
        assert_eq!(parsed, mpi);
        assert!(r.is_empty());
    }

    #[test]
    fn test_mpi_strips_leading_zeros() {
        let mpi = Mpi::new(&[0x00, 0x00, 0x80]);
        assert_eq!(mpi.bit_len(), 8);
        assert_eq!(mpi.encoded_bytes(), vec![0x00, 0x08, 0x80]);
    }

    #[test]
    fn test_mpi_truncated() {
        let mut r = PacketReader::new(&[0x00, 0x10, 0xaa]);
        assert!(Mpi::read_from(&mut r).is_err());
    }

    #[test]
    fn test_oid_slice_round_trip() {
        let oid = OidSlice::new(&[1, 2, 3]).unwrap();
        let encoded = oid.encoded_bytes();
        assert_eq!(encoded, vec![3, 1, 2, 3]);

        let mut r = PacketReader::new(&encoded);
        let parsed = OidSlice::read_from(&mut r).unwrap();
        assert_eq!(parsed.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_oid_slice_rejects_oversized() {
        assert!(OidSlice::new(&[0u8; 256]).is_err());
    }

    #[test]
    fn test_octet_array_fixed_length() {
        let data = [7u8; 32];
        let mut r = PacketReader::new(&data);
        let arr = OctetArray::read_from(&mut r, 32).unwrap();
        assert_eq!(arr.encoded_len(), 32);
        assert!(r.is_empty());

        let mut short = PacketReader::new(&data[..16]);
        assert!(OctetArray::read_from(&mut short, 32).is_err());
    }

    #[test]
    fn test_reader_primitives() {
        let data = [0x01, 0x02, 0x03, 0, 0, 0, 0, 0, 0, 0, 0x42];
        let mut r = PacketReader::new(&data);
        assert_eq!(r.read_u8().unwrap(), 0x01);
        assert_eq!(r.read_u16().unwrap(), 0x0203);
        assert_eq!(r.read_u64().unwrap(), 0x42);
        assert!(r.is_empty());
        assert!(r.read_u8().is_err());
    }
}
