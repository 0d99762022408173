//! Error types for hybridpgp operations.

use thiserror::Error;

/// Result type alias for hybridpgp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hybridpgp operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed caller input: invalid user ids, unsupported algorithms or
    /// curves, version gating violations, recipient mismatches.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Well-formed but unrecognized data: unknown packet or key versions,
    /// cipher functions this build cannot handle.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Structurally invalid wire data: checksum mismatches, truncated
    /// fields, trailing bytes.
    #[error("structural error: {0}")]
    Structural(String),

    /// Decryption attempted against a marker-only private key.
    #[error("dummy key: {0}")]
    DummyKey(String),

    /// Failure raised by an underlying cryptographic primitive.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// I/O errors from packet writers.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new invalid-argument error.
    pub fn invalid_argument<T: ToString>(msg: T) -> Self {
        Self::InvalidArgument(msg.to_string())
    }

    /// Creates a new unsupported error.
    pub fn unsupported<T: ToString>(msg: T) -> Self {
        Self::Unsupported(msg.to_string())
    }

    /// Creates a new structural error.
    pub fn structural<T: ToString>(msg: T) -> Self {
        Self::Structural(msg.to_string())
    }

    /// Creates a new dummy-key error.
    pub fn dummy_key<T: ToString>(msg: T) -> Self {
        Self::DummyKey(msg.to_string())
    }

    /// Creates a new crypto error.
    pub fn crypto<T: ToString>(msg: T) -> Self {
        Self::Crypto(msg.to_string())
    }
}
