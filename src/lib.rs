//! # hybridpgp — OpenPGP key material and session keys
//!
//! An OpenPGP key-material and session-key subsystem covering classical
//! (RSA, ECDSA, EdDSA, ECDH), modern CFRG (X25519/X448) and post-quantum
//! hybrid (Dilithium+ECDSA, Dilithium+EdDSA, SPHINCS+, Kyber+ECDH)
//! public-key algorithms.
//!
//! ## Features
//!
//! - **Key generation**: primary/subkey pairs for every supported family,
//!   including multi-prime RSA with deterministic prime feeds
//! - **Entity assembly**: identities with positive-certification
//!   self-signatures and subkeys with binding signatures; signing subkeys
//!   embed a primary-key-binding cross-signature
//! - **PKESK codec**: the Public-Key Encrypted Session Key packet in both
//!   its v3 and v6 shapes, with algorithm-dependent field layouts
//! - **Hybrid KEMs**: Kyber+ECDH combiners that bind the ciphertext to a
//!   hash of the recipient's public key
//!
//! ## Example
//!
//! ```rust,no_run
//! use hybridpgp::config::Config;
//! use hybridpgp::crypto::PublicKeyAlgorithm;
//! use hybridpgp::entity::Entity;
//! use rand::rngs::OsRng;
//! # fn main() -> hybridpgp::Result<()> {
//! let mut rng = OsRng;
//! let config = Config {
//!     public_key_algorithm: PublicKeyAlgorithm::Ecdsa,
//!     curve_name: "nistp256".to_string(),
//!     ..Config::default()
//! };
//! let entity = Entity::new("Alice", "", "alice@example.org", &mut rng, &config)?;
//! println!("primary key id {:016x}", entity.primary_key().key_id);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod entity;
pub mod error;
pub mod packet;
pub mod validation;

pub use config::{AeadConfig, Config};
pub use entity::Entity;
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
