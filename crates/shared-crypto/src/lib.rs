//! # Shared Crypto - Signing and Hashing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Event ids, payload hashes, tx hashes |
//! | `ecdsa` | secp256k1 | Event signatures, tx sender recovery |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **Keccak-256**: Ethereum-compatible digests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{
    recover_address, Address, RecoverableSignature, Secp256k1KeyPair, Secp256k1PublicKey,
    Secp256k1Signature,
};
pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_many, Hash, Keccak256Hasher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
