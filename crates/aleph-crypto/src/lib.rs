//! Cryptographic primitives used by a committee process:
//!
//! | Module | Algorithm | Use case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Unit content-addressing (wire form hash) |
//! | `signatures` | Ed25519 | Unit signing/verification |
//! | `bls` | BLS12-381 | Threshold coin shares |
//! | `threshold_coin` | BLS, dealer-gated | The common coin contract |

#![warn(missing_docs)]

pub mod bls;
pub mod errors;
pub mod hashing;
pub mod signatures;
pub mod threshold_coin;

pub use bls::{BlsKeyPair, BlsPublicKey, BlsSignature};
pub use errors::CryptoError;
pub use hashing::{sha256_hash, sha256_hash_many, UnitHasher};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use threshold_coin::{CoinShare, ThresholdCoin};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
