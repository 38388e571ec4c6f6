#![deny(missing_docs)]

//! Core primitives for the BSV-20 cosign SDK.
//!
//! Provides the hash functions, secp256k1 key and signature types, the
//! transaction id newtype, and the little-endian wire reader/writer used
//! by the script and transaction crates.

pub mod hash;
pub mod keys;
pub mod txid;
pub mod wire;

mod error;
pub use error::CoreError;
pub use keys::{EcdsaSignature, PrivateKey, PublicKey};
pub use txid::TxId;
pub use wire::{ByteReader, ByteWriter};
