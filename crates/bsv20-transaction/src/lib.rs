//! Transaction wire codec and signature hashing for the BSV-20 cosign SDK.
//!
//! Provides the `Tx`/`TxInput`/`TxOutput` types with binary and hex
//! serialization, txid computation, and the BIP-143 FORKID signature
//! digest used by the cosign protocol.

pub mod input;
pub mod output;
pub mod sighash;
pub mod transaction;

mod error;
pub use error::TransactionError;
pub use input::TxInput;
pub use output::TxOutput;
pub use transaction::Tx;
