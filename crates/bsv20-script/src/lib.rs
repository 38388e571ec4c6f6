//! Script handling for the BSV-20 cosign SDK.
//!
//! Provides the `Script` type with chunk-level decoding, Base58Check
//! addresses, the ord inscription envelope codec, and the two locking
//! templates the cosign protocol recognizes.

pub mod address;
pub mod chunk;
pub mod envelope;
pub mod opcodes;
pub mod ownership;
pub mod script;

mod error;
pub use address::{Address, Network};
pub use chunk::Chunk;
pub use envelope::Inscription;
pub use error::ScriptError;
pub use ownership::ScriptOwner;
pub use script::Script;
