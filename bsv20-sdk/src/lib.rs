#![deny(missing_docs)]

//! BSV-20 cosign token SDK - complete SDK.
//!
//! Re-exports all SDK components for convenient single-crate usage.

pub use bsv20_client as client;
pub use bsv20_core as primitives;
pub use bsv20_engine as engine;
pub use bsv20_script as script;
pub use bsv20_transaction as transaction;
