#![deny(missing_docs)]

//! The BSV-20 cosign token engine.
//!
//! Builds, signs, parses, validates, and reconstructs history for
//! transfers of a fungible token inscribed on BSV outputs, where every
//! transfer output is jointly controlled by the holder's key and a
//! service cosigner key.
//!
//! The outbound path is [`builder::build_transfer`] →
//! [`signer::sign_inputs`] → the external cosign and broadcast
//! collaborators. The inbound path runs raw transactions through
//! [`parser`], [`validator`], and [`history`]. Both share the script
//! codecs from `bsv20-script`.
//!
//! The engine holds no state of its own: every operation takes the
//! [`ProtocolConfig`] explicitly, and all network access goes through
//! the traits in [`traits`].

pub mod builder;
pub mod config;
pub mod history;
pub mod parser;
pub mod payload;
pub mod signer;
pub mod traits;
pub mod utxo;
pub mod validator;

mod error;
pub use builder::{build_transfer, BuiltTransfer};
pub use config::{FeeTier, ProtocolConfig};
pub use error::EngineError;
pub use history::{reconstruct_entry, SyncRecord, TxHistoryEntry};
pub use parser::{parse_transaction, parse_with_provenance, ParsedTransaction, TxKind};
pub use payload::{Bsv20Payload, TokenOp, PROTOCOL_ID, TOKEN_CONTENT_TYPE};
pub use signer::{apply_signatures, sign_inputs, SigRequest, SigResponse};
pub use utxo::{Outpoint, TokenUtxo, TransferRequest};
pub use validator::{require_transfers, validate};
