//! Collaborator seams.
//!
//! The engine performs no network access of its own: configuration,
//! UTXO listings, source transactions, cosigning, and broadcasting all
//! arrive through these traits. The HTTP implementations live in
//! `bsv20-client`; tests substitute in-memory fakes.
//!
//! Transport failures are terminal for the call that made them — the
//! engine does not retry, and timeouts/backpressure belong to the
//! implementor.

use std::future::Future;

use bsv20_core::TxId;
use bsv20_transaction::Tx;

use crate::config::ProtocolConfig;
use crate::payload::TokenOp;
use crate::utxo::TokenUtxo;
use crate::EngineError;

/// Fetches the protocol configuration.
pub trait ConfigSource {
    /// Fetch the service-published configuration.
    fn fetch_config(
        &self,
    ) -> impl Future<Output = Result<ProtocolConfig, EngineError>> + Send;
}

/// Lists token UTXOs for a set of addresses.
pub trait UtxoSource {
    /// Fetch UTXOs owned by `addresses`, filtered to the given protocol
    /// operations (an empty filter means all operations).
    fn fetch_utxos(
        &self,
        addresses: &[String],
        ops: &[TokenOp],
    ) -> impl Future<Output = Result<Vec<TokenUtxo>, EngineError>> + Send;
}

/// Fetches full transactions by id.
pub trait TxSource {
    /// Fetch the complete transaction with the given id.
    fn fetch_transaction(
        &self,
        txid: &TxId,
    ) -> impl Future<Output = Result<Tx, EngineError>> + Send;
}

/// Completes a partially signed transaction with the cosigner key.
pub trait CosignService {
    /// Submit a transaction carrying holder signatures and receive it
    /// back fully signed.
    fn cosign(&self, tx: &Tx) -> impl Future<Output = Result<Tx, EngineError>> + Send;
}

/// Outcome of a broadcast attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BroadcastResult {
    /// Id the network knows the transaction by.
    pub txid: String,
    /// Whether the network accepted the transaction.
    pub accepted: bool,
    /// Server-side status or rejection detail, when provided.
    pub message: Option<String>,
}

/// Submits fully signed transactions to the network.
pub trait Broadcaster {
    /// Broadcast a fully signed transaction.
    fn broadcast(
        &self,
        tx: &Tx,
    ) -> impl Future<Output = Result<BroadcastResult, EngineError>> + Send;
}
