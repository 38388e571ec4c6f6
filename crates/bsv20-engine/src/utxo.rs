//! Token-bearing UTXOs and transfer requests.

use bsv20_core::TxId;
use bsv20_script::Script;
use bsv20_transaction::Tx;

use crate::payload::TokenOp;

/// A reference to one transaction output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Outpoint {
    /// Id of the transaction that created the output.
    pub txid: TxId,
    /// Index of the output within that transaction.
    pub vout: u32,
}

impl std::fmt::Display for Outpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.txid, self.vout)
    }
}

/// An unspent token-bearing output.
///
/// Consumed exactly once by the transaction builder; the builder never
/// mutates a candidate it does not consume.
#[derive(Clone, Debug)]
pub struct TokenUtxo {
    /// The outpoint this UTXO lives at.
    pub outpoint: Outpoint,
    /// The holder address the locking script pays to.
    pub address: String,
    /// Token amount in atomic units.
    pub amount: u64,
    /// The protocol operation that created this UTXO.
    pub op: TokenOp,
    /// Satoshi value of the output.
    pub satoshis: u64,
    /// The raw locking script.
    pub script: Script,
    /// The full source transaction, once fetched for signing.
    pub source_tx: Option<Tx>,
}

/// One requested transfer leg: a destination and a human-decimal amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    /// Destination address.
    pub address: String,
    /// Amount in the token's human-readable decimal unit.
    pub amount: String,
}

impl TransferRequest {
    /// Convenience constructor.
    pub fn new(address: impl Into<String>, amount: impl Into<String>) -> Self {
        TransferRequest {
            address: address.into(),
            amount: amount.into(),
        }
    }
}
