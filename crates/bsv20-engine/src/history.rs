//! History reconstruction from ledger-sync records.
//!
//! A sync record names one transaction, its senders, and the address
//! under inspection. Reconstruction nets the transaction's token legs
//! into a single human-meaningful entry: direction, counterparties, fee,
//! and confirmation state. The delicate part is the netting — change
//! returning to the sender must not appear as a payment to oneself, and
//! the fee leg must not be misattributed as a counterparty payment.

use std::collections::BTreeMap;

use bsv20_transaction::Tx;
use serde::{Deserialize, Serialize};

use crate::config::ProtocolConfig;
use crate::parser::decode_leg;
use crate::payload::TokenOp;
use crate::EngineError;

/// Whether the inspected address sent or received in a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The inspected address is among the record's senders.
    Send,
    /// The inspected address only receives.
    Receive,
}

/// Confirmation state of a history entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Included in a block.
    Confirmed,
    /// Seen but not yet mined.
    Unconfirmed,
}

/// One netted counterparty leg.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    /// The counterparty address.
    pub address: String,
    /// Netted atomic amount exchanged with it.
    pub amount: u64,
}

/// A ledger-change notification for one address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Display-order id of the transaction.
    pub txid: String,
    /// Block height; 0 while unconfirmed.
    pub height: u64,
    /// Addresses that funded the transaction, first-listed first.
    pub senders: Vec<String>,
    /// The address this record was delivered for.
    pub address: String,
    /// The raw transaction, hex encoded.
    pub rawtx: String,
}

/// A reconstructed history entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHistoryEntry {
    /// Display-order transaction id.
    pub txid: String,
    /// Block height; 0 while unconfirmed.
    pub height: u64,
    /// Direction relative to the inspected address.
    pub direction: Direction,
    /// Confirmation state.
    pub status: TxStatus,
    /// Net atomic amount exchanged with all counterparties.
    pub amount: u64,
    /// Protocol fee paid, attributed only on the send side.
    pub fee: u64,
    /// Monotonic ordering score: the height when confirmed, `u64::MAX`
    /// while pending so unconfirmed entries sort last.
    pub score: u64,
    /// Netted counterparty legs, ordered by address.
    pub counterparties: Vec<Counterparty>,
}

/// Reconstruct a history entry from one sync record.
///
/// A record whose raw transaction does not decode is a hard failure;
/// outputs inside a decodable transaction that are not token legs for
/// the configured token are simply not part of the entry.
pub fn reconstruct_entry(
    config: &ProtocolConfig,
    record: &SyncRecord,
) -> Result<TxHistoryEntry, EngineError> {
    let tx = Tx::from_hex(&record.rawtx)?;

    let direction = if record.senders.iter().any(|s| *s == record.address) {
        Direction::Send
    } else {
        Direction::Receive
    };
    let status = if record.height > 0 {
        TxStatus::Confirmed
    } else {
        TxStatus::Unconfirmed
    };

    // Accumulate per-destination totals; the fee leg is split out when
    // the inspected address is the first-listed sender.
    let first_sender_is_self = record.senders.first() == Some(&record.address);
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    let mut fee: u64 = 0;

    for output in &tx.outputs {
        let Some(leg) = decode_leg(config, &output.script) else {
            continue;
        };
        if leg.op != TokenOp::Transfer || leg.cosigner.is_none() {
            continue;
        }
        if leg.address == config.fee_address && first_sender_is_self {
            fee += leg.amount;
        } else {
            *buckets.entry(leg.address).or_insert(0) += leg.amount;
        }
    }

    let self_received = buckets.get(&record.address).copied().unwrap_or(0);

    // Self-change on the send side is not an outgoing payment.
    if direction == Direction::Send {
        if let Some(own) = buckets.get_mut(&record.address) {
            *own -= self_received;
        }
    }

    let counterparties: Vec<Counterparty> = match direction {
        Direction::Receive => {
            let sender = record.senders.first().cloned().unwrap_or_default();
            vec![Counterparty {
                address: sender,
                amount: self_received,
            }]
        }
        Direction::Send => buckets
            .into_iter()
            .filter(|(address, amount)| {
                *amount > 0 && *address != record.address && *address != config.fee_address
            })
            .map(|(address, amount)| Counterparty { address, amount })
            .collect(),
    };

    let amount = counterparties.iter().map(|c| c.amount).sum();

    Ok(TxHistoryEntry {
        txid: record.txid.clone(),
        height: record.height,
        direction,
        status,
        amount,
        fee,
        score: if record.height > 0 { record.height } else { u64::MAX },
        counterparties,
    })
}
