//! Transaction input referencing a previous output.
//!
//! Wire format: 32-byte previous txid (internal order), 4-byte output
//! index, varint-prefixed unlocking script, 4-byte sequence number.
//!
//! Funding information for signing can be attached either as the full
//! source transaction or as just the spent output; the direct output
//! takes priority when both are present.

use bsv20_core::{ByteReader, ByteWriter, TxId};
use bsv20_script::Script;

use crate::output::TxOutput;
use crate::transaction::Tx;
use crate::TransactionError;

/// Sequence number of a finalized input.
pub const FINAL_SEQUENCE: u32 = 0xffff_ffff;

/// A single transaction input.
#[derive(Clone, Debug)]
pub struct TxInput {
    /// Id of the transaction whose output is being spent.
    pub prev_txid: TxId,
    /// Index of the spent output within that transaction.
    pub prev_vout: u32,
    /// The unlocking script; `None` until the input is signed.
    pub unlocking_script: Option<Script>,
    /// Sequence number, `FINAL_SEQUENCE` by default.
    pub sequence: u32,
    /// The full source transaction, when fetched for signing or provenance.
    pub source_tx: Option<Box<Tx>>,
    /// The spent output directly, when the full source tx is not needed.
    pub source_output: Option<TxOutput>,
}

impl TxInput {
    /// Create an unsigned input spending `prev_txid:prev_vout`.
    pub fn new(prev_txid: TxId, prev_vout: u32) -> Self {
        TxInput {
            prev_txid,
            prev_vout,
            unlocking_script: None,
            sequence: FINAL_SEQUENCE,
            source_tx: None,
            source_output: None,
        }
    }

    /// Decode an input from the reader.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let txid_bytes = reader
            .read_bytes(32)
            .map_err(|e| TransactionError::Malformed(format!("reading prev txid: {e}")))?;
        let prev_txid = TxId::from_slice(txid_bytes)?;

        let prev_vout = reader
            .read_u32()
            .map_err(|e| TransactionError::Malformed(format!("reading prev vout: {e}")))?;

        let script_len = reader
            .read_varint()
            .map_err(|e| TransactionError::Malformed(format!("reading script length: {e}")))?;
        let script_bytes = reader
            .read_bytes(script_len as usize)
            .map_err(|e| TransactionError::Malformed(format!("reading unlocking script: {e}")))?;

        let sequence = reader
            .read_u32()
            .map_err(|e| TransactionError::Malformed(format!("reading sequence: {e}")))?;

        Ok(TxInput {
            prev_txid,
            prev_vout,
            unlocking_script: if script_bytes.is_empty() {
                None
            } else {
                Some(Script::from_bytes(script_bytes))
            },
            sequence,
            source_tx: None,
            source_output: None,
        })
    }

    /// Encode this input into the writer.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(self.prev_txid.as_bytes());
        writer.write_u32(self.prev_vout);
        match &self.unlocking_script {
            Some(script) => {
                writer.write_varint(script.len() as u64);
                writer.write_bytes(script.as_bytes());
            }
            None => writer.write_varint(0),
        }
        writer.write_u32(self.sequence);
    }

    /// The output this input spends, from whichever source is attached.
    pub fn funding_output(&self) -> Option<&TxOutput> {
        if let Some(output) = &self.source_output {
            return Some(output);
        }
        self.source_tx
            .as_ref()
            .and_then(|tx| tx.outputs.get(self.prev_vout as usize))
    }

    /// Satoshi value of the spent output, if known.
    pub fn funding_satoshis(&self) -> Option<u64> {
        self.funding_output().map(|o| o.satoshis)
    }

    /// Locking script of the spent output, if known.
    pub fn funding_script(&self) -> Option<&Script> {
        self.funding_output().map(|o| &o.script)
    }
}
