//! Transaction output: a satoshi value and the locking script that
//! guards it.
//!
//! Wire format: 8-byte little-endian satoshis, varint script length,
//! script bytes.

use bsv20_core::{ByteReader, ByteWriter};
use bsv20_script::Script;

use crate::TransactionError;

/// A single transaction output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutput {
    /// Satoshis locked by this output.
    pub satoshis: u64,
    /// The locking script (scriptPubKey).
    pub script: Script,
}

impl TxOutput {
    /// Create an output with the given value and locking script.
    pub fn new(satoshis: u64, script: Script) -> Self {
        TxOutput { satoshis, script }
    }

    /// Decode an output from the reader.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let satoshis = reader
            .read_u64()
            .map_err(|e| TransactionError::Malformed(format!("reading satoshis: {e}")))?;
        let script_len = reader
            .read_varint()
            .map_err(|e| TransactionError::Malformed(format!("reading script length: {e}")))?;
        let script_bytes = reader
            .read_bytes(script_len as usize)
            .map_err(|e| TransactionError::Malformed(format!("reading locking script: {e}")))?;

        Ok(TxOutput {
            satoshis,
            script: Script::from_bytes(script_bytes),
        })
    }

    /// Encode this output into the writer.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64(self.satoshis);
        writer.write_varint(self.script.len() as u64);
        writer.write_bytes(self.script.as_bytes());
    }

    /// Serialize to a standalone byte vector.
    ///
    /// Also the exact form committed to by the signature digest's
    /// hashOutputs field.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(9 + self.script.len());
        self.write_to(&mut writer);
        writer.into_bytes()
    }
}
