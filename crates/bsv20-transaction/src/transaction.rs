//! The transaction type.
//!
//! Wire format: 4-byte version, varint input count, inputs, varint
//! output count, outputs, 4-byte locktime; all integers little-endian.
//! The txid is the double SHA-256 of the serialized bytes.

use bsv20_core::{ByteReader, ByteWriter, TxId};

use crate::input::TxInput;
use crate::output::TxOutput;
use crate::TransactionError;

/// A transaction: version, inputs, outputs, and locktime.
#[derive(Clone, Debug, Default)]
pub struct Tx {
    /// Transaction format version.
    pub version: u32,
    /// Ordered inputs.
    pub inputs: Vec<TxInput>,
    /// Ordered outputs.
    pub outputs: Vec<TxOutput>,
    /// Locktime; zero means immediately final.
    pub lock_time: u32,
}

impl Tx {
    /// An empty version-1 transaction.
    pub fn new() -> Self {
        Tx {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    /// Parse a transaction from hex.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::Malformed(format!("invalid hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Parse a transaction from raw bytes.
    ///
    /// The slice must contain exactly one transaction; trailing bytes are
    /// an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::Malformed(format!(
                "{} trailing bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Decode a transaction from the reader.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let version = reader
            .read_u32()
            .map_err(|e| TransactionError::Malformed(format!("reading version: {e}")))?;

        let input_count = reader
            .read_varint()
            .map_err(|e| TransactionError::Malformed(format!("reading input count: {e}")))?;
        let mut inputs = Vec::with_capacity(input_count.min(1024) as usize);
        for _ in 0..input_count {
            inputs.push(TxInput::read_from(reader)?);
        }

        let output_count = reader
            .read_varint()
            .map_err(|e| TransactionError::Malformed(format!("reading output count: {e}")))?;
        let mut outputs = Vec::with_capacity(output_count.min(1024) as usize);
        for _ in 0..output_count {
            outputs.push(TxOutput::read_from(reader)?);
        }

        let lock_time = reader
            .read_u32()
            .map_err(|e| TransactionError::Malformed(format!("reading lock time: {e}")))?;

        Ok(Tx {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Serialize to wire-format bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        writer.write_u32(self.version);
        writer.write_varint(self.inputs.len() as u64);
        for input in &self.inputs {
            input.write_to(&mut writer);
        }
        writer.write_varint(self.outputs.len() as u64);
        for output in &self.outputs {
            output.write_to(&mut writer);
        }
        writer.write_u32(self.lock_time);
        writer.into_bytes()
    }

    /// Serialize to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The transaction id.
    pub fn txid(&self) -> TxId {
        TxId::of_raw_tx(&self.to_bytes())
    }

    /// Append an input.
    pub fn add_input(&mut self, input: TxInput) {
        self.inputs.push(input);
    }

    /// Append an output.
    pub fn add_output(&mut self, output: TxOutput) {
        self.outputs.push(output);
    }
}

impl std::fmt::Display for Tx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
