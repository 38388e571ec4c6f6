//! Transaction id newtype.
//!
//! A `TxId` holds the 32-byte double-SHA-256 of a serialized transaction
//! in internal (little-endian) byte order. String conversions reverse the
//! bytes, matching the display convention used by explorers and APIs.

use std::fmt;
use std::str::FromStr;

use crate::hash::sha256d;
use crate::CoreError;

/// A 32-byte transaction id in internal byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxId([u8; 32]);

impl TxId {
    /// Wrap a raw 32-byte array already in internal byte order.
    pub fn new(bytes: [u8; 32]) -> Self {
        TxId(bytes)
    }

    /// Compute the id of a serialized transaction.
    pub fn of_raw_tx(raw: &[u8]) -> Self {
        TxId(sha256d(raw))
    }

    /// Build a `TxId` from a byte slice in internal order.
    ///
    /// # Returns
    /// `Ok(TxId)` if the slice is exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.len() != 32 {
            return Err(CoreError::InvalidTxId(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(TxId(arr))
    }

    /// Parse a display-order (byte-reversed) hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, CoreError> {
        let decoded = hex::decode(hex_str)?;
        if decoded.len() != 32 {
            return Err(CoreError::InvalidTxId(format!(
                "expected 64 hex characters, got {}",
                hex_str.len()
            )));
        }
        let mut arr = [0u8; 32];
        for (i, b) in decoded.iter().rev().enumerate() {
            arr[i] = *b;
        }
        Ok(TxId(arr))
    }

    /// The raw bytes in internal order.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the id as display-order hex.
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self.to_hex())
    }
}

impl FromStr for TxId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxId::from_hex(s)
    }
}

impl serde::Serialize for TxId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for TxId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TxId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS_COINBASE: &str =
        "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

    /// Hex parsing reverses into internal order and formats back losslessly.
    #[test]
    fn hex_roundtrip() {
        let id = TxId::from_hex(GENESIS_COINBASE).expect("should parse");
        assert_eq!(id.to_hex(), GENESIS_COINBASE);
        // internal order is the reverse of the display string
        assert_eq!(id.as_bytes()[31], 0x4a);
        assert_eq!(id.as_bytes()[0], 0x3b);
    }

    /// A short hex string is rejected.
    #[test]
    fn short_hex_rejected() {
        assert!(TxId::from_hex("abcd").is_err());
    }

    /// Non-hex characters are rejected.
    #[test]
    fn bad_hex_rejected() {
        assert!(TxId::from_hex(&"zz".repeat(32)).is_err());
    }

    /// Serde serializes to the display-order hex string and back.
    #[test]
    fn serde_roundtrip() {
        let id = TxId::from_hex(GENESIS_COINBASE).expect("should parse");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", GENESIS_COINBASE));
        let back: TxId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    /// of_raw_tx hashes with double SHA-256.
    #[test]
    fn of_raw_tx_matches_sha256d() {
        let raw = b"not a real transaction";
        let id = TxId::of_raw_tx(raw);
        assert_eq!(id.as_bytes(), &crate::hash::sha256d(raw));
    }
}
