//! The `Script` byte-vector newtype.
//!
//! Construction helpers append pushes with minimal prefixes; decoding
//! goes through [`crate::chunk::decode_chunks`]. Serialization renders
//! scripts as lowercase hex, matching the service API surface.

use std::fmt;

use crate::chunk::{decode_chunks, push_prefix, Chunk};
use crate::ScriptError;

/// A locking or unlocking script.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Script(Vec<u8>);

impl Script {
    /// An empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Wrap raw script bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Decode a hex string into a script.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Ok(Script(hex::decode(hex_str)?))
    }

    /// The raw script bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex of the script bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Byte length of the script.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the script has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the script into chunks.
    pub fn chunks(&self) -> Result<Vec<Chunk>, ScriptError> {
        decode_chunks(&self.0)
    }

    /// Append a data push with the minimal prefix for its length.
    pub fn push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        self.0.extend_from_slice(&push_prefix(data.len())?);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append a bare opcode byte.
    pub fn push_opcode(&mut self, opcode: u8) {
        self.0.push(opcode);
    }

    /// Append another script's bytes verbatim.
    pub fn extend(&mut self, other: &Script) {
        self.0.extend_from_slice(&other.0);
    }

    /// Render the script as space-separated ASM tokens.
    ///
    /// Returns an empty string if the script cannot be decoded into
    /// chunks; ASM output is a debugging aid, not a parser surface.
    pub fn to_asm(&self) -> String {
        match self.chunks() {
            Ok(chunks) => chunks
                .iter()
                .map(Chunk::to_asm_token)
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => String::new(),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::*;

    const P2PKH_HEX: &str = "76a914e2a623699e81b291c0327f408fea765d534baa2a88ac";

    /// Hex construction and rendering round-trip.
    #[test]
    fn hex_roundtrip() {
        let script = Script::from_hex(P2PKH_HEX).expect("valid hex");
        assert_eq!(script.to_hex(), P2PKH_HEX);
        assert_eq!(script.len(), 25);
    }

    /// Invalid hex is rejected.
    #[test]
    fn bad_hex_rejected() {
        assert!(Script::from_hex("zzzz").is_err());
    }

    /// A P2PKH script renders to the familiar ASM form.
    #[test]
    fn asm_p2pkh() {
        let script = Script::from_hex(P2PKH_HEX).expect("valid hex");
        assert_eq!(
            script.to_asm(),
            "OP_DUP OP_HASH160 e2a623699e81b291c0327f408fea765d534baa2a OP_EQUALVERIFY OP_CHECKSIG"
        );
    }

    /// push_data chooses the direct-push prefix for small payloads.
    #[test]
    fn push_data_small() {
        let mut script = Script::new();
        script.push_data(&[1, 2, 3]).expect("should push");
        assert_eq!(script.to_hex(), "03010203");
    }

    /// push_data switches to PUSHDATA1 above 75 bytes.
    #[test]
    fn push_data_pushdata1() {
        let mut script = Script::new();
        script.push_data(&[0xaa; 80]).expect("should push");
        assert_eq!(&script.to_hex()[..4], "4c50");
    }

    /// Builders compose: opcode, push, extend.
    #[test]
    fn compose() {
        let mut tail = Script::new();
        tail.push_opcode(OP_CHECKSIG);

        let mut script = Script::new();
        script.push_opcode(OP_DUP);
        script.push_data(&[0xab; 20]).expect("should push");
        script.extend(&tail);

        let chunks = script.chunks().expect("should decode");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].opcode, OP_DUP);
        assert!(chunks[1].pushes_len(20));
        assert_eq!(chunks[2].opcode, OP_CHECKSIG);
    }

    /// Serde serializes scripts as hex strings.
    #[test]
    fn serde_roundtrip() {
        let script = Script::from_hex(P2PKH_HEX).expect("valid hex");
        let json = serde_json::to_string(&script).expect("serialize");
        assert_eq!(json, format!("\"{}\"", P2PKH_HEX));
        let back: Script = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, script);
    }
}
