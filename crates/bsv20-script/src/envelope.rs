//! The ord inscription envelope codec.
//!
//! An envelope embeds a self-describing data blob in a locking script:
//!
//! ```text
//! OP_FALSE OP_IF <"ord"> OP_1 <content-type> OP_0 <payload> OP_ENDIF
//! ```
//!
//! The fragment sits in front of the base locking script. Fields inside
//! the envelope are tagged by small-integer opcodes: tag `OP_0` carries
//! the payload, tag `OP_1` the content type. When a script contains more
//! than one envelope, the last one wins. Outputs without an envelope are
//! normal traffic, so decoding yields `None` rather than an error.

use bsv20_core::hash::sha256;

use crate::chunk::Chunk;
use crate::opcodes::*;
use crate::{Script, ScriptError};

/// The protocol tag pushed immediately after the envelope marker.
pub const ENVELOPE_TAG: &[u8] = b"ord";

/// A decoded (or to-be-encoded) inscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inscription {
    /// MIME-style content type of the payload.
    pub content_type: String,
    /// The raw payload bytes.
    pub payload: Vec<u8>,
}

impl Inscription {
    /// Create an inscription from its two fields.
    pub fn new(content_type: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Inscription {
            content_type: content_type.into(),
            payload: payload.into(),
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// SHA-256 of the payload bytes.
    pub fn content_hash(&self) -> [u8; 32] {
        sha256(&self.payload)
    }

    /// Encode this inscription as a bare envelope fragment.
    pub fn to_script_fragment(&self) -> Result<Script, ScriptError> {
        let mut script = Script::new();
        script.push_opcode(OP_FALSE);
        script.push_opcode(OP_IF);
        script.push_data(ENVELOPE_TAG)?;
        script.push_opcode(OP_1);
        script.push_data(self.content_type.as_bytes())?;
        script.push_opcode(OP_0);
        script.push_data(&self.payload)?;
        script.push_opcode(OP_ENDIF);
        Ok(script)
    }

    /// Encode this inscription in front of a base locking script.
    pub fn lock(&self, base: &Script) -> Result<Script, ScriptError> {
        let mut script = self.to_script_fragment()?;
        script.extend(base);
        Ok(script)
    }

    /// Decode the last envelope in a script, if any.
    ///
    /// Returns `None` for scripts with no envelope and for envelopes that
    /// are malformed (unknown field tag, a tag not followed by a push, or
    /// a missing end marker). Use [`has_envelope_marker`] to distinguish
    /// the two cases when the difference matters.
    pub fn from_script(script: &Script) -> Option<Inscription> {
        let chunks = script.chunks().ok()?;
        let start = last_marker(&chunks)?;

        let mut content_type: Option<Vec<u8>> = None;
        let mut payload: Option<Vec<u8>> = None;

        let mut i = start + 3;
        loop {
            let tag = chunks.get(i)?;
            if tag.opcode == OP_ENDIF {
                break;
            }
            let value = chunks.get(i + 1)?.push_value()?.to_vec();
            match tag.opcode {
                OP_0 => payload = Some(value),
                OP_1 => content_type = Some(value),
                // Any other tag opcode is outside the field-number
                // convention: the envelope is not ours to interpret.
                _ => return None,
            }
            i += 2;
        }

        Some(Inscription {
            content_type: String::from_utf8(content_type.unwrap_or_default()).ok()?,
            payload: payload.unwrap_or_default(),
        })
    }
}

/// Whether the script contains an envelope marker at all.
///
/// Strict validation uses this to tell "no inscription" (a mismatch)
/// apart from "an inscription we could not decode" (a protocol
/// violation).
pub fn has_envelope_marker(script: &Script) -> bool {
    match script.chunks() {
        Ok(chunks) => last_marker(&chunks).is_some(),
        Err(_) => false,
    }
}

/// Index of the last `OP_FALSE OP_IF <"ord">` marker triple, if present.
fn last_marker(chunks: &[Chunk]) -> Option<usize> {
    if chunks.len() < 3 {
        return None;
    }
    (0..=chunks.len() - 3).rev().find(|&i| {
        chunks[i].opcode == OP_FALSE
            && chunks[i].data.is_none()
            && chunks[i + 1].opcode == OP_IF
            && chunks[i + 2].data.as_deref() == Some(ENVELOPE_TAG)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ownership::p2pkh_lock;
    use crate::{Address, Network};

    fn test_address() -> Address {
        Address::from_hash160([0x11; 20], Network::Mainnet)
    }

    // -----------------------------------------------------------------------
    // round trips
    // -----------------------------------------------------------------------

    /// Encode and decode a bare envelope fragment.
    #[test]
    fn fragment_roundtrip() {
        let insc = Inscription::new("application/bsv-20", b"{\"p\":\"bsv-20\"}".to_vec());
        let script = insc.to_script_fragment().expect("should encode");
        assert_eq!(Inscription::from_script(&script), Some(insc));
    }

    /// Encode and decode with a base locking script appended.
    #[test]
    fn lock_roundtrip() {
        let insc = Inscription::new("text/plain", b"hello".to_vec());
        let base = p2pkh_lock(&test_address());
        let script = insc.lock(&base).expect("should encode");
        let decoded = Inscription::from_script(&script).expect("should decode");
        assert_eq!(decoded, insc);
        // The base lock is intact after the envelope.
        assert!(script.to_hex().ends_with(&base.to_hex()));
    }

    /// Empty content type and payload survive the round trip.
    #[test]
    fn empty_fields_roundtrip() {
        let insc = Inscription::new("", Vec::new());
        let script = insc.to_script_fragment().expect("should encode");
        assert_eq!(Inscription::from_script(&script), Some(insc));
    }

    /// A payload large enough to need PUSHDATA2 survives the round trip.
    #[test]
    fn large_payload_roundtrip() {
        let insc = Inscription::new("application/octet-stream", vec![0x5a; 70_000]);
        let script = insc.to_script_fragment().expect("should encode");
        assert_eq!(Inscription::from_script(&script), Some(insc));
    }

    // -----------------------------------------------------------------------
    // last envelope wins
    // -----------------------------------------------------------------------

    /// With two envelopes in one script, the later one is decoded.
    #[test]
    fn last_envelope_wins() {
        let first = Inscription::new("text/plain", b"old".to_vec());
        let second = Inscription::new("text/plain", b"new".to_vec());
        let mut script = first.to_script_fragment().expect("encode");
        script.extend(&second.to_script_fragment().expect("encode"));
        let decoded = Inscription::from_script(&script).expect("should decode");
        assert_eq!(decoded.payload, b"new");
    }

    // -----------------------------------------------------------------------
    // absence
    // -----------------------------------------------------------------------

    /// A plain locking script has no envelope.
    #[test]
    fn plain_script_is_absent() {
        let script = p2pkh_lock(&test_address());
        assert_eq!(Inscription::from_script(&script), None);
        assert!(!has_envelope_marker(&script));
    }

    /// An out-of-range field tag aborts decoding to absence.
    #[test]
    fn unknown_field_tag_is_absent() {
        let mut script = Script::new();
        script.push_opcode(OP_FALSE);
        script.push_opcode(OP_IF);
        script.push_data(ENVELOPE_TAG).expect("push");
        script.push_opcode(0x52); // OP_2: not a field this codec reads
        script.push_data(b"data").expect("push");
        script.push_opcode(OP_ENDIF);
        assert_eq!(Inscription::from_script(&script), None);
        assert!(has_envelope_marker(&script));
    }

    /// A marker with no end marker aborts decoding to absence.
    #[test]
    fn missing_endif_is_absent() {
        let mut script = Script::new();
        script.push_opcode(OP_FALSE);
        script.push_opcode(OP_IF);
        script.push_data(ENVELOPE_TAG).expect("push");
        script.push_opcode(OP_1);
        script.push_data(b"text/plain").expect("push");
        assert_eq!(Inscription::from_script(&script), None);
        assert!(has_envelope_marker(&script));
    }

    /// A tag followed by a non-push opcode aborts decoding to absence.
    #[test]
    fn tag_without_push_is_absent() {
        let mut script = Script::new();
        script.push_opcode(OP_FALSE);
        script.push_opcode(OP_IF);
        script.push_data(ENVELOPE_TAG).expect("push");
        script.push_opcode(OP_1);
        script.push_opcode(OP_DUP);
        script.push_opcode(OP_ENDIF);
        assert_eq!(Inscription::from_script(&script), None);
    }

    // -----------------------------------------------------------------------
    // derived fields
    // -----------------------------------------------------------------------

    /// size and content_hash derive from the payload.
    #[test]
    fn derived_fields() {
        let insc = Inscription::new("text/plain", b"hello".to_vec());
        assert_eq!(insc.size(), 5);
        assert_eq!(
            hex::encode(insc.content_hash()),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
