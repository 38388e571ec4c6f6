//! Chunk-level script decoding.
//!
//! A chunk is one opcode together with the data it pushes, if any. The
//! envelope and ownership codecs match templates over chunk sequences
//! rather than raw byte offsets, so a push of unexpected length can never
//! be mistaken for an opcode.

use crate::opcodes::*;
use crate::ScriptError;

/// One decoded script element: an opcode and its optional push data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// The opcode byte. For direct pushes this is the data length.
    pub opcode: u8,
    /// The pushed bytes, present only for push operations.
    pub data: Option<Vec<u8>>,
}

impl Chunk {
    /// A bare opcode chunk with no data.
    pub fn op(opcode: u8) -> Self {
        Chunk { opcode, data: None }
    }

    /// Whether this chunk is a push carrying exactly `len` bytes.
    pub fn pushes_len(&self, len: usize) -> bool {
        matches!(&self.data, Some(d) if d.len() == len)
    }

    /// The pushed bytes of this chunk, treating `OP_0` as an empty push.
    ///
    /// Returns `None` for non-push opcodes, which is what aborts envelope
    /// field decoding when a tag is followed by something other than data.
    pub fn push_value(&self) -> Option<&[u8]> {
        if self.opcode == OP_0 {
            return Some(&[]);
        }
        if self.opcode <= OP_PUSHDATA4 {
            return self.data.as_deref();
        }
        None
    }

    /// Render this chunk for ASM output: hex for pushes, names otherwise.
    pub fn to_asm_token(&self) -> String {
        if let Some(data) = &self.data {
            if !data.is_empty() {
                return hex::encode(data);
            }
        }
        match opcode_name(self.opcode) {
            Some(name) => name.to_string(),
            None => format!("OP_0x{:02x}", self.opcode),
        }
    }
}

/// Decode raw script bytes into chunks.
///
/// Direct pushes (0x01..=0x4b) and the three PUSHDATA forms carry data;
/// every other byte is a bare opcode. A push that runs past the end of
/// the script is an error — callers that treat malformed scripts as
/// "no match" do so at the codec layer, not here.
pub fn decode_chunks(bytes: &[u8]) -> Result<Vec<Chunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let opcode = bytes[pos];
        let start = pos;
        pos += 1;

        let data_len = match opcode {
            0x01..=OP_DATA_75 => Some(opcode as usize),
            OP_PUSHDATA1 => {
                if pos >= bytes.len() {
                    return Err(ScriptError::TruncatedPush(start));
                }
                let len = bytes[pos] as usize;
                pos += 1;
                Some(len)
            }
            OP_PUSHDATA2 => {
                if pos + 2 > bytes.len() {
                    return Err(ScriptError::TruncatedPush(start));
                }
                let len = u16::from_le_bytes([bytes[pos], bytes[pos + 1]]) as usize;
                pos += 2;
                Some(len)
            }
            OP_PUSHDATA4 => {
                if pos + 4 > bytes.len() {
                    return Err(ScriptError::TruncatedPush(start));
                }
                let len = u32::from_le_bytes([
                    bytes[pos],
                    bytes[pos + 1],
                    bytes[pos + 2],
                    bytes[pos + 3],
                ]) as usize;
                pos += 4;
                Some(len)
            }
            _ => None,
        };

        match data_len {
            Some(len) => {
                if pos + len > bytes.len() {
                    return Err(ScriptError::TruncatedPush(start));
                }
                chunks.push(Chunk {
                    opcode,
                    data: Some(bytes[pos..pos + len].to_vec()),
                });
                pos += len;
            }
            None => chunks.push(Chunk::op(opcode)),
        }
    }

    Ok(chunks)
}

/// Encode the push prefix for `len` bytes of data.
///
/// Chooses the minimal form: a direct push up to 75 bytes, then
/// PUSHDATA1/2/4.
pub fn push_prefix(len: usize) -> Result<Vec<u8>, ScriptError> {
    if len <= OP_DATA_75 as usize {
        Ok(vec![len as u8])
    } else if len <= 0xff {
        Ok(vec![OP_PUSHDATA1, len as u8])
    } else if len <= 0xffff {
        let mut prefix = vec![OP_PUSHDATA2];
        prefix.extend_from_slice(&(len as u16).to_le_bytes());
        Ok(prefix)
    } else if len <= 0xffff_ffff {
        let mut prefix = vec![OP_PUSHDATA4];
        prefix.extend_from_slice(&(len as u32).to_le_bytes());
        Ok(prefix)
    } else {
        Err(ScriptError::PushTooLarge(len))
    }
}
