//! Ownership decoding and locking templates for the cosign protocol.
//!
//! Two locking shapes carry token value:
//!
//! ```text
//! cosign: OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY
//!         OP_CHECKSIGVERIFY <33-byte cosigner pubkey> OP_CHECKSIG
//! plain:  OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG
//! ```
//!
//! [`decode_owner`] matches both templates over the decoded chunk list at
//! every offset, so the templates are found even behind an inscription
//! envelope. A payload is only trusted when the cosign shape carries the
//! configured cosigner key; that policy lives in the engine crate — this
//! module just reports what the script says.

use crate::chunk::Chunk;
use crate::opcodes::*;
use crate::{Address, Network, Script, ScriptError};

/// The owner a locking script pays to, plus the cosigner key if the
/// script uses the dual-verification shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptOwner {
    /// The address derived from the 20-byte hash in the template.
    pub address: Address,
    /// The 33-byte cosigner public key, absent for plain scripts.
    pub cosigner: Option<[u8; 33]>,
}

/// Decode the owner of a locking script.
///
/// Scans the chunk sequence left to right, trying the 7-chunk cosign
/// template before the 5-chunk plain template at each offset; the first
/// match wins. Returns `None` for scripts matching neither shape and for
/// scripts that do not decode into chunks at all.
pub fn decode_owner(script: &Script, network: Network) -> Option<ScriptOwner> {
    let chunks = script.chunks().ok()?;

    for i in 0..chunks.len() {
        if let Some(owner) = match_cosign(&chunks[i..], network) {
            return Some(owner);
        }
        if let Some(owner) = match_plain(&chunks[i..], network) {
            return Some(owner);
        }
    }
    None
}

/// Try the dual-verification template at the start of `chunks`.
fn match_cosign(chunks: &[Chunk], network: Network) -> Option<ScriptOwner> {
    if chunks.len() < 7 {
        return None;
    }
    if chunks[0].opcode != OP_DUP
        || chunks[1].opcode != OP_HASH160
        || !chunks[2].pushes_len(20)
        || chunks[3].opcode != OP_EQUALVERIFY
        || chunks[4].opcode != OP_CHECKSIGVERIFY
        || !chunks[5].pushes_len(33)
        || chunks[6].opcode != OP_CHECKSIG
    {
        return None;
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(chunks[2].data.as_deref()?);
    let mut cosigner = [0u8; 33];
    cosigner.copy_from_slice(chunks[5].data.as_deref()?);

    Some(ScriptOwner {
        address: Address::from_hash160(hash, network),
        cosigner: Some(cosigner),
    })
}

/// Try the plain P2PKH template at the start of `chunks`.
fn match_plain(chunks: &[Chunk], network: Network) -> Option<ScriptOwner> {
    if chunks.len() < 5 {
        return None;
    }
    if chunks[0].opcode != OP_DUP
        || chunks[1].opcode != OP_HASH160
        || !chunks[2].pushes_len(20)
        || chunks[3].opcode != OP_EQUALVERIFY
        || chunks[4].opcode != OP_CHECKSIG
    {
        return None;
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(chunks[2].data.as_deref()?);

    Some(ScriptOwner {
        address: Address::from_hash160(hash, network),
        cosigner: None,
    })
}

/// Build the dual-verification locking script for `address` under
/// `cosigner`.
pub fn cosign_lock(address: &Address, cosigner: &[u8; 33]) -> Script {
    let mut bytes = Vec::with_capacity(60);
    bytes.push(OP_DUP);
    bytes.push(OP_HASH160);
    bytes.push(20);
    bytes.extend_from_slice(&address.hash160);
    bytes.push(OP_EQUALVERIFY);
    bytes.push(OP_CHECKSIGVERIFY);
    bytes.push(33);
    bytes.extend_from_slice(cosigner);
    bytes.push(OP_CHECKSIG);
    Script::from_bytes(&bytes)
}

/// Build the plain P2PKH locking script for `address`.
pub fn p2pkh_lock(address: &Address) -> Script {
    let mut bytes = Vec::with_capacity(25);
    bytes.push(OP_DUP);
    bytes.push(OP_HASH160);
    bytes.push(20);
    bytes.extend_from_slice(&address.hash160);
    bytes.push(OP_EQUALVERIFY);
    bytes.push(OP_CHECKSIG);
    Script::from_bytes(&bytes)
}

/// Build the holder's partial unlocking script: `<sig> <pubkey>`.
///
/// For cosign outputs the service prepends its own signature; for plain
/// outputs this is already the complete unlock.
pub fn holder_unlock(signature: &[u8], pubkey: &[u8; 33]) -> Result<Script, ScriptError> {
    let mut script = Script::new();
    script.push_data(signature)?;
    script.push_data(pubkey)?;
    Ok(script)
}
