//! BIP-143 (FORKID) signature digest.
//!
//! The digest algorithm introduced by the UAHF fork commits to the value
//! being spent and hashes inputs and outputs through intermediate
//! sha256d accumulators. The cosign protocol signs every transfer input
//! with `ALL | ANYONECANPAY | FORKID`, which zeroes the prevout and
//! sequence accumulators so the service can add its own funding inputs
//! without invalidating the holder's signatures.
//!
//! See <https://github.com/bitcoin-sv/bitcoin-sv/blob/master/doc/abc/replay-protected-sighash.md#digest-algorithm>

use bsv20_core::hash::sha256d;
use bsv20_core::ByteWriter;
use bsv20_script::Script;

use crate::transaction::Tx;
use crate::TransactionError;

/// Sign all inputs and all outputs.
pub const SIGHASH_ALL: u32 = 0x01;
/// Sign all inputs and no outputs.
pub const SIGHASH_NONE: u32 = 0x02;
/// Sign all inputs and the output at the signed input's index.
pub const SIGHASH_SINGLE: u32 = 0x03;
/// Replay-protection flag required on all post-fork signatures.
pub const SIGHASH_FORKID: u32 = 0x40;
/// Commit only to the signed input, not its siblings.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;
/// Mask extracting the base type from a flag set.
pub const SIGHASH_BASE_MASK: u32 = 0x1f;

/// The scope the cosign protocol mandates for ordinary transfers.
pub const SIGHASH_COSIGN_DEFAULT: u32 = SIGHASH_ALL | SIGHASH_ANYONECANPAY | SIGHASH_FORKID;

/// Compute the 32-byte signature digest for one input.
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `script_code` - Locking script of the output being spent.
/// * `satoshis` - Value of the output being spent.
/// * `flags` - Combined sighash flags.
pub fn signature_digest(
    tx: &Tx,
    input_index: usize,
    script_code: &Script,
    satoshis: u64,
    flags: u32,
) -> Result<[u8; 32], TransactionError> {
    Ok(sha256d(&preimage(
        tx,
        input_index,
        script_code,
        satoshis,
        flags,
    )?))
}

/// Compute the raw preimage bytes the digest hashes.
///
/// Layout: version, hashPrevouts, hashSequence, outpoint, scriptCode
/// (varint-prefixed), value, sequence, hashOutputs, locktime, flags.
/// Fixed-width integers are little-endian; the hash fields are sha256d
/// accumulators that collapse to 32 zero bytes when the flag set
/// excludes them.
pub fn preimage(
    tx: &Tx,
    input_index: usize,
    script_code: &Script,
    satoshis: u64,
    flags: u32,
) -> Result<Vec<u8>, TransactionError> {
    let input = tx
        .inputs
        .get(input_index)
        .ok_or(TransactionError::InputOutOfRange {
            index: input_index,
            count: tx.inputs.len(),
        })?;

    let base = flags & SIGHASH_BASE_MASK;
    let anyone_can_pay = flags & SIGHASH_ANYONECANPAY != 0;

    let hash_prevouts = if anyone_can_pay {
        [0u8; 32]
    } else {
        let mut w = ByteWriter::with_capacity(tx.inputs.len() * 36);
        for i in &tx.inputs {
            w.write_bytes(i.prev_txid.as_bytes());
            w.write_u32(i.prev_vout);
        }
        sha256d(w.as_bytes())
    };

    let hash_sequence =
        if anyone_can_pay || base == SIGHASH_SINGLE || base == SIGHASH_NONE {
            [0u8; 32]
        } else {
            let mut w = ByteWriter::with_capacity(tx.inputs.len() * 4);
            for i in &tx.inputs {
                w.write_u32(i.sequence);
            }
            sha256d(w.as_bytes())
        };

    let hash_outputs = if base != SIGHASH_SINGLE && base != SIGHASH_NONE {
        let mut w = ByteWriter::new();
        for o in &tx.outputs {
            w.write_bytes(&o.to_bytes());
        }
        sha256d(w.as_bytes())
    } else if base == SIGHASH_SINGLE && input_index < tx.outputs.len() {
        sha256d(&tx.outputs[input_index].to_bytes())
    } else {
        [0u8; 32]
    };

    let mut w = ByteWriter::with_capacity(156 + script_code.len());
    w.write_u32(tx.version);
    w.write_bytes(&hash_prevouts);
    w.write_bytes(&hash_sequence);
    w.write_bytes(input.prev_txid.as_bytes());
    w.write_u32(input.prev_vout);
    w.write_varint(script_code.len() as u64);
    w.write_bytes(script_code.as_bytes());
    w.write_u64(satoshis);
    w.write_u32(input.sequence);
    w.write_bytes(&hash_outputs);
    w.write_u32(tx.lock_time);
    w.write_u32(flags);
    Ok(w.into_bytes())
}
