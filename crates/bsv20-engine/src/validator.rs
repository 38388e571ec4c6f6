//! Transaction validation against intended transfers.
//!
//! Two modes. With an expected transfer list, validation is strict and
//! index-aligned: expected request *i* must correspond to output *i*
//! exactly, in cosigner, address, payload shape, token id, and atomic
//! amount. Without one, only the baseline well-formedness rule runs:
//! every decoded output's second key must be empty or the configured
//! cosigner, proving the transaction was not diverted to an
//! unauthorized key without checking amounts or destinations.
//!
//! Both modes return `Ok(false)` for a mismatch and reserve errors for
//! inputs that cannot be judged honestly: a decode failure is never
//! silently treated as valid.

use bsv20_script::envelope::has_envelope_marker;
use bsv20_script::ownership::decode_owner;
use bsv20_script::Inscription;
use bsv20_transaction::Tx;

use crate::config::ProtocolConfig;
use crate::payload::{Bsv20Payload, TokenOp};
use crate::utxo::TransferRequest;
use crate::EngineError;

/// Validate `tx` against an optional expected transfer list.
///
/// Dispatches to [`validate_transfers`] or [`validate_well_formed`].
pub fn validate(
    config: &ProtocolConfig,
    tx: &Tx,
    expected: Option<&[TransferRequest]>,
) -> Result<bool, EngineError> {
    match expected {
        Some(requests) => validate_transfers(config, tx, requests),
        None => validate_well_formed(config, tx),
    }
}

/// Strict positional validation.
///
/// Expected request *i* is checked against output *i*: the output must
/// carry the configured cosigner, pay the expected address, and inscribe
/// a well-formed `bsv-20` transfer of the configured token for exactly
/// the expected atomic amount. Any mismatch fails the whole validation.
///
/// An envelope marker that cannot be decoded under a matched output is a
/// `ProtocolViolation` rather than a plain mismatch — the transaction is
/// claiming to inscribe something and failing to.
pub fn validate_transfers(
    config: &ProtocolConfig,
    tx: &Tx,
    expected: &[TransferRequest],
) -> Result<bool, EngineError> {
    Ok(first_mismatch(config, tx, expected)?.is_none())
}

/// Like [`validate_transfers`], but a mismatch is an error carrying the
/// output index and what differed, for callers that branch on kind.
pub fn require_transfers(
    config: &ProtocolConfig,
    tx: &Tx,
    expected: &[TransferRequest],
) -> Result<(), EngineError> {
    match first_mismatch(config, tx, expected)? {
        None => Ok(()),
        Some((index, reason)) => Err(EngineError::ValidationMismatch { index, reason }),
    }
}

/// Walk the expected requests in lockstep with the outputs; report the
/// first mismatch as `(index, reason)`.
fn first_mismatch(
    config: &ProtocolConfig,
    tx: &Tx,
    expected: &[TransferRequest],
) -> Result<Option<(usize, String)>, EngineError> {
    let cosigner = config.cosigner()?;

    for (i, request) in expected.iter().enumerate() {
        let Some(output) = tx.outputs.get(i) else {
            return Ok(Some((i, "no output at this index".to_string())));
        };

        let Some(owner) = decode_owner(&output.script, config.network) else {
            return Ok(Some((i, "unrecognized locking script".to_string())));
        };
        if owner.cosigner != Some(cosigner) {
            return Ok(Some((i, "cosigner is not the configured key".to_string())));
        }
        if owner.address.text != request.address {
            return Ok(Some((
                i,
                format!("pays {}, expected {}", owner.address.text, request.address),
            )));
        }

        let Some(inscription) = Inscription::from_script(&output.script) else {
            if has_envelope_marker(&output.script) {
                return Err(EngineError::ProtocolViolation(format!(
                    "undecodable envelope on output {i}"
                )));
            }
            return Ok(Some((i, "no inscription".to_string())));
        };
        let Some(payload) = Bsv20Payload::decode(&inscription) else {
            return Err(EngineError::ProtocolViolation(format!(
                "malformed token payload on output {i}"
            )));
        };

        if payload.op != TokenOp::Transfer {
            return Ok(Some((i, format!("operation is {}, not transfer", payload.op))));
        }
        if payload.id.as_deref() != Some(config.token_id.as_str()) {
            return Ok(Some((i, "wrong token id".to_string())));
        }

        let expected_atomic = config.to_atomic(&request.amount)?;
        if payload.amount() != Some(expected_atomic) {
            return Ok(Some((
                i,
                format!("amount {} differs from expected {expected_atomic}", payload.amt),
            )));
        }
    }

    Ok(None)
}

/// Baseline well-formedness.
///
/// Every output that decodes to an ownership template must carry either
/// no second key or exactly the configured cosigner. Outputs matching
/// neither template are unrelated traffic and are ignored.
pub fn validate_well_formed(config: &ProtocolConfig, tx: &Tx) -> Result<bool, EngineError> {
    let cosigner = config.cosigner()?;

    for output in &tx.outputs {
        if let Some(owner) = decode_owner(&output.script, config.network) {
            if let Some(key) = owner.cosigner {
                if key != cosigner {
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}
