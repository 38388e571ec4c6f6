//! Per-input signature production.
//!
//! For every consumed input the builder emits a [`SigRequest`] naming
//! the funding outpoint, script, value, and signature scope. Signing
//! turns each request into a detached `(signature, public key)` pair
//! over the exact BIP-143 preimage the protocol requires; applying the
//! responses installs `<sig> <pubkey>` unlocking scripts, leaving the
//! cosigner's slot for the service to fill.
//!
//! The default scope is `ALL | ANYONECANPAY | FORKID`: the holder
//! commits to all outputs but only their own input, which is what lets
//! the cosigner append its own funding inputs independently. Callers
//! building custom multi-source transfers may override the scope per
//! request.

use bsv20_core::{PrivateKey, TxId};
use bsv20_script::ownership::holder_unlock;
use bsv20_script::Script;
use bsv20_transaction::sighash::{signature_digest, SIGHASH_COSIGN_DEFAULT};
use bsv20_transaction::Tx;

use crate::EngineError;

/// Everything needed to compute one input's signature preimage.
#[derive(Clone, Debug)]
pub struct SigRequest {
    /// Id of the funding transaction.
    pub prev_txid: TxId,
    /// Output index within the funding transaction.
    pub prev_vout: u32,
    /// Index of the input being signed.
    pub input_index: usize,
    /// Locking script of the funding output.
    pub script: Script,
    /// Satoshi value of the funding output.
    pub satoshis: u64,
    /// Signature scope flags; [`SIGHASH_COSIGN_DEFAULT`] for transfers.
    pub sighash_flags: u32,
}

impl SigRequest {
    /// A request with the protocol's default transfer scope.
    pub fn transfer(
        prev_txid: TxId,
        prev_vout: u32,
        input_index: usize,
        script: Script,
        satoshis: u64,
    ) -> Self {
        SigRequest {
            prev_txid,
            prev_vout,
            input_index,
            script,
            satoshis,
            sighash_flags: SIGHASH_COSIGN_DEFAULT,
        }
    }
}

/// One input's detached signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigResponse {
    /// Index of the signed input.
    pub input_index: usize,
    /// DER signature with the sighash flag byte appended.
    pub signature: Vec<u8>,
    /// The holder's compressed public key.
    pub public_key: [u8; 33],
}

/// Sign every request against `tx` with the holder's key.
///
/// Each request is checked against the input it names before its
/// preimage is computed; a missing script or a request that does not
/// match its input's outpoint is reported per call as
/// `SignaturePreimageIncomplete`, not retried.
pub fn sign_inputs(
    tx: &Tx,
    requests: &[SigRequest],
    key: &PrivateKey,
) -> Result<Vec<SigResponse>, EngineError> {
    let public_key = key.public_key().to_compressed();
    let mut responses = Vec::with_capacity(requests.len());

    for request in requests {
        let input = tx.inputs.get(request.input_index).ok_or_else(|| {
            EngineError::SignaturePreimageIncomplete {
                index: request.input_index,
                reason: format!("transaction has only {} inputs", tx.inputs.len()),
            }
        })?;

        if input.prev_txid != request.prev_txid || input.prev_vout != request.prev_vout {
            return Err(EngineError::SignaturePreimageIncomplete {
                index: request.input_index,
                reason: "request outpoint does not match the input".to_string(),
            });
        }

        if request.script.is_empty() {
            return Err(EngineError::SignaturePreimageIncomplete {
                index: request.input_index,
                reason: "missing funding script".to_string(),
            });
        }

        let digest = signature_digest(
            tx,
            request.input_index,
            &request.script,
            request.satoshis,
            request.sighash_flags,
        )?;

        let mut signature = key.sign(&digest)?.to_der();
        signature.push(request.sighash_flags as u8);

        responses.push(SigResponse {
            input_index: request.input_index,
            signature,
            public_key,
        });
    }

    Ok(responses)
}

/// Install holder unlocking scripts from signature responses.
///
/// After this the transaction is partially signed: cosign inputs still
/// await the service's signature.
pub fn apply_signatures(tx: &mut Tx, responses: &[SigResponse]) -> Result<(), EngineError> {
    for response in responses {
        let count = tx.inputs.len();
        let input = tx.inputs.get_mut(response.input_index).ok_or_else(|| {
            EngineError::SignaturePreimageIncomplete {
                index: response.input_index,
                reason: format!("transaction has only {count} inputs"),
            }
        })?;
        input.unlocking_script = Some(holder_unlock(&response.signature, &response.public_key)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsv20_core::hash::sha256d;
    use bsv20_transaction::sighash::{SIGHASH_ALL, SIGHASH_FORKID};
    use bsv20_transaction::{TxInput, TxOutput};

    fn holder_key() -> PrivateKey {
        PrivateKey::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000001",
        )
        .expect("valid key")
    }

    fn funding_txid(tag: u8) -> TxId {
        TxId::new(sha256d(&[tag]))
    }

    fn funding_script() -> Script {
        Script::from_hex("76a91403ececf2d12a7f614aef4c82ecf13c303bd9975d88ac")
            .expect("valid hex")
    }

    fn two_input_tx() -> Tx {
        let mut tx = Tx::new();
        tx.add_input(TxInput::new(funding_txid(1), 0));
        tx.add_input(TxInput::new(funding_txid(2), 1));
        tx.add_output(TxOutput::new(1, Script::from_bytes(&[0x51])));
        tx
    }

    fn request_for(tx: &Tx, index: usize) -> SigRequest {
        SigRequest::transfer(
            tx.inputs[index].prev_txid,
            tx.inputs[index].prev_vout,
            index,
            funding_script(),
            1,
        )
    }

    // -----------------------------------------------------------------------
    // signing
    // -----------------------------------------------------------------------

    /// Each input gets a verifiable signature over its own preimage.
    #[test]
    fn signatures_verify_per_input() {
        let tx = two_input_tx();
        let key = holder_key();
        let requests = [request_for(&tx, 0), request_for(&tx, 1)];
        let responses = sign_inputs(&tx, &requests, &key).expect("should sign");

        assert_eq!(responses.len(), 2);
        for (request, response) in requests.iter().zip(&responses) {
            let digest = signature_digest(
                &tx,
                request.input_index,
                &request.script,
                request.satoshis,
                request.sighash_flags,
            )
            .expect("digest");
            // Strip the trailing flag byte before DER verification.
            let der = &response.signature[..response.signature.len() - 1];
            let sig = bsv20_core::EcdsaSignature::from_der(der).expect("valid DER");
            assert!(key.public_key().verify(&digest, &sig));
        }
    }

    /// The flag byte defaults to the cosign transfer scope (0xC1).
    #[test]
    fn default_flag_byte() {
        let tx = two_input_tx();
        let responses =
            sign_inputs(&tx, &[request_for(&tx, 0)], &holder_key()).expect("should sign");
        assert_eq!(*responses[0].signature.last().expect("non-empty"), 0xc1);
    }

    /// An explicit scope override lands in the flag byte.
    #[test]
    fn custom_flag_byte() {
        let tx = two_input_tx();
        let mut request = request_for(&tx, 0);
        request.sighash_flags = SIGHASH_ALL | SIGHASH_FORKID;
        let responses = sign_inputs(&tx, &[request], &holder_key()).expect("should sign");
        assert_eq!(*responses[0].signature.last().expect("non-empty"), 0x41);
    }

    /// Signatures over different inputs differ (no preimage reuse).
    #[test]
    fn signatures_differ_per_input() {
        let tx = two_input_tx();
        let requests = [request_for(&tx, 0), request_for(&tx, 1)];
        let responses = sign_inputs(&tx, &requests, &holder_key()).expect("should sign");
        assert_ne!(responses[0].signature, responses[1].signature);
    }

    // -----------------------------------------------------------------------
    // failure reporting
    // -----------------------------------------------------------------------

    /// An empty funding script is SignaturePreimageIncomplete.
    #[test]
    fn empty_script_rejected() {
        let tx = two_input_tx();
        let mut request = request_for(&tx, 0);
        request.script = Script::new();
        let result = sign_inputs(&tx, &[request], &holder_key());
        assert!(matches!(
            result,
            Err(EngineError::SignaturePreimageIncomplete { index: 0, .. })
        ));
    }

    /// A request pointing past the input list is rejected.
    #[test]
    fn out_of_range_rejected() {
        let tx = two_input_tx();
        let mut request = request_for(&tx, 0);
        request.input_index = 5;
        assert!(sign_inputs(&tx, &[request], &holder_key()).is_err());
    }

    /// A request whose outpoint disagrees with its input is rejected.
    #[test]
    fn outpoint_mismatch_rejected() {
        let tx = two_input_tx();
        let mut request = request_for(&tx, 0);
        request.prev_vout = 9;
        assert!(sign_inputs(&tx, &[request], &holder_key()).is_err());
    }

    // -----------------------------------------------------------------------
    // applying
    // -----------------------------------------------------------------------

    /// Applied responses become `<sig> <pubkey>` unlocking scripts.
    #[test]
    fn apply_installs_unlocks() {
        let mut tx = two_input_tx();
        let requests = [request_for(&tx, 0), request_for(&tx, 1)];
        let responses = sign_inputs(&tx, &requests, &holder_key()).expect("should sign");
        apply_signatures(&mut tx, &responses).expect("should apply");

        for input in &tx.inputs {
            let script = input.unlocking_script.as_ref().expect("signed");
            let chunks = script.chunks().expect("decodable");
            assert_eq!(chunks.len(), 2);
            assert!(chunks[1].pushes_len(33));
        }
    }

    /// Applying a response for a missing input is rejected.
    #[test]
    fn apply_out_of_range_rejected() {
        let mut tx = two_input_tx();
        let response = SigResponse {
            input_index: 7,
            signature: vec![0x30, 0x01, 0x00, 0xc1],
            public_key: [0x02; 33],
        };
        assert!(apply_signatures(&mut tx, &[response]).is_err());
    }
}
