//! Transfer transaction construction.
//!
//! Given a funding set of token UTXOs and a list of transfer requests,
//! the builder selects inputs greedily in candidate order, computes the
//! protocol fee, and emits one inscribed cosign output per request plus
//! the fee and change outputs. Every step either completes or returns
//! an error; a partially built transaction is never handed back.
//!
//! Selection order matters: the first consumed UTXO's address becomes
//! the default change address, and signature requests are emitted in
//! input order, so candidates are consumed exactly as listed.

use bsv20_script::ownership::cosign_lock;
use bsv20_script::Address;
use bsv20_transaction::{Tx, TxInput, TxOutput};

use crate::config::ProtocolConfig;
use crate::payload::Bsv20Payload;
use crate::signer::SigRequest;
use crate::traits::TxSource;
use crate::utxo::{TokenUtxo, TransferRequest};
use crate::EngineError;

/// Satoshi value of every emitted token output (the 1-sat data-carrier
/// convention; miner fees are funded by the cosigner service).
pub const TOKEN_OUTPUT_SATOSHIS: u64 = 1;

/// A fully constructed, not yet signed transfer.
#[derive(Debug)]
pub struct BuiltTransfer {
    /// The unsigned transaction.
    pub tx: Tx,
    /// The UTXOs consumed, in input order.
    pub consumed: Vec<TokenUtxo>,
    /// One signature request per input, in input order.
    pub sig_requests: Vec<SigRequest>,
    /// Requested atomic total across all transfer legs.
    pub total: u64,
    /// Protocol fee in atomic units (zero for burns).
    pub fee: u64,
    /// Change leg, when the consumed amount exceeded total + fee.
    pub change: Option<(String, u64)>,
}

/// Build an unsigned transfer transaction.
///
/// `candidates` must already be filtered to usable protocol operations
/// and is consumed greedily in order. Each consumed UTXO's source
/// transaction is fetched through `source` as it is consumed (unless
/// already attached), because signing needs the funding output's exact
/// script and value.
///
/// `change_address` overrides the default change destination, which is
/// the address of the first consumed UTXO.
pub async fn build_transfer<S: TxSource>(
    config: &ProtocolConfig,
    candidates: Vec<TokenUtxo>,
    requests: &[TransferRequest],
    change_address: Option<&str>,
    source: &S,
) -> Result<BuiltTransfer, EngineError> {
    // 1. Convert and sum the requested amounts.
    let mut leg_amounts = Vec::with_capacity(requests.len());
    let mut total: u64 = 0;
    for request in requests {
        let atomic = config.to_atomic(&request.amount)?;
        total = total
            .checked_add(atomic)
            .ok_or_else(|| EngineError::InvalidAmount("requested total overflows".into()))?;
        leg_amounts.push(atomic);
    }
    if total == 0 {
        return Err(EngineError::InvalidAmount(
            "requested total must be strictly positive".into(),
        ));
    }

    // 2. Fee: burns are free, everything else needs a covering tier.
    let targets_burn = requests.iter().any(|r| r.address == config.burn_address);
    let fee = config.fee_for(total, targets_burn)?;
    let needed = total
        .checked_add(fee)
        .ok_or_else(|| EngineError::InvalidAmount("total plus fee overflows".into()))?;

    // 3. Greedy selection in candidate order, fetching each consumed
    //    UTXO's source transaction as we go.
    let available: u64 = candidates.iter().map(|u| u.amount).sum();
    let mut tx = Tx::new();
    let mut consumed = Vec::new();
    let mut sig_requests = Vec::new();
    let mut gathered: u64 = 0;

    for mut utxo in candidates {
        if gathered >= needed {
            break;
        }

        let source_tx = match utxo.source_tx.take() {
            Some(tx) => tx,
            None => source.fetch_transaction(&utxo.outpoint.txid).await?,
        };
        if source_tx.txid() != utxo.outpoint.txid {
            return Err(EngineError::SourceTransactionUnavailable(format!(
                "fetched transaction hashes to {}, expected {}",
                source_tx.txid(),
                utxo.outpoint.txid
            )));
        }
        let funding = source_tx
            .outputs
            .get(utxo.outpoint.vout as usize)
            .ok_or_else(|| {
                EngineError::SourceTransactionUnavailable(format!(
                    "output {} missing from {}",
                    utxo.outpoint.vout, utxo.outpoint.txid
                ))
            })?;

        sig_requests.push(SigRequest::transfer(
            utxo.outpoint.txid,
            utxo.outpoint.vout,
            tx.inputs.len(),
            funding.script.clone(),
            funding.satoshis,
        ));

        let mut input = TxInput::new(utxo.outpoint.txid, utxo.outpoint.vout);
        input.source_tx = Some(Box::new(source_tx.clone()));
        tx.add_input(input);

        gathered += utxo.amount;
        utxo.source_tx = Some(source_tx);
        consumed.push(utxo);
    }

    if gathered < needed {
        return Err(EngineError::InsufficientBalance { needed, available });
    }

    // 4. Emit outputs: one per request, then fee, then change.
    let cosigner = config.cosigner()?;
    for (request, &atomic) in requests.iter().zip(&leg_amounts) {
        tx.add_output(token_output(config, &cosigner, &request.address, atomic)?);
    }
    if fee > 0 {
        tx.add_output(token_output(config, &cosigner, &config.fee_address, fee)?);
    }

    let change_amount = gathered - needed;
    let mut change = None;
    if change_amount > 0 {
        let destination = change_address
            .map(str::to_string)
            .unwrap_or_else(|| consumed[0].address.clone());
        tx.add_output(token_output(config, &cosigner, &destination, change_amount)?);
        change = Some((destination, change_amount));
    }

    Ok(BuiltTransfer {
        tx,
        consumed,
        sig_requests,
        total,
        fee,
        change,
    })
}

/// Build one inscribed cosign token output.
fn token_output(
    config: &ProtocolConfig,
    cosigner: &[u8; 33],
    address: &str,
    atomic: u64,
) -> Result<TxOutput, EngineError> {
    let address = Address::from_string(address)?;
    let payload = Bsv20Payload::transfer(&config.token_id, atomic);
    let script = payload
        .to_inscription()
        .lock(&cosign_lock(&address, cosigner))?;
    Ok(TxOutput::new(TOKEN_OUTPUT_SATOSHIS, script))
}
