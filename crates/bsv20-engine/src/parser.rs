//! Transaction parsing and classification.
//!
//! Walks a transaction's outputs (and, for full provenance, its inputs'
//! source outputs) through the ownership and envelope codecs, producing
//! a structured list of `(address, amount)` legs and a classification of
//! the transaction's role. Outputs that match neither codec are normal
//! non-token traffic and are dropped silently.

use bsv20_script::ownership::decode_owner;
use bsv20_script::{Inscription, Script};
use bsv20_transaction::Tx;

use crate::config::ProtocolConfig;
use crate::payload::{Bsv20Payload, TokenOp};
use crate::traits::TxSource;
use crate::EngineError;

/// The role a parsed transaction plays in the token's life cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxKind {
    /// Created the token at the canonical mint address.
    Deploy,
    /// Moved supply out of a known mint or service address.
    Mint,
    /// An ordinary holder-to-holder transfer.
    Transfer,
    /// Destroyed tokens.
    Burn,
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TxKind::Deploy => "deploy",
            TxKind::Mint => "mint",
            TxKind::Transfer => "transfer",
            TxKind::Burn => "burn",
        };
        write!(f, "{s}")
    }
}

/// One token leg of a parsed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedEntry {
    /// The address the leg pays to (or was paid from, for inputs).
    pub address: String,
    /// Atomic token amount.
    pub amount: u64,
}

/// A transaction reduced to its token-protocol content.
#[derive(Clone, Debug)]
pub struct ParsedTransaction {
    /// Display-order transaction id.
    pub txid: String,
    /// Classified role.
    pub kind: TxKind,
    /// Input-side legs; empty unless parsed with provenance.
    pub inputs: Vec<ParsedEntry>,
    /// Output-side legs in output order.
    pub outputs: Vec<ParsedEntry>,
    /// The raw transaction bytes.
    pub raw: Option<Vec<u8>>,
    /// Whether every decoded output's cosigner is empty or the
    /// configured key.
    pub valid: bool,
}

/// A fully decoded token output: owner, cosigner, operation, amount.
#[derive(Clone, Debug)]
pub(crate) struct DecodedLeg {
    pub(crate) address: String,
    pub(crate) amount: u64,
    pub(crate) cosigner: Option<[u8; 33]>,
    pub(crate) op: TokenOp,
}

/// Decode one locking script into a token leg for this config's token.
///
/// Absence (no ownership template, no envelope, a foreign token id, or a
/// malformed payload) is `None`: in normal traffic most outputs are not
/// token outputs.
pub(crate) fn decode_leg(config: &ProtocolConfig, script: &Script) -> Option<DecodedLeg> {
    let owner = decode_owner(script, config.network)?;
    let inscription = Inscription::from_script(script)?;
    let payload = Bsv20Payload::decode(&inscription)?;

    let ours = match &payload.id {
        Some(id) => *id == config.token_id,
        // Deploy payloads have no id yet; the outpoint becomes the id.
        None => payload.op == TokenOp::DeployMint,
    };
    if !ours {
        return None;
    }

    Some(DecodedLeg {
        address: owner.address.text,
        amount: payload.amount()?,
        cosigner: owner.cosigner,
        op: payload.op,
    })
}

/// Parse a transaction's outputs into token legs and classify it.
///
/// Input-side provenance is not available on this path, so the
/// classification cannot see mint origins; use
/// [`parse_with_provenance`] when the distinction matters.
pub fn parse_transaction(config: &ProtocolConfig, tx: &Tx) -> ParsedTransaction {
    let legs: Vec<DecodedLeg> = tx
        .outputs
        .iter()
        .filter_map(|o| decode_leg(config, &o.script))
        .collect();
    assemble(config, tx, legs, Vec::new())
}

/// Parse with full provenance: each input's source output is fetched and
/// decoded, and the input/output balance rule is enforced.
///
/// For non-mint flows (`transfer` and `burn`) the decoded input total
/// must equal the decoded output total; a mismatch is a
/// `ProtocolViolation`. Deploys and mints create supply and are exempt.
pub async fn parse_with_provenance<S: TxSource>(
    config: &ProtocolConfig,
    tx: &Tx,
    source: &S,
) -> Result<ParsedTransaction, EngineError> {
    let out_legs: Vec<DecodedLeg> = tx
        .outputs
        .iter()
        .filter_map(|o| decode_leg(config, &o.script))
        .collect();

    let mut in_legs = Vec::new();
    for input in &tx.inputs {
        let source_tx = source.fetch_transaction(&input.prev_txid).await?;
        let Some(spent) = source_tx.outputs.get(input.prev_vout as usize) else {
            return Err(EngineError::SourceTransactionUnavailable(format!(
                "output {} missing from {}",
                input.prev_vout, input.prev_txid
            )));
        };
        if let Some(leg) = decode_leg(config, &spent.script) {
            in_legs.push(leg);
        }
    }

    let parsed = assemble(config, tx, out_legs, in_legs);

    if matches!(parsed.kind, TxKind::Transfer | TxKind::Burn) {
        let in_total: u64 = parsed.inputs.iter().map(|e| e.amount).sum();
        let out_total: u64 = parsed.outputs.iter().map(|e| e.amount).sum();
        if in_total != out_total {
            return Err(EngineError::ProtocolViolation(format!(
                "decoded inputs ({in_total}) and outputs ({out_total}) do not balance in {}",
                parsed.txid
            )));
        }
    }

    Ok(parsed)
}

/// Assemble the parsed record: classification and baseline validity.
fn assemble(
    config: &ProtocolConfig,
    tx: &Tx,
    out_legs: Vec<DecodedLeg>,
    in_legs: Vec<DecodedLeg>,
) -> ParsedTransaction {
    let kind = classify(config, &out_legs, &in_legs);

    let valid = match config.cosigner() {
        Ok(expected) => out_legs
            .iter()
            .all(|leg| leg.cosigner.is_none() || leg.cosigner == Some(expected)),
        Err(_) => false,
    };

    ParsedTransaction {
        txid: tx.txid().to_hex(),
        kind,
        inputs: in_legs
            .into_iter()
            .map(|l| ParsedEntry { address: l.address, amount: l.amount })
            .collect(),
        outputs: out_legs
            .into_iter()
            .map(|l| ParsedEntry { address: l.address, amount: l.amount })
            .collect(),
        raw: Some(tx.to_bytes()),
        valid,
    }
}

/// Classify a transaction from its decoded legs.
///
/// Precedence: deploy (an uncosigned output at the canonical mint
/// address), then mint (supply arriving from a known mint or service
/// address), then burn (a burn operation tag), then transfer.
fn classify(config: &ProtocolConfig, out_legs: &[DecodedLeg], in_legs: &[DecodedLeg]) -> TxKind {
    if out_legs
        .iter()
        .any(|l| l.cosigner.is_none() && l.address == config.mint_address)
    {
        return TxKind::Deploy;
    }

    let known_origin = |addr: &str| {
        addr == config.mint_address || config.service_addresses.iter().any(|a| a == addr)
    };
    if in_legs.iter().any(|l| known_origin(&l.address)) {
        return TxKind::Mint;
    }

    if out_legs.iter().any(|l| l.op == TokenOp::Burn) {
        return TxKind::Burn;
    }

    TxKind::Transfer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;

    use bsv20_core::TxId;
    use bsv20_script::ownership::{cosign_lock, p2pkh_lock};
    use bsv20_script::Address;
    use bsv20_transaction::{TxInput, TxOutput};

    use crate::config::tests::{sample_config, test_address};

    struct MapSource {
        txs: HashMap<TxId, Tx>,
    }

    impl TxSource for MapSource {
        fn fetch_transaction(
            &self,
            txid: &TxId,
        ) -> impl Future<Output = Result<Tx, EngineError>> + Send {
            let result = self.txs.get(txid).cloned().ok_or_else(|| {
                EngineError::SourceTransactionUnavailable(txid.to_string())
            });
            async move { result }
        }
    }

    /// An inscribed cosign output paying `atomic` to `address`.
    fn cosign_output(config: &ProtocolConfig, address: &str, atomic: u64) -> TxOutput {
        let address = Address::from_string(address).expect("valid address");
        let cosigner = config.cosigner().expect("valid cosigner");
        let payload = Bsv20Payload::transfer(&config.token_id, atomic);
        let script = payload
            .to_inscription()
            .lock(&cosign_lock(&address, &cosigner))
            .expect("script builds");
        TxOutput::new(1, script)
    }

    /// An inscribed plain (uncosigned) output, as deploys use.
    fn plain_output(config: &ProtocolConfig, address: &str, atomic: u64, op: TokenOp) -> TxOutput {
        let address = Address::from_string(address).expect("valid address");
        let payload = Bsv20Payload {
            p: crate::payload::PROTOCOL_ID.to_string(),
            op,
            id: (op != TokenOp::DeployMint).then(|| config.token_id.clone()),
            amt: atomic.to_string(),
        };
        let script = payload
            .to_inscription()
            .lock(&p2pkh_lock(&address))
            .expect("script builds");
        TxOutput::new(1, script)
    }

    // -----------------------------------------------------------------------
    // output decoding
    // -----------------------------------------------------------------------

    /// Token outputs decode to legs; unrelated outputs are dropped.
    #[test]
    fn outputs_decode_and_filter() {
        let config = sample_config();
        let mut tx = Tx::new();
        tx.add_output(cosign_output(&config, &test_address(0xaa), 300));
        // An ordinary sats payment: no envelope, still owned.
        tx.add_output(TxOutput::new(
            5_000,
            p2pkh_lock(&Address::from_string(&test_address(0xbb)).expect("valid")),
        ));
        tx.add_output(cosign_output(&config, &test_address(0xcc), 200));

        let parsed = parse_transaction(&config, &tx);
        assert_eq!(parsed.outputs.len(), 2);
        assert_eq!(parsed.outputs[0].address, test_address(0xaa));
        assert_eq!(parsed.outputs[0].amount, 300);
        assert_eq!(parsed.outputs[1].amount, 200);
        assert_eq!(parsed.kind, TxKind::Transfer);
        assert!(parsed.valid);
        assert_eq!(parsed.raw.as_deref(), Some(&tx.to_bytes()[..]));
    }

    /// A foreign token id is dropped, not misattributed.
    #[test]
    fn foreign_token_dropped() {
        let mut config = sample_config();
        let mut tx = Tx::new();
        tx.add_output(cosign_output(&config, &test_address(0xaa), 300));
        config.token_id = "some_other_token_0".to_string();

        let parsed = parse_transaction(&config, &tx);
        assert!(parsed.outputs.is_empty());
    }

    /// An output cosigned by a foreign key decodes but fails the
    /// baseline validity flag.
    #[test]
    fn foreign_cosigner_invalid() {
        let config = sample_config();
        let address = Address::from_string(&test_address(0xaa)).expect("valid");
        let payload = Bsv20Payload::transfer(&config.token_id, 300);
        let script = payload
            .to_inscription()
            .lock(&cosign_lock(&address, &[0x03; 33]))
            .expect("script builds");

        let mut tx = Tx::new();
        tx.add_output(TxOutput::new(1, script));

        let parsed = parse_transaction(&config, &tx);
        assert_eq!(parsed.outputs.len(), 1);
        assert!(!parsed.valid);
    }

    // -----------------------------------------------------------------------
    // classification
    // -----------------------------------------------------------------------

    /// An uncosigned deploy output at the mint address is a deploy.
    #[test]
    fn classify_deploy() {
        let config = sample_config();
        let mut tx = Tx::new();
        tx.add_output(plain_output(
            &config,
            &config.mint_address.clone(),
            1_000_000,
            TokenOp::DeployMint,
        ));
        let parsed = parse_transaction(&config, &tx);
        assert_eq!(parsed.kind, TxKind::Deploy);
    }

    /// A burn operation tag classifies as burn.
    #[test]
    fn classify_burn() {
        let config = sample_config();
        let address = Address::from_string(&config.burn_address).expect("valid");
        let cosigner = config.cosigner().expect("valid");
        let payload = Bsv20Payload {
            p: crate::payload::PROTOCOL_ID.to_string(),
            op: TokenOp::Burn,
            id: Some(config.token_id.clone()),
            amt: "100".to_string(),
        };
        let script = payload
            .to_inscription()
            .lock(&cosign_lock(&address, &cosigner))
            .expect("script builds");
        let mut tx = Tx::new();
        tx.add_output(TxOutput::new(1, script));

        assert_eq!(parse_transaction(&config, &tx).kind, TxKind::Burn);
    }

    /// Supply arriving from the mint address classifies as mint under
    /// provenance.
    #[tokio::test]
    async fn classify_mint_with_provenance() {
        let config = sample_config();

        let mut fund_tx = Tx::new();
        fund_tx.add_output(cosign_output(&config, &config.mint_address.clone(), 500));

        let mut tx = Tx::new();
        let mut input = TxInput::new(fund_tx.txid(), 0);
        input.sequence = 0xffffffff;
        tx.add_input(input);
        tx.add_output(cosign_output(&config, &test_address(0xaa), 500));

        let source = MapSource {
            txs: [(fund_tx.txid(), fund_tx)].into_iter().collect(),
        };
        let parsed = parse_with_provenance(&config, &tx, &source)
            .await
            .expect("should parse");
        assert_eq!(parsed.kind, TxKind::Mint);
        assert_eq!(parsed.inputs.len(), 1);
        assert_eq!(parsed.inputs[0].amount, 500);
    }

    // -----------------------------------------------------------------------
    // balance rule
    // -----------------------------------------------------------------------

    /// A balanced transfer parses with provenance.
    #[tokio::test]
    async fn balanced_transfer_ok() {
        let config = sample_config();

        let mut fund_tx = Tx::new();
        fund_tx.add_output(cosign_output(&config, &test_address(0x10), 500));

        let mut tx = Tx::new();
        tx.add_input(TxInput::new(fund_tx.txid(), 0));
        tx.add_output(cosign_output(&config, &test_address(0xaa), 300));
        tx.add_output(cosign_output(&config, &test_address(0x10), 200));

        let source = MapSource {
            txs: [(fund_tx.txid(), fund_tx)].into_iter().collect(),
        };
        let parsed = parse_with_provenance(&config, &tx, &source)
            .await
            .expect("should parse");
        assert_eq!(parsed.kind, TxKind::Transfer);
        assert_eq!(parsed.inputs[0].amount, 500);
    }

    /// An unbalanced transfer is a ProtocolViolation.
    #[tokio::test]
    async fn unbalanced_transfer_rejected() {
        let config = sample_config();

        let mut fund_tx = Tx::new();
        fund_tx.add_output(cosign_output(&config, &test_address(0x10), 500));

        let mut tx = Tx::new();
        tx.add_input(TxInput::new(fund_tx.txid(), 0));
        // Claims more than the input carried.
        tx.add_output(cosign_output(&config, &test_address(0xaa), 700));

        let source = MapSource {
            txs: [(fund_tx.txid(), fund_tx)].into_iter().collect(),
        };
        let result = parse_with_provenance(&config, &tx, &source).await;
        assert!(matches!(result, Err(EngineError::ProtocolViolation(_))));
    }

    /// An unfetchable source transaction is a hard failure, not a
    /// silently incomplete parse.
    #[tokio::test]
    async fn missing_provenance_fails() {
        let config = sample_config();
        let mut tx = Tx::new();
        tx.add_input(TxInput::new(TxId::new([9u8; 32]), 0));
        tx.add_output(cosign_output(&config, &test_address(0xaa), 100));

        let source = MapSource { txs: HashMap::new() };
        let result = parse_with_provenance(&config, &tx, &source).await;
        assert!(matches!(
            result,
            Err(EngineError::SourceTransactionUnavailable(_))
        ));
    }
}
