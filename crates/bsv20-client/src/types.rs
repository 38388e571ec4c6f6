//! Client configuration and service DTOs.

use bsv20_core::TxId;
use bsv20_engine::{EngineError, Outpoint, TokenOp, TokenUtxo};
use bsv20_script::Script;
use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Configuration for a [`TokenServiceClient`](crate::TokenServiceClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the token service (e.g. `https://api.example.com`).
    pub base_url: String,
    /// Optional bearer token sent via the `Authorization` header.
    pub api_key: Option<String>,
    /// API version prefix.
    pub api_version: String,
}

impl ClientConfig {
    /// A configuration for the given base URL with defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            api_key: None,
            api_version: "v1".to_string(),
        }
    }
}

/// A UTXO as listed by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtxoDto {
    /// Display-order transaction id.
    pub txid: String,
    /// Output index.
    pub vout: u32,
    /// Holder address.
    #[serde(default)]
    pub address: String,
    /// Atomic token amount as a decimal string.
    pub amt: String,
    /// Protocol operation tag.
    pub op: String,
    /// Satoshi value of the output.
    #[serde(default)]
    pub satoshis: u64,
    /// Hex-encoded locking script.
    #[serde(default)]
    pub script: String,
}

impl UtxoDto {
    /// Convert the listing entry into an engine UTXO.
    pub fn into_utxo(self) -> Result<TokenUtxo, ClientError> {
        let txid = TxId::from_hex(&self.txid)
            .map_err(|e| ClientError::InvalidField(format!("txid: {e}")))?;
        let amount = self
            .amt
            .parse::<u64>()
            .map_err(|e| ClientError::InvalidField(format!("amt {:?}: {e}", self.amt)))?;
        let op = TokenOp::from_tag(&self.op)
            .ok_or_else(|| ClientError::InvalidField(format!("unknown op {:?}", self.op)))?;
        let script = Script::from_hex(&self.script)
            .map_err(|e| ClientError::InvalidField(format!("script: {e}")))?;

        Ok(TokenUtxo {
            outpoint: Outpoint { txid, vout: self.vout },
            address: self.address,
            amount,
            op,
            satoshis: self.satoshis,
            script,
            source_tx: None,
        })
    }
}

/// A raw transaction response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTxDto {
    /// Display-order transaction id.
    #[serde(default)]
    pub txid: String,
    /// Hex-encoded raw transaction.
    pub rawtx: String,
}

/// A cosign or broadcast submission body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTxDto {
    /// Hex-encoded raw transaction.
    pub rawtx: String,
}

/// The broadcast endpoint's response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastDto {
    /// Id the network knows the transaction by.
    #[serde(default)]
    pub txid: String,
    /// Server-side status string.
    #[serde(default)]
    pub status: Option<String>,
    /// Rejection detail, when the network refused the transaction.
    #[serde(default)]
    pub error: Option<String>,
}

/// Map a client error onto the engine's transport kinds.
pub(crate) fn transport_error(err: ClientError) -> EngineError {
    EngineError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A complete listing entry converts to an engine UTXO.
    #[test]
    fn utxo_dto_converts() {
        let dto = UtxoDto {
            txid: "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
                .to_string(),
            vout: 1,
            address: "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr".to_string(),
            amt: "50000".to_string(),
            op: "transfer".to_string(),
            satoshis: 1,
            script: "76a914e2a623699e81b291c0327f408fea765d534baa2a88ac".to_string(),
        };
        let utxo = dto.into_utxo().expect("should convert");
        assert_eq!(utxo.amount, 50_000);
        assert_eq!(utxo.op, TokenOp::Transfer);
        assert_eq!(utxo.outpoint.vout, 1);
    }

    /// A non-integer amount is rejected.
    #[test]
    fn bad_amount_rejected() {
        let dto = UtxoDto {
            txid: "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
                .to_string(),
            vout: 0,
            address: String::new(),
            amt: "1.5".to_string(),
            op: "transfer".to_string(),
            satoshis: 1,
            script: String::new(),
        };
        assert!(dto.into_utxo().is_err());
    }

    /// An unknown operation tag is rejected.
    #[test]
    fn bad_op_rejected() {
        let dto = UtxoDto {
            txid: "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
                .to_string(),
            vout: 0,
            address: String::new(),
            amt: "1".to_string(),
            op: "freeze".to_string(),
            satoshis: 1,
            script: String::new(),
        };
        assert!(dto.into_utxo().is_err());
    }
}
