//! The token service HTTP client.
//!
//! One client instance serves all five collaborator roles. The protocol
//! configuration is fetched lazily on first use and cached for the
//! client's lifetime; concurrent first calls may race into duplicate
//! fetches, which is harmless because the configuration is identical
//! across fetches and immutable once cached.

use std::future::Future;

use bsv20_core::TxId;
use bsv20_engine::traits::{
    Broadcaster, BroadcastResult, ConfigSource, CosignService, TxSource, UtxoSource,
};
use bsv20_engine::{EngineError, ProtocolConfig, TokenOp, TokenUtxo};
use bsv20_transaction::Tx;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tokio::sync::OnceCell;

use crate::types::{transport_error, BroadcastDto, ClientConfig, RawTxDto, SubmitTxDto, UtxoDto};
use crate::ClientError;

/// HTTP client for the token service API.
#[derive(Debug)]
pub struct TokenServiceClient {
    /// Client configuration.
    config: ClientConfig,
    /// Underlying HTTP client.
    http: reqwest::Client,
    /// The protocol configuration, fetched once per client.
    protocol_config: OnceCell<ProtocolConfig>,
}

impl TokenServiceClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        TokenServiceClient {
            config,
            http: reqwest::Client::new(),
            protocol_config: OnceCell::new(),
        }
    }

    /// The protocol configuration, fetched and validated on first call
    /// and served from the cache afterwards.
    pub async fn protocol_config(&self) -> Result<&ProtocolConfig, EngineError> {
        self.protocol_config
            .get_or_try_init(|| async {
                let config: ProtocolConfig = self
                    .get_json("config")
                    .await
                    .map_err(|e| EngineError::ConfigUnavailable(e.to_string()))?;
                config.validate()?;
                Ok(config)
            })
            .await
    }

    /// Fetch a raw transaction by display-order txid.
    pub async fn raw_transaction(&self, txid: &str) -> Result<Tx, ClientError> {
        let dto: RawTxDto = self.get_json(&format!("tx/{txid}")).await?;
        Tx::from_hex(&dto.rawtx)
            .map_err(|e| ClientError::InvalidField(format!("rawtx: {e}")))
    }

    /// Fetch token UTXOs for a set of addresses.
    pub async fn utxos(
        &self,
        addresses: &[String],
        ops: &[TokenOp],
    ) -> Result<Vec<TokenUtxo>, ClientError> {
        let mut utxos = Vec::new();
        for address in addresses {
            let path = if ops.is_empty() {
                format!("utxos/{address}")
            } else {
                let tags: Vec<&str> = ops.iter().map(TokenOp::as_tag).collect();
                format!("utxos/{address}?ops={}", tags.join(","))
            };
            let listed: Vec<UtxoDto> = self.get_json(&path).await?;
            for dto in listed {
                utxos.push(dto.into_utxo()?);
            }
        }
        Ok(utxos)
    }

    /// Submit a partially signed transaction for cosigning.
    pub async fn cosign_transaction(&self, tx: &Tx) -> Result<Tx, ClientError> {
        let dto: RawTxDto = self
            .post_json("cosign", &SubmitTxDto { rawtx: tx.to_hex() })
            .await?;
        Tx::from_hex(&dto.rawtx)
            .map_err(|e| ClientError::InvalidField(format!("rawtx: {e}")))
    }

    /// Broadcast a fully signed transaction.
    pub async fn broadcast_transaction(&self, tx: &Tx) -> Result<BroadcastDto, ClientError> {
        let dto: BroadcastDto = self
            .post_json("broadcast", &SubmitTxDto { rawtx: tx.to_hex() })
            .await?;
        if let Some(detail) = &dto.error {
            return Err(ClientError::Rejected(detail.clone()));
        }
        Ok(dto)
    }

    /// Perform a GET and decode the JSON response.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let resp = self
            .http
            .get(&url)
            .headers(self.headers())
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// Perform a POST with a JSON body and decode the JSON response.
    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let resp = self
            .http
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(ClientError::NotFound(resp.url().path().to_string()));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url, self.config.api_version, path
        )
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.config.api_key {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {key}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }
}

impl ConfigSource for TokenServiceClient {
    fn fetch_config(
        &self,
    ) -> impl Future<Output = Result<ProtocolConfig, EngineError>> + Send {
        async { self.protocol_config().await.cloned() }
    }
}

impl UtxoSource for TokenServiceClient {
    fn fetch_utxos(
        &self,
        addresses: &[String],
        ops: &[TokenOp],
    ) -> impl Future<Output = Result<Vec<TokenUtxo>, EngineError>> + Send {
        let addresses = addresses.to_vec();
        let ops = ops.to_vec();
        async move {
            self.utxos(&addresses, &ops)
                .await
                .map_err(transport_error)
        }
    }
}

impl TxSource for TokenServiceClient {
    fn fetch_transaction(
        &self,
        txid: &TxId,
    ) -> impl Future<Output = Result<Tx, EngineError>> + Send {
        let txid = txid.to_hex();
        async move {
            self.raw_transaction(&txid)
                .await
                .map_err(|e| EngineError::SourceTransactionUnavailable(e.to_string()))
        }
    }
}

impl CosignService for TokenServiceClient {
    fn cosign(&self, tx: &Tx) -> impl Future<Output = Result<Tx, EngineError>> + Send {
        let tx = tx.clone();
        async move {
            self.cosign_transaction(&tx)
                .await
                .map_err(transport_error)
        }
    }
}

impl Broadcaster for TokenServiceClient {
    fn broadcast(
        &self,
        tx: &Tx,
    ) -> impl Future<Output = Result<BroadcastResult, EngineError>> + Send {
        let tx = tx.clone();
        async move {
            match self.broadcast_transaction(&tx).await {
                Ok(dto) => Ok(BroadcastResult {
                    txid: dto.txid,
                    accepted: true,
                    message: dto.status,
                }),
                Err(ClientError::Rejected(detail)) => Ok(BroadcastResult {
                    txid: tx.txid().to_hex(),
                    accepted: false,
                    message: Some(detail),
                }),
                Err(e) => Err(transport_error(e)),
            }
        }
    }
}
