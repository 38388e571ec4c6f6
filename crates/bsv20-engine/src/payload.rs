//! The token payload carried inside inscription envelopes.
//!
//! A payload is the JSON object
//! `{"p":"bsv-20","op":...,"id":...,"amt":"<atomic units>"}`. Decoding
//! fails closed: unknown fields, missing required fields, a wrong
//! protocol tag, or a non-integer amount all yield absence. The engine
//! never guesses at a half-recognized payload.

use bsv20_script::Inscription;
use serde::{Deserialize, Serialize};

/// The protocol identifier in every payload's `p` field.
pub const PROTOCOL_ID: &str = "bsv-20";

/// Content type of token payload inscriptions.
pub const TOKEN_CONTENT_TYPE: &str = "application/bsv-20";

/// The protocol operation a payload (or UTXO) carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenOp {
    /// Move tokens between holders.
    #[serde(rename = "transfer")]
    Transfer,
    /// Create the token and mint its supply in one step.
    #[serde(rename = "deploy+mint")]
    DeployMint,
    /// Destroy tokens.
    #[serde(rename = "burn")]
    Burn,
}

impl TokenOp {
    /// Parse the wire tag used by UTXO listings.
    pub fn from_tag(tag: &str) -> Option<TokenOp> {
        match tag {
            "transfer" => Some(TokenOp::Transfer),
            "deploy+mint" => Some(TokenOp::DeployMint),
            "burn" => Some(TokenOp::Burn),
            _ => None,
        }
    }

    /// The wire tag for this operation.
    pub fn as_tag(&self) -> &'static str {
        match self {
            TokenOp::Transfer => "transfer",
            TokenOp::DeployMint => "deploy+mint",
            TokenOp::Burn => "burn",
        }
    }
}

impl std::fmt::Display for TokenOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// A decoded token payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bsv20Payload {
    /// Protocol identifier; always [`PROTOCOL_ID`].
    pub p: String,
    /// The operation this payload performs.
    pub op: TokenOp,
    /// Token id; absent only on deploy payloads, which create the id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Atomic amount as a decimal string.
    pub amt: String,
}

impl Bsv20Payload {
    /// Build a transfer payload for `atomic` units of `token_id`.
    pub fn transfer(token_id: &str, atomic: u64) -> Self {
        Bsv20Payload {
            p: PROTOCOL_ID.to_string(),
            op: TokenOp::Transfer,
            id: Some(token_id.to_string()),
            amt: atomic.to_string(),
        }
    }

    /// The atomic amount, if `amt` is a plain base-10 integer.
    pub fn amount(&self) -> Option<u64> {
        self.amt.parse::<u64>().ok()
    }

    /// Encode this payload as an inscription.
    pub fn to_inscription(&self) -> Inscription {
        // serde_json cannot fail on this struct: string keys, no maps.
        let json = serde_json::to_vec(self).unwrap_or_default();
        Inscription::new(TOKEN_CONTENT_TYPE, json)
    }

    /// Decode a payload from an inscription, failing closed.
    ///
    /// Requires the token content type, a parseable JSON body with no
    /// unknown fields, the `bsv-20` protocol tag, and an integer `amt`.
    pub fn decode(inscription: &Inscription) -> Option<Bsv20Payload> {
        if inscription.content_type != TOKEN_CONTENT_TYPE {
            return None;
        }
        let payload: Bsv20Payload = serde_json::from_slice(&inscription.payload).ok()?;
        if payload.p != PROTOCOL_ID {
            return None;
        }
        payload.amount()?;
        Some(payload)
    }
}
