//! Base58Check P2PKH addresses.

use std::fmt;

use bsv20_core::hash::{hash160, sha256d};
use serde::{Deserialize, Serialize};

use crate::ScriptError;

/// Mainnet P2PKH version byte.
const MAINNET_VERSION: u8 = 0x00;
/// Testnet P2PKH version byte.
const TESTNET_VERSION: u8 = 0x6f;

/// Network discriminator for address encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Mainnet (version byte 0x00, addresses start with '1').
    Mainnet,
    /// Testnet (version byte 0x6f, addresses start with 'm' or 'n').
    Testnet,
}

impl Default for Network {
    fn default() -> Self {
        Network::Mainnet
    }
}

/// A P2PKH address: the 20-byte public key hash plus its network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The Base58Check string form.
    pub text: String,
    /// The 20-byte Hash160 of the public key.
    pub hash160: [u8; 20],
    /// The network the address encodes for.
    pub network: Network,
}

impl Address {
    /// Parse a Base58Check address string, validating the checksum and
    /// version byte.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let decoded = bs58::decode(addr)
            .into_vec()
            .map_err(|e| ScriptError::InvalidAddress(format!("{addr}: {e}")))?;

        if decoded.len() != 25 {
            return Err(ScriptError::InvalidAddress(format!(
                "{addr}: decoded to {} bytes",
                decoded.len()
            )));
        }

        let checksum = sha256d(&decoded[..21]);
        if decoded[21..] != checksum[..4] {
            return Err(ScriptError::ChecksumMismatch);
        }

        let network = match decoded[0] {
            MAINNET_VERSION => Network::Mainnet,
            TESTNET_VERSION => Network::Testnet,
            other => return Err(ScriptError::UnsupportedVersion(other)),
        };

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&decoded[1..21]);

        Ok(Address {
            text: addr.to_string(),
            hash160: hash,
            network,
        })
    }

    /// Build an address from a 20-byte public key hash.
    pub fn from_hash160(hash: [u8; 20], network: Network) -> Self {
        let version = match network {
            Network::Mainnet => MAINNET_VERSION,
            Network::Testnet => TESTNET_VERSION,
        };

        let mut payload = Vec::with_capacity(25);
        payload.push(version);
        payload.extend_from_slice(&hash);
        let checksum = sha256d(&payload);
        payload.extend_from_slice(&checksum[..4]);

        Address {
            text: bs58::encode(payload).into_string(),
            hash160: hash,
            network,
        }
    }

    /// Build an address from SEC1 public key bytes.
    pub fn from_public_key(pubkey: &[u8], network: Network) -> Self {
        Self::from_hash160(hash160(pubkey), network)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
