//! secp256k1 keys and ECDSA signatures.
//!
//! Thin wrappers over `k256` covering what the signing path needs: private
//! key import from hex or WIF, compressed public key export, RFC6979
//! deterministic signing with low-S normalization, and DER encoding.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::hash::{hash160, sha256d};
use crate::CoreError;

/// WIF version byte for mainnet private keys.
const WIF_MAINNET: u8 = 0x80;
/// WIF version byte for testnet private keys.
const WIF_TESTNET: u8 = 0xef;

/// A secp256k1 private key.
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Construct from a 32-byte scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the bytes form a valid non-zero scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| CoreError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Construct from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Construct from a Wallet Import Format string.
    ///
    /// Accepts both compressed (38-byte payload) and uncompressed (37-byte
    /// payload) encodings for mainnet and testnet version bytes.
    pub fn from_wif(wif: &str) -> Result<Self, CoreError> {
        let decoded = bs58::decode(wif)
            .into_vec()
            .map_err(|e| CoreError::InvalidWif(e.to_string()))?;

        if decoded.len() != 37 && decoded.len() != 38 {
            return Err(CoreError::InvalidWif(format!(
                "unexpected length {}",
                decoded.len()
            )));
        }

        let (payload, checksum) = decoded.split_at(decoded.len() - 4);
        if sha256d(payload)[..4] != *checksum {
            return Err(CoreError::InvalidWif("checksum mismatch".to_string()));
        }

        if payload[0] != WIF_MAINNET && payload[0] != WIF_TESTNET {
            return Err(CoreError::InvalidWif(format!(
                "unknown version byte 0x{:02x}",
                payload[0]
            )));
        }

        // 38-byte encodings carry a trailing 0x01 compression marker.
        if payload.len() == 34 && payload[33] != 0x01 {
            return Err(CoreError::InvalidWif("bad compression marker".to_string()));
        }

        Self::from_bytes(&payload[1..33])
    }

    /// The 32-byte scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes().into()
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: *self.inner.verifying_key(),
        }
    }

    /// Sign a 32-byte digest with deterministic RFC6979 nonces.
    ///
    /// The resulting signature is low-S normalized so the DER encoding is
    /// accepted by consensus rules.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<EcdsaSignature, CoreError> {
        let (sig, _recovery) = self
            .inner
            .sign_prehash_recoverable(digest)
            .map_err(|e| CoreError::InvalidSignature(e.to_string()))?;
        let sig = sig.normalize_s().unwrap_or(sig);
        Ok(EcdsaSignature { inner: sig })
    }
}

/// A secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Construct from SEC1 bytes (33-byte compressed or 65-byte uncompressed).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| CoreError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Construct from a hex-encoded SEC1 string.
    pub fn from_hex(hex_str: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// The 33-byte compressed SEC1 encoding.
    pub fn to_compressed(&self) -> [u8; 33] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Hex of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Hash160 of the compressed encoding, as used in locking scripts.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Verify an ECDSA signature over a 32-byte digest.
    pub fn verify(&self, digest: &[u8; 32], sig: &EcdsaSignature) -> bool {
        self.inner.verify_prehash(digest, &sig.inner).is_ok()
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// An ECDSA signature over secp256k1.
#[derive(Clone, PartialEq, Eq)]
pub struct EcdsaSignature {
    inner: k256::ecdsa::Signature,
}

impl EcdsaSignature {
    /// Decode from DER bytes.
    pub fn from_der(bytes: &[u8]) -> Result<Self, CoreError> {
        let inner = k256::ecdsa::Signature::from_der(bytes)
            .map_err(|e| CoreError::InvalidSignature(e.to_string()))?;
        Ok(EcdsaSignature { inner })
    }

    /// Encode as DER bytes.
    pub fn to_der(&self) -> Vec<u8> {
        self.inner.to_der().as_bytes().to_vec()
    }
}

impl std::fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EcdsaSignature({})", hex::encode(self.to_der()))
    }
}
