/// Error types for core primitive operations.
///
/// Covers wire decoding, hex/Base58 parsing, and key or signature
/// construction failures.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The input ended before a complete value could be read.
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// Hex decoding failed.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// A transaction id string or byte slice had the wrong shape.
    #[error("invalid transaction id: {0}")]
    InvalidTxId(String),

    /// A private key could not be constructed from the given material.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// A public key could not be constructed from the given material.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// A WIF string failed Base58Check decoding or had a bad prefix.
    #[error("invalid WIF: {0}")]
    InvalidWif(String),

    /// ECDSA signing or signature decoding failed.
    #[error("signature error: {0}")]
    InvalidSignature(String),
}
