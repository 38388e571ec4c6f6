/// Error types for script operations.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Hex decoding failed.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// A push opcode claimed more data than the script contains.
    #[error("truncated push at byte {0}")]
    TruncatedPush(usize),

    /// Push data exceeds the maximum encodable length.
    #[error("push data too large: {0} bytes")]
    PushTooLarge(usize),

    /// An address string failed Base58 decoding or had the wrong length.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// An address's Base58Check checksum did not match.
    #[error("address checksum mismatch")]
    ChecksumMismatch,

    /// An address version byte is neither mainnet nor testnet P2PKH.
    #[error("unsupported address version 0x{0:02x}")]
    UnsupportedVersion(u8),

    /// Error from the core primitives crate.
    #[error("core error: {0}")]
    Core(#[from] bsv20_core::CoreError),
}
