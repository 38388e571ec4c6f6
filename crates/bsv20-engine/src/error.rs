/// Error kinds for engine operations.
///
/// Construction failures are returned, never thrown mid-build: a caller
/// either receives a complete transaction or an error naming what went
/// wrong, so "no transaction built" is always distinguishable from
/// "built but not yet confirmed".
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The protocol configuration could not be fetched or failed validation.
    #[error("protocol configuration unavailable: {0}")]
    ConfigUnavailable(String),

    /// A transfer amount is non-numeric, negative, too precise for the
    /// token's decimals, or sums to zero.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The candidate UTXOs ran out before covering the requested total.
    #[error("insufficient balance: need {needed} atomic units, have {available}")]
    InsufficientBalance {
        /// Atomic units required (requested total plus fee).
        needed: u64,
        /// Atomic units available across all candidates.
        available: u64,
    },

    /// No fee tier covers the requested atomic total.
    #[error("no fee tier covers {0} atomic units")]
    FeeRangeInadequate(u64),

    /// A UTXO's source transaction could not be fetched or was inconsistent.
    #[error("source transaction unavailable: {0}")]
    SourceTransactionUnavailable(String),

    /// An input is missing the value, script, or source id its signature
    /// preimage needs.
    #[error("signature preimage incomplete for input {index}: {reason}")]
    SignaturePreimageIncomplete {
        /// Index of the affected input.
        index: usize,
        /// What was missing.
        reason: String,
    },

    /// Decoded inputs and outputs do not balance, or a payload under a
    /// matched envelope marker is malformed during strict validation.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// An expected transfer does not correspond to the output at its index.
    #[error("validation mismatch at output {index}: {reason}")]
    ValidationMismatch {
        /// Index of the mismatching output.
        index: usize,
        /// What differed.
        reason: String,
    },

    /// A collaborator call failed at the transport layer.
    #[error("transport error: {0}")]
    Transport(String),

    /// Error from the core primitives crate.
    #[error("core error: {0}")]
    Core(#[from] bsv20_core::CoreError),

    /// Error from the script crate.
    #[error("script error: {0}")]
    Script(#[from] bsv20_script::ScriptError),

    /// Error from the transaction crate.
    #[error("transaction error: {0}")]
    Transaction(#[from] bsv20_transaction::TransactionError),
}
