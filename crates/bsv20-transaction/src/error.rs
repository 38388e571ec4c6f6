/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The byte stream does not decode as a transaction.
    #[error("malformed transaction: {0}")]
    Malformed(String),

    /// An input index was outside the transaction's input list.
    #[error("input index {index} out of range (tx has {count} inputs)")]
    InputOutOfRange {
        /// The requested input index.
        index: usize,
        /// The number of inputs in the transaction.
        count: usize,
    },

    /// An input is missing the funding information needed for signing.
    #[error("input {0} has no source output information")]
    MissingSourceOutput(usize),

    /// Error from the core primitives crate.
    #[error("core error: {0}")]
    Core(#[from] bsv20_core::CoreError),

    /// Error from the script crate.
    #[error("script error: {0}")]
    Script(#[from] bsv20_script::ScriptError),
}
