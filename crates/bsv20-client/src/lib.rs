//! HTTP collaborators for the BSV-20 cosign SDK.
//!
//! [`TokenServiceClient`] implements all five engine collaborator
//! traits over the token service's JSON API: configuration, UTXO
//! listings, raw transactions, cosigning, and broadcast.

pub mod client;
pub mod types;

mod error;
pub use client::TokenServiceClient;
pub use error::ClientError;
pub use types::ClientConfig;
