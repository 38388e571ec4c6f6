//! Hash primitives used across the SDK.
//!
//! SHA-256, double SHA-256 (txids, Base58Check checksums), and Hash160
//! (address derivation from public keys).

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the double SHA-256 digest of `data`.
///
/// This is the hash used for transaction ids, signature digests, and
/// Base58Check checksums.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute Hash160: RIPEMD-160(SHA-256(`data`)).
///
/// Used to derive the 20-byte public key hash carried in locking scripts
/// and addresses.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(sha256(data));
    let digest = hasher.finalize();
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}
