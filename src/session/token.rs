//! Session token generation
//!
//! A token is the hex encoding of the first 8 bytes of a SHA-256 digest
//! taken over a 128-bit value drawn from the OS CSPRNG.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::core_types::Token;
use crate::error::LedgerError;

/// Digest prefix length in bytes (16 hex chars)
pub const TOKEN_BYTES: usize = 8;

/// Generate a fresh token.
///
/// Uniqueness is not guaranteed here; the store rejects collisions.
pub fn generate_token() -> Result<Token, LedgerError> {
    let mut seed = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut seed)
        .map_err(|e| {
            tracing::error!(error = %e, "OS random source failed");
            LedgerError::TokenGeneration(e.to_string())
        })?;

    let value = u128::from_le_bytes(seed);
    let digest = Sha256::digest(format!("{:x}", value).as_bytes());

    Ok(hex::encode(&digest[..TOKEN_BYTES]))
}
