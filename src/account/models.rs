//! Data models for account access

use sha2::{Digest, Sha256};

use crate::core_types::AccountId;

/// Login material for one account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountCredentials {
    pub id: AccountId,
    /// Hex-encoded SHA-256 of the account secret
    pub secret: String,
}

impl AccountCredentials {
    /// Compare a presented secret against the stored hash
    pub fn verify(&self, secret: &str) -> bool {
        hash_secret(secret) == self.secret.trim()
    }
}

/// Hex-encoded SHA-256 of a secret, the form stored in `accounts.secret`
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}
