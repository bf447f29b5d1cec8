//! Repository layer for account reads

use super::models::AccountCredentials;
use super::validation::Cpf;
use crate::core_types::AccountId;
use crate::money::Money;
use sqlx::PgPool;

/// Read-only account queries
pub struct AccountRepository;

impl AccountRepository {
    /// Get login credentials by CPF
    pub async fn find_credentials(
        pool: &PgPool,
        cpf: &Cpf,
    ) -> Result<Option<AccountCredentials>, sqlx::Error> {
        sqlx::query_as::<_, AccountCredentials>("SELECT id, secret FROM accounts WHERE cpf = $1")
            .bind(cpf.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Current committed balance of an account
    pub async fn balance(pool: &PgPool, id: AccountId) -> Result<Option<Money>, sqlx::Error> {
        sqlx::query_scalar::<_, Money>("SELECT balance FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
