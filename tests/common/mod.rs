//! Shared fixtures for the PostgreSQL integration tests.
//!
//! Every test creates its own accounts, so tests can share one database and
//! run in parallel.

#![allow(dead_code)]

use funds_ledger::account::hash_secret;
use funds_ledger::db::Database;
use funds_ledger::{AccountId, Money};

pub const MISSING_ACCOUNT: AccountId = i32::MAX;

pub fn test_database_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://postgres@localhost/ledger_test".to_string())
}

/// Connect and make sure the tables exist
pub async fn setup_db() -> Database {
    let db = Database::connect(&test_database_url(), 16)
        .await
        .expect("Failed to connect to test database");

    db.apply_schema().await.expect("Failed to apply schema");

    db
}

/// Random cpf in `NNN.NNN-NN` form
pub fn random_cpf() -> String {
    let n: u32 = rand::random::<u32>() % 100_000_000;
    format!("{:03}.{:03}-{:02}", n / 100_000, (n / 100) % 1000, n % 100)
}

pub fn money(s: &str) -> Money {
    s.parse().unwrap()
}

/// Insert an account and return its id
pub async fn create_account(db: &Database, secret: &str, balance: Money) -> (AccountId, String) {
    let cpf = random_cpf();
    let id = sqlx::query_scalar::<_, AccountId>(
        r#"
        INSERT INTO accounts (name, cpf, secret, balance)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(format!("test-{}", cpf))
    .bind(&cpf)
    .bind(hash_secret(secret))
    .bind(balance)
    .fetch_one(db.pool())
    .await
    .expect("Failed to create account");
    (id, cpf)
}

pub async fn balance_of(db: &Database, id: AccountId) -> Money {
    funds_ledger::account::AccountRepository::balance(db.pool(), id)
        .await
        .unwrap()
        .expect("account exists")
}

pub async fn transfer_count(db: &Database, origin_id: AccountId) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM transfers WHERE origin_id = $1")
        .bind(origin_id)
        .fetch_one(db.pool())
        .await
        .unwrap()
}
