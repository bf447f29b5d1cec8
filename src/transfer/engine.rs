//! Transfer Engine
//!
//! Moves funds between two accounts in one PostgreSQL transaction:
//!
//! ```text
//! BEGIN (READ COMMITTED, READ WRITE)
//!   SELECT balance ... FOR UPDATE    -- lower account id first
//!   SELECT balance ... FOR UPDATE    -- then the higher one
//!   check funds / overflow
//!   UPDATE origin, UPDATE destination  -- exactly one row each
//!   INSERT transfer RETURNING id; SELECT it back
//! COMMIT
//! ```
//!
//! PostgreSQL is MVCC: without the explicit row locks two concurrent
//! transfers touching the same account could both read the old balance and
//! one update would be lost. With them, conflicting transfers serialize on
//! the lock manager and disjoint ones run in parallel.
//!
//! Under READ COMMITTED a `FOR UPDATE` that waited for a lock returns the
//! row as committed by the previous holder, so every balance read here is
//! current. Under REPEATABLE READ the same wait ends in SQLSTATE 40001
//! instead, and a queued debit would fail rather than see the new balance.
//!
//! Every failure rolls the transaction back before returning. Nothing is
//! retried here.

use sqlx::{PgConnection, PgPool};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::types::{Role, Transfer};
use super::validation::{lock_order, plan_balances, validate_transfer};
use crate::core_types::{AccountId, TransferId};
use crate::error::{ErrorClass, LedgerError};
use crate::money::Money;

/// SQLSTATE codes for backend conflicts that abort a transaction
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Transfer engine over the shared connection pool
#[derive(Clone)]
pub struct TransferEngine {
    pool: PgPool,
    timeout: Option<Duration>,
}

impl TransferEngine {
    /// Create an engine without a deadline
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: None,
        }
    }

    /// Bound each transfer. On expiry the in-flight transaction is dropped
    /// uncommitted, which rolls it back.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Move `amount` from `origin_id` to `destination_id`.
    ///
    /// Dropping the returned future (client disconnect, outer timeout)
    /// abandons the transaction before commit.
    pub async fn transfer(
        &self,
        origin_id: AccountId,
        destination_id: AccountId,
        amount: Money,
    ) -> Result<Transfer, LedgerError> {
        validate_transfer(origin_id, destination_id, amount)?;

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.execute(origin_id, destination_id, amount))
                .await
                .unwrap_or_else(|_| {
                    Err(LedgerError::Internal(format!(
                        "transfer deadline of {:?} exceeded",
                        limit
                    )))
                }),
            None => self.execute(origin_id, destination_id, amount).await,
        };

        match &result {
            Ok(transfer) => info!(
                transfer_id = transfer.id,
                origin_id,
                destination_id,
                amount = %amount,
                "Transfer committed"
            ),
            Err(e) if e.class() == ErrorClass::Internal => error!(
                origin_id,
                destination_id,
                amount = %amount,
                error = %e,
                "Transfer failed"
            ),
            Err(e) => debug!(
                origin_id,
                destination_id,
                amount = %amount,
                code = e.code(),
                "Transfer rejected"
            ),
        }

        result
    }

    async fn execute(
        &self,
        origin_id: AccountId,
        destination_id: AccountId,
        amount: Money,
    ) -> Result<Transfer, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(backend_error)?;

        match apply(&mut tx, origin_id, destination_id, amount).await {
            Ok(transfer) => {
                tx.commit().await.map_err(|e| {
                    warn!(transfer_id = transfer.id, error = %e, "Commit failed");
                    backend_error(e)
                })?;
                Ok(transfer)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    warn!(origin_id, destination_id, error = %rb, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}

/// The transactional body. Caller owns commit/rollback.
async fn apply(
    conn: &mut PgConnection,
    origin_id: AccountId,
    destination_id: AccountId,
    amount: Money,
) -> Result<Transfer, LedgerError> {
    sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED, READ WRITE")
        .execute(&mut *conn)
        .await
        .map_err(backend_error)?;

    let mut origin_balance = None;
    let mut destination_balance = None;

    for (account_id, role) in lock_order(origin_id, destination_id) {
        let balance = lock_balance(conn, account_id).await?;
        match role {
            Role::Origin => origin_balance = balance,
            Role::Destination => destination_balance = balance,
        }
    }

    let origin_balance = origin_balance.ok_or(LedgerError::NoOriginAccount)?;
    let destination_balance = destination_balance.ok_or(LedgerError::NoDestinationAccount)?;

    let plan = plan_balances(origin_balance, destination_balance, amount)?;

    update_balance(conn, origin_id, plan.origin).await?;
    update_balance(conn, destination_id, plan.destination).await?;

    let transfer_id = insert_transfer(conn, origin_id, destination_id, amount).await?;
    fetch_transfer(conn, transfer_id).await
}

/// Lock an account row and read its balance. `None` if the row is absent.
async fn lock_balance(
    conn: &mut PgConnection,
    account_id: AccountId,
) -> Result<Option<Money>, LedgerError> {
    sqlx::query_scalar::<_, Money>("SELECT balance FROM accounts WHERE id = $1 FOR UPDATE")
        .bind(account_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(backend_error)
}

async fn update_balance(
    conn: &mut PgConnection,
    account_id: AccountId,
    balance: Money,
) -> Result<(), LedgerError> {
    let result = sqlx::query("UPDATE accounts SET balance = $1 WHERE id = $2")
        .bind(balance)
        .bind(account_id)
        .execute(&mut *conn)
        .await
        .map_err(backend_error)?;

    // The row is locked, so anything but one row means the table changed
    // under us
    if result.rows_affected() != 1 {
        return Err(LedgerError::Internal(format!(
            "unexpected number of affected rows updating account {}: {}",
            account_id,
            result.rows_affected()
        )));
    }
    Ok(())
}

async fn insert_transfer(
    conn: &mut PgConnection,
    origin_id: AccountId,
    destination_id: AccountId,
    amount: Money,
) -> Result<TransferId, LedgerError> {
    sqlx::query_scalar::<_, TransferId>(
        r#"
        INSERT INTO transfers (origin_id, destination_id, amount, created_at)
        VALUES ($1, $2, $3, NOW())
        RETURNING id
        "#,
    )
    .bind(origin_id)
    .bind(destination_id)
    .bind(amount)
    .fetch_one(&mut *conn)
    .await
    .map_err(backend_error)
}

/// Read the inserted row back so defaults and generated columns are exact
async fn fetch_transfer(
    conn: &mut PgConnection,
    transfer_id: TransferId,
) -> Result<Transfer, LedgerError> {
    sqlx::query_as::<_, Transfer>(
        r#"
        SELECT id, origin_id, destination_id, amount, created_at
        FROM transfers
        WHERE id = $1
        "#,
    )
    .bind(transfer_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(backend_error)
}

/// Convert a sqlx error, noting backend conflicts separately in the log
fn backend_error(e: sqlx::Error) -> LedgerError {
    if let Some(code) = e.as_database_error().and_then(|db| db.code()) {
        if code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED {
            warn!(sqlstate = %code, error = %e, "Transfer aborted by backend conflict");
        }
    }
    LedgerError::from(e)
}
