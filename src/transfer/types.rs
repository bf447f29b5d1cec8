//! Transfer types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core_types::{AccountId, TransferId};
use crate::money::Money;

/// Committed transfer, read back from the transfers table after insert.
/// Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transfer {
    pub id: TransferId,
    #[serde(rename = "account_origin_id")]
    pub origin_id: AccountId,
    #[serde(rename = "account_destination_id")]
    pub destination_id: AccountId,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

/// Client transfer request. The origin comes from the session, never the body.
///
/// Missing fields default to zero and are rejected by validation with the
/// matching error (`ZeroAmount`, `BadDestinationId`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TransferRequest {
    #[serde(rename = "account_destination_id", default)]
    pub destination_id: AccountId,
    #[serde(default)]
    pub amount: Money,
}

/// Which side of a transfer a locked row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Origin,
    Destination,
}

/// Balances to write once every check has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancePlan {
    pub origin: Money,
    pub destination: Money,
}
