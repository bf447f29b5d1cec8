//! Transfer parameter checks and balance planning
//!
//! Everything here is pure: it runs before (validation) or inside (planning)
//! the transaction without touching the database.

use super::types::{BalancePlan, Role};
use crate::core_types::AccountId;
use crate::error::LedgerError;
use crate::money::Money;

/// Check caller-supplied parameters. Runs before any database work.
pub fn validate_transfer(
    origin_id: AccountId,
    destination_id: AccountId,
    amount: Money,
) -> Result<(), LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if amount.is_negative() {
        return Err(LedgerError::InvalidAmount(
            "amount must not be negative".to_string(),
        ));
    }
    // Ids are assigned from 1
    if destination_id <= 0 {
        return Err(LedgerError::BadDestinationId);
    }
    if origin_id <= 0 {
        return Err(LedgerError::NoOriginAccount);
    }
    // Would read both balances before either write and credit money that
    // was never debited
    if origin_id == destination_id {
        return Err(LedgerError::SameAccount);
    }
    Ok(())
}

/// Row lock acquisition order: ascending account id, whatever the direction.
///
/// Two transfers A->B and B->A then both lock min(A, B) first and cannot
/// deadlock on each other.
pub fn lock_order(origin_id: AccountId, destination_id: AccountId) -> [(AccountId, Role); 2] {
    if origin_id <= destination_id {
        [(origin_id, Role::Origin), (destination_id, Role::Destination)]
    } else {
        [(destination_id, Role::Destination), (origin_id, Role::Origin)]
    }
}

/// Compute post-transfer balances from the locked balances.
pub fn plan_balances(
    origin_balance: Money,
    destination_balance: Money,
    amount: Money,
) -> Result<BalancePlan, LedgerError> {
    if origin_balance < amount {
        return Err(LedgerError::InsufficientFunds);
    }

    let origin = origin_balance
        .checked_sub(amount)
        .map_err(|_| LedgerError::InsufficientFunds)?;
    let destination = destination_balance
        .checked_add(amount)
        .map_err(|_| LedgerError::AmountTooLarge)?;

    Ok(BalancePlan {
        origin,
        destination,
    })
}
