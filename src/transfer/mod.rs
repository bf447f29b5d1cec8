//! Funds transfer module
//!
//! - `types`: Transfer record and client request
//! - `validation`: parameter checks, lock ordering, balance planning
//! - `engine`: the row-locked PostgreSQL transaction

pub mod engine;
pub mod types;
pub mod validation;

pub use engine::TransferEngine;
pub use types::{BalancePlan, Role, Transfer, TransferRequest};
pub use validation::{lock_order, plan_balances, validate_transfer};
