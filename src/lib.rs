//! Funds Ledger - account-to-account transfers over PostgreSQL
//!
//! # Modules
//!
//! - [`money`] - Fixed-point money in cents
//! - [`error`] - Error taxonomy shared by every layer
//! - [`session`] - In-memory login sessions and the expiry sweeper
//! - [`transfer`] - Transfer validation and the transactional engine
//! - [`account`] - Account lookups (credentials, balances)
//! - [`db`] - Connection pool and schema
//! - [`gateway`] - HTTP adapter (login, transfers)
//! - [`config`] / [`logging`] - Process setup

// Core types - must be first!
pub mod core_types;

pub mod error;
pub mod money;

pub mod account;
pub mod db;
pub mod session;
pub mod transfer;

pub mod config;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use core_types::{AccountId, Token, TransferId};
pub use error::{ErrorClass, LedgerError};
pub use money::{Money, MoneyError};
pub use session::{SessionStore, SessionSweeper, SweepConfig};
pub use transfer::{Transfer, TransferEngine};
