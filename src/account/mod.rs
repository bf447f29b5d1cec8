//! Account access module
//!
//! The ledger never creates or deletes accounts. This module only reads what
//! login and balance checks need from the `accounts` table.

pub mod models;
pub mod repository;
pub mod validation;

// Re-export commonly used types
pub use models::{AccountCredentials, hash_secret};
pub use repository::AccountRepository;
pub use validation::Cpf;

// Re-export Database from top-level db module
pub use crate::db::Database;
