//! Core types used throughout the system
//!
//! Identifiers are assigned by PostgreSQL `SERIAL` columns, so they map to
//! `INTEGER` (i32) on the wire and in the database.

/// Account ID - assigned by the accounts table, always positive.
///
/// # Usage:
/// - Row key for balance locking in the transfer engine
/// - Value stored against a session token
pub type AccountId = i32;

/// Transfer ID - assigned by the transfers table on insert
pub type TransferId = i32;

/// Session token - hex-encoded, opaque to clients
pub type Token = String;
