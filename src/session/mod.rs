//! Session management module
//!
//! In-memory bearer tokens mapping to account ids, with a background
//! sweeper that drops sessions older than the TTL.

pub mod store;
pub mod sweeper;
pub mod token;

pub use store::{DEFAULT_SESSION_TTL, Session, SessionStore};
pub use sweeper::{SessionSweeper, SweepConfig};
pub use token::generate_token;
