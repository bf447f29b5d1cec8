use std::sync::Arc;
use std::time::Duration;

use crate::db::Database;
use crate::session::SessionStore;
use crate::transfer::TransferEngine;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL pool (accounts, transfers)
    pub db: Database,
    /// Live login sessions; also owned by the sweeper
    pub sessions: Arc<SessionStore>,
    /// Transfer engine over the same pool
    pub engine: TransferEngine,
}

impl AppState {
    pub fn new(
        db: Database,
        sessions: Arc<SessionStore>,
        transfer_timeout: Option<Duration>,
    ) -> Self {
        let engine = TransferEngine::new(db.pool().clone()).with_timeout(transfer_timeout);
        Self {
            db,
            sessions,
            engine,
        }
    }
}
