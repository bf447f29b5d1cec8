//! Session store
//!
//! Maps bearer tokens to the account they authenticate. A single mutex
//! guards the whole map: issue and resolve are O(1), the expiry sweep is a
//! full scan. Collision check and insert happen under one lock acquisition,
//! so two concurrent issues can never both observe a token as absent.
//!
//! Timestamps use `tokio::time::Instant` so expiry follows the runtime
//! clock (and can be driven by a paused clock in tests).

use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::token::generate_token;
use crate::core_types::{AccountId, Token};
use crate::error::LedgerError;

/// Fixed session lifetime
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(120);

const INITIAL_CAPACITY: usize = 64;

/// A live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Token,
    pub account_id: AccountId,
    pub issued_at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    account_id: AccountId,
    issued_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.issued_at) > ttl
    }
}

/// Thread-safe in-memory session store.
///
/// Owned by the process and shared through `Arc`; nothing reaches the map
/// except through these methods.
pub struct SessionStore {
    entries: Mutex<HashMap<Token, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create an empty store with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::with_capacity(INITIAL_CAPACITY)),
            ttl,
        }
    }

    /// Session lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a new session for an account.
    ///
    /// Returns `TryAgain` if the generated token is already live. The
    /// existing session is left untouched; handing out its token would give
    /// this caller access to another account.
    pub fn issue(&self, account_id: AccountId) -> Result<Token, LedgerError> {
        let token = generate_token()?;
        self.insert(token.clone(), account_id, Instant::now())?;
        debug!(account_id, "Session issued");
        Ok(token)
    }

    /// Atomic check-and-insert of a session entry
    pub(crate) fn insert(
        &self,
        token: Token,
        account_id: AccountId,
        issued_at: Instant,
    ) -> Result<(), LedgerError> {
        let mut entries = self.entries.lock();
        match entries.entry(token) {
            Entry::Occupied(_) => {
                warn!(account_id, "Session token collision");
                Err(LedgerError::TryAgain)
            }
            Entry::Vacant(slot) => {
                slot.insert(SessionEntry {
                    account_id,
                    issued_at,
                });
                Ok(())
            }
        }
    }

    /// Resolve a token to its account id.
    ///
    /// Does not extend the session. A session past its TTL is refused even
    /// if the sweeper has not removed it yet.
    pub fn resolve(&self, token: &str) -> Result<AccountId, LedgerError> {
        let entries = self.entries.lock();
        match entries.get(token) {
            Some(entry) if !entry.is_expired(Instant::now(), self.ttl) => Ok(entry.account_id),
            _ => Err(LedgerError::Unauthorized),
        }
    }

    /// Snapshot of a live session
    pub fn get(&self, token: &str) -> Option<Session> {
        let entries = self.entries.lock();
        entries.get(token).map(|entry| Session {
            token: token.to_string(),
            account_id: entry.account_id,
            issued_at: entry.issued_at,
        })
    }

    /// Remove every session older than the TTL. Returns the number removed.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        before - entries.len()
    }

    /// Number of sessions in the map (including expired, unswept ones)
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_issue_then_resolve() {
        let store = SessionStore::default();
        let token = store.issue(7).unwrap();
        assert_eq!(store.resolve(&token), Ok(7));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_token_unauthorized() {
        let store = SessionStore::default();
        assert_eq!(store.resolve("deadbeefdeadbeef"), Err(LedgerError::Unauthorized));
        assert_eq!(store.resolve(""), Err(LedgerError::Unauthorized));
    }

    #[test]
    fn test_collision_keeps_existing_session() {
        let store = SessionStore::default();
        let now = Instant::now();
        store.insert("abc".to_string(), 1, now).unwrap();

        let second = store.insert("abc".to_string(), 2, now);
        assert_eq!(second, Err(LedgerError::TryAgain));

        assert_eq!(store.resolve("abc"), Ok(1));
        assert_eq!(store.get("abc").unwrap().issued_at, now);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let store = SessionStore::new(Duration::from_secs(120));
        let now = Instant::now();
        store.insert("old".to_string(), 1, now).unwrap();
        store.insert("new".to_string(), 2, now + Duration::from_secs(60)).unwrap();

        // Exactly at TTL is still live
        assert_eq!(store.sweep_expired(now + Duration::from_secs(120)), 0);

        let removed = store.sweep_expired(now + Duration::from_secs(121));
        assert_eq!(removed, 1);
        assert!(store.get("old").is_none());
        assert!(store.get("new").is_some());
    }

    #[test]
    fn test_resolve_does_not_refresh() {
        let store = SessionStore::default();
        let token = store.issue(3).unwrap();
        let issued_at = store.get(&token).unwrap().issued_at;

        store.resolve(&token).unwrap();
        store.resolve(&token).unwrap();

        assert_eq!(store.get(&token).unwrap().issued_at, issued_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_refuses_expired_before_sweep() {
        let store = SessionStore::new(Duration::from_secs(120));
        let token = store.issue(9).unwrap();

        tokio::time::advance(Duration::from_secs(121)).await;

        assert_eq!(store.resolve(&token), Err(LedgerError::Unauthorized));
        // Still present until a sweep runs
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_issue_unique_tokens() {
        let store = Arc::new(SessionStore::default());

        let mut handles = vec![];
        for account_id in 1..=8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                (0..250)
                    .filter_map(|_| store.issue(account_id).ok().map(|t| (t, account_id)))
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for (token, account_id) in handle.join().unwrap() {
                assert!(seen.insert(token.clone()), "duplicate live token");
                assert_eq!(store.resolve(&token), Ok(account_id));
            }
        }
        assert_eq!(store.len(), seen.len());
    }
}
