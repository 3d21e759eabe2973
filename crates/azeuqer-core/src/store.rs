//! Durable player state contract.
//!
//! The engine persists through [`PlayerStore`] only. Every mutation is a
//! single [`compare_and_save`](PlayerStore::compare_and_save) guarded by the
//! version the caller loaded; a mismatch means someone else wrote first and
//! the whole operation must be replayed against fresh state.

use std::collections::HashMap;
use std::future::Future;

use azeuqer_types::{PlayerId, PlayerState};
use tokio::sync::Mutex;

/// Errors raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The stored version no longer matches the expected one.
    #[error("version conflict")]
    VersionConflict,

    /// A row for the player already exists.
    #[error("player already exists")]
    AlreadyExists,

    /// The email is bound to another player.
    #[error("email already taken")]
    EmailTaken,

    /// The backend could not be reached or failed.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Backend error description.
        message: String,
    },
}

/// Persistence for [`PlayerState`].
pub trait PlayerStore: Send + Sync {
    /// Load a player's state.
    fn load(
        &self,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<Option<PlayerState>, StoreError>> + Send;

    /// Insert a new player. The stored row starts at version 1, which is
    /// returned.
    fn create(&self, state: &PlayerState) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Replace the player's state if the stored version equals
    /// `expected_version`. Returns the new version.
    fn compare_and_save(
        &self,
        expected_version: u64,
        state: &PlayerState,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Find the player bound to a normalized email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<PlayerId>, StoreError>> + Send;

    /// Players ordered by lifetime kills, then scans on `today`, both
    /// descending. A row whose `day_key` is not `today` has scanned zero
    /// times today whatever its stored counter says.
    fn top_players(
        &self,
        limit: u32,
        today: &str,
    ) -> impl Future<Output = Result<Vec<PlayerState>, StoreError>> + Send;
}

#[derive(Debug, Default)]
struct Tables {
    players: HashMap<PlayerId, PlayerState>,
    emails: HashMap<String, PlayerId>,
    forced_conflicts: u32,
}

/// Process-local store for tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryPlayerStore {
    inner: Mutex<Tables>,
}

impl InMemoryPlayerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` compare-and-save calls fail with a conflict.
    pub async fn force_conflicts(&self, count: u32) {
        self.inner.lock().await.forced_conflicts = count;
    }

    /// Number of stored players.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.players.len()
    }

    /// Whether the store holds no players.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.players.is_empty()
    }
}

impl PlayerStore for InMemoryPlayerStore {
    async fn load(&self, player_id: PlayerId) -> Result<Option<PlayerState>, StoreError> {
        Ok(self.inner.lock().await.players.get(&player_id).cloned())
    }

    async fn create(&self, state: &PlayerState) -> Result<u64, StoreError> {
        let mut tables = self.inner.lock().await;
        if tables.players.contains_key(&state.player_id) {
            return Err(StoreError::AlreadyExists);
        }
        if tables.emails.contains_key(&state.email) {
            return Err(StoreError::EmailTaken);
        }
        let mut row = state.clone();
        row.version = 1;
        tables.emails.insert(row.email.clone(), row.player_id);
        tables.players.insert(row.player_id, row);
        Ok(1)
    }

    async fn compare_and_save(
        &self,
        expected_version: u64,
        state: &PlayerState,
    ) -> Result<u64, StoreError> {
        let mut tables = self.inner.lock().await;
        if tables.forced_conflicts > 0 {
            tables.forced_conflicts = tables.forced_conflicts.saturating_sub(1);
            return Err(StoreError::VersionConflict);
        }
        let Some(current) = tables.players.get_mut(&state.player_id) else {
            return Err(StoreError::VersionConflict);
        };
        if current.version != expected_version {
            return Err(StoreError::VersionConflict);
        }
        let version = expected_version.saturating_add(1);
        let mut row = state.clone();
        row.version = version;
        row.cohort_rank = current.cohort_rank;
        row.email.clone_from(&current.email);
        *current = row;
        Ok(version)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PlayerId>, StoreError> {
        Ok(self.inner.lock().await.emails.get(email).copied())
    }

    async fn top_players(&self, limit: u32, today: &str) -> Result<Vec<PlayerState>, StoreError> {
        let tables = self.inner.lock().await;
        let mut rows: Vec<_> = tables.players.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.kills_lifetime
                .cmp(&a.kills_lifetime)
                .then(b.scans_on(today).cmp(&a.scans_on(today)))
                .then(a.player_id.cmp(&b.player_id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}
