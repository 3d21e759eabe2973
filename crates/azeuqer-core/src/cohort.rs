//! Founder cohort admission.
//!
//! The first `limit` distinct registrants receive a 1-based rank. Admission
//! is a single atomic read-and-increment: the gate never counts existing
//! members and then inserts, so racing registrations cannot overshoot the
//! limit. The gate is idempotent per player; asking again returns the
//! player's original answer.
//!
//! A registration that is admitted but never persisted hands its answer back
//! with [`CohortGate::release`]. A released rank goes to the next distinct
//! registrant before any fresh rank is minted.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;

use azeuqer_types::PlayerId;
use tokio::sync::Mutex;

/// Errors raised by a cohort gate backend.
#[derive(Debug, thiserror::Error)]
pub enum CohortError {
    /// The shared counter could not be reached.
    #[error("cohort gate unavailable: {message}")]
    Unavailable {
        /// Backend error description.
        message: String,
    },
}

/// Serializable admission counter shared by every engine instance.
pub trait CohortGate: Send + Sync {
    /// Admit `player_id`, returning its rank if it made the cut.
    fn admit(
        &self,
        player_id: PlayerId,
        limit: u32,
    ) -> impl Future<Output = Result<Option<u32>, CohortError>> + Send;

    /// Forget `player_id`'s admission and return the rank it held.
    ///
    /// Releasing a player the gate never admitted is a no-op.
    fn release(
        &self,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<Option<u32>, CohortError>> + Send;

    /// Number of distinct players that have passed through the gate.
    fn admitted_count(&self) -> impl Future<Output = Result<u64, CohortError>> + Send;
}

#[derive(Debug, Default)]
struct GateState {
    count: u64,
    minted: u32,
    free: BTreeSet<u32>,
    ranks: HashMap<PlayerId, Option<u32>>,
}

/// Process-local gate for tests and single-instance deployments.
#[derive(Debug, Default)]
pub struct InMemoryCohortGate {
    inner: Mutex<GateState>,
}

impl InMemoryCohortGate {
    /// Create an empty gate.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CohortGate for InMemoryCohortGate {
    async fn admit(&self, player_id: PlayerId, limit: u32) -> Result<Option<u32>, CohortError> {
        let mut gate = self.inner.lock().await;
        if let Some(rank) = gate.ranks.get(&player_id) {
            return Ok(*rank);
        }
        gate.count = gate.count.saturating_add(1);
        let rank = if let Some(freed) = gate.free.pop_first() {
            Some(freed)
        } else if gate.minted < limit {
            gate.minted = gate.minted.saturating_add(1);
            Some(gate.minted)
        } else {
            None
        };
        gate.ranks.insert(player_id, rank);
        Ok(rank)
    }

    async fn release(&self, player_id: PlayerId) -> Result<Option<u32>, CohortError> {
        let mut gate = self.inner.lock().await;
        let Some(rank) = gate.ranks.remove(&player_id) else {
            return Ok(None);
        };
        gate.count = gate.count.saturating_sub(1);
        if let Some(rank) = rank {
            gate.free.insert(rank);
        }
        Ok(rank)
    }

    async fn admitted_count(&self) -> Result<u64, CohortError> {
        Ok(self.inner.lock().await.count)
    }
}
