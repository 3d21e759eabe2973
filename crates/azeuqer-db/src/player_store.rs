//! `PostgreSQL`-backed [`PlayerStore`].
//!
//! Each player is one row in `players`. The full [`PlayerState`] is stored as
//! JSONB; `version` is the optimistic concurrency token and every save is a
//! single conditional `UPDATE ... WHERE version = $expected`. Zero rows
//! updated means another writer won and the engine retries.
//!
//! `email` and `cohort_rank` are written once at insert and never updated.
//! On load the columns are authoritative over whatever the JSON holds.

use azeuqer_core::{PlayerStore, StoreError};
use azeuqer_types::{PlayerId, PlayerState};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbError;

/// Unique constraint on `players.email`.
const EMAIL_CONSTRAINT: &str = "players_email_unique";

/// Row shape read back from `players`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    /// Player id.
    pub player_id: i64,
    /// Normalized email.
    pub email: String,
    /// Concurrency token.
    pub version: i64,
    /// Founder cohort rank.
    pub cohort_rank: Option<i32>,
    /// Serialized [`PlayerState`].
    pub state: serde_json::Value,
    /// Insert time.
    pub created_at: DateTime<Utc>,
}

impl PlayerRow {
    /// Decode the row, letting the columns override the JSON copy.
    pub fn into_state(self) -> Result<PlayerState, DbError> {
        let mut state: PlayerState = serde_json::from_value(self.state)?;
        state.version = u64::try_from(self.version).map_err(|e| DbError::InvalidRow {
            player_id: self.player_id,
            reason: format!("version {}: {e}", self.version),
        })?;
        state.cohort_rank = self
            .cohort_rank
            .map(u32::try_from)
            .transpose()
            .map_err(|e| DbError::InvalidRow {
                player_id: self.player_id,
                reason: format!("cohort rank: {e}"),
            })?;
        state.player_id = PlayerId(self.player_id);
        state.email = self.email;
        state.created_at = self.created_at;
        Ok(state)
    }
}

/// Operations on the `players` table.
#[derive(Debug, Clone)]
pub struct PgPlayerStore {
    pool: PgPool,
}

impl PgPlayerStore {
    /// Create a store over a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn try_load(&self, player_id: PlayerId) -> Result<Option<PlayerState>, DbError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r"SELECT player_id, email, version, cohort_rank, state, created_at
              FROM players
              WHERE player_id = $1",
        )
        .bind(player_id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        row.map(PlayerRow::into_state).transpose()
    }

    async fn try_top_players(&self, limit: u32, today: &str) -> Result<Vec<PlayerState>, DbError> {
        // `scans_today` only counts while the row's day is still `today`.
        let rows = sqlx::query_as::<_, PlayerRow>(
            r"SELECT player_id, email, version, cohort_rank, state, created_at
              FROM players
              ORDER BY kills_lifetime DESC,
                       CASE WHEN state->>'day_key' = $2 THEN scans_today ELSE 0 END DESC,
                       player_id ASC
              LIMIT $1",
        )
        .bind(i64::from(limit))
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PlayerRow::into_state).collect()
    }
}

/// Clamp a counter into an `INTEGER` column.
fn as_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Map an insert failure onto the store contract.
fn insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
    {
        return if db.constraint() == Some(EMAIL_CONSTRAINT) {
            StoreError::EmailTaken
        } else {
            StoreError::AlreadyExists
        };
    }
    DbError::from(err).into()
}

impl PlayerStore for PgPlayerStore {
    async fn load(&self, player_id: PlayerId) -> Result<Option<PlayerState>, StoreError> {
        Ok(self.try_load(player_id).await?)
    }

    async fn create(&self, state: &PlayerState) -> Result<u64, StoreError> {
        let json = serde_json::to_value(state).map_err(DbError::from)?;
        let rank = state.cohort_rank.map(as_int);

        let version: i64 = sqlx::query_scalar(
            r"INSERT INTO players
              (player_id, email, version, cohort_rank, kills_lifetime, scans_today, state, created_at)
              VALUES ($1, $2, 1, $3, $4, $5, $6, $7)
              RETURNING version",
        )
        .bind(state.player_id.into_inner())
        .bind(&state.email)
        .bind(rank)
        .bind(as_int(state.kills_lifetime))
        .bind(as_int(state.scans_today))
        .bind(&json)
        .bind(state.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(insert_error)?;

        tracing::debug!(player_id = %state.player_id, "Inserted player row");
        u64::try_from(version).map_err(|e| {
            DbError::InvalidRow {
                player_id: state.player_id.into_inner(),
                reason: format!("version {version}: {e}"),
            }
            .into()
        })
    }

    async fn compare_and_save(
        &self,
        expected_version: u64,
        state: &PlayerState,
    ) -> Result<u64, StoreError> {
        let Ok(expected) = i64::try_from(expected_version) else {
            return Err(StoreError::VersionConflict);
        };
        let json = serde_json::to_value(state).map_err(DbError::from)?;

        let version: Option<i64> = sqlx::query_scalar(
            r"UPDATE players
              SET state = $3,
                  version = version + 1,
                  kills_lifetime = $4,
                  scans_today = $5,
                  updated_at = NOW()
              WHERE player_id = $1 AND version = $2
              RETURNING version",
        )
        .bind(state.player_id.into_inner())
        .bind(expected)
        .bind(&json)
        .bind(as_int(state.kills_lifetime))
        .bind(as_int(state.scans_today))
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let Some(version) = version else {
            return Err(StoreError::VersionConflict);
        };
        u64::try_from(version).map_err(|e| {
            DbError::InvalidRow {
                player_id: state.player_id.into_inner(),
                reason: format!("version {version}: {e}"),
            }
            .into()
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PlayerId>, StoreError> {
        let id: Option<i64> = sqlx::query_scalar("SELECT player_id FROM players WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(id.map(PlayerId))
    }

    async fn top_players(&self, limit: u32, today: &str) -> Result<Vec<PlayerState>, StoreError> {
        Ok(self.try_top_players(limit, today).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use azeuqer_types::{EncounterState, Faction};

    use super::*;

    fn row(version: i64, rank: Option<i32>) -> PlayerRow {
        let now = Utc::now();
        let state = PlayerState {
            player_id: PlayerId(99),
            email: "stale@x.io".to_owned(),
            version: 0,
            created_at: now,
            energy: 12,
            energy_anchor: now,
            day_key: "2026-07-04".to_owned(),
            scans_today: 31,
            light_today: 20,
            spite_today: 11,
            month_key: "2026-07".to_owned(),
            tally_light: 20,
            tally_spite: 11,
            lifetime_light: 20,
            lifetime_spite: 11,
            faction: Faction::Euphoria,
            faction_locked_for_period: true,
            stat_points_spent: BTreeMap::new(),
            encounter: EncounterState::fresh(60, 30),
            kills_lifetime: 2,
            inventory: Vec::new(),
            cohort_rank: None,
        };
        PlayerRow {
            player_id: 7,
            email: "p7@x.io".to_owned(),
            version,
            cohort_rank: rank,
            state: serde_json::to_value(&state).unwrap(),
            created_at: now,
        }
    }

    #[test]
    fn columns_override_the_json_copy() {
        let state = row(5, Some(3)).into_state().unwrap();
        assert_eq!(state.player_id, PlayerId(7));
        assert_eq!(state.email, "p7@x.io");
        assert_eq!(state.version, 5);
        assert_eq!(state.cohort_rank, Some(3));
        assert_eq!(state.scans_today, 31);
        assert_eq!(state.faction, Faction::Euphoria);
    }

    #[test]
    fn negative_columns_are_rejected() {
        assert!(matches!(
            row(-1, None).into_state(),
            Err(DbError::InvalidRow { player_id: 7, .. })
        ));
        assert!(matches!(
            row(1, Some(-2)).into_state(),
            Err(DbError::InvalidRow { .. })
        ));
    }

    #[test]
    fn counters_clamp_into_integer_columns() {
        assert_eq!(as_int(17), 17);
        assert_eq!(as_int(u32::MAX), i32::MAX);
    }
}
