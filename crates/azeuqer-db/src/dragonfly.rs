//! `Dragonfly` (Redis-compatible) shared counters.
//!
//! `Dragonfly` holds the only state shared across players: the founder
//! cohort counter. Admission runs as one Lua script so the read of a
//! player's previous answer, the increment, and the rank record happen
//! atomically on the server. Release is a second script that puts a rank
//! back in the free set.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `{ns}:admitted` | Integer | Distinct players that passed the gate |
//! | `{ns}:ranks` | Hash | Player id to rank (`0` for no rank) |
//! | `{ns}:minted` | Integer | Highest rank ever handed out |
//! | `{ns}:free` | Sorted set | Released ranks, lowest first |
//!
//! The namespace defaults to `cohort`.

use azeuqer_core::{CohortError, CohortGate};
use azeuqer_types::PlayerId;
use fred::interfaces::LuaInterface;
use fred::prelude::*;

use crate::error::DbError;

/// Default key namespace for the cohort gate.
pub const DEFAULT_NAMESPACE: &str = "cohort";

/// Idempotent admission. `KEYS` are the counter, rank hash, minted counter
/// and free set; `ARGV[1]` is the player id, `ARGV[2]` the limit. Returns
/// the rank, or `0`.
const ADMIT_SCRIPT: &str = r"
local existing = redis.call('HGET', KEYS[2], ARGV[1])
if existing then
  return tonumber(existing)
end
redis.call('INCR', KEYS[1])
local rank = 0
local freed = redis.call('ZPOPMIN', KEYS[4])
if freed[1] then
  rank = tonumber(freed[1])
else
  local minted = tonumber(redis.call('GET', KEYS[3]) or '0')
  if minted < tonumber(ARGV[2]) then
    rank = redis.call('INCR', KEYS[3])
  end
end
redis.call('HSET', KEYS[2], ARGV[1], rank)
return rank
";

/// Forget one admission. Same `KEYS` as [`ADMIT_SCRIPT`], `ARGV[1]` is the
/// player id. Returns the released rank, or `0`.
const RELEASE_SCRIPT: &str = r"
local existing = redis.call('HGET', KEYS[2], ARGV[1])
if not existing then
  return 0
end
redis.call('HDEL', KEYS[2], ARGV[1])
redis.call('DECR', KEYS[1])
local rank = tonumber(existing)
if rank > 0 then
  redis.call('ZADD', KEYS[4], rank, rank)
end
return rank
";

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
}

impl DragonflyPool {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// The underlying client.
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Delete keys.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn delete(&self, keys: &[&str]) -> Result<(), DbError> {
        let keys: Vec<&str> = keys.to_vec();
        let _: u64 = self.client.del(keys).await?;
        Ok(())
    }
}

/// [`CohortGate`] backed by a `Dragonfly` Lua script.
#[derive(Clone)]
pub struct DragonflyCohortGate {
    pool: DragonflyPool,
    admitted_key: String,
    ranks_key: String,
    minted_key: String,
    free_key: String,
}

impl DragonflyCohortGate {
    /// Gate using the default `cohort` namespace.
    pub fn new(pool: DragonflyPool) -> Self {
        Self::with_namespace(pool, DEFAULT_NAMESPACE)
    }

    /// Gate using the `{namespace}:*` keys.
    pub fn with_namespace(pool: DragonflyPool, namespace: &str) -> Self {
        Self {
            pool,
            admitted_key: format!("{namespace}:admitted"),
            ranks_key: format!("{namespace}:ranks"),
            minted_key: format!("{namespace}:minted"),
            free_key: format!("{namespace}:free"),
        }
    }

    /// The counter, rank hash, minted counter and free set keys, in script
    /// order.
    pub fn keys(&self) -> [&str; 4] {
        [
            &self.admitted_key,
            &self.ranks_key,
            &self.minted_key,
            &self.free_key,
        ]
    }

    async fn try_admit(&self, player_id: PlayerId, limit: u32) -> Result<Option<u32>, DbError> {
        let keys = self.keys().to_vec();
        let args = vec![player_id.into_inner(), i64::from(limit)];
        let rank: i64 = self.pool.client.eval(ADMIT_SCRIPT, keys, args).await?;

        let rank = decode_rank(rank).map_err(|reason| DbError::InvalidRow {
            player_id: player_id.into_inner(),
            reason,
        })?;
        tracing::info!(player_id = %player_id, cohort_rank = ?rank, "Cohort gate answered");
        Ok(rank)
    }

    async fn try_release(&self, player_id: PlayerId) -> Result<Option<u32>, DbError> {
        let keys = self.keys().to_vec();
        let rank: i64 = self
            .pool
            .client
            .eval(RELEASE_SCRIPT, keys, vec![player_id.into_inner()])
            .await?;

        let rank = decode_rank(rank).map_err(|reason| DbError::InvalidRow {
            player_id: player_id.into_inner(),
            reason,
        })?;
        tracing::info!(player_id = %player_id, cohort_rank = ?rank, "Cohort admission released");
        Ok(rank)
    }

    async fn try_admitted_count(&self) -> Result<u64, DbError> {
        let count: Option<u64> = self.pool.client.get(self.admitted_key.as_str()).await?;
        Ok(count.unwrap_or(0))
    }
}

/// Turn the script's reply into a rank. `0` means the cohort was full.
fn decode_rank(raw: i64) -> Result<Option<u32>, String> {
    if raw == 0 {
        return Ok(None);
    }
    u32::try_from(raw)
        .map(Some)
        .map_err(|e| format!("cohort rank {raw}: {e}"))
}

impl CohortGate for DragonflyCohortGate {
    async fn admit(&self, player_id: PlayerId, limit: u32) -> Result<Option<u32>, CohortError> {
        Ok(self.try_admit(player_id, limit).await?)
    }

    async fn release(&self, player_id: PlayerId) -> Result<Option<u32>, CohortError> {
        Ok(self.try_release(player_id).await?)
    }

    async fn admitted_count(&self) -> Result<u64, CohortError> {
        Ok(self.try_admitted_count().await?)
    }
}
