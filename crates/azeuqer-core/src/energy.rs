//! Lazy energy regeneration.
//!
//! Energy is never ticked by a timer. Each request computes how many whole
//! regeneration intervals have passed since the anchor and credits them.
//! The anchor only ever moves in whole intervals, so polling more often never
//! gains or loses time.

use chrono::{DateTime, Duration, Utc};

use crate::config::EnergyConfig;

/// An energy reading paired with its regeneration anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnergyPool {
    /// Current energy.
    pub energy: u32,
    /// Regeneration reference point.
    pub anchor: DateTime<Utc>,
}

/// Credit whole regeneration intervals elapsed since the anchor.
///
/// A full pool is returned as-is (clamped to the cap). A clock reading
/// before the anchor gains nothing. The anchor advances by exactly
/// `gained * interval` and therefore never passes `now`.
pub fn regen(pool: EnergyPool, now: DateTime<Utc>, config: &EnergyConfig) -> EnergyPool {
    if pool.energy >= config.max {
        return EnergyPool {
            energy: config.max,
            anchor: pool.anchor,
        };
    }

    let interval = i64::from(config.regen_interval_secs);
    let elapsed = now.signed_duration_since(pool.anchor).num_seconds();
    let Some(gained) = elapsed.checked_div(interval) else {
        return pool;
    };
    if gained <= 0 {
        return pool;
    }

    let Some(advanced) = gained
        .checked_mul(interval)
        .and_then(Duration::try_seconds)
        .and_then(|step| pool.anchor.checked_add_signed(step))
    else {
        return pool;
    };

    let credited = u32::try_from(gained).unwrap_or(u32::MAX);
    EnergyPool {
        energy: pool.energy.saturating_add(credited).min(config.max),
        anchor: advanced,
    }
}

/// Take one energy point, or `None` if the pool is empty.
///
/// Spending from a full pool restarts the anchor at `now`. A full pool's
/// anchor is stale, and keeping it would refill the point instantly.
pub fn spend(pool: EnergyPool, now: DateTime<Utc>, config: &EnergyConfig) -> Option<EnergyPool> {
    let energy = pool.energy.checked_sub(1)?;
    let anchor = if pool.energy >= config.max {
        now
    } else {
        pool.anchor
    };
    Some(EnergyPool { energy, anchor })
}

/// When the next point arrives, or `None` if the pool is full.
pub fn next_point_at(pool: EnergyPool, config: &EnergyConfig) -> Option<DateTime<Utc>> {
    if pool.energy >= config.max {
        return None;
    }
    Duration::try_seconds(i64::from(config.regen_interval_secs))
        .and_then(|step| pool.anchor.checked_add_signed(step))
}
