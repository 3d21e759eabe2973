//! Stat-point ledger and derived character values.
//!
//! Points are earned one per swipe, forever: `earned` is the sum of the
//! lifetime LIGHT and SPITE counters, which never reset. Spending is recorded
//! per stat. `available = earned - spent` can therefore never go negative as
//! long as every allocation is checked against it, which [`allocate`] does
//! before touching the state.

use std::collections::BTreeMap;

use azeuqer_types::{PlayerState, Stat};

use crate::config::{CohortConfig, CombatConfig, PlayerConfig};
use crate::error::EngineError;

/// Apply a stat allocation.
///
/// Returns the per-stat amounts that were added. On error the state is
/// left untouched.
pub fn allocate(
    state: &mut PlayerState,
    deltas: &BTreeMap<Stat, i64>,
) -> Result<BTreeMap<Stat, u32>, EngineError> {
    let mut accepted = BTreeMap::new();
    let mut requested: u64 = 0;

    for (stat, delta) in deltas {
        let amount = u32::try_from(*delta).map_err(|e| EngineError::InvalidAllocation {
            reason: format!("{stat:?} delta {delta}: {e}"),
        })?;
        requested = requested
            .checked_add(u64::from(amount))
            .ok_or_else(|| EngineError::overflow("allocation total"))?;
        if amount > 0 {
            accepted.insert(*stat, amount);
        }
    }

    if requested == 0 {
        return Err(EngineError::InvalidAllocation {
            reason: "no stat points provided".to_owned(),
        });
    }

    let available = state.available_points();
    if requested > available {
        return Err(EngineError::InsufficientPoints {
            requested,
            available,
        });
    }

    let mut updated = state.stat_points_spent.clone();
    for (stat, amount) in &accepted {
        let slot = updated.entry(*stat).or_insert(0);
        *slot = slot
            .checked_add(*amount)
            .ok_or_else(|| EngineError::overflow("stat points spent"))?;
    }
    state.stat_points_spent = updated;

    Ok(accepted)
}

/// Boost percentage for the player (cohort members only).
pub const fn boost_pct(state: &PlayerState, cohort: &CohortConfig) -> u32 {
    if state.is_cohort_member() {
        cohort.boost_pct
    } else {
        0
    }
}

/// Scale `value` by `(100 + boost)%`, saturating at `u32::MAX`.
pub fn boosted(value: u32, boost_pct: u32) -> u32 {
    let scaled = u64::from(value).saturating_mul(u64::from(boost_pct).saturating_add(100)) / 100;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Derived maximum health.
pub fn hp_max(state: &PlayerState, player: &PlayerConfig, boost_pct: u32) -> u32 {
    let raw = player
        .base_hp
        .saturating_add(state.stat(Stat::Vit).saturating_mul(player.hp_per_vit))
        .saturating_add(state.equipped_bonus(|item| item.hp_bonus));
    boosted(raw, boost_pct).max(player.min_hp).max(1)
}

/// Deterministic part of player attack damage, before the random bonus.
pub fn attack_power(state: &PlayerState, combat: &CombatConfig, boost_pct: u32) -> u32 {
    let weighted = u64::from(state.stat(Stat::Str))
        .saturating_mul(u64::from(combat.str_weight_pct))
        .saturating_add(u64::from(state.stat(Stat::Int)).saturating_mul(u64::from(combat.int_weight_pct)))
        / 100;
    let weighted = u32::try_from(weighted).unwrap_or(u32::MAX);
    boosted(
        weighted.saturating_add(state.equipped_bonus(|item| item.dmg_bonus)),
        boost_pct,
    )
}

/// Recompute the encounter's maximum health and clamp current health to it.
///
/// Returns whether anything changed.
pub fn refresh_derived(
    state: &mut PlayerState,
    player: &PlayerConfig,
    cohort: &CohortConfig,
) -> bool {
    let max = hp_max(state, player, boost_pct(state, cohort));
    let encounter = &mut state.encounter;
    let hp = encounter.player_hp.min(max);
    let changed = encounter.player_hp_max != max || encounter.player_hp != hp;
    encounter.player_hp_max = max;
    encounter.player_hp = hp;
    changed
}
