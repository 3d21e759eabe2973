//! Boss spawn window resolution.
//!
//! Scans are grouped into fixed-length cycles. Within each cycle the boss
//! may spawn once, somewhere in `[window_start, window_end]`: each scan in
//! the window rolls a seeded per-mille chance, and the last position of the
//! window spawns unconditionally if nothing rolled earlier.

use azeuqer_types::{BossSpawn, EncounterPhase, PlayerState, SpawnDecision};
use rand::Rng;
use tracing::{info, warn};

use crate::config::EncounterConfig;
use crate::error::EngineError;
use crate::rng;

/// Where a scan falls within its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePosition {
    /// Zero-based cycle index.
    pub cycle_index: u32,
    /// One-based position inside the cycle.
    pub pos_in_cycle: u32,
}

/// Result of the spawn check for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnCheck {
    /// Where the scan fell.
    pub position: CyclePosition,
    /// How the check was decided.
    pub decision: SpawnDecision,
    /// The boss, when one spawned.
    pub boss: Option<BossSpawn>,
}

/// Locate the `scans_today`-th scan of the day.
///
/// Scan `n` (1-based) belongs to cycle `(n - 1) / cycle_length`. Before the
/// first scan the player is in cycle 0.
pub fn position(scans_today: u32, config: &EncounterConfig) -> CyclePosition {
    let Some(zero_based) = scans_today.checked_sub(1) else {
        return CyclePosition {
            cycle_index: 0,
            pos_in_cycle: 0,
        };
    };
    let cycle_index = zero_based.checked_div(config.cycle_length).unwrap_or(0);
    let pos_in_cycle = zero_based
        .checked_rem(config.cycle_length)
        .unwrap_or(0)
        .saturating_add(1);
    CyclePosition {
        cycle_index,
        pos_in_cycle,
    }
}

/// Boss health for a cycle.
pub fn boss_hp_for_cycle(cycle_index: u32, config: &EncounterConfig) -> Result<u32, EngineError> {
    config
        .boss_hp_per_cycle
        .checked_mul(cycle_index)
        .and_then(|extra| extra.checked_add(config.boss_hp_base))
        .ok_or_else(|| EngineError::overflow("boss hp scaling"))
}

/// Run the spawn check after `scans_today` was incremented.
///
/// Moving into a new cycle clears a leftover encounter from the previous
/// cycle. A boss that already spawned in the current cycle is never
/// respawned, whatever the phase.
pub fn resolve_spawn(
    state: &mut PlayerState,
    config: &EncounterConfig,
) -> Result<SpawnCheck, EngineError> {
    let position = position(state.scans_today, config);
    let encounter = &mut state.encounter;

    if encounter.cycle_index != position.cycle_index {
        encounter.cycle_index = position.cycle_index;
        if encounter.spawned_for_cycle != Some(position.cycle_index) {
            encounter.phase = EncounterPhase::NoEncounter;
            encounter.turn = 0;
        }
    }

    let decision = if encounter.spawned_for_cycle == Some(position.cycle_index) {
        SpawnDecision::AlreadySpawned
    } else if position.pos_in_cycle < config.window_start {
        SpawnDecision::BeforeWindow
    } else if position.pos_in_cycle > config.window_end {
        SpawnDecision::AfterWindow
    } else if position.pos_in_cycle == config.window_end {
        SpawnDecision::Guaranteed
    } else {
        let mut draw = rng::spawn_rng(state.player_id, &state.day_key, state.scans_today);
        if draw.random_range(0..1000_u32) < config.spawn_chance_per_mille {
            SpawnDecision::Rolled
        } else {
            SpawnDecision::RollMissed
        }
    };

    if !decision.spawned() {
        return Ok(SpawnCheck {
            position,
            decision,
            boss: None,
        });
    }

    let encounter = &mut state.encounter;
    encounter.spawned_for_cycle = Some(position.cycle_index);
    encounter.boss_hp = boss_hp_for_cycle(position.cycle_index, config)?;
    encounter.player_hp = encounter.player_hp.min(encounter.player_hp_max);
    encounter.phase = EncounterPhase::Active;
    encounter.turn = 0;

    // Health carries over from the last fight; the first move is a heal.
    if encounter.player_hp == 0 {
        warn!(
            player_id = %state.player_id,
            cycle_index = position.cycle_index,
            "boss spawned against a player at zero health"
        );
    }

    info!(
        player_id = %state.player_id,
        cycle_index = position.cycle_index,
        pos_in_cycle = position.pos_in_cycle,
        boss_hp = encounter.boss_hp,
        ?decision,
        "boss spawned"
    );

    Ok(SpawnCheck {
        position,
        decision,
        boss: Some(BossSpawn {
            cycle_index: position.cycle_index,
            boss_hp: encounter.boss_hp,
            player_hp: encounter.player_hp,
        }),
    })
}
