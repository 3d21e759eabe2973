//! Player-vs-boss turn resolution.
//!
//! An encounter moves `NoEncounter -> Active -> {Victory, Defeat}`. Both end
//! states are terminal for the cycle. Every turn draws from a generator
//! seeded by `(player, day, cycle, turn)`.
//!
//! # Turn order
//!
//! 1. Reject unless the boss for the current cycle is active
//! 2. Apply the player's action (attack or heal)
//! 3. A boss at 0 HP ends the encounter in victory and drops loot
//! 4. Otherwise the boss retaliates; a player at 0 HP ends it in defeat

use azeuqer_types::{CombatAction, CombatOutcome, EncounterPhase, PlayerState, TurnOutcome};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::{CombatConfig, EngineConfig};
use crate::error::EngineError;
use crate::{loot, rng, stats};

/// Uniform bonus in `[0, bound)`, or 0 for an empty range.
fn bonus(draw: &mut ChaCha8Rng, bound: u32) -> u32 {
    if bound == 0 {
        0
    } else {
        draw.random_range(0..bound)
    }
}

/// Heal amount for a given maximum health.
pub fn heal_amount(hp_max: u32, combat: &CombatConfig) -> u32 {
    let pct = u64::from(hp_max).saturating_mul(u64::from(combat.heal_pct)) / 100;
    u32::try_from(pct).unwrap_or(u32::MAX).max(combat.heal_min)
}

/// Damage the boss deals back.
pub fn boss_damage(
    scans_today: u32,
    cycle_index: u32,
    combat: &CombatConfig,
    draw: &mut ChaCha8Rng,
) -> u32 {
    let scan_pressure = scans_today
        .checked_div(combat.boss_damage_scan_divisor)
        .unwrap_or(0);
    combat
        .boss_damage_base
        .saturating_add(scan_pressure)
        .saturating_add(cycle_index.saturating_add(1))
        .saturating_add(bonus(draw, combat.boss_damage_variance))
        .max(1)
}

/// Resolve one combat turn against the current boss.
pub fn take_turn(
    state: &mut PlayerState,
    action: CombatAction,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<CombatOutcome, EngineError> {
    if !state.encounter.is_active() {
        return Err(EngineError::EncounterNotActive);
    }

    let cycle_index = state.encounter.cycle_index;
    let turn = state
        .encounter
        .turn
        .checked_add(1)
        .ok_or_else(|| EngineError::overflow("combat turn"))?;
    state.encounter.turn = turn;

    let mut draw = rng::combat_rng(state.player_id, &state.day_key, cycle_index, turn);
    let mut outcome = CombatOutcome {
        action,
        turn,
        player_damage: 0,
        healed: 0,
        boss_damage: 0,
        boss_hp: state.encounter.boss_hp,
        player_hp: state.encounter.player_hp,
        result: TurnOutcome::Continue,
        loot: None,
    };

    match action {
        CombatAction::Attack => {
            let boost = stats::boost_pct(state, &config.cohort);
            let damage = stats::attack_power(state, &config.combat, boost)
                .saturating_add(bonus(&mut draw, config.combat.attack_variance))
                .max(1);
            state.encounter.boss_hp = state.encounter.boss_hp.saturating_sub(damage);
            outcome.player_damage = damage;
            outcome.boss_hp = state.encounter.boss_hp;

            if state.encounter.boss_hp == 0 {
                state.encounter.phase = EncounterPhase::Victory;
                state.kills_lifetime = state
                    .kills_lifetime
                    .checked_add(1)
                    .ok_or_else(|| EngineError::overflow("lifetime kills"))?;

                let rolled = loot::roll(state.player_id, &state.day_key, cycle_index, &config.loot, now);
                if let Some(item) = rolled.item {
                    state.inventory.push(item);
                }
                info!(
                    player_id = %state.player_id,
                    cycle_index,
                    turn,
                    rarity = ?rolled.drop.rarity,
                    loot = %rolled.drop.name,
                    "boss defeated"
                );
                outcome.result = TurnOutcome::Victory;
                outcome.loot = Some(rolled.drop);
                return Ok(outcome);
            }
        }
        CombatAction::Heal => {
            let max = state.encounter.player_hp_max;
            let before = state.encounter.player_hp;
            let after = before
                .saturating_add(heal_amount(max, &config.combat))
                .min(max);
            state.encounter.player_hp = after;
            outcome.healed = after.saturating_sub(before);
        }
    }

    let retaliation = boss_damage(state.scans_today, cycle_index, &config.combat, &mut draw);
    state.encounter.player_hp = state.encounter.player_hp.saturating_sub(retaliation);
    outcome.boss_damage = retaliation;
    outcome.player_hp = state.encounter.player_hp;

    if state.encounter.player_hp == 0 {
        state.encounter.phase = EncounterPhase::Defeat;
        outcome.result = TurnOutcome::Defeat;
        info!(player_id = %state.player_id, cycle_index, turn, "player defeated");
    } else {
        debug!(
            player_id = %state.player_id,
            turn,
            boss_hp = outcome.boss_hp,
            player_hp = outcome.player_hp,
            "combat turn"
        );
    }

    Ok(outcome)
}
