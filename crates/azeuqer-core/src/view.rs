//! Client-facing projections of player state.

use azeuqer_types::{HallEntry, PlayerState, PlayerView};

use crate::config::EngineConfig;
use crate::energy::{self, EnergyPool};
use crate::{daily, stats};

/// Project a player's state for the client.
pub fn player_view(state: &PlayerState, config: &EngineConfig) -> PlayerView {
    let pool = EnergyPool {
        energy: state.energy,
        anchor: state.energy_anchor,
    };
    PlayerView {
        player_id: state.player_id,
        energy: state.energy,
        energy_max: config.energy.max,
        next_energy_at: energy::next_point_at(pool, &config.energy),
        scans_today: state.scans_today,
        free_scans_left: daily::free_scans_left(state.scans_today, &config.daily),
        light_today: state.light_today,
        spite_today: state.spite_today,
        faction: state.faction,
        faction_locked: state.faction_locked_for_period,
        tally_light: state.tally_light,
        tally_spite: state.tally_spite,
        stats: state.stat_points_spent.clone(),
        available_points: state.available_points(),
        encounter: state.encounter.clone(),
        kills_lifetime: state.kills_lifetime,
        cohort_rank: state.cohort_rank,
        boost_pct: stats::boost_pct(state, &config.cohort),
        inventory: state.inventory.clone(),
    }
}

/// Number the rows of a ranked player list, counting scans on `today` only.
pub fn hall_of_fame(rows: &[PlayerState], today: &str) -> Vec<HallEntry> {
    rows.iter()
        .zip(1_u32..)
        .map(|(state, position)| HallEntry {
            position,
            player_id: state.player_id,
            kills_lifetime: state.kills_lifetime,
            scans_today: state.scans_on(today),
            faction: state.faction,
            cohort_member: state.is_cohort_member(),
            stats: state.stat_points_spent.clone(),
        })
        .collect()
}
