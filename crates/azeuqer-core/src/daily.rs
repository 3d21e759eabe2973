//! Day-key transitions and the daily scan quota.

use azeuqer_types::{EncounterState, PlayerState, ScanMode};

use crate::config::{DailyConfig, EncounterConfig};

/// Reset the daily counters if `today_key` differs from the stored day.
///
/// Returns whether a reset happened. Calling it twice with the same key is a
/// no-op the second time.
pub fn rollover(state: &mut PlayerState, today_key: &str, encounter: &EncounterConfig) -> bool {
    if state.day_key == today_key {
        return false;
    }

    today_key.clone_into(&mut state.day_key);
    state.scans_today = 0;
    state.light_today = 0;
    state.spite_today = 0;
    state.encounter = EncounterState::fresh(encounter.boss_hp_base, state.encounter.player_hp_max);
    true
}

/// Whether the next scan must be paid for with energy.
pub const fn scan_costs_energy(scans_today: u32, config: &DailyConfig) -> bool {
    scans_today >= config.free_scans_per_day
}

/// Free scans left today.
pub const fn free_scans_left(scans_today: u32, config: &DailyConfig) -> u32 {
    config.free_scans_per_day.saturating_sub(scans_today)
}

/// Presentation mode after `scans_today` scans.
pub const fn scan_mode(scans_today: u32, config: &DailyConfig) -> ScanMode {
    if scans_today < config.initiation_scans {
        ScanMode::Initiation
    } else {
        ScanMode::Sorted
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use azeuqer_types::{EncounterPhase, Faction, PlayerId};
    use chrono::Utc;

    use super::*;

    fn state() -> PlayerState {
        let now = Utc::now();
        let mut encounter = EncounterState::fresh(140, 42);
        encounter.cycle_index = 2;
        encounter.spawned_for_cycle = Some(2);
        encounter.phase = EncounterPhase::Defeat;
        encounter.player_hp = 0;
        encounter.turn = 7;
        PlayerState {
            player_id: PlayerId(5),
            email: "p@x.io".to_owned(),
            version: 3,
            created_at: now,
            energy: 10,
            energy_anchor: now,
            day_key: "2026-02-10".to_owned(),
            scans_today: 47,
            light_today: 20,
            spite_today: 27,
            month_key: "2026-02".to_owned(),
            tally_light: 20,
            tally_spite: 27,
            lifetime_light: 20,
            lifetime_spite: 27,
            faction: Faction::Dissonance,
            faction_locked_for_period: true,
            stat_points_spent: BTreeMap::new(),
            encounter,
            kills_lifetime: 1,
            inventory: Vec::new(),
            cohort_rank: None,
        }
    }

    #[test]
    fn same_day_is_noop() {
        let mut s = state();
        let before = s.clone();
        assert!(!rollover(&mut s, "2026-02-10", &EncounterConfig::default()));
        assert_eq!(s, before);
    }

    #[test]
    fn new_day_resets_counters_and_encounter() {
        let mut s = state();
        assert!(rollover(&mut s, "2026-02-11", &EncounterConfig::default()));
        assert_eq!(s.day_key, "2026-02-11");
        assert_eq!(s.scans_today, 0);
        assert_eq!(s.light_today, 0);
        assert_eq!(s.spite_today, 0);
        assert_eq!(s.encounter.cycle_index, 0);
        assert_eq!(s.encounter.spawned_for_cycle, None);
        assert_eq!(s.encounter.boss_hp, 60);
        assert_eq!(s.encounter.player_hp, 42);
        assert_eq!(s.encounter.phase, EncounterPhase::NoEncounter);
        assert_eq!(s.tally_spite, 27);
        assert_eq!(s.kills_lifetime, 1);
    }

    #[test]
    fn rollover_is_idempotent() {
        let mut s = state();
        rollover(&mut s, "2026-02-11", &EncounterConfig::default());
        let once = s.clone();
        assert!(!rollover(&mut s, "2026-02-11", &EncounterConfig::default()));
        assert_eq!(s, once);
    }

    #[test]
    fn quota_and_mode() {
        let cfg = DailyConfig::default();
        assert!(!scan_costs_energy(19, &cfg));
        assert!(scan_costs_energy(20, &cfg));
        assert_eq!(free_scans_left(25, &cfg), 0);
        assert_eq!(free_scans_left(5, &cfg), 15);
        assert_eq!(scan_mode(9, &cfg), ScanMode::Initiation);
        assert_eq!(scan_mode(10, &cfg), ScanMode::Sorted);
    }
}
