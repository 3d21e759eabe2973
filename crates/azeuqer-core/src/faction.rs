//! Monthly faction resolution.
//!
//! Each calendar month is a period. LIGHT swipes tally toward Euphoria and
//! SPITE swipes toward Dissonance. A faction changes only in two places:
//!
//! - at a month boundary, from the tallies of the period that just ended
//! - at initiation, once the current period's tallies reach the threshold
//!   and no faction is locked yet
//!
//! Ties are broken by the parity of a digest of the player and the period,
//! so the same tie always resolves the same way.

use azeuqer_types::{Faction, FactionChange, FactionChangeReason, PlayerId, PlayerState};
use chrono::{Datelike, NaiveDate};
use tracing::info;

use crate::rng;

/// Winner of a period.
///
/// Strictly more swipes wins. An empty period is [`Faction::Unassigned`].
pub fn resolve_winner(light: u32, spite: u32, player_id: PlayerId, period_key: &str) -> Faction {
    match light.cmp(&spite) {
        std::cmp::Ordering::Greater => Faction::Euphoria,
        std::cmp::Ordering::Less => Faction::Dissonance,
        std::cmp::Ordering::Equal if light == 0 => Faction::Unassigned,
        std::cmp::Ordering::Equal => {
            if rng::tie_break_even(player_id, period_key) {
                Faction::Euphoria
            } else {
                Faction::Dissonance
            }
        }
    }
}

/// Month index (`year * 12 + month0`) of a `YYYY-MM` key.
fn month_ordinal(key: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").ok()?;
    i64::from(date.year())
        .checked_mul(12)?
        .checked_add(i64::from(date.month0()))
}

/// Whether `next` is the calendar month right after `prev`.
fn is_consecutive(prev: &str, next: &str) -> bool {
    match (month_ordinal(prev), month_ordinal(next)) {
        (Some(a), Some(b)) => a.checked_add(1) == Some(b),
        _ => false,
    }
}

/// Close the stored period if `month_key` has moved on.
///
/// The stored tallies decide the new faction when the stored period is the
/// month that just ended. If whole months passed without activity, the
/// period that just ended was empty and the faction becomes unassigned.
/// Tallies reset either way.
pub fn month_rollover(state: &mut PlayerState, month_key: &str) -> Option<FactionChange> {
    if state.month_key == month_key {
        return None;
    }

    let ended = std::mem::replace(&mut state.month_key, month_key.to_owned());
    let winner = if is_consecutive(&ended, month_key) {
        resolve_winner(state.tally_light, state.tally_spite, state.player_id, &ended)
    } else {
        Faction::Unassigned
    };

    let from = state.faction;
    state.faction = winner;
    state.faction_locked_for_period = winner != Faction::Unassigned;
    state.tally_light = 0;
    state.tally_spite = 0;

    info!(
        player_id = %state.player_id,
        period = %ended,
        ?from,
        to = ?winner,
        "month boundary faction assignment"
    );

    (from != winner).then(|| FactionChange {
        from,
        to: winner,
        reason: FactionChangeReason::MonthBoundary,
        period_key: ended,
    })
}

/// Lock a faction early once the current period crosses the threshold.
pub fn check_initiation(state: &mut PlayerState, threshold: u32) -> Option<FactionChange> {
    if state.faction_locked_for_period {
        return None;
    }
    if state.tally_light.saturating_add(state.tally_spite) < threshold {
        return None;
    }

    let winner = resolve_winner(
        state.tally_light,
        state.tally_spite,
        state.player_id,
        &state.month_key,
    );
    if winner == Faction::Unassigned {
        return None;
    }

    let from = state.faction;
    state.faction = winner;
    state.faction_locked_for_period = true;

    info!(
        player_id = %state.player_id,
        period = %state.month_key,
        faction = ?winner,
        "initiation faction lock"
    );

    Some(FactionChange {
        from,
        to: winner,
        reason: FactionChangeReason::Initiation,
        period_key: state.month_key.clone(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use azeuqer_types::EncounterState;
    use chrono::Utc;

    use super::*;

    fn state(month: &str, light: u32, spite: u32) -> PlayerState {
        let now = Utc::now();
        PlayerState {
            player_id: PlayerId(31),
            email: "f@x.io".to_owned(),
            version: 0,
            created_at: now,
            energy: 30,
            energy_anchor: now,
            day_key: format!("{month}-15"),
            scans_today: 0,
            light_today: 0,
            spite_today: 0,
            month_key: month.to_owned(),
            tally_light: light,
            tally_spite: spite,
            lifetime_light: light,
            lifetime_spite: spite,
            faction: Faction::Unassigned,
            faction_locked_for_period: false,
            stat_points_spent: BTreeMap::new(),
            encounter: EncounterState::fresh(60, 30),
            kills_lifetime: 0,
            inventory: Vec::new(),
            cohort_rank: None,
        }
    }

    #[test]
    fn strict_majority_wins() {
        assert_eq!(resolve_winner(5, 3, PlayerId(1), "2026-01"), Faction::Euphoria);
        assert_eq!(resolve_winner(3, 5, PlayerId(1), "2026-01"), Faction::Dissonance);
        assert_eq!(resolve_winner(0, 0, PlayerId(1), "2026-01"), Faction::Unassigned);
    }

    #[test]
    fn tie_is_deterministic() {
        let first = resolve_winner(7, 7, PlayerId(99), "2026-03");
        assert_ne!(first, Faction::Unassigned);
        for _ in 0..20 {
            assert_eq!(resolve_winner(7, 7, PlayerId(99), "2026-03"), first);
        }
    }

    #[test]
    fn ties_split_across_players() {
        let mut seen = std::collections::BTreeSet::new();
        for id in 0..64 {
            seen.insert(resolve_winner(7, 7, PlayerId(id), "2026-03"));
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn boundary_assigns_and_locks() {
        let mut s = state("2026-03", 4, 9);
        let change = month_rollover(&mut s, "2026-04").unwrap();
        assert_eq!(change.to, Faction::Dissonance);
        assert_eq!(change.reason, FactionChangeReason::MonthBoundary);
        assert_eq!(change.period_key, "2026-03");
        assert!(s.faction_locked_for_period);
        assert_eq!((s.tally_light, s.tally_spite), (0, 0));
        assert_eq!(s.lifetime_spite, 9);
        assert!(month_rollover(&mut s, "2026-04").is_none());
    }

    #[test]
    fn year_boundary_is_consecutive() {
        let mut s = state("2025-12", 3, 1);
        month_rollover(&mut s, "2026-01");
        assert_eq!(s.faction, Faction::Euphoria);
    }

    #[test]
    fn skipped_month_unassigns() {
        let mut s = state("2026-01", 10, 2);
        s.faction = Faction::Dissonance;
        s.faction_locked_for_period = true;
        let change = month_rollover(&mut s, "2026-03").unwrap();
        assert_eq!(change.to, Faction::Unassigned);
        assert!(!s.faction_locked_for_period);
    }

    #[test]
    fn empty_period_unassigns_without_lock() {
        let mut s = state("2026-05", 0, 0);
        s.faction = Faction::Euphoria;
        month_rollover(&mut s, "2026-06");
        assert_eq!(s.faction, Faction::Unassigned);
        assert!(!s.faction_locked_for_period);
    }

    #[test]
    fn initiation_locks_once() {
        let mut s = state("2026-05", 6, 3);
        assert!(check_initiation(&mut s, 10).is_none());
        s.tally_spite = 4;
        let change = check_initiation(&mut s, 10).unwrap();
        assert_eq!(change.to, Faction::Euphoria);
        assert_eq!(change.reason, FactionChangeReason::Initiation);
        assert!(s.faction_locked_for_period);
        s.tally_spite = 40;
        assert!(check_initiation(&mut s, 10).is_none());
        assert_eq!(s.faction, Faction::Euphoria);
    }
}
