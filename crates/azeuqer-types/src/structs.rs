//! Persistent player state and its nested records.
//!
//! [`PlayerState`] is the single row of state the engine keeps per player.
//! Every action loads it, mutates a copy, and writes it back with a
//! compare-and-save on [`PlayerState::version`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EncounterPhase, EquipSlot, Faction, Rarity, Stat};
use crate::ids::{ItemInstanceId, PlayerId};

// ---------------------------------------------------------------------------
// Encounter
// ---------------------------------------------------------------------------

/// Boss encounter state for the current day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EncounterState {
    /// Zero-based index of the cycle the latest scan belongs to.
    pub cycle_index: u32,
    /// The cycle the boss spawned in, if it spawned today.
    pub spawned_for_cycle: Option<u32>,
    /// Remaining boss health.
    pub boss_hp: u32,
    /// Current player health.
    pub player_hp: u32,
    /// Derived maximum player health. Always at least 1.
    pub player_hp_max: u32,
    /// Phase of the encounter.
    pub phase: EncounterPhase,
    /// Number of turns taken against the current boss.
    pub turn: u32,
}

impl EncounterState {
    /// A fresh encounter with no boss and full player health.
    pub fn fresh(boss_hp: u32, player_hp_max: u32) -> Self {
        let player_hp_max = player_hp_max.max(1);
        Self {
            cycle_index: 0,
            spawned_for_cycle: None,
            boss_hp,
            player_hp: player_hp_max,
            player_hp_max,
            phase: EncounterPhase::NoEncounter,
            turn: 0,
        }
    }

    /// Whether combat turns are currently accepted.
    pub fn is_active(&self) -> bool {
        self.phase == EncounterPhase::Active && self.spawned_for_cycle == Some(self.cycle_index)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A catalog entry that loot rolls can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ItemDefinition {
    /// Stable catalog code, e.g. `NEON_HOODIE`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Slot the item is worn in.
    pub slot: EquipSlot,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Flat maximum-health bonus while equipped.
    #[serde(default)]
    pub hp_bonus: u32,
    /// Flat attack bonus while equipped.
    #[serde(default)]
    pub dmg_bonus: u32,
}

/// An item owned by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryItem {
    /// Unique instance id.
    pub id: ItemInstanceId,
    /// Catalog definition the item was rolled from.
    pub definition: ItemDefinition,
    /// Whether the item is currently worn.
    pub equipped: bool,
    /// When the item dropped.
    pub acquired_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// The complete persistent state of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerState {
    /// Verified identity of the player.
    pub player_id: PlayerId,
    /// Normalized (trimmed, lower-case) email bound at registration.
    pub email: String,
    /// Optimistic concurrency version, bumped on every successful save.
    #[ts(type = "number")]
    pub version: u64,
    /// Registration time.
    pub created_at: DateTime<Utc>,

    /// Current energy, never above the configured maximum.
    pub energy: u32,
    /// Regeneration reference point. Only moves in whole intervals.
    pub energy_anchor: DateTime<Utc>,

    /// Calendar day (`YYYY-MM-DD`) the daily counters belong to.
    pub day_key: String,
    /// Scans made during `day_key`.
    pub scans_today: u32,
    /// LIGHT swipes made during `day_key`.
    pub light_today: u32,
    /// SPITE swipes made during `day_key`.
    pub spite_today: u32,

    /// Calendar month (`YYYY-MM`) the period tallies belong to.
    pub month_key: String,
    /// LIGHT swipes in the current period.
    pub tally_light: u32,
    /// SPITE swipes in the current period.
    pub tally_spite: u32,
    /// LIGHT swipes ever made. Never reset.
    pub lifetime_light: u32,
    /// SPITE swipes ever made. Never reset.
    pub lifetime_spite: u32,

    /// Faction for the current period.
    pub faction: Faction,
    /// Whether the faction is locked until the next month boundary.
    pub faction_locked_for_period: bool,

    /// Stat points spent so far, per stat.
    pub stat_points_spent: BTreeMap<Stat, u32>,

    /// Today's boss encounter.
    pub encounter: EncounterState,
    /// Bosses defeated, ever.
    pub kills_lifetime: u32,
    /// Owned items.
    pub inventory: Vec<InventoryItem>,

    /// Founder cohort rank (1-based). Set at creation, never changed.
    pub cohort_rank: Option<u32>,
}

impl PlayerState {
    /// Points spent on one stat.
    pub fn stat(&self, stat: Stat) -> u32 {
        self.stat_points_spent.get(&stat).copied().unwrap_or(0)
    }

    /// Total points spent across all stats.
    pub fn points_spent(&self) -> u64 {
        self.stat_points_spent.values().map(|v| u64::from(*v)).sum()
    }

    /// Total points ever earned.
    pub fn points_earned(&self) -> u64 {
        u64::from(self.lifetime_light).saturating_add(u64::from(self.lifetime_spite))
    }

    /// Points still available for allocation.
    pub fn available_points(&self) -> u64 {
        self.points_earned().saturating_sub(self.points_spent())
    }

    /// Scans recorded on `day_key`. The stored counter belongs to the
    /// player's last active day.
    pub fn scans_on(&self, day_key: &str) -> u32 {
        if self.day_key == day_key {
            self.scans_today
        } else {
            0
        }
    }

    /// Whether the player belongs to the founder cohort.
    pub const fn is_cohort_member(&self) -> bool {
        self.cohort_rank.is_some()
    }

    /// Sum of a bonus over all equipped items.
    pub fn equipped_bonus(&self, bonus: impl Fn(&ItemDefinition) -> u32) -> u32 {
        self.inventory
            .iter()
            .filter(|item| item.equipped)
            .fold(0_u32, |acc, item| acc.saturating_add(bonus(&item.definition)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(code: &str, slot: EquipSlot, hp: u32, equipped: bool) -> InventoryItem {
        InventoryItem {
            id: ItemInstanceId::new(),
            definition: ItemDefinition {
                code: code.to_owned(),
                name: code.to_owned(),
                slot,
                rarity: Rarity::Rare,
                hp_bonus: hp,
                dmg_bonus: 0,
            },
            equipped,
            acquired_at: Utc::now(),
        }
    }

    fn state() -> PlayerState {
        let now = Utc::now();
        PlayerState {
            player_id: PlayerId(1),
            email: "a@b.io".to_owned(),
            version: 0,
            created_at: now,
            energy: 30,
            energy_anchor: now,
            day_key: "2026-01-01".to_owned(),
            scans_today: 0,
            light_today: 0,
            spite_today: 0,
            month_key: "2026-01".to_owned(),
            tally_light: 0,
            tally_spite: 0,
            lifetime_light: 5,
            lifetime_spite: 3,
            faction: Faction::Unassigned,
            faction_locked_for_period: false,
            stat_points_spent: BTreeMap::from([(Stat::Str, 2), (Stat::Vit, 1)]),
            encounter: EncounterState::fresh(60, 30),
            kills_lifetime: 0,
            inventory: vec![
                item("A", EquipSlot::Chest, 10, true),
                item("B", EquipSlot::Legs, 20, false),
            ],
            cohort_rank: None,
        }
    }

    #[test]
    fn available_points_subtracts_spent() {
        let s = state();
        assert_eq!(s.points_earned(), 8);
        assert_eq!(s.points_spent(), 3);
        assert_eq!(s.available_points(), 5);
        assert_eq!(s.stat(Stat::Agi), 0);
    }

    #[test]
    fn scans_on_another_day_are_zero() {
        let mut s = state();
        s.scans_today = 7;
        let today = s.day_key.clone();
        assert_eq!(s.scans_on(&today), 7);
        assert_eq!(s.scans_on("1999-01-01"), 0);
    }

    #[test]
    fn equipped_bonus_ignores_unequipped() {
        assert_eq!(state().equipped_bonus(|d| d.hp_bonus), 10);
    }

    #[test]
    fn fresh_encounter_is_inactive() {
        let e = EncounterState::fresh(60, 0);
        assert_eq!(e.player_hp_max, 1);
        assert_eq!(e.player_hp, 1);
        assert!(!e.is_active());
    }
}
