//! Result objects returned by engine operations.
//!
//! Every successful action yields an [`ActionReport`]: the action-specific
//! outcome, a fresh [`PlayerView`], and any faction changes the request
//! triggered along the way (a month rollover or an initiation lock).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    CombatAction, EquipSlot, Faction, FactionChangeReason, Rarity, ScanMode, SpawnDecision, Stat,
    SwipeDirection, TurnOutcome,
};
use crate::ids::{ItemInstanceId, PlayerId};
use crate::structs::{EncounterState, InventoryItem};

/// Client-facing snapshot of a player after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerView {
    /// Player identity.
    pub player_id: PlayerId,
    /// Current energy.
    pub energy: u32,
    /// Energy cap.
    pub energy_max: u32,
    /// When the next energy point arrives, if the pool is not full.
    pub next_energy_at: Option<DateTime<Utc>>,
    /// Scans made today.
    pub scans_today: u32,
    /// Scans left today before energy is charged.
    pub free_scans_left: u32,
    /// LIGHT swipes today.
    pub light_today: u32,
    /// SPITE swipes today.
    pub spite_today: u32,
    /// Current faction.
    pub faction: Faction,
    /// Whether the faction is locked for the period.
    pub faction_locked: bool,
    /// LIGHT swipes this period.
    pub tally_light: u32,
    /// SPITE swipes this period.
    pub tally_spite: u32,
    /// Points spent per stat.
    pub stats: BTreeMap<Stat, u32>,
    /// Points left to allocate.
    #[ts(type = "number")]
    pub available_points: u64,
    /// Boss encounter state.
    pub encounter: EncounterState,
    /// Bosses defeated, ever.
    pub kills_lifetime: u32,
    /// Founder cohort rank, if any.
    pub cohort_rank: Option<u32>,
    /// Percentage boost applied to health and damage (0 outside the cohort).
    pub boost_pct: u32,
    /// Owned items.
    pub inventory: Vec<InventoryItem>,
}

/// A faction transition observed while handling a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FactionChange {
    /// Faction before the change.
    pub from: Faction,
    /// Faction after the change.
    pub to: Faction,
    /// What triggered the change.
    pub reason: FactionChangeReason,
    /// Period (`YYYY-MM`) whose tallies decided the outcome.
    pub period_key: String,
}

/// A boss that appeared on this scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BossSpawn {
    /// Cycle the boss belongs to.
    pub cycle_index: u32,
    /// Starting boss health.
    pub boss_hp: u32,
    /// Player health entering the fight.
    pub player_hp: u32,
}

/// Outcome of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScanOutcome {
    /// Direction that was recorded.
    pub direction: SwipeDirection,
    /// Presentation mode for the next target.
    pub mode: ScanMode,
    /// Whether the scan cost one energy.
    pub energy_spent: bool,
    /// Position of the scan within its cycle (1-based).
    pub pos_in_cycle: u32,
    /// How the spawn check was decided.
    pub spawn_decision: SpawnDecision,
    /// The boss that spawned, if any.
    pub boss: Option<BossSpawn>,
}

/// Reward granted on victory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LootDrop {
    /// Rolled rarity.
    pub rarity: Rarity,
    /// Display name of the item.
    pub name: String,
    /// Catalog code, absent for virtual crates.
    pub code: Option<String>,
    /// Instance id of the stored item, absent for virtual crates.
    pub item_id: Option<ItemInstanceId>,
    /// Whether the drop was added to the inventory.
    pub stored: bool,
}

/// Outcome of one combat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CombatOutcome {
    /// Action the player took.
    pub action: CombatAction,
    /// Turn number after this action (1-based).
    pub turn: u32,
    /// Damage dealt to the boss.
    pub player_damage: u32,
    /// Health restored to the player.
    pub healed: u32,
    /// Damage the boss dealt back.
    pub boss_damage: u32,
    /// Boss health after the turn.
    pub boss_hp: u32,
    /// Player health after the turn.
    pub player_hp: u32,
    /// Turn result.
    pub result: TurnOutcome,
    /// Loot on victory.
    pub loot: Option<LootDrop>,
}

/// Outcome of a stat allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AllocationOutcome {
    /// Points added per stat by this request.
    pub allocated: BTreeMap<Stat, u32>,
    /// Points left after the allocation.
    #[ts(type = "number")]
    pub available_points: u64,
    /// Recomputed maximum health.
    pub player_hp_max: u32,
}

/// Outcome of a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Registration {
    /// Whether this call created the player.
    pub created: bool,
    /// Founder cohort rank, if admitted.
    pub cohort_rank: Option<u32>,
}

/// Outcome of equipping an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EquipOutcome {
    /// Item now worn.
    pub item_id: ItemInstanceId,
    /// Slot it occupies.
    pub slot: EquipSlot,
    /// Item that was taken off, if the slot was occupied.
    pub unequipped: Option<ItemInstanceId>,
    /// Recomputed maximum health.
    pub player_hp_max: u32,
}

/// One row of the hall of fame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HallEntry {
    /// 1-based position.
    pub position: u32,
    /// Player identity.
    pub player_id: PlayerId,
    /// Bosses defeated, ever.
    pub kills_lifetime: u32,
    /// Scans made on the player's last active day.
    pub scans_today: u32,
    /// Current faction.
    pub faction: Faction,
    /// Whether the player belongs to the founder cohort.
    pub cohort_member: bool,
    /// Points spent per stat.
    pub stats: BTreeMap<Stat, u32>,
}

/// Envelope returned by every mutating engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct ActionReport<T> {
    /// Action-specific outcome.
    pub outcome: T,
    /// Player snapshot after the action.
    pub view: PlayerView,
    /// Faction changes applied during the request.
    pub faction_changes: Vec<FactionChange>,
}
