//! Enumeration types for the AZEUQER progression engine.
//!
//! Wire names are `SCREAMING_SNAKE_CASE` (`"LIGHT"`, `"STR"`, `"NO_ENCOUNTER"`)
//! because the client shell already speaks that vocabulary.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Factions and swipes
// ---------------------------------------------------------------------------

/// The faction a player belongs to for the current monthly period.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Faction {
    /// No faction yet (new player, or a period with no swipes).
    #[default]
    Unassigned,
    /// Side A, won by LIGHT swipes.
    Euphoria,
    /// Side B, won by SPITE swipes.
    Dissonance,
}

impl Faction {
    /// The faction a swipe direction counts toward.
    pub const fn for_direction(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Light => Self::Euphoria,
            SwipeDirection::Spite => Self::Dissonance,
        }
    }
}

/// Direction of a single scan (swipe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwipeDirection {
    /// Approving swipe. Counts toward Euphoria.
    Light,
    /// Rejecting swipe. Counts toward Dissonance.
    Spite,
}

/// Presentation mode the client uses for the next scan target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanMode {
    /// The first scans of the day, before sorting kicks in.
    Initiation,
    /// Regular sorted scanning.
    Sorted,
}

/// Why a player's faction changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactionChangeReason {
    /// Assignment from the tallies of a period that just ended.
    MonthBoundary,
    /// Early lock once the period tally crossed the initiation threshold.
    Initiation,
}

// ---------------------------------------------------------------------------
// Stats and items
// ---------------------------------------------------------------------------

/// An allocatable character stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stat {
    /// Strength. Main attack contributor.
    Str,
    /// Agility.
    Agi,
    /// Intellect. Secondary attack contributor.
    Int,
    /// Vitality. Raises maximum health.
    Vit,
}

impl Stat {
    /// All stats in display order.
    pub const ALL: [Self; 4] = [Self::Str, Self::Agi, Self::Int, Self::Vit];
}

/// Loot rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    /// Most frequent drop.
    Common,
    /// Uncommon drop.
    Rare,
    /// Scarce drop.
    Epic,
    /// Very scarce drop.
    Mythic,
}

impl Rarity {
    /// Upper-case label used for virtual crate names.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Common => "COMMON",
            Self::Rare => "RARE",
            Self::Epic => "EPIC",
            Self::Mythic => "MYTHIC",
        }
    }
}

/// Equipment slot an item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipSlot {
    /// Headgear.
    Head,
    /// Torso garments.
    Chest,
    /// Legwear and footwear.
    Legs,
    /// Held weapon.
    Weapon,
    /// Trinkets and stickers.
    Accessory,
}

// ---------------------------------------------------------------------------
// Encounters
// ---------------------------------------------------------------------------

/// A player's move during an active boss encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombatAction {
    /// Deal damage to the boss.
    Attack,
    /// Restore a share of maximum health.
    Heal,
}

/// Phase of the boss encounter for the current cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncounterPhase {
    /// No boss for the current cycle (yet).
    #[default]
    NoEncounter,
    /// A boss is up and accepting turns.
    Active,
    /// The boss was defeated this cycle.
    Victory,
    /// The player was defeated this cycle.
    Defeat,
}

impl EncounterPhase {
    /// Whether the phase ends the encounter for its cycle.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

/// Result of a single combat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnOutcome {
    /// Both sides still standing.
    Continue,
    /// The boss fell.
    Victory,
    /// The player fell.
    Defeat,
}

/// How the spawn check for the current scan was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpawnDecision {
    /// The boss already spawned for this cycle.
    AlreadySpawned,
    /// The scan sits before the spawn window.
    BeforeWindow,
    /// The scan sits after the spawn window (short windows only).
    AfterWindow,
    /// The last position of the window forced the spawn.
    Guaranteed,
    /// A seeded roll inside the window succeeded.
    Rolled,
    /// A seeded roll inside the window failed.
    RollMissed,
}

impl SpawnDecision {
    /// Whether the decision produced a spawn.
    pub const fn spawned(self) -> bool {
        matches!(self, Self::Guaranteed | Self::Rolled)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Stable error code returned to callers on every rejected action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The player has no state yet.
    NotRegistered,
    /// A paid scan was attempted with an empty energy pool.
    InsufficientEnergy,
    /// A combat turn was attempted without an active boss.
    EncounterNotActive,
    /// An allocation asked for more points than available.
    InsufficientPoints,
    /// Concurrent writers kept winning; retry the whole request.
    VersionConflict,
    /// The storage backend could not be reached.
    StorageUnavailable,
    /// A malformed allocation (negative or empty).
    InvalidAllocation,
    /// The email address failed validation.
    InvalidEmail,
    /// The email is bound to another player.
    EmailTaken,
    /// The item is not in the player's inventory.
    ItemNotFound,
    /// The item cannot be worn in the requested slot.
    SlotMismatch,
    /// A counter would have overflowed.
    ArithmeticOverflow,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_screaming_case() {
        assert_eq!(serde_json::to_string(&Stat::Str).unwrap(), "\"STR\"");
        assert_eq!(
            serde_json::to_string(&EncounterPhase::NoEncounter).unwrap(),
            "\"NO_ENCOUNTER\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::InsufficientPoints).unwrap(),
            "\"INSUFFICIENT_POINTS\""
        );
        let dir: SwipeDirection = serde_json::from_str("\"SPITE\"").unwrap();
        assert_eq!(dir, SwipeDirection::Spite);
    }

    #[test]
    fn direction_maps_to_faction() {
        assert_eq!(Faction::for_direction(SwipeDirection::Light), Faction::Euphoria);
        assert_eq!(Faction::for_direction(SwipeDirection::Spite), Faction::Dissonance);
    }

    #[test]
    fn terminal_phases() {
        assert!(EncounterPhase::Victory.is_terminal());
        assert!(EncounterPhase::Defeat.is_terminal());
        assert!(!EncounterPhase::Active.is_terminal());
        assert!(!EncounterPhase::NoEncounter.is_terminal());
    }
}
