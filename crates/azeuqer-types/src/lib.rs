//! Shared type definitions for the AZEUQER progression engine.
//!
//! This crate is the single source of truth for the data that flows between
//! the engine, its storage adapters, and the client shell. Types flow
//! downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Player and item identifiers
//! - [`enums`] -- Factions, stats, rarities, encounter phases, error codes
//! - [`structs`] -- `PlayerState` and its nested records
//! - [`outcomes`] -- Per-action result objects and the player view

pub mod enums;
pub mod ids;
pub mod outcomes;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    CombatAction, EncounterPhase, EquipSlot, ErrorCode, Faction, FactionChangeReason, Rarity,
    ScanMode, SpawnDecision, Stat, SwipeDirection, TurnOutcome,
};
pub use ids::{ItemInstanceId, PlayerId};
pub use outcomes::{
    ActionReport, AllocationOutcome, BossSpawn, CombatOutcome, EquipOutcome, FactionChange,
    HallEntry, LootDrop, PlayerView, Registration, ScanOutcome,
};
pub use structs::{EncounterState, InventoryItem, ItemDefinition, PlayerState};
