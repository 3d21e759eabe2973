//! Clock-derived resources, encounters, factions, and the action engine.
//!
//! This crate owns every rule of the progression game. It has no I/O of its
//! own: storage and the founder cohort counter are reached through the
//! [`PlayerStore`] and [`CohortGate`] traits, and time through [`Clock`].
//!
//! # Modules
//!
//! - [`clock`] -- [`Clock`] trait, system and manual clocks, calendar keys
//! - [`config`] -- Configuration loading from `azeuqer-config.yaml`
//! - [`energy`] -- Lazy, interval-exact energy regeneration
//! - [`daily`] -- Day-key rollover and the free scan quota
//! - [`encounter`] -- Boss spawn window resolution
//! - [`combat`] -- Combat turn state machine
//! - [`loot`] -- Rarity-weighted loot rolls
//! - [`faction`] -- Monthly faction assignment and initiation
//! - [`stats`] -- Stat-point ledger and derived values
//! - [`inventory`] -- Equipping items
//! - [`cohort`] -- Founder cohort admission gate
//! - [`store`] -- Player state persistence contract
//! - [`rng`] -- Seeded generators
//! - [`view`] -- Client-facing projections
//! - [`engine`] -- The load, advance, mutate, save cycle
//! - [`error`] -- [`EngineError`] and its stable codes
//!
//! [`PlayerStore`]: store::PlayerStore
//! [`CohortGate`]: cohort::CohortGate
//! [`Clock`]: clock::Clock
//! [`EngineError`]: error::EngineError

pub mod clock;
pub mod cohort;
pub mod combat;
pub mod config;
pub mod daily;
pub mod encounter;
pub mod energy;
pub mod engine;
pub mod error;
pub mod faction;
pub mod inventory;
pub mod loot;
pub mod rng;
pub mod stats;
pub mod store;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cohort::{CohortError, CohortGate, InMemoryCohortGate};
pub use config::{ConfigError, EngineConfig};
pub use engine::ProgressionEngine;
pub use error::EngineError;
pub use store::{InMemoryPlayerStore, PlayerStore, StoreError};
