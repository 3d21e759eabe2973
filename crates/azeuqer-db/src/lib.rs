//! Data layer for AZEUQER (`PostgreSQL` + `Dragonfly`).
//!
//! `PostgreSQL` holds one row per player with the full progression state and
//! the optimistic concurrency version. `Dragonfly` holds the founder cohort
//! counter, the single value every engine instance contends on.
//!
//! ```text
//! ProgressionEngine
//!     |
//!     +-- PlayerStore --> PgPlayerStore        (players table, CAS on version)
//!     |
//!     +-- CohortGate ---> DragonflyCohortGate  (Lua admission script)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and migrations
//! - [`player_store`] -- [`PgPlayerStore`]
//! - [`dragonfly`] -- `Dragonfly` connection and [`DragonflyCohortGate`]
//! - [`error`] -- [`DbError`] and its mapping onto engine errors

pub mod dragonfly;
pub mod error;
pub mod player_store;
pub mod postgres;

pub use dragonfly::{DragonflyCohortGate, DragonflyPool};
pub use error::DbError;
pub use player_store::{PgPlayerStore, PlayerRow};
pub use postgres::PostgresPool;
