//! The action engine.
//!
//! Every player action runs through [`ProgressionEngine::apply_mutation`]:
//!
//! 1. Read the clock once and derive the day and month keys
//! 2. Load the player's state
//! 3. Advance clock-derived counters (daily rollover, month rollover,
//!    energy regeneration, derived health)
//! 4. Apply the action to a copy of the state
//! 5. Commit the copy with one compare-and-save on the loaded version
//!
//! A version conflict replays the whole sequence against fresh state, up to
//! `engine.max_conflict_retries` attempts. An error at any step returns
//! before the save, so no action ever applies partially.

use std::collections::BTreeMap;

use azeuqer_types::{
    ActionReport, AllocationOutcome, CombatAction, CombatOutcome, EncounterState, EquipOutcome,
    EquipSlot, Faction, FactionChange, HallEntry, ItemInstanceId, PlayerId, PlayerState,
    Registration, ScanOutcome, Stat, SwipeDirection,
};
use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info, warn};

use crate::clock::{self, CalendarKeys, Clock};
use crate::cohort::CohortGate;
use crate::config::{ConfigError, EngineConfig};
use crate::energy::{self, EnergyPool};
use crate::error::EngineError;
use crate::store::{PlayerStore, StoreError};
use crate::{combat, daily, encounter, faction, inventory, stats, view};

/// Hall of fame rows returned at most.
pub const HALL_OF_FAME_MAX: u32 = 50;

/// Per-attempt context handed to an action.
#[derive(Debug, Clone)]
pub struct MutationContext {
    /// The instant this attempt runs at.
    pub now: DateTime<Utc>,
    /// Calendar keys for `now`.
    pub keys: CalendarKeys,
    /// Faction changes applied so far in this attempt.
    pub faction_changes: Vec<FactionChange>,
}

/// Server-authoritative progression engine.
#[derive(Debug)]
pub struct ProgressionEngine<S, G, C> {
    config: EngineConfig,
    offset: FixedOffset,
    store: S,
    gate: G,
    clock: C,
}

impl<S, G, C> ProgressionEngine<S, G, C>
where
    S: PlayerStore,
    G: CohortGate,
    C: Clock,
{
    /// Build an engine over a store, a cohort gate, and a clock.
    pub fn new(config: EngineConfig, store: S, gate: G, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let offset = clock::utc_offset(config.daily.utc_offset_minutes).map_err(|e| {
            ConfigError::Invalid {
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            config,
            offset,
            store,
            gate,
            clock,
        })
    }

    /// The active configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The cohort gate.
    pub const fn gate(&self) -> &G {
        &self.gate
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Register a player and bind their email.
    ///
    /// Registering an existing player returns its state without consulting
    /// the cohort gate again. A registration whose row is never written
    /// releases its cohort admission.
    pub async fn register(
        &self,
        player_id: PlayerId,
        email: &str,
    ) -> Result<ActionReport<Registration>, EngineError> {
        let email = normalize_email(email)?;

        if let Some(owner) = self.store.find_by_email(&email).await?
            && owner != player_id
        {
            return Err(EngineError::EmailTaken);
        }

        if self.store.load(player_id).await?.is_some() {
            return self.existing_registration(player_id).await;
        }

        let rank = self.gate.admit(player_id, self.config.cohort.limit).await?;
        let mut state = self.new_player(player_id, email, rank, self.clock.now());

        match self.store.create(&state).await {
            Ok(version) => state.version = version,
            Err(StoreError::AlreadyExists) => {
                debug!(player_id = %player_id, "lost registration race, reloading");
                return self.existing_registration(player_id).await;
            }
            Err(e) => {
                self.release_unpersisted(player_id).await;
                return Err(e.into());
            }
        }

        info!(
            player_id = %player_id,
            cohort_rank = ?rank,
            "player registered"
        );

        Ok(ActionReport {
            outcome: Registration {
                created: true,
                cohort_rank: rank,
            },
            view: view::player_view(&state, &self.config),
            faction_changes: Vec::new(),
        })
    }

    /// Apply pending clock-derived changes and return the player's view.
    pub async fn refresh(&self, player_id: PlayerId) -> Result<ActionReport<()>, EngineError> {
        self.apply_mutation(player_id, |_, _| Ok(())).await
    }

    /// Record one scan.
    pub async fn scan(
        &self,
        player_id: PlayerId,
        direction: SwipeDirection,
    ) -> Result<ActionReport<ScanOutcome>, EngineError> {
        let config = &self.config;
        self.apply_mutation(player_id, |state, ctx| {
            let mut energy_spent = false;
            if daily::scan_costs_energy(state.scans_today, &config.daily) {
                let pool = EnergyPool {
                    energy: state.energy,
                    anchor: state.energy_anchor,
                };
                let pool = energy::spend(pool, ctx.now, &config.energy)
                    .ok_or(EngineError::InsufficientEnergy)?;
                state.energy = pool.energy;
                state.energy_anchor = pool.anchor;
                energy_spent = true;
            }

            state.scans_today = increment(state.scans_today, "scans today")?;
            match direction {
                SwipeDirection::Light => {
                    state.light_today = increment(state.light_today, "light today")?;
                    state.tally_light = increment(state.tally_light, "light tally")?;
                    state.lifetime_light = increment(state.lifetime_light, "lifetime light")?;
                }
                SwipeDirection::Spite => {
                    state.spite_today = increment(state.spite_today, "spite today")?;
                    state.tally_spite = increment(state.tally_spite, "spite tally")?;
                    state.lifetime_spite = increment(state.lifetime_spite, "lifetime spite")?;
                }
            }

            if let Some(change) =
                faction::check_initiation(state, config.faction.initiation_threshold)
            {
                ctx.faction_changes.push(change);
            }

            let check = encounter::resolve_spawn(state, &config.encounter)?;

            debug!(
                player_id = %state.player_id,
                scans_today = state.scans_today,
                ?direction,
                energy_spent,
                decision = ?check.decision,
                "scan recorded"
            );

            Ok(ScanOutcome {
                direction,
                mode: daily::scan_mode(state.scans_today, &config.daily),
                energy_spent,
                pos_in_cycle: check.position.pos_in_cycle,
                spawn_decision: check.decision,
                boss: check.boss,
            })
        })
        .await
    }

    /// Take one combat turn against the current boss.
    pub async fn encounter_action(
        &self,
        player_id: PlayerId,
        action: CombatAction,
    ) -> Result<ActionReport<CombatOutcome>, EngineError> {
        let config = &self.config;
        self.apply_mutation(player_id, |state, ctx| {
            combat::take_turn(state, action, config, ctx.now)
        })
        .await
    }

    /// Spend stat points.
    pub async fn allocate(
        &self,
        player_id: PlayerId,
        deltas: &BTreeMap<Stat, i64>,
    ) -> Result<ActionReport<AllocationOutcome>, EngineError> {
        let config = &self.config;
        self.apply_mutation(player_id, |state, _| {
            let allocated = stats::allocate(state, deltas)?;
            stats::refresh_derived(state, &config.player, &config.cohort);
            debug!(player_id = %state.player_id, ?allocated, "stat points allocated");
            Ok(AllocationOutcome {
                allocated,
                available_points: state.available_points(),
                player_hp_max: state.encounter.player_hp_max,
            })
        })
        .await
    }

    /// Equip an owned item.
    pub async fn equip(
        &self,
        player_id: PlayerId,
        item_id: ItemInstanceId,
        slot: EquipSlot,
    ) -> Result<ActionReport<EquipOutcome>, EngineError> {
        let config = &self.config;
        self.apply_mutation(player_id, |state, _| {
            let unequipped = inventory::equip(state, item_id, slot)?;
            stats::refresh_derived(state, &config.player, &config.cohort);
            Ok(EquipOutcome {
                item_id,
                slot,
                unequipped,
                player_hp_max: state.encounter.player_hp_max,
            })
        })
        .await
    }

    /// Top players by lifetime kills, then today's scans.
    pub async fn hall_of_fame(&self, limit: u32) -> Result<Vec<HallEntry>, EngineError> {
        let today = CalendarKeys::in_offset(self.clock.now(), self.offset).day_key;
        let rows = self
            .store
            .top_players(limit.min(HALL_OF_FAME_MAX), &today)
            .await?;
        Ok(view::hall_of_fame(&rows, &today))
    }

    /// Number of players that have passed through the cohort gate.
    pub async fn cohort_admitted(&self) -> Result<u64, EngineError> {
        Ok(self.gate.admitted_count().await?)
    }

    // -----------------------------------------------------------------------
    // Mutation cycle
    // -----------------------------------------------------------------------

    /// Load, advance, mutate, and compare-and-save one player.
    ///
    /// `action` may run more than once, each time against freshly loaded
    /// state. A state that comes out unchanged is not written.
    pub async fn apply_mutation<T, F>(
        &self,
        player_id: PlayerId,
        mut action: F,
    ) -> Result<ActionReport<T>, EngineError>
    where
        F: FnMut(&mut PlayerState, &mut MutationContext) -> Result<T, EngineError> + Send,
        T: Send,
    {
        let attempts = self.config.engine.max_conflict_retries;
        for attempt in 1..=attempts {
            let now = self.clock.now();
            let mut ctx = MutationContext {
                now,
                keys: CalendarKeys::in_offset(now, self.offset),
                faction_changes: Vec::new(),
            };

            let loaded = self
                .store
                .load(player_id)
                .await?
                .ok_or(EngineError::NotRegistered { player_id })?;
            let mut state = loaded.clone();

            self.advance(&mut state, &mut ctx);
            let outcome = action(&mut state, &mut ctx)?;
            stats::refresh_derived(&mut state, &self.config.player, &self.config.cohort);

            if state != loaded {
                match self.store.compare_and_save(loaded.version, &state).await {
                    Ok(version) => state.version = version,
                    Err(StoreError::VersionConflict) => {
                        warn!(
                            player_id = %player_id,
                            attempt,
                            max_attempts = attempts,
                            "version conflict, retrying"
                        );
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            return Ok(ActionReport {
                outcome,
                view: view::player_view(&state, &self.config),
                faction_changes: ctx.faction_changes,
            });
        }

        Err(EngineError::VersionConflict { attempts })
    }

    /// Bring clock-derived counters up to `ctx.now`.
    fn advance(&self, state: &mut PlayerState, ctx: &mut MutationContext) {
        stats::refresh_derived(state, &self.config.player, &self.config.cohort);
        if daily::rollover(state, &ctx.keys.day_key, &self.config.encounter) {
            debug!(player_id = %state.player_id, day = %ctx.keys.day_key, "daily rollover");
        }
        if let Some(change) = faction::month_rollover(state, &ctx.keys.month_key) {
            ctx.faction_changes.push(change);
        }
        let pool = energy::regen(
            EnergyPool {
                energy: state.energy,
                anchor: state.energy_anchor,
            },
            ctx.now,
            &self.config.energy,
        );
        state.energy = pool.energy;
        state.energy_anchor = pool.anchor;
    }

    async fn existing_registration(
        &self,
        player_id: PlayerId,
    ) -> Result<ActionReport<Registration>, EngineError> {
        self.apply_mutation(player_id, |state, _| {
            Ok(Registration {
                created: false,
                cohort_rank: state.cohort_rank,
            })
        })
        .await
    }

    /// Hand back the cohort answer of a registration whose row never landed.
    ///
    /// A row that exists after all belongs to a concurrent registration of
    /// the same player and keeps its rank.
    async fn release_unpersisted(&self, player_id: PlayerId) {
        match self.store.load(player_id).await {
            Ok(None) => match self.gate.release(player_id).await {
                Ok(rank) => {
                    debug!(player_id = %player_id, cohort_rank = ?rank, "cohort admission released");
                }
                Err(e) => {
                    warn!(player_id = %player_id, error = %e, "cohort admission not released");
                }
            },
            Ok(Some(_)) => {}
            Err(e) => {
                warn!(player_id = %player_id, error = %e, "cohort admission not released");
            }
        }
    }

    fn new_player(
        &self,
        player_id: PlayerId,
        email: String,
        cohort_rank: Option<u32>,
        now: DateTime<Utc>,
    ) -> PlayerState {
        let keys = CalendarKeys::in_offset(now, self.offset);
        let mut state = PlayerState {
            player_id,
            email,
            version: 0,
            created_at: now,
            energy: self.config.energy.max,
            energy_anchor: now,
            day_key: keys.day_key,
            scans_today: 0,
            light_today: 0,
            spite_today: 0,
            month_key: keys.month_key,
            tally_light: 0,
            tally_spite: 0,
            lifetime_light: 0,
            lifetime_spite: 0,
            faction: Faction::Unassigned,
            faction_locked_for_period: false,
            stat_points_spent: BTreeMap::new(),
            encounter: EncounterState::fresh(self.config.encounter.boss_hp_base, 1),
            kills_lifetime: 0,
            inventory: Vec::new(),
            cohort_rank,
        };
        let hp_max = stats::hp_max(
            &state,
            &self.config.player,
            stats::boost_pct(&state, &self.config.cohort),
        );
        state.encounter = EncounterState::fresh(self.config.encounter.boss_hp_base, hp_max);
        state
    }
}

fn increment(value: u32, context: &str) -> Result<u32, EngineError> {
    value
        .checked_add(1)
        .ok_or_else(|| EngineError::overflow(context))
}

/// Trim, lower-case, and minimally validate an email address.
pub fn normalize_email(raw: &str) -> Result<String, EngineError> {
    let email = raw.trim().to_lowercase();
    let invalid = || EngineError::InvalidEmail {
        email: raw.to_owned(),
    };

    let (local, domain) = email.rsplit_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || local.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(
            normalize_email("  Neo@Matrix.IO ").ok().as_deref(),
            Some("neo@matrix.io")
        );
        for bad in ["", "plain", "@x.io", "a@b", "a@.io", "a@io.", "a b@x.io", "a@b@x.io"] {
            assert!(
                matches!(normalize_email(bad), Err(EngineError::InvalidEmail { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
