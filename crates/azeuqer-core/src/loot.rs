//! Rarity-weighted loot rolls.

use azeuqer_types::{InventoryItem, ItemInstanceId, LootDrop, PlayerId, Rarity};
use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};
use rand_chacha::ChaCha8Rng;

use crate::config::{LootConfig, RarityWeights};
use crate::rng;

/// A rolled drop, plus the inventory item to store when it is real.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootRoll {
    /// What the player is told they got.
    pub drop: LootDrop,
    /// Item to append to the inventory; `None` for virtual crates.
    pub item: Option<InventoryItem>,
}

/// Pick a rarity by weight.
pub fn roll_rarity(weights: &RarityWeights, draw: &mut ChaCha8Rng) -> Rarity {
    let total = weights.total();
    if total == 0 {
        return Rarity::Common;
    }
    let mut ticket = draw.random_range(0..total);
    for (rarity, weight) in weights.table() {
        if ticket < weight {
            return rarity;
        }
        ticket = ticket.saturating_sub(weight);
    }
    Rarity::Common
}

/// Roll the victory loot for one cycle.
///
/// The draw is seeded from the player, day, and cycle, so repeating the
/// roll for the same victory yields the same item and the same item id.
pub fn roll(
    player_id: PlayerId,
    day_key: &str,
    cycle_index: u32,
    config: &LootConfig,
    now: DateTime<Utc>,
) -> LootRoll {
    let mut draw = rng::loot_rng(player_id, day_key, cycle_index);
    let rarity = roll_rarity(&config.weights, &mut draw);

    let same_rarity: Vec<_> = config
        .catalog
        .iter()
        .filter(|def| def.rarity == rarity)
        .collect();
    let pool: Vec<_> = if same_rarity.is_empty() {
        config.catalog.iter().collect()
    } else {
        same_rarity
    };

    let picked = if pool.is_empty() {
        None
    } else {
        pool.get(draw.random_range(0..pool.len())).copied()
    };

    let Some(definition) = picked else {
        return LootRoll {
            drop: LootDrop {
                rarity,
                name: format!("{} CRATE", rarity.label()),
                code: None,
                item_id: None,
                stored: false,
            },
            item: None,
        };
    };

    let mut bytes = [0_u8; 16];
    draw.fill_bytes(&mut bytes);
    let id = ItemInstanceId::from_random_bytes(bytes);

    LootRoll {
        drop: LootDrop {
            rarity: definition.rarity,
            name: definition.name.clone(),
            code: Some(definition.code.clone()),
            item_id: Some(id),
            stored: true,
        },
        item: Some(InventoryItem {
            id,
            definition: definition.clone(),
            equipped: false,
            acquired_at: now,
        }),
    }
}
