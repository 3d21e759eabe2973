//! Equipping owned items.

use azeuqer_types::{EquipSlot, ItemInstanceId, PlayerState};

use crate::error::EngineError;

/// Equip `item_id` into `slot`, taking off whatever else occupies the slot.
///
/// Returns the id of the item that was taken off, if any. Equipping an item
/// that is already worn is a no-op.
pub fn equip(
    state: &mut PlayerState,
    item_id: ItemInstanceId,
    slot: EquipSlot,
) -> Result<Option<ItemInstanceId>, EngineError> {
    let item = state
        .inventory
        .iter()
        .find(|item| item.id == item_id)
        .ok_or(EngineError::ItemNotFound { item_id })?;
    if item.definition.slot != slot {
        return Err(EngineError::SlotMismatch {
            item_id,
            expected: item.definition.slot,
            requested: slot,
        });
    }

    let mut unequipped = None;
    for item in &mut state.inventory {
        if item.id == item_id {
            item.equipped = true;
        } else if item.equipped && item.definition.slot == slot {
            item.equipped = false;
            unequipped = Some(item.id);
        }
    }
    Ok(unequipped)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use azeuqer_types::{
        EncounterState, Faction, InventoryItem, ItemDefinition, PlayerId, Rarity,
    };
    use chrono::Utc;

    use super::*;

    fn owned(code: &str, slot: EquipSlot, equipped: bool) -> InventoryItem {
        InventoryItem {
            id: ItemInstanceId::new(),
            definition: ItemDefinition {
                code: code.to_owned(),
                name: code.to_owned(),
                slot,
                rarity: Rarity::Epic,
                hp_bonus: 20,
                dmg_bonus: 0,
            },
            equipped,
            acquired_at: Utc::now(),
        }
    }

    fn state(items: Vec<InventoryItem>) -> PlayerState {
        let now = Utc::now();
        PlayerState {
            player_id: PlayerId(12),
            email: "i@x.io".to_owned(),
            version: 0,
            created_at: now,
            energy: 30,
            energy_anchor: now,
            day_key: "2026-10-01".to_owned(),
            scans_today: 0,
            light_today: 0,
            spite_today: 0,
            month_key: "2026-10".to_owned(),
            tally_light: 0,
            tally_spite: 0,
            lifetime_light: 0,
            lifetime_spite: 0,
            faction: Faction::Unassigned,
            faction_locked_for_period: false,
            stat_points_spent: BTreeMap::new(),
            encounter: EncounterState::fresh(60, 30),
            kills_lifetime: 0,
            inventory: items,
            cohort_rank: None,
        }
    }

    #[test]
    fn swaps_items_in_the_same_slot() {
        let old = owned("NEON_HOODIE", EquipSlot::Chest, true);
        let new = owned("VOID_RUNNER_JACKET", EquipSlot::Chest, false);
        let boots = owned("PRISM_BOOTS", EquipSlot::Legs, true);
        let (old_id, new_id) = (old.id, new.id);
        let mut s = state(vec![old, new, boots]);

        let off = equip(&mut s, new_id, EquipSlot::Chest).unwrap();
        assert_eq!(off, Some(old_id));
        let worn: Vec<_> = s.inventory.iter().filter(|i| i.equipped).map(|i| i.id).collect();
        assert_eq!(worn.len(), 2);
        assert!(worn.contains(&new_id));
    }

    #[test]
    fn unknown_item_is_rejected() {
        let mut s = state(Vec::new());
        let missing = ItemInstanceId::new();
        assert!(matches!(
            equip(&mut s, missing, EquipSlot::Head),
            Err(EngineError::ItemNotFound { item_id }) if item_id == missing
        ));
    }

    #[test]
    fn wrong_slot_is_rejected() {
        let boots = owned("PRISM_BOOTS", EquipSlot::Legs, false);
        let id = boots.id;
        let mut s = state(vec![boots]);
        let before = s.clone();
        assert!(matches!(
            equip(&mut s, id, EquipSlot::Head),
            Err(EngineError::SlotMismatch { .. })
        ));
        assert_eq!(s, before);
    }
}
