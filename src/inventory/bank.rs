//! Safehouse storage. Unbounded, and never counted against bag capacity.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::holdings::Inventory;
use crate::shared::*;

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageBank {
    pub holdings: BTreeMap<ItemId, u32>,
}

impl StorageBank {
    pub fn quantity(&self, item_id: &str) -> u32 {
        self.holdings.get(item_id).copied().unwrap_or(0)
    }

    /// Move up to `quantity` from the bag into the bank. Returns how many moved.
    pub fn deposit(&mut self, inventory: &mut Inventory, item_id: &str, quantity: u32) -> u32 {
        let moved = inventory.quantity(item_id).min(quantity);
        if moved == 0 {
            return 0;
        }
        inventory.remove_item(item_id, moved);
        let entry = self.holdings.entry(item_id.to_string()).or_insert(0);
        *entry = entry.saturating_add(moved);
        moved
    }

    /// Move up to `quantity` back into the bag, limited by its free space.
    pub fn withdraw(&mut self, inventory: &mut Inventory, item_id: &str, quantity: u32) -> u32 {
        let moved = self.quantity(item_id).min(quantity).min(inventory.free_space());
        if moved == 0 {
            return 0;
        }
        match self.holdings.get_mut(item_id) {
            Some(held) if *held > moved => *held -= moved,
            _ => {
                self.holdings.remove(item_id);
            }
        }
        inventory.add_item(item_id, moved);
        moved
    }
}
