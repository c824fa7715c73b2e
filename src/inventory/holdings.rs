use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::ItemCatalog;
use crate::shared::*;

/// The player's bag. Capacity is a bound callers check with
/// `is_inventory_full` before adding; `add_item` itself never refuses.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    /// Item id → quantity. Only positive quantities are ever stored.
    pub holdings: BTreeMap<ItemId, u32>,
    pub money: u32,
    pub capacity: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INVENTORY_CAPACITY)
    }
}

impl Inventory {
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            holdings: BTreeMap::new(),
            money: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn add_item(&mut self, item_id: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let entry = self.holdings.entry(item_id.to_string()).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Take `quantity` away. Removing at least what is held deletes the entry.
    /// Returns false when the item was not held at all.
    pub fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool {
        let Some(held) = self.holdings.get_mut(item_id) else {
            return false;
        };
        if quantity >= *held {
            self.holdings.remove(item_id);
        } else {
            *held -= quantity;
        }
        true
    }

    pub fn quantity(&self, item_id: &str) -> u32 {
        self.holdings.get(item_id).copied().unwrap_or(0)
    }

    pub fn has_item(&self, item_id: &str, quantity: u32) -> bool {
        self.quantity(item_id) >= quantity.max(1)
    }

    pub fn total_quantity(&self) -> u32 {
        self.holdings.values().fold(0u32, |sum, q| sum.saturating_add(*q))
    }

    pub fn is_inventory_full(&self) -> bool {
        self.total_quantity() >= self.capacity
    }

    pub fn free_space(&self) -> u32 {
        self.capacity.saturating_sub(self.total_quantity())
    }

    pub fn add_money(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    pub fn spend_money(&mut self, amount: u32) -> bool {
        if self.money < amount {
            return false;
        }
        self.money -= amount;
        true
    }

    /// Re-establish the bag's shape after loading: no empty entries and a
    /// positive capacity.
    pub fn normalize(&mut self) {
        self.holdings.retain(|id, quantity| {
            if *quantity == 0 {
                warn!("[Inventory] Dropping empty entry '{}'", id);
            }
            *quantity > 0
        });
        self.capacity = self.capacity.max(1);
    }

    /// Drop entries whose item no longer exists in the catalog.
    pub fn prune_orphans(&mut self, catalog: &ItemCatalog) -> Vec<ItemId> {
        let orphans: Vec<ItemId> = self
            .holdings
            .keys()
            .filter(|id| !catalog.contains(id))
            .cloned()
            .collect();
        for id in &orphans {
            warn!("[Inventory] Pruning unknown item '{}'", id);
            self.holdings.remove(id);
        }
        orphans
    }
}
