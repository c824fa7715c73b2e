//! Equipped rods and the moves between the bag and the rod rack.

use bevy::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

use super::bank::StorageBank;
use super::holdings::Inventory;
use crate::catalog::ItemCatalog;
use crate::shared::*;

#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RodStorage {
    /// Each rod id appears at most once.
    pub rod_ids: Vec<ItemId>,
    /// Out-of-range, negative or missing means no active rod.
    #[serde(default, deserialize_with = "lenient_index")]
    pub active_index: Option<usize>,
    pub max_rod_slots: u32,
}

impl Default for RodStorage {
    fn default() -> Self {
        Self {
            rod_ids: Vec::new(),
            active_index: None,
            max_rod_slots: DEFAULT_ROD_SLOTS,
        }
    }
}

/// Saved records may carry `-1` for "nothing active".
fn lenient_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(|i| usize::try_from(i).ok()))
}

impl RodStorage {
    /// Bring a loaded record back in line: unique catalog rods only, at most
    /// `max_rod_slots` of them, and an active index that points at one.
    /// The active rod survives when it is kept. Returns the dropped ids.
    pub fn normalize(&mut self, catalog: &ItemCatalog) -> Vec<ItemId> {
        self.max_rod_slots = self.max_rod_slots.max(1);
        let active = self.active_rod_id().map(str::to_string);

        let mut kept: Vec<ItemId> = Vec::new();
        let mut dropped = Vec::new();
        for id in self.rod_ids.drain(..) {
            if !catalog.is_rod(&id)
                || kept.contains(&id)
                || kept.len() >= self.max_rod_slots as usize
            {
                dropped.push(id);
            } else {
                kept.push(id);
            }
        }
        for id in &dropped {
            warn!("[Inventory] Dropping rod '{}' from the rack", id);
        }

        self.active_index = active.and_then(|id| kept.iter().position(|k| *k == id));
        self.rod_ids = kept;
        dropped
    }

    pub fn has_free_slot(&self) -> bool {
        (self.rod_ids.len() as u32) < self.max_rod_slots
    }

    pub fn contains(&self, rod_id: &str) -> bool {
        self.rod_ids.iter().any(|id| id == rod_id)
    }

    /// Rack a rod. The first rod racked while nothing is active becomes active.
    pub fn add_rod(&mut self, rod_id: &str) -> bool {
        if !self.has_free_slot() || self.contains(rod_id) {
            return false;
        }
        self.rod_ids.push(rod_id.to_string());
        if self.active_rod_id().is_none() {
            self.active_index = Some(self.rod_ids.len() - 1);
        }
        true
    }

    pub fn remove_rod(&mut self, rod_id: &str) -> bool {
        let Some(index) = self.rod_ids.iter().position(|id| id == rod_id) else {
            return false;
        };
        self.rod_ids.remove(index);
        self.active_index = match self.active_index {
            Some(active) if active == index => None,
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        true
    }

    pub fn active_rod_id(&self) -> Option<&str> {
        self.active_index
            .and_then(|i| self.rod_ids.get(i))
            .map(String::as_str)
    }

    pub fn active_rod_class(&self, catalog: &ItemCatalog) -> u32 {
        self.active_rod_id()
            .map_or(0, |id| catalog.rod_class(id))
    }

    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.rod_ids.len() {
            return false;
        }
        self.active_index = Some(index);
        true
    }

    /// Step to the next racked rod, wrapping around.
    pub fn cycle_active(&mut self) {
        if self.rod_ids.is_empty() {
            self.active_index = None;
            return;
        }
        let next = match self.active_index {
            Some(i) if i < self.rod_ids.len() => (i + 1) % self.rod_ids.len(),
            _ => 0,
        };
        self.active_index = Some(next);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RodTransferError {
    #[error("'{0}' is not a rod")]
    NotARod(ItemId),
    #[error("'{0}' is not in the inventory")]
    NotHeld(ItemId),
    #[error("no free rod slot")]
    NoFreeSlot,
    #[error("'{0}' is already equipped")]
    AlreadyEquipped(ItemId),
    #[error("'{0}' is not equipped")]
    NotEquipped(ItemId),
    #[error("inventory is full")]
    InventoryFull,
}

/// Move a rod from the bag onto the rack. On any rejection neither store
/// changes.
pub fn equip_rod(
    inventory: &mut Inventory,
    rods: &mut RodStorage,
    catalog: &ItemCatalog,
    rod_id: &str,
) -> Result<(), RodTransferError> {
    if !catalog.is_rod(rod_id) {
        return Err(RodTransferError::NotARod(rod_id.to_string()));
    }
    if !inventory.has_item(rod_id, 1) {
        return Err(RodTransferError::NotHeld(rod_id.to_string()));
    }
    if rods.contains(rod_id) {
        return Err(RodTransferError::AlreadyEquipped(rod_id.to_string()));
    }
    if !rods.add_rod(rod_id) {
        return Err(RodTransferError::NoFreeSlot);
    }
    inventory.remove_item(rod_id, 1);
    info!("[Inventory] Equipped '{}'", rod_id);
    Ok(())
}

/// Move a rod from the rack back into the bag.
pub fn unequip_rod(
    inventory: &mut Inventory,
    rods: &mut RodStorage,
    rod_id: &str,
) -> Result<(), RodTransferError> {
    if inventory.is_inventory_full() {
        return Err(RodTransferError::InventoryFull);
    }
    if !rods.remove_rod(rod_id) {
        return Err(RodTransferError::NotEquipped(rod_id.to_string()));
    }
    inventory.add_item(rod_id, 1);
    info!("[Inventory] Unequipped '{}'", rod_id);
    Ok(())
}

/// Give a first-time player a rod if they own none anywhere.
/// Returns whether a rod was granted.
pub fn ensure_starter_rod(
    inventory: &Inventory,
    bank: &StorageBank,
    rods: &mut RodStorage,
    catalog: &ItemCatalog,
    starter_rod: &str,
) -> bool {
    let holds_rod = |holdings: &std::collections::BTreeMap<ItemId, u32>| {
        holdings.keys().any(|id| catalog.is_rod(id))
    };
    if !rods.rod_ids.is_empty() || holds_rod(&inventory.holdings) || holds_rod(&bank.holdings) {
        return false;
    }
    if catalog.lookup_item(starter_rod).is_none() {
        warn!("[Inventory] Starter rod '{}' missing from catalog; granting anyway", starter_rod);
    }
    let granted = rods.add_rod(starter_rod);
    if granted {
        info!("[Inventory] Granted starter rod '{}'", starter_rod);
    }
    granted
}
