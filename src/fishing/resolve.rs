//! Catch resolution: turn a won minigame into an item and a smaller pool.

use rand::Rng;

use super::fish_select::{select_fish, select_treasure};
use crate::catalog::ItemCatalog;
use crate::inventory::Inventory;
use crate::islands::IslandManager;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchRejection {
    /// Area unknown, or its live element hands out nothing.
    NothingLive,
    Depleted,
    InventoryFull,
    /// The catalog has nothing that could be awarded.
    EmptyPool,
}

/// Award one item for a won minigame at `area_id` and take one unit from the
/// area's pool. On rejection neither the bag nor the pool changes.
pub fn resolve_catch<R: Rng + ?Sized>(
    area_id: &str,
    manager: &mut IslandManager,
    inventory: &mut Inventory,
    catalog: &ItemCatalog,
    rng: &mut R,
) -> Result<ItemId, CatchRejection> {
    let Some(element_type) = manager.live_element(area_id).map(|e| e.element_type) else {
        return Err(CatchRejection::NothingLive);
    };
    if manager.is_resource_depleted(area_id) {
        return Err(CatchRejection::Depleted);
    }
    if inventory.is_inventory_full() {
        return Err(CatchRejection::InventoryFull);
    }

    let picked = match element_type {
        ElementType::Fishing => {
            let band = manager.assignment(area_id).and_then(|a| a.band.as_ref());
            select_fish(catalog, band, rng)
        }
        ElementType::Treasure => select_treasure(catalog, rng),
        ElementType::Safehouse | ElementType::Shop => return Err(CatchRejection::NothingLive),
    };
    let Some(item_id) = picked else {
        return Err(CatchRejection::EmptyPool);
    };

    inventory.add_item(&item_id, 1);
    manager.reduce_fish(area_id);
    Ok(item_id)
}
