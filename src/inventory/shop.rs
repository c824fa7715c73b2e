//! Selling catch and loot at a shop.

use bevy::prelude::*;

use super::holdings::Inventory;
use crate::catalog::ItemCatalog;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellRejection {
    UnknownItem,
    NotSellable,
    NotEnough { have: u32 },
}

/// Sell `quantity` of an item for its catalog cost each. Returns the money
/// earned. Nothing changes on rejection.
pub fn sell_item(
    inventory: &mut Inventory,
    catalog: &ItemCatalog,
    item_id: &str,
    quantity: u32,
) -> Result<u32, SellRejection> {
    let Some(item) = catalog.lookup_item(item_id) else {
        return Err(SellRejection::UnknownItem);
    };
    if !item.kind.is_sellable() {
        return Err(SellRejection::NotSellable);
    }
    let quantity = quantity.max(1);
    let have = inventory.quantity(item_id);
    if have < quantity {
        return Err(SellRejection::NotEnough { have });
    }

    let earned = item.cost.unwrap_or(0).saturating_mul(quantity);
    inventory.remove_item(item_id, quantity);
    inventory.add_money(earned);
    info!("[Inventory] Sold {} × {} for {}", quantity, item.name, earned);
    Ok(earned)
}
