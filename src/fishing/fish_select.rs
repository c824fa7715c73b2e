//! What a successful minigame pays out.
//!
//! Fishing draws a fish from the area's cost band; treasure draws any sellable
//! loot. Both weight candidates by inverse cost, so cheap catches dominate.

use rand::Rng;

use crate::catalog::ItemCatalog;
use crate::islands::select::pick_by_inverse_cost;
use crate::shared::*;

fn cost_or_one(item: &&ItemDef) -> u32 {
    item.cost.unwrap_or(1)
}

/// Pick a fish whose cost lies in `band`. An area with no band, or a band no
/// fish falls into, draws from every fish in the catalog.
pub fn select_fish<R: Rng + ?Sized>(
    catalog: &ItemCatalog,
    band: Option<&AssignedBand>,
    rng: &mut R,
) -> Option<ItemId> {
    let eligible = band
        .map(|b| catalog.fish_in_range(b.min_cost, b.max_cost))
        .unwrap_or_default();

    let pool = if eligible.is_empty() {
        catalog.items_of_kind(ItemKind::Fish)
    } else {
        eligible
    };

    pick_by_inverse_cost(&pool, cost_or_one, rng).map(|fish| fish.id.clone())
}

/// Pick one piece of treasure loot.
pub fn select_treasure<R: Rng + ?Sized>(catalog: &ItemCatalog, rng: &mut R) -> Option<ItemId> {
    let pool = catalog.items_of_kind(ItemKind::Sellable);
    pick_by_inverse_cost(&pool, cost_or_one, rng).map(|item| item.id.clone())
}
