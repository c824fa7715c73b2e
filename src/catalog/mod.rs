//! Item catalog and cost banding.
//!
//! The catalog is read-only after `DataPlugin` fills it. Lookups of unknown
//! ids are warnings, never errors.

use bevy::prelude::*;
use std::collections::{BTreeSet, HashMap};

use crate::shared::*;

#[derive(Resource, Debug, Clone, Default)]
pub struct ItemCatalog {
    pub items: HashMap<ItemId, ItemDef>,
    /// Ordered, disjoint cost ranges.
    pub bands: Vec<CostBand>,
}

impl ItemCatalog {
    /// Silent lookup for hot paths.
    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    /// Lookup that reports a dangling reference.
    pub fn lookup_item(&self, id: &str) -> Option<&ItemDef> {
        let item = self.items.get(id);
        if item.is_none() {
            warn!("[Catalog] Unknown item '{}'", id);
        }
        item
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn is_rod(&self, id: &str) -> bool {
        self.get(id).is_some_and(|item| item.kind == ItemKind::Rod)
    }

    /// Color of the band containing `cost`; neutral for items with no cost.
    pub fn color_for_cost(&self, cost: Option<u32>) -> &str {
        let Some(cost) = cost else {
            return NEUTRAL_COLOR;
        };
        match self.bands.iter().find(|band| band.contains(cost)) {
            Some(band) => &band.color,
            None => {
                warn!("[Catalog] No cost band covers cost {}", cost);
                FALLBACK_COLOR
            }
        }
    }

    /// Color of the best band this rod unlocks, i.e. the highest-`max_cost`
    /// band whose `required_class` the rod meets.
    pub fn color_for_rod(&self, item: &ItemDef) -> &str {
        let Some(profile) = &item.rod else {
            return FALLBACK_COLOR;
        };
        self.bands
            .iter()
            .filter(|band| band.required_class <= profile.class)
            .max_by_key(|band| band.max_cost)
            .map(|band| band.color.as_str())
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Class of a rod item; 0 when the item is missing or carries no class.
    pub fn rod_class(&self, id: &str) -> u32 {
        self.get(id)
            .and_then(|item| item.rod.as_ref())
            .map(|profile| profile.class)
            .unwrap_or(0)
    }

    /// Fish whose cost lies inside `[min_cost, max_cost]`.
    pub fn fish_in_range(&self, min_cost: u32, max_cost: u32) -> Vec<&ItemDef> {
        let mut fish: Vec<&ItemDef> = self
            .items
            .values()
            .filter(|item| item.kind == ItemKind::Fish)
            .filter(|item| {
                item.cost
                    .is_some_and(|cost| cost >= min_cost && cost <= max_cost)
            })
            .collect();
        // HashMap order is random; keep selection reproducible under a seeded rng.
        fish.sort_by(|a, b| a.id.cmp(&b.id));
        fish
    }

    pub fn items_of_kind(&self, kind: ItemKind) -> Vec<&ItemDef> {
        let mut items: Vec<&ItemDef> = self.items.values().filter(|i| i.kind == kind).collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }
}

// ─── Legacy rod effects ──────────────────────────────────────────────────────

/// Derive a `RodProfile` from an old-style effect string such as
/// `"Sturdy line, class3, deepwater"`.
///
/// The class is the first `class` literal followed by digits (0 if none).
/// Every other comma-separated token becomes an ability.
pub fn parse_legacy_rod_effect(effect: &str) -> RodProfile {
    let class = legacy_class(effect).unwrap_or(0);
    let abilities: BTreeSet<String> = effect
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| legacy_class(token).is_none())
        .map(str::to_string)
        .collect();
    RodProfile { class, abilities }
}

fn legacy_class(text: &str) -> Option<u32> {
    let mut rest = text;
    while let Some(pos) = rest.find("class") {
        let after = &rest[pos + "class".len()..];
        let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            return digits.parse().ok();
        }
        rest = after;
    }
    None
}
