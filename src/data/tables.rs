//! Table shapes and the checks run on them after loading.

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::catalog::{parse_legacy_rod_effect, ItemCatalog};
use crate::shared::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogTable {
    pub bands: Vec<CostBand>,
    pub items: Vec<ItemDef>,
}

impl CatalogTable {
    pub fn into_catalog(self) -> ItemCatalog {
        ItemCatalog {
            items: self
                .items
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect(),
            bands: self.bands,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementTable {
    pub elements: Vec<GameElement>,
    /// Area id → fixed element, for areas that differ from the per-type default.
    #[serde(default)]
    pub bindings: HashMap<AreaId, GameElementId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaTable {
    pub areas: Vec<AreaDescriptor>,
}

/// Parse a RON table. A table that fails to parse is logged and replaced by
/// an empty one so the rest of the game still comes up.
pub fn parse_table<T: DeserializeOwned + Default>(name: &str, source: &str) -> T {
    match ron::from_str(source) {
        Ok(table) => table,
        Err(e) => {
            error!("[Data] Table '{}' failed to parse: {}", name, e);
            T::default()
        }
    }
}

/// Give rods that only carry the old effect text a structured profile.
/// Returns how many were migrated.
pub fn migrate_legacy_rods(items: &mut [ItemDef]) -> usize {
    let mut migrated = 0;
    for item in items.iter_mut().filter(|i| i.kind == ItemKind::Rod && i.rod.is_none()) {
        let profile = item
            .special_effect
            .as_deref()
            .map(parse_legacy_rod_effect)
            .unwrap_or_default();
        if profile.class == 0 {
            warn!("[Data] Rod '{}' has no class; it will unlock nothing", item.id);
        }
        item.rod = Some(profile);
        migrated += 1;
    }
    migrated
}

/// Cross-table reference and shape checks. Every problem is returned as a
/// human-readable line; none of them stop loading.
pub fn validate_tables(
    catalog: &ItemCatalog,
    elements: &GameElementRegistry,
    areas: &AreaRegistry,
    config: &IslandConfig,
) -> Vec<String> {
    let mut problems = Vec::new();

    for pair in catalog.bands.windows(2) {
        if pair[1].min_cost <= pair[0].max_cost {
            problems.push(format!(
                "Cost bands [{}, {}] and [{}, {}] overlap or are out of order",
                pair[0].min_cost, pair[0].max_cost, pair[1].min_cost, pair[1].max_cost
            ));
        }
    }
    for band in &catalog.bands {
        if band.min_cost > band.max_cost {
            problems.push(format!("Cost band [{}, {}] is empty", band.min_cost, band.max_cost));
        }
        if let Some(RodAccessRule::AllowList(ids)) = &band.access {
            for id in ids.iter().filter(|id| !catalog.is_rod(id)) {
                problems.push(format!("Band allow-list names unknown rod '{}'", id));
            }
        }
    }

    for item in catalog.items.values() {
        if item.kind.is_sellable() && item.cost.is_none() {
            problems.push(format!("Sellable item '{}' has no cost", item.id));
        }
    }

    if !catalog.is_rod(&config.starter_rod) {
        problems.push(format!("Starter rod '{}' is not a catalog rod", config.starter_rod));
    }

    let mut element_ids = HashSet::new();
    for element in &elements.elements {
        if !element_ids.insert(element.id.as_str()) {
            problems.push(format!("Game element '{}' is defined twice", element.id));
        }
        if !(0.0..=1.0).contains(&element.rarity) {
            problems.push(format!("Game element '{}' has rarity outside [0, 1]", element.id));
        }
    }
    for fixed in [&config.safehouse_element, &config.shop_element] {
        if !element_ids.contains(fixed.as_str()) {
            problems.push(format!("Fixed element '{}' is not defined", fixed));
        }
    }

    let mut area_ids = HashSet::new();
    for area in &areas.areas {
        if !area_ids.insert(area.id.as_str()) {
            problems.push(format!("Area '{}' is defined twice", area.id));
        }
        if area.element_type.is_none() && area.behavior != ResourceBehavior::None {
            problems.push(format!("Area '{}' has a behavior but no element type", area.id));
        }
    }
    for (area_id, element_id) in &config.area_bindings {
        if !area_ids.contains(area_id.as_str()) {
            problems.push(format!("Binding for unknown area '{}'", area_id));
        }
        if !element_ids.contains(element_id.as_str()) {
            problems.push(format!("Area '{}' bound to unknown element '{}'", area_id, element_id));
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rod(id: &str, effect: Option<&str>, profile: Option<RodProfile>) -> ItemDef {
        ItemDef {
            id: id.into(),
            name: id.into(),
            kind: ItemKind::Rod,
            cost: None,
            special_effect: effect.map(str::to_string),
            rod: profile,
            durability: None,
            collectible_set: None,
        }
    }

    #[test]
    fn test_migration_only_touches_profileless_rods() {
        let mut items = vec![
            rod("old", Some("Sturdy line, class3, deepwater"), None),
            rod("new", Some("class9"), Some(RodProfile { class: 2, ..Default::default() })),
            rod("blank", None, None),
        ];
        assert_eq!(migrate_legacy_rods(&mut items), 2);
        assert_eq!(items[0].rod.as_ref().unwrap().class, 3);
        assert_eq!(items[1].rod.as_ref().unwrap().class, 2);
        assert_eq!(items[2].rod.as_ref().unwrap().class, 0);
    }

    #[test]
    fn test_bad_ron_falls_back_to_empty_table() {
        let table: AreaTable = parse_table("broken", "( areas: [ oops ");
        assert!(table.areas.is_empty());
    }

    #[test]
    fn test_validation_reports_dangling_references() {
        let catalog = ItemCatalog {
            items: HashMap::new(),
            bands: vec![
                CostBand {
                    min_cost: 1,
                    max_cost: 30,
                    color: "#111111".into(),
                    required_class: 1,
                    access: None,
                },
                CostBand {
                    min_cost: 20,
                    max_cost: 40,
                    color: "#222222".into(),
                    required_class: 2,
                    access: None,
                },
            ],
        };
        let mut config = IslandConfig::default();
        config.area_bindings.insert("pier".into(), "shop-ghost".into());

        let problems = validate_tables(
            &catalog,
            &GameElementRegistry::default(),
            &AreaRegistry::default(),
            &config,
        );
        let joined = problems.join("\n");
        assert!(joined.contains("overlap"));
        assert!(joined.contains("Starter rod"));
        assert!(joined.contains("unknown area 'pier'"));
        assert!(joined.contains("unknown element 'shop-ghost'"));
    }
}
