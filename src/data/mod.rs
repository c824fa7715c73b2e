//! Data layer: fills the catalog and registries at startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), parses the RON tables
//! compiled into the binary, cross-checks their references, then moves the
//! game into GameState::Playing. The session systems on OnExit(Loading) can
//! rely on every table being present.

mod tables;

use bevy::prelude::*;

use crate::catalog::ItemCatalog;
use crate::shared::*;

pub use tables::{
    migrate_legacy_rods, parse_table, validate_tables, AreaTable, CatalogTable, ElementTable,
};

const CATALOG_RON: &str = include_str!("../../assets/data/catalog.ron");
const ELEMENTS_RON: &str = include_str!("../../assets/data/elements.ron");
const AREAS_RON: &str = include_str!("../../assets/data/areas.ron");

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ItemCatalog>()
            .init_resource::<GameElementRegistry>()
            .init_resource::<AreaRegistry>()
            .add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

/// Single system that populates every table and then transitions to Playing.
fn load_all_data(
    mut catalog: ResMut<ItemCatalog>,
    mut elements: ResMut<GameElementRegistry>,
    mut areas: ResMut<AreaRegistry>,
    mut config: ResMut<IslandConfig>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("[Data] Populating tables…");

    let mut catalog_table: CatalogTable = parse_table("catalog", CATALOG_RON);
    let migrated = migrate_legacy_rods(&mut catalog_table.items);
    if migrated > 0 {
        info!("[Data] Migrated {} rods from legacy effect text", migrated);
    }
    *catalog = catalog_table.into_catalog();
    info!("  Items loaded: {}, cost bands: {}", catalog.items.len(), catalog.bands.len());

    let element_table: ElementTable = parse_table("elements", ELEMENTS_RON);
    for (area_id, element_id) in &element_table.bindings {
        config.area_bindings.insert(area_id.clone(), element_id.clone());
    }
    elements.elements = element_table.elements;
    info!("  Game elements loaded: {}", elements.elements.len());

    let area_table: AreaTable = parse_table("areas", AREAS_RON);
    areas.areas = area_table.areas;
    info!("  Areas loaded: {}", areas.areas.len());

    for problem in validate_tables(&catalog, &elements, &areas, &config) {
        warn!("[Data] {}", problem);
    }

    info!("[Data] All tables loaded. Transitioning to Playing.");
    next_state.set(GameState::Playing);
}
