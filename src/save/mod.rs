//! Save domain: persisted records behind a swappable key-value store.
//!
//! Four records are kept, each as camelCase JSON under its own key. A missing
//! record is a first run; a corrupt one is logged and replaced by defaults.
//! Records are written back whenever their resource changes.

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::catalog::ItemCatalog;
use crate::inventory::{Inventory, RodStorage, StorageBank};
use crate::islands::{IslandManager, IslandSnapshot};
use crate::shared::*;

pub mod store;

pub use store::{KeyValueStore, MemoryStore, StoreError};
#[cfg(target_arch = "wasm32")]
pub use store::BrowserStore;
#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;

// ═══════════════════════════════════════════════════════════════════════
// RECORD KEYS
// ═══════════════════════════════════════════════════════════════════════

pub const ISLAND_ASSIGNMENTS_KEY: &str = "islandAssignments";
pub const INVENTORY_KEY: &str = "inventory";
pub const ROD_STORAGE_KEY: &str = "rodStorage";
pub const STORAGE_BANK_KEY: &str = "storageBank";

// ═══════════════════════════════════════════════════════════════════════
// PERSISTENCE RESOURCE
// ═══════════════════════════════════════════════════════════════════════

/// The store every record goes through. Insert one before adding
/// `SavePlugin` to override the platform default.
#[derive(Resource)]
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Read and decode a record. `None` for first runs and for anything that
    /// fails to read or decode, which is logged.
    pub fn load_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("[Save] No '{}' record; starting fresh", key);
                return None;
            }
            Err(e) => {
                warn!("[Save] Could not read '{}': {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("[Save] Corrupt '{}' record, using defaults: {}", key, e);
                None
            }
        }
    }

    pub fn store_record<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.store.write(key, &json)
    }

    fn store_logged<T: Serialize>(&mut self, key: &str, value: &T) {
        if let Err(e) = self.store_record(key, value) {
            error!("[Save] Writing '{}' failed: {}", key, e);
        }
    }
}

impl Default for Persistence {
    #[cfg(not(target_arch = "wasm32"))]
    fn default() -> Self {
        Self::new(FileStore::beside_executable())
    }

    #[cfg(target_arch = "wasm32")]
    fn default() -> Self {
        Self::new(BrowserStore)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Persistence>();

        app.add_systems(
            OnExit(GameState::Loading),
            restore_session.in_set(SessionSet::Restore),
        );

        // Never during Loading: the resources still hold defaults then.
        app.add_systems(
            PostUpdate,
            (
                autosave_islands.run_if(resource_changed::<IslandManager>),
                autosave_inventory.run_if(resource_changed::<Inventory>),
                autosave_rods.run_if(resource_changed::<RodStorage>),
                autosave_bank.run_if(resource_changed::<StorageBank>),
                handle_save_request,
            )
                .run_if(in_state(GameState::Playing).or(in_state(GameState::Minigame))),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn restore_session(
    persistence: Res<Persistence>,
    catalog: Res<ItemCatalog>,
    mut manager: ResMut<IslandManager>,
    mut inventory: ResMut<Inventory>,
    mut rods: ResMut<RodStorage>,
    mut bank: ResMut<StorageBank>,
) {
    if let Some(snapshot) = persistence.load_record::<IslandSnapshot>(ISLAND_ASSIGNMENTS_KEY) {
        manager.restore(snapshot);
    }

    if let Some(mut saved) = persistence.load_record::<Inventory>(INVENTORY_KEY) {
        saved.normalize();
        saved.prune_orphans(&catalog);
        *inventory = saved;
    }

    if let Some(mut saved) = persistence.load_record::<RodStorage>(ROD_STORAGE_KEY) {
        saved.normalize(&catalog);
        *rods = saved;
    }

    if let Some(saved) = persistence.load_record::<StorageBank>(STORAGE_BANK_KEY) {
        *bank = saved;
    }

    info!(
        "[Save] Session restored: {} items, {} rods, {} banked",
        inventory.total_quantity(),
        rods.rod_ids.len(),
        bank.holdings.len()
    );
}

fn autosave_islands(mut persistence: ResMut<Persistence>, manager: Res<IslandManager>) {
    persistence.store_logged(ISLAND_ASSIGNMENTS_KEY, &manager.snapshot());
}

fn autosave_inventory(mut persistence: ResMut<Persistence>, inventory: Res<Inventory>) {
    persistence.store_logged(INVENTORY_KEY, &*inventory);
}

fn autosave_rods(mut persistence: ResMut<Persistence>, rods: Res<RodStorage>) {
    persistence.store_logged(ROD_STORAGE_KEY, &*rods);
}

fn autosave_bank(mut persistence: ResMut<Persistence>, bank: Res<StorageBank>) {
    persistence.store_logged(STORAGE_BANK_KEY, &*bank);
}

fn handle_save_request(
    mut requests: EventReader<SaveRequestEvent>,
    mut persistence: ResMut<Persistence>,
    manager: Res<IslandManager>,
    inventory: Res<Inventory>,
    rods: Res<RodStorage>,
    bank: Res<StorageBank>,
) {
    if requests.read().count() == 0 {
        return;
    }
    persistence.store_logged(ISLAND_ASSIGNMENTS_KEY, &manager.snapshot());
    persistence.store_logged(INVENTORY_KEY, &*inventory);
    persistence.store_logged(ROD_STORAGE_KEY, &*rods);
    persistence.store_logged(STORAGE_BANK_KEY, &*bank);
    info!("[Save] All records written");
}
