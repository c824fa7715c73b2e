//! Islandfolio library crate: the island engine and its domain plugins.
//!
//! The binary crate (`main.rs`) adds windowing and rendering on top.
//! `tests/` drive `IslandfolioPlugin` headless, without a window or GPU.

pub mod shared;
pub mod catalog;
pub mod islands;
pub mod inventory;
pub mod fishing;
pub mod areas;
pub mod save;
pub mod data;

use bevy::prelude::*;

use shared::*;

/// Everything except presentation. Requires bevy's state plugin, which
/// `DefaultPlugins` brings and headless apps add by hand.
pub struct IslandfolioPlugin;

impl Plugin for IslandfolioPlugin {
    fn build(&self, app: &mut App) {
        app
            // Game state
            .init_state::<GameState>()
            .configure_sets(
                OnExit(GameState::Loading),
                (SessionSet::Build, SessionSet::Restore, SessionSet::Prime).chain(),
            )
            // Events
            .add_event::<AreaEnteredEvent>()
            .add_event::<AreaExitedEvent>()
            .add_event::<InteractRequestEvent>()
            .add_event::<MinigameStartedEvent>()
            .add_event::<MinigameFinishedEvent>()
            .add_event::<InteractionBlockedEvent>()
            .add_event::<OverlayOpenEvent>()
            .add_event::<AssignmentsChangedEvent>()
            .add_event::<BlockersChangedEvent>()
            .add_event::<ItemAwardedEvent>()
            .add_event::<EquipRodRequestEvent>()
            .add_event::<UnequipRodRequestEvent>()
            .add_event::<SelectRodEvent>()
            .add_event::<SellRequestEvent>()
            .add_event::<BankTransferEvent>()
            .add_event::<ToastEvent>()
            .add_event::<SaveRequestEvent>()
            // Domain plugins
            .add_plugins(islands::IslandPlugin)
            .add_plugins(inventory::InventoryPlugin)
            .add_plugins(fishing::FishingPlugin)
            .add_plugins(areas::AreaPlugin)
            .add_plugins(save::SavePlugin)
            // Data loading
            .add_plugins(data::DataPlugin);
    }
}
