//! Inventory domain: the bag, the rod rack, the safehouse bank, and selling.
//!
//! Requests arrive as events from the presentation layer; every handler
//! answers with a toast so the player always sees the outcome.

use bevy::prelude::*;

use crate::catalog::ItemCatalog;
use crate::islands::IslandManager;
use crate::shared::*;

pub mod bank;
pub mod holdings;
pub mod rods;
pub mod shop;

pub use bank::StorageBank;
pub use holdings::Inventory;
pub use rods::{ensure_starter_rod, equip_rod, unequip_rod, RodStorage, RodTransferError};
pub use shop::{sell_item, SellRejection};

pub struct InventoryPlugin;

impl Plugin for InventoryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Inventory>()
            .init_resource::<RodStorage>()
            .init_resource::<StorageBank>();

        app.add_systems(
            OnExit(GameState::Loading),
            grant_starter_rod.in_set(SessionSet::Prime),
        );

        app.add_systems(
            Update,
            (
                handle_equip_requests,
                handle_unequip_requests,
                handle_select_rod,
                handle_sell_requests,
                handle_bank_transfers,
            )
                .run_if(in_state(GameState::Playing)),
        );
    }
}

fn toast(writer: &mut EventWriter<ToastEvent>, message: impl Into<String>) {
    writer.send(ToastEvent {
        message: message.into(),
        duration_secs: 2.5,
    });
}

/// Whether the boat sits in an area whose live element is of `element_type`.
fn moored_at(current: &CurrentArea, manager: &IslandManager, element_type: ElementType) -> bool {
    current
        .area_id
        .as_deref()
        .and_then(|id| manager.live_element(id))
        .is_some_and(|element| element.element_type == element_type)
}

pub fn grant_starter_rod(
    inventory: Res<Inventory>,
    bank: Res<StorageBank>,
    mut rods: ResMut<RodStorage>,
    catalog: Res<ItemCatalog>,
    config: Res<IslandConfig>,
) {
    ensure_starter_rod(&inventory, &bank, &mut rods, &catalog, &config.starter_rod);
}

pub fn handle_equip_requests(
    mut events: EventReader<EquipRodRequestEvent>,
    mut inventory: ResMut<Inventory>,
    mut rods: ResMut<RodStorage>,
    catalog: Res<ItemCatalog>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for ev in events.read() {
        match equip_rod(&mut inventory, &mut rods, &catalog, &ev.rod_id) {
            Ok(()) => toast(&mut toast_writer, "Rod equipped."),
            Err(err) => {
                warn!("[Inventory] Equip '{}' refused: {}", ev.rod_id, err);
                toast(&mut toast_writer, format!("Can't equip: {}.", err));
            }
        }
    }
}

pub fn handle_unequip_requests(
    mut events: EventReader<UnequipRodRequestEvent>,
    mut inventory: ResMut<Inventory>,
    mut rods: ResMut<RodStorage>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for ev in events.read() {
        match unequip_rod(&mut inventory, &mut rods, &ev.rod_id) {
            Ok(()) => toast(&mut toast_writer, "Rod stowed in your bag."),
            Err(err) => {
                warn!("[Inventory] Unequip '{}' refused: {}", ev.rod_id, err);
                toast(&mut toast_writer, format!("Can't unequip: {}.", err));
            }
        }
    }
}

pub fn handle_select_rod(mut events: EventReader<SelectRodEvent>, mut rods: ResMut<RodStorage>) {
    for ev in events.read() {
        if !rods.set_active(ev.index) {
            warn!("[Inventory] No rod in slot {}", ev.index);
        }
    }
}

pub fn handle_sell_requests(
    mut events: EventReader<SellRequestEvent>,
    mut inventory: ResMut<Inventory>,
    catalog: Res<ItemCatalog>,
    current: Res<CurrentArea>,
    manager: Res<IslandManager>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for ev in events.read() {
        if !moored_at(&current, &manager, ElementType::Shop) {
            warn!("[Inventory] Sell of '{}' outside a shop ignored", ev.item_id);
            continue;
        }
        match sell_item(&mut inventory, &catalog, &ev.item_id, ev.quantity) {
            Ok(earned) => toast(&mut toast_writer, format!("Sold for {} coins.", earned)),
            Err(rejection) => {
                warn!("[Inventory] Sell of '{}' refused: {:?}", ev.item_id, rejection);
                let message = match rejection {
                    SellRejection::UnknownItem => "The shopkeeper doesn't recognise that.".to_string(),
                    SellRejection::NotSellable => "That isn't for sale.".to_string(),
                    SellRejection::NotEnough { have } => format!("You only have {}.", have),
                };
                toast(&mut toast_writer, message);
            }
        }
    }
}

pub fn handle_bank_transfers(
    mut events: EventReader<BankTransferEvent>,
    mut inventory: ResMut<Inventory>,
    mut bank: ResMut<StorageBank>,
    catalog: Res<ItemCatalog>,
    current: Res<CurrentArea>,
    manager: Res<IslandManager>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for ev in events.read() {
        if !moored_at(&current, &manager, ElementType::Safehouse) {
            warn!("[Inventory] Bank transfer of '{}' outside a safehouse ignored", ev.item_id);
            continue;
        }
        let moved = if ev.deposit {
            bank.deposit(&mut inventory, &ev.item_id, ev.quantity)
        } else {
            bank.withdraw(&mut inventory, &ev.item_id, ev.quantity)
        };
        if moved == 0 {
            toast(&mut toast_writer, "Nothing was moved.");
        } else {
            let verb = if ev.deposit { "Deposited" } else { "Withdrew" };
            info!("[Inventory] {} {} × '{}'", verb, moved, ev.item_id);
            let name = catalog
                .get(&ev.item_id)
                .map_or(ev.item_id.as_str(), |item| item.name.as_str());
            toast(&mut toast_writer, format!("{} {} × {}.", verb, moved, name));
        }
    }
}
