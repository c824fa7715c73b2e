//! Headless integration tests for Islandfolio.
//!
//! These tests drive the full `IslandfolioPlugin` without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app and an in-memory store
//! in place of the save directory.
//!
//! Run with: `cargo test --test headless`

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use islandfolio::areas::{AreaStatus, InteractionArea};
use islandfolio::catalog::ItemCatalog;
use islandfolio::inventory::{Inventory, RodStorage, StorageBank};
use islandfolio::islands::IslandManager;
use islandfolio::save::{
    MemoryStore, Persistence, INVENTORY_KEY, ISLAND_ASSIGNMENTS_KEY, ROD_STORAGE_KEY,
    STORAGE_BANK_KEY,
};
use islandfolio::shared::*;
use islandfolio::IslandfolioPlugin;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// A window far in the future, so no scheduled pass replaces a seeded table.
const FAR_FUTURE_BLOCK: u64 = 9999_12_31_23_55;

fn build_test_app(store: MemoryStore) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(Persistence::new(store));
    app.add_plugins(IslandfolioPlugin);
    app
}

/// Ticks until loading has finished and the session is live.
fn boot(app: &mut App) {
    for _ in 0..4 {
        app.update();
    }
    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::Playing,
        "app should reach Playing"
    );
}

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

/// A saved table where `experience-Apple` holds a live fishing game.
fn seeded_assignments(rule: &str, resource_left: u32) -> String {
    format!(
        r##"{{
            "assignments": [
                {{
                    "id": "experience-Apple",
                    "areaElementType": "Fishing",
                    "gameElementId": "fishing-classic",
                    "resourceLeft": {resource_left},
                    "band": {{ "minCost": 1, "maxCost": 20, "color": "#8BC34A" }},
                    "rodAccess": {rule}
                }},
                {{
                    "id": "retired-area",
                    "areaElementType": "Fishing",
                    "gameElementId": "fishing-classic",
                    "resourceLeft": 4
                }}
            ],
            "lastAssignmentBlock": {FAR_FUTURE_BLOCK}
        }}"##
    )
}

fn status_of(app: &mut App, area_id: &str) -> AreaStatus {
    let mut query = app.world_mut().query::<(&InteractionArea, &AreaStatus)>();
    query
        .iter(app.world())
        .find(|(area, _)| area.id == area_id)
        .map(|(_, status)| status.clone())
        .expect("area entity exists")
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_first_run_boots_assigns_and_grants_starter_rod() {
    let store = MemoryStore::default();
    let mut app = build_test_app(store.clone());
    boot(&mut app);

    let areas = app.world().resource::<AreaRegistry>().areas.len();
    assert!(areas > 0);

    let manager = app.world().resource::<IslandManager>();
    assert!(manager.has_ever_assigned());
    assert_eq!(manager.get_assignments().len(), areas);
    assert_eq!(
        manager.assignment("market").and_then(|a| a.game_element_id.as_deref()),
        Some("shop")
    );
    assert_eq!(
        manager.assignment("tackle-shop").and_then(|a| a.game_element_id.as_deref()),
        Some("shop-tackle")
    );
    assert!(manager.assignment("about").unwrap().game_element_id.is_none());

    let rods = app.world().resource::<RodStorage>();
    assert_eq!(rods.active_rod_id(), Some("rod-driftwood"));

    let mut query = app.world_mut().query::<&InteractionArea>();
    assert_eq!(query.iter(app.world()).count(), areas);

    // First session writes its records straight away.
    assert!(store.get(ISLAND_ASSIGNMENTS_KEY).is_some());
    assert!(store.get(ROD_STORAGE_KEY).is_some());
}

#[test]
fn test_area_status_mirrors_the_engine() {
    let mut app = build_test_app(MemoryStore::default());
    boot(&mut app);

    let expected: Vec<(String, Option<String>, u32)> = app
        .world()
        .resource::<IslandManager>()
        .get_assignments()
        .iter()
        .map(|a| (a.id.clone(), a.game_element_id.clone(), a.resource_left))
        .collect();

    for (id, element, resource_left) in expected {
        let status = status_of(&mut app, &id);
        assert_eq!(status.game_element_id, element, "area {}", id);
        assert_eq!(status.resource_left, resource_left, "area {}", id);
    }

    assert!(status_of(&mut app, "about").blockers.is_empty());
    assert!(status_of(&mut app, "market").blockers.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Restore
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_restore_keeps_saved_pools_and_prunes_vanished_areas() {
    let store = MemoryStore::default()
        .with_record(ISLAND_ASSIGNMENTS_KEY, &seeded_assignments(r#"{"MinClass":1}"#, 2))
        .with_record(
            INVENTORY_KEY,
            r#"{"holdings":{"sardine":2,"discontinued-lure":1},"money":5,"capacity":20}"#,
        );
    let mut app = build_test_app(store);
    boot(&mut app);

    let manager = app.world().resource::<IslandManager>();
    assert_eq!(manager.assignment("experience-Apple").unwrap().resource_left, 2);
    assert!(manager.assignment("retired-area").is_none());
    assert_eq!(
        manager.get_assignments().len(),
        app.world().resource::<AreaRegistry>().areas.len()
    );

    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.quantity("sardine"), 2);
    assert!(!inventory.holdings.contains_key("discontinued-lure"));
    assert_eq!(inventory.money, 5);
}

#[test]
fn test_corrupt_records_fall_back_to_defaults() {
    let store = MemoryStore::default()
        .with_record(INVENTORY_KEY, "{{ definitely not json")
        .with_record(STORAGE_BANK_KEY, "[]");
    let mut app = build_test_app(store);
    boot(&mut app);

    let inventory = app.world().resource::<Inventory>();
    assert!(inventory.holdings.is_empty());
    assert_eq!(inventory.capacity, DEFAULT_INVENTORY_CAPACITY);
}

// ─────────────────────────────────────────────────────────────────────────────
// Interaction loop
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_won_minigame_awards_a_band_fish_and_depletes_pool() {
    let store = MemoryStore::default()
        .with_record(ISLAND_ASSIGNMENTS_KEY, &seeded_assignments(r#"{"MinClass":1}"#, 2));
    let mut app = build_test_app(store);
    boot(&mut app);
    assert!(status_of(&mut app, "experience-Apple").blockers.is_empty());

    app.world_mut().send_event(InteractRequestEvent {
        area_id: "experience-Apple".into(),
    });
    app.update();
    app.update();
    assert_eq!(state(&app), GameState::Minigame);
    assert_eq!(app.world().resource::<PlayerEnergy>().current, DEFAULT_MAX_ENERGY - 1);

    app.world_mut().send_event(MinigameFinishedEvent {
        area_id: "experience-Apple".into(),
        success: true,
    });
    app.update();
    app.update();
    assert_eq!(state(&app), GameState::Playing);

    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.total_quantity(), 1);
    let catalog = app.world().resource::<ItemCatalog>();
    let (fish_id, _) = inventory.holdings.iter().next().unwrap();
    let cost = catalog.get(fish_id).and_then(|f| f.cost).unwrap();
    assert!((1..=20).contains(&cost), "{} costs {}", fish_id, cost);

    let manager = app.world().resource::<IslandManager>();
    assert_eq!(manager.assignment("experience-Apple").unwrap().resource_left, 1);
}

#[test]
fn test_lost_minigame_awards_nothing() {
    let store = MemoryStore::default()
        .with_record(ISLAND_ASSIGNMENTS_KEY, &seeded_assignments(r#"{"MinClass":1}"#, 2));
    let mut app = build_test_app(store);
    boot(&mut app);

    app.world_mut().send_event(InteractRequestEvent {
        area_id: "experience-Apple".into(),
    });
    app.update();
    app.update();
    app.world_mut().send_event(MinigameFinishedEvent {
        area_id: "experience-Apple".into(),
        success: false,
    });
    app.update();
    app.update();

    assert_eq!(state(&app), GameState::Playing);
    assert!(app.world().resource::<Inventory>().holdings.is_empty());
    let manager = app.world().resource::<IslandManager>();
    assert_eq!(manager.assignment("experience-Apple").unwrap().resource_left, 2);
}

#[test]
fn test_weak_rod_is_blocked_without_spending_energy() {
    let store = MemoryStore::default()
        .with_record(ISLAND_ASSIGNMENTS_KEY, &seeded_assignments(r#"{"MinClass":3}"#, 2));
    let mut app = build_test_app(store);
    boot(&mut app);

    assert_eq!(
        status_of(&mut app, "experience-Apple").blockers,
        BlockerSet::from([Blocker::InsufficientRod])
    );

    app.world_mut().send_event(InteractRequestEvent {
        area_id: "experience-Apple".into(),
    });
    app.update();
    app.update();

    assert_eq!(state(&app), GameState::Playing);
    assert_eq!(app.world().resource::<PlayerEnergy>().current, DEFAULT_MAX_ENERGY);
    assert!(!app.world().resource::<Events<InteractionBlockedEvent>>().is_empty());
}

#[test]
fn test_depleted_area_shows_depletion() {
    let store = MemoryStore::default()
        .with_record(ISLAND_ASSIGNMENTS_KEY, &seeded_assignments(r#"{"MinClass":1}"#, 0));
    let mut app = build_test_app(store);
    boot(&mut app);

    assert!(status_of(&mut app, "experience-Apple")
        .blockers
        .contains(&Blocker::Depletion));
}

// ─────────────────────────────────────────────────────────────────────────────
// Inventory requests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_selling_at_the_market() {
    let store = MemoryStore::default()
        .with_record(ISLAND_ASSIGNMENTS_KEY, &seeded_assignments(r#"{"MinClass":1}"#, 2))
        .with_record(INVENTORY_KEY, r#"{"holdings":{"sardine":2},"money":0,"capacity":20}"#);
    let mut app = build_test_app(store);
    boot(&mut app);

    // Not at a shop yet: ignored.
    app.world_mut().send_event(SellRequestEvent {
        item_id: "sardine".into(),
        quantity: 1,
    });
    app.update();
    assert_eq!(app.world().resource::<Inventory>().quantity("sardine"), 2);

    app.world_mut().send_event(AreaEnteredEvent {
        area_id: "market".into(),
    });
    app.update();
    app.world_mut().send_event(SellRequestEvent {
        item_id: "sardine".into(),
        quantity: 2,
    });
    app.update();

    let inventory = app.world().resource::<Inventory>();
    assert!(!inventory.holdings.contains_key("sardine"));
    assert_eq!(inventory.money, 16);
}

#[test]
fn test_equip_request_moves_rod_from_bag() {
    let store = MemoryStore::default()
        .with_record(INVENTORY_KEY, r#"{"holdings":{"rod-bamboo":1},"money":0,"capacity":20}"#);
    let mut app = build_test_app(store);
    boot(&mut app);

    // Owning any rod means no starter rod.
    assert!(app.world().resource::<RodStorage>().rod_ids.is_empty());

    app.world_mut().send_event(EquipRodRequestEvent {
        rod_id: "rod-bamboo".into(),
    });
    app.update();

    let rods = app.world().resource::<RodStorage>();
    assert_eq!(rods.active_rod_id(), Some("rod-bamboo"));
    assert!(!app.world().resource::<Inventory>().holdings.contains_key("rod-bamboo"));
}

#[test]
fn test_save_request_writes_every_record() {
    let store = MemoryStore::default();
    let mut app = build_test_app(store.clone());
    boot(&mut app);

    app.world_mut().send_event(SaveRequestEvent);
    app.update();

    for key in [ISLAND_ASSIGNMENTS_KEY, INVENTORY_KEY, ROD_STORAGE_KEY, STORAGE_BANK_KEY] {
        assert!(store.get(key).is_some(), "missing record {}", key);
    }
}

#[test]
fn test_bank_deposit_at_the_harbor_confirms_with_a_toast() {
    let store = MemoryStore::default()
        .with_record(INVENTORY_KEY, r#"{"holdings":{"shell":3},"money":0,"capacity":20}"#);
    let mut app = build_test_app(store);
    boot(&mut app);

    app.world_mut().send_event(AreaEnteredEvent {
        area_id: "harbor".into(),
    });
    app.update();
    app.world_mut().send_event(BankTransferEvent {
        item_id: "shell".into(),
        quantity: 2,
        deposit: true,
    });
    app.update();

    assert_eq!(app.world().resource::<Inventory>().quantity("shell"), 1);
    assert_eq!(app.world().resource::<StorageBank>().quantity("shell"), 2);
    let toasts: Vec<String> = app
        .world()
        .resource::<Events<ToastEvent>>()
        .iter_current_update_events()
        .map(|toast| toast.message.clone())
        .collect();
    assert!(
        toasts.iter().any(|m| m.starts_with("Deposited 2")),
        "toasts: {:?}",
        toasts
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading hand-edited or older records
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_negative_active_index_keeps_the_rack() {
    let store = MemoryStore::default().with_record(
        ROD_STORAGE_KEY,
        r#"{"rodIds":["rod-bamboo","rod-fiberglass"],"activeIndex":-1,"maxRodSlots":3}"#,
    );
    let mut app = build_test_app(store);
    boot(&mut app);

    let rods = app.world().resource::<RodStorage>();
    assert_eq!(rods.rod_ids, vec!["rod-bamboo", "rod-fiberglass"]);
    assert_eq!(rods.active_rod_id(), None);
    assert!(!rods.contains("rod-driftwood"), "no starter rod for a player who owns rods");
}

#[test]
fn test_duplicate_rods_are_collapsed_on_restore() {
    let store = MemoryStore::default().with_record(
        ROD_STORAGE_KEY,
        r#"{"rodIds":["rod-bamboo","rod-bamboo","rod-bamboo","rod-bamboo"],"activeIndex":0,"maxRodSlots":3}"#,
    );
    let mut app = build_test_app(store);
    boot(&mut app);

    let rods = app.world().resource::<RodStorage>();
    assert_eq!(rods.rod_ids, vec!["rod-bamboo"]);
    assert_eq!(rods.active_rod_id(), Some("rod-bamboo"));
    assert!(rods.has_free_slot());
}

#[test]
fn test_empty_inventory_entries_are_dropped_on_restore() {
    let store = MemoryStore::default()
        .with_record(INVENTORY_KEY, r#"{"holdings":{"sardine":0},"money":0,"capacity":0}"#);
    let mut app = build_test_app(store);
    boot(&mut app);

    let inventory = app.world().resource::<Inventory>();
    assert!(!inventory.holdings.contains_key("sardine"));
    assert_eq!(inventory.capacity, 1);
}
