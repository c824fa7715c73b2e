use bevy::prelude::*;
use rand::thread_rng;

use crate::catalog::ItemCatalog;
use crate::inventory::Inventory;
use crate::islands::IslandManager;
use crate::shared::*;

// ─── Sub-modules ────────────────────────────────────────────────────────────
mod fish_select;
mod resolve;

pub use fish_select::*;
pub use resolve::*;

// ─── Plugin ─────────────────────────────────────────────────────────────────

pub struct FishingPlugin;

impl Plugin for FishingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CatchLog>().add_systems(
            Update,
            award_catch.run_if(in_state(GameState::Minigame)),
        );
    }
}

// ─── Catch log ──────────────────────────────────────────────────────────────

/// Lifetime catch counts, used to announce first catches.
#[derive(Resource, Debug, Default)]
pub struct CatchLog {
    pub counts: std::collections::BTreeMap<ItemId, u32>,
}

impl CatchLog {
    /// Count a catch. Returns true the first time an item is seen.
    pub fn record(&mut self, item_id: &str) -> bool {
        let count = self.counts.entry(item_id.to_string()).or_insert(0);
        *count += 1;
        *count == 1
    }
}

// ─── Systems ────────────────────────────────────────────────────────────────

/// Pay out won minigames. Lost ones cost nothing beyond the energy already
/// spent to start them.
pub fn award_catch(
    mut finished: EventReader<MinigameFinishedEvent>,
    mut manager: ResMut<IslandManager>,
    mut inventory: ResMut<Inventory>,
    catalog: Res<ItemCatalog>,
    mut log: ResMut<CatchLog>,
    mut awarded_writer: EventWriter<ItemAwardedEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    let mut rng = thread_rng();
    for ev in finished.read() {
        if !ev.success {
            continue;
        }
        match resolve_catch(&ev.area_id, &mut manager, &mut inventory, &catalog, &mut rng) {
            Ok(item_id) => {
                let name = catalog
                    .get(&item_id)
                    .map(|item| item.name.clone())
                    .unwrap_or_else(|| item_id.clone());
                let first = log.record(&item_id);
                info!("[Fishing] Caught '{}' at '{}'", item_id, ev.area_id);
                toast_writer.send(ToastEvent {
                    message: if first {
                        format!("New catch: {}!", name)
                    } else {
                        format!("Caught {}.", name)
                    },
                    duration_secs: if first { 3.0 } else { 2.0 },
                });
                awarded_writer.send(ItemAwardedEvent {
                    area_id: ev.area_id.clone(),
                    item_id,
                    quantity: 1,
                });
            }
            Err(rejection) => {
                warn!("[Fishing] No reward at '{}': {:?}", ev.area_id, rejection);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_log_first_catch() {
        let mut log = CatchLog::default();
        assert!(log.record("sardine"));
        assert!(!log.record("sardine"));
        assert_eq!(log.counts["sardine"], 2);
    }
}
