//! Proximity tracking and the area button.

use bevy::prelude::*;

use crate::catalog::ItemCatalog;
use crate::inventory::{Inventory, RodStorage};
use crate::islands::{BlockerContext, IslandManager, StartRejection};
use crate::shared::*;

/// The minigame currently being played, if any.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveMinigame {
    pub area_id: Option<AreaId>,
    pub game_element_id: Option<GameElementId>,
}

/// What pressing an area's button resolves to, before any side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaAction {
    Overlay(String),
    Minigame(GameElementId),
    Blocked(BlockerSet),
    Nothing,
}

pub fn track_current_area(
    mut entered: EventReader<AreaEnteredEvent>,
    mut exited: EventReader<AreaExitedEvent>,
    mut current: ResMut<CurrentArea>,
) {
    for ev in exited.read() {
        if current.area_id.as_deref() == Some(ev.area_id.as_str()) {
            current.area_id = None;
        }
    }
    for ev in entered.read() {
        current.area_id = Some(ev.area_id.clone());
    }
}

/// Decide what an interaction at `area_id` does, spending energy when it
/// starts a minigame.
pub fn interact(
    manager: &IslandManager,
    area_id: &str,
    ctx: &BlockerContext,
    energy: &mut PlayerEnergy,
) -> AreaAction {
    let Some(area) = manager.descriptor(area_id) else {
        warn!("[Areas] Interaction with unknown area '{}'", area_id);
        return AreaAction::Nothing;
    };

    let Some(element_type) = area.element_type else {
        return match &area.overlay {
            Some(overlay) => AreaAction::Overlay(overlay.clone()),
            None => AreaAction::Nothing,
        };
    };

    match element_type {
        ElementType::Fishing | ElementType::Treasure => {
            match manager.start_minigame(area_id, ctx, energy) {
                Ok(element_id) => AreaAction::Minigame(element_id),
                Err(StartRejection::Blocked(blockers)) => AreaAction::Blocked(blockers),
                Err(StartRejection::NotPlayable) => AreaAction::Nothing,
            }
        }
        ElementType::Safehouse | ElementType::Shop => {
            let Some(element) = manager.live_element(area_id) else {
                return AreaAction::Nothing;
            };
            AreaAction::Overlay(area.overlay.clone().unwrap_or_else(|| element.id.clone()))
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_interact_requests(
    mut requests: EventReader<InteractRequestEvent>,
    manager: Res<IslandManager>,
    catalog: Res<ItemCatalog>,
    inventory: Option<Res<Inventory>>,
    rods: Option<Res<RodStorage>>,
    mut energy: ResMut<PlayerEnergy>,
    mut active: ResMut<ActiveMinigame>,
    mut next_state: ResMut<NextState<GameState>>,
    mut started_writer: EventWriter<MinigameStartedEvent>,
    mut blocked_writer: EventWriter<InteractionBlockedEvent>,
    mut overlay_writer: EventWriter<OverlayOpenEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for ev in requests.read() {
        let ctx = BlockerContext {
            catalog: &catalog,
            inventory: inventory.as_deref(),
            rods: rods.as_deref(),
            energy: energy.current,
        };
        match interact(&manager, &ev.area_id, &ctx, &mut energy) {
            AreaAction::Minigame(game_element_id) => {
                active.area_id = Some(ev.area_id.clone());
                active.game_element_id = Some(game_element_id.clone());
                started_writer.send(MinigameStartedEvent {
                    area_id: ev.area_id.clone(),
                    game_element_id,
                });
                next_state.set(GameState::Minigame);
                // One minigame at a time; later requests this frame are dropped.
                return;
            }
            AreaAction::Blocked(blockers) => {
                if let Some(first) = blockers.iter().next() {
                    toast_writer.send(ToastEvent {
                        message: first.message().to_string(),
                        duration_secs: 2.5,
                    });
                }
                blocked_writer.send(InteractionBlockedEvent {
                    area_id: ev.area_id.clone(),
                    blockers,
                });
            }
            AreaAction::Overlay(overlay) => {
                overlay_writer.send(OverlayOpenEvent {
                    area_id: ev.area_id.clone(),
                    overlay,
                });
            }
            AreaAction::Nothing => {
                toast_writer.send(ToastEvent {
                    message: "Nothing here right now.".into(),
                    duration_secs: 2.0,
                });
            }
        }
    }
}

/// Leave the minigame state once the arcade game reports back.
pub fn handle_minigame_finished(
    mut finished: EventReader<MinigameFinishedEvent>,
    mut active: ResMut<ActiveMinigame>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for ev in finished.read() {
        if active.area_id.as_deref() != Some(ev.area_id.as_str()) {
            warn!(
                "[Areas] Finish for '{}' but '{:?}' is active",
                ev.area_id, active.area_id
            );
        }
        info!(
            "[Areas] Minigame at '{}' {}",
            ev.area_id,
            if ev.success { "won" } else { "lost" }
        );
        *active = ActiveMinigame::default();
        next_state.set(GameState::Playing);
    }
}
