//! Per-area presentation state, rebuilt from the engine each frame.

use bevy::prelude::*;

use super::InteractionArea;
use crate::catalog::ItemCatalog;
use crate::inventory::{Inventory, RodStorage};
use crate::islands::{BlockerContext, IslandManager};
use crate::shared::*;

/// What the presentation layer renders for one area. Replaced wholesale
/// whenever anything in it changes.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct AreaStatus {
    pub game_element_id: Option<GameElementId>,
    pub resource_left: u32,
    /// Band color for fishing areas, for tinting the water.
    pub band_color: Option<String>,
    pub rod_access: Option<RodAccessRule>,
    pub blockers: BlockerSet,
}

impl AreaStatus {
    pub fn compute(manager: &IslandManager, area_id: &str, ctx: &BlockerContext) -> Self {
        let Some(assignment) = manager.assignment(area_id) else {
            return Self::default();
        };
        Self {
            game_element_id: assignment.game_element_id.clone(),
            resource_left: assignment.resource_left,
            band_color: assignment.band.as_ref().map(|b| b.color.clone()),
            rod_access: assignment.rod_access.clone(),
            blockers: manager.evaluate_blockers(area_id, ctx),
        }
    }

    pub fn is_blocked(&self) -> bool {
        !self.blockers.is_empty()
    }
}

pub fn sync_area_status(
    manager: Res<IslandManager>,
    catalog: Res<ItemCatalog>,
    inventory: Option<Res<Inventory>>,
    rods: Option<Res<RodStorage>>,
    energy: Res<PlayerEnergy>,
    mut areas: Query<(&InteractionArea, &mut AreaStatus)>,
    mut changed_writer: EventWriter<BlockersChangedEvent>,
) {
    let ctx = BlockerContext {
        catalog: &catalog,
        inventory: inventory.as_deref(),
        rods: rods.as_deref(),
        energy: energy.current,
    };

    for (area, mut status) in &mut areas {
        let next = AreaStatus::compute(&manager, &area.id, &ctx);
        if *status == next {
            continue;
        }
        if status.blockers != next.blockers {
            changed_writer.send(BlockersChangedEvent {
                area_id: area.id.clone(),
                blockers: next.blockers.clone(),
            });
        }
        *status = next;
    }
}
