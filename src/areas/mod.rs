//! Interaction areas: one entity per map area, carrying what the
//! presentation layer needs to draw it and gate its button.
//!
//! The engine stays the source of truth. `AreaStatus` is a projection of it
//! that is recomputed every frame and only written when it differs.

use bevy::prelude::*;

pub mod interact;
pub mod status;

pub use interact::{interact, ActiveMinigame, AreaAction};
pub use status::AreaStatus;

use crate::shared::*;

/// Marks an area entity and names the area it stands for.
#[derive(Component, Debug, Clone)]
pub struct InteractionArea {
    pub id: AreaId,
    pub label: String,
}

pub struct AreaPlugin;

impl Plugin for AreaPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrentArea>()
            .init_resource::<ActiveMinigame>();

        app.add_systems(
            OnExit(GameState::Loading),
            spawn_area_entities.in_set(SessionSet::Build),
        );

        app.add_systems(
            Update,
            (
                interact::track_current_area,
                status::sync_area_status,
            )
                .chain()
                .run_if(in_state(GameState::Playing).or(in_state(GameState::Minigame))),
        );

        app.add_systems(
            Update,
            interact::handle_interact_requests
                .after(status::sync_area_status)
                .run_if(in_state(GameState::Playing)),
        );

        app.add_systems(
            Update,
            interact::handle_minigame_finished.run_if(in_state(GameState::Minigame)),
        );
    }
}

/// Spawn one entity per area descriptor, replacing any from a previous load.
pub fn spawn_area_entities(
    mut commands: Commands,
    registry: Res<AreaRegistry>,
    existing: Query<Entity, With<InteractionArea>>,
) {
    for entity in &existing {
        commands.entity(entity).despawn_recursive();
    }
    for area in &registry.areas {
        commands.spawn((
            InteractionArea {
                id: area.id.clone(),
                label: area.label.clone(),
            },
            AreaStatus::default(),
            Name::new(format!("Area {}", area.id)),
        ));
    }
    info!("[Areas] Spawned {} interaction areas", registry.areas.len());
}
