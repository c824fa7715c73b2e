//! Islands domain: the resource assignment engine and its schedule.
//!
//! The `IslandManager` resource is built once loading finishes, restored from
//! the save, then primed with a first pass. After that a repeating timer asks
//! it to reassign, which only does work when the wall clock has crossed into
//! a new window.

use bevy::prelude::*;
use rand::thread_rng;

use crate::catalog::ItemCatalog;
use crate::shared::*;

pub mod blockers;
pub mod manager;
pub mod schedule;
pub mod select;

pub use blockers::{rod_satisfies, BlockerContext, StartRejection};
pub use manager::{IslandManager, IslandSnapshot};
pub use schedule::TimeBlock;

/// Fires the reassignment check.
#[derive(Resource, Debug)]
pub struct ReassignTimer(pub Timer);

impl Default for ReassignTimer {
    fn default() -> Self {
        Self::from_config(&IslandConfig::default())
    }
}

impl ReassignTimer {
    pub fn from_config(config: &IslandConfig) -> Self {
        Self(Timer::from_seconds(
            config.check_interval_secs.max(0.1),
            TimerMode::Repeating,
        ))
    }
}

#[derive(Resource, Debug)]
pub struct EnergyRegenTimer(pub Timer);

impl Default for EnergyRegenTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(
            IslandConfig::default().energy_regen_secs,
            TimerMode::Repeating,
        ))
    }
}

pub struct IslandPlugin;

impl Plugin for IslandPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<IslandConfig>()
            .init_resource::<IslandManager>()
            .init_resource::<PlayerEnergy>()
            .init_resource::<ReassignTimer>()
            .init_resource::<EnergyRegenTimer>();

        app.add_systems(
            OnExit(GameState::Loading),
            (
                build_island_manager.in_set(SessionSet::Build),
                prime_assignments.in_set(SessionSet::Prime),
            ),
        );

        app.add_systems(
            Update,
            (
                tick_reassignment.run_if(in_state(GameState::Playing)),
                regenerate_energy
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Minigame))),
            ),
        );
    }
}

/// Build the engine from the loaded tables. Any table previously held is
/// replaced, so a reload starts clean.
pub fn build_island_manager(
    config: Res<IslandConfig>,
    elements: Res<GameElementRegistry>,
    areas: Res<AreaRegistry>,
    mut manager: ResMut<IslandManager>,
    mut reassign_timer: ResMut<ReassignTimer>,
    mut regen_timer: ResMut<EnergyRegenTimer>,
) {
    *manager = IslandManager::new(
        config.clone(),
        elements.elements.clone(),
        areas.areas.clone(),
    );
    *reassign_timer = ReassignTimer::from_config(&config);
    regen_timer.0 = Timer::from_seconds(config.energy_regen_secs.max(0.1), TimerMode::Repeating);
    info!(
        "[Islands] Engine ready: {} areas, {} game elements",
        areas.areas.len(),
        elements.elements.len()
    );
}

/// First pass after restore: forced for a brand-new player, otherwise a
/// normal check so a stale save catches up with the clock.
pub fn prime_assignments(
    mut manager: ResMut<IslandManager>,
    catalog: Res<ItemCatalog>,
    mut changed_writer: EventWriter<AssignmentsChangedEvent>,
) {
    let forced = !manager.has_ever_assigned();
    let now = TimeBlock::now(manager.config().bucket_minutes);
    if manager.assign_island_game_elements(forced, now, &catalog, &mut thread_rng()) {
        changed_writer.send(AssignmentsChangedEvent { forced });
    }
}

pub fn tick_reassignment(
    time: Res<Time>,
    mut timer: ResMut<ReassignTimer>,
    mut manager: ResMut<IslandManager>,
    catalog: Res<ItemCatalog>,
    mut changed_writer: EventWriter<AssignmentsChangedEvent>,
) {
    timer.0.tick(time.delta());
    if !timer.0.just_finished() {
        return;
    }
    let now = TimeBlock::now(manager.config().bucket_minutes);
    if manager.assign_island_game_elements(false, now, &catalog, &mut thread_rng()) {
        changed_writer.send(AssignmentsChangedEvent { forced: false });
    }
}

pub fn regenerate_energy(
    time: Res<Time>,
    mut timer: ResMut<EnergyRegenTimer>,
    mut energy: ResMut<PlayerEnergy>,
) {
    timer.0.tick(time.delta());
    let points = timer.0.times_finished_this_tick();
    if points > 0 && energy.current < energy.max {
        energy.restore(points);
    }
}
