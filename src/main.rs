use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use islandfolio::shared::*;
use islandfolio::IslandfolioPlugin;

const SCREEN_WIDTH: f32 = 1280.0;
const SCREEN_HEIGHT: f32 = 720.0;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Islandfolio".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .add_plugins(IslandfolioPlugin)
        .add_systems(Startup, setup_camera)
        .add_systems(Update, log_toasts)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Until the overlay layer draws them, toasts go to the log.
fn log_toasts(mut toasts: EventReader<ToastEvent>) {
    for toast in toasts.read() {
        info!("[Toast] {}", toast.message);
    }
}
