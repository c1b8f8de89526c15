use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::{MonitorSelection, WindowMode, WindowResolution};

use crate::config::GameSettings;

fn main() {
    // Settings are read before the App exists because they decide the window
    // and the log level. Anything worth reporting about where they came from
    // is logged later by ConfigPlugin, once logging is up.
    let (settings, origin) = config::load_settings();

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(primary_window(&settings)),
                ..default()
            })
            .set(LogPlugin {
                level: settings.log_level(),
                ..default()
            }),
    );

    if settings.show_fps {
        app.add_plugins(FrameTimeDiagnosticsPlugin::default());
    }

    // Resources the Startup systems read (settings, playfield, meshes, sprite
    // sheets) exist before Startup runs, so plugin order here does not
    // matter. Per frame: input and movement in Update, then
    // collision detection and its observers in PostUpdate.
    app.add_plugins((
        config::ConfigPlugin { settings, origin },
        playfield::PlayfieldPlugin,
        input::InputPlugin,
        shapes::ShapesPlugin,
        animation::AnimationPlugin,
        audio::AudioPlugin,
        scene::ScenePlugin,
        player::PlayerPlugin,
        enemies::EnemiesPlugin,
        weapons::WeaponsPlugin,
        collision::CollisionPlugin,
        effects::EffectsPlugin,
        score::ScorePlugin,
    ))
    .run();
}

fn primary_window(settings: &GameSettings) -> Window {
    Window {
        title: settings.window_title(),
        resolution: WindowResolution::new(settings.width, settings.height),
        resizable: false,
        mode: if settings.fullscreen {
            WindowMode::BorderlessFullscreen(MonitorSelection::Primary)
        } else {
            WindowMode::Windowed
        },
        ..default()
    }
}

mod animation;
mod audio;
mod collision;
mod components;
mod config;
mod effects;
mod enemies;
mod input;
mod player;
mod playfield;
mod scene;
mod score;
mod shapes;
mod weapons;
