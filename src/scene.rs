use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::config::GameSettings;
use crate::playfield::Playfield;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        // Startup runs after PreStartup, so Playfield and GameSettings are
        // already in place here.
        app.add_systems(Startup, (spawn_camera, spawn_background, spawn_fps_text))
            // The FPS diagnostic only exists when main added its plugin
            .add_systems(Update, update_fps_text.run_if(fps_enabled));
    }
}

/// Behind every gameplay sprite and mesh
const BACKGROUND_Z: f32 = -10.0;

#[derive(Component)]
pub struct Background;

#[derive(Component)]
pub struct FpsText;

/// Default 2D camera: origin at the window centre, one unit per pixel.
fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn spawn_background(mut commands: Commands, asset_server: Res<AssetServer>, playfield: Res<Playfield>) {
    commands.spawn((
        Background,
        Sprite {
            image: asset_server.load("background.png"),
            custom_size: Some(Vec2::new(playfield.width, playfield.height)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, BACKGROUND_Z),
    ));
}

fn fps_enabled(settings: Res<GameSettings>) -> bool {
    settings.show_fps
}

fn spawn_fps_text(mut commands: Commands, settings: Res<GameSettings>) {
    if !settings.show_fps {
        return;
    }
    commands.spawn((
        FpsText,
        Text::new("FPS: --"),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.8, 0.8, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
    ));
}

pub fn fps_label(fps: Option<f64>) -> String {
    match fps {
        Some(fps) => format!("FPS: {:.0}", fps),
        None => "FPS: --".to_string(),
    }
}

fn update_fps_text(diagnostics: Res<DiagnosticsStore>, mut query: Query<&mut Text, With<FpsText>>) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed());
    for mut text in query.iter_mut() {
        text.0 = fps_label(fps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_label_rounds() {
        assert_eq!(fps_label(Some(59.6)), "FPS: 60");
        assert_eq!(fps_label(None), "FPS: --");
    }
}
