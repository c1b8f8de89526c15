use bevy::{audio::Volume, prelude::*};

use crate::config::GameSettings;

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_audio);
    }
}

#[derive(Resource)]
pub struct GameAudio {
    /// Handle<T> is Bevy's way of referencing assets.
    pub explosion: Handle<AudioSource>,
}

pub fn setup_audio(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<GameSettings>,
) {
    let volume = settings.volume.clamp(0.0, 1.0);
    commands.insert_resource(GlobalVolume::new(Volume::Linear(volume)));
    debug!("Global volume set to {}", volume);

    commands.insert_resource(GameAudio {
        explosion: asset_server.load("audio/explosion.wav"),
    });
}
