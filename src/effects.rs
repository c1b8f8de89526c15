use bevy::prelude::*;

use crate::animation::{AnimationState, SpriteSheets, EXPLOSION_DURATION, EXPLOSION_FRAMES};
use crate::audio::GameAudio;
use crate::components::{lifetime_system, EntityKind, Lifetime};
use crate::player::{player_movement_system, Player};

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        // Followers copy the position the player has after this frame's
        // move. A respawn teleport happens later, in PostUpdate collision
        // handling, and is picked up on the next frame.
        app.add_systems(
            Update,
            (
                follow_player_system.after(player_movement_system),
                lifetime_system,
            ),
        )
        // SpawnExplosion is triggered from inside the bullet-hit observer.
        // Observers run as soon as the trigger command is applied, so the
        // explosion exists before the frame's transforms propagate.
        .add_observer(on_spawn_explosion);
    }
}

pub const EXPLOSION_SIZE: Vec2 = Vec2::new(80.0, 80.0);
const EXPLOSION_Z: f32 = 4.0;

/// Keeps the entity centred on the player.
#[derive(Component)]
pub struct FollowPlayer;

pub fn follow_player_system(
    player: Query<&Transform, With<Player>>,
    mut followers: Query<&mut Transform, (With<FollowPlayer>, Without<Player>)>,
) {
    let Ok(player) = player.single() else {
        return;
    };
    for mut transform in followers.iter_mut() {
        transform.translation.x = player.translation.x;
        transform.translation.y = player.translation.y;
    }
}

/// Request an explosion centred at `at`.
#[derive(Event, Debug)]
pub struct SpawnExplosion {
    pub at: Vec2,
}

fn on_spawn_explosion(
    trigger: On<SpawnExplosion>,
    mut commands: Commands,
    sprite_sheets: Option<Res<SpriteSheets>>,
    audio: Option<Res<GameAudio>>,
) {
    let Some(sprite_sheets) = sprite_sheets else {
        warn!("Explosion requested before sprite sheets were loaded");
        return;
    };

    commands.spawn((
        EntityKind::Explosion,
        Sprite {
            image: sprite_sheets.explosion.clone(),
            texture_atlas: Some(TextureAtlas {
                layout: sprite_sheets.explosion_layout.clone(),
                index: 0,
            }),
            custom_size: Some(EXPLOSION_SIZE),
            ..default()
        },
        AnimationState::once_over(EXPLOSION_DURATION, EXPLOSION_FRAMES),
        Transform::from_translation(trigger.at.extend(EXPLOSION_Z)),
        Lifetime::from_seconds(EXPLOSION_DURATION),
    ));

    if let Some(audio) = audio {
        commands.spawn((
            AudioPlayer::new(audio.explosion.clone()),
            PlaybackSettings::DESPAWN,
        ));
    }
}
