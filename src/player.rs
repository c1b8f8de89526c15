use bevy::prelude::*;

use crate::collision::Collider;
use crate::components::{Cooldown, EntityKind};
use crate::input::InputBindings;
use crate::shapes::{ShapeAssets, PLAYER_SIZE};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_player)
            // Facing runs after moving so it sees this frame's displacement
            .add_systems(Update, (player_movement_system, face_movement_system).chain());
    }
}

/// 5 px per frame at 60 frames per second
pub const PLAYER_SPEED: f32 = 300.0;
pub const SHOOT_COOLDOWN: f32 = 0.33;
const PLAYER_Z: f32 = 2.0;

#[derive(Component)]
pub struct Player;

/// Where the player was when the heading was last updated.
#[derive(Component, Debug, Default)]
pub struct PreviousPosition(pub Vec2);

/// Limits how often the player can fire.
#[derive(Component, Debug)]
pub struct Gun(pub Cooldown);

impl Default for Gun {
    fn default() -> Self {
        Gun(Cooldown::new(SHOOT_COOLDOWN))
    }
}

pub fn spawn_player(mut commands: Commands, shapes: Res<ShapeAssets>) {
    let player = commands
        .spawn((
            Player,
            EntityKind::Player,
            Collider::rect(PLAYER_SIZE),
            Mesh2d(shapes.player_mesh.clone()),
            MeshMaterial2d(shapes.player_material.clone()),
            Transform::from_xyz(0.0, 0.0, PLAYER_Z),
            PreviousPosition::default(),
            Gun::default(),
        ))
        .id();
    debug!("Spawned player {}", player);
}

pub fn player_movement_system(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    time: Res<Time>,
    mut query: Query<&mut Transform, With<Player>>,
) {
    let direction = bindings.movement(&keys);
    if direction == Vec2::ZERO {
        return;
    }

    let step = direction * PLAYER_SPEED * time.delta_secs();
    for mut transform in query.iter_mut() {
        transform.translation += step.extend(0.0);
    }
}

/// Angle (radians) of the displacement from `previous` to `current`, or
/// `None` when the player hasn't moved.
pub fn heading_change(previous: Vec2, current: Vec2) -> Option<f32> {
    let delta = current - previous;
    if delta.length_squared() <= f32::EPSILON {
        None
    } else {
        Some(delta.y.atan2(delta.x))
    }
}

/// Turns the player to face wherever it moved since the last frame. Standing
/// still keeps the old heading.
pub fn face_movement_system(mut query: Query<(&mut Transform, &mut PreviousPosition), With<Player>>) {
    for (mut transform, mut previous) in query.iter_mut() {
        let current = transform.translation.truncate();
        if let Some(angle) = heading_change(previous.0, current) {
            transform.rotation = Quat::from_rotation_z(angle);
            previous.0 = current;
        }
    }
}

/// Unit vector the player is facing.
pub fn facing(transform: &Transform) -> Vec2 {
    (transform.rotation * Vec3::X).truncate().normalize_or(Vec2::X)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn heading_points_along_displacement() {
        assert_eq!(heading_change(Vec2::ZERO, Vec2::new(5.0, 0.0)), Some(0.0));
        let up = heading_change(Vec2::ZERO, Vec2::new(0.0, 5.0)).unwrap();
        assert!((up - FRAC_PI_2).abs() < 1e-6);
        let left = heading_change(Vec2::new(10.0, 10.0), Vec2::new(5.0, 10.0)).unwrap();
        assert!((left - PI).abs() < 1e-6);
    }

    #[test]
    fn standing_still_keeps_heading() {
        assert_eq!(heading_change(Vec2::new(3.0, 4.0), Vec2::new(3.0, 4.0)), None);
    }

    #[test]
    fn facing_follows_rotation() {
        let transform = Transform::from_rotation(Quat::from_rotation_z(FRAC_PI_2));
        let forward = facing(&transform);
        assert!(forward.x.abs() < 1e-6);
        assert!((forward.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn player_turns_toward_movement() {
        let mut app = App::new();
        app.add_systems(Update, face_movement_system);
        let player = app
            .world_mut()
            .spawn((Player, Transform::from_xyz(0.0, -10.0, 0.0), PreviousPosition::default()))
            .id();

        app.update();
        let rotation = app.world().get::<Transform>(player).unwrap().rotation;
        let forward = (rotation * Vec3::X).truncate();
        assert!((forward - Vec2::new(0.0, -1.0)).length() < 1e-5);

        // No movement on the next frame: heading is kept.
        app.update();
        assert_eq!(app.world().get::<Transform>(player).unwrap().rotation, rotation);
        assert_eq!(app.world().get::<PreviousPosition>(player).unwrap().0, Vec2::new(0.0, -10.0));
    }
}
