use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::collision::Collider;
use crate::components::{apply_velocity_system, EntityKind, Lifetime, Velocity};
use crate::effects::FollowPlayer;
use crate::input::InputBindings;
use crate::player::{facing, Gun, Player};
use crate::playfield::Playfield;
use crate::shapes::{ShapeAssets, BULLET_SIZE, SHOCKWAVE_RADIUS};

pub struct WeaponsPlugin;

impl Plugin for WeaponsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                shoot_system,
                shockwave_system,
                apply_velocity_system,
                clean_offscreen_bullets_system,
            )
                .chain(),
        );
    }
}

/// 10 px per frame at 60 frames per second
pub const BULLET_SPEED: f32 = 600.0;
pub const SHOCKWAVE_LIFETIME: f32 = 5.0;
const BULLET_Z: f32 = 1.0;
const SHOCKWAVE_Z: f32 = 3.0;

#[derive(Component)]
pub struct Bullet;

/// Direction a bullet fired from `origin` should travel.
///
/// Aims at the cursor; when there is no cursor, or it sits on the muzzle,
/// the bullet leaves along the player's heading instead.
pub fn bullet_direction(cursor: Option<Vec2>, origin: Vec2, heading: Vec2) -> Vec2 {
    cursor
        .map(|cursor| (cursor - origin).normalize_or_zero())
        .filter(|direction| *direction != Vec2::ZERO)
        .unwrap_or(heading)
}

fn cursor_world_position(window: &Window, camera: &Camera, camera_transform: &GlobalTransform) -> Option<Vec2> {
    let cursor = window.cursor_position()?;
    camera.viewport_to_world_2d(camera_transform, cursor).ok()
}

fn shoot_system(
    mut commands: Commands,
    bindings: Res<InputBindings>,
    mouse: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    shapes: Res<ShapeAssets>,
    mut player: Query<(&Transform, &mut Gun), With<Player>>,
    window: Query<&Window, With<PrimaryWindow>>,
    camera: Query<(&Camera, &GlobalTransform)>,
) {
    let Ok((transform, mut gun)) = player.single_mut() else {
        return;
    };

    gun.0.tick(time.delta_secs());
    if !mouse.pressed(bindings.shoot) || !gun.0.is_ready() {
        return;
    }

    let cursor = match (window.single(), camera.single()) {
        (Ok(window), Ok((camera, camera_transform))) => {
            cursor_world_position(window, camera, camera_transform)
        }
        _ => None,
    };

    let origin = transform.translation.truncate();
    let direction = bullet_direction(cursor, origin, facing(transform));
    spawn_bullet(&mut commands, &shapes, origin, direction);
    gun.0.reset();
}

pub fn spawn_bullet(commands: &mut Commands, shapes: &ShapeAssets, origin: Vec2, direction: Vec2) {
    commands.spawn((
        Bullet,
        EntityKind::Bullet,
        Collider::oriented_rect(BULLET_SIZE, direction),
        Mesh2d(shapes.bullet_mesh.clone()),
        MeshMaterial2d(shapes.bullet_material.clone()),
        Transform::from_translation(origin.extend(BULLET_Z))
            .with_rotation(Quat::from_rotation_z(direction.to_angle())),
        Velocity(direction * BULLET_SPEED),
    ));
}

fn shockwave_system(
    mut commands: Commands,
    bindings: Res<InputBindings>,
    keys: Res<ButtonInput<KeyCode>>,
    shapes: Res<ShapeAssets>,
    player: Query<&Transform, With<Player>>,
) {
    if !keys.just_pressed(bindings.shockwave) {
        return;
    }
    let Ok(player) = player.single() else {
        return;
    };

    commands.spawn((
        EntityKind::Shockwave,
        Collider::circle(SHOCKWAVE_RADIUS),
        Mesh2d(shapes.shockwave_mesh.clone()),
        MeshMaterial2d(shapes.shockwave_material.clone()),
        Transform::from_translation(player.translation.truncate().extend(SHOCKWAVE_Z)),
        FollowPlayer,
        Lifetime::from_seconds(SHOCKWAVE_LIFETIME),
    ));
    debug!("Shockwave at {}", player.translation.truncate());
}

pub fn clean_offscreen_bullets_system(
    mut commands: Commands,
    bullets: Query<(Entity, &Transform), With<Bullet>>,
    playfield: Res<Playfield>,
) {
    let half_extents = Vec2::splat(BULLET_SIZE.x / 2.0);
    for (entity, transform) in bullets.iter() {
        if playfield.is_outside(transform.translation.truncate(), half_extents) {
            commands.entity(entity).try_despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn armed_app() -> (App, Entity) {
        let mut app = App::new();
        app.insert_resource(Time::<()>::default())
            .init_resource::<InputBindings>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ShapeAssets>()
            .add_systems(Update, (shoot_system, shockwave_system));
        let player = app
            .world_mut()
            .spawn((Player, Transform::from_xyz(0.0, 0.0, 2.0), Gun::default()))
            .id();
        (app, player)
    }

    /// Runs one frame that is `seconds` long.
    fn step(app: &mut App, seconds: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(seconds));
        app.update();
    }

    fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<Entity, F>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn holding_the_button_fires_every_cooldown() {
        let (mut app, _) = armed_app();

        step(&mut app, 0.0);
        assert_eq!(count::<With<Bullet>>(&mut app), 0);

        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        step(&mut app, 0.0);
        assert_eq!(count::<With<Bullet>>(&mut app), 1);

        // 0.2 s into a 0.33 s cooldown
        step(&mut app, 0.2);
        assert_eq!(count::<With<Bullet>>(&mut app), 1);
        step(&mut app, 0.2);
        assert_eq!(count::<With<Bullet>>(&mut app), 2);

        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .release(MouseButton::Left);
        step(&mut app, 0.5);
        assert_eq!(count::<With<Bullet>>(&mut app), 2);
    }

    #[test]
    fn fired_bullet_flies_along_the_heading_without_a_window() {
        let (mut app, player) = armed_app();
        app.world_mut()
            .get_mut::<Transform>(player)
            .unwrap()
            .rotation = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);

        step(&mut app, 0.0);

        let (velocity, collider) = app
            .world_mut()
            .query_filtered::<(&Velocity, &Collider), With<Bullet>>()
            .single(app.world())
            .map(|(velocity, collider)| (*velocity, *collider))
            .unwrap();
        assert!((velocity.0 - Vec2::new(0.0, BULLET_SPEED)).length() < 1e-3);
        let Collider::OrientedRect { axis, .. } = collider else {
            panic!("bullets use an oriented box");
        };
        assert!((axis - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn one_shockwave_per_press() {
        let (mut app, _) = armed_app();

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyF);
        step(&mut app, 0.0);
        assert_eq!(count::<With<FollowPlayer>>(&mut app), 1);

        let lifetime = app
            .world_mut()
            .query_filtered::<&Lifetime, With<FollowPlayer>>()
            .single(app.world())
            .unwrap()
            .0
            .duration();
        assert_eq!(lifetime, Duration::from_secs(5));

        // Still held on the next frame
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
        step(&mut app, 0.1);
        assert_eq!(count::<With<FollowPlayer>>(&mut app), 1);

        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.release(KeyCode::KeyF);
        keys.press(KeyCode::KeyF);
        step(&mut app, 0.1);
        assert_eq!(count::<With<FollowPlayer>>(&mut app), 2);
    }

    #[test]
    fn bullets_aim_at_the_cursor() {
        let direction = bullet_direction(Some(Vec2::new(10.0, 10.0)), Vec2::new(10.0, 0.0), Vec2::X);
        assert_eq!(direction, Vec2::Y);
    }

    #[test]
    fn cursor_on_player_fires_along_heading() {
        let origin = Vec2::new(4.0, 4.0);
        assert_eq!(bullet_direction(Some(origin), origin, Vec2::NEG_Y), Vec2::NEG_Y);
        assert_eq!(bullet_direction(None, origin, Vec2::X), Vec2::X);
    }

    #[test]
    fn offscreen_bullets_are_removed() {
        let mut app = App::new();
        app.insert_resource(Playfield::new(1280.0, 720.0))
            .add_systems(Update, clean_offscreen_bullets_system);

        let inside = app
            .world_mut()
            .spawn((Bullet, Transform::from_xyz(630.0, 0.0, 0.0)))
            .id();
        let gone = app
            .world_mut()
            .spawn((Bullet, Transform::from_xyz(0.0, -400.0, 0.0)))
            .id();
        let not_a_bullet = app
            .world_mut()
            .spawn(Transform::from_xyz(2000.0, 0.0, 0.0))
            .id();

        app.update();

        assert!(app.world().get_entity(inside).is_ok());
        assert!(app.world().get_entity(gone).is_err());
        assert!(app.world().get_entity(not_a_bullet).is_ok());
    }
}
