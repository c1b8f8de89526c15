use bevy::prelude::*;

use crate::collision::Collider;
use crate::components::{Cooldown, EntityKind, Velocity};
use crate::player::Player;
use crate::playfield::Playfield;
use crate::shapes::{ShapeAssets, SEEKER_RADIUS, WANDERER_SIZE};

pub struct EnemiesPlugin;

impl Plugin for EnemiesPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(EnemySpawnTimers::default()).add_systems(
            Update,
            (spawn_enemies_system, wander_system, seek_system),
        );
    }
}

pub const WANDERER_SPAWN_INTERVAL: f32 = 2.0;
pub const SEEKER_SPAWN_INTERVAL: f32 = 5.0;
pub const WANDER_RETARGET: f32 = 4.0;
pub const SEEK_RETARGET: f32 = 2.0;
/// 5 px per frame at 60 frames per second
pub const SEEKER_SPEED: f32 = 300.0;
/// Screen position (top-left, y down) where new enemies appear. A wanderer's
/// top-left corner goes here; a circle is positioned by its centre, so a
/// seeker is centred on it.
pub const ENEMY_SPAWN_CORNER: Vec2 = Vec2::new(50.0, 50.0);
const ENEMY_Z: f32 = 0.0;

#[derive(Resource)]
pub struct EnemySpawnTimers {
    pub wanderer: Timer,
    pub seeker: Timer,
}

impl Default for EnemySpawnTimers {
    fn default() -> Self {
        Self {
            wanderer: Timer::from_seconds(WANDERER_SPAWN_INTERVAL, TimerMode::Repeating),
            seeker: Timer::from_seconds(SEEKER_SPAWN_INTERVAL, TimerMode::Repeating),
        }
    }
}

/// Drifts toward a fresh random point every few seconds.
#[derive(Component, Debug)]
pub struct Wander {
    pub retarget: Cooldown,
}

impl Default for Wander {
    fn default() -> Self {
        Wander {
            retarget: Cooldown::new(WANDER_RETARGET),
        }
    }
}

/// Re-aims at the player every few seconds.
#[derive(Component, Debug)]
pub struct Seek {
    pub retarget: Cooldown,
}

impl Default for Seek {
    fn default() -> Self {
        Seek {
            retarget: Cooldown::new(SEEK_RETARGET),
        }
    }
}

/// Velocity that reaches `target` from `position` in exactly `seconds`.
pub fn wander_velocity(position: Vec2, target: Vec2, seconds: f32) -> Vec2 {
    (target - position) / seconds
}

/// Velocity straight at `target` at `speed`.
pub fn seek_velocity(position: Vec2, target: Vec2, speed: f32) -> Vec2 {
    (target - position).normalize_or_zero() * speed
}

/// World position of a new enemy's centre, given the size of the box whose
/// corner sits on the spawn point.
pub fn enemy_spawn_point(playfield: &Playfield, size: Vec2) -> Vec2 {
    playfield.to_world(ENEMY_SPAWN_CORNER + size / 2.0)
}

fn spawn_enemies_system(
    mut commands: Commands,
    mut timers: ResMut<EnemySpawnTimers>,
    time: Res<Time>,
    shapes: Res<ShapeAssets>,
    playfield: Res<Playfield>,
) {
    timers.wanderer.tick(time.delta());
    timers.seeker.tick(time.delta());

    for _ in 0..timers.wanderer.times_finished_this_tick() {
        spawn_wanderer(&mut commands, &shapes, &playfield);
    }
    for _ in 0..timers.seeker.times_finished_this_tick() {
        spawn_seeker(&mut commands, &shapes, &playfield);
    }
}

pub fn spawn_wanderer(commands: &mut Commands, shapes: &ShapeAssets, playfield: &Playfield) {
    let at = enemy_spawn_point(playfield, WANDERER_SIZE);
    commands.spawn((
        EntityKind::Wanderer,
        Collider::rect(WANDERER_SIZE),
        Mesh2d(shapes.wanderer_mesh.clone()),
        MeshMaterial2d(shapes.wanderer_material.clone()),
        Transform::from_translation(at.extend(ENEMY_Z)),
        Velocity::default(),
        Wander::default(),
    ));
    debug!("Spawned wanderer at {}", at);
}

pub fn spawn_seeker(commands: &mut Commands, shapes: &ShapeAssets, playfield: &Playfield) {
    let at = enemy_spawn_point(playfield, Vec2::ZERO);
    commands.spawn((
        EntityKind::Seeker,
        Collider::circle(SEEKER_RADIUS),
        Mesh2d(shapes.seeker_mesh.clone()),
        MeshMaterial2d(shapes.seeker_material.clone()),
        Transform::from_translation(at.extend(ENEMY_Z)),
        Velocity::default(),
        Seek::default(),
    ));
    debug!("Spawned seeker at {}", at);
}

pub fn wander_system(
    mut query: Query<(&Transform, &mut Velocity, &mut Wander)>,
    playfield: Res<Playfield>,
    time: Res<Time>,
) {
    let mut rng = rand::thread_rng();
    for (transform, mut velocity, mut wander) in query.iter_mut() {
        wander.retarget.tick(time.delta_secs());
        if wander.retarget.is_ready() {
            let target = playfield.random_point(&mut rng);
            velocity.0 = wander_velocity(transform.translation.truncate(), target, WANDER_RETARGET);
            wander.retarget.reset();
        }
    }
}

pub fn seek_system(
    mut seekers: Query<(&Transform, &mut Velocity, &mut Seek), Without<Player>>,
    player: Query<&Transform, With<Player>>,
    time: Res<Time>,
) {
    let player = player.single().ok().map(|t| t.translation.truncate());
    for (transform, mut velocity, mut seek) in seekers.iter_mut() {
        seek.retarget.tick(time.delta_secs());
        // Without a player the seeker keeps its last heading and tries again next frame
        let Some(target) = player else {
            continue;
        };
        if seek.retarget.is_ready() {
            velocity.0 = seek_velocity(transform.translation.truncate(), target, SEEKER_SPEED);
            seek.retarget.reset();
        }
    }
}
