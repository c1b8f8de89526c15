// components.rs - Components shared by several plugins.
// Anything only one plugin cares about lives next to that plugin instead.

use bevy::prelude::*;

/// What an entity is, as far as collision handling is concerned.
#[derive(Component, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Wanderer,
    Seeker,
    Bullet,
    Shockwave,
    Explosion,
}

impl EntityKind {
    pub fn is_enemy(self) -> bool {
        matches!(self, EntityKind::Wanderer | EntityKind::Seeker)
    }
}

/// World units per second, integrated by `apply_velocity_system`.
#[derive(Component, Copy, Clone, Debug, Default, PartialEq)]
pub struct Velocity(pub Vec2);

/// Despawns the entity once the timer runs out.
#[derive(Component)]
pub struct Lifetime(pub Timer);

impl Lifetime {
    pub fn from_seconds(seconds: f32) -> Self {
        Lifetime(Timer::from_seconds(seconds, TimerMode::Once))
    }
}

/// A countdown that starts ready.
///
/// Used wherever something may happen "at most every N seconds": shooting,
/// and the wander/seek retargeting. A fresh cooldown fires on the first
/// frame, then waits `duration` after every `reset`.
#[derive(Clone, Debug, PartialEq)]
pub struct Cooldown {
    /// Seconds left until ready
    pub remaining: f32,
    pub duration: f32,
}

impl Cooldown {
    pub fn new(duration: f32) -> Self {
        Cooldown {
            remaining: 0.0,
            duration,
        }
    }

    pub fn tick(&mut self, delta_time: f32) {
        if self.remaining > 0.0 {
            self.remaining -= delta_time;
        }
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }
}

pub fn apply_velocity_system(mut query: Query<(&mut Transform, &Velocity)>, time: Res<Time>) {
    let delta = time.delta_secs();
    for (mut transform, velocity) in query.iter_mut() {
        transform.translation += (velocity.0 * delta).extend(0.0);
    }
}

pub fn lifetime_system(
    mut commands: Commands,
    mut query: Query<(Entity, &mut Lifetime)>,
    time: Res<Time>,
) {
    for (entity, mut lifetime) in query.iter_mut() {
        lifetime.0.tick(time.delta());
        if lifetime.0.is_finished() {
            commands.entity(entity).try_despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn cooldown_is_ready_immediately() {
        let cooldown = Cooldown::new(0.33);
        assert!(cooldown.is_ready());
    }

    #[test]
    fn cooldown_waits_full_duration_after_reset() {
        let mut cooldown = Cooldown::new(0.33);
        cooldown.reset();

        cooldown.tick(0.2);
        assert!(!cooldown.is_ready());

        cooldown.tick(0.2);
        assert!(cooldown.is_ready());
    }

    #[test]
    fn only_wanderers_and_seekers_are_enemies() {
        assert!(EntityKind::Wanderer.is_enemy());
        assert!(EntityKind::Seeker.is_enemy());
        assert!(!EntityKind::Player.is_enemy());
        assert!(!EntityKind::Bullet.is_enemy());
        assert!(!EntityKind::Shockwave.is_enemy());
        assert!(!EntityKind::Explosion.is_enemy());
    }

    #[test]
    fn expired_lifetimes_are_despawned() {
        let mut app = App::new();
        app.add_systems(Update, lifetime_system);

        let short = app.world_mut().spawn(Lifetime::from_seconds(1.0)).id();
        let long = app.world_mut().spawn(Lifetime::from_seconds(5.0)).id();

        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_secs_f32(2.0));
        app.insert_resource(time);
        app.update();

        assert!(app.world().get_entity(short).is_err());
        assert!(app.world().get_entity(long).is_ok());
    }

    #[test]
    fn velocity_moves_by_elapsed_time() {
        let mut app = App::new();
        app.add_systems(Update, apply_velocity_system);

        let mover = app
            .world_mut()
            .spawn((Transform::default(), Velocity(Vec2::new(300.0, -60.0))))
            .id();

        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_millis(500));
        app.insert_resource(time);
        app.update();

        let translation = app.world().get::<Transform>(mover).unwrap().translation;
        assert!((translation.x - 150.0).abs() < 1e-3);
        assert!((translation.y + 30.0).abs() < 1e-3);
    }
}
