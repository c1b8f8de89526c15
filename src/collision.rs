use std::collections::HashSet;

use bevy::prelude::*;
use bevy::transform::TransformSystems;

use crate::components::EntityKind;
use crate::effects::SpawnExplosion;
use crate::player::Player;
use crate::playfield::Playfield;
use crate::score::Score;

pub struct CollisionPlugin;

impl Plugin for CollisionPlugin {
    fn build(&self, app: &mut App) {
        // Detection runs in PostUpdate, after every Update system has moved
        // things, but BEFORE transform propagation. Nothing here has a parent,
        // so Transform already is the world position. Running first means a
        // teleport or a shockwave push written by a response below is
        // propagated to GlobalTransform (and so rendered) on the same frame.
        //
        // The responses are observers. detect_collisions_system only calls
        // commands.trigger(...); Bevy inserts a sync point between it and
        // propagation, and that is where the observers actually run. Their
        // own commands (despawns, SpawnExplosion) are applied right after.
        app.init_resource::<ActiveContacts>()
            .add_systems(
                PostUpdate,
                detect_collisions_system.before(TransformSystems::Propagate),
            )
            .add_observer(on_bullet_hit_enemy)
            .add_observer(on_enemy_hit_player)
            .add_observer(on_shockwave_hit_enemy);
    }
}

/// Distance a shockwave shoves an enemy on contact
pub const SHOCKWAVE_PUSH: f32 = 100.0;

/// Collision shape, centred on the entity's translation.
///
/// `Circle` and `Rect` ignore the entity's rotation. `OrientedRect` carries
/// its own heading: bullets never turn after they're fired, so the direction
/// is fixed at spawn time.
#[derive(Component, Copy, Clone, Debug, PartialEq)]
pub enum Collider {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
    /// `axis` is the unit direction of the box's local +x.
    OrientedRect { half_extents: Vec2, axis: Vec2 },
}

impl Collider {
    pub fn circle(radius: f32) -> Self {
        Collider::Circle { radius }
    }

    pub fn rect(size: Vec2) -> Self {
        Collider::Rect {
            half_extents: size / 2.0,
        }
    }

    /// A box of `size` whose length runs along `direction`.
    pub fn oriented_rect(size: Vec2, direction: Vec2) -> Self {
        Collider::OrientedRect {
            half_extents: size / 2.0,
            axis: direction.normalize_or(Vec2::X),
        }
    }

    /// Half extents and local +x axis, for the box shapes.
    fn as_box(&self) -> Option<(Vec2, Vec2)> {
        match *self {
            Collider::Circle { .. } => None,
            Collider::Rect { half_extents } => Some((half_extents, Vec2::X)),
            Collider::OrientedRect { half_extents, axis } => Some((half_extents, axis)),
        }
    }
}

/// Strict overlap test; shapes that only touch do not collide.
pub fn overlaps(a: &Collider, a_pos: Vec2, b: &Collider, b_pos: Vec2) -> bool {
    match (a, b) {
        (Collider::Circle { radius: ra }, Collider::Circle { radius: rb }) => {
            a_pos.distance_squared(b_pos) < (ra + rb) * (ra + rb)
        }
        (Collider::Rect { half_extents: ha }, Collider::Rect { half_extents: hb }) => {
            let d = (a_pos - b_pos).abs();
            d.x < ha.x + hb.x && d.y < ha.y + hb.y
        }
        (Collider::Circle { radius }, other) | (other, Collider::Circle { radius }) => {
            let (circle_pos, box_pos) = if matches!(a, Collider::Circle { .. }) {
                (a_pos, b_pos)
            } else {
                (b_pos, a_pos)
            };
            match other.as_box() {
                Some((half_extents, axis)) => {
                    circle_box_overlap(circle_pos, *radius, box_pos, half_extents, axis)
                }
                None => false,
            }
        }
        _ => match (a.as_box(), b.as_box()) {
            (Some((ha, ua)), Some((hb, ub))) => boxes_overlap(a_pos, ha, ua, b_pos, hb, ub),
            _ => false,
        },
    }
}

fn circle_rect_overlap(center: Vec2, radius: f32, rect_pos: Vec2, half_extents: Vec2) -> bool {
    let closest = center.clamp(rect_pos - half_extents, rect_pos + half_extents);
    center.distance_squared(closest) < radius * radius
}

/// Moves the circle into the box's local frame, where the box is axis aligned.
fn circle_box_overlap(center: Vec2, radius: f32, box_pos: Vec2, half_extents: Vec2, axis: Vec2) -> bool {
    let d = center - box_pos;
    let local = Vec2::new(d.dot(axis), d.dot(axis.perp()));
    circle_rect_overlap(local, radius, Vec2::ZERO, half_extents)
}

/// Separating-axis test for two boxes. Each box contributes its two edge
/// normals; the boxes overlap only if no candidate axis separates them.
fn boxes_overlap(a_pos: Vec2, ha: Vec2, ua: Vec2, b_pos: Vec2, hb: Vec2, ub: Vec2) -> bool {
    let projected = |half: Vec2, u: Vec2, n: Vec2| half.x * u.dot(n).abs() + half.y * u.perp().dot(n).abs();
    let d = b_pos - a_pos;

    [ua, ua.perp(), ub, ub.perp()]
        .into_iter()
        .all(|n| d.dot(n).abs() < projected(ha, ua, n) + projected(hb, ub, n))
}

/// Which response a pair of kinds gets, if any.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollisionHandler {
    BulletEnemy,
    PlayerEnemy,
    ShockwaveEnemy,
}

impl CollisionHandler {
    /// Looks up the handler for a pair. The bool is true when the pair has
    /// to be swapped so that the enemy comes second.
    pub fn for_kinds(a: EntityKind, b: EntityKind) -> Option<(CollisionHandler, bool)> {
        let handler = |first: EntityKind| match first {
            EntityKind::Bullet => Some(CollisionHandler::BulletEnemy),
            EntityKind::Player => Some(CollisionHandler::PlayerEnemy),
            EntityKind::Shockwave => Some(CollisionHandler::ShockwaveEnemy),
            _ => None,
        };

        if b.is_enemy() {
            if let Some(found) = handler(a) {
                return Some((found, false));
            }
        }
        if a.is_enemy() {
            if let Some(found) = handler(b) {
                return Some((found, true));
            }
        }
        None
    }

    /// Whether the response removes the enemy.
    pub fn removes_enemy(self) -> bool {
        !matches!(self, CollisionHandler::ShockwaveEnemy)
    }
}

/// Pairs that were overlapping at the end of the last check.
#[derive(Resource, Default, Debug)]
pub struct ActiveContacts(pub HashSet<(Entity, Entity)>);

impl ActiveContacts {
    /// Replaces the tracked set with `current` and returns the pairs that
    /// were not in contact before, in the order given.
    pub fn begin(&mut self, current: Vec<(Entity, Entity)>) -> Vec<(Entity, Entity)> {
        let began = current
            .iter()
            .copied()
            .filter(|pair| !self.0.contains(pair))
            .collect();
        self.0 = current.into_iter().collect();
        began
    }
}

/// A bullet started touching a wanderer or seeker
#[derive(Event, Debug)]
pub struct BulletHitEnemy {
    pub bullet: Entity,
    pub enemy: Entity,
}

/// A wanderer or seeker started touching the player
#[derive(Event, Debug)]
pub struct EnemyHitPlayer {
    pub player: Entity,
    pub enemy: Entity,
}

/// A shockwave reached a wanderer or seeker
#[derive(Event, Debug)]
pub struct ShockwaveHitEnemy {
    pub shockwave: Entity,
    pub enemy: Entity,
}

/// Finds every handled pair that started overlapping this frame and triggers
/// its response.
///
/// Pairs are checked in a stable order (by entity) so that when one bullet
/// touches two enemies on the same frame the outcome doesn't depend on query
/// order. An entity already removed by an earlier response this frame is
/// skipped by later removing responses.
pub fn detect_collisions_system(
    mut commands: Commands,
    mut contacts: ResMut<ActiveContacts>,
    query: Query<(Entity, &EntityKind, &Collider, &Transform)>,
) {
    // Snapshot first, then compare pairs. Same two-phase shape as a
    // separation pass: read everything, decide, then act.
    let mut bodies: Vec<(Entity, EntityKind, Collider, Vec2)> = query
        .iter()
        .map(|(entity, kind, collider, transform)| {
            (entity, *kind, *collider, transform.translation.truncate())
        })
        .collect();
    bodies.sort_by_key(|(entity, ..)| *entity);

    let mut touching: Vec<(Entity, Entity, CollisionHandler)> = Vec::new();
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (entity_a, kind_a, collider_a, pos_a) = bodies[i];
            let (entity_b, kind_b, collider_b, pos_b) = bodies[j];

            let Some((handler, swap)) = CollisionHandler::for_kinds(kind_a, kind_b) else {
                continue;
            };
            if !overlaps(&collider_a, pos_a, &collider_b, pos_b) {
                continue;
            }

            let (first, enemy) = if swap {
                (entity_b, entity_a)
            } else {
                (entity_a, entity_b)
            };
            touching.push((first, enemy, handler));
        }
    }

    let pairs = touching.iter().map(|(a, b, _)| (*a, *b)).collect();
    let began: HashSet<(Entity, Entity)> = contacts.begin(pairs).into_iter().collect();

    let mut removed: HashSet<Entity> = HashSet::new();
    for (first, enemy, handler) in touching {
        if !began.contains(&(first, enemy)) {
            continue;
        }
        if handler.removes_enemy() && (removed.contains(&first) || removed.contains(&enemy)) {
            continue;
        }

        debug!("{:?} between {} and {}", handler, first, enemy);
        match handler {
            CollisionHandler::BulletEnemy => {
                removed.insert(first);
                removed.insert(enemy);
                commands.trigger(BulletHitEnemy {
                    bullet: first,
                    enemy,
                });
            }
            CollisionHandler::PlayerEnemy => {
                removed.insert(enemy);
                commands.trigger(EnemyHitPlayer {
                    player: first,
                    enemy,
                });
            }
            CollisionHandler::ShockwaveEnemy => {
                if removed.contains(&enemy) {
                    continue;
                }
                commands.trigger(ShockwaveHitEnemy {
                    shockwave: first,
                    enemy,
                });
            }
        }
    }
}

fn on_bullet_hit_enemy(
    trigger: On<BulletHitEnemy>,
    mut commands: Commands,
    mut score: ResMut<Score>,
    transforms: Query<&Transform>,
) {
    // Observers can trigger other events. The explosion itself is spawned by
    // the effects plugin, which owns the sprite sheet and the sound.
    if let Ok(enemy_transform) = transforms.get(trigger.enemy) {
        commands.trigger(SpawnExplosion {
            at: enemy_transform.translation.truncate(),
        });
    }

    commands.entity(trigger.bullet).try_despawn();
    commands.entity(trigger.enemy).try_despawn();
    score.add_kill();
}

fn on_enemy_hit_player(
    trigger: On<EnemyHitPlayer>,
    mut commands: Commands,
    mut score: ResMut<Score>,
    mut players: Query<&mut Transform, With<Player>>,
    playfield: Res<Playfield>,
) {
    if let Ok(mut transform) = players.get_mut(trigger.player) {
        let point = playfield.random_point(&mut rand::thread_rng());
        transform.translation.x = point.x;
        transform.translation.y = point.y;
    }

    commands.entity(trigger.enemy).try_despawn();
    score.deduct_death();
    info!("Player hit. Score is now {}", score.0);
}

/// Shoves the enemy directly away from the player.
fn on_shockwave_hit_enemy(
    trigger: On<ShockwaveHitEnemy>,
    players: Query<&Transform, With<Player>>,
    mut enemies: Query<&mut Transform, Without<Player>>,
) {
    let Ok(player) = players.single() else {
        return;
    };
    if let Ok(mut enemy) = enemies.get_mut(trigger.enemy) {
        let away = (enemy.translation - player.translation)
            .truncate()
            .normalize_or_zero();
        enemy.translation += (away * SHOCKWAVE_PUSH).extend(0.0);
    }
}
