use bevy::prelude::*;
use rand::Rng;

use crate::config::GameSettings;

pub struct PlayfieldPlugin;

impl Plugin for PlayfieldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, setup_playfield);
    }
}

/// The visible arena in world units.
///
/// The camera sits at the origin, so the world spans `-width/2..width/2`
/// horizontally and `-height/2..height/2` vertically, y up.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn half_size(&self) -> Vec2 {
        Vec2::new(self.width, self.height) / 2.0
    }

    /// Converts a screen point (origin top-left, y down) to world space.
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x - self.width / 2.0, self.height / 2.0 - screen.y)
    }

    pub fn random_point(&self, rng: &mut impl Rng) -> Vec2 {
        let half = self.half_size();
        Vec2::new(
            rng.gen_range(-half.x..=half.x),
            rng.gen_range(-half.y..=half.y),
        )
    }

    /// True when a box centred at `center` lies entirely outside the arena.
    pub fn is_outside(&self, center: Vec2, half_extents: Vec2) -> bool {
        let half = self.half_size();
        center.x + half_extents.x < -half.x
            || center.x - half_extents.x > half.x
            || center.y + half_extents.y < -half.y
            || center.y - half_extents.y > half.y
    }
}

fn setup_playfield(mut commands: Commands, settings: Res<GameSettings>) {
    commands.insert_resource(Playfield::new(
        settings.width as f32,
        settings.height as f32,
    ));
}
