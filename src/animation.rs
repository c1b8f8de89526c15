use bevy::prelude::*;

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_sprite_sheets)
            .add_systems(Update, animation_system);
    }
}

/// The explosion sheet is 2048x1536: six 256 px rows of eight 256x256 frames.
/// Frames play row by row, left to right.
pub const EXPLOSION_FRAME_SIZE: UVec2 = UVec2::new(256, 256);
pub const EXPLOSION_COLUMNS: u32 = 8;
pub const EXPLOSION_ROWS: u32 = 6;
pub const EXPLOSION_FRAMES: usize = (EXPLOSION_COLUMNS * EXPLOSION_ROWS) as usize;
pub const EXPLOSION_DURATION: f32 = 2.0;

/// This prevents loading the same assets multiple times
#[derive(Resource)]
pub struct SpriteSheets {
    pub explosion: Handle<Image>,
    pub explosion_layout: Handle<TextureAtlasLayout>,
}

#[derive(Component, Default, Debug, Clone)]
pub struct AnimationState {
    pub frame_index: usize,
    pub frame_timer: f32,
    pub frame_duration: f32, // seconds per frame
    total_frames: usize,
    pub looping: bool,
    pub finished: bool, // True when a non-looping animation completes
}

impl AnimationState {
    pub fn new(frame_duration: f32, total_frames: usize, looping: bool) -> Self {
        AnimationState {
            frame_index: 0,
            frame_timer: 0.0,
            frame_duration,
            looping,
            finished: false,
            total_frames,
        }
    }

    /// Spread `total_frames` evenly over `seconds`, played once.
    pub fn once_over(seconds: f32, total_frames: usize) -> Self {
        Self::new(seconds / total_frames.max(1) as f32, total_frames, false)
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Advance by `delta_time`. Returns true on the frame a non-looping
    /// animation finishes.
    pub fn update(&mut self, delta_time: f32) -> bool {
        if self.finished || self.total_frames == 0 || self.frame_duration <= 0.0 {
            return false;
        }

        self.frame_timer += delta_time;

        // A long frame (or a very short frame_duration) can skip several frames
        while self.frame_timer >= self.frame_duration {
            self.frame_timer -= self.frame_duration;
            self.frame_index += 1;

            if self.frame_index >= self.total_frames {
                if self.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = self.total_frames - 1; // Stay on last frame
                    self.finished = true;
                    return true;
                }
            }
        }
        false
    }
}

pub fn animation_system(mut query: Query<(&mut AnimationState, &mut Sprite)>, time: Res<Time>) {
    for (mut anim_state, mut sprite) in query.iter_mut() {
        if anim_state.update(time.delta_secs()) {
            trace!("animation finished on frame {}", anim_state.frame_index);
        }

        if let Some(ref mut atlas) = sprite.texture_atlas {
            atlas.index = anim_state.frame_index;
        }
    }
}

pub fn load_sprite_sheets(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut texture_atlas_layouts: ResMut<Assets<TextureAtlasLayout>>,
) {
    let explosion = asset_server.load("explosion.png");
    let explosion_layout = texture_atlas_layouts.add(TextureAtlasLayout::from_grid(
        EXPLOSION_FRAME_SIZE,
        EXPLOSION_COLUMNS,
        EXPLOSION_ROWS,
        None,
        None,
    ));

    commands.insert_resource(SpriteSheets {
        explosion,
        explosion_layout,
    });
}
