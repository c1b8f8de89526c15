use bevy::prelude::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputBindings>();
    }
}

/// Which keys and buttons drive the player.
///
/// Movement and shooting act every frame the binding is held; the shockwave
/// fires once per press.
#[derive(Resource, Debug, Clone)]
pub struct InputBindings {
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub shoot: MouseButton,
    pub shockwave: KeyCode,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            move_up: KeyCode::KeyW,
            move_down: KeyCode::KeyS,
            shoot: MouseButton::Left,
            shockwave: KeyCode::KeyF,
        }
    }
}

impl InputBindings {
    /// Unit-per-axis direction from the held movement keys. Opposite keys
    /// cancel out; diagonals are not normalized.
    pub fn movement(&self, keys: &ButtonInput<KeyCode>) -> Vec2 {
        let mut direction = Vec2::ZERO;
        if keys.pressed(self.move_left) {
            direction.x -= 1.0;
        }
        if keys.pressed(self.move_right) {
            direction.x += 1.0;
        }
        if keys.pressed(self.move_up) {
            direction.y += 1.0;
        }
        if keys.pressed(self.move_down) {
            direction.y -= 1.0;
        }
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_maps_to_world_axes() {
        let bindings = InputBindings::default();
        let mut keys = ButtonInput::<KeyCode>::default();

        keys.press(KeyCode::KeyW);
        keys.press(KeyCode::KeyD);
        assert_eq!(bindings.movement(&keys), Vec2::new(1.0, 1.0));

        keys.press(KeyCode::KeyA);
        assert_eq!(bindings.movement(&keys), Vec2::new(0.0, 1.0));

        keys.release(KeyCode::KeyW);
        keys.press(KeyCode::KeyS);
        assert_eq!(bindings.movement(&keys), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn no_keys_no_movement() {
        let keys = ButtonInput::<KeyCode>::default();
        assert_eq!(InputBindings::default().movement(&keys), Vec2::ZERO);
    }
}
