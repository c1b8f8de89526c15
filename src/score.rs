use bevy::prelude::*;

pub struct ScorePlugin;

impl Plugin for ScorePlugin {
    fn build(&self, app: &mut App) {
        // Score only changes inside the collision observers (PostUpdate), so
        // the label is rebuilt on the following Update, and only then.
        app.init_resource::<Score>()
            .add_systems(Startup, spawn_score_text)
            .add_systems(Update, update_score_text.run_if(resource_changed::<Score>));
    }
}

pub const KILL_REWARD: i32 = 100;
pub const DEATH_PENALTY: i32 = 1000;

/// The only number the game keeps. It can go negative.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score(pub i32);

impl Score {
    pub fn add_kill(&mut self) {
        self.0 += KILL_REWARD;
    }

    pub fn deduct_death(&mut self) {
        self.0 -= DEATH_PENALTY;
    }

    pub fn label(&self) -> String {
        format!("Score: {}", self.0)
    }
}

#[derive(Component)]
pub struct ScoreText;

fn spawn_score_text(mut commands: Commands, score: Res<Score>) {
    commands.spawn((
        ScoreText,
        Text::new(score.label()),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(1100.0),
            top: Val::Px(32.0),
            ..default()
        },
    ));
}

fn update_score_text(score: Res<Score>, mut query: Query<&mut Text, With<ScoreText>>) {
    for mut text in query.iter_mut() {
        text.0 = score.label();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kills_add_and_deaths_deduct() {
        let mut score = Score::default();
        score.add_kill();
        score.add_kill();
        assert_eq!(score.0, 200);

        score.deduct_death();
        assert_eq!(score, Score(-800));
        assert_eq!(score.label(), "Score: -800");
    }

    #[test]
    fn text_follows_the_score() {
        let mut app = App::new();
        app.add_plugins(ScorePlugin);
        app.update();

        app.world_mut().resource_mut::<Score>().add_kill();
        app.update();

        let mut texts = app.world_mut().query_filtered::<&Text, With<ScoreText>>();
        let text = texts.single(app.world()).unwrap();
        assert_eq!(text.0, "Score: 100");
    }
}
