use std::fmt;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub struct ConfigPlugin {
    pub settings: GameSettings,
    pub origin: SettingsOrigin,
}

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.settings.clone())
            .insert_resource(self.origin.clone())
            .add_systems(Startup, report_settings_origin);
    }
}

/// Window, title and mode settings.
///
/// Stored as RON so it can be edited by hand. Every field has
/// #[serde(default)] so a file written by an older build, or one with only a
/// couple of keys, still parses and the rest fall back to the defaults.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GameSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub version: String,
    pub fullscreen: bool,
    pub show_fps: bool,
    /// Developer mode logs at DEBUG instead of INFO.
    pub developer_mode: bool,
    /// Linear global volume applied to every sound.
    pub volume: f32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Geometry Wars".to_string(),
            version: "0.2dev".to_string(),
            fullscreen: false,
            show_fps: true,
            developer_mode: true,
            volume: 0.1,
        }
    }
}

impl GameSettings {
    pub fn window_title(&self) -> String {
        if self.version.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.version)
        }
    }

    pub fn log_level(&self) -> bevy::log::Level {
        if self.developer_mode {
            bevy::log::Level::DEBUG
        } else {
            bevy::log::Level::INFO
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "settings I/O failed: {}", e),
            SettingsError::Parse(e) => write!(f, "settings file is malformed: {}", e),
            SettingsError::Serialize(e) => write!(f, "could not serialize settings: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Serialize(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(error: std::io::Error) -> Self {
        SettingsError::Io(error)
    }
}

impl From<ron::error::SpannedError> for SettingsError {
    fn from(error: ron::error::SpannedError) -> Self {
        SettingsError::Parse(error)
    }
}

impl From<ron::Error> for SettingsError {
    fn from(error: ron::Error) -> Self {
        SettingsError::Serialize(error)
    }
}

/// Where the running settings came from.
///
/// Settings are loaded before the App (and therefore logging) exists, so the
/// outcome is kept as a resource and logged by a startup system.
#[derive(Resource, Debug, Clone)]
pub enum SettingsOrigin {
    File(PathBuf),
    CreatedDefaults(PathBuf),
    Defaults { reason: String },
}

/// `<config dir>/geometry-wars/settings.ron`, or `./settings.ron` on
/// platforms without a config directory.
pub fn settings_file_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("geometry-wars").join("settings.ron"))
        .unwrap_or_else(|| PathBuf::from("settings.ron"))
}

pub fn read_settings(path: &Path) -> Result<GameSettings, SettingsError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(ron::from_str::<GameSettings>(&contents)?)
}

pub fn write_settings(path: &Path, settings: &GameSettings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pretty = ron::ser::PrettyConfig::default();
    let serialized = ron::ser::to_string_pretty(settings, pretty)?;
    std::fs::write(path, serialized)?;
    Ok(())
}

/// Loads settings from `path`, never failing.
///
/// A missing file is replaced by the defaults (written back so the player has
/// something to edit). A file that can't be read or parsed is left alone and
/// the defaults are used for this run.
pub fn load_settings_from(path: &Path) -> (GameSettings, SettingsOrigin) {
    if !path.exists() {
        let settings = GameSettings::default();
        return match write_settings(path, &settings) {
            Ok(()) => (settings, SettingsOrigin::CreatedDefaults(path.to_path_buf())),
            Err(e) => (
                settings,
                SettingsOrigin::Defaults {
                    reason: e.to_string(),
                },
            ),
        };
    }

    match read_settings(path) {
        Ok(settings) => (settings, SettingsOrigin::File(path.to_path_buf())),
        Err(e) => (
            GameSettings::default(),
            SettingsOrigin::Defaults {
                reason: e.to_string(),
            },
        ),
    }
}

pub fn load_settings() -> (GameSettings, SettingsOrigin) {
    load_settings_from(&settings_file_path())
}

fn report_settings_origin(origin: Res<SettingsOrigin>, settings: Res<GameSettings>) {
    match origin.as_ref() {
        SettingsOrigin::File(path) => info!("Loaded settings from {:?}", path),
        SettingsOrigin::CreatedDefaults(path) => {
            info!("No settings file found. Wrote defaults to {:?}", path)
        }
        SettingsOrigin::Defaults { reason } => {
            error!("{}. Using default settings.", reason)
        }
    }
    debug!("{:?}", settings);
}
