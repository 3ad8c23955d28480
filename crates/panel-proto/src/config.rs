use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// How to reach the player-control CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_binary")]
    pub binary: String,
    /// Passed as `-h <host>` when set.
    #[serde(default)]
    pub host: Option<String>,
    /// Passed as `-p <port>` when set.
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_player_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    /// File the Spotify-Connect bridge rewrites on every track change.
    #[serde(default = "default_metadata_file")]
    pub metadata_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Path token removed from a stream URL when the first `add` is rejected.
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: String,
}

/// Backdrop geometry and treatment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_blur_sigma")]
    pub blur_sigma: f32,
    /// Brightness multiplier applied after the blur (0.0–1.0).
    #[serde(default = "default_brightness")]
    pub brightness: f32,
    #[serde(default = "default_art_timeout_secs")]
    pub art_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_render_interval_ms")]
    pub render_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            binary: default_player_binary(),
            host: None,
            port: None,
            timeout_ms: default_player_timeout_ms(),
        }
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            metadata_file: default_metadata_file(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            strip_prefix: default_strip_prefix(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            blur_sigma: default_blur_sigma(),
            brightness: default_brightness(),
            art_timeout_secs: default_art_timeout_secs(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            backoff_ms: default_backoff_ms(),
            render_interval_ms: default_render_interval_ms(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
        }
    }
}

impl PlayerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl DisplayConfig {
    pub fn art_timeout(&self) -> Duration {
        Duration::from_secs(self.art_timeout_secs)
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(50))
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms.max(16))
    }
}

fn default_player_binary() -> String {
    "mpc".to_string()
}

fn default_player_timeout_ms() -> u64 {
    3000
}

fn default_metadata_file() -> PathBuf {
    PathBuf::from("/var/local/www/spotmeta.txt")
}

fn default_database() -> PathBuf {
    PathBuf::from("/var/local/www/db/moode-sqlite3.db")
}

fn default_strip_prefix() -> String {
    "RADIO/".to_string()
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    480
}

fn default_blur_sigma() -> f32 {
    10.0
}

fn default_brightness() -> f32 {
    0.4
}

fn default_art_timeout_secs() -> u64 {
    5
}

fn default_interval_ms() -> u64 {
    500
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_render_interval_ms() -> u64 {
    250
}

fn default_log_file() -> PathBuf {
    platform::data_dir().join("display_debug.log")
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
