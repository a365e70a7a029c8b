use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Prefix of the environment variables that override file settings
pub const ENV_PREFIX: &str = "MODAL_FORM_";

/// Element ids the page, dialog and form create for themselves
const RESERVED_IDS: &[&str] = &[
    "body",
    "open-form-button",
    "modal-backdrop",
    "modal-body",
    "modal-form-title",
    "modal-form-description",
    "name",
    "name-error",
    "email",
    "email-error",
    "career",
    "career-error",
    "github",
    "github-error",
    "form-cancel",
    "form-submit",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("mount_point_id must not be empty")]
    EmptyMountPoint,

    #[error("mount_point_id '{0}' collides with a built-in element id")]
    ReservedMountPoint(String),

    #[error("tick_rate_ms must be between 10 and 1000, got {0}")]
    TickRate(u64),

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Application configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Id of the element the dialog is mounted into
    pub mount_point_id: String,

    /// Whether the page inserts the mount point at all
    pub mount_point_enabled: bool,

    /// Capture mouse clicks
    pub mouse_enabled: bool,

    /// Input poll interval in milliseconds
    pub tick_rate_ms: u64,

    /// Directory for the log file
    pub data_dir: PathBuf,

    /// Number of filler paragraphs on the page
    pub filler_paragraphs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mount_point_id: "modal-container".to_string(),
            mount_point_enabled: true,
            mouse_enabled: true,
            tick_rate_ms: 100,
            data_dir: dirs::data_local_dir()
                .map(|dir| dir.join("modal-form"))
                .unwrap_or_else(|| PathBuf::from("./data")),
            filler_paragraphs: 40,
        }
    }
}

impl Config {
    /// Initialize configuration: defaults, then the first config file found
    /// (or `explicit`), then environment overrides
    pub async fn init(explicit: Option<&Path>) -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match explicit {
            Some(path) => Self::load_from_path(path).await?,
            None => Self::load_from_file().await?.unwrap_or_default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Candidate config files in priority order
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("./.modal-form.json"),
            PathBuf::from("./modal-form.json"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("modal-form").join("config.json"));
        }
        paths
    }

    /// Load the first existing config file, if any
    pub async fn load_from_file() -> Result<Option<Self>> {
        for path in Self::config_paths() {
            if path.exists() {
                return Self::load_from_path(&path).await.map(Some);
            }
        }
        Ok(None)
    }

    pub async fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply `MODAL_FORM_*` overrides looked up through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(id) = var("MOUNT_POINT") {
            self.mount_point_id = id;
        }
        if let Some(value) = var("MOUNT_POINT_ENABLED") {
            self.mount_point_enabled = parse_bool("MOUNT_POINT_ENABLED", &value)?;
        }
        if let Some(value) = var("MOUSE") {
            self.mouse_enabled = parse_bool("MOUSE", &value)?;
        }
        if let Some(value) = var("TICK_RATE_MS") {
            self.tick_rate_ms = parse_number("TICK_RATE_MS", &value)?;
        }
        if let Some(dir) = var("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(value) = var("FILLER") {
            self.filler_paragraphs = parse_number("FILLER", &value)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let id = self.mount_point_id.trim();
        if id.is_empty() {
            return Err(ConfigError::EmptyMountPoint);
        }
        if RESERVED_IDS.contains(&id) {
            return Err(ConfigError::ReservedMountPoint(id.to_string()));
        }
        if !(10..=1000).contains(&self.tick_rate_ms) {
            return Err(ConfigError::TickRate(self.tick_rate_ms));
        }
        Ok(())
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("modal-form.log")
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{}{}", ENV_PREFIX, key),
        value: value.to_string(),
    }
}
