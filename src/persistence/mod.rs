//! # Persistence Module
//!
//! ## Why This Module Exists
//! Layout proportions, broker settings and the headless cadence differ per
//! device. They live in a single TOML file under the platform config
//! directory (`<config_dir>/touchcontroller/config.toml`) so a tablet and a
//! desktop can run the same binary with different setups.
//!
//! ## Error Handling Strategy
//! File operations return `color_eyre` reports with the failing path in the
//! message. Every field has a default and partial files are accepted, so a
//! config written by an older version still loads.
//!
//! ## Design Philosophy
//! Missing configuration is not an error: the first start writes the defaults
//! out so they can be edited by hand afterwards.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::session::LayoutSettings;
use crate::transport::MqttConfig;

const APP_DIR: &str = "touchcontroller";
const CONFIG_FILE: &str = "config.toml";

/// Settings of the tick cycle and the host window
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    /// Ticks per second of the headless `SessionHandle`. The window host
    /// ticks once per presented frame and does not read it.
    pub frame_rate_hz: u32,
    /// Viewport used before the host reports its real size
    pub initial_width: f64,
    pub initial_height: f64,
    /// Treat the primary mouse button as a single touch contact
    pub emulate_touch_with_mouse: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60,
            initial_width: 1280.0,
            initial_height: 720.0,
            emulate_touch_with_mouse: false,
        }
    }
}

/// Complete application configuration as stored on disk
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub layout: LayoutSettings,
    pub transport: MqttConfig,
    pub session: SessionSettings,
}

impl AppConfig {
    /// `<config_dir>/touchcontroller/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| eyre!("Could not determine config directory"))?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads the config from the default location, writing defaults first if
    /// no file exists yet
    pub async fn load_or_default() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_or_create(&path).await
    }

    pub async fn load_or_create(path: &Path) -> Result<Self> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?;

        if exists {
            return Self::load_from(path).await;
        }

        info!("No config found at {}, writing defaults", path.display());
        let config = Self::default();
        config.save_to(path).await?;
        Ok(config)
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| eyre!("Failed to serialize config: {}", e))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| eyre!("Failed to write config file {}: {}", path.display(), e))?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }
}
