use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{ViewError, ViewResult};
use crate::events::ViewportSize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// env_logger filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// How often the platform loop wakes up to check for Ctrl+C.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub id: String,
    pub kind: String,

    /// Free-form settings for the component kind.
    #[serde(default = "default_component_data")]
    pub data: toml::Value,
}

fn default_title() -> String {
    "viewkit".to_string()
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}
fn default_log_filter() -> String {
    "info".to_string()
}
fn default_poll_interval_ms() -> u64 {
    100
}

fn default_component_data() -> toml::Value {
    toml::Value::Table(toml::map::Map::new())
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            log_filter: default_log_filter(),
            poll_interval_ms: default_poll_interval_ms(),
            components: Vec::new(),
        }
    }
}

impl ViewConfig {
    /// Missing file means defaults; a malformed file is an error.
    pub fn load_or_default(path: &str) -> ViewResult<Self> {
        match fs::read_to_string(path) {
            Ok(s) => toml::from_str(&s)
                .map_err(|e| ViewError::Config(format!("parse {}: {}", path, e))),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(s: &str) -> ViewResult<Self> {
        toml::from_str(s).map_err(|e| ViewError::Config(e.to_string()))
    }

    #[inline]
    pub fn initial_viewport(&self) -> ViewportSize {
        ViewportSize::new(self.width, self.height)
    }
}

impl ComponentConfig {
    /// Integer setting from `data`, if present and non-negative.
    pub fn data_u32(&self, key: &str) -> Option<u32> {
        self.data
            .get(key)
            .and_then(toml::Value::as_integer)
            .and_then(|v| u32::try_from(v).ok())
    }
}
