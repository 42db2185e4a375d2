//! Persisted application settings.
//!
//! Settings live in a small JSON document. Keys use PascalCase so files
//! written by earlier releases keep loading:
//!
//! ```json
//! {
//!   "CellWidth": 120,
//!   "CellHeight": 96,
//!   "OffsetX": 8,
//!   "OffsetY": 12,
//!   "ScreenIndex": 0,
//!   "GridColorRgb": -10185235,
//!   "GridAlpha": 120,
//!   "Monitors": {
//!     "\\\\.\\DISPLAY2": { "CellWidth": 150 }
//!   }
//! }
//! ```
//!
//! Every field is optional. Out-of-range values are clamped, never rejected.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::grid::{GridLimits, GridStyle};
use crate::domain::grid::GridConfig;

/// Directory name under the roaming application-data folder
const APP_DIR: &str = "DesktopGridSnapper";
const FILE_NAME: &str = "settings.json";

/// Error from reading or writing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Top-level settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AppSettings {
    pub cell_width: i32,
    pub cell_height: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    /// Monitor last selected in the settings form
    pub screen_index: i32,
    /// Packed ARGB base colour of the grid lines
    pub grid_color_rgb: i32,
    /// Grid line opacity (0–255)
    pub grid_alpha: i32,
    /// Per-monitor overrides keyed by monitor device name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub monitors: BTreeMap<String, MonitorOverride>,
}

/// Grid values that replace the global ones on a single monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct MonitorOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<i32>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            cell_width: 120,
            cell_height: 96,
            offset_x: 8,
            offset_y: 12,
            screen_index: 0,
            grid_color_rgb: GridStyle::DEFAULT_COLOR,
            grid_alpha: i32::from(GridStyle::DEFAULT_ALPHA),
            monitors: BTreeMap::new(),
        }
    }
}

impl AppSettings {
    /// `%APPDATA%\DesktopGridSnapper\settings.json` (or the platform equivalent)
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|dirs| dirs.config_dir().join(APP_DIR).join(FILE_NAME))
    }

    /// Load settings from a JSON file at `path`, clamping every value.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(settings.sanitized())
    }

    /// Load settings, falling back to defaults when the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                info!("loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                info!("no settings file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Write the settings as indented JSON, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns a copy with every value inside its accepted range
    pub fn sanitized(mut self) -> Self {
        self.cell_width = GridLimits::cell(self.cell_width);
        self.cell_height = GridLimits::cell(self.cell_height);
        self.offset_x = GridLimits::offset(self.offset_x);
        self.offset_y = GridLimits::offset(self.offset_y);
        self.screen_index = self.screen_index.max(0);
        self.grid_alpha = i32::from(GridLimits::alpha(self.grid_alpha));
        for o in self.monitors.values_mut() {
            o.cell_width = o.cell_width.map(GridLimits::cell);
            o.cell_height = o.cell_height.map(GridLimits::cell);
            o.offset_x = o.offset_x.map(GridLimits::offset);
            o.offset_y = o.offset_y.map(GridLimits::offset);
        }
        self
    }

    /// Grid parameters for the monitor with the given device name
    pub fn grid_for(&self, monitor_name: &str) -> GridConfig {
        let o = self.monitors.get(monitor_name).cloned().unwrap_or_default();
        GridConfig::new(
            o.cell_width.unwrap_or(self.cell_width),
            o.cell_height.unwrap_or(self.cell_height),
            o.offset_x.unwrap_or(self.offset_x),
            o.offset_y.unwrap_or(self.offset_y),
        )
    }

    /// Line colour and opacity shared by every overlay
    pub fn style(&self) -> GridStyle {
        GridStyle::new(self.grid_color_rgb, GridLimits::alpha(self.grid_alpha))
    }
}
