use crate::drop::FLOW_NODE_FORMAT;
use crate::id_generator::DEFAULT_PREFIX;
use directories::ProjectDirs;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User-editable editor settings, stored as TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Format key of the drag payload channel
    pub drag_format: String,
    /// Prefix for generated node ids
    pub id_prefix: String,
    /// Initial window size
    pub window_size: [f32; 2],
    pub show_grid: bool,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Project directory for saved flows; `None` keeps flows in memory only
    pub save_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drag_format: FLOW_NODE_FORMAT.to_string(),
            id_prefix: DEFAULT_PREFIX.to_string(),
            window_size: [1280.0, 800.0],
            show_grid: true,
            min_zoom: 0.25,
            max_zoom: 4.0,
            save_dir: None,
        }
    }
}

fn get_config_path() -> Option<PathBuf> {
    let proj_dirs = ProjectDirs::from("dev", "flow-editor", "flow_editor")?;
    let config_dir = proj_dirs.config_dir();
    if !config_dir.exists() {
        if let Err(e) = fs::create_dir_all(config_dir) {
            error!("Failed to create config directory: {}", e);
            return None;
        }
    }
    Some(config_dir.join("config.toml"))
}

/// Load settings from `path`, falling back to defaults on any error
pub fn load_config_from(path: &Path) -> EditorConfig {
    if !path.exists() {
        return EditorConfig::default();
    }
    match fs::read_to_string(path) {
        Ok(toml_str) => match toml::from_str(&toml_str) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse config file, using defaults: {}", e);
                EditorConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read config file, using defaults: {}", e);
            EditorConfig::default()
        }
    }
}

/// Write settings to `path`
pub fn save_config_to(config: &EditorConfig, path: &Path) {
    match toml::to_string_pretty(config) {
        Ok(toml_str) => {
            if let Err(e) = fs::write(path, toml_str) {
                error!("Failed to write config file: {}", e);
            } else {
                info!("Settings saved to {}", path.display());
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Load settings from the platform config directory
pub fn load_config() -> EditorConfig {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => EditorConfig::default(),
    }
}

/// Save settings to the platform config directory
pub fn save_config(config: &EditorConfig) {
    if let Some(path) = get_config_path() {
        save_config_to(config, &path);
    }
}
