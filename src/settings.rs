use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};
use thiserror::Error;

use crate::window::{
    DEFAULT_CACHE_PAGES, DEFAULT_PAGE_SPACING, DEFAULT_VIEWER_WIDTH, DEFAULT_WINDOW_SIZE,
    ViewerConfig, Zoom,
};

pub const CURRENT_VERSION: u32 = 1;
pub const CONFIG_ENV_VAR: &str = "PAGEWINDOW_CONFIG";
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "pagewindow";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Pages kept rendered around the current one
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    #[serde(default = "default_page_spacing")]
    pub page_spacing: f64,

    #[serde(default = "default_viewer_width")]
    pub viewer_width: f64,

    #[serde(default = "default_min_scale")]
    pub min_scale: f64,

    #[serde(default = "default_max_scale")]
    pub max_scale: f64,

    #[serde(default = "default_scale_step")]
    pub scale_step: f64,

    /// Rendered pages kept in the LRU cache, 0 disables caching
    #[serde(default = "default_render_cache_pages")]
    pub render_cache_pages: usize,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_page_spacing() -> f64 {
    DEFAULT_PAGE_SPACING
}

fn default_viewer_width() -> f64 {
    DEFAULT_VIEWER_WIDTH
}

fn default_min_scale() -> f64 {
    Zoom::MIN_SCALE
}

fn default_max_scale() -> f64 {
    Zoom::MAX_SCALE
}

fn default_scale_step() -> f64 {
    Zoom::STEP
}

fn default_render_cache_pages() -> usize {
    DEFAULT_CACHE_PAGES
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            window_size: default_window_size(),
            page_spacing: default_page_spacing(),
            viewer_width: default_viewer_width(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            scale_step: default_scale_step(),
            render_cache_pages: default_render_cache_pages(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Replace values that would produce a broken viewer with defaults
    pub fn validate(&mut self) {
        if self.window_size == 0 {
            warn!("window_size must be at least 1, using {DEFAULT_WINDOW_SIZE}");
            self.window_size = DEFAULT_WINDOW_SIZE;
        }
        if !self.page_spacing.is_finite() || self.page_spacing < 0.0 {
            warn!("invalid page_spacing {}, using default", self.page_spacing);
            self.page_spacing = DEFAULT_PAGE_SPACING;
        }
        if !self.viewer_width.is_finite() || self.viewer_width <= 0.0 {
            warn!("invalid viewer_width {}, using default", self.viewer_width);
            self.viewer_width = DEFAULT_VIEWER_WIDTH;
        }
        let scales_ok = self.min_scale.is_finite()
            && self.max_scale.is_finite()
            && self.min_scale > 0.0
            && self.min_scale <= self.max_scale;
        if !scales_ok {
            warn!(
                "invalid scale range {}..{}, using defaults",
                self.min_scale, self.max_scale
            );
            self.min_scale = Zoom::MIN_SCALE;
            self.max_scale = Zoom::MAX_SCALE;
        }
        if !self.scale_step.is_finite() || self.scale_step <= 0.0 {
            warn!("invalid scale_step {}, using default", self.scale_step);
            self.scale_step = Zoom::STEP;
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or_else(|_| {
            warn!("unknown log level {:?}, using info", self.log_level);
            log::LevelFilter::Info
        })
    }
}

impl From<&Settings> for ViewerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            window_size: settings.window_size,
            page_spacing: settings.page_spacing,
            viewer_width: settings.viewer_width,
            min_scale: settings.min_scale,
            max_scale: settings.max_scale,
            scale_step: settings.scale_step,
            render_cache_pages: settings.render_cache_pages,
        }
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Resolve where settings live: explicit path, then the environment, then
/// the platform config directory
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    preferred_config_path()
}

/// Load settings into the global slot.
///
/// A missing file is created with defaults; an unreadable one is logged and
/// the defaults stay in place.
pub fn load_settings(explicit: Option<&Path>) {
    let Some(path) = config_path(explicit) else {
        warn!("Could not determine config directory, using default settings");
        return;
    };

    if !path.exists() {
        info!("Settings file not found, creating with defaults at {path:?}");
        let settings = get_settings();
        if let Err(e) = save_settings_to_file(&settings, &path) {
            error!("{e}");
        }
        return;
    }

    match read_settings_file(&path) {
        Ok(settings) => {
            if let Ok(mut global) = SETTINGS.write() {
                *global = settings;
            }
        }
        Err(e) => error!("{e}"),
    }
}

/// Parse, migrate and validate a settings file
pub fn read_settings_file(path: &Path) -> Result<Settings, SettingsError> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut settings =
        serde_yaml::from_str::<Settings>(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded settings from {path:?}");

    if settings.version < CURRENT_VERSION {
        migrate_settings(&mut settings);
        if let Err(e) = save_settings_to_file(&settings, path) {
            warn!("Could not persist migrated settings: {e}");
        }
    }
    settings.validate();
    Ok(settings)
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // Version 0 files predate the render cache and had it disabled
    if settings.version < 1 {
        settings.render_cache_pages = 0;
    }

    settings.version = CURRENT_VERSION;
}

pub fn save_settings_to_file(settings: &Settings, path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    fs::write(path, generate_settings_yaml(settings)).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Saved settings to {path:?}");
    Ok(())
}

fn generate_settings_yaml(settings: &Settings) -> String {
    let mut content = String::new();

    content.push_str(&format!("version: {}\n", settings.version));
    content.push('\n');
    content.push_str("# Pages kept rendered around the current page\n");
    content.push_str(&format!("window_size: {}\n", settings.window_size));
    content.push_str(&format!("page_spacing: {:?}\n", settings.page_spacing));
    content.push_str(&format!("viewer_width: {:?}\n", settings.viewer_width));
    content.push('\n');
    content.push_str("# Zoom limits and step for zoom in/out\n");
    content.push_str(&format!("min_scale: {:?}\n", settings.min_scale));
    content.push_str(&format!("max_scale: {:?}\n", settings.max_scale));
    content.push_str(&format!("scale_step: {:?}\n", settings.scale_step));
    content.push('\n');
    content.push_str("# Rendered pages kept in memory, 0 disables the cache\n");
    content.push_str(&format!(
        "render_cache_pages: {}\n",
        settings.render_cache_pages
    ));
    content.push_str("# off, error, warn, info, debug or trace\n");
    content.push_str(&format!("log_level: \"{}\"\n", settings.log_level));

    content
}

// Public API for accessing settings

pub fn get_settings() -> Settings {
    SETTINGS.read().map(|s| s.clone()).unwrap_or_default()
}

pub fn set_settings(settings: Settings) {
    if let Ok(mut global) = SETTINGS.write() {
        *global = settings;
    }
}

pub fn viewer_config() -> ViewerConfig {
    ViewerConfig::from(&get_settings())
}
