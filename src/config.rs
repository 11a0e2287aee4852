//! Manager configuration
//!
//! Options chosen by the embedding application plus the environment-derived
//! theme search path hierarchy.

use std::env;
use std::path::{Path, PathBuf};

use crate::log::LogFn;

/// Environment variable naming the default theme
pub const THEME_ENV: &str = "HYPRCURSOR_THEME";

/// Colon-separated list of system data directories
pub const DATA_DIRS_ENV: &str = "XDG_DATA_DIRS";

/// System icon directory used when `XDG_DATA_DIRS` is unset
pub const DEFAULT_SYSTEM_ICONS: &str = "/usr/share/icons";

/// Options for creating a manager
pub struct ManagerOptions {
    /// Logging callback, installed before resolution starts
    pub log_fn: Option<LogFn>,
    /// Fall back to the first available theme when the requested one is missing
    pub allow_default_fallback: bool,
    /// Keep raw raster bytes after decoding so raw shape queries can return them
    pub keep_raw_data: bool,
    /// Directories to search; `None` derives them from the environment
    pub search_paths: Option<ThemeSearchPaths>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            log_fn: None,
            allow_default_fallback: true,
            keep_raw_data: false,
            search_paths: None,
        }
    }
}

impl ManagerOptions {
    pub fn with_logger(mut self, log_fn: LogFn) -> Self {
        self.log_fn = Some(log_fn);
        self
    }

    pub fn with_search_paths(mut self, paths: ThemeSearchPaths) -> Self {
        self.search_paths = Some(paths);
        self
    }
}

/// Ordered theme search directories: every user level before any system level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeSearchPaths {
    pub user: Vec<PathBuf>,
    pub system: Vec<PathBuf>,
}

impl ThemeSearchPaths {
    pub fn new(user: Vec<PathBuf>, system: Vec<PathBuf>) -> Self {
        Self { user, system }
    }

    /// Derive the hierarchy from the user's home and `XDG_DATA_DIRS`
    pub fn from_env() -> Self {
        let user = [
            dirs::data_dir().map(|p| p.join("icons")),
            dirs::home_dir().map(|p| p.join(".icons")),
        ]
        .into_iter()
        .flatten()
        .collect();

        let system = system_dirs(env::var(DATA_DIRS_ENV).ok().as_deref());

        Self { user, system }
    }

    /// All directories in search order
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.user.iter().chain(self.system.iter()).map(PathBuf::as_path)
    }
}

/// `<dir>/icons` for each entry of a colon-separated data dir list
pub fn system_dirs(data_dirs: Option<&str>) -> Vec<PathBuf> {
    let dirs: Vec<PathBuf> = data_dirs
        .unwrap_or("")
        .split(':')
        .filter(|entry| !entry.is_empty())
        .map(|entry| Path::new(entry).join("icons"))
        .collect();

    if dirs.is_empty() {
        vec![PathBuf::from(DEFAULT_SYSTEM_ICONS)]
    } else {
        dirs
    }
}

/// Theme name from `HYPRCURSOR_THEME`, ignoring an empty value
pub fn theme_name_from_env() -> Option<String> {
    theme_name(env::var(THEME_ENV).ok())
}

/// An unset or empty theme variable both mean "no preference"
pub fn theme_name(value: Option<String>) -> Option<String> {
    value.filter(|name| !name.is_empty())
}
