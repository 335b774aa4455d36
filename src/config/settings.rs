//! Application settings and paths.
//!
//! Settings live in an XDG-compliant config directory as JSON. A missing
//! file means defaults.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portsweep)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Get the global paths instance, discovering it on first use.
    pub fn get() -> ConfigResult<&'static Paths> {
        if let Some(paths) = PATHS.get() {
            return Ok(paths);
        }
        let paths = Self::discover()?;
        Ok(PATHS.get_or_init(|| paths))
    }

    fn discover() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "portsweep", "portsweep")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// User-tunable defaults for the `scan` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Number of concurrent workers.
    pub default_concurrency: usize,
    /// Connect timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Port selection used when none is given.
    pub default_ports: String,
    /// Write a CSV file unless told otherwise.
    pub save_csv: bool,
    /// Where the CSV file goes.
    pub csv_path: PathBuf,
    /// Print closed ports on the console.
    pub show_closed: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_concurrency: DEFAULT_CONCURRENCY,
            default_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            default_ports: "common".to_string(),
            save_csv: true,
            csv_path: PathBuf::from("scan_results.csv"),
            show_closed: true,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::get()?.settings_file();
        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Paths::get()?.settings_file())
    }

    /// Save settings to a specific file, creating its directory.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let write_failed = |e: std::io::Error| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(write_failed)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(write_failed)
    }
}
