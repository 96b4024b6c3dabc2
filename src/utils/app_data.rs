use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "pathdex";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_INDEX_DIR: &str = "index";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Storage directory for the index; defaults to `<app data>/index`
    #[serde(default)]
    pub index_dir: Option<PathBuf>,

    /// Default cap on search results (0 = unbounded)
    #[serde(default)]
    pub max_results: usize,

    /// Exclusion terms applied to every search
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Tags attached to every indexed file
    #[serde(default)]
    pub tags: Vec<String>,
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)?;
        serde_json::from_str(&content).map_err(|e| {
            IndexError::Config(format!(
                "failed to parse {}: {}",
                config_path.display(),
                e
            ))
        })
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| IndexError::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(config_path, content)?;
        Ok(())
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.ok_or_else(|| {
        IndexError::Config("could not determine app data directory".to_string())
    })?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Pick the storage directory: explicit override, then config, then app data
pub fn resolve_index_dir(cli_override: Option<&Path>, config: &AppConfig) -> Result<PathBuf> {
    if let Some(dir) = cli_override {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = &config.index_dir {
        return Ok(dir.clone());
    }
    Ok(get_app_data_dir()?.join(DEFAULT_INDEX_DIR))
}
