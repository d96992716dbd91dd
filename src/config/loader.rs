use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "lazytable";
const CONFIG_FILE: &str = "config.toml";

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load the configuration from `path`, or from the platform config directory
/// when no path is given. A missing default file yields the defaults; a
/// missing explicit file is an error.
pub fn load(path: Option<&Path>) -> color_eyre::Result<AppConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let Some(p) = config_path() else {
                debug!("No config directory found, using defaults");
                return Ok(AppConfig::default());
            };
            if !p.exists() {
                debug!(path = %p.display(), "Config file not found, using defaults");
                return Ok(AppConfig::default());
            }
            p
        }
    };

    let content = fs::read_to_string(&path)
        .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file {}", path.display()))?;
    config.validate()?;
    debug!(path = %path.display(), "Loaded config");
    Ok(config)
}
