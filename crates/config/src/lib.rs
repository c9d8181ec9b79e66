pub mod schema;
pub mod store;
pub mod watcher;

pub use schema::{BarConfig, BarSection};
pub use store::{Config, SETTINGS_SECTION};
pub use watcher::ConfigWatcher;

use bar_core::ConfigError;
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns an empty [`Config`] if the
/// file doesn't exist so the bar always starts.
pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(Config::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    raw.parse()
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("bar").join("bar.toml")
}
