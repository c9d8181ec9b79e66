use crate::schema::BarConfig;
use bar_core::ConfigError;
use serde::de::DeserializeOwned;
use std::str::FromStr;

/// Section holding format defaults shared by all modules.
pub const SETTINGS_SECTION: &str = "settings";

/// Read-only key/value view over a parsed `bar.toml`.
///
/// Sections are addressed by slash-separated paths: `"bar"`, `"settings"`,
/// or `"module/clock"` for the `[module.clock]` table.
#[derive(Debug, Clone, Default)]
pub struct Config {
    root: toml::Table,
}

impl Config {
    pub fn from_table(root: toml::Table) -> Self {
        Self { root }
    }

    /// Typed view of the bar-wide settings and module order.
    pub fn bar_config(&self) -> Result<BarConfig, ConfigError> {
        toml::Value::Table(self.root.clone())
            .try_into()
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn section(&self, section: &str) -> Option<&toml::Table> {
        let mut table = &self.root;
        for part in section.split('/') {
            table = table.get(part)?.as_table()?;
        }
        Some(table)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.section(section).is_some()
    }

    pub fn has(&self, section: &str, key: &str) -> bool {
        self.section(section).is_some_and(|t| t.contains_key(key))
    }

    /// Look up a required key.
    pub fn get<T: DeserializeOwned>(&self, section: &str, key: &str) -> Result<T, ConfigError> {
        let value = self
            .section(section)
            .and_then(|t| t.get(key))
            .ok_or_else(|| ConfigError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            })?;

        value.clone().try_into().map_err(|e: toml::de::Error| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// Look up an optional key. A missing key yields `fallback`; a present key
    /// with the wrong type is still an error.
    pub fn get_or<T: DeserializeOwned>(
        &self,
        section: &str,
        key: &str,
        fallback: T,
    ) -> Result<T, ConfigError> {
        match self.get(section, key) {
            Err(ConfigError::MissingKey { .. }) => Ok(fallback),
            other => other,
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        toml::from_str(raw)
            .map(Self::from_table)
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
