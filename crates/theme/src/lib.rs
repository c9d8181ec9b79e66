pub mod colors;

pub use colors::Color;

use bar_config::{BarSection, Config};
use bar_core::ConfigError;

/// Immutable bar-wide settings handed to every module at construction.
///
/// All colors are pre-parsed from hex strings. Calling
/// [`BarSettings::from_section`] is infallible; invalid color strings fall
/// back to safe defaults.
#[derive(Debug, Clone)]
pub struct BarSettings {
    pub height:     u32,
    pub foreground: Color,
    pub background: Color,
    /// Default under/overline color when a format names none.
    pub line_color: Color,
    /// Default under/overline thickness.
    pub line_size:  u32,
    /// Font table; format font indices are 1-based into this list.
    pub fonts:      Vec<String>,
    /// Text the host places between module outputs.
    pub separator:  String,
}

impl BarSettings {
    /// Build a [`BarSettings`] from the config file's `[bar]` section.
    pub fn from_section(cfg: &BarSection) -> Self {
        Self {
            height:     cfg.height,
            foreground: Color::from_hex(&cfg.foreground).unwrap_or(Color::WHITE),
            background: Color::from_hex(&cfg.background).unwrap_or(Color::DARK),
            line_color: Color::from_hex(&cfg.line_color).unwrap_or(Color::PURPLE),
            line_size:  cfg.line_size,
            fonts:      cfg.fonts.clone(),
            separator:  cfg.separator.clone(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::from_section(&config.bar_config()?.bar))
    }
}

impl Default for BarSettings {
    fn default() -> Self {
        Self::from_section(&BarSection::default())
    }
}
