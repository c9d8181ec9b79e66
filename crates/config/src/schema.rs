use serde::{Deserialize, Serialize};

/// Typed view of the bar-wide parts of `bar.toml`.
///
/// Module sections (`[module.<name>]`) and format defaults (`[settings]`)
/// stay untyped and are read through [`crate::Config`] key lookups, because
/// the set of keys depends on the widget kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    /// Module names in display order; each must have a `[module.<name>]` table.
    pub modules: Vec<String>,
    /// Global settings shared by every module.
    pub bar: BarSection,
}

/// The `[bar]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarSection {
    /// Bar height in logical pixels.
    pub height: u32,
    /// Default text color (hex, e.g. `"#cdd6f4"`).
    pub foreground: String,
    /// Bar background color.
    pub background: String,
    /// Default color for under/overlines.
    pub line_color: String,
    /// Default under/overline thickness in pixels.
    pub line_size: u32,
    /// Font table; format `font` indices are 1-based into this list.
    pub fonts: Vec<String>,
    /// Text placed between two module outputs.
    pub separator: String,
}

impl Default for BarSection {
    fn default() -> Self {
        Self {
            height:     24,
            foreground: "#cdd6f4".to_string(), // Catppuccin Mocha: text
            background: "#1e1e2e".to_string(), // Catppuccin Mocha: base
            line_color: "#cba6f7".to_string(), // Catppuccin Mocha: mauve
            line_size:  1,
            fonts:      vec!["JetBrains Mono:size=11".to_string()],
            separator:  " | ".to_string(),
        }
    }
}
