use serde::Deserialize;
use std::fmt;

/// 8-bit RGBA colour as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const DARK:   Self = Self { r: 0x1e, g: 0x1e, b: 0x2e, a: 0xff }; // #1e1e2e
    pub const WHITE:  Self = Self { r: 0xcd, g: 0xd6, b: 0xf4, a: 0xff }; // #cdd6f4
    pub const PURPLE: Self = Self { r: 0xcb, g: 0xa6, b: 0xf7, a: 0xff }; // #cba6f7

    /// Parse a CSS-style hex color string: `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        // `from_str_radix` alone would also take a leading `+`.
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let byte = |s: &str| -> Option<u8> { u8::from_str_radix(s, 16).ok() };
        // `f` → `ff`
        let nibble = |s: &str| -> Option<u8> { byte(s).map(|v| v * 17) };

        match hex.len() {
            3 => Some(Self {
                r: nibble(&hex[0..1])?,
                g: nibble(&hex[1..2])?,
                b: nibble(&hex[2..3])?,
                a: 0xff,
            }),
            6 => Some(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: 0xff,
            }),
            8 => Some(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: byte(&hex[6..8])?,
            }),
            _ => None,
        }
    }

}

/// Formats as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("'{value}' is not a hex color"))
    }
}
