use bar_config::Config;
use bar_core::ConfigError;
use bar_theme::Color;

/// A piece of text with its own styling, e.g. a format prefix or a widget's
/// `<label>` tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Label {
    pub text:       String,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub underline:  Option<Color>,
    pub overline:   Option<Color>,
    /// 1-based font index, `0` = inherit.
    pub font:       usize,
    /// Spaces added on both sides, inside the label's background.
    pub padding:    usize,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Read the label stored at `key` in `section` together with its
    /// `<key>-foreground`, `-background`, `-underline`, `-overline`, `-font`
    /// and `-padding` sub-keys.
    ///
    /// Returns `None` when `key` is absent and no `default` text is given.
    pub fn load(
        config: &Config,
        section: &str,
        key: &str,
        default: Option<&str>,
    ) -> Result<Option<Self>, ConfigError> {
        let text = match (config.get::<String>(section, key), default) {
            (Ok(text), _) => text,
            (Err(ConfigError::MissingKey { .. }), Some(default)) => default.to_string(),
            (Err(ConfigError::MissingKey { .. }), None) => return Ok(None),
            (Err(e), _) => return Err(e),
        };

        let color = |attr: &str| config.get_or::<Option<Color>>(section, &format!("{key}-{attr}"), None);

        Ok(Some(Self {
            text,
            foreground: color("foreground")?,
            background: color("background")?,
            underline:  color("underline")?,
            overline:   color("overline")?,
            font:       config.get_or(section, &format!("{key}-font"), 0)?,
            padding:    config.get_or(section, &format!("{key}-padding"), 0)?,
        }))
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace every occurrence of `token` (e.g. `"%time%"`) in the text.
    pub fn replace_token(&mut self, token: &str, value: &str) {
        if self.text.contains(token) {
            self.text = self.text.replace(token, value);
        }
    }

    /// Copy of the label with `token` replaced.
    #[must_use]
    pub fn with_token(&self, token: &str, value: &str) -> Self {
        let mut label = self.clone();
        label.replace_token(token, value);
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        r##"
[module.clock]
label = "%time%"
label-foreground = "#ff0000"
label-padding = 1
broken = "x"
broken-underline = "red"
"##
        .parse()
        .unwrap()
    }

    #[test]
    fn loads_label_with_attributes() {
        let label = Label::load(&config(), "module/clock", "label", None).unwrap().unwrap();
        assert_eq!(label.text, "%time%");
        assert_eq!(label.foreground, Color::from_hex("#ff0000"));
        assert_eq!(label.background, None);
        assert_eq!(label.padding, 1);
    }

    #[test]
    fn missing_label_uses_default_or_none() {
        let cfg = config();
        assert!(Label::load(&cfg, "module/clock", "label-alt", None).unwrap().is_none());
        let label = Label::load(&cfg, "module/clock", "label-alt", Some("%date%")).unwrap().unwrap();
        assert_eq!(label.text, "%date%");
    }

    #[test]
    fn invalid_color_is_rejected() {
        let err = Label::load(&config(), "module/clock", "broken", None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "broken-underline"));
    }

    #[test]
    fn tokens_are_replaced() {
        let label = Label::new("%date% %time%").with_token("%time%", "12:00");
        assert_eq!(label.text, "%date% 12:00");
    }
}
