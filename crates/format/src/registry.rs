use crate::template::FormatTemplate;
use bar_config::{Config, SETTINGS_SECTION};
use bar_core::{ConfigError, ModuleError};
use bar_renderer::Label;
use bar_theme::Color;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// All named formats of one module, validated against the tags the module
/// can build.
///
/// Filled while the module is constructed and only read afterwards, so
/// lookups need no locking.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    config:  Arc<Config>,
    section: String,
    formats: HashMap<String, Arc<FormatTemplate>>,
}

impl FormatRegistry {
    /// Registry reading from the config section `section`, e.g. `"module/clock"`.
    pub fn new(config: Arc<Config>, section: impl Into<String>) -> Self {
        Self {
            config,
            section: section.into(),
            formats: HashMap::new(),
        }
    }

    /// Register format `name`.
    ///
    /// The raw value is read from the module section (`fallback` when
    /// absent). `tags` are the tags the module declares for this format; they
    /// are the allowed set when `whitelist` is empty. A non-empty `whitelist`
    /// restricts both the declared tags and every tag in the value.
    ///
    /// Registering an existing name replaces it.
    pub fn add(
        &mut self,
        name: &str,
        fallback: &str,
        tags: &[&str],
        whitelist: &[&str],
    ) -> Result<(), ModuleError> {
        let value: String = self.config.get_or(&self.section, name, fallback.to_string())?;
        if value.trim().is_empty() {
            return Err(ModuleError::UndefinedFormat(name.to_string()));
        }

        let allowed = if whitelist.is_empty() { tags } else { whitelist };
        let mut template = FormatTemplate::parse(&value);
        let declared = tags.iter().map(|t| t.to_string());
        for tag in declared.chain(template.tags.iter().cloned()) {
            if !allowed.contains(&tag.as_str()) {
                return Err(ModuleError::UndefinedFormatTag {
                    tag,
                    format: name.to_string(),
                });
            }
        }

        self.decorate(name, &mut template)?;
        debug!(module = %self.section, format = name, value = %template.value, "registered format");

        self.formats.insert(name.to_string(), Arc::new(template));
        Ok(())
    }

    /// Read decoration attributes for format `name`.
    fn decorate(&self, name: &str, template: &mut FormatTemplate) -> Result<(), ConfigError> {
        template.foreground     = self.attr::<Color>(name, "foreground")?;
        template.background     = self.attr::<Color>(name, "background")?;
        template.underline      = self.attr::<Color>(name, "underline")?;
        template.overline       = self.attr::<Color>(name, "overline")?;
        template.underline_size = self.attr(name, "underline-size")?.unwrap_or(0);
        template.overline_size  = self.attr(name, "overline-size")?.unwrap_or(0);
        template.spacing        = self.attr(name, "spacing")?.unwrap_or(0);
        template.padding        = self.attr(name, "padding")?.unwrap_or(0);
        template.margin         = self.attr(name, "margin")?.unwrap_or(0);
        template.offset         = self.attr(name, "offset")?.unwrap_or(0);
        template.font           = self.attr(name, "font")?.unwrap_or(0);
        template.prefix = Label::load(&self.config, &self.section, &format!("{name}-prefix"), None)?;
        template.suffix = Label::load(&self.config, &self.section, &format!("{name}-suffix"), None)?;
        Ok(())
    }

    /// `<name>-<attr>` from the module section, else `format-<attr>` from
    /// `[settings]`.
    fn attr<T: DeserializeOwned>(&self, name: &str, attr: &str) -> Result<Option<T>, ConfigError> {
        let key = format!("{name}-{attr}");
        if self.config.has(&self.section, &key) {
            return self.config.get(&self.section, &key).map(Some);
        }
        self.config.get_or(SETTINGS_SECTION, &format!("format-{attr}"), None)
    }

    /// Whether format `format_name` uses `tag`.
    pub fn has_in(&self, tag: &str, format_name: &str) -> bool {
        self.formats
            .get(format_name)
            .is_some_and(|t| t.has(tag))
    }

    /// Whether any registered format uses `tag`.
    pub fn has(&self, tag: &str) -> bool {
        self.formats.values().any(|t| t.has(tag))
    }

    pub fn get(&self, format_name: &str) -> Result<Arc<FormatTemplate>, ModuleError> {
        self.formats
            .get(format_name)
            .map(Arc::clone)
            .ok_or_else(|| ModuleError::UndefinedFormat(format_name.to_string()))
    }

    /// Config section the formats are read from.
    pub fn section(&self) -> &str {
        &self.section
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_FORMAT;

    fn registry(toml: &str) -> FormatRegistry {
        FormatRegistry::new(Arc::new(toml.parse().unwrap()), "module/test")
    }

    #[test]
    fn whitelisted_tags_are_accepted() {
        let mut reg = registry("");
        reg.add(DEFAULT_FORMAT, "<label>", &["label"], &["label"]).unwrap();
        assert!(reg.has_in("label", DEFAULT_FORMAT));
        assert!(reg.has("label"));
    }

    #[test]
    fn tag_outside_whitelist_is_rejected() {
        let mut reg = registry("");
        let err = reg.add(DEFAULT_FORMAT, "<ramp>", &["ramp"], &["label"]).unwrap_err();
        assert!(matches!(err, ModuleError::UndefinedFormatTag { ref tag, .. } if tag == "ramp"));
        assert!(reg.get(DEFAULT_FORMAT).is_err());
    }

    #[test]
    fn configured_value_is_validated_against_declared_tags() {
        let mut reg = registry("[module.test]\nformat = \"<label> <bogus>\"\n");
        let err = reg.add(DEFAULT_FORMAT, "<label>", &["label"], &[]).unwrap_err();
        assert!(matches!(err, ModuleError::UndefinedFormatTag { ref tag, .. } if tag == "bogus"));
    }

    #[test]
    fn empty_value_without_fallback_is_undefined() {
        let mut reg = registry("");
        let err = reg.add("format-alt", "", &["label"], &[]).unwrap_err();
        assert!(matches!(err, ModuleError::UndefinedFormat(ref name) if name == "format-alt"));
    }

    #[test]
    fn unknown_format_is_undefined() {
        let err = registry("").get("nonexistent").unwrap_err();
        assert!(matches!(err, ModuleError::UndefinedFormat(ref name) if name == "nonexistent"));
    }

    #[test]
    fn has_queries_only_see_used_tags() {
        let mut reg = registry("[module.test]\nformat = \"<label>\"\nformat-alt = \"<ramp>\"\n");
        reg.add(DEFAULT_FORMAT, "", &["label", "ramp"], &[]).unwrap();
        reg.add("format-alt", "", &["label", "ramp"], &[]).unwrap();
        assert!(!reg.has_in("ramp", DEFAULT_FORMAT));
        assert!(reg.has_in("ramp", "format-alt"));
        assert!(!reg.has_in("label", "missing"));
        assert!(!reg.has("bar"));
    }

    #[test]
    fn decorations_come_from_module_then_settings() {
        let mut reg = registry(
            r##"
[settings]
format-spacing = 1
format-padding = 2

[module.test]
format-padding = 3
format-foreground = "#ff0000"
format-underline-size = 2
format-prefix = "["
format-prefix-foreground = "#00ff00"
"##,
        );
        reg.add(DEFAULT_FORMAT, "<label>", &["label"], &[]).unwrap();
        let t = reg.get(DEFAULT_FORMAT).unwrap();
        assert_eq!(t.spacing, 1);
        assert_eq!(t.padding, 3);
        assert_eq!(t.underline_size, 2);
        assert_eq!(t.foreground, Color::from_hex("#ff0000"));
        let prefix = t.prefix.as_ref().unwrap();
        assert_eq!(prefix.text, "[");
        assert_eq!(prefix.foreground, Color::from_hex("#00ff00"));
        assert!(t.suffix.is_none());
    }

    #[test]
    fn invalid_color_fails_registration() {
        let mut reg = registry("[module.test]\nformat-background = \"blue\"\n");
        let err = reg.add(DEFAULT_FORMAT, "<label>", &["label"], &[]).unwrap_err();
        assert!(matches!(err, ModuleError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn re_adding_overwrites() {
        let mut reg = registry("");
        reg.add(DEFAULT_FORMAT, "<label>", &["label"], &[]).unwrap();
        reg.add(DEFAULT_FORMAT, "<icon>", &["icon"], &[]).unwrap();
        assert_eq!(reg.get(DEFAULT_FORMAT).unwrap().tags, vec!["icon".to_string()]);
    }
}
