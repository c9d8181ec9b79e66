use bar_core::{ConfigError, ModuleError};
use bar_format::DEFAULT_FORMAT;
use bar_module::{ModuleSetup, Widget};
use bar_renderer::{Builder, Label};

const TAG_LABEL: &str = "label";

/// Displays a fixed, user-configured label.
///
/// The text is set via `label` in the module section and never changes, so
/// the module renders once and its main thread exits right after starting.
#[derive(Debug)]
pub struct TextWidget {
    label: Label,
}

impl Widget for TextWidget {
    const TYPE: &'static str = "custom/text";

    fn new(setup: &mut ModuleSetup<'_>) -> Result<Self, ModuleError> {
        setup.formats.add(DEFAULT_FORMAT, "<label>", &[TAG_LABEL], &[])?;

        let label = Label::load(setup.config, setup.section, "label", None)?.ok_or_else(|| {
            ConfigError::MissingKey {
                section: setup.section.to_string(),
                key: "label".to_string(),
            }
        })?;
        Ok(Self { label })
    }

    /// Hidden when the label text is empty.
    fn build(&self, builder: &mut dyn Builder, tag: &str) -> bool {
        if tag != TAG_LABEL || self.label.is_empty() {
            return false;
        }
        builder.node(&self.label);
        true
    }
}
