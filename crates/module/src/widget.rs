use bar_config::Config;
use bar_core::ModuleError;
use bar_format::{FormatRegistry, DEFAULT_FORMAT};
use bar_renderer::Builder;
use bar_theme::BarSettings;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// How the module's main thread drives [`Widget::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Update once, broadcast, and let the main thread finish.
    Static,
    /// Update, broadcast if changed, sleep; repeat while running.
    Interval(Duration),
    /// Idle for `idle`, then update only if [`Widget::has_event`] reports
    /// something; repeat while running.
    Event { idle: Duration },
}

/// Everything a widget can read while it is being constructed.
pub struct ModuleSetup<'a> {
    /// Module name without the `module/` prefix.
    pub name:    &'a str,
    /// Config section of the module, e.g. `"module/clock"`.
    pub section: &'a str,
    pub config:  &'a Config,
    pub bar:     &'a BarSettings,
    /// Formats registered here are validated immediately.
    pub formats: &'a mut FormatRegistry,
}

impl ModuleSetup<'_> {
    /// Typed lookup in the module's own section with a fallback.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> Result<T, ModuleError> {
        Ok(self.config.get_or(self.section, key, fallback)?)
    }
}

/// Widget-specific half of a module.
///
/// The generic [`crate::Module`] owns threads, locking and caching; the widget
/// only holds state, refreshes it and turns it into output. All methods are
/// called with the module's build lock held, so they never run concurrently
/// with each other.
pub trait Widget: Send + 'static {
    /// Value of the `type` key selecting this widget, e.g. `"internal/date"`.
    const TYPE: &'static str;

    /// Read configuration and register formats.
    fn new(setup: &mut ModuleSetup<'_>) -> Result<Self, ModuleError>
    where
        Self: Sized;

    /// Emit the content of `tag` into `builder`. `false` means the tag has
    /// nothing to show right now and is skipped.
    fn build(&self, builder: &mut dyn Builder, tag: &str) -> bool;

    /// Name of the format to render with.
    fn format(&self) -> &str {
        DEFAULT_FORMAT
    }

    fn schedule(&self) -> Schedule {
        Schedule::Static
    }

    /// Refresh state. Returns whether the output may have changed.
    fn update(&mut self) -> Result<bool, ModuleError> {
        Ok(true)
    }

    /// Poll for pending events; only used with [`Schedule::Event`].
    fn has_event(&mut self) -> bool {
        false
    }

    /// Handle an input action. Returns `true` when recognised; widgets
    /// without input support keep the default.
    fn input(&mut self, _action: &str, _data: &str) -> bool {
        false
    }
}
