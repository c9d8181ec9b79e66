use bar_config::Config;
use bar_core::{ConfigError, ModuleError};
use bar_format::DEFAULT_FORMAT;
use bar_module::{ModuleSetup, Schedule, Widget};
use bar_renderer::{Builder, Label};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::time::Duration;

const TAG_LABEL: &str = "label";

/// Displays the current time and date.
///
/// Keys in `[module.<name>]`:
///
/// | key | default | |
/// |---|---|---|
/// | `interval` | `1` | seconds between refreshes |
/// | `date` / `time` | `%Y-%m-%d` / `%H:%M:%S` | `strftime` formats |
/// | `date-alt` / `time-alt` | same as above | shown after a `toggle` action |
/// | `label` | `%date% %time%` | label with `%date%` and `%time%` tokens |
#[derive(Debug)]
pub struct ClockWidget {
    interval: Duration,
    formats:  [String; 2],
    alt:      [String; 2],
    label:    Label,
    toggled:  bool,
    date:     String,
    time:     String,
}

/// Reject strings chrono can't format; rendering them would panic later.
fn strftime(config: &Config, section: &str, key: &str, fallback: &str) -> Result<String, ConfigError> {
    let fmt: String = config.get_or(section, key, fallback.to_string())?;
    if StrftimeItems::new(&fmt).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("'{fmt}' is not a valid strftime format"),
        });
    }
    Ok(fmt)
}

impl ClockWidget {
    fn active(&self) -> &[String; 2] {
        if self.toggled {
            &self.alt
        } else {
            &self.formats
        }
    }

    /// Format `now`; returns whether the visible text changed.
    fn refresh(&mut self, now: DateTime<Local>) -> bool {
        let [date_fmt, time_fmt] = self.active();
        let date = now.format(date_fmt).to_string();
        let time = now.format(time_fmt).to_string();
        if date == self.date && time == self.time {
            return false;
        }
        self.date = date;
        self.time = time;
        true
    }
}

impl Widget for ClockWidget {
    const TYPE: &'static str = "internal/date";

    fn new(setup: &mut ModuleSetup<'_>) -> Result<Self, ModuleError> {
        let (config, section) = (setup.config, setup.section);
        setup.formats.add(DEFAULT_FORMAT, "<label>", &[TAG_LABEL], &[])?;

        let date = strftime(config, section, "date", "%Y-%m-%d")?;
        let time = strftime(config, section, "time", "%H:%M:%S")?;
        let date_alt = strftime(config, section, "date-alt", &date)?;
        let time_alt = strftime(config, section, "time-alt", &time)?;

        let label = Label::load(config, section, "label", Some("%date% %time%"))?
            .unwrap_or_default();

        Ok(Self {
            interval: Duration::from_secs(setup.get_or::<u64>("interval", 1)?.max(1)),
            formats:  [date, time],
            alt:      [date_alt, time_alt],
            label,
            toggled:  false,
            date:     String::new(),
            time:     String::new(),
        })
    }

    fn build(&self, builder: &mut dyn Builder, tag: &str) -> bool {
        if tag != TAG_LABEL {
            return false;
        }
        let label = self
            .label
            .with_token("%date%", &self.date)
            .with_token("%time%", &self.time);
        builder.node(&label);
        true
    }

    fn schedule(&self) -> Schedule {
        Schedule::Interval(self.interval)
    }

    fn update(&mut self) -> Result<bool, ModuleError> {
        Ok(self.refresh(Local::now()))
    }

    fn input(&mut self, action: &str, _data: &str) -> bool {
        if action != "toggle" {
            return false;
        }
        self.toggled = !self.toggled;
        self.refresh(Local::now());
        true
    }
}
