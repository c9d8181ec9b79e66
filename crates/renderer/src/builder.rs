use crate::label::Label;
use bar_theme::{BarSettings, Color};
use std::fmt::Write as _;

/// Accumulates styled text fragments for one module.
///
/// Every `*_close` call undoes the most recent matching open call. A module
/// owns exactly one builder and only touches it while holding its build lock.
pub trait Builder: Send {
    /// Append raw text (may already contain markup from a nested fragment).
    fn append(&mut self, text: &str);

    /// Append a styled label. Empty labels emit nothing.
    fn node(&mut self, label: &Label);

    /// Append `width` blank characters.
    fn space(&mut self, width: usize);

    /// Shift the next output horizontally by `pixels`.
    fn offset(&mut self, pixels: i32);

    fn foreground(&mut self, color: Color);
    fn foreground_close(&mut self);

    fn background(&mut self, color: Color);
    fn background_close(&mut self);

    /// `size == 0` uses the bar's default line size.
    fn underline(&mut self, color: Color, size: u32);
    fn underline_close(&mut self);

    /// `size == 0` uses the bar's default line size.
    fn overline(&mut self, color: Color, size: u32);
    fn overline_close(&mut self);

    /// Switch to the 1-based font `index`. Returns `false` when the index is
    /// not available and nothing was opened; skip the matching `font_close`.
    fn font(&mut self, index: usize) -> bool;
    fn font_close(&mut self);

    fn is_empty(&self) -> bool;

    /// Take everything accumulated so far, leaving the builder empty.
    fn flush(&mut self) -> String;
}

/// [`Builder`] producing lemonbar-style inline markup:
///
/// | call | markup |
/// |---|---|
/// | `foreground` / `_close` | `%{F#rrggbb}` / `%{F-}` |
/// | `background` / `_close` | `%{B#rrggbb}` / `%{B-}` |
/// | `underline` / `_close`  | `%{u#rrggbb}%{U<size>}%{+u}` / `%{-u}` |
/// | `overline` / `_close`   | `%{o#rrggbb}%{U<size>}%{+o}` / `%{-o}` |
/// | `font` / `_close`       | `%{T<n>}` / `%{T-}` |
/// | `offset`                | `%{O<px>}` |
///
/// `%{U<size>}` is only written when the effective line size is non-zero.
#[derive(Debug, Default, Clone)]
pub struct MarkupBuilder {
    output:     String,
    line_size:  u32,
    /// Number of configured fonts, `None` = don't validate indices.
    font_count: Option<usize>,
}

impl MarkupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder that knows the bar's default line size and font table.
    pub fn for_bar(settings: &BarSettings) -> Self {
        Self {
            output:     String::new(),
            line_size:  settings.line_size,
            font_count: Some(settings.fonts.len()),
        }
    }

    fn tag(&mut self, body: std::fmt::Arguments<'_>) {
        let _ = write!(self.output, "%{{{body}}}");
    }

    fn line(&mut self, kind: char, color: Color, size: u32) {
        self.tag(format_args!("{kind}{color}"));
        let size = if size == 0 { self.line_size } else { size };
        if size > 0 {
            self.tag(format_args!("U{size}"));
        }
        self.tag(format_args!("+{kind}"));
    }

    fn font_known(&self, index: usize) -> bool {
        index >= 1 && self.font_count.map_or(true, |count| index <= count)
    }
}

impl Builder for MarkupBuilder {
    fn append(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn node(&mut self, label: &Label) {
        if label.is_empty() {
            return;
        }

        if let Some(bg) = label.background {
            self.background(bg);
        }
        if let Some(fg) = label.foreground {
            self.foreground(fg);
        }
        if let Some(ul) = label.underline {
            self.underline(ul, 0);
        }
        if let Some(ol) = label.overline {
            self.overline(ol, 0);
        }
        let font = label.font > 0 && self.font(label.font);

        self.space(label.padding);
        self.append(&label.text);
        self.space(label.padding);

        if font {
            self.font_close();
        }
        if label.overline.is_some() {
            self.overline_close();
        }
        if label.underline.is_some() {
            self.underline_close();
        }
        if label.foreground.is_some() {
            self.foreground_close();
        }
        if label.background.is_some() {
            self.background_close();
        }
    }

    fn space(&mut self, width: usize) {
        self.output.extend(std::iter::repeat(' ').take(width));
    }

    fn offset(&mut self, pixels: i32) {
        if pixels != 0 {
            self.tag(format_args!("O{pixels}"));
        }
    }

    fn foreground(&mut self, color: Color) {
        self.tag(format_args!("F{color}"));
    }

    fn foreground_close(&mut self) {
        self.output.push_str("%{F-}");
    }

    fn background(&mut self, color: Color) {
        self.tag(format_args!("B{color}"));
    }

    fn background_close(&mut self) {
        self.output.push_str("%{B-}");
    }

    fn underline(&mut self, color: Color, size: u32) {
        self.line('u', color, size);
    }

    fn underline_close(&mut self) {
        self.output.push_str("%{-u}");
    }

    fn overline(&mut self, color: Color, size: u32) {
        self.line('o', color, size);
    }

    fn overline_close(&mut self) {
        self.output.push_str("%{-o}");
    }

    fn font(&mut self, index: usize) -> bool {
        if !self.font_known(index) {
            tracing::debug!("font index {index} is not configured; ignoring");
            return false;
        }
        self.tag(format_args!("T{index}"));
        true
    }

    fn font_close(&mut self) {
        self.output.push_str("%{T-}");
    }

    fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    fn flush(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}
