use bar_renderer::{Builder, Label};
use bar_theme::Color;

/// Name of the format every module registers.
pub const DEFAULT_FORMAT: &str = "format";

/// One piece of a parsed format value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// Tag name without the angle brackets.
    Tag(String),
}

fn is_tag_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

/// Split a raw format value into literal text and `<tag>` segments.
///
/// Anything between angle brackets that is not a valid tag name
/// (`[a-z0-9_-]+`) stays literal text.
pub fn parse(value: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut rest = value;

    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start + 1..].find('>') else {
            break;
        };
        let name = &rest[start + 1..start + 1 + len];

        if is_tag_name(name) {
            text.push_str(&rest[..start]);
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(Segment::Tag(name.to_string()));
        } else {
            text.push_str(&rest[..=start]);
            rest = &rest[start + 1..];
            continue;
        }

        rest = &rest[start + len + 2..];
    }

    text.push_str(rest);
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}

/// An immutable, parsed output template with its decorations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatTemplate {
    /// Raw value the template was parsed from.
    pub value:      String,
    pub segments:   Vec<Segment>,
    /// Tag names in template order.
    pub tags:       Vec<String>,
    pub prefix:     Option<Label>,
    pub suffix:     Option<Label>,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub underline:  Option<Color>,
    pub overline:   Option<Color>,
    /// Line thickness, `0` = bar default.
    pub underline_size: u32,
    pub overline_size:  u32,
    /// Blank characters between two successive non-empty tags.
    pub spacing:    usize,
    /// Blank characters inside the decorations, around the prefix/suffix.
    pub padding:    usize,
    /// Blank characters outside the decorations.
    pub margin:     usize,
    /// Horizontal pixel offset before the block.
    pub offset:     i32,
    /// 1-based font index, `0` = inherit.
    pub font:       usize,
}

impl FormatTemplate {
    /// Template with no decorations.
    pub fn parse(value: &str) -> Self {
        let segments = parse(value);
        let tags = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Tag(tag) => Some(tag.clone()),
                Segment::Text(_) => None,
            })
            .collect();

        Self {
            value: value.to_string(),
            segments,
            tags,
            ..Self::default()
        }
    }

    pub fn has(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Render the template: `build` is asked for the content of each tag in
    /// order and returns `false` when it has nothing to show. Skipped tags
    /// leave neither content nor spacing behind.
    pub fn render<F>(&self, builder: &mut dyn Builder, mut build: F) -> String
    where
        F: FnMut(&mut dyn Builder, &str) -> bool,
    {
        // Leftovers from an aborted render must not leak into this one.
        builder.flush();

        let mut body = String::new();
        let mut pending = String::new();
        let mut built_any = false;

        for segment in &self.segments {
            let tag = match segment {
                Segment::Text(text) => {
                    pending.push_str(text);
                    continue;
                }
                Segment::Tag(tag) => tag,
            };

            let built = build(builder, tag);
            let part = builder.flush();
            if !built || part.is_empty() {
                if pending.trim().is_empty() {
                    pending.clear();
                }
                continue;
            }

            if built_any {
                body.push_str(&pending);
                builder.space(self.spacing);
                body.push_str(&builder.flush());
            } else {
                body.push_str(pending.trim_start());
            }
            pending.clear();
            body.push_str(&part);
            built_any = true;
        }

        if !pending.trim().is_empty() {
            body.push_str(&pending);
        }

        self.decorate(builder, &body)
    }

    /// Wrap already-built `output` in this template's decorations.
    ///
    /// Empty output stays empty: a module with nothing to show contributes
    /// nothing, not even its prefix or suffix.
    pub fn decorate(&self, builder: &mut dyn Builder, output: &str) -> String {
        if output.is_empty() {
            builder.flush();
            return String::new();
        }

        builder.offset(self.offset);
        builder.space(self.margin);
        if let Some(bg) = self.background {
            builder.background(bg);
        }
        if let Some(fg) = self.foreground {
            builder.foreground(fg);
        }
        if let Some(ul) = self.underline {
            builder.underline(ul, self.underline_size);
        }
        if let Some(ol) = self.overline {
            builder.overline(ol, self.overline_size);
        }
        let font = self.font > 0 && builder.font(self.font);
        builder.space(self.padding);

        if let Some(prefix) = &self.prefix {
            builder.node(prefix);
        }
        builder.append(output);
        if let Some(suffix) = &self.suffix {
            builder.node(suffix);
        }

        builder.space(self.padding);
        if font {
            builder.font_close();
        }
        if self.overline.is_some() {
            builder.overline_close();
        }
        if self.underline.is_some() {
            builder.underline_close();
        }
        if self.foreground.is_some() {
            builder.foreground_close();
        }
        if self.background.is_some() {
            builder.background_close();
        }
        builder.space(self.margin);

        builder.flush()
    }
}
