//! Line layout and field rendering.
//!
//! The animation engine does not know how individual parts of a line are
//! styled. It hands already-rendered parts to a [`Formatter`], which decides
//! their order and how fields look. [`TextFormatter`] is the default.

use lipgloss_extras::prelude::*;

use crate::field::{Field, Value};
use crate::gradient::Rgb;

/// A slot in the layout of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    /// Wall clock time, when a time format is configured.
    Timestamp,
    /// Level label such as `INF`.
    Level,
    /// Prefix glyph, or the spinner frame while animating.
    Prefix,
    /// Message or animation title.
    Message,
    /// Rendered fields.
    Fields,
}

impl Part {
    /// Default layout.
    pub const DEFAULT_ORDER: [Part; 5] = [
        Part::Timestamp,
        Part::Level,
        Part::Prefix,
        Part::Message,
        Part::Fields,
    ];
}

/// Rendered parts of one line. Empty parts are skipped by the layout.
#[derive(Debug, Clone, Default)]
pub struct LineParts<'a> {
    /// Timestamp text.
    pub timestamp: &'a str,
    /// Level label.
    pub level: &'a str,
    /// Prefix glyph.
    pub prefix: &'a str,
    /// Message text.
    pub message: &'a str,
    /// Output of [`Formatter::render_fields`].
    pub fields: &'a str,
}

impl<'a> LineParts<'a> {
    /// Text of a single part.
    pub fn get(&self, part: Part) -> &'a str {
        match part {
            Part::Timestamp => self.timestamp,
            Part::Level => self.level,
            Part::Prefix => self.prefix,
            Part::Message => self.message,
            Part::Fields => self.fields,
        }
    }
}

/// Turns line parts and fields into text.
pub trait Formatter: Send + Sync {
    /// Lays out `parts` in `order`.
    fn render_line(&self, order: &[Part], parts: &LineParts<'_>) -> String;

    /// Renders a list of fields. `colors` tells whether styling is allowed.
    fn render_fields(&self, fields: &[Field], colors: bool) -> String;
}

/// `key=value` formatter joining parts with single spaces.
#[derive(Debug, Clone)]
pub struct TextFormatter {
    key_color: Rgb,
    error_color: Rgb,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            key_color: Rgb::new(0x8b, 0x8b, 0x8b),
            error_color: Rgb::new(0xff, 0x5f, 0x5f),
        }
    }
}

fn quote(value: &str) -> String {
    if value.is_empty() || value.contains(|c: char| c.is_whitespace() || c == '=' || c == '"') {
        format!("{value:?}")
    } else {
        value.to_string()
    }
}

impl Formatter for TextFormatter {
    fn render_line(&self, order: &[Part], parts: &LineParts<'_>) -> String {
        order
            .iter()
            .map(|&part| parts.get(part))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn render_fields(&self, fields: &[Field], colors: bool) -> String {
        let key_style = Style::new().foreground(self.key_color.to_lipgloss());
        let error_style = Style::new().foreground(self.error_color.to_lipgloss());

        fields
            .iter()
            .map(|field| {
                let value = quote(&field.value.to_string());
                if !colors {
                    return format!("{}={}", field.key, value);
                }
                let key = key_style.render(&format!("{}=", field.key));
                match field.value {
                    Value::Error(_) => format!("{key}{}", error_style.render(&value)),
                    _ => format!("{key}{value}"),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parts_are_skipped() {
        let parts = LineParts {
            level: "INF",
            message: "hello",
            ..Default::default()
        };
        let line = TextFormatter::default().render_line(&Part::DEFAULT_ORDER, &parts);
        assert_eq!(line, "INF hello");
    }

    #[test]
    fn order_is_respected() {
        let parts = LineParts {
            level: "INF",
            prefix: ">",
            message: "m",
            fields: "a=1",
            ..Default::default()
        };
        let order = [Part::Message, Part::Fields, Part::Level];
        let line = TextFormatter::default().render_line(&order, &parts);
        assert_eq!(line, "m a=1 INF");
    }

    #[test]
    fn plain_fields_quote_when_needed() {
        let fields = vec![
            Field::new("path", Value::Str("/tmp/x".into())),
            Field::new("msg", Value::Str("two words".into())),
            Field::new("n", Value::Int(3)),
            Field::new("empty", Value::Str(String::new())),
        ];
        let out = TextFormatter::default().render_fields(&fields, false);
        assert_eq!(out, "path=/tmp/x msg=\"two words\" n=3 empty=\"\"");
    }

    #[test]
    fn colored_fields_keep_text() {
        let fields = vec![Field::new("error", Value::Error("boom".into()))];
        let out = TextFormatter::default().render_fields(&fields, true);
        assert_eq!(strip_ansi_escapes::strip_str(&out), "error=boom");
    }
}
