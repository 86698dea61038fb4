//! Structured key/value fields attached to log lines.
//!
//! Every builder, result object and event in this crate implements
//! [`WithFields`], so fields are attached the same way everywhere:
//!
//! ```rust
//! use clog::{Event, Level, Logger, WithFields};
//! use std::time::Duration;
//!
//! let logger = Logger::new();
//! let event: Event = logger
//!     .info()
//!     .str("path", "/tmp/data")
//!     .int("files", 12)
//!     .dur("took", Duration::from_millis(1500));
//! assert_eq!(event.fields().len(), 3);
//! ```

use std::fmt;
use std::time::Duration;

/// A field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain text.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point number.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// Elapsed time, rendered compactly.
    Duration(Duration),
    /// Error text.
    Error(String),
    /// List of strings.
    List(Vec<String>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) | Value::Error(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Duration(d) => f.write_str(&format_duration(*d)),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// A single `key=value` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name.
    pub key: String,
    /// Field value.
    pub value: Value,
}

impl Field {
    /// Creates a field.
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Chainable field attachment shared by builders, results and events.
///
/// Implementors only provide [`push_field`](WithFields::push_field); every
/// other method appends one field and hands `self` back, so calls chain.
/// Fields keep the order in which they were attached.
pub trait WithFields: Sized {
    /// Appends a field.
    fn push_field(&mut self, field: Field);

    /// Attaches a string field.
    fn str(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_field(Field::new(key, Value::Str(value.into())));
        self
    }

    /// Attaches a signed integer field.
    fn int(mut self, key: impl Into<String>, value: i64) -> Self {
        self.push_field(Field::new(key, Value::Int(value)));
        self
    }

    /// Attaches an unsigned integer field.
    fn uint(mut self, key: impl Into<String>, value: u64) -> Self {
        self.push_field(Field::new(key, Value::Uint(value)));
        self
    }

    /// Attaches a floating point field.
    fn float(mut self, key: impl Into<String>, value: f64) -> Self {
        self.push_field(Field::new(key, Value::Float(value)));
        self
    }

    /// Attaches a boolean field.
    fn bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.push_field(Field::new(key, Value::Bool(value)));
        self
    }

    /// Attaches a duration field.
    fn dur(mut self, key: impl Into<String>, value: Duration) -> Self {
        self.push_field(Field::new(key, Value::Duration(value)));
        self
    }

    /// Attaches an error under the `error` key.
    fn err(mut self, error: &dyn std::error::Error) -> Self {
        self.push_field(Field::new("error", Value::Error(error.to_string())));
        self
    }

    /// Attaches a list of strings.
    fn strs<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = values.into_iter().map(Into::into).collect();
        self.push_field(Field::new(key, Value::List(items)));
        self
    }

    /// Attaches any displayable value as text.
    fn any(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.push_field(Field::new(key, Value::Str(value.to_string())));
        self
    }
}

/// Replaces the value of an existing key or appends a new field.
pub(crate) fn upsert(fields: &mut Vec<Field>, field: Field) {
    match fields.iter_mut().find(|f| f.key == field.key) {
        Some(existing) => existing.value = field.value,
        None => fields.push(field),
    }
}

/// Renders a duration the way log lines show it: `850ms`, `1.2s`, `2m03s`.
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis < 1000 {
        return format!("{millis}ms");
    }
    let tenths = (millis + 50) / 100;
    if tenths < 600 {
        return format!("{}.{}s", tenths / 10, tenths % 10);
    }
    let secs = ((millis + 500) / 1000) as u64;
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}h{minutes:02}m{seconds:02}s")
    } else {
        format!("{minutes}m{seconds:02}s")
    }
}
