//! The logger handle, its display snapshot and plain log events.

use chrono::Local;
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use parking_lot::Mutex;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::Instant;

use crate::animation::{Animation, Kind};
use crate::cancel::CancellationToken;
use crate::config::{ColorMode, Config};
use crate::field::{Field, WithFields};
use crate::format::{Formatter, LineParts, Part, TextFormatter};
use crate::group::Group;
use crate::level::Level;
use crate::output::Output;

struct Settings {
    config: Config,
    prefixes: [String; 4],
    formatter: Arc<dyn Formatter>,
    output: Output,
}

/// A cheap-to-clone logging handle.
///
/// Clones share their settings. Settings changed while an animation is
/// running take effect from the next animation on, because each animation
/// works from a snapshot taken when it starts.
///
/// # Examples
///
/// ```rust
/// use clog::{Config, Logger, WithFields};
/// use clog::output::{Output, SharedBuffer};
///
/// let buffer = SharedBuffer::new();
/// let logger = Logger::with_config(Config::default(), Output::new(buffer.clone()));
/// logger.info().str("user", "ada").msg("signed in");
/// assert_eq!(buffer.contents(), "INF ℹ️ signed in user=ada\n");
/// ```
#[derive(Clone)]
pub struct Logger {
    settings: Arc<Mutex<Settings>>,
}

impl Logger {
    /// Logger writing to standard error, configured from the environment.
    pub fn new() -> Self {
        Self::with_config(Config::from_env(), Output::stderr())
    }

    /// Logger with explicit settings.
    pub fn with_config(config: Config, output: Output) -> Self {
        let prefixes = Level::ALL.map(|level| level.default_prefix().to_string());
        Self {
            settings: Arc::new(Mutex::new(Settings {
                config,
                prefixes,
                formatter: Arc::new(TextFormatter::default()),
                output,
            })),
        }
    }

    /// Sets the minimum level written.
    pub fn set_level(&self, level: Level) {
        self.settings.lock().config.level = level;
    }

    /// Current minimum level.
    pub fn level(&self) -> Level {
        self.settings.lock().config.level
    }

    /// Sets the color policy.
    pub fn set_color_mode(&self, mode: ColorMode) {
        self.settings.lock().config.color_mode = mode;
    }

    /// Sets the timestamp format, or disables timestamps with `None`.
    pub fn set_time_format(&self, format: Option<&str>) {
        self.settings.lock().config.time_format = format.map(str::to_string);
    }

    /// Sets the layout of every line.
    pub fn set_parts(&self, parts: Vec<Part>) {
        self.settings.lock().config.parts = parts;
    }

    /// Sets the prefix glyph of a level.
    pub fn set_prefix(&self, level: Level, prefix: impl Into<String>) {
        self.settings.lock().prefixes[level.index()] = prefix.into();
    }

    /// Replaces the formatter.
    pub fn set_formatter(&self, formatter: impl Formatter + 'static) {
        self.settings.lock().formatter = Arc::new(formatter);
    }

    /// Replaces the output.
    pub fn set_output(&self, output: Output) {
        self.settings.lock().output = output;
    }

    /// Captures the display settings once, under the settings lock.
    pub(crate) fn snapshot(&self) -> Snapshot {
        let settings = self.settings.lock();
        let tty = settings.output.is_tty();
        let colors = settings.config.color_mode.enabled(tty);
        Snapshot {
            level: settings.config.level,
            colors,
            animate: colors && tty,
            time_format: settings.config.time_format.clone(),
            parts: settings.config.parts.clone(),
            prefixes: settings.prefixes.clone(),
            formatter: Arc::clone(&settings.formatter),
            output: settings.output.clone(),
        }
    }

    /// Writes one line at `level`.
    pub fn log(&self, level: Level, message: &str, fields: &[Field]) {
        self.emit(level, None, message, fields);
    }

    pub(crate) fn emit(&self, level: Level, prefix: Option<&str>, message: &str, fields: &[Field]) {
        let snapshot = self.snapshot();
        if !snapshot.enabled(level) {
            return;
        }
        let prefix = prefix.unwrap_or_else(|| snapshot.prefix(level));
        let fields = snapshot.render_fields(fields);
        let line = snapshot.compose(level, prefix, message, &fields);
        snapshot.output.write_line(&line);
    }

    /// Starts a debug event.
    pub fn debug(&self) -> Event {
        Event::new(self.clone(), Level::Debug)
    }

    /// Starts an info event.
    pub fn info(&self) -> Event {
        Event::new(self.clone(), Level::Info)
    }

    /// Starts a warning event.
    pub fn warn(&self) -> Event {
        Event::new(self.clone(), Level::Warn)
    }

    /// Starts an error event.
    pub fn error(&self) -> Event {
        Event::new(self.clone(), Level::Error)
    }

    /// Spinner animation with a plain title.
    pub fn spinner(&self, title: impl Into<String>) -> Animation {
        Animation::new(self.clone(), Kind::Plain, title.into())
    }

    /// Spinner animation whose title shimmers.
    pub fn shimmer(&self, title: impl Into<String>) -> Animation {
        Animation::new(self.clone(), Kind::shimmer(), title.into())
    }

    /// Spinner animation whose title pulses.
    pub fn pulse(&self, title: impl Into<String>) -> Animation {
        Animation::new(self.clone(), Kind::pulse(), title.into())
    }

    /// Progress bar animation over `total` units.
    pub fn bar(&self, title: impl Into<String>, total: u64) -> Animation {
        Animation::new(self.clone(), Kind::Plain, title.into()).with_bar(total)
    }

    /// Group of animations rendered as one block.
    pub fn group(&self, ctx: &CancellationToken) -> Group {
        Group::new(self.clone(), ctx.clone())
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.settings.lock();
        f.debug_struct("Logger")
            .field("config", &settings.config)
            .field("output", &settings.output)
            .finish()
    }
}

/// Display settings frozen for the lifetime of one line or animation.
#[derive(Clone)]
pub(crate) struct Snapshot {
    pub(crate) level: Level,
    pub(crate) colors: bool,
    pub(crate) animate: bool,
    time_format: Option<String>,
    parts: Vec<Part>,
    prefixes: [String; 4],
    formatter: Arc<dyn Formatter>,
    pub(crate) output: Output,
}

impl Snapshot {
    pub(crate) fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    pub(crate) fn prefix(&self, level: Level) -> &str {
        &self.prefixes[level.index()]
    }

    pub(crate) fn render_fields(&self, fields: &[Field]) -> String {
        if fields.is_empty() {
            return String::new();
        }
        self.formatter.render_fields(fields, self.colors)
    }

    fn timestamp(&self) -> String {
        let Some(format) = self.time_format.as_deref() else {
            return String::new();
        };
        let mut out = String::new();
        // chrono reports malformed format strings as a fmt error.
        if write!(out, "{}", Local::now().format(format)).is_err() {
            log::debug!("clog: invalid time format {format:?}");
            out.clear();
        }
        out
    }

    fn label(&self, level: Level) -> String {
        if self.colors {
            Style::new()
                .foreground(lipgloss::Color::from(level.color()))
                .render(level.label())
        } else {
            level.label().to_string()
        }
    }

    /// Lays out one complete line.
    pub(crate) fn compose(&self, level: Level, prefix: &str, message: &str, fields: &str) -> String {
        let timestamp = self.timestamp();
        let label = self.label(level);
        let plain;
        let message = if self.colors {
            message
        } else {
            plain = strip_ansi_escapes::strip_str(message);
            plain.as_str()
        };
        let parts = LineParts {
            timestamp: &timestamp,
            level: &label,
            prefix,
            message,
            fields,
        };
        self.formatter.render_line(&self.parts, &parts)
    }
}

/// A plain log line under construction.
#[derive(Debug)]
pub struct Event {
    logger: Logger,
    level: Level,
    prefix: Option<String>,
    fields: Vec<Field>,
}

impl Event {
    fn new(logger: Logger, level: Level) -> Self {
        Self {
            logger,
            level,
            prefix: None,
            fields: Vec::new(),
        }
    }

    /// Overrides the prefix glyph.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Fields attached so far.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Attaches the elapsed time since `start` under `key`.
    pub fn since(self, key: impl Into<String>, start: Instant) -> Self {
        self.dur(key, start.elapsed())
    }

    /// Writes the line with `message`.
    pub fn msg(self, message: impl AsRef<str>) {
        self.logger
            .emit(self.level, self.prefix.as_deref(), message.as_ref(), &self.fields);
    }

    /// Writes the line without a message.
    pub fn send(self) {
        self.msg("");
    }
}

impl WithFields for Event {
    fn push_field(&mut self, field: Field) {
        self.fields.push(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SharedBuffer;

    fn logger() -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let logger = Logger::with_config(Config::default(), Output::new(buffer.clone()));
        (logger, buffer)
    }

    #[test]
    fn info_line_layout() {
        let (logger, buffer) = logger();
        logger.info().int("n", 2).msg("hello");
        assert_eq!(buffer.contents(), "INF ℹ️ hello n=2\n");
    }

    #[test]
    fn below_minimum_level_is_dropped() {
        let (logger, buffer) = logger();
        logger.debug().msg("hidden");
        logger.set_level(Level::Debug);
        logger.debug().msg("shown");
        assert_eq!(buffer.contents(), "DBG 🐞 shown\n");
    }

    #[test]
    fn prefix_override_and_custom_prefix() {
        let (logger, buffer) = logger();
        logger.warn().prefix("!").msg("careful");
        logger.set_prefix(Level::Error, "E");
        logger.error().msg("broken");
        assert_eq!(buffer.contents(), "WRN ! careful\nERR E broken\n");
    }

    #[test]
    fn custom_parts() {
        let (logger, buffer) = logger();
        logger.set_parts(vec![Part::Message, Part::Level]);
        logger.info().str("ignored", "x").msg("only");
        assert_eq!(buffer.contents(), "only INF\n");
    }

    #[test]
    fn send_without_message() {
        let (logger, buffer) = logger();
        logger.info().str("k", "v").send();
        assert_eq!(buffer.contents(), "INF ℹ️ k=v\n");
    }

    #[test]
    fn timestamps_use_the_time_format() {
        let (logger, buffer) = logger();
        logger.set_time_format(Some("[ts]"));
        logger.info().msg("x");
        assert_eq!(buffer.contents(), "[ts] INF ℹ️ x\n");
    }

    #[test]
    fn ansi_is_stripped_without_colors() {
        let (logger, buffer) = logger();
        logger.info().msg("\x1b[31mred\x1b[0m");
        assert_eq!(buffer.contents(), "INF ℹ️ red\n");
    }

    #[test]
    fn snapshot_resolves_colors_and_animation() {
        let buffer = SharedBuffer::new();
        let logger = Logger::with_config(Config::default(), Output::new(buffer.clone()));
        let snapshot = logger.snapshot();
        assert!(!snapshot.colors);
        assert!(!snapshot.animate);

        logger.set_output(Output::new(buffer).with_tty(true));
        let snapshot = logger.snapshot();
        assert!(snapshot.colors);
        assert!(snapshot.animate);

        logger.set_color_mode(ColorMode::Never);
        assert!(!logger.snapshot().animate);
    }
}
