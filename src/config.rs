//! Logger configuration and environment overrides.
//!
//! | Variable           | Effect                                   |
//! |--------------------|------------------------------------------|
//! | `NO_COLOR`         | disables colors (and therefore animation) |
//! | `FORCE_COLOR`      | enables colors even without a terminal    |
//! | `CLOG_LEVEL`       | minimum level (`debug`, `info`, ...)      |
//! | `CLOG_TIME_FORMAT` | chrono format string for timestamps      |

use std::env;

use crate::format::Part;
use crate::level::Level;

/// When colors are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Colors only when the output is a terminal.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorMode {
    /// Resolves the mode against the output's terminal status.
    pub fn enabled(self, tty: bool) -> bool {
        match self {
            ColorMode::Auto => tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Initial settings of a [`Logger`](crate::Logger).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Minimum level written.
    pub level: Level,
    /// Color policy.
    pub color_mode: ColorMode,
    /// chrono format string; `None` disables timestamps.
    pub time_format: Option<String>,
    /// Layout of every line.
    pub parts: Vec<Part>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: Level::Info,
            color_mode: ColorMode::Auto,
            time_format: None,
            parts: Part::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl Config {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().apply_env(|key| env::var(key).ok())
    }

    /// Applies overrides looked up through `var`.
    ///
    /// Invalid values are ignored with a debug message.
    pub fn apply_env<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if var("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            self.color_mode = ColorMode::Never;
        } else if var("FORCE_COLOR").is_some_and(|v| !v.is_empty() && v != "0") {
            self.color_mode = ColorMode::Always;
        }

        if let Some(raw) = var("CLOG_LEVEL") {
            match raw.parse::<Level>() {
                Ok(level) => self.level = level,
                Err(err) => log::debug!("clog: ignoring CLOG_LEVEL: {err}"),
            }
        }

        if let Some(format) = var("CLOG_TIME_FORMAT").filter(|f| !f.is_empty()) {
            self.time_format = Some(format);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.color_mode, ColorMode::Auto);
        assert!(config.time_format.is_none());
        assert_eq!(config.parts.len(), 5);
    }

    #[test]
    fn no_color_wins_over_force_color() {
        let config = Config::default().apply_env(env_of(&[("NO_COLOR", "1"), ("FORCE_COLOR", "1")]));
        assert_eq!(config.color_mode, ColorMode::Never);
    }

    #[test]
    fn force_color_zero_is_ignored() {
        let config = Config::default().apply_env(env_of(&[("FORCE_COLOR", "0")]));
        assert_eq!(config.color_mode, ColorMode::Auto);
    }

    #[test]
    fn level_and_time_format() {
        let config = Config::default()
            .apply_env(env_of(&[("CLOG_LEVEL", "warn"), ("CLOG_TIME_FORMAT", "%H:%M")]));
        assert_eq!(config.level, Level::Warn);
        assert_eq!(config.time_format.as_deref(), Some("%H:%M"));
    }

    #[test]
    fn invalid_level_is_ignored() {
        let config = Config::default().apply_env(env_of(&[("CLOG_LEVEL", "shout")]));
        assert_eq!(config.level, Level::Info);
    }

    #[test]
    fn color_mode_resolution() {
        assert!(ColorMode::Auto.enabled(true));
        assert!(!ColorMode::Auto.enabled(false));
        assert!(ColorMode::Always.enabled(false));
        assert!(!ColorMode::Never.enabled(true));
    }
}
