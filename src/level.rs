//! Log levels.

use std::fmt;
use std::str::FromStr;

/// Severity of a log line. Levels are ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    /// Verbose diagnostics.
    Debug,
    /// Regular progress information.
    #[default]
    Info,
    /// Something unexpected that does not stop the program.
    Warn,
    /// A failed operation.
    Error,
}

impl Level {
    /// All levels, least severe first.
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    /// Three-letter label printed in front of every line.
    pub fn label(self) -> &'static str {
        match self {
            Level::Debug => "DBG",
            Level::Info => "INF",
            Level::Warn => "WRN",
            Level::Error => "ERR",
        }
    }

    /// Prefix glyph used when a line does not override it.
    pub fn default_prefix(self) -> &'static str {
        match self {
            Level::Debug => "🐞",
            Level::Info => "ℹ️",
            Level::Warn => "⚠️",
            Level::Error => "❌",
        }
    }

    /// Hex color of the level label when colors are enabled.
    pub fn color(self) -> &'static str {
        match self {
            Level::Debug => "#8b8b8b",
            Level::Info => "#00afff",
            Level::Warn => "#ffaf00",
            Level::Error => "#ff5f5f",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        };
        f.write_str(name)
    }
}

/// Returned when a string does not name a [`Level`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "dbg" => Ok(Level::Debug),
            "info" | "inf" => Ok(Level::Info),
            "warn" | "warning" | "wrn" => Ok(Level::Warn),
            "error" | "err" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("WARNING".parse::<Level>(), Ok(Level::Warn));
        assert_eq!(" err ".parse::<Level>(), Ok(Level::Error));
        assert_eq!("debug".parse::<Level>(), Ok(Level::Debug));
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "loud".parse::<Level>().unwrap_err();
        assert_eq!(err.to_string(), "unknown log level \"loud\"");
    }

    #[test]
    fn labels_and_indices() {
        for (i, level) in Level::ALL.iter().enumerate() {
            assert_eq!(level.index(), i);
            assert_eq!(level.label().len(), 3);
        }
    }
}
