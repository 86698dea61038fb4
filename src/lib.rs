#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/clog-rs/")]

//! # clog
//!
//! Structured terminal logging with live animations: spinners, shimmering
//! and pulsing titles, progress bars and groups of concurrent tasks, each of
//! which collapses into a single ordinary log line once its task finishes.
//!
//! ## Overview
//!
//! Plain events work like any structured logger:
//!
//! ```rust,no_run
//! use clog::WithFields;
//!
//! clog::info().str("path", "/etc/hosts").int("lines", 12).msg("Parsed file");
//! ```
//!
//! An animation wraps an async task. While the task runs, one terminal line
//! is redrawn in place; when it returns, the line is replaced by a final log
//! line chosen through the result's finalizer:
//!
//! ```rust,no_run
//! use clog::{CancellationToken, WithFields};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), clog::Error> {
//! let ctx = CancellationToken::new();
//! clog::shimmer("Resolving dependencies")
//!     .elapsed("took")
//!     .wait(&ctx, |_ctx| async {
//!         tokio::time::sleep(Duration::from_secs(1)).await;
//!         Ok(())
//!     })
//!     .await
//!     .str("count", "42")
//!     .msg("Resolved dependencies")
//! # }
//! ```
//!
//! ## Terminals and pipes
//!
//! Animation needs both colors and a terminal. When either is missing, for
//! example when stderr is redirected or `NO_COLOR` is set, every animation
//! prints one static line when it starts and its final line when it ends.
//!
//! ## Components
//!
//! | Item | Description |
//! |------|-------------|
//! | [`Logger`] | Shared settings, plain events and animation builders |
//! | [`Animation`] | Spinner, shimmer, pulse or bar recipe |
//! | [`Group`] | Several animations in one block |
//! | [`ProgressUpdate`] | Live title, field and bar updates from a task |
//! | [`WaitResult`], [`SlotResult`], [`GroupResult`] | Final line and outcome |
//! | [`CancellationToken`] | Stops a render loop and signals its task |

pub mod bar;
pub mod config;
pub mod field;
pub mod format;
pub mod gradient;
pub mod level;
pub mod output;
pub mod pulse;
pub mod shimmer;
pub mod spinner;

mod animation;
mod cancel;
mod engine;
mod error;
mod frame;
mod group;
mod logger;
mod result;
mod state;
mod terminal;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::sync::Arc;

pub use animation::Animation;
pub use bar::{BarProgress, BarStyle};
pub use cancel::CancellationToken;
pub use config::{ColorMode, Config};
pub use error::{BoxError, Error};
pub use field::{Field, Value, WithFields};
pub use format::{Formatter, LineParts, Part, TextFormatter};
pub use gradient::{ColorStop, Rgb};
pub use group::{Group, Slot};
pub use level::{Level, ParseLevelError};
pub use logger::{Event, Logger};
pub use output::Output;
pub use result::{GroupResult, SlotResult, WaitResult, SUCCESS_PREFIX};
pub use shimmer::Direction;
pub use spinner::Spinner;
pub use state::ProgressUpdate;

static DEFAULT: Lazy<ArcSwap<Logger>> = Lazy::new(|| ArcSwap::from_pointee(Logger::new()));

/// The logger behind the crate-level functions.
///
/// Created on first use from [`Config::from_env`], writing to stderr.
pub fn default_logger() -> Logger {
    DEFAULT.load().as_ref().clone()
}

/// Replaces the logger behind the crate-level functions.
///
/// Animations already running keep the logger they started with.
pub fn set_default_logger(logger: Logger) {
    DEFAULT.store(Arc::new(logger));
}

/// Starts a debug event on the default logger.
pub fn debug() -> Event {
    default_logger().debug()
}

/// Starts an info event on the default logger.
pub fn info() -> Event {
    default_logger().info()
}

/// Starts a warning event on the default logger.
pub fn warn() -> Event {
    default_logger().warn()
}

/// Starts an error event on the default logger.
pub fn error() -> Event {
    default_logger().error()
}

/// Spinner animation on the default logger.
pub fn spinner(title: impl Into<String>) -> Animation {
    default_logger().spinner(title)
}

/// Shimmering title animation on the default logger.
pub fn shimmer(title: impl Into<String>) -> Animation {
    default_logger().shimmer(title)
}

/// Pulsing title animation on the default logger.
pub fn pulse(title: impl Into<String>) -> Animation {
    default_logger().pulse(title)
}

/// Progress bar animation on the default logger.
pub fn bar(title: impl Into<String>, total: u64) -> Animation {
    default_logger().bar(title, total)
}

/// Group of animations on the default logger.
pub fn group(ctx: &CancellationToken) -> Group {
    default_logger().group(ctx)
}

/// Prelude module for convenient imports.
///
/// ```rust
/// use clog::prelude::*;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
/// ```
pub mod prelude {
    pub use crate::{
        Animation, BarStyle, CancellationToken, ColorMode, Config, Direction, Error, Group,
        GroupResult, Level, Logger, ProgressUpdate, SlotResult, Spinner, WaitResult, WithFields,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SharedBuffer;
    use crate::terminal::screen;
    use std::io;
    use std::time::Duration;

    fn logger(tty: bool) -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let output = Output::new(buffer.clone()).with_tty(tty);
        (Logger::with_config(Config::default(), output), buffer)
    }

    fn quick_spinner() -> Spinner {
        Spinner::new(["+", "x"], Duration::from_millis(5))
    }

    #[tokio::test]
    async fn spinner_collapses_into_one_line() {
        let (logger, buffer) = logger(true);
        let ctx = CancellationToken::new();
        logger
            .spinner("Working")
            .spinner(quick_spinner())
            .wait(&ctx, |_ctx| async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(())
            })
            .await
            .msg("done")
            .unwrap();
        let visible = screen::replay(&buffer.bytes());
        assert_eq!(visible.len(), 1);
        assert_eq!(strip_ansi_escapes::strip_str(&visible[0]), "INF ✅ done");
        assert!(buffer.contents().contains("\x1b[2K"));
    }

    #[tokio::test]
    async fn task_error_is_preserved() {
        let (logger, _buffer) = logger(false);
        let err = logger
            .spinner("Reading")
            .wait(&CancellationToken::new(), |_ctx| async {
                Err::<(), BoxError>(Box::new(io::Error::new(io::ErrorKind::NotFound, "gone")))
            })
            .await
            .silent()
            .unwrap_err();
        assert_eq!(err.find::<io::Error>().map(io::Error::kind), Some(io::ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn cancelled_wait_returns_promptly() {
        let (logger, _buffer) = logger(true);
        let ctx = CancellationToken::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            canceller.cancel();
        });
        let started = std::time::Instant::now();
        let result = logger
            .pulse("Waiting")
            .wait(&ctx, |_ctx| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await;
        assert!(result.error().is_some_and(Error::is_cancelled));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn piped_output_gets_a_static_line() {
        let (logger, buffer) = logger(false);
        logger
            .bar("Copying", 4)
            .progress(&CancellationToken::new(), |_ctx, mut update| async move {
                for i in 1..=4 {
                    update.progress(i, 4).send();
                    tokio::time::sleep(Duration::from_millis(2)).await;
                }
                Ok(())
            })
            .await
            .send()
            .unwrap();
        let contents = buffer.contents();
        assert!(!contents.contains("\x1b[2K"));
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("INF ⏳ Copying ░"));
        assert_eq!(lines[1], "INF ✅ Copying");
    }

    #[tokio::test]
    async fn progress_updates_reach_the_final_line() {
        let (logger, buffer) = logger(false);
        logger
            .spinner("Syncing")
            .str("repo", "core")
            .progress(&CancellationToken::new(), |_ctx, mut update| async move {
                update.title("Synced").uint("files", 3).send();
                Ok(())
            })
            .await
            .err()
            .unwrap();
        let last = buffer.contents().lines().last().map(str::to_string);
        assert_eq!(last.as_deref(), Some("INF ✅ Synced repo=core files=3"));
    }

    #[test]
    fn default_logger_can_be_replaced() {
        let (logger, buffer) = logger(false);
        set_default_logger(logger);
        info().str("k", "v").msg("through default");
        assert_eq!(buffer.contents(), "INF ℹ️ through default k=v\n");
    }
}
