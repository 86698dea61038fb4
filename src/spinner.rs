//! Spinner frame sets.
//!
//! A [`Spinner`] is only data: a list of frames and the interval between
//! them. Animations pick the frame to show from the time elapsed since they
//! started, so the spinner keeps its native speed no matter how often the
//! line is redrawn.
//!
//! # Available Spinners
//!
//! - `LINE`: Basic line spinner (|, /, -, \)
//! - `DOT`: Braille dot pattern spinner
//! - `MINI_DOT`: Smaller braille dot pattern (the default)
//! - `JUMP`: Jumping dot animation
//! - `PULSE`: Block fade animation (█, ▓, ▒, ░)
//! - `POINTS`: Three dot bounce animation
//! - `GLOBE`: Earth emoji rotation
//! - `MOON`: Moon phase animation
//! - `MONKEY`: See-no-evil monkey sequence
//! - `METER`: Progress bar style animation
//! - `HAMBURGER`: Trigram symbol animation
//! - `ELLIPSIS`: Text ellipsis animation ("", ".", "..", "...")
//!
//! ```rust
//! use clog::spinner::LINE;
//! use std::time::Duration;
//!
//! assert_eq!(LINE.frame_at(Duration::ZERO), "|");
//! assert_eq!(LINE.frame_at(Duration::from_millis(250)), "-");
//! ```

use once_cell::sync::Lazy;
use std::time::Duration;

/// Animation frames and the delay between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spinner {
    /// Animation frames to cycle through.
    pub frames: Vec<String>,
    /// Delay between frames; smaller is faster.
    pub interval: Duration,
}

impl Spinner {
    /// Creates a spinner from frames and the delay between them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use clog::spinner::Spinner;
    /// use std::time::Duration;
    ///
    /// let spinner = Spinner::new(["◐", "◓", "◑", "◒"], Duration::from_millis(200));
    /// assert_eq!(spinner.frames.len(), 4);
    /// ```
    pub fn new<I, S>(frames: I, interval: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            frames: frames.into_iter().map(Into::into).collect(),
            interval,
        }
    }

    /// Frame to show after `elapsed` has passed since the animation started.
    ///
    /// Returns an empty string for a spinner without frames.
    pub fn frame_at(&self, elapsed: Duration) -> &str {
        if self.frames.is_empty() {
            return "";
        }
        let step = self.interval.as_nanos().max(1);
        let index = (elapsed.as_nanos() / step) % self.frames.len() as u128;
        &self.frames[index as usize]
    }
}

impl Default for Spinner {
    fn default() -> Self {
        MINI_DOT.clone()
    }
}

fn frames(list: &[&str], interval_ms: u64) -> Spinner {
    Spinner::new(list.iter().copied(), Duration::from_millis(interval_ms))
}

/// Line spinner.
pub static LINE: Lazy<Spinner> = Lazy::new(|| frames(&["|", "/", "-", "\\"], 100));

/// Dot spinner.
pub static DOT: Lazy<Spinner> = Lazy::new(|| {
    frames(&["⣾ ", "⣽ ", "⣻ ", "⢿ ", "⡿ ", "⣟ ", "⣯ ", "⣷ "], 100)
});

/// Mini dot spinner.
pub static MINI_DOT: Lazy<Spinner> = Lazy::new(|| {
    frames(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"], 83)
});

/// Jump spinner.
pub static JUMP: Lazy<Spinner> =
    Lazy::new(|| frames(&["⢄", "⢂", "⢁", "⡁", "⡈", "⡐", "⡠"], 100));

/// Pulse spinner.
pub static PULSE: Lazy<Spinner> = Lazy::new(|| frames(&["█", "▓", "▒", "░"], 125));

/// Points spinner.
pub static POINTS: Lazy<Spinner> = Lazy::new(|| frames(&["∙∙∙", "●∙∙", "∙●∙", "∙∙●"], 143));

/// Globe spinner.
pub static GLOBE: Lazy<Spinner> = Lazy::new(|| frames(&["🌍", "🌎", "🌏"], 250));

/// Moon spinner.
pub static MOON: Lazy<Spinner> = Lazy::new(|| {
    frames(&["🌑", "🌒", "🌓", "🌔", "🌕", "🌖", "🌗", "🌘"], 125)
});

/// Monkey spinner.
pub static MONKEY: Lazy<Spinner> = Lazy::new(|| frames(&["🙈", "🙉", "🙊"], 333));

/// Meter spinner.
pub static METER: Lazy<Spinner> = Lazy::new(|| {
    frames(&["▱▱▱", "▰▱▱", "▰▰▱", "▰▰▰", "▰▰▱", "▰▱▱", "▱▱▱"], 143)
});

/// Hamburger spinner.
pub static HAMBURGER: Lazy<Spinner> = Lazy::new(|| frames(&["☱", "☲", "☴", "☲"], 333));

/// Ellipsis spinner.
pub static ELLIPSIS: Lazy<Spinner> = Lazy::new(|| frames(&["", ".", "..", "..."], 333));
