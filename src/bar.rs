//! Progress bars rendered inline with an animation's title.
//!
//! ```rust
//! use clog::bar::{BarProgress, BarStyle};
//!
//! let style = BarStyle::default().width(10);
//! let progress = BarProgress::new(3, 4);
//! assert_eq!(style.render(progress.fraction(), None), "████████░░  75%");
//! ```

use lipgloss_extras::prelude::*;

use crate::gradient::{self, ColorStop, GradientLut, Rgb};

/// Completed and total work units of a bar animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BarProgress {
    /// Completed units.
    pub current: u64,
    /// Total units.
    pub total: u64,
}

impl BarProgress {
    /// Creates a progress value.
    pub fn new(current: u64, total: u64) -> Self {
        Self { current, total }
    }

    /// Completed share in `[0, 1]`. A zero total counts as no progress.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current as f64 / self.total as f64).clamp(0.0, 1.0)
    }
}

/// Visual configuration of a progress bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarStyle {
    /// Number of cells.
    pub width: usize,
    /// Character for filled cells.
    pub full: char,
    /// Character for empty cells.
    pub empty: char,
    /// Gradient applied across the filled cells.
    pub gradient: Vec<ColorStop>,
    /// Color of empty cells.
    pub empty_color: Rgb,
    /// Whether a percentage follows the bar.
    pub show_percent: bool,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            width: 20,
            full: '█',
            empty: '░',
            gradient: gradient::default_pulse(),
            empty_color: Rgb::new(0x60, 0x60, 0x60),
            show_percent: true,
        }
    }
}

impl BarStyle {
    /// Sets the number of cells.
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the fill characters.
    pub fn chars(mut self, full: char, empty: char) -> Self {
        self.full = full;
        self.empty = empty;
        self
    }

    /// Sets the fill gradient.
    pub fn gradient(mut self, stops: Vec<ColorStop>) -> Self {
        self.gradient = stops;
        self
    }

    /// Hides the trailing percentage.
    pub fn without_percent(mut self) -> Self {
        self.show_percent = false;
        self
    }

    /// Renders the bar at `fraction`.
    ///
    /// With a lookup table every filled cell takes the color at its position
    /// along the bar; without one the bar is plain text.
    pub fn render(&self, fraction: f64, lut: Option<&GradientLut>) -> String {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let filled = ((self.width as f64) * fraction).round() as usize;
        let filled = filled.min(self.width);
        let mut out = String::new();

        match lut {
            Some(lut) => {
                for (index, cells) in self.fill_runs(filled) {
                    let run: String = std::iter::repeat(self.full).take(cells).collect();
                    out.push_str(&lut.style(index).render(&run));
                }
                let empty = self.empty.to_string().repeat(self.width - filled);
                if !empty.is_empty() {
                    let style = Style::new().foreground(self.empty_color.to_lipgloss());
                    out.push_str(&style.render(&empty));
                }
            }
            None => {
                out.extend(std::iter::repeat(self.full).take(filled));
                out.extend(std::iter::repeat(self.empty).take(self.width - filled));
            }
        }

        if self.show_percent {
            out.push_str(&format!(" {:3.0}%", fraction * 100.0));
        }
        out
    }
}

impl BarStyle {
    /// LUT index and length of each run of equally colored filled cells.
    fn fill_runs(&self, filled: usize) -> Vec<(usize, usize)> {
        let span = self.width.saturating_sub(1).max(1) as f64;
        let mut runs: Vec<(usize, usize)> = Vec::new();
        for i in 0..filled {
            let index = GradientLut::index(i as f64 / span);
            match runs.last_mut() {
                Some((last, cells)) if *last == index => *cells += 1,
                _ => runs.push((index, 1)),
            }
        }
        runs
    }
}
