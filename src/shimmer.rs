//! Shimmer: a color wave travelling across the text.
//!
//! Every character gets its own phase offset derived from its position in the
//! string, so the gradient appears to sweep through the text. Adjacent
//! characters that land on the same table entry are rendered as one styled
//! run, which keeps the number of style calls close to the number of visible
//! colors instead of the number of characters.

use std::ops::Range;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

use crate::gradient::GradientLut;

/// Direction in which the shimmer wave moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Left to right.
    #[default]
    Right,
    /// Right to left.
    Left,
    /// From both edges towards the center.
    MiddleIn,
    /// From the center towards both edges.
    MiddleOut,
    /// Like `MiddleIn`, but sweeping back and forth.
    BounceIn,
    /// Like `MiddleOut`, but sweeping back and forth.
    BounceOut,
}

/// Phase of a shimmer running at `speed` cycles per second.
pub fn shimmer_phase(elapsed: Duration, speed: f64) -> f64 {
    (elapsed.as_secs_f64() * speed).rem_euclid(1.0)
}

fn bounce(phase: f64) -> f64 {
    0.75 * (1.0 - (2.0 * phase - 1.0).abs())
}

/// Gradient position of a character at normalized position `pos`.
pub fn wave(direction: Direction, pos: f64, phase: f64) -> f64 {
    let center = (2.0 * pos - 1.0).abs();
    let t = match direction {
        Direction::Right => pos - phase + 1.0,
        Direction::Left => pos + phase,
        Direction::MiddleIn => center + phase,
        Direction::MiddleOut => 1.0 - center + phase,
        Direction::BounceIn => center + bounce(phase),
        Direction::BounceOut => 1.0 - center + bounce(phase),
    };
    t.rem_euclid(1.0)
}

/// What a run of characters is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// Whitespace, written without styling.
    Blank,
    /// Styled with the table entry at this index.
    Color(usize),
}

/// Splits `text` into runs of identical paint for the given phase.
///
/// Ranges are byte ranges into `text` and always fall on grapheme
/// boundaries.
pub fn shimmer_runs(text: &str, phase: f64, direction: Direction) -> Vec<(Paint, Range<usize>)> {
    let count = text.graphemes(true).count();
    let mut runs: Vec<(Paint, Range<usize>)> = Vec::new();

    for (i, (offset, grapheme)) in text.grapheme_indices(true).enumerate() {
        let paint = if grapheme.chars().all(char::is_whitespace) {
            Paint::Blank
        } else {
            let pos = i as f64 / count as f64;
            Paint::Color(GradientLut::index(wave(direction, pos, phase)))
        };
        let end = offset + grapheme.len();
        match runs.last_mut() {
            Some((last, range)) if *last == paint => range.end = end,
            _ => runs.push((paint, offset..end)),
        }
    }
    runs
}

/// Renders `text` with a shimmer at `phase`.
pub fn shimmer(text: &str, phase: f64, direction: Direction, lut: &GradientLut) -> String {
    let mut out = String::with_capacity(text.len() * 4);
    for (paint, range) in shimmer_runs(text, phase, direction) {
        let run = &text[range];
        match paint {
            Paint::Blank => out.push_str(run),
            Paint::Color(index) => out.push_str(&lut.style(index).render(run)),
        }
    }
    out
}
