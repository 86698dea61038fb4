//! Pulse: the whole text breathes through a gradient in unison.

use std::f64::consts::PI;
use std::time::Duration;

use crate::gradient::GradientLut;

/// Gradient position of a pulse running at `speed` cycles per second.
///
/// Starts at `0.0`, peaks at `1.0` half a cycle later and eases in and out.
pub fn pulse_phase(elapsed: Duration, speed: f64) -> f64 {
    0.5 * (1.0 + (2.0 * PI * speed * elapsed.as_secs_f64() - PI / 2.0).sin())
}

/// Renders every non-whitespace character of `text` with the color at `t`.
pub fn pulse(text: &str, t: f64, lut: &GradientLut) -> String {
    if text.is_empty() {
        return String::new();
    }
    let style = lut.style(GradientLut::index(t));
    let mut out = String::with_capacity(text.len() * 2);
    let mut rest = text;

    while !rest.is_empty() {
        let blank = rest.starts_with(char::is_whitespace);
        let split = rest
            .find(|c: char| c.is_whitespace() != blank)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(split);
        if blank {
            out.push_str(run);
        } else {
            out.push_str(&style.render(run));
        }
        rest = tail;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::default_pulse;

    #[test]
    fn phase_oscillates_between_zero_and_one() {
        assert!(pulse_phase(Duration::ZERO, 1.0).abs() < 1e-9);
        assert!((pulse_phase(Duration::from_millis(500), 1.0) - 1.0).abs() < 1e-9);
        assert!((pulse_phase(Duration::from_millis(250), 1.0) - 0.5).abs() < 1e-9);
        for ms in (0..3000).step_by(37) {
            let t = pulse_phase(Duration::from_millis(ms), 0.7);
            assert!((0.0..=1.0).contains(&t));
        }
    }

    #[test]
    fn empty_text_is_unchanged() {
        let lut = GradientLut::new(&default_pulse());
        assert_eq!(pulse("", 0.3, &lut), "");
    }

    #[test]
    fn whitespace_is_left_alone() {
        let lut = GradientLut::new(&default_pulse());
        let out = pulse("  fetching   index ", 0.8, &lut);
        assert_eq!(strip_ansi_escapes::strip_str(&out), "  fetching   index ");
        assert!(out.starts_with("  "));
        assert!(out.ends_with(' '));
    }
}
