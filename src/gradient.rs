//! Gradient interpolation and per-animation lookup tables.
//!
//! Colors are blended in OkLab, which keeps midpoints from turning muddy the
//! way raw RGB blending does. Blending is too costly to repeat for every
//! character of every frame, so animations sample the gradient once into a
//! [`GradientLut`] when they start and only index into it afterwards.

use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;

/// Number of entries in a [`GradientLut`].
pub const LUT_SIZE: usize = 64;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Fallback color used when a gradient has no stops.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Creates a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`.
    ///
    /// ```rust
    /// use clog::gradient::Rgb;
    ///
    /// assert_eq!(Rgb::from_hex("#5A56E0"), Some(Rgb::new(0x5a, 0x56, 0xe0)));
    /// assert_eq!(Rgb::from_hex("nope"), None);
    /// ```
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Formats the color as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Converts the color into a lipgloss foreground color.
    pub fn to_lipgloss(self) -> lipgloss::Color {
        lipgloss::Color::from(self.to_hex().as_str())
    }
}

/// OkLab representation used for blending.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OkLab {
    l: f64,
    a: f64,
    b: f64,
}

impl OkLab {
    fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            l: self.l + (other.l - self.l) * t,
            a: self.a + (other.a - self.a) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn to_oklab(color: Rgb) -> OkLab {
    let r = srgb_to_linear(f64::from(color.r) / 255.0);
    let g = srgb_to_linear(f64::from(color.g) / 255.0);
    let b = srgb_to_linear(f64::from(color.b) / 255.0);

    let l = (0.412_221_47 * r + 0.536_332_55 * g + 0.051_445_99 * b).cbrt();
    let m = (0.211_903_50 * r + 0.680_699_55 * g + 0.107_396_96 * b).cbrt();
    let s = (0.088_302_46 * r + 0.281_718_84 * g + 0.629_978_70 * b).cbrt();

    OkLab {
        l: 0.210_454_26 * l + 0.793_617_78 * m - 0.004_072_05 * s,
        a: 1.977_998_49 * l - 2.428_592_05 * m + 0.450_593_56 * s,
        b: 0.025_904_04 * l + 0.782_771_77 * m - 0.808_675_77 * s,
    }
}

fn from_oklab(lab: OkLab) -> Rgb {
    let l_ = lab.l + 0.396_337_78 * lab.a + 0.215_803_76 * lab.b;
    let m_ = lab.l - 0.105_561_35 * lab.a - 0.063_854_17 * lab.b;
    let s_ = lab.l - 0.089_484_18 * lab.a - 1.291_485_48 * lab.b;

    let l = l_ * l_ * l_;
    let m = m_ * m_ * m_;
    let s = s_ * s_ * s_;

    let r = 4.076_741_66 * l - 3.307_711_59 * m + 0.230_969_94 * s;
    let g = -1.268_438_00 * l + 2.609_757_40 * m - 0.341_319_38 * s;
    let b = -0.004_196_09 * l - 0.703_418_61 * m + 1.707_614_70 * s;

    // Out-of-gamut results are clamped.
    let channel = |c: f64| (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0).round() as u8;
    Rgb::new(channel(r), channel(g), channel(b))
}

/// Blends two colors in OkLab space.
pub fn blend(a: Rgb, b: Rgb, t: f64) -> Rgb {
    if t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    from_oklab(to_oklab(a).lerp(to_oklab(b), t))
}

/// An anchor point of a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position in `[0, 1]`.
    pub position: f64,
    /// Color at that position.
    pub color: Rgb,
}

impl ColorStop {
    /// Creates a stop.
    pub const fn new(position: f64, color: Rgb) -> Self {
        Self { position, color }
    }
}

/// Samples the gradient described by `stops` at `t`.
///
/// `stops` are expected in ascending position order. `t` is clamped to the
/// first and last stop positions, so values outside the range return the
/// boundary color exactly. No stops yield [`Rgb::WHITE`], a single stop
/// yields its color.
pub fn interpolate(t: f64, stops: &[ColorStop]) -> Rgb {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Rgb::WHITE,
    };
    if stops.len() == 1 || t.is_nan() || t <= first.position {
        return first.color;
    }
    if t >= last.position {
        return last.color;
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if t <= hi.position {
            let span = hi.position - lo.position;
            if span <= f64::EPSILON {
                return hi.color;
            }
            return blend(lo.color, hi.color, (t - lo.position) / span);
        }
    }
    last.color
}

/// Precomputed colors and styles sampled from a gradient.
///
/// The table is phase independent: animations shift the phase when they
/// index into it, never by rebuilding it.
#[derive(Debug, Clone)]
pub struct GradientLut {
    colors: [Rgb; LUT_SIZE],
    styles: Vec<Style>,
}

impl GradientLut {
    /// Samples `stops` at [`LUT_SIZE`] evenly spaced points.
    ///
    /// Stops may be given in any order; they are sorted by position first.
    pub fn new(stops: &[ColorStop]) -> Self {
        let mut sorted = stops.to_vec();
        sorted.sort_by(|a, b| a.position.total_cmp(&b.position));

        let last = (LUT_SIZE - 1) as f64;
        let colors: [Rgb; LUT_SIZE] =
            std::array::from_fn(|i| interpolate(i as f64 / last, &sorted));
        let styles = colors
            .iter()
            .map(|c| Style::new().foreground(c.to_lipgloss()))
            .collect();
        Self { colors, styles }
    }

    /// Maps a phase in `[0, 1]` to a table index, clamping out-of-range input.
    pub fn index(t: f64) -> usize {
        if t.is_nan() {
            return 0;
        }
        let last = (LUT_SIZE - 1) as f64;
        (t * last).round().clamp(0.0, last) as usize
    }

    /// Color stored at `index`.
    pub fn color(&self, index: usize) -> Rgb {
        self.colors[index.min(LUT_SIZE - 1)]
    }

    /// Color at phase `t`.
    pub fn color_at(&self, t: f64) -> Rgb {
        self.colors[Self::index(t)]
    }

    /// Pre-built foreground style for `index`.
    pub fn style(&self, index: usize) -> &Style {
        &self.styles[index.min(LUT_SIZE - 1)]
    }
}

fn stops(colors: &[(f64, Rgb)]) -> Vec<ColorStop> {
    colors
        .iter()
        .map(|&(position, color)| ColorStop::new(position, color))
        .collect()
}

/// Seamless gray gradient with a bright band in the middle.
pub fn default_shimmer() -> Vec<ColorStop> {
    let base = Rgb::new(0x6b, 0x72, 0x80);
    stops(&[
        (0.0, base),
        (0.35, base),
        (0.5, Rgb::new(0xf9, 0xfa, 0xfb)),
        (0.65, base),
        (1.0, base),
    ])
}

/// Purple to pink, the classic bubbles ramp.
pub fn default_pulse() -> Vec<ColorStop> {
    stops(&[(0.0, Rgb::new(0x5a, 0x56, 0xe0)), (1.0, Rgb::new(0xee, 0x6f, 0xf8))])
}
