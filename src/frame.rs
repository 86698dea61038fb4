//! Turns an animation's recipe and live state into one line of text.

use std::sync::Arc;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

use crate::animation::{Kind, Recipe};
use crate::field::{Field, Value};
use crate::gradient::GradientLut;
use crate::level::Level;
use crate::logger::Snapshot;
use crate::pulse::{pulse, pulse_phase};
use crate::shimmer::{shimmer, shimmer_phase};
use crate::state::RenderState;

/// Glyph shown in place of the spinner when frames cannot be animated.
pub(crate) const PENDING_GLYPH: &str = "⏳";
/// Glyph of a group slot whose task succeeded.
pub(crate) const DONE_GLYPH: &str = "✓";
/// Glyph of a group slot whose task failed.
pub(crate) const FAILED_GLYPH: &str = "✗";

/// Per-animation renderer.
///
/// Gradients are sampled into lookup tables once, and the rendered field
/// text is reused until the task publishes a new field list.
pub(crate) struct FrameRenderer<'a> {
    recipe: &'a Recipe,
    snapshot: &'a Snapshot,
    title_lut: Option<GradientLut>,
    bar_lut: Option<GradientLut>,
    seen_fields: Option<Arc<Vec<Field>>>,
    fields_text: String,
}

impl<'a> FrameRenderer<'a> {
    pub(crate) fn new(recipe: &'a Recipe, snapshot: &'a Snapshot) -> Self {
        let colors = snapshot.colors;
        let title_lut = recipe
            .kind
            .stops()
            .filter(|_| colors)
            .map(GradientLut::new);
        let bar_lut = recipe
            .bar
            .as_ref()
            .filter(|_| colors)
            .map(|(style, _)| GradientLut::new(&style.gradient));
        Self {
            recipe,
            snapshot,
            title_lut,
            bar_lut,
            seen_fields: None,
            fields_text: String::new(),
        }
    }

    /// Animated line at `elapsed`, title padded to `pad` columns.
    pub(crate) fn render(&mut self, state: &RenderState, elapsed: Duration, pad: usize) -> String {
        let title = padded(&state.title(), pad);
        let mut message = match (&self.recipe.kind, &self.title_lut) {
            (Kind::Shimmer { direction, speed, .. }, Some(lut)) => {
                shimmer(&title, shimmer_phase(elapsed, *speed), *direction, lut)
            }
            (Kind::Pulse { speed, .. }, Some(lut)) => pulse(&title, pulse_phase(elapsed, *speed), lut),
            _ => title,
        };
        self.append_bar(&mut message, state);
        let fields = self.fields(state, Some(elapsed));
        let frame = self.recipe.spinner.frame_at(elapsed);
        self.snapshot.compose(Level::Info, frame, &message, &fields)
    }

    /// Line without motion, used when animation is off and for finished slots.
    pub(crate) fn render_static(&mut self, state: &RenderState, glyph: &str, pad: usize) -> String {
        let mut message = padded(&state.title(), pad);
        self.append_bar(&mut message, state);
        let fields = self.fields(state, None);
        self.snapshot.compose(Level::Info, glyph, &message, &fields)
    }

    fn append_bar(&self, message: &mut String, state: &RenderState) {
        if let Some((style, _)) = &self.recipe.bar {
            let bar = style.render(state.progress().fraction(), self.bar_lut.as_ref());
            message.push(' ');
            message.push_str(&bar);
        }
    }

    fn fields(&mut self, state: &RenderState, elapsed: Option<Duration>) -> String {
        let current = state.fields();
        let stale = self
            .seen_fields
            .as_ref()
            .map_or(true, |seen| !Arc::ptr_eq(seen, &current));
        if stale {
            self.fields_text = self.snapshot.render_fields(&current);
            self.seen_fields = Some(current);
        }

        let (Some(key), Some(elapsed)) = (&self.recipe.elapsed_key, elapsed) else {
            return self.fields_text.clone();
        };
        let shown = Duration::from_millis(elapsed.as_millis() as u64 / 100 * 100);
        let timer = self
            .snapshot
            .render_fields(&[Field::new(key.clone(), Value::Duration(shown))]);
        if self.fields_text.is_empty() {
            timer
        } else {
            format!("{} {timer}", self.fields_text)
        }
    }
}

fn padded(title: &str, width: usize) -> String {
    let missing = width.saturating_sub(title.width());
    let mut out = String::with_capacity(title.len() + missing);
    out.push_str(title);
    out.extend(std::iter::repeat(' ').take(missing));
    out
}

/// Widest title among `states`, in terminal columns.
pub(crate) fn title_width<'s>(states: impl IntoIterator<Item = &'s RenderState>) -> usize {
    states
        .into_iter()
        .map(|state| state.title().width())
        .max()
        .unwrap_or(0)
}
