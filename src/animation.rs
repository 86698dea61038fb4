//! Animation builders and the single-animation entry points.
//!
//! An [`Animation`] is a recipe: title, spinner, optional title effect,
//! optional progress bar and the fields to show. Chaining methods only
//! change the recipe; nothing is drawn until [`Animation::wait`] or
//! [`Animation::progress`] runs the task.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use clog::{CancellationToken, WithFields};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), clog::Error> {
//! let ctx = CancellationToken::new();
//! clog::spinner("Fetching index")
//!     .str("registry", "crates.io")
//!     .elapsed("took")
//!     .wait(&ctx, |_ctx| async {
//!         tokio::time::sleep(Duration::from_millis(300)).await;
//!         Ok(())
//!     })
//!     .await
//!     .msg("Fetched index")
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::bar::BarStyle;
use crate::cancel::CancellationToken;
use crate::engine;
use crate::error::BoxError;
use crate::field::{Field, WithFields};
use crate::gradient::{self, ColorStop};
use crate::logger::Logger;
use crate::result::WaitResult;
use crate::shimmer::Direction;
use crate::spinner::Spinner;
use crate::state::{ProgressUpdate, RenderState};

/// Redraw interval of shimmer and pulse effects, about 30 frames per second.
pub(crate) const EFFECT_INTERVAL: Duration = Duration::from_millis(33);

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// How the title is colored while animating.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Kind {
    Plain,
    Shimmer {
        stops: Vec<ColorStop>,
        direction: Direction,
        speed: f64,
    },
    Pulse {
        stops: Vec<ColorStop>,
        speed: f64,
    },
}

impl Kind {
    pub(crate) fn shimmer() -> Self {
        Kind::Shimmer {
            stops: gradient::default_shimmer(),
            direction: Direction::Right,
            speed: 0.5,
        }
    }

    pub(crate) fn pulse() -> Self {
        Kind::Pulse {
            stops: gradient::default_pulse(),
            speed: 0.5,
        }
    }

    pub(crate) fn stops(&self) -> Option<&[ColorStop]> {
        match self {
            Kind::Plain => None,
            Kind::Shimmer { stops, .. } | Kind::Pulse { stops, .. } => Some(stops),
        }
    }
}

/// Frozen recipe of one animation.
#[derive(Debug, Clone)]
pub(crate) struct Recipe {
    pub(crate) title: String,
    pub(crate) spinner: Spinner,
    pub(crate) kind: Kind,
    pub(crate) bar: Option<(BarStyle, u64)>,
    pub(crate) delay: Option<Duration>,
    pub(crate) elapsed_key: Option<String>,
    pub(crate) prefix: Option<String>,
    pub(crate) fields: Vec<Field>,
}

impl Recipe {
    /// Redraw interval: the spinner's own interval, tightened for effects.
    pub(crate) fn tick_interval(&self) -> Duration {
        let tick = self.spinner.interval.max(MIN_INTERVAL);
        match self.kind {
            Kind::Plain => tick,
            _ => tick.min(EFFECT_INTERVAL),
        }
    }

    pub(crate) fn state(&self) -> RenderState {
        let total = self.bar.as_ref().map_or(0, |(_, total)| *total);
        RenderState::new(&self.title, self.fields.clone(), total)
    }
}

/// Builder for a live status line.
///
/// Create one with [`Logger::spinner`], [`Logger::shimmer`],
/// [`Logger::pulse`], [`Logger::bar`] or the crate-level shortcuts.
#[derive(Debug)]
pub struct Animation {
    logger: Logger,
    recipe: Recipe,
}

impl Animation {
    pub(crate) fn new(logger: Logger, kind: Kind, title: String) -> Self {
        Self {
            logger,
            recipe: Recipe {
                title,
                spinner: Spinner::default(),
                kind,
                bar: None,
                delay: None,
                elapsed_key: None,
                prefix: None,
                fields: Vec::new(),
            },
        }
    }

    pub(crate) fn with_bar(mut self, total: u64) -> Self {
        self.recipe.bar = Some((BarStyle::default(), total));
        self
    }

    pub(crate) fn into_recipe(self) -> Recipe {
        self.recipe
    }

    /// Uses a different spinner.
    pub fn spinner(mut self, spinner: Spinner) -> Self {
        self.recipe.spinner = spinner;
        self
    }

    /// Replaces the gradient of a shimmer or pulse title.
    ///
    /// Has no effect on plain spinners.
    pub fn gradient(mut self, new_stops: Vec<ColorStop>) -> Self {
        if let Kind::Shimmer { stops, .. } | Kind::Pulse { stops, .. } = &mut self.recipe.kind {
            *stops = new_stops;
        }
        self
    }

    /// Sets the direction of a shimmer.
    pub fn direction(mut self, new_direction: Direction) -> Self {
        if let Kind::Shimmer { direction, .. } = &mut self.recipe.kind {
            *direction = new_direction;
        }
        self
    }

    /// Sets the shimmer or pulse speed in cycles per second.
    pub fn speed(mut self, cycles_per_second: f64) -> Self {
        if let Kind::Shimmer { speed, .. } | Kind::Pulse { speed, .. } = &mut self.recipe.kind {
            *speed = cycles_per_second.max(0.0);
        }
        self
    }

    /// Sets the look of a progress bar animation.
    pub fn bar_style(mut self, style: BarStyle) -> Self {
        if let Some((current, _)) = &mut self.recipe.bar {
            *current = style;
        }
        self
    }

    /// Suppresses the animation until `delay` has elapsed.
    ///
    /// Tasks that finish sooner never draw anything but the final line.
    pub fn after(mut self, delay: Duration) -> Self {
        self.recipe.delay = Some(delay);
        self
    }

    /// Shows the running time under `key`, live and on the final line.
    pub fn elapsed(mut self, key: impl Into<String>) -> Self {
        self.recipe.elapsed_key = Some(key.into());
        self
    }

    /// Overrides the prefix glyph of the final line.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.recipe.prefix = Some(prefix.into());
        self
    }

    /// Runs `task` while animating, then returns its outcome.
    ///
    /// The task is spawned onto the tokio runtime and receives a clone of
    /// `ctx`. Cancelling `ctx` ends the animation right away with
    /// [`Error::Cancelled`](crate::Error::Cancelled); the task keeps running
    /// until it notices the cancellation itself.
    pub async fn wait<F, Fut>(self, ctx: &CancellationToken, task: F) -> WaitResult
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let task_ctx = ctx.clone();
        self.drive(ctx, move |_state| task(task_ctx)).await
    }

    /// Like [`wait`](Self::wait), but the task also gets a
    /// [`ProgressUpdate`] to change the title, fields and bar while running.
    pub async fn progress<F, Fut>(self, ctx: &CancellationToken, task: F) -> WaitResult
    where
        F: FnOnce(CancellationToken, ProgressUpdate) -> Fut,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let task_ctx = ctx.clone();
        self.drive(ctx, move |state| task(task_ctx, ProgressUpdate::new(state)))
            .await
    }

    async fn drive<M, Fut>(self, ctx: &CancellationToken, make: M) -> WaitResult
    where
        M: FnOnce(Arc<RenderState>) -> Fut,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let started = Instant::now();
        let state = Arc::new(self.recipe.state());
        let done = engine::spawn_task(make(Arc::clone(&state)));
        let snapshot = self.logger.snapshot();
        let outcome = engine::run(&snapshot, &self.recipe, &state, ctx, done, started).await;
        WaitResult::new(self.logger, self.recipe, state, outcome, started.elapsed())
    }
}

impl WithFields for Animation {
    fn push_field(&mut self, field: Field) {
        self.recipe.fields.push(field);
    }
}
