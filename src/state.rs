//! State published by a running task and read by the render loop.
//!
//! Every value is replaced wholesale through an [`ArcSwap`]: the task swaps
//! in a new `Arc`, the loop loads whichever `Arc` is current. Neither side
//! ever waits on the other and a reader never observes a half-written value.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::bar::BarProgress;
use crate::field::{self, Field, WithFields};

#[derive(Debug)]
pub(crate) struct RenderState {
    title: ArcSwap<String>,
    fields: ArcSwap<Vec<Field>>,
    progress: ArcSwap<BarProgress>,
}

impl RenderState {
    pub(crate) fn new(title: &str, fields: Vec<Field>, total: u64) -> Self {
        Self {
            title: ArcSwap::from_pointee(title.to_string()),
            fields: ArcSwap::from_pointee(fields),
            progress: ArcSwap::from_pointee(BarProgress::new(0, total)),
        }
    }

    pub(crate) fn title(&self) -> Arc<String> {
        self.title.load_full()
    }

    pub(crate) fn fields(&self) -> Arc<Vec<Field>> {
        self.fields.load_full()
    }

    pub(crate) fn progress(&self) -> BarProgress {
        **self.progress.load()
    }

    fn publish(&self, title: Option<String>, fields: Vec<Field>, progress: Option<BarProgress>) {
        if let Some(title) = title {
            self.title.store(Arc::new(title));
        }
        self.fields.store(Arc::new(fields));
        if let Some(progress) = progress {
            self.progress.store(Arc::new(progress));
        }
    }
}

/// Handle a progress task uses to update its animation while it runs.
///
/// Changes are staged on the handle and become visible on the next frame
/// after [`send`](ProgressUpdate::send). Fields are keyed: attaching a key
/// that was sent before replaces its value instead of adding a duplicate.
///
/// ```rust,no_run
/// use clog::{CancellationToken, ProgressUpdate, WithFields};
///
/// # async fn demo() {
/// let ctx = CancellationToken::new();
/// clog::bar("Downloading", 3)
///     .progress(&ctx, |_ctx, mut update: ProgressUpdate| async move {
///         for i in 1..=3u64 {
///             update.title(format!("Downloading part {i}")).uint("part", i).progress(i, 3).send();
///         }
///         Ok(())
///     })
///     .await
///     .msg("Downloaded");
/// # }
/// ```
#[derive(Debug)]
pub struct ProgressUpdate {
    state: Arc<RenderState>,
    title: Option<String>,
    fields: Vec<Field>,
    progress: Option<BarProgress>,
}

impl ProgressUpdate {
    pub(crate) fn new(state: Arc<RenderState>) -> Self {
        let fields = state.fields().as_ref().clone();
        Self {
            state,
            title: None,
            fields,
            progress: None,
        }
    }

    /// Stages a new title.
    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    /// Stages bar progress.
    pub fn progress(&mut self, current: u64, total: u64) -> &mut Self {
        self.progress = Some(BarProgress::new(current, total));
        self
    }

    /// Publishes the staged title, fields and progress.
    pub fn send(&mut self) {
        self.state
            .publish(self.title.take(), self.fields.clone(), self.progress.take());
    }
}

impl WithFields for &mut ProgressUpdate {
    fn push_field(&mut self, field: Field) {
        field::upsert(&mut self.fields, field);
    }
}
