//! Several animations rendered as one block.
//!
//! Every slot's task runs concurrently as soon as it is registered. A single
//! ticker owned by [`Group::wait`] redraws all slots together, always in
//! registration order, so lines never move relative to each other.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use clog::CancellationToken;
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), clog::Error> {
//! let ctx = CancellationToken::new();
//! let group = clog::group(&ctx);
//! let api = group.add(clog::spinner("Building api")).run(|_ctx| async {
//!     tokio::time::sleep(Duration::from_millis(200)).await;
//!     Ok(())
//! });
//! let web = group.add(clog::pulse("Building web")).run(|_ctx| async {
//!     tokio::time::sleep(Duration::from_millis(300)).await;
//!     Ok(())
//! });
//!
//! let result = group.wait().await;
//! api.msg("api built")?;
//! web.msg("web built")?;
//! result.silent()
//! # }
//! ```

use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::animation::{Animation, Recipe};
use crate::cancel::CancellationToken;
use crate::engine;
use crate::error::{BoxError, Error};
use crate::logger::Logger;
use crate::result::{GroupResult, SlotResult};
use crate::state::{ProgressUpdate, RenderState};

/// State of one slot shared by its task, the render loop and its result.
#[derive(Debug)]
pub(crate) struct SlotShared {
    pub(crate) recipe: Recipe,
    pub(crate) state: Arc<RenderState>,
    pub(crate) started: Instant,
    finished: OnceLock<Duration>,
    outcome: OnceLock<Result<(), Error>>,
}

impl SlotShared {
    fn new(recipe: Recipe) -> Self {
        let state = Arc::new(recipe.state());
        Self {
            recipe,
            state,
            started: Instant::now(),
            finished: OnceLock::new(),
            outcome: OnceLock::new(),
        }
    }

    /// Records the outcome. Only the first call has an effect.
    pub(crate) fn resolve(&self, outcome: Result<(), Error>) {
        if self.outcome.set(outcome).is_ok() {
            let _ = self.finished.set(self.started.elapsed());
        }
    }

    pub(crate) fn outcome(&self) -> Option<&Result<(), Error>> {
        self.outcome.get()
    }

    /// Running time, frozen once the slot has finished.
    pub(crate) fn elapsed(&self) -> Duration {
        self.finished
            .get()
            .copied()
            .unwrap_or_else(|| self.started.elapsed())
    }

    /// Whether the slot has outlived its delay and belongs in the block.
    pub(crate) fn visible(&self) -> bool {
        self.recipe.delay.map_or(true, |delay| self.elapsed() >= delay)
    }
}

/// Reports a slot as finished when dropped, even if its task panicked.
struct Completion {
    index: usize,
    slot: Arc<SlotShared>,
    done: mpsc::UnboundedSender<usize>,
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.slot.resolve(Err(Error::TaskPanicked));
        // The group is gone when its wait future was dropped.
        let _ = self.done.send(self.index);
    }
}

/// A set of concurrently running animations.
///
/// Created with [`Logger::group`] or [`group`](crate::group). Register slots
/// with [`add`](Group::add), then call [`wait`](Group::wait) to render them
/// until every task has finished.
pub struct Group {
    logger: Logger,
    ctx: CancellationToken,
    slots: Mutex<Vec<Arc<SlotShared>>>,
    done_tx: mpsc::UnboundedSender<usize>,
    done_rx: mpsc::UnboundedReceiver<usize>,
}

impl Group {
    pub(crate) fn new(logger: Logger, ctx: CancellationToken) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            logger,
            ctx,
            slots: Mutex::new(Vec::new()),
            done_tx,
            done_rx,
        }
    }

    /// Prepares a slot for `animation`.
    ///
    /// The slot is rendered with the group's logger, whichever logger built
    /// the animation.
    pub fn add(&self, animation: Animation) -> Slot<'_> {
        Slot {
            group: self,
            recipe: animation.into_recipe(),
        }
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether no slot has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders every slot until all tasks finish or the context is cancelled.
    ///
    /// Returns immediately when no slot was registered. After it returns,
    /// each [`SlotResult`] holds its slot's outcome.
    pub async fn wait(self) -> GroupResult {
        let Group {
            logger,
            ctx,
            slots,
            done_tx,
            mut done_rx,
        } = self;
        let slots = slots.into_inner();
        log::trace!("clog: waiting on {} slots", slots.len());

        let snapshot = logger.snapshot();
        engine::run_group(&snapshot, &slots, &ctx, &mut done_rx).await;
        drop(done_tx);

        let error = Error::join(
            slots
                .iter()
                .filter_map(|slot| slot.outcome().and_then(|o| o.clone().err())),
        );
        GroupResult::new(logger, error)
    }

    fn register(&self, recipe: Recipe) -> (usize, Arc<SlotShared>) {
        let slot = Arc::new(SlotShared::new(recipe));
        let mut slots = self.slots.lock();
        slots.push(Arc::clone(&slot));
        (slots.len() - 1, slot)
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("slots", &self.len())
            .field("cancelled", &self.ctx.is_cancelled())
            .finish()
    }
}

/// A slot that has not started yet. Consumed by [`run`](Slot::run) or
/// [`progress`](Slot::progress).
#[derive(Debug)]
pub struct Slot<'g> {
    group: &'g Group,
    recipe: Recipe,
}

impl Slot<'_> {
    /// Starts `task` in this slot.
    pub fn run<F, Fut>(self, task: F) -> SlotResult
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let ctx = self.group.ctx.clone();
        self.start(move |_state| task(ctx))
    }

    /// Starts `task` in this slot with a [`ProgressUpdate`] handle.
    pub fn progress<F, Fut>(self, task: F) -> SlotResult
    where
        F: FnOnce(CancellationToken, ProgressUpdate) -> Fut,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let ctx = self.group.ctx.clone();
        self.start(move |state| task(ctx, ProgressUpdate::new(state)))
    }

    fn start<M, Fut>(self, make: M) -> SlotResult
    where
        M: FnOnce(Arc<RenderState>) -> Fut,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let (index, slot) = self.group.register(self.recipe);
        let task = make(Arc::clone(&slot.state));
        let completion = Completion {
            index,
            slot: Arc::clone(&slot),
            done: self.group.done_tx.clone(),
        };
        tokio::spawn(async move {
            let outcome = task.await.map_err(Error::task);
            completion.slot.resolve(outcome);
            drop(completion);
        });
        SlotResult::new(self.group.logger.clone(), slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::level::Level;
    use crate::output::{Output, SharedBuffer};
    use crate::spinner::Spinner;
    use crate::terminal::screen;

    fn setup(tty: bool) -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let output = Output::new(buffer.clone()).with_tty(tty);
        (Logger::with_config(Config::default(), output), buffer)
    }

    fn fast(logger: &Logger, title: &str) -> Animation {
        logger
            .spinner(title)
            .spinner(Spinner::new(["*"], Duration::from_millis(10)))
    }

    #[derive(Debug)]
    struct Bang;

    impl fmt::Display for Bang {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Bang {}

    #[tokio::test]
    async fn empty_group_returns_at_once() {
        let (logger, buffer) = setup(true);
        let group = logger.group(&CancellationToken::new());
        assert!(group.is_empty());
        group.wait().await.silent().unwrap();
        assert!(buffer.bytes().is_empty());
    }

    #[tokio::test]
    async fn slot_errors_are_joined() {
        let (logger, buffer) = setup(true);
        let group = logger.group(&CancellationToken::new());
        let ok = group.add(fast(&logger, "ok")).run(|_ctx| async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok(())
        });
        let bad = group.add(fast(&logger, "bad")).run(|_ctx| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err::<(), BoxError>(Box::new(Bang))
        });
        assert_eq!(group.len(), 2);

        let err = group.wait().await.silent().unwrap_err();
        assert!(err.is::<Bang>());
        assert_eq!(err.errors().len(), 1);
        assert!(ok.error().is_none());
        assert!(bad.error().is_some_and(|e| e.is::<Bang>()));
        assert!(screen::replay(&buffer.bytes()).is_empty());

        ok.msg("ok done").unwrap();
        bad.msg("bad done").unwrap_err();
        assert_eq!(
            screen::replay(&buffer.bytes()),
            ["INF ✅ ok done", "ERR ❌ bad done error=boom"]
        );
    }

    #[tokio::test]
    async fn cancellation_resolves_running_slots() {
        let (logger, _buffer) = setup(true);
        let ctx = CancellationToken::new();
        let group = logger.group(&ctx);
        let slow = group.add(fast(&logger, "slow")).run(|ctx| async move {
            ctx.cancelled().await;
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        });
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });
        let err = group.wait().await.silent().unwrap_err();
        assert!(err.is_cancelled());
        assert!(slow.error().is_some_and(|e| e.is_cancelled()));
    }

    #[tokio::test]
    async fn panicking_slot_still_finishes_the_group() {
        let (logger, _buffer) = setup(false);
        let group = logger.group(&CancellationToken::new());
        let slot = group.add(fast(&logger, "p")).run(|_ctx| async {
            if true {
                panic!("slot blew up");
            }
            Ok(())
        });
        group.wait().await.silent().unwrap_err();
        assert!(matches!(slot.error(), Some(Error::TaskPanicked)));
    }

    #[tokio::test]
    async fn static_lines_are_padded_without_terminal() {
        let (logger, buffer) = setup(false);
        let group = logger.group(&CancellationToken::new());
        let a = group.add(fast(&logger, "a")).run(|_ctx| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(())
        });
        let b = group.add(fast(&logger, "longer")).run(|_ctx| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(())
        });
        group.wait().await.silent().unwrap();
        assert!(a.is_done() && b.is_done());
        let expected = format!("INF ⏳ {:<6}\nINF ⏳ longer\n", "a");
        assert_eq!(buffer.contents(), expected);
    }

    #[tokio::test]
    async fn delayed_slots_print_only_once_their_delay_passes() {
        let (logger, buffer) = setup(false);
        let group = logger.group(&CancellationToken::new());
        let quick = group
            .add(fast(&logger, "quick").after(Duration::from_secs(5)))
            .run(|_ctx| async { Ok(()) });
        let later = group
            .add(fast(&logger, "later").after(Duration::from_millis(20)))
            .run(|_ctx| async {
                tokio::time::sleep(Duration::from_millis(150)).await;
                Ok(())
            });
        group.wait().await.silent().unwrap();
        assert!(quick.is_done() && later.is_done());
        assert_eq!(buffer.contents(), "INF ⏳ later\n");
    }

    #[tokio::test]
    async fn filtered_level_keeps_the_group_silent() {
        for tty in [false, true] {
            let (logger, buffer) = setup(tty);
            logger.set_level(Level::Error);
            let group = logger.group(&CancellationToken::new());
            let slot = group.add(fast(&logger, "hidden")).run(|_ctx| async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok(())
            });
            group.wait().await.silent().unwrap();
            slot.msg("done").unwrap();
            assert!(buffer.bytes().is_empty(), "tty={tty}: {:?}", buffer.contents());
        }
    }

    #[tokio::test]
    async fn progress_slot_publishes_its_title() {
        let (logger, buffer) = setup(false);
        let group = logger.group(&CancellationToken::new());
        let slot = group
            .add(logger.bar("copy", 2))
            .progress(|_ctx, mut update| async move {
                update.title("copied").progress(2, 2).send();
                Ok(())
            });
        group.wait().await.silent().unwrap();
        slot.err().unwrap();
        let last = buffer.contents().lines().last().map(str::to_string);
        assert_eq!(last.as_deref(), Some("INF ✅ copied"));
    }

    #[test]
    fn slot_result_before_wait_is_incomplete() {
        let (logger, _buffer) = setup(false);
        let slot = Arc::new(SlotShared::new(fast(&logger, "x").into_recipe()));
        let result = SlotResult::new(logger, slot);
        assert!(!result.is_done());
        assert!(matches!(result.silent(), Err(Error::Incomplete)));
    }

    #[test]
    fn first_outcome_wins() {
        let (logger, _buffer) = setup(false);
        let slot = SlotShared::new(fast(&logger, "x").into_recipe());
        slot.resolve(Ok(()));
        slot.resolve(Err(Error::Cancelled));
        assert!(matches!(slot.outcome(), Some(Ok(()))));
    }

    #[test]
    fn delayed_slots_stay_hidden() {
        let (logger, _buffer) = setup(false);
        let slot = SlotShared::new(fast(&logger, "x").after(Duration::from_secs(60)).into_recipe());
        assert!(!slot.visible());
        let slot = SlotShared::new(fast(&logger, "x").into_recipe());
        assert!(slot.visible());
    }
}
