//! Render loops of single animations and groups.
//!
//! A loop owns the terminal region for as long as it runs. Each tick it
//! reads whatever state the tasks last published and redraws. Completion and
//! cancellation are checked before the ticker, so a finished task never
//! costs an extra frame.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};

use crate::animation::Recipe;
use crate::cancel::CancellationToken;
use crate::error::{BoxError, Error};
use crate::frame::{self, FrameRenderer, DONE_GLYPH, FAILED_GLYPH, PENDING_GLYPH};
use crate::group::SlotShared;
use crate::level::Level;
use crate::logger::Snapshot;
use crate::state::RenderState;
use crate::terminal::LiveRegion;

/// Receives the outcome of a spawned task.
pub(crate) type Completion = oneshot::Receiver<Result<(), Error>>;

/// Spawns `task` onto the runtime.
///
/// A task that panics drops its sender, which surfaces as
/// [`Error::TaskPanicked`].
pub(crate) fn spawn_task<Fut>(task: Fut) -> Completion
where
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let outcome = task.await.map_err(Error::task);
        // The receiver is gone when the caller was dropped mid-wait.
        let _ = tx.send(outcome);
    });
    rx
}

fn settle(received: Result<Result<(), Error>, oneshot::error::RecvError>) -> Result<(), Error> {
    received.unwrap_or(Err(Error::TaskPanicked))
}

async fn until_settled(done: &mut Completion, ctx: &CancellationToken) -> Result<(), Error> {
    tokio::select! {
        biased;
        received = done => settle(received),
        _ = ctx.cancelled() => Err(Error::Cancelled),
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

fn ticker(period: Duration) -> time::Interval {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Drives one animation until its task completes or `ctx` is cancelled.
pub(crate) async fn run(
    snapshot: &Snapshot,
    recipe: &Recipe,
    state: &RenderState,
    ctx: &CancellationToken,
    mut done: Completion,
    started: Instant,
) -> Result<(), Error> {
    if let Some(delay) = recipe.delay {
        tokio::select! {
            biased;
            received = &mut done => return settle(received),
            _ = ctx.cancelled() => return Err(Error::Cancelled),
            _ = time::sleep(delay) => {}
        }
    }

    if !snapshot.enabled(Level::Info) {
        return until_settled(&mut done, ctx).await;
    }

    let mut renderer = FrameRenderer::new(recipe, snapshot);
    if !snapshot.animate {
        log::trace!("clog: static line for {:?}", recipe.title);
        snapshot
            .output
            .write_line(&renderer.render_static(state, PENDING_GLYPH, 0));
        return until_settled(&mut done, ctx).await;
    }

    let mut region = LiveRegion::new(snapshot.output.clone());
    let mut ticker = ticker(recipe.tick_interval());
    loop {
        tokio::select! {
            biased;
            received = &mut done => return settle(received),
            _ = ctx.cancelled() => return Err(Error::Cancelled),
            _ = ticker.tick() => {
                let line = renderer.render(state, started.elapsed(), 0);
                region.draw(&[line]);
            }
        }
    }
}

/// Drives a group until every slot has reported or `ctx` is cancelled.
///
/// `done` yields one slot index per finished task. On cancellation every
/// slot still running is resolved as cancelled.
pub(crate) async fn run_group(
    snapshot: &Snapshot,
    slots: &[Arc<SlotShared>],
    ctx: &CancellationToken,
    done: &mut mpsc::UnboundedReceiver<usize>,
) {
    let mut pending = slots.len();
    if pending == 0 {
        return;
    }

    let mut renderers: Vec<FrameRenderer<'_>> = slots
        .iter()
        .map(|slot| FrameRenderer::new(&slot.recipe, snapshot))
        .collect();

    if !snapshot.animate || !snapshot.enabled(Level::Info) {
        let quiet = !snapshot.enabled(Level::Info);
        let pad = frame::title_width(slots.iter().map(|slot| slot.state.as_ref()));
        let mut printed = vec![quiet; slots.len()];
        while pending > 0 {
            // A slot gets its line once it outlives its delay.
            for (i, slot) in slots.iter().enumerate() {
                if !printed[i] && slot.visible() {
                    printed[i] = true;
                    let line = renderers[i].render_static(&slot.state, PENDING_GLYPH, pad);
                    snapshot.output.write_line(&line);
                }
            }
            let next = slots
                .iter()
                .zip(&printed)
                .filter(|(slot, shown)| !**shown && slot.outcome().is_none())
                .filter_map(|(slot, _)| slot.recipe.delay.map(|delay| slot.started + delay))
                .min();
            tokio::select! {
                biased;
                Some(_) = done.recv() => pending -= 1,
                _ = ctx.cancelled() => return cancel_all(slots),
                _ = sleep_until(next) => {}
            }
        }
        return;
    }

    let period = slots
        .iter()
        .map(|slot| slot.recipe.tick_interval())
        .min()
        .unwrap_or(Duration::from_millis(100));
    let mut region = LiveRegion::new(snapshot.output.clone());
    let mut ticker = ticker(period);
    loop {
        tokio::select! {
            biased;
            Some(index) = done.recv() => {
                log::trace!("clog: slot {index} finished");
                pending -= 1;
                if pending == 0 {
                    return;
                }
            }
            _ = ctx.cancelled() => return cancel_all(slots),
            _ = ticker.tick() => region.draw(&group_frame(slots, &mut renderers)),
        }
    }
}

fn group_frame(slots: &[Arc<SlotShared>], renderers: &mut [FrameRenderer<'_>]) -> Vec<String> {
    let visible: Vec<usize> = (0..slots.len())
        .filter(|&i| slots[i].visible())
        .collect();
    let pad = frame::title_width(visible.iter().map(|&i| slots[i].state.as_ref()));
    visible
        .into_iter()
        .map(|i| {
            let slot = &slots[i];
            let renderer = &mut renderers[i];
            match slot.outcome() {
                Some(Ok(())) => renderer.render_static(&slot.state, DONE_GLYPH, pad),
                Some(Err(_)) => renderer.render_static(&slot.state, FAILED_GLYPH, pad),
                None => renderer.render(&slot.state, slot.started.elapsed(), pad),
            }
        })
        .collect()
}

fn cancel_all(slots: &[Arc<SlotShared>]) {
    for slot in slots {
        slot.resolve(Err(Error::Cancelled));
    }
}
