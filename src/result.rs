//! Result handles that turn a finished animation into one final log line.
//!
//! Each handle is consumed by exactly one finalizer:
//!
//! | Finalizer  | On success                     | On failure                                |
//! |------------|--------------------------------|-------------------------------------------|
//! | `msg(s)`   | `s` at the success level       | `s` at the error level, plus `error=...`  |
//! | `send()`   | success message, or the title  | error message plus `error=...`, or the error text |
//! | `err()`    | the title                      | the error text                            |
//! | `silent()` | nothing                        | nothing                                   |
//!
//! All of them return the outcome, so a caller can log and propagate with
//! a single `?`.

use std::sync::Arc;
use std::time::Duration;

use crate::animation::Recipe;
use crate::error::Error;
use crate::field::{Field, Value, WithFields};
use crate::group::SlotShared;
use crate::level::Level;
use crate::logger::Logger;
use crate::state::RenderState;

/// Prefix of successful final lines.
pub const SUCCESS_PREFIX: &str = "✅";

const GROUP_TITLE: &str = "done";

enum Finalizer {
    Msg(String),
    Send,
    Err,
    Silent,
}

/// Choices the caller chains onto a result before finalizing it.
#[derive(Debug)]
struct Policy {
    fields: Vec<Field>,
    prefix: Option<String>,
    success_level: Level,
    success_message: Option<String>,
    error_level: Level,
    error_message: Option<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            prefix: None,
            success_level: Level::Info,
            success_message: None,
            error_level: Level::Error,
            error_message: None,
        }
    }
}

/// What finished, as seen by a finalizer.
struct Finished<'a> {
    title: &'a str,
    fields: Vec<Field>,
    outcome: Result<(), Error>,
}

impl Policy {
    fn finalize(self, logger: &Logger, finished: Finished<'_>, how: Finalizer) -> Result<(), Error> {
        let Finished {
            title,
            mut fields,
            outcome,
        } = finished;
        fields.extend(self.fields);

        let line = match (&outcome, how) {
            (_, Finalizer::Silent) => None,
            (Ok(()), how) => {
                let message = match how {
                    Finalizer::Msg(message) => message,
                    Finalizer::Send => self.success_message.unwrap_or_else(|| title.to_string()),
                    _ => title.to_string(),
                };
                let prefix = self.prefix.unwrap_or_else(|| SUCCESS_PREFIX.to_string());
                Some((self.success_level, Some(prefix), message))
            }
            (Err(err), how) => {
                let message = match (how, self.error_message) {
                    (Finalizer::Msg(message), _) | (Finalizer::Send, Some(message)) => {
                        fields.push(Field::new("error", Value::Error(err.to_string())));
                        message
                    }
                    _ => err.to_string(),
                };
                Some((self.error_level, self.prefix, message))
            }
        };

        if let Some((level, prefix, message)) = line {
            logger.emit(level, prefix.as_deref(), &message, &fields);
        }
        outcome
    }
}

macro_rules! finalizers {
    ($name:ident) => {
        impl $name {
            /// Level of the final line when the task succeeded.
            pub fn on_success_level(mut self, level: Level) -> Self {
                self.policy.success_level = level;
                self
            }

            /// Message [`send`](Self::send) uses when the task succeeded.
            pub fn on_success_message(mut self, message: impl Into<String>) -> Self {
                self.policy.success_message = Some(message.into());
                self
            }

            /// Level of the final line when the task failed.
            pub fn on_error_level(mut self, level: Level) -> Self {
                self.policy.error_level = level;
                self
            }

            /// Message [`send`](Self::send) uses when the task failed.
            pub fn on_error_message(mut self, message: impl Into<String>) -> Self {
                self.policy.error_message = Some(message.into());
                self
            }

            /// Overrides the prefix glyph of the final line.
            pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
                self.policy.prefix = Some(prefix.into());
                self
            }

            /// Logs `message` at the success or error level.
            pub fn msg(self, message: impl Into<String>) -> Result<(), Error> {
                self.finalize(Finalizer::Msg(message.into()))
            }

            /// Logs the configured success or error message.
            pub fn send(self) -> Result<(), Error> {
                self.finalize(Finalizer::Send)
            }

            /// Logs the title on success and the error text on failure.
            pub fn err(self) -> Result<(), Error> {
                self.finalize(Finalizer::Err)
            }

            /// Returns the outcome without logging.
            pub fn silent(self) -> Result<(), Error> {
                self.finalize(Finalizer::Silent)
            }
        }

        impl WithFields for $name {
            fn push_field(&mut self, field: Field) {
                self.policy.fields.push(field);
            }
        }
    };
}

/// Outcome of [`Animation::wait`](crate::Animation::wait) and
/// [`Animation::progress`](crate::Animation::progress).
#[derive(Debug)]
#[must_use = "a WaitResult does nothing until finalized with msg, send, err or silent"]
pub struct WaitResult {
    logger: Logger,
    recipe: Recipe,
    state: Arc<RenderState>,
    outcome: Result<(), Error>,
    elapsed: Duration,
    policy: Policy,
}

impl WaitResult {
    pub(crate) fn new(
        logger: Logger,
        recipe: Recipe,
        state: Arc<RenderState>,
        outcome: Result<(), Error>,
        elapsed: Duration,
    ) -> Self {
        let policy = Policy {
            prefix: recipe.prefix.clone(),
            ..Policy::default()
        };
        Self {
            logger,
            recipe,
            state,
            outcome,
            elapsed,
            policy,
        }
    }

    /// The error, if the task failed or was cancelled.
    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }

    /// How long the animation ran.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn finalize(self, how: Finalizer) -> Result<(), Error> {
        let title = self.state.title();
        let fields = final_fields(&self.recipe, &self.state, self.elapsed);
        let finished = Finished {
            title: &title,
            fields,
            outcome: self.outcome,
        };
        self.policy.finalize(&self.logger, finished, how)
    }
}

finalizers!(WaitResult);

/// Outcome of one group slot, available once [`Group::wait`](crate::Group::wait)
/// has returned.
#[derive(Debug)]
#[must_use = "a SlotResult does nothing until finalized with msg, send, err or silent"]
pub struct SlotResult {
    logger: Logger,
    slot: Arc<SlotShared>,
    policy: Policy,
}

impl SlotResult {
    pub(crate) fn new(logger: Logger, slot: Arc<SlotShared>) -> Self {
        let policy = Policy {
            prefix: slot.recipe.prefix.clone(),
            ..Policy::default()
        };
        Self {
            logger,
            slot,
            policy,
        }
    }

    /// Whether the slot's task has finished.
    pub fn is_done(&self) -> bool {
        self.slot.outcome().is_some()
    }

    /// The slot's error, if it failed or was cancelled.
    pub fn error(&self) -> Option<Error> {
        self.slot.outcome().and_then(|outcome| outcome.clone().err())
    }

    fn finalize(self, how: Finalizer) -> Result<(), Error> {
        let title = self.slot.state.title();
        let outcome = self
            .slot
            .outcome()
            .cloned()
            .unwrap_or(Err(Error::Incomplete));
        let fields = final_fields(&self.slot.recipe, &self.slot.state, self.slot.elapsed());
        let finished = Finished {
            title: &title,
            fields,
            outcome,
        };
        self.policy.finalize(&self.logger, finished, how)
    }
}

finalizers!(SlotResult);

/// Aggregate outcome of [`Group::wait`](crate::Group::wait).
#[derive(Debug)]
#[must_use = "a GroupResult does nothing until finalized with msg, send, err or silent"]
pub struct GroupResult {
    logger: Logger,
    error: Option<Error>,
    policy: Policy,
}

impl GroupResult {
    pub(crate) fn new(logger: Logger, error: Option<Error>) -> Self {
        Self {
            logger,
            error,
            policy: Policy::default(),
        }
    }

    /// The joined slot errors, if any slot failed.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    fn finalize(self, how: Finalizer) -> Result<(), Error> {
        let finished = Finished {
            title: GROUP_TITLE,
            fields: Vec::new(),
            outcome: self.error.map_or(Ok(()), Err),
        };
        self.policy.finalize(&self.logger, finished, how)
    }
}

finalizers!(GroupResult);

fn final_fields(recipe: &Recipe, state: &RenderState, elapsed: Duration) -> Vec<Field> {
    let mut fields = state.fields().as_ref().clone();
    if let Some(key) = &recipe.elapsed_key {
        fields.push(Field::new(key.clone(), Value::Duration(elapsed)));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::output::{Output, SharedBuffer};
    use std::io;

    fn setup() -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let logger = Logger::with_config(Config::default(), Output::new(buffer.clone()));
        (logger, buffer)
    }

    fn result(logger: &Logger, outcome: Result<(), Error>) -> WaitResult {
        let recipe = logger.spinner("Fetching").str("host", "a").into_recipe();
        let state = Arc::new(recipe.state());
        WaitResult::new(logger.clone(), recipe, state, outcome, Duration::from_millis(20))
    }

    fn failure() -> Error {
        Error::task(Box::new(io::Error::other("boom")))
    }

    #[test]
    fn msg_on_success() {
        let (logger, buffer) = setup();
        result(&logger, Ok(())).int("n", 1).msg("Fetched").unwrap();
        assert_eq!(buffer.contents(), "INF ✅ Fetched host=a n=1\n");
    }

    #[test]
    fn msg_on_failure_adds_the_error_field() {
        let (logger, buffer) = setup();
        let err = result(&logger, Err(failure())).msg("Fetch failed").unwrap_err();
        assert!(err.is::<io::Error>());
        assert_eq!(buffer.contents(), "ERR ❌ Fetch failed host=a error=boom\n");
    }

    #[test]
    fn send_defaults_to_the_title_and_error_text() {
        let (logger, buffer) = setup();
        result(&logger, Ok(())).send().unwrap();
        result(&logger, Err(failure())).send().unwrap_err();
        assert_eq!(
            buffer.contents(),
            "INF ✅ Fetching host=a\nERR ❌ boom host=a\n"
        );
    }

    #[test]
    fn send_uses_configured_messages_and_levels() {
        let (logger, buffer) = setup();
        result(&logger, Ok(()))
            .on_success_level(Level::Warn)
            .on_success_message("all good")
            .send()
            .unwrap();
        result(&logger, Err(failure()))
            .on_error_level(Level::Warn)
            .on_error_message("retrying")
            .send()
            .unwrap_err();
        assert_eq!(
            buffer.contents(),
            "WRN ✅ all good host=a\nWRN ⚠️ retrying host=a error=boom\n"
        );
    }

    #[test]
    fn err_logs_the_title_or_error_text() {
        let (logger, buffer) = setup();
        result(&logger, Ok(())).err().unwrap();
        result(&logger, Err(Error::Cancelled)).err().unwrap_err();
        assert_eq!(
            buffer.contents(),
            "INF ✅ Fetching host=a\nERR ❌ context canceled host=a\n"
        );
    }

    #[test]
    fn silent_only_returns() {
        let (logger, buffer) = setup();
        let err = result(&logger, Err(failure())).silent().unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn prefix_override_applies_to_both_outcomes() {
        let (logger, buffer) = setup();
        result(&logger, Ok(())).prefix(">").msg("a").unwrap();
        result(&logger, Err(failure())).prefix(">").err().unwrap_err();
        assert_eq!(buffer.contents(), "INF > a host=a\nERR > boom host=a\n");
    }

    #[test]
    fn elapsed_field_comes_before_chained_fields() {
        let (logger, buffer) = setup();
        let recipe = logger.spinner("t").str("a", "1").elapsed("took").into_recipe();
        let state = Arc::new(recipe.state());
        WaitResult::new(logger.clone(), recipe, state, Ok(()), Duration::from_millis(850))
            .str("z", "2")
            .msg("ok")
            .unwrap();
        assert_eq!(buffer.contents(), "INF ✅ ok a=1 took=850ms z=2\n");
    }

    #[test]
    fn group_result_uses_done_as_title() {
        let (logger, buffer) = setup();
        GroupResult::new(logger.clone(), None).send().unwrap();
        assert_eq!(buffer.contents(), "INF ✅ done\n");
        assert!(GroupResult::new(logger, None).error().is_none());
    }
}
