//! Error types surfaced by animations, groups and result finalizers.
//!
//! A task closure returns [`BoxError`] so that any error type can be
//! propagated with `?`. Once the render loop has picked up the outcome it is
//! wrapped in [`Error`], which is cheap to clone and can be inspected with
//! [`Error::is`] / [`Error::find`] to recover the original error value.

use std::sync::Arc;

/// Boxed error returned by task closures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome error of an animation, a group slot or a whole group.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The task closure returned an error. The original error is kept intact.
    #[error(transparent)]
    Task(Arc<dyn std::error::Error + Send + Sync + 'static>),
    /// The cancellation token fired before the task completed.
    #[error("context canceled")]
    Cancelled,
    /// The task panicked before it could report a result.
    #[error("task panicked before completing")]
    TaskPanicked,
    /// A slot result was finalized before its group finished waiting.
    #[error("slot task has not completed")]
    Incomplete,
    /// Several slots of a group failed.
    #[error("{}", join_messages(.0))]
    Group(Vec<Error>),
}

fn join_messages(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl Error {
    /// Wraps an error returned by a task closure.
    pub fn task(err: BoxError) -> Self {
        if let Some(inner) = err.downcast_ref::<Error>() {
            return inner.clone();
        }
        Error::Task(Arc::from(err))
    }

    /// Joins a set of errors into a single aggregate.
    ///
    /// Returns `None` when the iterator yields nothing, mirroring a nil
    /// aggregate when every member succeeded.
    pub fn join<I>(errors: I) -> Option<Error>
    where
        I: IntoIterator<Item = Error>,
    {
        let errors: Vec<Error> = errors.into_iter().collect();
        if errors.is_empty() {
            None
        } else {
            Some(Error::Group(errors))
        }
    }

    /// Reports whether this error, or any error it aggregates, is an `E`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use clog::Error;
    ///
    /// #[derive(Debug)]
    /// struct Boom;
    /// impl std::fmt::Display for Boom {
    ///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    ///         f.write_str("boom")
    ///     }
    /// }
    /// impl std::error::Error for Boom {}
    ///
    /// let err = Error::task(Box::new(Boom));
    /// assert!(err.is::<Boom>());
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    pub fn is<E>(&self) -> bool
    where
        E: std::error::Error + 'static,
    {
        self.find::<E>().is_some()
    }

    /// Returns the first `E` found in this error or in its group members.
    pub fn find<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Error::Task(inner) => inner.downcast_ref::<E>(),
            Error::Group(errors) => errors.iter().find_map(|e| e.find::<E>()),
            _ => None,
        }
    }

    /// Reports whether cancellation caused this error.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Group(errors) => errors.iter().any(Error::is_cancelled),
            _ => false,
        }
    }

    /// Returns the errors aggregated by a group error, or this error alone.
    pub fn errors(&self) -> &[Error] {
        match self {
            Error::Group(errors) => errors,
            other => std::slice::from_ref(other),
        }
    }
}
