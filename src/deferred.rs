//! Retrieve-or-fetch: actions that may resolve from local cache without a
//! network round trip.

use crate::action::{self, RestAction, Submitted};
use crate::error::{Error, Result};

type Probe<T> = Box<dyn FnOnce() -> Result<Option<T>> + Send>;
type Fallback<T> = Box<dyn FnOnce() -> Result<RestAction<T>> + Send>;

/// An action that consults a cache probe before falling back to a network
/// fetch.
///
/// The probe runs first and exactly once per execution. A hit settles the
/// action immediately; no [`RestAction`] is constructed and no network call
/// occurs. A probe error is a programmer error in the probe and propagates
/// as a failure rather than being treated as a miss.
pub struct DeferredAction<T> {
    probe: Probe<T>,
    fallback: Fallback<T>,
}

impl<T: Send + 'static> DeferredAction<T> {
    /// Build a deferred action from a probe and a fallback supplier.
    pub fn new(
        probe: impl FnOnce() -> Result<Option<T>> + Send + 'static,
        fallback: impl FnOnce() -> Result<RestAction<T>> + Send + 'static,
    ) -> Self {
        Self {
            probe: Box::new(probe),
            fallback: Box::new(fallback),
        }
    }

    /// Probe the cache, then dispatch the fallback action on a miss.
    ///
    /// Failure classification from the fallback propagates unchanged.
    pub async fn execute(self) -> Result<T> {
        match (self.probe)()? {
            Some(value) => Ok(value),
            None => (self.fallback)()?.execute().await,
        }
    }

    /// Schedule execution and discard the result; failures go to the
    /// process-wide default handler. Never blocks.
    pub fn queue(self) {
        self.queue_with(|_| {}, |err| action::default_failure(&err));
    }

    /// Schedule execution; exactly one of the two callbacks is invoked.
    /// Never blocks.
    pub fn queue_with(
        self,
        on_success: impl FnOnce(T) + Send + 'static,
        on_failure: impl FnOnce(Error) + Send + 'static,
    ) {
        tokio::spawn(async move {
            match self.execute().await {
                Ok(value) => on_success(value),
                Err(err) => on_failure(err),
            }
        });
    }

    /// Begin execution and return a handle for the eventual result.
    pub fn submit(self) -> Submitted<T> {
        Submitted::spawn(self.execute())
    }

    /// Execute and block the calling thread until settled.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async context, like
    /// [`RestAction::complete`].
    pub fn complete(self) -> Result<T> {
        action::block_on(self.execute())
    }
}
