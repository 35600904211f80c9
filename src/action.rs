//! The action abstraction: every API call is an inert, chainable,
//! cancellable unit of work.
//!
//! A [`RestAction`] does nothing until executed. Execution consumes the
//! action by value, so a settled action can never be re-dispatched; the
//! borrow checker enforces single submission. Three execution styles share
//! one dispatch path:
//!
//! - [`RestAction::queue`] / [`RestAction::queue_with`] schedule the
//!   dispatch on the tokio runtime and never block the caller,
//! - [`RestAction::submit`] returns a [`Submitted`] handle that can be
//!   awaited or cancelled,
//! - [`RestAction::complete`] blocks the calling thread (and refuses to run
//!   inside an async context, where it could deadlock a single-threaded
//!   dispatcher).
//!
//! Dispatch evaluates the optional pre-flight check first; a false result
//! settles the action locally as [`Error::PreconditionFailed`] without any
//! network traffic. Retry policy belongs to the transport, never to the
//! action.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::error;

use crate::error::{Error, Result};
use crate::request::Request;
use crate::transport::{Response, Transport};
use crate::validation;

type Check = Box<dyn Fn() -> bool + Send + Sync>;
type ParseFn<T> = Box<dyn FnOnce(Response) -> Result<T> + Send>;

static DEFAULT_FAILURE_HANDLER: OnceLock<Box<dyn Fn(&Error) + Send + Sync>> = OnceLock::new();

/// Install the process-wide handler for failures of actions queued without
/// an explicit failure callback.
///
/// Returns `false` if a handler was already installed. Until one is set,
/// unhandled failures are logged at error level; they are never dropped.
pub fn set_default_failure_handler(handler: impl Fn(&Error) + Send + Sync + 'static) -> bool {
    DEFAULT_FAILURE_HANDLER.set(Box::new(handler)).is_ok()
}

pub(crate) fn default_failure(err: &Error) {
    match DEFAULT_FAILURE_HANDLER.get() {
        Some(handler) => handler(err),
        None => error!(error = %err, "unhandled action failure"),
    }
}

/// One deferred network operation with a typed result.
pub struct RestAction<T> {
    transport: Arc<dyn Transport>,
    request: Request,
    check: Option<Check>,
    parse: ParseFn<T>,
    cancelled: Arc<AtomicBool>,
}

impl<T: Send + 'static> RestAction<T> {
    /// Build an action from a request descriptor and a response parser.
    ///
    /// Entity methods construct actions for the endpoints this crate
    /// covers; this constructor is the extension point for everything else.
    pub fn new(
        transport: Arc<dyn Transport>,
        request: Request,
        parse: impl FnOnce(Response) -> Result<T> + Send + 'static,
    ) -> Self {
        Self {
            transport,
            request,
            check: None,
            parse: Box::new(parse),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The request descriptor this action will dispatch.
    #[must_use]
    pub const fn request(&self) -> &Request {
        &self.request
    }

    /// Attach or replace the pre-flight check.
    ///
    /// The predicate is evaluated just before dispatch; a false result
    /// settles the action as [`Error::PreconditionFailed`] without a network
    /// call. It must be side-effect free.
    #[must_use]
    pub fn set_check(mut self, check: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.check = Some(Box::new(check));
        self
    }

    /// Post-process the result through a pure function.
    ///
    /// The returned action wraps the same request descriptor; the network
    /// call is still made exactly once.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> RestAction<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let Self {
            transport,
            request,
            check,
            parse,
            cancelled,
        } = self;
        RestAction {
            transport,
            request,
            check,
            parse: Box::new(move |response| parse(response).map(f)),
            cancelled,
        }
    }

    /// Dispatch and await the typed result.
    ///
    /// This is the single execution path; `queue`, `submit`, and `complete`
    /// all funnel through it.
    pub async fn execute(self) -> Result<T> {
        if self.cancelled.load(Ordering::Acquire) {
            return Err(Error::Cancelled);
        }
        if let Some(check) = &self.check {
            if !check() {
                return Err(Error::PreconditionFailed);
            }
        }
        let response = self.transport.execute(&self.request).await?;
        (self.parse)(response)
    }

    /// Schedule dispatch and discard the result; failures go to the
    /// process-wide default handler.
    ///
    /// Never blocks. Must be called from within a tokio runtime.
    pub fn queue(self) {
        self.queue_with(|_| {}, |err| default_failure(&err));
    }

    /// Schedule dispatch; exactly one of the two callbacks is invoked.
    ///
    /// Never blocks. Must be called from within a tokio runtime.
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

    /// Begin dispatch and return a handle for the eventual result.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(self) -> Submitted<T> {
        let cancelled = Arc::clone(&self.cancelled);
        let handle = tokio::spawn(self.execute());
        Submitted { handle, cancelled }
    }

    /// Dispatch and block the calling thread until settled.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async context: blocking a runtime
    /// worker thread would deadlock a single-threaded dispatcher. Await the
    /// action or use [`RestAction::submit`] there instead.
    pub fn complete(self) -> Result<T> {
        block_on(self.execute())
    }
}

impl<T> fmt::Debug for RestAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestAction")
            .field("request", &self.request)
            .field("has_check", &self.check.is_some())
            .field("cancelled", &self.cancelled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned + Send + 'static> RestAction<T> {
    /// Action whose success payload deserializes directly into `T`.
    pub fn from_json(transport: Arc<dyn Transport>, request: Request) -> Self {
        Self::new(transport, request, |response| {
            let body = response
                .body
                .ok_or_else(|| Error::decode("expected a response body"))?;
            serde_json::from_value(body).map_err(Error::decode)
        })
    }
}

impl RestAction<()> {
    /// Action whose success payload is ignored.
    pub fn unit(transport: Arc<dyn Transport>, request: Request) -> Self {
        Self::new(transport, request, |_| Ok(()))
    }
}

pub(crate) fn block_on<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
    assert!(
        tokio::runtime::Handle::try_current().is_err(),
        "complete() called from within an async runtime; await the action or use submit() instead"
    );
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Connection {
            message: format!("failed to start blocking runtime: {e}"),
        })?;
    runtime.block_on(future)
}

/// Handle for an action whose dispatch has been started with
/// [`RestAction::submit`].
pub struct Submitted<T> {
    handle: JoinHandle<Result<T>>,
    cancelled: Arc<AtomicBool>,
}

impl<T: Send + 'static> Submitted<T> {
    pub(crate) fn spawn(future: impl Future<Output = Result<T>> + Send + 'static) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let handle = tokio::spawn(async move {
            if flag.load(Ordering::Acquire) {
                return Err(Error::Cancelled);
            }
            future.await
        });
        Self { handle, cancelled }
    }
}

impl<T> Submitted<T> {
    /// Request cancellation.
    ///
    /// If dispatch has not yet begun, no network call is made and the action
    /// settles as [`Error::Cancelled`]. Once dispatch has begun this is
    /// best-effort: the callback is suppressed but the remote side effect
    /// may still have occurred, which matters for non-idempotent operations.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.handle.abort();
    }

    /// Await the settled result.
    pub async fn wait(self) -> Result<T> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(Error::Cancelled),
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }
}

/// An action whose remote effect carries an audit-log reason.
///
/// Purely additive over [`RestAction`]: the reason travels as a request
/// header; dispatch semantics are unchanged.
pub struct AuditableRestAction<T> {
    inner: RestAction<T>,
}

impl<T> fmt::Debug for AuditableRestAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditableRestAction")
            .field("request", &self.inner.request)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> AuditableRestAction<T> {
    pub(crate) const fn new(inner: RestAction<T>) -> Self {
        Self { inner }
    }

    /// Attach a human-readable justification, logged in the guild's audit
    /// log.
    ///
    /// Fails locally if the reason exceeds
    /// [`MAX_AUDIT_REASON_LEN`](crate::validation::MAX_AUDIT_REASON_LEN)
    /// characters.
    pub fn reason(mut self, reason: impl Into<String>) -> Result<Self> {
        let reason = reason.into();
        validation::check_reason(&reason)?;
        self.inner.request.set_reason(reason);
        Ok(self)
    }

    /// The request descriptor this action will dispatch.
    #[must_use]
    pub const fn request(&self) -> &Request {
        self.inner.request()
    }

    /// See [`RestAction::set_check`].
    #[must_use]
    pub fn set_check(mut self, check: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.inner = self.inner.set_check(check);
        self
    }

    /// See [`RestAction::map`]. Mapping preserves auditability.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> AuditableRestAction<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        AuditableRestAction {
            inner: self.inner.map(f),
        }
    }

    /// See [`RestAction::execute`].
    pub async fn execute(self) -> Result<T> {
        self.inner.execute().await
    }

    /// See [`RestAction::queue`].
    pub fn queue(self) {
        self.inner.queue();
    }

    /// See [`RestAction::queue_with`].
    pub fn queue_with(
        self,
        on_success: impl FnOnce(T) + Send + 'static,
        on_failure: impl FnOnce(Error) + Send + 'static,
    ) {
        self.inner.queue_with(on_success, on_failure);
    }

    /// See [`RestAction::submit`].
    pub fn submit(self) -> Submitted<T> {
        self.inner.submit()
    }

    /// See [`RestAction::complete`].
    pub fn complete(self) -> Result<T> {
        self.inner.complete()
    }
}
