//! Cursor-driven pagination over ordered endpoints.
//!
//! A [`PaginationAction`] repeatedly fetches bounded pages and advances a
//! [`Cursor`] after each successful page. Page fetches on one action are
//! naturally serialized: [`PaginationAction::fetch_next`] takes `&mut self`,
//! so a second fetch cannot begin before the first settles. Sharing a
//! paginator across tasks therefore requires external synchronization.
//!
//! A cursor only observes the remote collection at fetch time: if the
//! collection is mutated externally between pages, items may be skipped or
//! duplicated. That is documented behavior, not prevented.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;

use crate::error::{Error, Result, ValidationFailure};
use crate::request::Request;
use crate::snowflake::Snowflake;
use crate::transport::Transport;

/// Smallest page size endpoints accept.
pub const MIN_PAGE_LIMIT: u8 = 1;

/// Largest page size endpoints accept.
pub const MAX_PAGE_LIMIT: u8 = 100;

/// Iteration direction over the ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationOrder {
    /// Oldest-first; pages are requested with `after=<boundary>`
    Forward,
    /// Newest-first; pages are requested with `before=<boundary>`
    Backward,
}

impl PaginationOrder {
    /// The query parameter carrying the boundary key for this direction.
    #[must_use]
    pub const fn query_key(self) -> &'static str {
        match self {
            Self::Forward => "after",
            Self::Backward => "before",
        }
    }
}

/// Mutable iteration state: boundary key, page limit, direction, exhaustion.
///
/// State machine: not started (no boundary, not exhausted) → in progress
/// (boundary set) → exhausted. No transition leaves exhausted.
#[derive(Debug, Clone)]
pub struct Cursor {
    boundary: Option<Snowflake>,
    limit: u8,
    order: PaginationOrder,
    exhausted: bool,
}

impl Cursor {
    pub(crate) const fn new(order: PaginationOrder) -> Self {
        Self {
            boundary: None,
            limit: MAX_PAGE_LIMIT,
            order,
            exhausted: false,
        }
    }

    /// The last-seen boundary key, unset before the first page.
    #[must_use]
    pub const fn boundary(&self) -> Option<Snowflake> {
        self.boundary
    }

    /// The configured page size.
    #[must_use]
    pub const fn limit(&self) -> u8 {
        self.limit
    }

    /// The iteration direction.
    #[must_use]
    pub const fn order(&self) -> PaginationOrder {
        self.order
    }

    /// True once the endpoint has reported a short page.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub(crate) fn advance(&mut self, last: Snowflake, short: bool) {
        self.boundary = Some(last);
        if short {
            self.exhausted = true;
        }
    }

    pub(crate) fn exhaust(&mut self) {
        self.exhausted = true;
    }
}

type ParseItem<T> = Arc<dyn Fn(&Value) -> Result<T> + Send + Sync>;
type ItemKey<T> = Arc<dyn Fn(&T) -> Snowflake + Send + Sync>;
type MakeRequest = Arc<dyn Fn(&Cursor) -> Request + Send + Sync>;

/// Iterates a paginated endpoint as successive bounded pages.
pub struct PaginationAction<T> {
    transport: Arc<dyn Transport>,
    make_request: MakeRequest,
    parse_item: ParseItem<T>,
    item_key: ItemKey<T>,
    cursor: Cursor,
}

impl<T> fmt::Debug for PaginationAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationAction")
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> PaginationAction<T> {
    /// Build a paginator from a request factory, an item parser, and the
    /// key extractor that drives the boundary.
    pub fn new(
        transport: Arc<dyn Transport>,
        order: PaginationOrder,
        make_request: impl Fn(&Cursor) -> Request + Send + Sync + 'static,
        parse_item: impl Fn(&Value) -> Result<T> + Send + Sync + 'static,
        item_key: impl Fn(&T) -> Snowflake + Send + Sync + 'static,
    ) -> Self {
        Self {
            transport,
            make_request: Arc::new(make_request),
            parse_item: Arc::new(parse_item),
            item_key: Arc::new(item_key),
            cursor: Cursor::new(order),
        }
    }

    /// Current cursor state.
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Set the page size.
    ///
    /// Fails locally, before any transport interaction, for values outside
    /// [`MIN_PAGE_LIMIT`]..=[`MAX_PAGE_LIMIT`].
    pub fn limit(mut self, limit: u8) -> Result<Self> {
        if !(MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(Error::Validation(ValidationFailure::OutOfRange {
                what: "page limit",
                min: i64::from(MIN_PAGE_LIMIT),
                max: i64::from(MAX_PAGE_LIMIT),
                value: i64::from(limit),
            }));
        }
        self.cursor.limit = limit;
        Ok(self)
    }

    /// Start iteration from an explicit boundary instead of the collection
    /// edge.
    ///
    /// Only valid before the first fetch.
    pub fn skip_to(mut self, boundary: Snowflake) -> Result<Self> {
        if self.cursor.boundary.is_some() {
            return Err(Error::Validation(ValidationFailure::Malformed(
                "skip_to is only valid before the first page is fetched".into(),
            )));
        }
        self.cursor.boundary = Some(boundary);
        Ok(self)
    }

    /// Fetch the next page and advance the cursor.
    ///
    /// Returns an empty page once the cursor is exhausted, without a network
    /// call. A short page (fewer items than the limit) marks the cursor
    /// exhausted. The `&mut self` receiver serializes successive fetches on
    /// one action.
    pub async fn fetch_next(&mut self) -> Result<Vec<T>> {
        if self.cursor.exhausted {
            return Ok(Vec::new());
        }

        let request = (self.make_request)(&self.cursor);
        let response = self.transport.execute(&request).await?;
        let body = response
            .body
            .ok_or_else(|| Error::decode("expected a response body"))?;
        let raw = body
            .as_array()
            .ok_or_else(|| Error::decode("expected a JSON array of items"))?;

        let mut items = Vec::with_capacity(raw.len());
        for value in raw {
            items.push((self.parse_item)(value)?);
        }

        let short = items.len() < usize::from(self.cursor.limit);
        match items.last() {
            Some(last) => self.cursor.advance((self.item_key)(last), short),
            None => self.cursor.exhaust(),
        }

        Ok(items)
    }

    /// Lazily iterate items one at a time, fetching pages on demand until
    /// the cursor is exhausted.
    ///
    /// The stream is finite once a short page is reached and is not
    /// restartable; construct a fresh action to iterate again.
    pub fn stream(self) -> impl Stream<Item = Result<T>> + Send {
        struct State<T> {
            action: PaginationAction<T>,
            page: VecDeque<T>,
            failed: bool,
        }

        stream::unfold(
            State {
                action: self,
                page: VecDeque::new(),
                failed: false,
            },
            |mut state| async move {
                loop {
                    if let Some(item) = state.page.pop_front() {
                        return Some((Ok(item), state));
                    }
                    if state.failed || state.action.cursor.exhausted {
                        return None;
                    }
                    match state.action.fetch_next().await {
                        Ok(items) if items.is_empty() => return None,
                        Ok(items) => state.page = items.into(),
                        Err(err) => {
                            state.failed = true;
                            return Some((Err(err), state));
                        }
                    }
                }
            },
        )
    }

    /// Collect up to `amount` items, fetching only as many pages as needed.
    pub async fn take_async(self, amount: usize) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(amount.min(usize::from(MAX_PAGE_LIMIT)));
        let mut items = Box::pin(self.stream());
        while out.len() < amount {
            match items.next().await {
                Some(Ok(item)) => out.push(item),
                Some(Err(err)) => return Err(err),
                None => break,
            }
        }
        Ok(out)
    }

    /// Drive the lazy sequence, invoking `predicate` for each item, until it
    /// returns false or the sequence ends.
    pub async fn for_each_async(self, mut predicate: impl FnMut(&T) -> bool + Send) -> Result<()> {
        let mut items = Box::pin(self.stream());
        while let Some(item) = items.next().await {
            let item = item?;
            if !predicate(&item) {
                break;
            }
        }
        Ok(())
    }
}
