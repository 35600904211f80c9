//! cordial — a deferred-action framework for the Discord REST API.
//!
//! Every API operation is represented as an inert [`RestAction`]: the entity
//! method validates against cached state, assembles an immutable request
//! descriptor, and hands back a unit of work the caller executes however it
//! likes — fire-and-forget ([`RestAction::queue`]), awaited
//! ([`RestAction::execute`] / [`RestAction::submit`]), or blocking
//! ([`RestAction::complete`]).
//!
//! ```no_run
//! use cordial::{Client, Config, Snowflake};
//!
//! # async fn demo() -> cordial::Result<()> {
//! let client = Client::new(&Config::new("Bot token"))?;
//! let guild = client.guild(Snowflake::new(81_384_788_765_712_384));
//!
//! guild
//!     .kick(Snowflake::new(80_351_110_224_678_912))?
//!     .reason("spamming")?
//!     .queue();
//! # Ok(())
//! # }
//! ```
//!
//! Rate limiting, backoff, and retries live in the transport layer; actions
//! never retry on their own. Pre-validators reject operations that cached
//! state proves impossible before any network work is constructed.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod action;
pub mod cache;
pub mod channel;
pub mod client;
pub mod config;
pub mod deferred;
pub mod error;
pub mod guild;
pub mod pagination;
pub mod permissions;
pub mod request;
pub mod route;
pub mod snowflake;
pub mod transport;
pub mod types;
pub mod validation;

pub use action::{set_default_failure_handler, AuditableRestAction, RestAction, Submitted};
pub use cache::Cache;
pub use channel::ChannelHandle;
pub use client::Client;
pub use config::{Config, RetryConfig};
pub use deferred::DeferredAction;
pub use error::{Error, ErrorCode, Result, ValidationFailure};
pub use guild::GuildHandle;
pub use pagination::{Cursor, PaginationAction, PaginationOrder};
pub use permissions::{Permission, Permissions};
pub use request::Request;
pub use route::{Method, Route, Template};
pub use snowflake::{Identifiable, Mentionable, Snowflake};
pub use transport::{HttpTransport, Response, Transport};
