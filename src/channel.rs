//! Channel-scoped operations.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::json;

use crate::action::{AuditableRestAction, RestAction};
use crate::cache::Cache;
use crate::error::{Error, Result, ValidationFailure};
use crate::pagination::{PaginationAction, PaginationOrder};
use crate::permissions::Permissions;
use crate::request::Request;
use crate::route::routes;
use crate::snowflake::Snowflake;
use crate::transport::Transport;
use crate::types::{Channel, Message};
use crate::validation;

/// Bulk delete only accepts messages newer than this.
const BULK_DELETE_WINDOW: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Handle for one channel.
#[derive(Clone)]
pub struct ChannelHandle {
    id: Snowflake,
    transport: Arc<dyn Transport>,
    cache: Cache,
}

impl fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl ChannelHandle {
    pub(crate) const fn new(id: Snowflake, transport: Arc<dyn Transport>, cache: Cache) -> Self {
        Self {
            id,
            transport,
            cache,
        }
    }

    /// The channel's ID.
    #[must_use]
    pub const fn id(&self) -> Snowflake {
        self.id
    }

    /// Fetch the channel.
    #[must_use]
    pub fn retrieve(&self) -> RestAction<Channel> {
        let request = Request::new(routes::GET_CHANNEL.compile(&[&self.id]));
        RestAction::from_json(Arc::clone(&self.transport), request)
    }

    /// Send a message (1–2000 characters).
    pub fn send_message(&self, content: &str) -> Result<RestAction<Message>> {
        validation::check_content(content)?;
        validation::require_permission(
            self.cache.channel_permissions(self.id),
            Permissions::SEND_MESSAGES,
        )?;

        let request = Request::new(routes::CREATE_MESSAGE.compile(&[&self.id]))
            .with_body(json!({ "content": content }));
        Ok(RestAction::from_json(Arc::clone(&self.transport), request))
    }

    /// Edit a message's content.
    pub fn edit_message(&self, message: Snowflake, content: &str) -> Result<RestAction<Message>> {
        validation::check_content(content)?;

        let request = Request::new(routes::EDIT_MESSAGE.compile(&[&self.id, &message]))
            .with_body(json!({ "content": content }));
        Ok(RestAction::from_json(Arc::clone(&self.transport), request))
    }

    /// Delete a single message.
    pub fn delete_message(&self, message: Snowflake) -> Result<AuditableRestAction<()>> {
        validation::require_permission(
            self.cache.channel_permissions(self.id),
            Permissions::MANAGE_MESSAGES,
        )?;

        let request = Request::new(routes::DELETE_MESSAGE.compile(&[&self.id, &message]));
        Ok(AuditableRestAction::new(RestAction::unit(
            Arc::clone(&self.transport),
            request,
        )))
    }

    /// Bulk-delete 2–100 messages.
    ///
    /// Discord rejects messages older than two weeks; the snowflake
    /// timestamps let that be caught locally before dispatch.
    pub fn purge(&self, messages: &[Snowflake]) -> Result<AuditableRestAction<()>> {
        validation::check_range("bulk delete count", messages.len() as i64, 2, 100)?;
        validation::require_permission(
            self.cache.channel_permissions(self.id),
            Permissions::MANAGE_MESSAGES,
        )?;

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64;
        let cutoff_ms = now_ms.saturating_sub(BULK_DELETE_WINDOW.as_millis() as u64);
        for message in messages {
            if message.timestamp_ms() < cutoff_ms {
                return Err(Error::Validation(ValidationFailure::Malformed(format!(
                    "message {message} is older than the 14 day bulk delete window"
                ))));
            }
        }

        let ids: Vec<String> = messages.iter().map(ToString::to_string).collect();
        let request = Request::new(routes::BULK_DELETE_MESSAGES.compile(&[&self.id]))
            .with_body(json!({ "messages": ids }));
        Ok(AuditableRestAction::new(RestAction::unit(
            Arc::clone(&self.transport),
            request,
        )))
    }

    /// Page through the channel's message history, newest first.
    pub fn history(&self) -> Result<PaginationAction<Message>> {
        validation::require_permission(
            self.cache.channel_permissions(self.id),
            Permissions::READ_MESSAGE_HISTORY,
        )?;

        let channel = self.id;
        Ok(PaginationAction::new(
            Arc::clone(&self.transport),
            PaginationOrder::Backward,
            move |cursor| {
                let mut route = routes::GET_MESSAGES
                    .compile(&[&channel])
                    .with_query("limit", cursor.limit());
                if let Some(boundary) = cursor.boundary() {
                    route = route.with_query(cursor.order().query_key(), boundary);
                }
                Request::new(route)
            },
            |value| serde_json::from_value(value.clone()).map_err(Error::decode),
            |message: &Message| message.id,
        ))
    }
}
