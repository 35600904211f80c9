//! Guild-scoped operations.
//!
//! Every method validates against cached state first and returns an inert
//! action; nothing touches the network until the caller executes it.

use std::fmt;
use std::sync::Arc;

use serde_json::json;

use crate::action::{AuditableRestAction, RestAction};
use crate::cache::Cache;
use crate::deferred::DeferredAction;
use crate::error::Result;
use crate::pagination::{PaginationAction, PaginationOrder};
use crate::permissions::Permissions;
use crate::request::Request;
use crate::route::routes;
use crate::snowflake::Snowflake;
use crate::transport::Transport;
use crate::types::{Ban, Member, PartialGuild};
use crate::validation;

/// Handle for one guild.
#[derive(Clone)]
pub struct GuildHandle {
    id: Snowflake,
    transport: Arc<dyn Transport>,
    cache: Cache,
}

impl fmt::Debug for GuildHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuildHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl GuildHandle {
    pub(crate) const fn new(id: Snowflake, transport: Arc<dyn Transport>, cache: Cache) -> Self {
        Self {
            id,
            transport,
            cache,
        }
    }

    /// The guild's ID.
    #[must_use]
    pub const fn id(&self) -> Snowflake {
        self.id
    }

    /// Fetch the guild's metadata.
    #[must_use]
    pub fn retrieve(&self) -> RestAction<PartialGuild> {
        let request = Request::new(routes::GET_GUILD.compile(&[&self.id]));
        RestAction::from_json(Arc::clone(&self.transport), request)
    }

    /// Retrieve a member, from cache when possible.
    ///
    /// The cache probe runs at execution time; a hit settles without any
    /// network dispatch.
    #[must_use]
    pub fn retrieve_member(&self, user: Snowflake) -> DeferredAction<Member> {
        let cache = self.cache.clone();
        let transport = Arc::clone(&self.transport);
        let guild = self.id;
        DeferredAction::new(
            move || Ok(cache.member(guild, user)),
            move || {
                let request = Request::new(routes::GET_MEMBER.compile(&[&guild, &user]));
                Ok(RestAction::from_json(transport, request))
            },
        )
    }

    /// Kick a member from the guild.
    ///
    /// Requires `KICK_MEMBERS` and, when both sides are cached, a strictly
    /// higher role than the target.
    pub fn kick(&self, user: Snowflake) -> Result<AuditableRestAction<()>> {
        validation::require_permission(
            self.cache.guild_permissions(self.id),
            Permissions::KICK_MEMBERS,
        )?;
        self.check_member_hierarchy(user)?;

        let request = Request::new(routes::REMOVE_MEMBER.compile(&[&self.id, &user]));
        Ok(AuditableRestAction::new(RestAction::unit(
            Arc::clone(&self.transport),
            request,
        )))
    }

    /// Ban a user, deleting their messages from the last `delete_days` days
    /// (0–7).
    pub fn ban(&self, user: Snowflake, delete_days: u8) -> Result<AuditableRestAction<()>> {
        validation::check_range("delete message days", i64::from(delete_days), 0, 7)?;
        validation::require_permission(
            self.cache.guild_permissions(self.id),
            Permissions::BAN_MEMBERS,
        )?;
        self.check_member_hierarchy(user)?;

        let request = Request::new(routes::CREATE_BAN.compile(&[&self.id, &user]))
            .with_body(json!({ "delete_message_days": delete_days }));
        Ok(AuditableRestAction::new(RestAction::unit(
            Arc::clone(&self.transport),
            request,
        )))
    }

    /// Lift a ban.
    pub fn unban(&self, user: Snowflake) -> Result<AuditableRestAction<()>> {
        validation::require_permission(
            self.cache.guild_permissions(self.id),
            Permissions::BAN_MEMBERS,
        )?;

        let request = Request::new(routes::DELETE_BAN.compile(&[&self.id, &user]));
        Ok(AuditableRestAction::new(RestAction::unit(
            Arc::clone(&self.transport),
            request,
        )))
    }

    /// Change a member's nickname (up to 32 characters, `None` to clear).
    pub fn modify_nickname(
        &self,
        user: Snowflake,
        nick: Option<&str>,
    ) -> Result<AuditableRestAction<()>> {
        if let Some(nick) = nick {
            validation::check_range("nickname length", nick.chars().count() as i64, 1, 32)?;
        }
        validation::require_permission(
            self.cache.guild_permissions(self.id),
            Permissions::MANAGE_NICKNAMES,
        )?;
        self.check_member_hierarchy(user)?;

        let request = Request::new(routes::MODIFY_MEMBER.compile(&[&self.id, &user]))
            .with_body(json!({ "nick": nick }));
        Ok(AuditableRestAction::new(RestAction::unit(
            Arc::clone(&self.transport),
            request,
        )))
    }

    /// Delete a role.
    ///
    /// Requires `MANAGE_ROLES`; when the role and the current user's roles
    /// are cached, the current user must strictly outrank the role.
    pub fn delete_role(&self, role: Snowflake) -> Result<AuditableRestAction<()>> {
        validation::require_permission(
            self.cache.guild_permissions(self.id),
            Permissions::MANAGE_ROLES,
        )?;
        if let (Some(actor), Some(target)) = (self.actor_position(), self.cache.role(self.id, role))
        {
            validation::check_hierarchy(actor, target.position)?;
        }

        let request = Request::new(routes::DELETE_ROLE.compile(&[&self.id, &role]));
        Ok(AuditableRestAction::new(RestAction::unit(
            Arc::clone(&self.transport),
            request,
        )))
    }

    /// Page through the guild's bans, oldest user ID first.
    pub fn bans(&self) -> Result<PaginationAction<Ban>> {
        validation::require_permission(
            self.cache.guild_permissions(self.id),
            Permissions::BAN_MEMBERS,
        )?;

        let guild = self.id;
        Ok(PaginationAction::new(
            Arc::clone(&self.transport),
            PaginationOrder::Forward,
            move |cursor| {
                let mut route = routes::GET_BANS
                    .compile(&[&guild])
                    .with_query("limit", cursor.limit());
                if let Some(boundary) = cursor.boundary() {
                    route = route.with_query(cursor.order().query_key(), boundary);
                }
                Request::new(route)
            },
            |value| serde_json::from_value(value.clone()).map_err(crate::error::Error::decode),
            |ban: &Ban| ban.user.id,
        ))
    }

    fn actor_position(&self) -> Option<i64> {
        let actor = self.cache.current_user()?;
        self.cache.highest_role_position(self.id, actor)
    }

    /// Hierarchy pre-check against a target member, when both positions are
    /// provable from cache.
    fn check_member_hierarchy(&self, target: Snowflake) -> Result<()> {
        if let (Some(actor), Some(target)) = (
            self.actor_position(),
            self.cache.highest_role_position(self.id, target),
        ) {
            validation::check_hierarchy(actor, target)?;
        }
        Ok(())
    }
}
