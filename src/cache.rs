//! Read-side entity cache.
//!
//! Queried by pre-validators ("do I hold this permission", "does my highest
//! role outrank theirs") and by deferred-action probes. Lookups return
//! clones or `None`; `None` always means "unknown", never "proven absent".

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::permissions::Permissions;
use crate::snowflake::Snowflake;
use crate::types::{Member, Role};

/// Shared entity cache handle. Cloning is cheap and shares the store.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    inner: Arc<RwLock<Store>>,
}

#[derive(Debug, Default)]
struct Store {
    current_user: Option<Snowflake>,
    members: HashMap<(Snowflake, Snowflake), Member>,
    roles: HashMap<(Snowflake, Snowflake), Role>,
    guild_permissions: HashMap<Snowflake, Permissions>,
    channel_permissions: HashMap<Snowflake, Permissions>,
    channel_guilds: HashMap<Snowflake, Snowflake>,
}

impl Cache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current (bot) user's ID.
    pub fn set_current_user(&self, user: Snowflake) {
        self.write().current_user = Some(user);
    }

    /// The current user's ID, if known.
    #[must_use]
    pub fn current_user(&self) -> Option<Snowflake> {
        self.read().current_user
    }

    /// Insert or replace a guild member.
    pub fn insert_member(&self, guild: Snowflake, member: Member) {
        self.write().members.insert((guild, member.user.id), member);
    }

    /// Remove a guild member.
    pub fn remove_member(&self, guild: Snowflake, user: Snowflake) {
        self.write().members.remove(&(guild, user));
    }

    /// Look up a cached member.
    #[must_use]
    pub fn member(&self, guild: Snowflake, user: Snowflake) -> Option<Member> {
        self.read().members.get(&(guild, user)).cloned()
    }

    /// Insert or replace a role.
    pub fn insert_role(&self, guild: Snowflake, role: Role) {
        self.write().roles.insert((guild, role.id), role);
    }

    /// Look up a cached role.
    #[must_use]
    pub fn role(&self, guild: Snowflake, role: Snowflake) -> Option<Role> {
        self.read().roles.get(&(guild, role)).cloned()
    }

    /// Record the current user's effective permissions in a guild.
    pub fn set_guild_permissions(&self, guild: Snowflake, permissions: Permissions) {
        self.write().guild_permissions.insert(guild, permissions);
    }

    /// The current user's effective permissions in a guild, if known.
    #[must_use]
    pub fn guild_permissions(&self, guild: Snowflake) -> Option<Permissions> {
        self.read().guild_permissions.get(&guild).copied()
    }

    /// Record the current user's effective permissions in a channel.
    pub fn set_channel_permissions(&self, channel: Snowflake, permissions: Permissions) {
        self.write().channel_permissions.insert(channel, permissions);
    }

    /// The current user's effective permissions in a channel, if known.
    #[must_use]
    pub fn channel_permissions(&self, channel: Snowflake) -> Option<Permissions> {
        self.read().channel_permissions.get(&channel).copied()
    }

    /// Record which guild a channel belongs to.
    pub fn set_channel_guild(&self, channel: Snowflake, guild: Snowflake) {
        self.write().channel_guilds.insert(channel, guild);
    }

    /// The guild a channel belongs to, if known.
    #[must_use]
    pub fn channel_guild(&self, channel: Snowflake) -> Option<Snowflake> {
        self.read().channel_guilds.get(&channel).copied()
    }

    /// Highest role position a member holds, if the member and their roles
    /// are cached.
    ///
    /// Members whose cached role list is empty sit at position 0
    /// (@everyone).
    #[must_use]
    pub fn highest_role_position(&self, guild: Snowflake, user: Snowflake) -> Option<i64> {
        let store = self.read();
        let member = store.members.get(&(guild, user))?;
        let position = member
            .roles
            .iter()
            .filter_map(|role| store.roles.get(&(guild, *role)))
            .map(|role| role.position)
            .max()
            .unwrap_or(0);
        Some(position)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Store> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Store> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::User;

    fn member(id: u64, roles: &[u64]) -> Member {
        Member {
            user: User {
                id: Snowflake::new(id),
                username: format!("user{id}"),
                global_name: None,
                bot: false,
            },
            nick: None,
            roles: roles.iter().map(|r| Snowflake::new(*r)).collect(),
            joined_at: None,
        }
    }

    #[test]
    fn highest_role_position_takes_the_max() {
        let cache = Cache::new();
        let guild = Snowflake::new(1);
        cache.insert_role(
            guild,
            Role {
                id: Snowflake::new(10),
                name: "low".into(),
                position: 2,
                permissions: Permissions::empty(),
            },
        );
        cache.insert_role(
            guild,
            Role {
                id: Snowflake::new(11),
                name: "high".into(),
                position: 7,
                permissions: Permissions::empty(),
            },
        );
        cache.insert_member(guild, member(100, &[10, 11]));

        assert_eq!(
            cache.highest_role_position(guild, Snowflake::new(100)),
            Some(7)
        );
    }

    #[test]
    fn uncached_member_yields_none() {
        let cache = Cache::new();
        assert_eq!(
            cache.highest_role_position(Snowflake::new(1), Snowflake::new(2)),
            None
        );
    }

    #[test]
    fn roleless_member_sits_at_everyone() {
        let cache = Cache::new();
        let guild = Snowflake::new(1);
        cache.insert_member(guild, member(100, &[]));
        assert_eq!(
            cache.highest_role_position(guild, Snowflake::new(100)),
            Some(0)
        );
    }
}
