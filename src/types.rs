//! Entity records mirrored from Discord's JSON schema.
//!
//! Thin data only: behavior lives on the handles in
//! [`guild`](crate::guild) and [`channel`](crate::channel).

use serde::{Deserialize, Serialize};

use crate::permissions::Permissions;
use crate::snowflake::{Identifiable, Mentionable, Snowflake};

/// Discord user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: Snowflake,

    /// Username
    pub username: String,

    /// Global display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,

    /// Whether this is a bot
    #[serde(default)]
    pub bot: bool,
}

impl Identifiable for User {
    fn id(&self) -> Snowflake {
        self.id
    }
}

impl Mentionable for User {
    fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// Guild member: a user plus their guild-scoped state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// The underlying user
    pub user: User,

    /// Guild-specific nickname
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,

    /// IDs of the roles this member holds
    #[serde(default)]
    pub roles: Vec<Snowflake>,

    /// When the member joined, ISO 8601
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,
}

impl Identifiable for Member {
    fn id(&self) -> Snowflake {
        self.user.id
    }
}

impl Mentionable for Member {
    fn mention(&self) -> String {
        format!("<@{}>", self.user.id)
    }
}

/// Guild role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Role ID
    pub id: Snowflake,

    /// Role name
    pub name: String,

    /// Position in the role list; higher outranks lower
    pub position: i64,

    /// Permission bits granted by this role
    #[serde(default)]
    pub permissions: Permissions,
}

impl Identifiable for Role {
    fn id(&self) -> Snowflake {
        self.id
    }
}

impl Mentionable for Role {
    fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}

/// Guild metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialGuild {
    /// Guild ID
    pub id: Snowflake,

    /// Guild name
    pub name: String,

    /// Icon hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Owner ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Snowflake>,
}

impl Identifiable for PartialGuild {
    fn id(&self) -> Snowflake {
        self.id
    }
}

/// Discord channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Channel ID
    pub id: Snowflake,

    /// Channel type
    #[serde(rename = "type")]
    pub channel_type: i32,

    /// Guild ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,

    /// Channel name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identifiable for Channel {
    fn id(&self) -> Snowflake {
        self.id
    }
}

impl Mentionable for Channel {
    fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

/// Discord message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message ID
    pub id: Snowflake,

    /// Channel ID
    pub channel_id: Snowflake,

    /// Author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,

    /// Message content
    pub content: String,

    /// Timestamp, ISO 8601
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Identifiable for Message {
    fn id(&self) -> Snowflake {
        self.id
    }
}

/// Guild ban entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ban {
    /// Reason the ban was issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// The banned user
    pub user: User,
}

impl Identifiable for Ban {
    fn id(&self) -> Snowflake {
        self.user.id
    }
}
