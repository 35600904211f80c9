//! Permission bit sets and the named permission lookup.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A set of Discord permissions, one bit per permission.
///
/// Discord serializes permission sets as decimal strings; this type follows
/// the wire format while exposing plain bit operations in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Permissions(u64);

impl Permissions {
    pub const CREATE_INSTANT_INVITE: Self = Permission::CreateInstantInvite.bit();
    pub const KICK_MEMBERS: Self = Permission::KickMembers.bit();
    pub const BAN_MEMBERS: Self = Permission::BanMembers.bit();
    pub const ADMINISTRATOR: Self = Permission::Administrator.bit();
    pub const MANAGE_CHANNELS: Self = Permission::ManageChannels.bit();
    pub const MANAGE_GUILD: Self = Permission::ManageGuild.bit();
    pub const VIEW_CHANNEL: Self = Permission::ViewChannel.bit();
    pub const SEND_MESSAGES: Self = Permission::SendMessages.bit();
    pub const MANAGE_MESSAGES: Self = Permission::ManageMessages.bit();
    pub const READ_MESSAGE_HISTORY: Self = Permission::ReadMessageHistory.bit();
    pub const MENTION_EVERYONE: Self = Permission::MentionEveryone.bit();
    pub const MANAGE_NICKNAMES: Self = Permission::ManageNicknames.bit();
    pub const MANAGE_ROLES: Self = Permission::ManageRoles.bit();
    pub const MODERATE_MEMBERS: Self = Permission::ModerateMembers.bit();

    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Get the raw bits.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Check whether every bit of `other` is present in this set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check whether this set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Permissions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for offset in 0..64 {
            if self.0 & (1 << offset) == 0 {
                continue;
            }
            if !first {
                f.write_str(" | ")?;
            }
            first = false;
            match Permission::from_offset(offset) {
                Some(known) => write!(f, "{known}")?,
                None => write!(f, "bit {offset}")?,
            }
        }
        if first {
            f.write_str("(none)")?;
        }
        Ok(())
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a permission bit set as a string or integer")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                value
                    .parse::<u64>()
                    .map(Permissions)
                    .map_err(|_| E::custom(format!("invalid permission bits: {value:?}")))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Permissions(value))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

/// A single named permission with its bit offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Permission {
    CreateInstantInvite = 0,
    KickMembers = 1,
    BanMembers = 2,
    Administrator = 3,
    ManageChannels = 4,
    ManageGuild = 5,
    ViewChannel = 10,
    SendMessages = 11,
    ManageMessages = 13,
    ReadMessageHistory = 16,
    MentionEveryone = 17,
    ManageNicknames = 27,
    ManageRoles = 28,
    ModerateMembers = 40,
}

impl Permission {
    /// Bit offset within the permission set.
    #[must_use]
    pub const fn offset(self) -> u8 {
        self as u8
    }

    /// The single-bit set for this permission.
    #[must_use]
    pub const fn bit(self) -> Permissions {
        Permissions(1 << self as u64)
    }

    /// Resolve a bit offset to a named permission.
    #[must_use]
    pub const fn from_offset(offset: u8) -> Option<Self> {
        Some(match offset {
            0 => Self::CreateInstantInvite,
            1 => Self::KickMembers,
            2 => Self::BanMembers,
            3 => Self::Administrator,
            4 => Self::ManageChannels,
            5 => Self::ManageGuild,
            10 => Self::ViewChannel,
            11 => Self::SendMessages,
            13 => Self::ManageMessages,
            16 => Self::ReadMessageHistory,
            17 => Self::MentionEveryone,
            27 => Self::ManageNicknames,
            28 => Self::ManageRoles,
            40 => Self::ModerateMembers,
            _ => return None,
        })
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateInstantInvite => "CREATE_INSTANT_INVITE",
            Self::KickMembers => "KICK_MEMBERS",
            Self::BanMembers => "BAN_MEMBERS",
            Self::Administrator => "ADMINISTRATOR",
            Self::ManageChannels => "MANAGE_CHANNELS",
            Self::ManageGuild => "MANAGE_GUILD",
            Self::ViewChannel => "VIEW_CHANNEL",
            Self::SendMessages => "SEND_MESSAGES",
            Self::ManageMessages => "MANAGE_MESSAGES",
            Self::ReadMessageHistory => "READ_MESSAGE_HISTORY",
            Self::MentionEveryone => "MENTION_EVERYONE",
            Self::ManageNicknames => "MANAGE_NICKNAMES",
            Self::ManageRoles => "MANAGE_ROLES",
            Self::ModerateMembers => "MODERATE_MEMBERS",
        };
        f.write_str(name)
    }
}
