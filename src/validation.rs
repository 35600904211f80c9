//! Synchronous pre-validators.
//!
//! Pure functions over already-cached state, run by entity methods before an
//! action is constructed. A failing validator surfaces as an immediate
//! `Err` from the entity method itself; the doomed network call is never
//! built. Validators only reject what cached state proves impossible: when
//! the relevant state is unknown, the operation proceeds and the server has
//! the final word.

use reqwest::header::HeaderValue;

use crate::error::{Error, Result, ValidationFailure};
use crate::permissions::Permissions;
use crate::snowflake::Snowflake;

/// Longest audit-log reason Discord accepts, in characters.
pub const MAX_AUDIT_REASON_LEN: usize = 512;

/// Longest message content, in characters.
pub const MAX_CONTENT_LEN: usize = 2000;

/// Reject when cached permissions prove the operation cannot succeed.
///
/// `held` is `None` when the current user's permissions for the scope are
/// not cached; nothing can be proven then and the check passes.
/// `ADMINISTRATOR` implies every other permission.
pub fn require_permission(held: Option<Permissions>, required: Permissions) -> Result<()> {
    let Some(held) = held else {
        return Ok(());
    };
    if held.contains(Permissions::ADMINISTRATOR) || held.contains(required) {
        return Ok(());
    }
    Err(Error::Validation(ValidationFailure::MissingPermission {
        required,
    }))
}

/// Reject unless the actor's highest role strictly outranks the target.
///
/// Equal positions reject: Discord treats "can interact" as strictly
/// higher, never equal.
pub fn check_hierarchy(actor_position: i64, target_position: i64) -> Result<()> {
    if actor_position > target_position {
        Ok(())
    } else {
        Err(Error::Validation(ValidationFailure::Hierarchy {
            actor: actor_position,
            target: target_position,
        }))
    }
}

/// Reject a numeric argument outside the endpoint's declared bounds.
pub fn check_range(what: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation(ValidationFailure::OutOfRange {
            what,
            min,
            max,
            value,
        }))
    }
}

/// Reject when an entity is known to belong to a different guild.
///
/// `actual` is `None` when the owning guild is not cached; the check passes.
pub fn check_same_guild(
    what: &'static str,
    expected: Snowflake,
    actual: Option<Snowflake>,
) -> Result<()> {
    match actual {
        Some(guild) if guild != expected => Err(Error::Validation(ValidationFailure::WrongGuild {
            what,
            guild: expected.get(),
        })),
        _ => Ok(()),
    }
}

/// Reject an audit-log reason that is over-long or not representable as a
/// header value.
pub fn check_reason(reason: &str) -> Result<()> {
    let len = reason.chars().count();
    if len > MAX_AUDIT_REASON_LEN {
        return Err(Error::Validation(ValidationFailure::OutOfRange {
            what: "audit reason length",
            min: 0,
            max: MAX_AUDIT_REASON_LEN as i64,
            value: len as i64,
        }));
    }
    if HeaderValue::from_str(reason).is_err() {
        return Err(Error::Validation(ValidationFailure::Malformed(
            "audit reason contains characters not representable in a header".into(),
        )));
    }
    Ok(())
}

/// Reject empty or over-long message content.
pub fn check_content(content: &str) -> Result<()> {
    let len = content.chars().count();
    if len == 0 {
        return Err(Error::Validation(ValidationFailure::Malformed(
            "message content may not be empty".into(),
        )));
    }
    if len > MAX_CONTENT_LEN {
        return Err(Error::Validation(ValidationFailure::OutOfRange {
            what: "message content length",
            min: 1,
            max: MAX_CONTENT_LEN as i64,
            value: len as i64,
        }));
    }
    Ok(())
}
