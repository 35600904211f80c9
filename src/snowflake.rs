//! Snowflake identifiers and the capability traits built on them.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationFailure;

/// A Discord snowflake ID.
///
/// Serialized as a decimal string on the wire (Discord's JSON format), held
/// as a `u64` in memory. The upper 42 bits encode a millisecond timestamp
/// relative to the Discord epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snowflake(u64);

impl Snowflake {
    /// First second of 2015, the Discord epoch, in Unix milliseconds.
    pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

    /// Create a snowflake from a raw ID.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Unix millisecond timestamp at which this ID was generated.
    #[must_use]
    pub const fn timestamp_ms(self) -> u64 {
        (self.0 >> 22) + Self::DISCORD_EPOCH_MS
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Snowflake {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl FromStr for Snowflake {
    type Err = ValidationFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| ValidationFailure::Malformed(format!("invalid snowflake: {s:?}")))
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a snowflake ID as a string or integer")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                value
                    .parse::<u64>()
                    .map(Snowflake)
                    .map_err(|_| E::custom(format!("invalid snowflake: {value:?}")))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Snowflake(value))
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

/// Anything addressable by a snowflake ID.
pub trait Identifiable {
    /// The entity's snowflake ID.
    fn id(&self) -> Snowflake;

    /// Unix millisecond timestamp at which the entity was created.
    fn created_at_ms(&self) -> u64 {
        self.id().timestamp_ms()
    }
}

/// Entities that can be mentioned in message content.
pub trait Mentionable: Identifiable {
    /// The mention string, e.g. `<@80351110224678912>`.
    fn mention(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let id: Snowflake = "80351110224678912".parse().unwrap();
        assert_eq!(id.get(), 80_351_110_224_678_912);
        assert_eq!(id.to_string(), "80351110224678912");
    }

    #[test]
    fn rejects_non_numeric() {
        assert!("not-a-snowflake".parse::<Snowflake>().is_err());
        assert!("-5".parse::<Snowflake>().is_err());
    }

    #[test]
    fn timestamp_is_after_discord_epoch() {
        let id = Snowflake::new(175_928_847_299_117_063);
        // Known reference value from the Discord documentation.
        assert_eq!(id.timestamp_ms(), 1_462_015_105_796);
    }

    #[test]
    fn serde_uses_string_wire_format() {
        let id = Snowflake::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
        let back: Snowflake = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(back, id);
        let numeric: Snowflake = serde_json::from_str("42").unwrap();
        assert_eq!(numeric, id);
    }
}
