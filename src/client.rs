//! Client wiring: configuration, transport, cache, and entity handles.

use std::sync::Arc;

use crate::cache::Cache;
use crate::channel::ChannelHandle;
use crate::config::Config;
use crate::error::Result;
use crate::guild::GuildHandle;
use crate::snowflake::Snowflake;
use crate::transport::{HttpTransport, Transport};

/// Entry point: owns the transport and the cache, hands out entity handles.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    cache: Cache,
}

impl Client {
    /// Create a client with the production HTTP transport.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(config)?)))
    }

    /// Create a client over a custom transport.
    ///
    /// The seam used by tests to substitute a transport double.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: Cache::new(),
        }
    }

    /// The entity cache read by pre-validators and deferred probes.
    #[must_use]
    pub const fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Handle for a guild.
    #[must_use]
    pub fn guild(&self, id: Snowflake) -> GuildHandle {
        GuildHandle::new(id, Arc::clone(&self.transport), self.cache.clone())
    }

    /// Handle for a guild, parsing the ID from a string.
    pub fn guild_by_id(&self, id: &str) -> Result<GuildHandle> {
        Ok(self.guild(id.parse::<Snowflake>()?))
    }

    /// Handle for a channel.
    #[must_use]
    pub fn channel(&self, id: Snowflake) -> ChannelHandle {
        ChannelHandle::new(id, Arc::clone(&self.transport), self.cache.clone())
    }

    /// Handle for a channel, parsing the ID from a string.
    pub fn channel_by_id(&self, id: &str) -> Result<ChannelHandle> {
        Ok(self.channel(id.parse::<Snowflake>()?))
    }
}
