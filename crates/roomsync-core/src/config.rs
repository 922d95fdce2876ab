//! Session and feed configuration.
//!
//! Configuration is plain data with sensible defaults. It is validated once,
//! before the session is started, so that invalid settings surface as a
//! construction failure rather than a misbehaving feed.

use crate::error::ConfigError;

/// Default number of rooms fetched per sync round.
pub const DEFAULT_BATCH_SIZE: u32 = 20;

/// Minimum query length before a profile search goes to the server.
pub const DEFAULT_MIN_SEARCH_QUERY_LEN: usize = 3;

/// Sort key applied by the feed, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Most recent activity first.
    Recency,
    /// Alphabetical by computed room name.
    Name,
}

/// How much of the room list the feed keeps in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyncMode {
    /// Grow the synced range batch by batch until the whole list is known.
    #[default]
    Full,
    /// Only keep the first batch in sync.
    Partial,
}

/// Configuration of the room-list feed opened at session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Name of the feed view, used by the SDK to key its state.
    pub name: String,
    /// Sort order, highest priority first.
    pub sort: Vec<SortKey>,
    /// Page size per sync round.
    pub batch_size: u32,
    /// Full or partial sync.
    pub sync_mode: SyncMode,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            name: "home".to_string(),
            sort: vec![SortKey::Recency, SortKey::Name],
            batch_size: DEFAULT_BATCH_SIZE,
            sync_mode: SyncMode::Full,
        }
    }
}

impl FeedConfig {
    /// Check that the configuration can be handed to the SDK.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyFeedName);
        }
        if self.sort.is_empty() {
            return Err(ConfigError::NoSortKeys);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }
}

/// Top-level session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Room-list feed settings.
    pub feed: FeedConfig,
    /// Queries shorter than this (in characters) never reach the server.
    pub min_search_query_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { feed: FeedConfig::default(), min_search_query_len: DEFAULT_MIN_SEARCH_QUERY_LEN }
    }
}

impl SessionConfig {
    /// Check the whole configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.feed.validate()?;
        if self.min_search_query_len == 0 {
            return Err(ConfigError::ZeroSearchQueryLen);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
        let feed = FeedConfig::default();
        assert_eq!(feed.sort, vec![SortKey::Recency, SortKey::Name]);
        assert_eq!(feed.batch_size, 20);
        assert_eq!(feed.sync_mode, SyncMode::Full);
    }

    #[test]
    fn invalid_feed_settings_are_rejected() {
        let zero_batch = FeedConfig { batch_size: 0, ..FeedConfig::default() };
        assert_eq!(zero_batch.validate(), Err(ConfigError::ZeroBatchSize));

        let unsorted = FeedConfig { sort: Vec::new(), ..FeedConfig::default() };
        assert_eq!(unsorted.validate(), Err(ConfigError::NoSortKeys));

        let unnamed = FeedConfig { name: String::new(), ..FeedConfig::default() };
        assert_eq!(unnamed.validate(), Err(ConfigError::EmptyFeedName));
    }

    #[test]
    fn zero_query_length_is_rejected() {
        let config = SessionConfig { min_search_query_len: 0, ..SessionConfig::default() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSearchQueryLen));
    }
}
