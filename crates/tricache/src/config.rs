//! Cache configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable read by [`CacheConfig::from_env`] for the capacity
pub const ENV_CAPACITY: &str = "TRICACHE_CAPACITY";

/// Environment variable read by [`CacheConfig::from_env`] for the bucket count
pub const ENV_BUCKETS: &str = "TRICACHE_BUCKETS";

/// Construction parameters for a [`TriCache`](crate::TriCache)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of live entries. Raised to `bucket_count` if smaller.
    pub capacity: usize,

    /// Number of hash buckets; fixed for the cache's lifetime
    pub bucket_count: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 128,
            bucket_count: 101,
        }
    }
}

impl CacheConfig {
    /// Default configuration with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Sets the capacity
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the bucket count
    pub fn bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = bucket_count;
        self
    }

    /// Capacity after the bucket-count floor is applied
    pub fn effective_capacity(&self) -> usize {
        self.capacity.max(self.bucket_count)
    }

    /// Loads configuration from environment variables, falling back to the
    /// defaults for unset ones
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            capacity: read_env(ENV_CAPACITY)?.unwrap_or(defaults.capacity),
            bucket_count: read_env(ENV_BUCKETS)?.unwrap_or(defaults.bucket_count),
        })
    }
}

fn read_env(name: &str) -> Result<Option<usize>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{}={} is not a count", name, raw))),
        Err(_) => Ok(None),
    }
}
