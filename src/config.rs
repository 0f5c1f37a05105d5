//! Configuration Module
//!
//! Handles loading client configuration from environment variables.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{LookupCache, MapLookupCache, TimedLookupCache};

/// Which lookup cache a configured client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStrategy {
    /// Every lookup goes to the master
    #[default]
    None,
    /// Unbounded cache, entries live until invalidated
    Map,
    /// Entries expire after `cache_ttl_secs`
    Timed,
}

impl CacheStrategy {
    /// Parses `none`, `map` or `timed`, case-insensitively.
    ///
    /// Unknown values fall back to [`CacheStrategy::None`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "map" => CacheStrategy::Map,
            "timed" | "ttl" => CacheStrategy::Timed,
            _ => CacheStrategy::None,
        }
    }
}

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the master
    pub master_url: String,
    /// Lookup cache strategy
    pub lookup_cache: CacheStrategy,
    /// Freshness window in seconds for the timed cache
    pub cache_ttl_secs: u64,
    /// Per-request timeout in seconds applied to the HTTP transport
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Creates a new ClientConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `WEED_MASTER_URL` - Master base address (default: http://localhost:9333)
    /// - `WEED_LOOKUP_CACHE` - `none`, `map` or `timed` (default: none)
    /// - `WEED_LOOKUP_CACHE_TTL` - Timed cache window in seconds (default: 60)
    /// - `WEED_REQUEST_TIMEOUT` - Request timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            master_url: env::var("WEED_MASTER_URL").unwrap_or(defaults.master_url),
            lookup_cache: env::var("WEED_LOOKUP_CACHE")
                .map(|v| CacheStrategy::from_name(&v))
                .unwrap_or(defaults.lookup_cache),
            cache_ttl_secs: env::var("WEED_LOOKUP_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),
            request_timeout_secs: env::var("WEED_REQUEST_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    /// Builds the configured lookup cache, if any.
    pub fn build_cache(&self) -> Option<Arc<dyn LookupCache>> {
        match self.lookup_cache {
            CacheStrategy::None => None,
            CacheStrategy::Map => Some(Arc::new(MapLookupCache::new())),
            CacheStrategy::Timed => Some(Arc::new(TimedLookupCache::new(Duration::from_secs(
                self.cache_ttl_secs,
            )))),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            master_url: "http://localhost:9333".to_string(),
            lookup_cache: CacheStrategy::None,
            cache_ttl_secs: 60,
            request_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.master_url, "http://localhost:9333");
        assert_eq!(config.lookup_cache, CacheStrategy::None);
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("WEED_MASTER_URL");
        env::remove_var("WEED_LOOKUP_CACHE");
        env::remove_var("WEED_LOOKUP_CACHE_TTL");
        env::remove_var("WEED_REQUEST_TIMEOUT");

        let config = ClientConfig::from_env();
        assert_eq!(config.master_url, "http://localhost:9333");
        assert_eq!(config.lookup_cache, CacheStrategy::None);
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_cache_strategy_from_name() {
        assert_eq!(CacheStrategy::from_name("map"), CacheStrategy::Map);
        assert_eq!(CacheStrategy::from_name(" Timed "), CacheStrategy::Timed);
        assert_eq!(CacheStrategy::from_name("ttl"), CacheStrategy::Timed);
        assert_eq!(CacheStrategy::from_name("none"), CacheStrategy::None);
        assert_eq!(CacheStrategy::from_name("lru"), CacheStrategy::None);
    }

    #[test]
    fn test_build_cache() {
        let mut config = ClientConfig::default();
        assert!(config.build_cache().is_none());

        config.lookup_cache = CacheStrategy::Map;
        assert!(config.build_cache().is_some());

        config.lookup_cache = CacheStrategy::Timed;
        let cache = config.build_cache().unwrap();
        let location = crate::models::Location::new("localhost:8080", "127.0.0.1:8080");
        cache.set_location(1, &[location.clone()]);
        assert_eq!(cache.lookup(1), Some(vec![location]));
    }
}
