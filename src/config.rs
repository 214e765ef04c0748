//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.
//!
//! When `SERVICE_NAME` is set, every variable is first looked up with that
//! name as a prefix (`FOO_PORT`), then without it (`PORT`). Settings nested
//! under a section also accept their bare name, so `CACHE_TTL_SECONDS` can be
//! given as `TTL_SECONDS`.

use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

/// Default entry TTL in seconds (30 minutes)
pub const DEFAULT_TTL_SECONDS: u64 = 1800;
/// Default eviction sweep interval in milliseconds
pub const DEFAULT_EVICTION_INTERVAL_MS: u64 = 1000;

/// TTL and eviction settings shared by both backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entry TTL in seconds; 0 lets the backend pick (default for the
    /// in-memory store, no expiry for Redis)
    pub ttl_seconds: u64,
    /// Sweep interval of the in-memory store in milliseconds
    pub eviction_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            eviction_interval_ms: DEFAULT_EVICTION_INTERVAL_MS,
        }
    }
}

/// Connection settings for the Redis backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    /// Address as `host:port`
    pub host: String,
    pub username: String,
    pub password: String,
    /// Logical database index
    pub db: i64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost:6379".to_string(),
            username: String::new(),
            password: String::new(),
            db: 0,
        }
    }
}

impl RedisConfig {
    /// Builds a `redis://` connection URL from the configured parts.
    pub fn connection_url(&self) -> String {
        let auth = match (self.username.is_empty(), self.password.is_empty()) {
            (true, true) => String::new(),
            (true, false) => format!(":{}@", self.password),
            (false, true) => format!("{}@", self.username),
            (false, false) => format!("{}:{}@", self.username, self.password),
        };
        format!("redis://{}{}/{}", auth, self.host, self.db)
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Enables debug-level logging
    pub debug: bool,
    /// Interface to bind
    pub host: String,
    /// HTTP server port
    pub port: u16,
    /// Colored log output
    pub log_color: bool,
    /// Selects the Redis backend instead of the in-memory store
    pub use_redis: bool,
    pub cache: CacheConfig,
    pub redis: RedisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_color: true,
            use_redis: false,
            cache: CacheConfig::default(),
            redis: RedisConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from the process environment.
    ///
    /// # Environment Variables
    /// - `SERVICE_NAME` - Optional prefix for all other variables
    /// - `DEBUG` - Debug logging (default: false)
    /// - `HOST` - Bind address (default: 0.0.0.0)
    /// - `PORT` - HTTP server port (default: 8080)
    /// - `LOG_COLOR` - ANSI colors in logs (default: true)
    /// - `USE_REDIS` - Use the Redis backend (default: false)
    /// - `CACHE_TTL_SECONDS` - Entry TTL (default: 1800)
    /// - `CACHE_EVICTION_INTERVAL_MS` - Sweep interval (default: 1000)
    /// - `REDIS_HOST`, `REDIS_USERNAME`, `REDIS_PASSWORD`, `REDIS_DB`
    pub fn from_env() -> Result<Self, ConfigError> {
        let prefix = env::var("SERVICE_NAME").ok().filter(|name| !name.is_empty());
        Self::from_env_with_prefix(prefix.as_deref())
    }

    /// Loads the configuration using an explicit variable prefix.
    pub fn from_env_with_prefix(prefix: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_lookup(prefix, |name| env::var(name).ok())
    }

    /// Loads the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(prefix: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = Source {
            prefix: prefix.map(str::to_uppercase),
            lookup,
        };
        let defaults = Config::default();

        Ok(Self {
            debug: source.flag(None, "DEBUG", defaults.debug)?,
            host: source.parsed(None, "HOST", defaults.host)?,
            port: source.parsed(None, "PORT", defaults.port)?,
            log_color: source.flag(None, "LOG_COLOR", defaults.log_color)?,
            use_redis: source.flag(None, "USE_REDIS", defaults.use_redis)?,
            cache: CacheConfig {
                ttl_seconds: source.parsed(
                    Some("CACHE"),
                    "TTL_SECONDS",
                    defaults.cache.ttl_seconds,
                )?,
                eviction_interval_ms: source.parsed(
                    Some("CACHE"),
                    "EVICTION_INTERVAL_MS",
                    defaults.cache.eviction_interval_ms,
                )?,
            },
            redis: RedisConfig {
                host: source.parsed(Some("REDIS"), "HOST", defaults.redis.host)?,
                username: source.parsed(Some("REDIS"), "USERNAME", defaults.redis.username)?,
                password: source.parsed(Some("REDIS"), "PASSWORD", defaults.redis.password)?,
                db: source.parsed(Some("REDIS"), "DB", defaults.redis.db)?,
            },
        })
    }

    /// Address the HTTP server binds to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// == Variable Source ==
struct Source<F> {
    prefix: Option<String>,
    lookup: F,
}

impl<F> Source<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Returns the first variable found among the candidate names.
    fn find(&self, section: Option<&str>, name: &str) -> Option<(String, String)> {
        let full = match section {
            Some(section) => format!("{}_{}", section, name),
            None => name.to_string(),
        };

        let mut candidates = Vec::with_capacity(3);
        if let Some(prefix) = &self.prefix {
            candidates.push(format!("{}_{}", prefix, full));
        }
        candidates.push(full);
        // Redis settings keep their section, `HOST` alone means the server bind address
        if section == Some("CACHE") {
            candidates.push(name.to_string());
        }

        candidates
            .into_iter()
            .find_map(|key| (self.lookup)(&key).map(|value| (key, value)))
    }

    fn parsed<T: FromStr>(
        &self,
        section: Option<&str>,
        name: &str,
        default: T,
    ) -> Result<T, ConfigError> {
        match self.find(section, name) {
            Some((key, value)) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value }),
            None => Ok(default),
        }
    }

    fn flag(&self, section: Option<&str>, name: &str, default: bool) -> Result<bool, ConfigError> {
        match self.find(section, name) {
            Some((key, value)) => parse_bool(&value).ok_or(ConfigError::Invalid { key, value }),
            None => Ok(default),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
