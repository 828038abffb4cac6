//! Centralized configuration for Marquee.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::fmt;
use std::time::Duration;

use crate::{MarqueeError, RuntimeMode};

/// Default TMDB API base URL.
pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Quiet period a search term must be stable for before it is queried.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Central configuration for all Marquee components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct MarqueeConfig {
    pub tmdb: TmdbConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
}

/// Movie database API configuration.
///
/// The bearer credential is never hard coded; it is supplied through the
/// environment or command line at startup.
#[derive(Clone)]
pub struct TmdbConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Bearer token sent in the `Authorization` header
    pub api_token: Option<String>,
    /// Optional per-request timeout (None = wait for the server)
    pub request_timeout: Option<Duration>,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            api_token: None,
            request_timeout: None,
            user_agent: "marquee/0.1.0",
        }
    }
}

impl fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Search session behavior.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// How long the search term must be stable before a request is issued
    pub debounce_window: Duration,
    /// Sort order used for the discover listing shown for an empty term
    pub discover_sort: &'static str,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            discover_sort: "popularity.desc",
        }
    }
}

/// Browser sessions not polled for this long are dropped.
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Web server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long a browser's search session survives without requests
    pub session_idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            session_idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
        }
    }
}

impl MarqueeConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Recognized variables: `MARQUEE_TMDB_TOKEN` (falls back to
    /// `TMDB_API_KEY`), `MARQUEE_TMDB_BASE_URL`, `MARQUEE_DEBOUNCE_MS`,
    /// `MARQUEE_REQUEST_TIMEOUT_SECS`, `MARQUEE_HOST`, `MARQUEE_PORT` and
    /// `MARQUEE_SESSION_IDLE_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Unparseable numeric values are ignored and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let token = lookup("MARQUEE_TMDB_TOKEN").or_else(|| lookup("TMDB_API_KEY"));
        config.tmdb.api_token = token.filter(|t| !t.trim().is_empty());

        if let Some(base_url) = lookup("MARQUEE_TMDB_BASE_URL") {
            config.tmdb.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(timeout) = lookup("MARQUEE_REQUEST_TIMEOUT_SECS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.tmdb.request_timeout = Some(Duration::from_secs(seconds));
            }
        }

        if let Some(debounce) = lookup("MARQUEE_DEBOUNCE_MS") {
            if let Ok(millis) = debounce.parse::<u64>() {
                config.search.debounce_window = Duration::from_millis(millis);
            }
        }

        if let Some(host) = lookup("MARQUEE_HOST") {
            config.server.host = host;
        }

        if let Some(port) = lookup("MARQUEE_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.server.port = port;
            }
        }

        if let Some(idle) = lookup("MARQUEE_SESSION_IDLE_SECS") {
            if let Ok(seconds) = idle.parse::<u64>() {
                config.server.session_idle_timeout = Duration::from_secs(seconds.max(1));
            }
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Points at a local address and uses a short debounce window.
    pub fn for_testing() -> Self {
        Self {
            tmdb: TmdbConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                api_token: Some("test-token".to_string()),
                ..Default::default()
            },
            search: SearchConfig {
                debounce_window: Duration::from_millis(50),
                ..Default::default()
            },
            server: ServerConfig {
                port: 0,
                ..Default::default()
            },
        }
    }

    /// Checks that the configuration is usable in the given runtime mode.
    ///
    /// # Errors
    ///
    /// - `MarqueeError::Configuration` - Missing credential in production mode
    ///   or a base URL that is not http(s)
    pub fn validate(&self, mode: RuntimeMode) -> Result<(), MarqueeError> {
        if !self.tmdb.base_url.starts_with("http://") && !self.tmdb.base_url.starts_with("https://")
        {
            return Err(MarqueeError::Configuration {
                reason: format!(
                    "TMDB base URL must be http(s), got '{}'",
                    self.tmdb.base_url
                ),
            });
        }

        if mode.is_production() && self.tmdb.api_token.is_none() {
            return Err(MarqueeError::Configuration {
                reason: "TMDB bearer token missing: set MARQUEE_TMDB_TOKEN or use --demo"
                    .to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_values() {
        let config = MarqueeConfig::default();

        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert!(config.tmdb.api_token.is_none());
        assert!(config.tmdb.request_timeout.is_none());
        assert_eq!(config.search.debounce_window, Duration::from_millis(500));
        assert_eq!(config.search.discover_sort, "popularity.desc");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.session_idle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_lookup_overrides() {
        let config = MarqueeConfig::from_lookup(lookup_from(&[
            ("MARQUEE_TMDB_TOKEN", "abc"),
            ("MARQUEE_TMDB_BASE_URL", "http://localhost:8080/3/"),
            ("MARQUEE_DEBOUNCE_MS", "250"),
            ("MARQUEE_REQUEST_TIMEOUT_SECS", "7"),
            ("MARQUEE_PORT", "8081"),
            ("MARQUEE_SESSION_IDLE_SECS", "90"),
        ]));

        assert_eq!(config.tmdb.api_token.as_deref(), Some("abc"));
        assert_eq!(config.tmdb.base_url, "http://localhost:8080/3");
        assert_eq!(config.search.debounce_window, Duration::from_millis(250));
        assert_eq!(config.tmdb.request_timeout, Some(Duration::from_secs(7)));
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.session_idle_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_token_fallback_and_blank_token() {
        let config = MarqueeConfig::from_lookup(lookup_from(&[("TMDB_API_KEY", "legacy")]));
        assert_eq!(config.tmdb.api_token.as_deref(), Some("legacy"));

        let config = MarqueeConfig::from_lookup(lookup_from(&[("MARQUEE_TMDB_TOKEN", "  ")]));
        assert!(config.tmdb.api_token.is_none());
    }

    #[test]
    fn test_invalid_numbers_keep_defaults() {
        let config = MarqueeConfig::from_lookup(lookup_from(&[
            ("MARQUEE_DEBOUNCE_MS", "soon"),
            ("MARQUEE_PORT", "99999"),
        ]));

        assert_eq!(config.search.debounce_window, DEFAULT_DEBOUNCE_WINDOW);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_validate_requires_token_in_production() {
        let config = MarqueeConfig::default();
        assert!(config.validate(RuntimeMode::Production).is_err());
        assert!(config.validate(RuntimeMode::Development).is_ok());

        let config = MarqueeConfig::for_testing();
        assert!(config.validate(RuntimeMode::Production).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_http_base_url() {
        let mut config = MarqueeConfig::for_testing();
        config.tmdb.base_url = "ftp://example.com".to_string();

        let err = config.validate(RuntimeMode::Development).unwrap_err();
        assert!(err.to_string().contains("ftp://example.com"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = MarqueeConfig::for_testing();
        let rendered = format!("{:?}", config.tmdb);

        assert!(!rendered.contains("test-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
