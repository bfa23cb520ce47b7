//! Client configuration.

pub const DISCOGS_API_URL: &str = "https://api.discogs.com";
pub const LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";
pub const LASTFM_AUTH_URL: &str = "https://www.last.fm/api/auth/";

const USER_AGENT: &str = concat!("RecordScrobbler/", env!("CARGO_PKG_VERSION"));

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (set to 0 to disable retries)
    pub max_retries: u32,
    /// Base delay for exponential backoff (in seconds)
    pub base_delay: u64,
    /// Maximum delay cap (in seconds)
    pub max_delay: u64,
    /// Whether retries are enabled at all
    pub enabled: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: 5,
            max_delay: 300, // 5 minutes
            enabled: true,
        }
    }
}

impl RetryConfig {
    /// Create a config with retries disabled
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a config with custom retry count
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            enabled: max_retries > 0,
            ..Default::default()
        }
    }

    /// Create a config with custom delays
    pub fn with_delays(base_delay: u64, max_delay: u64) -> Self {
        Self {
            base_delay,
            max_delay,
            ..Default::default()
        }
    }
}

/// Credentials, endpoints and retry policy shared by the API clients.
///
/// # Examples
///
/// ```rust
/// use record_scrobbler::{ClientConfig, RetryConfig};
///
/// let config = ClientConfig::new()
///     .with_discogs_token("discogs-token")
///     .with_lastfm_keys("0123456789abcdef0123456789abcdef", "secret")
///     .with_retry_config(RetryConfig::with_retries(5));
///
/// assert_eq!(config.retry.max_retries, 5);
/// assert!(config.lastfm_api_key.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Discogs personal access token
    pub discogs_token: Option<String>,
    /// Last.fm API key
    pub lastfm_api_key: Option<String>,
    /// Last.fm shared secret used to sign calls
    pub lastfm_secret: Option<String>,
    /// Base URL of the Discogs REST API
    pub discogs_base_url: String,
    /// Endpoint of the Last.fm web service
    pub lastfm_base_url: String,
    /// Sent with every request; Discogs rejects requests without one
    pub user_agent: String,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            discogs_token: None,
            lastfm_api_key: None,
            lastfm_secret: None,
            discogs_base_url: DISCOGS_API_URL.to_string(),
            lastfm_base_url: LASTFM_API_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config with retries disabled
    pub fn with_retries_disabled() -> Self {
        Self {
            retry: RetryConfig::disabled(),
            ..Default::default()
        }
    }

    pub fn with_discogs_token(mut self, token: &str) -> Self {
        self.discogs_token = Some(token.to_string());
        self
    }

    pub fn with_lastfm_keys(mut self, api_key: &str, secret: &str) -> Self {
        self.lastfm_api_key = Some(api_key.to_string());
        self.lastfm_secret = Some(secret.to_string());
        self
    }

    /// Point the Discogs client somewhere else (tests, proxies)
    pub fn with_discogs_base_url(mut self, base_url: &str) -> Self {
        self.discogs_base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Point the Last.fm client somewhere else (tests, proxies)
    pub fn with_lastfm_base_url(mut self, base_url: &str) -> Self {
        self.lastfm_base_url = base_url.to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Set custom retry configuration
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry = retry_config;
        self
    }

    /// Set custom retry count
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self.retry.enabled = max_retries > 0;
        self
    }
}
