use chrono::{DateTime, Local};
use record_scrobbler::{ClientConfig, DiscogsClient, LastFmClient, UserDataStore};

/// Everything a command handler needs: API configuration, local storage and
/// the Last.fm user to act as.
pub struct Context {
    pub config: ClientConfig,
    pub store: UserDataStore,
    user: Option<String>,
}

impl Context {
    pub fn new(config: ClientConfig, store: UserDataStore, user: Option<String>) -> Self {
        Self {
            config,
            store,
            user,
        }
    }

    pub fn discogs_client(&self) -> DiscogsClient {
        let http_client = http_client::native::NativeClient::new();
        DiscogsClient::new(Box::new(http_client), self.config.clone())
    }

    /// Client without a session, for the auth flow.
    pub fn lastfm_client(&self) -> LastFmClient {
        let http_client = http_client::native::NativeClient::new();
        LastFmClient::new(Box::new(http_client), self.config.clone())
    }

    /// The user from `--user`, or the only user with a saved session.
    pub fn username(&self) -> Result<String, Box<dyn std::error::Error>> {
        if let Some(user) = &self.user {
            return Ok(user.clone());
        }

        let mut users = self.store.list_saved_users()?;
        match users.len() {
            0 => Err("No saved Last.fm session. Run `record-scrobbler login` first".into()),
            1 => Ok(users.remove(0)),
            _ => Err(format!(
                "Several saved sessions ({}); pick one with --user",
                users.join(", ")
            )
            .into()),
        }
    }

    /// Client authenticated with the saved session of [`Self::username`].
    pub fn authenticated_lastfm_client(&self) -> Result<LastFmClient, Box<dyn std::error::Error>> {
        let username = self.username()?;
        let session = self.store.load_session(&username)?;
        if !session.is_valid() {
            log::warn!("Saved session for {username} looks malformed");
        }
        Ok(self.lastfm_client().with_session(session))
    }
}

/// Format a UNIX timestamp in seconds as local time
pub fn format_timestamp(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{timestamp} (out of range)"))
}

/// Format a timestamp in milliseconds as local time
pub fn format_timestamp_ms(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| format!("{timestamp_ms} (out of range)"))
}
