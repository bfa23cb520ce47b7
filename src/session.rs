use serde::{Deserialize, Serialize};

/// Serializable Last.fm web service session.
///
/// Obtained by exchanging the token from the Last.fm auth callback via
/// [`LastFmClient::get_session`](crate::LastFmClient::get_session). Session
/// keys do not expire, so a stored session can be reused indefinitely until
/// the user revokes access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastFmSession {
    /// The authenticated username
    pub username: String,
    /// Session key passed as `sk` to authenticated methods
    pub session_key: String,
}

impl LastFmSession {
    /// Create a new session with the provided state
    pub fn new(username: &str, session_key: &str) -> Self {
        Self {
            username: username.to_string(),
            session_key: session_key.to_string(),
        }
    }

    /// Check if this session appears to be valid
    ///
    /// This performs basic validation but doesn't guarantee the session
    /// is still active on the server.
    pub fn is_valid(&self) -> bool {
        !self.username.is_empty() && self.session_key.len() == 32
    }

    /// Serialize session to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize session from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
