//! Client for the Last.fm web service (API 2.0).
//!
//! Covers the calls a scrobbling application needs: the web auth flow
//! (auth URL, token to session exchange), `user.getInfo` and batched
//! `track.scrobble`. Authenticated calls are signed as described in
//! <https://www.last.fm/api/webauth#_6-sign-your-calls>.

use crate::config::{ClientConfig, LASTFM_AUTH_URL};
use crate::r#trait::Scrobbler;
use crate::retry::retry_operation;
use crate::session::LastFmSession;
use crate::timestamps::{synthesize_timestamps, ScrobbleTrack};
use crate::{Result, ScrobblerError};
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Last.fm accepts at most this many scrobbles per `track.scrobble` call.
pub const MAX_SCROBBLES_PER_REQUEST: usize = 50;

/// Parameters that take no part in the call signature.
const UNSIGNED_PARAMS: [&str; 2] = ["format", "callback"];

/// Compute the `api_sig` for a set of call parameters.
///
/// Parameters are ordered by name, concatenated as `name` + `value`, the
/// shared secret is appended and the result is MD5 hashed.
///
/// ```rust
/// use std::collections::BTreeMap;
/// use record_scrobbler::lastfm::sign_params;
///
/// let mut params = BTreeMap::new();
/// params.insert("method".to_string(), "auth.getSession".to_string());
/// params.insert("format".to_string(), "json".to_string());
/// let signature = sign_params(&params, "secret");
/// assert_eq!(signature.len(), 32);
/// ```
pub fn sign_params(params: &BTreeMap<String, String>, secret: &str) -> String {
    let mut payload = String::new();
    for (name, value) in params {
        if UNSIGNED_PARAMS.contains(&name.as_str()) {
            continue;
        }
        payload.push_str(name);
        payload.push_str(value);
    }
    payload.push_str(secret);

    format!("{:x}", md5::compute(payload.as_bytes()))
}

fn encode_form(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

// ================================================================================================
// SCROBBLE BATCHES
// ================================================================================================

/// A track with the time playback started.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimedTrack {
    pub title: String,
    /// UNIX timestamp in seconds, UTC
    pub timestamp: u64,
}

/// Tracks by one artist, optionally from one album, submitted together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScrobbleBatch {
    pub artist: String,
    pub album: Option<String>,
    pub tracks: Vec<TimedTrack>,
}

impl ScrobbleBatch {
    pub fn new(artist: &str, album: Option<&str>) -> Self {
        Self {
            artist: artist.to_string(),
            album: album.filter(|a| !a.is_empty()).map(str::to_string),
            tracks: Vec::new(),
        }
    }

    /// A batch of a single track played at `timestamp`.
    pub fn single(artist: &str, track: &str, album: Option<&str>, timestamp: u64) -> Self {
        let mut batch = Self::new(artist, album);
        batch.push(track, timestamp);
        batch
    }

    /// A batch of `tracks` played back to back, the last one ending at `now`.
    pub fn from_tracks(
        artist: &str,
        album: Option<&str>,
        tracks: &[ScrobbleTrack],
        now: u64,
    ) -> Self {
        let mut batch = Self::new(artist, album);
        for (track, timestamp) in tracks.iter().zip(synthesize_timestamps(tracks, now)) {
            batch.push(&track.title, timestamp);
        }
        batch
    }

    pub fn push(&mut self, title: &str, timestamp: u64) {
        self.tracks.push(TimedTrack {
            title: title.to_string(),
            timestamp,
        });
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Split into batches that fit in one request each.
    pub fn chunks(&self) -> Vec<ScrobbleBatch> {
        self.tracks
            .chunks(MAX_SCROBBLES_PER_REQUEST)
            .map(|tracks| ScrobbleBatch {
                artist: self.artist.clone(),
                album: self.album.clone(),
                tracks: tracks.to_vec(),
            })
            .collect()
    }

    /// Indexed `track.scrobble` parameters: `artist[i]`, `track[i]`,
    /// `timestamp[i]` and, when known, `album[i]`.
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        for (i, track) in self.tracks.iter().enumerate() {
            params.insert(format!("artist[{i}]"), self.artist.clone());
            params.insert(format!("track[{i}]"), track.title.clone());
            params.insert(format!("timestamp[{i}]"), track.timestamp.to_string());
            if let Some(album) = &self.album {
                params.insert(format!("album[{i}]"), album.clone());
            }
        }
        params
    }
}

/// How many scrobbles Last.fm accepted and ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrobbleSummary {
    pub accepted: u32,
    pub ignored: u32,
}

impl ScrobbleSummary {
    pub fn merge(self, other: ScrobbleSummary) -> Self {
        Self {
            accepted: self.accepted + other.accepted,
            ignored: self.ignored + other.ignored,
        }
    }
}

/// Public profile data from `user.getInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub url: String,
    pub playcount: u64,
}

// ================================================================================================
// RESPONSE PARSING
// ================================================================================================

/// Last.fm encodes numbers inconsistently, sometimes as strings.
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_str<'a>(value: &'a Value, pointer: &str) -> Result<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| ScrobblerError::Parse(format!("Missing {pointer} in Last.fm response")))
}

/// Parse a response body, turning Last.fm error payloads into errors.
pub fn parse_response(body: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ScrobblerError::Parse(format!("Invalid Last.fm response: {e}")))?;

    if let Some(code) = value.get("error").and_then(as_u64) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        let code = u32::try_from(code).unwrap_or(u32::MAX);
        return Err(ScrobblerError::from_lastfm_code(code, message));
    }

    Ok(value)
}

pub fn parse_scrobble_response(body: &str) -> Result<ScrobbleSummary> {
    let value = parse_response(body)?;
    let attr = value
        .pointer("/scrobbles/@attr")
        .ok_or_else(|| ScrobblerError::Parse("Missing scrobbles/@attr".to_string()))?;

    let count = |name: &str| {
        attr.get(name)
            .and_then(as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    };

    Ok(ScrobbleSummary {
        accepted: count("accepted"),
        ignored: count("ignored"),
    })
}

pub fn parse_session_response(body: &str) -> Result<LastFmSession> {
    let value = parse_response(body)?;
    Ok(LastFmSession::new(
        as_str(&value, "/session/name")?,
        as_str(&value, "/session/key")?,
    ))
}

pub fn parse_user_info_response(body: &str) -> Result<UserInfo> {
    let value = parse_response(body)?;
    Ok(UserInfo {
        name: as_str(&value, "/user/name")?.to_string(),
        url: as_str(&value, "/user/url").unwrap_or_default().to_string(),
        playcount: value
            .pointer("/user/playcount")
            .and_then(as_u64)
            .unwrap_or(0),
    })
}

// ================================================================================================
// CLIENT
// ================================================================================================

/// Async Last.fm web service client over any [`HttpClient`].
///
/// # Examples
///
/// ```rust,no_run
/// use record_scrobbler::{ClientConfig, LastFmClient, LastFmSession, Result, ScrobbleBatch};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let config = ClientConfig::new().with_lastfm_keys("api-key", "secret");
///     let client = LastFmClient::new(
///         Box::new(http_client::native::NativeClient::new()),
///         config,
///     )
///     .with_session(LastFmSession::new("user", "session-key"));
///
///     let batch = ScrobbleBatch::single("Radiohead", "Airbag", Some("OK Computer"), 1_700_000_000);
///     let summary = client.scrobble_batch(&batch).await?;
///     println!("{} accepted", summary.accepted);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct LastFmClient {
    client: Arc<dyn HttpClient + Send + Sync>,
    config: ClientConfig,
    session: Option<LastFmSession>,
}

impl LastFmClient {
    pub fn new(client: Box<dyn HttpClient + Send + Sync>, config: ClientConfig) -> Self {
        Self {
            client: Arc::from(client),
            config,
            session: None,
        }
    }

    pub fn with_session(mut self, session: LastFmSession) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&LastFmSession> {
        self.session.as_ref()
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .lastfm_api_key
            .as_deref()
            .ok_or_else(|| ScrobblerError::Config("Last.fm API key is not configured".to_string()))
    }

    fn secret(&self) -> Result<&str> {
        self.config
            .lastfm_secret
            .as_deref()
            .ok_or_else(|| ScrobblerError::Config("Last.fm API secret is not configured".to_string()))
    }

    fn session_key(&self) -> Result<&str> {
        self.session
            .as_ref()
            .map(|s| s.session_key.as_str())
            .ok_or_else(|| ScrobblerError::Auth("Not logged in to Last.fm".to_string()))
    }

    /// Where to send the user to grant access. Last.fm redirects back to
    /// `callback` (or the application's registered callback) with a `token`.
    pub fn auth_url(&self, callback: Option<&str>) -> Result<String> {
        let mut params = vec![("api_key", self.api_key()?.to_string())];
        if let Some(cb) = callback {
            params.push(("cb", cb.to_string()));
        }
        Url::parse_with_params(LASTFM_AUTH_URL, &params)
            .map(String::from)
            .map_err(|e| ScrobblerError::Config(format!("Invalid auth URL: {e}")))
    }

    /// Add `method`, `api_key`, `format` and the signature to `params`.
    fn prepare(
        &self,
        method_name: &str,
        mut params: BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>> {
        params.insert("method".to_string(), method_name.to_string());
        params.insert("api_key".to_string(), self.api_key()?.to_string());
        let signature = sign_params(&params, self.secret()?);
        params.insert("api_sig".to_string(), signature);
        params.insert("format".to_string(), "json".to_string());
        Ok(params)
    }

    async fn call(
        &self,
        http_method: Method,
        method_name: &str,
        params: BTreeMap<String, String>,
    ) -> Result<String> {
        let params = self.prepare(method_name, params)?;
        let form = encode_form(&params);

        let request = match http_method {
            Method::Post => {
                let url = Url::parse(&self.config.lastfm_base_url)
                    .map_err(|e| ScrobblerError::Config(format!("Invalid Last.fm URL: {e}")))?;
                let mut request = Request::new(Method::Post, url);
                request.insert_header("Content-Type", "application/x-www-form-urlencoded");
                request.set_body(form);
                request
            }
            _ => {
                let url = Url::parse(&format!("{}?{}", self.config.lastfm_base_url, form))
                    .map_err(|e| ScrobblerError::Config(format!("Invalid Last.fm URL: {e}")))?;
                Request::new(http_method, url)
            }
        };

        self.send(request, method_name).await
    }

    async fn send(&self, mut request: Request, method_name: &str) -> Result<String> {
        request.insert_header("User-Agent", self.config.user_agent.as_str());

        log::debug!("Calling Last.fm {method_name}");
        let request_start = std::time::Instant::now();

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| ScrobblerError::Http(e.to_string()))?;

        let status: u16 = response.status().into();
        log::debug!(
            "Last.fm responded {} for {} in {}ms",
            status,
            method_name,
            request_start.elapsed().as_millis()
        );

        if status == 429 {
            return Err(ScrobblerError::RateLimit { retry_after: 60 });
        }

        let body = response
            .body_string()
            .await
            .map_err(|e| ScrobblerError::Http(e.to_string()))?;

        // Error payloads come with 4xx statuses; let a JSON body speak first.
        if !response.status().is_success() {
            if serde_json::from_str::<Value>(&body).is_ok() {
                parse_response(&body)?;
            }
            return Err(ScrobblerError::Http(format!(
                "Last.fm returned {status} for {method_name}"
            )));
        }

        Ok(body)
    }

    /// Exchange the token from the auth callback for a session.
    pub async fn get_session(&self, token: &str) -> Result<LastFmSession> {
        let mut params = BTreeMap::new();
        params.insert("token".to_string(), token.to_string());

        let body = self.call(Method::Get, "auth.getSession", params).await?;
        let session = parse_session_response(&body)?;
        log::info!("Obtained Last.fm session for {}", session.username);
        Ok(session)
    }

    /// Profile of `username`, or of the session's user when `None`.
    pub async fn get_user_info(&self, username: Option<&str>) -> Result<UserInfo> {
        let mut params = BTreeMap::new();
        match username {
            Some(user) => {
                params.insert("user".to_string(), user.to_string());
            }
            None => {
                params.insert("sk".to_string(), self.session_key()?.to_string());
            }
        }

        let body = self.call(Method::Get, "user.getInfo", params).await?;
        parse_user_info_response(&body)
    }

    async fn scrobble_chunk(&self, chunk: &ScrobbleBatch) -> Result<ScrobbleSummary> {
        let mut params = chunk.to_params();
        params.insert("sk".to_string(), self.session_key()?.to_string());

        let body = self.call(Method::Post, "track.scrobble", params).await?;
        parse_scrobble_response(&body)
    }

    /// Submit every track in `batch`, in requests of at most
    /// [`MAX_SCROBBLES_PER_REQUEST`] scrobbles.
    pub async fn scrobble_batch(&self, batch: &ScrobbleBatch) -> Result<ScrobbleSummary> {
        if batch.is_empty() {
            return Err(ScrobblerError::EmptyBatch);
        }
        self.session_key()?;

        let mut summary = ScrobbleSummary::default();
        let mut submitted = 0;
        for chunk in batch.chunks() {
            let result = retry_operation(&self.config.retry, "track.scrobble", || {
                self.scrobble_chunk(&chunk)
            })
            .await;

            match result {
                Ok(chunk_summary) => {
                    summary = summary.merge(chunk_summary);
                    submitted += chunk.len();
                }
                Err(e) if submitted > 0 => {
                    log::warn!(
                        "Scrobbling {} stopped after {} of {} tracks: {}",
                        batch.artist,
                        submitted,
                        batch.len(),
                        e
                    );
                    return Err(ScrobblerError::PartialScrobble {
                        submitted,
                        summary,
                        source: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "Scrobbled {} tracks by {}: {} accepted, {} ignored",
            batch.len(),
            batch.artist,
            summary.accepted,
            summary.ignored
        );
        Ok(summary)
    }
}

#[async_trait(?Send)]
impl Scrobbler for LastFmClient {
    async fn scrobble_batch(&self, batch: &ScrobbleBatch) -> Result<ScrobbleSummary> {
        LastFmClient::scrobble_batch(self, batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_ignores_format() {
        let mut params = BTreeMap::new();
        params.insert("api_key".to_string(), "key".to_string());
        params.insert("method".to_string(), "auth.getSession".to_string());
        params.insert("token".to_string(), "tok".to_string());

        let expected = format!(
            "{:x}",
            md5::compute("api_keykeymethodauth.getSessiontokentoksecret")
        );
        assert_eq!(sign_params(&params, "secret"), expected);

        params.insert("format".to_string(), "json".to_string());
        assert_eq!(sign_params(&params, "secret"), expected);
    }

    #[test]
    fn test_batch_params() {
        let tracks = vec![
            ScrobbleTrack::new("Airbag", Some("4:44")),
            ScrobbleTrack::new("Paranoid Android", Some("6:23")),
        ];
        let batch = ScrobbleBatch::from_tracks("Radiohead", Some("OK Computer"), &tracks, 10_000);
        let params = batch.to_params();

        assert_eq!(params["artist[0]"], "Radiohead");
        assert_eq!(params["track[1]"], "Paranoid Android");
        assert_eq!(params["timestamp[1]"], "10000");
        assert_eq!(params["timestamp[0]"], (10_000 - 383).to_string());
        assert_eq!(params["album[0]"], "OK Computer");
        assert_eq!(params.len(), 8);
    }

    #[test]
    fn test_batch_without_album() {
        let batch = ScrobbleBatch::single("Can", "Vitamin C", Some(""), 5);
        assert_eq!(batch.album, None);
        assert!(!batch.to_params().contains_key("album[0]"));
    }

    #[test]
    fn test_chunks() {
        let mut batch = ScrobbleBatch::new("Artist", None);
        for i in 0..(MAX_SCROBBLES_PER_REQUEST as u64 * 2 + 1) {
            batch.push(&format!("Track {i}"), i);
        }
        let chunks = batch.chunks();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), MAX_SCROBBLES_PER_REQUEST);
        assert_eq!(chunks[2].len(), 1);
        assert_eq!(chunks[2].tracks[0].title, "Track 100");
    }

    #[test]
    fn test_parse_scrobble_response() {
        let body = r#"{"scrobbles":{"scrobble":[],"@attr":{"accepted":2,"ignored":"1"}}}"#;
        assert_eq!(
            parse_scrobble_response(body).unwrap(),
            ScrobbleSummary {
                accepted: 2,
                ignored: 1
            }
        );
    }

    #[test]
    fn test_parse_error_payloads() {
        assert!(matches!(
            parse_scrobble_response(r#"{"error":9,"message":"Invalid session key"}"#),
            Err(ScrobblerError::Auth(_))
        ));
        assert!(matches!(
            parse_scrobble_response(r#"{"error":11,"message":"Service Offline"}"#),
            Err(ScrobblerError::Api { code: 11, .. })
        ));
        assert!(matches!(
            parse_scrobble_response("not json"),
            Err(ScrobblerError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_session_and_user() {
        let session = parse_session_response(
            r#"{"session":{"name":"alice","key":"d580d57f32848f5dcf574d1ce18d78b2","subscriber":0}}"#,
        )
        .unwrap();
        assert_eq!(session.username, "alice");
        assert!(session.is_valid());

        let user = parse_user_info_response(
            r#"{"user":{"name":"alice","url":"https://www.last.fm/user/alice","playcount":"1234"}}"#,
        )
        .unwrap();
        assert_eq!(user.playcount, 1234);
        assert_eq!(user.url, "https://www.last.fm/user/alice");
    }

    #[test]
    fn test_form_encoding() {
        let mut params = BTreeMap::new();
        params.insert("track[0]".to_string(), "Hello & Goodbye".to_string());
        assert_eq!(encode_form(&params), "track%5B0%5D=Hello%20%26%20Goodbye");
    }
}
