use crate::lastfm::ScrobbleSummary;
use thiserror::Error;

/// Error types for catalog and scrobble operations.
///
/// The markup parser and the timestamp synthesizer never fail; every variant
/// here comes from the HTTP clients, the album workflow or local persistence.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use record_scrobbler::{ClientConfig, LastFmClient, ScrobblerError};
///
/// #[tokio::main]
/// async fn main() {
///     let config = ClientConfig::new().with_lastfm_keys("key", "secret");
///     let client = LastFmClient::new(
///         Box::new(http_client::native::NativeClient::new()),
///         config,
///     );
///
///     match client.get_session("token-from-callback").await {
///         Ok(session) => println!("Logged in as {}", session.username),
///         Err(ScrobblerError::Auth(msg)) => eprintln!("Authentication failed: {}", msg),
///         Err(ScrobblerError::RateLimit { retry_after }) => {
///             eprintln!("Rate limited, retry in {} seconds", retry_after);
///         }
///         Err(e) => eprintln!("Other error: {}", e),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum ScrobblerError {
    /// HTTP/network related errors.
    ///
    /// This includes connection failures and non-success status codes that
    /// are not rate limits.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication failures.
    ///
    /// Returned when a Last.fm token or session key is rejected, or when an
    /// operation needs a session and none is configured.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Failed to parse an API response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// An error payload returned by the Last.fm API.
    #[error("Last.fm API error {code}: {message}")]
    Api {
        /// Numeric Last.fm error code
        code: u32,
        /// Human readable message from the API
        message: String,
    },

    /// Rate limiting from Discogs or Last.fm.
    ///
    /// The `retry_after` field indicates how many seconds to wait before
    /// the next request attempt.
    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimit {
        /// Number of seconds to wait before retrying
        retry_after: u64,
    },

    /// A scrobble batch with no tracks.
    ///
    /// Last.fm rejects empty track lists, so this is checked before any
    /// request is made.
    #[error("No tracks to scrobble")]
    EmptyBatch,

    /// A batch sent in several requests failed part way through.
    ///
    /// The first `submitted` tracks already reached Last.fm and `summary`
    /// counts what it made of them. Sending the batch again would scrobble
    /// those tracks twice.
    #[error(
        "Scrobbling stopped after {submitted} tracks ({} accepted): {source}",
        .summary.accepted
    )]
    PartialScrobble {
        /// Number of tracks Last.fm received before the failure
        submitted: usize,
        /// Combined result of the requests that succeeded
        summary: ScrobbleSummary,
        /// The error that stopped the batch
        #[source]
        source: Box<ScrobblerError>,
    },

    /// Missing or invalid configuration, such as an absent API key.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors from session and history persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrobblerError {
    /// Map a Last.fm error payload onto the most specific variant.
    ///
    /// See <https://www.last.fm/api/errorcodes>.
    pub fn from_lastfm_code(code: u32, message: String) -> Self {
        match code {
            4 | 9 | 14 | 15 => ScrobblerError::Auth(message),
            29 => ScrobblerError::RateLimit { retry_after: 60 },
            _ => ScrobblerError::Api { code, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lastfm_codes_map_to_variants() {
        assert!(matches!(
            ScrobblerError::from_lastfm_code(9, "Invalid session key".to_string()),
            ScrobblerError::Auth(_)
        ));
        assert!(matches!(
            ScrobblerError::from_lastfm_code(29, "Rate limit exceeded".to_string()),
            ScrobblerError::RateLimit { retry_after: 60 }
        ));
        match ScrobblerError::from_lastfm_code(6, "Invalid parameters".to_string()) {
            ScrobblerError::Api { code, message } => {
                assert_eq!(code, 6);
                assert_eq!(message, "Invalid parameters");
            }
            other => panic!("Expected API error, got: {other:?}"),
        }
    }

    #[test]
    fn test_partial_scrobble_keeps_cause() {
        use std::error::Error as _;

        let error = ScrobblerError::PartialScrobble {
            submitted: 50,
            summary: ScrobbleSummary {
                accepted: 48,
                ignored: 2,
            },
            source: Box::new(ScrobblerError::Api {
                code: 11,
                message: "Service Offline".to_string(),
            }),
        };

        assert_eq!(
            error.to_string(),
            "Scrobbling stopped after 50 tracks (48 accepted): Last.fm API error 11: Service Offline"
        );
        assert!(error.source().is_some());
    }
}
