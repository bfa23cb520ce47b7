//! # record-scrobbler
//!
//! Scrobble vinyl records to Last.fm from a Discogs collection.
//!
//! The crate pairs a small async [Discogs](https://www.discogs.com/developers)
//! client with a [Last.fm](https://www.last.fm/api) scrobbling client, plus the
//! pieces in between:
//!
//! - [`markup`]: parses the bracket-tag markup Discogs uses in artist profiles
//! - [`timestamps`]: synthesizes per-track timestamps for an album that just
//!   finished playing
//! - [`references`] and [`profile`]: display helpers for parsed profiles
//! - [`album`]: the "I just listened to this record" workflow
//! - [`history`] and [`persistence`]: manual scrobble history and saved sessions
//!
//! Both HTTP clients are generic over [`http_client::HttpClient`], so any
//! backend (or a test double) can be plugged in.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use record_scrobbler::{
//!     AlbumScrobbler, ClientConfig, DiscogsClient, LastFmClient, LastFmSession, Result,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::new()
//!         .with_discogs_token("discogs-token")
//!         .with_lastfm_keys("api-key", "secret");
//!
//!     let discogs = DiscogsClient::new(
//!         Box::new(http_client::native::NativeClient::new()),
//!         config.clone(),
//!     );
//!     let lastfm = LastFmClient::new(Box::new(http_client::native::NativeClient::new()), config)
//!         .with_session(LastFmSession::new("user", "session-key"));
//!
//!     let scrobbler = AlbumScrobbler::new(discogs, lastfm);
//!     let now = record_scrobbler::timestamps::current_unix_time();
//!     let outcome = scrobbler.scrobble_release(249504, now).await?;
//!     println!("{} tracks accepted", outcome.summary.accepted);
//!     Ok(())
//! }
//! ```

pub mod album;
pub mod config;
pub mod discogs;
pub mod error;
pub mod history;
pub mod lastfm;
pub mod markup;
pub mod persistence;
pub mod profile;
pub mod references;
pub mod retry;
pub mod session;
pub mod timestamps;
pub mod r#trait;

pub use album::{AlbumScrobbler, ReleaseScrobble};
pub use config::{ClientConfig, RetryConfig};
pub use discogs::{Album, Artist, DiscogsClient, Release};
pub use error::ScrobblerError;
pub use history::{HistoryEntry, ScrobbleHistory};
pub use lastfm::{LastFmClient, ScrobbleBatch, ScrobbleSummary, UserInfo};
pub use markup::{parse_markup, Segment, SegmentKind};
pub use persistence::UserDataStore;
pub use profile::ProfileExcerpt;
pub use references::ReferenceCache;
pub use session::LastFmSession;
pub use timestamps::{synthesize_timestamps, ScrobbleTrack};

#[cfg(feature = "mock")]
pub use r#trait::{MockCatalogClient, MockScrobbler};
pub use r#trait::{CatalogClient, Scrobbler};

pub type Result<T> = std::result::Result<T, ScrobblerError>;
