use crate::discogs::Release;
use crate::lastfm::{ScrobbleBatch, ScrobbleSummary};
use crate::Result;
use async_trait::async_trait;

/// Catalog lookups needed to scrobble a release.
///
/// Implemented by [`DiscogsClient`](crate::DiscogsClient). When the `mock`
/// feature is enabled, `MockCatalogClient` is generated with `mockall`.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait CatalogClient {
    /// Fetch a release with its full tracklist.
    async fn get_release(&self, release_id: u64) -> Result<Release>;
}

/// Destination for scrobbles.
///
/// Implemented by [`LastFmClient`](crate::LastFmClient). When the `mock`
/// feature is enabled, `MockScrobbler` is generated with `mockall`.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait Scrobbler {
    /// Submit every track in `batch`.
    async fn scrobble_batch(&self, batch: &ScrobbleBatch) -> Result<ScrobbleSummary>;
}
