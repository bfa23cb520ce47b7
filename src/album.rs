//! Scrobbling whole releases and single tracks.

use crate::lastfm::{ScrobbleBatch, ScrobbleSummary};
use crate::r#trait::{CatalogClient, Scrobbler};
use crate::{Result, ScrobblerError};

/// Outcome of scrobbling a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseScrobble {
    pub release_id: u64,
    /// What was submitted, with the synthesized timestamps
    pub batch: ScrobbleBatch,
    pub summary: ScrobbleSummary,
}

/// Combines a catalog and a scrobbler: fetch a release, pretend it was
/// just played from start to finish, and submit its tracks.
pub struct AlbumScrobbler<C: CatalogClient, S: Scrobbler> {
    catalog: C,
    scrobbler: S,
}

impl<C: CatalogClient, S: Scrobbler> AlbumScrobbler<C, S> {
    pub fn new(catalog: C, scrobbler: S) -> Self {
        Self { catalog, scrobbler }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn scrobbler(&self) -> &S {
        &self.scrobbler
    }

    /// Build the batch for a release as if its last track ended at `now`,
    /// without submitting it.
    pub async fn prepare_release(&self, release_id: u64, now: u64) -> Result<ScrobbleBatch> {
        let release = self.catalog.get_release(release_id).await?;

        let tracks = release.playable_tracks();
        if tracks.is_empty() {
            log::warn!("Release {release_id} has no playable tracks");
            return Err(ScrobblerError::EmptyBatch);
        }

        let artist = release.primary_artist().ok_or_else(|| {
            ScrobblerError::Parse(format!("Release {release_id} credits no artist"))
        })?;

        Ok(ScrobbleBatch::from_tracks(
            &artist,
            Some(&release.title),
            &tracks,
            now,
        ))
    }

    /// Scrobble every track of a release, the last one ending at `now`.
    pub async fn scrobble_release(&self, release_id: u64, now: u64) -> Result<ReleaseScrobble> {
        let batch = self.prepare_release(release_id, now).await?;
        log::debug!(
            "Scrobbling {} tracks of release {} by {}",
            batch.len(),
            release_id,
            batch.artist
        );

        let summary = self.scrobbler.scrobble_batch(&batch).await?;
        Ok(ReleaseScrobble {
            release_id,
            batch,
            summary,
        })
    }

    /// Scrobble one track played at `now`.
    pub async fn scrobble_single(
        &self,
        artist: &str,
        track: &str,
        album: Option<&str>,
        now: u64,
    ) -> Result<ScrobbleSummary> {
        let artist = artist.trim();
        let track = track.trim();
        if artist.is_empty() || track.is_empty() {
            return Err(ScrobblerError::EmptyBatch);
        }

        let batch = ScrobbleBatch::single(artist, track, album.map(str::trim), now);
        self.scrobbler.scrobble_batch(&batch).await
    }
}
