#[cfg(feature = "mock")]
mod common;

#[cfg(feature = "mock")]
mod mock_tests {
    use super::common::RELEASE_JSON;
    use mockall::predicate::*;
    use record_scrobbler::{
        AlbumScrobbler, MockCatalogClient, MockScrobbler, Release, Result, ScrobbleBatch,
        ScrobbleSummary, ScrobblerError,
    };

    fn release() -> Release {
        serde_json::from_str(RELEASE_JSON).unwrap()
    }

    #[tokio::test]
    async fn test_scrobble_release_submits_timed_batch() -> Result<()> {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_get_release()
            .with(eq(249504))
            .times(1)
            .returning(|_| Ok(release()));

        let mut scrobbler = MockScrobbler::new();
        scrobbler
            .expect_scrobble_batch()
            .withf(|batch: &ScrobbleBatch| {
                batch.artist == "Can" && batch.album.as_deref() == Some("Ege Bamyasi")
            })
            .times(1)
            .returning(|batch| {
                Ok(ScrobbleSummary {
                    accepted: batch.len() as u32,
                    ignored: 0,
                })
            });

        let album_scrobbler = AlbumScrobbler::new(catalog, scrobbler);
        let outcome = album_scrobbler.scrobble_release(249504, 10_000).await?;

        assert_eq!(outcome.summary.accepted, 4);
        let timed: Vec<_> = outcome
            .batch
            .tracks
            .iter()
            .map(|t| (t.title.as_str(), t.timestamp))
            .collect();
        assert_eq!(
            timed,
            vec![
                ("Pinch", 9_320),
                ("Sing Swan Song", 9_608),
                ("Vitamin C", 9_820),
                ("Spoon", 10_000),
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_release_without_tracks_is_not_scrobbled() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_get_release().returning(|id| {
            let mut release = release();
            release.id = id;
            release.tracklist.retain(|entry| entry.is_heading());
            Ok(release)
        });

        let mut scrobbler = MockScrobbler::new();
        scrobbler.expect_scrobble_batch().times(0);

        let album_scrobbler = AlbumScrobbler::new(catalog, scrobbler);
        assert!(matches!(
            album_scrobbler.scrobble_release(1, 10_000).await,
            Err(ScrobblerError::EmptyBatch)
        ));
    }

    #[tokio::test]
    async fn test_catalog_errors_propagate() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_get_release()
            .returning(|_| Err(ScrobblerError::Http("connection reset".to_string())));

        let mut scrobbler = MockScrobbler::new();
        scrobbler.expect_scrobble_batch().times(0);

        let album_scrobbler = AlbumScrobbler::new(catalog, scrobbler);
        assert!(matches!(
            album_scrobbler.prepare_release(1, 10_000).await,
            Err(ScrobblerError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_scrobble_single() -> Result<()> {
        let catalog = MockCatalogClient::new();
        let mut scrobbler = MockScrobbler::new();
        scrobbler
            .expect_scrobble_batch()
            .withf(|batch: &ScrobbleBatch| {
                batch.artist == "Neu!"
                    && batch.album.is_none()
                    && batch.len() == 1
                    && batch.tracks[0].title == "Hallogallo"
                    && batch.tracks[0].timestamp == 1_700_000_000
            })
            .times(1)
            .returning(|_| {
                Ok(ScrobbleSummary {
                    accepted: 1,
                    ignored: 0,
                })
            });

        let album_scrobbler = AlbumScrobbler::new(catalog, scrobbler);
        let summary = album_scrobbler
            .scrobble_single(" Neu! ", "Hallogallo", Some(""), 1_700_000_000)
            .await?;
        assert_eq!(summary.accepted, 1);

        assert!(matches!(
            album_scrobbler
                .scrobble_single("Neu!", "   ", None, 1_700_000_000)
                .await,
            Err(ScrobblerError::EmptyBatch)
        ));

        Ok(())
    }
}
