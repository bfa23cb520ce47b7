//! Client for the Discogs catalog API.
//!
//! Only the endpoints the application needs are covered: a user's
//! collection, releases, masters, artists (with their releases), labels and
//! album search. See <https://www.discogs.com/developers>.

use crate::config::ClientConfig;
use crate::markup::Segment;
use crate::r#trait::CatalogClient;
use crate::references::{normalize_artist_name, ReferenceCache, ReferenceKind};
use crate::retry::retry_operation;
use crate::timestamps::ScrobbleTrack;
use crate::{Result, ScrobblerError};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Seconds to wait when a 429 response carries no `Retry-After` header.
const DEFAULT_RETRY_AFTER: u64 = 60;
const COLLECTION_PAGE_SIZE: u32 = 100;
/// Reference lookups in flight at once; Discogs allows about 60 requests a minute.
const MAX_CONCURRENT_LOOKUPS: usize = 4;

// ================================================================================================
// RESPONSE TYPES
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub items: u32,
}

impl Pagination {
    pub fn has_next_page(&self) -> bool {
        self.page < self.pages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistCredit {
    pub name: String,
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
    #[serde(default)]
    pub uri150: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// One row of a release tracklist.
///
/// Discogs mixes real tracks with `heading` rows (side labels such as
/// "Side A") and `index` rows; only `track` rows can be scrobbled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracklistEntry {
    #[serde(default)]
    pub position: String,
    #[serde(rename = "type_", default)]
    pub kind: String,
    pub title: String,
    /// `MM:SS`, empty when unknown
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub artists: Vec<ArtistCredit>,
}

impl TracklistEntry {
    pub fn is_heading(&self) -> bool {
        self.kind == "heading"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub artists: Vec<ArtistCredit>,
    #[serde(default)]
    pub tracklist: Vec<TracklistEntry>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Release {
    /// Tracks in playback order, without headings, ready for timestamping.
    pub fn playable_tracks(&self) -> Vec<ScrobbleTrack> {
        self.tracklist
            .iter()
            .filter(|entry| !entry.is_heading())
            .map(|entry| ScrobbleTrack {
                title: entry.title.clone(),
                duration: Some(entry.duration.clone()).filter(|d| !d.trim().is_empty()),
            })
            .collect()
    }

    /// Name of the first credited artist with the Discogs ` (N)` suffix removed.
    pub fn primary_artist(&self) -> Option<String> {
        self.artists
            .first()
            .map(|artist| normalize_artist_name(&artist.name))
    }

    pub fn primary_image(&self) -> Option<&Image> {
        self.images
            .iter()
            .find(|image| image.kind == "primary")
            .or_else(|| self.images.first())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterRelease {
    pub id: u64,
    #[serde(default)]
    pub main_release: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: u64,
    pub name: String,
    /// Biography in Discogs bracket-tag markup
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRelease {
    pub id: u64,
    /// Only present when `kind` is `master`
    #[serde(default)]
    pub main_release: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub thumb: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub format: Option<String>,
}

impl ArtistRelease {
    /// The concrete release to fetch a tracklist from.
    pub fn release_id(&self) -> u64 {
        if self.kind == "master" {
            self.main_release.unwrap_or(self.id)
        } else {
            self.id
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistReleasesPage {
    pub pagination: Pagination,
    pub releases: Vec<ArtistRelease>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub master_id: Option<u64>,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub pagination: Pagination,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInformation {
    pub title: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub master_id: u64,
    #[serde(default)]
    pub artists: Vec<ArtistCredit>,
    #[serde(default)]
    pub cover_image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRelease {
    pub id: u64,
    pub basic_information: BasicInformation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CollectionPage {
    pagination: Pagination,
    releases: Vec<CollectionRelease>,
}

/// Flattened view of a collection item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Album {
    pub id: u64,
    pub title: String,
    pub artist: String,
    pub artist_id: u64,
    pub year: i32,
    pub cover_image: String,
}

impl CollectionRelease {
    /// Flatten into an [`Album`]; `None` when the release credits no artist.
    pub fn to_album(&self) -> Option<Album> {
        let info = &self.basic_information;
        let artist = info.artists.first()?;
        Some(Album {
            id: self.id,
            title: info.title.clone(),
            artist: normalize_artist_name(&artist.name),
            artist_id: artist.id,
            year: info.year,
            cover_image: info.cover_image.clone(),
        })
    }
}

// ================================================================================================
// CLIENT
// ================================================================================================

/// Async Discogs API client over any [`HttpClient`].
///
/// # Examples
///
/// ```rust,no_run
/// use record_scrobbler::{ClientConfig, DiscogsClient, Result};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let config = ClientConfig::new().with_discogs_token("my-token");
///     let client = DiscogsClient::new(
///         Box::new(http_client::native::NativeClient::new()),
///         config,
///     );
///
///     let release = client.get_release(249504).await?;
///     for track in release.playable_tracks() {
///         println!("{} ({:?})", track.title, track.duration);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct DiscogsClient {
    client: Arc<dyn HttpClient + Send + Sync>,
    config: ClientConfig,
}

impl DiscogsClient {
    pub fn new(client: Box<dyn HttpClient + Send + Sync>, config: ClientConfig) -> Self {
        Self {
            client: Arc::from(client),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut query: Vec<(&str, String)> = params.to_vec();
        if let Some(token) = &self.config.discogs_token {
            query.push(("token", token.clone()));
        }

        let base = format!("{}{}", self.config.discogs_base_url, path);
        Url::parse_with_params(&base, &query)
            .map_err(|e| ScrobblerError::Config(format!("Invalid Discogs URL {base}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path, params)?;
        retry_operation(&self.config.retry, path, || self.fetch_json(path, &url)).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str, url: &Url) -> Result<T> {
        let mut request = Request::new(Method::Get, url.clone());
        request.insert_header("User-Agent", self.config.user_agent.as_str());
        request.insert_header("Accept", "application/json");

        log::debug!("GET {}{}", self.config.discogs_base_url, path);
        let request_start = std::time::Instant::now();

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| ScrobblerError::Http(e.to_string()))?;

        let status: u16 = response.status().into();
        log::debug!(
            "Discogs responded {} for {} in {}ms",
            status,
            path,
            request_start.elapsed().as_millis()
        );

        if status == 429 {
            let retry_after = response
                .header("Retry-After")
                .and_then(|values| values.last().as_str().trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER);
            return Err(ScrobblerError::RateLimit { retry_after });
        }

        let body = response
            .body_string()
            .await
            .map_err(|e| ScrobblerError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScrobblerError::Http(format!(
                "Discogs returned {status} for {path}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| ScrobblerError::Parse(format!("Invalid Discogs response for {path}: {e}")))
    }

    /// Every release in folder 0 ("All") of a user's collection.
    pub async fn get_collection(&self, username: &str) -> Result<Vec<CollectionRelease>> {
        let path = format!(
            "/users/{}/collection/folders/0/releases",
            urlencoding::encode(username)
        );

        let mut releases = Vec::new();
        let mut page = 1;
        loop {
            let collection: CollectionPage = self
                .get_json(
                    &path,
                    &[
                        ("page", page.to_string()),
                        ("per_page", COLLECTION_PAGE_SIZE.to_string()),
                    ],
                )
                .await?;

            releases.extend(collection.releases);
            if !collection.pagination.has_next_page() {
                break;
            }
            page += 1;
        }

        log::debug!("Fetched {} collection releases for {}", releases.len(), username);
        Ok(releases)
    }

    pub async fn get_release(&self, release_id: u64) -> Result<Release> {
        self.get_json(&format!("/releases/{release_id}"), &[]).await
    }

    pub async fn get_master(&self, master_id: u64) -> Result<MasterRelease> {
        self.get_json(&format!("/masters/{master_id}"), &[]).await
    }

    pub async fn get_artist(&self, artist_id: u64) -> Result<Artist> {
        self.get_json(&format!("/artists/{artist_id}"), &[]).await
    }

    pub async fn get_label(&self, label_id: u64) -> Result<Label> {
        self.get_json(&format!("/labels/{label_id}"), &[]).await
    }

    /// An artist's releases, newest first.
    pub async fn get_artist_releases(
        &self,
        artist_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<ArtistReleasesPage> {
        self.get_json(
            &format!("/artists/{artist_id}/releases"),
            &[
                ("sort", "year".to_string()),
                ("sort_order", "desc".to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    /// Search master releases matching `query`.
    pub async fn search_albums(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage> {
        self.get_json(
            "/database/search",
            &[
                ("q", query.to_string()),
                ("type", "master".to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    async fn lookup_name(&self, kind: ReferenceKind, id: u64) -> Result<String> {
        match kind {
            ReferenceKind::Artist => self.get_artist(id).await.map(|a| a.name),
            ReferenceKind::Release => self.get_release(id).await.map(|r| r.title),
            ReferenceKind::Master => self.get_master(id).await.map(|m| m.title),
            ReferenceKind::Label => self.get_label(id).await.map(|l| l.name),
        }
    }

    /// Look up the names of every unresolved reference in `segments` that
    /// `cache` does not know yet, concurrently.
    ///
    /// Lookups that fail are logged and skipped so the caller falls back to
    /// placeholders. Returns the number of names added to the cache.
    pub async fn resolve_references(
        &self,
        segments: &[Segment],
        cache: &mut ReferenceCache,
    ) -> usize {
        // Spellings such as "7" and "007" share one lookup but keep their own
        // cache entries, since rendering looks names up by the written id.
        let mut wanted: HashMap<(ReferenceKind, u64), Vec<String>> = HashMap::new();
        for segment in segments.iter().filter(|s| s.needs_resolution()) {
            let (Some(kind), Some(id)) = (
                ReferenceKind::of(segment.kind),
                segment.reference_id.as_deref(),
            ) else {
                continue;
            };
            if cache.contains(kind, id) {
                continue;
            }
            match id.parse::<u64>() {
                Ok(numeric_id) => {
                    let spellings = wanted.entry((kind, numeric_id)).or_default();
                    if !spellings.iter().any(|s| s == id) {
                        spellings.push(id.to_string());
                    }
                }
                Err(_) => log::debug!("Skipping non-numeric {} reference {id}", kind.label()),
            }
        }

        let outcomes: Vec<_> = stream::iter(wanted)
            .map(|((kind, id), spellings)| async move {
                (kind, id, spellings, self.lookup_name(kind, id).await)
            })
            .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;

        let mut resolved = 0;
        for (kind, id, spellings, outcome) in outcomes {
            match outcome {
                Ok(name) => {
                    for spelling in &spellings {
                        cache.insert(kind, spelling, &name);
                    }
                    resolved += 1;
                }
                Err(e) => log::warn!("Could not resolve {} {id}: {e}", kind.label()),
            }
        }

        resolved
    }
}

#[async_trait(?Send)]
impl CatalogClient for DiscogsClient {
    async fn get_release(&self, release_id: u64) -> Result<Release> {
        DiscogsClient::get_release(self, release_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASE_JSON: &str = r#"{
        "id": 249504,
        "title": "Never Gonna Give You Up",
        "year": 1987,
        "artists": [{"name": "Rick Astley (2)", "id": 72872}],
        "tracklist": [
            {"position": "", "type_": "heading", "title": "Side A", "duration": ""},
            {"position": "A", "type_": "track", "title": "Never Gonna Give You Up", "duration": "3:32"},
            {"position": "B", "type_": "track", "title": "Never Gonna Give You Up (Instrumental)", "duration": ""}
        ],
        "images": [
            {"type": "secondary", "uri": "https://img/2.jpg", "uri150": "", "width": 1, "height": 1},
            {"type": "primary", "uri": "https://img/1.jpg", "uri150": "", "width": 1, "height": 1}
        ]
    }"#;

    #[test]
    fn test_release_playable_tracks() {
        let release: Release = serde_json::from_str(RELEASE_JSON).unwrap();
        let tracks = release.playable_tracks();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "Never Gonna Give You Up");
        assert_eq!(tracks[0].duration.as_deref(), Some("3:32"));
        assert_eq!(tracks[1].duration, None);
        assert_eq!(release.primary_artist().as_deref(), Some("Rick Astley"));
        assert_eq!(release.primary_image().unwrap().uri, "https://img/1.jpg");
    }

    #[test]
    fn test_collection_release_to_album() {
        let json = r#"{
            "id": 1,
            "basic_information": {
                "title": "Kid A",
                "year": 2000,
                "master_id": 21501,
                "artists": [{"name": "Radiohead", "id": 3840, "resource_url": "x"}],
                "cover_image": "https://img/kida.jpg"
            }
        }"#;
        let release: CollectionRelease = serde_json::from_str(json).unwrap();
        let album = release.to_album().unwrap();
        assert_eq!(album.title, "Kid A");
        assert_eq!(album.artist, "Radiohead");
        assert_eq!(album.artist_id, 3840);
        assert_eq!(album.year, 2000);
    }

    #[test]
    fn test_artist_release_id_for_master() {
        let master = ArtistRelease {
            id: 10,
            main_release: Some(99),
            title: "Album".to_string(),
            year: Some(1999),
            thumb: String::new(),
            kind: "master".to_string(),
            role: "Main".to_string(),
            artist: "Artist".to_string(),
            format: None,
        };
        assert_eq!(master.release_id(), 99);

        let release = ArtistRelease {
            kind: "release".to_string(),
            ..master
        };
        assert_eq!(release.release_id(), 10);
    }
}
