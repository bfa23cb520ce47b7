//! Turning parsed reference segments into display text and links.
//!
//! Names of referenced artists, releases, masters and labels live in the
//! catalog, not in the markup. Callers collect them in a [`ReferenceCache`]
//! (see [`DiscogsClient::resolve_references`](crate::discogs::DiscogsClient::resolve_references))
//! and pass it explicitly to [`display_text`] and [`render_plain`].

use crate::markup::{Segment, SegmentKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

const DISCOGS_WEB: &str = "https://www.discogs.com";

static DISAMBIGUATION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\(\d+\)$").expect("valid suffix pattern"));

/// The catalog entity a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    Artist,
    Release,
    Master,
    Label,
}

impl ReferenceKind {
    /// The reference kind of a segment, or `None` for non-reference segments.
    pub fn of(kind: SegmentKind) -> Option<Self> {
        match kind {
            SegmentKind::ArtistRef => Some(Self::Artist),
            SegmentKind::ReleaseRef => Some(Self::Release),
            SegmentKind::MasterRef => Some(Self::Master),
            SegmentKind::LabelRef => Some(Self::Label),
            _ => None,
        }
    }

    /// Human readable name used in placeholders.
    pub fn label(self) -> &'static str {
        match self {
            Self::Artist => "Artist",
            Self::Release => "Release",
            Self::Master => "Master",
            Self::Label => "Label",
        }
    }

    /// Path component of the entity's Discogs web page.
    pub fn path(self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Release => "release",
            Self::Master => "master",
            Self::Label => "label",
        }
    }
}

/// Explicit lookup of resolved reference names, keyed by kind and id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceCache {
    names: HashMap<(ReferenceKind, String), String>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ReferenceKind, id: &str, name: &str) {
        self.names
            .insert((kind, id.to_string()), name.to_string());
    }

    pub fn get(&self, kind: ReferenceKind, id: &str) -> Option<&str> {
        self.names
            .get(&(kind, id.to_string()))
            .map(String::as_str)
    }

    pub fn contains(&self, kind: ReferenceKind, id: &str) -> bool {
        self.get(kind, id).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Strip the ` (N)` suffix Discogs appends to tell same-named artists apart.
///
/// ```rust
/// use record_scrobbler::references::normalize_artist_name;
///
/// assert_eq!(normalize_artist_name("Nirvana (2)"), "Nirvana");
/// assert_eq!(normalize_artist_name("Sunn O)))"), "Sunn O)))");
/// ```
pub fn normalize_artist_name(name: &str) -> String {
    DISAMBIGUATION_SUFFIX.replace(name, "").into_owned()
}

/// Text to show for a segment.
///
/// References with an id use the cached name when available and a
/// bracketed placeholder such as `[Artist 123]` otherwise. Named artist
/// references are normalized; every other segment shows its own text.
pub fn display_text(segment: &Segment, cache: &ReferenceCache) -> String {
    let Some(kind) = ReferenceKind::of(segment.kind) else {
        return segment.text.clone();
    };

    match &segment.reference_id {
        Some(id) => match cache.get(kind, id) {
            Some(name) if kind == ReferenceKind::Artist => normalize_artist_name(name),
            Some(name) => name.to_string(),
            None => format!("[{} {}]", kind.label(), id),
        },
        None if kind == ReferenceKind::Artist => normalize_artist_name(&segment.text),
        None => segment.text.clone(),
    }
}

/// Where a segment links to, if anywhere.
pub fn link_target(segment: &Segment) -> Option<String> {
    if segment.kind == SegmentKind::Hyperlink {
        return segment.target_url.clone();
    }

    let kind = ReferenceKind::of(segment.kind)?;
    let id = segment.reference_id.as_ref()?;
    Some(format!("{DISCOGS_WEB}/{}/{}", kind.path(), id))
}

/// Flatten segments into plain text using the resolved names in `cache`.
pub fn render_plain(segments: &[Segment], cache: &ReferenceCache) -> String {
    segments
        .iter()
        .map(|segment| display_text(segment, cache))
        .collect()
}
