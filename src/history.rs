//! History of manually scrobbled tracks.
//!
//! The history backs the "recent scrobbles" list of the manual scrobble
//! form: newest first, at most [`MAX_HISTORY_SIZE`] entries, and no two
//! entries for the same artist/track/album (compared case-insensitively).

use serde::{Deserialize, Serialize};

pub const MAX_HISTORY_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Identifier used to remove the entry
    pub id: String,
    pub artist: String,
    pub track: String,
    pub album: Option<String>,
    /// When the scrobble was submitted, in milliseconds since the epoch
    pub timestamp_ms: i64,
}

impl HistoryEntry {
    pub fn new(artist: &str, track: &str, album: Option<&str>, timestamp_ms: i64) -> Self {
        Self {
            id: timestamp_ms.to_string(),
            artist: artist.to_string(),
            track: track.to_string(),
            album: album.filter(|a| !a.is_empty()).map(str::to_string),
            timestamp_ms,
        }
    }

    /// Entry stamped with the current time.
    pub fn now(artist: &str, track: &str, album: Option<&str>) -> Self {
        Self::new(artist, track, album, chrono::Utc::now().timestamp_millis())
    }

    fn same_scrobble(&self, other: &HistoryEntry) -> bool {
        fn folded(value: Option<&str>) -> String {
            value.unwrap_or_default().to_lowercase()
        }

        folded(Some(&self.artist)) == folded(Some(&other.artist))
            && folded(Some(&self.track)) == folded(Some(&other.track))
            && folded(self.album.as_deref()) == folded(other.album.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrobbleHistory {
    entries: Vec<HistoryEntry>,
}

impl ScrobbleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `entry` at the front, dropping older duplicates and anything past
    /// [`MAX_HISTORY_SIZE`]. Returns the id the entry was stored under.
    pub fn add(&mut self, mut entry: HistoryEntry) -> String {
        self.entries.retain(|existing| !existing.same_scrobble(&entry));

        let base_id = entry.id.clone();
        let mut suffix = 1;
        while self.entries.iter().any(|e| e.id == entry.id) {
            entry.id = format!("{base_id}-{suffix}");
            suffix += 1;
        }

        let id = entry.id.clone();
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY_SIZE);
        id
    }

    /// Remove the entry with `id`, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<HistoryEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored history, re-applying the size bound.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut history: Self = serde_json::from_str(json)?;
        history.entries.truncate(MAX_HISTORY_SIZE);
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut history = ScrobbleHistory::new();
        history.add(HistoryEntry::new("Can", "Vitamin C", Some("Ege Bamyasi"), 1));
        history.add(HistoryEntry::new("Neu!", "Hallogallo", None, 2));

        let tracks: Vec<_> = history.entries().iter().map(|e| e.track.as_str()).collect();
        assert_eq!(tracks, vec!["Hallogallo", "Vitamin C"]);
    }

    #[test]
    fn test_duplicates_are_case_insensitive() {
        let mut history = ScrobbleHistory::new();
        history.add(HistoryEntry::new("Can", "Vitamin C", Some("Ege Bamyasi"), 1));
        history.add(HistoryEntry::new("Neu!", "Hallogallo", None, 2));
        history.add(HistoryEntry::new("CAN", "vitamin c", Some("ege bamyasi"), 3));

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].timestamp_ms, 3);
        assert_eq!(history.entries()[1].track, "Hallogallo");
    }

    #[test]
    fn test_album_distinguishes_entries() {
        let mut history = ScrobbleHistory::new();
        history.add(HistoryEntry::new("Can", "Vitamin C", Some("Ege Bamyasi"), 1));
        history.add(HistoryEntry::new("Can", "Vitamin C", None, 2));
        assert_eq!(history.len(), 2);

        history.add(HistoryEntry::new("Can", "Vitamin C", Some(""), 3));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_bounded_size() {
        let mut history = ScrobbleHistory::new();
        for i in 0..(MAX_HISTORY_SIZE as i64 + 5) {
            history.add(HistoryEntry::new("Artist", &format!("Track {i}"), None, i));
        }
        assert_eq!(history.len(), MAX_HISTORY_SIZE);
        assert_eq!(history.entries()[0].track, format!("Track {}", MAX_HISTORY_SIZE + 4));
    }

    #[test]
    fn test_remove_and_colliding_ids() {
        let mut history = ScrobbleHistory::new();
        let first = history.add(HistoryEntry::new("A", "One", None, 42));
        let second = history.add(HistoryEntry::new("B", "Two", None, 42));
        assert_ne!(first, second);

        let removed = history.remove(&first).unwrap();
        assert_eq!(removed.track, "One");
        assert!(history.remove(&first).is_none());
        assert!(history.get(&second).is_some());
    }

    #[test]
    fn test_json_is_a_plain_list() {
        let mut history = ScrobbleHistory::new();
        history.add(HistoryEntry::new("A", "One", None, 42));
        let json = history.to_json().unwrap();
        assert!(json.starts_with('['));
        assert_eq!(ScrobbleHistory::from_json(&json).unwrap(), history);
    }
}
