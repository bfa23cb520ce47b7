//! Per-track timestamps for scrobbling a whole album at once.
//!
//! Last.fm wants one timestamp per scrobbled track, but when a record has
//! just finished playing the only thing known is "these tracks were played
//! back to back, ending now". [`synthesize_timestamps`] walks the tracklist
//! backwards from `now`, subtracting each following track's duration.

use serde::{Deserialize, Serialize};

/// Duration assumed for tracks without a usable `MM:SS` duration.
pub const FALLBACK_TRACK_DURATION_SECS: u64 = 180;

/// A track to be scrobbled, in playback order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScrobbleTrack {
    /// The track title
    pub title: String,
    /// Displayed duration in `MM:SS` form, as the catalog reports it
    pub duration: Option<String>,
}

impl ScrobbleTrack {
    pub fn new(title: &str, duration: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            duration: duration.map(str::to_string),
        }
    }

    /// Duration of this track in seconds, falling back to
    /// [`FALLBACK_TRACK_DURATION_SECS`].
    pub fn duration_seconds(&self) -> u64 {
        duration_seconds(self.duration.as_deref())
    }
}

/// Parse an `MM:SS` duration into seconds.
///
/// Absent, empty or malformed values (including `HH:MM:SS`) yield
/// [`FALLBACK_TRACK_DURATION_SECS`].
///
/// ```rust
/// use record_scrobbler::timestamps::duration_seconds;
///
/// assert_eq!(duration_seconds(Some("3:30")), 210);
/// assert_eq!(duration_seconds(Some("")), 180);
/// assert_eq!(duration_seconds(None), 180);
/// ```
pub fn duration_seconds(duration: Option<&str>) -> u64 {
    duration
        .and_then(parse_minutes_seconds)
        .unwrap_or(FALLBACK_TRACK_DURATION_SECS)
}

fn parse_minutes_seconds(value: &str) -> Option<u64> {
    let (minutes, seconds) = value.trim().split_once(':')?;
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some(minutes * 60 + seconds)
}

/// Assign each track a UNIX timestamp assuming back-to-back playback that
/// ended at `now`.
///
/// The last track gets `now`; every earlier track gets the timestamp of the
/// track after it minus that following track's duration. The output has
/// the same length and order as `tracks` and never decreases.
///
/// ```rust
/// use record_scrobbler::timestamps::{synthesize_timestamps, ScrobbleTrack};
///
/// let tracks = vec![
///     ScrobbleTrack::new("A", Some("2:00")),
///     ScrobbleTrack::new("B", Some("3:30")),
///     ScrobbleTrack::new("C", Some("1:00")),
/// ];
/// assert_eq!(synthesize_timestamps(&tracks, 10_000), vec![9_730, 9_940, 10_000]);
/// ```
pub fn synthesize_timestamps(tracks: &[ScrobbleTrack], now: u64) -> Vec<u64> {
    let mut timestamps = vec![now; tracks.len()];

    for i in (0..tracks.len().saturating_sub(1)).rev() {
        timestamps[i] = timestamps[i + 1].saturating_sub(tracks[i + 1].duration_seconds());
    }

    timestamps
}

/// [`synthesize_timestamps`] ending at the current wall-clock time.
pub fn synthesize_timestamps_now(tracks: &[ScrobbleTrack]) -> Vec<u64> {
    synthesize_timestamps(tracks, current_unix_time())
}

/// Seconds since the UNIX epoch, clamped to zero for clocks set before it.
pub fn current_unix_time() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_parsing() {
        assert_eq!(duration_seconds(Some("3:00")), 180);
        assert_eq!(duration_seconds(Some("0:45")), 45);
        assert_eq!(duration_seconds(Some("12:05")), 725);
        assert_eq!(duration_seconds(Some(" 4:20 ")), 260);
        assert_eq!(duration_seconds(Some("0:00")), 0);
    }

    #[test]
    fn test_malformed_durations_fall_back() {
        for bad in ["", "abc", "3", "3:xx", "-1:30", "1:02:03", "2:75", ":30"] {
            assert_eq!(
                duration_seconds(Some(bad)),
                FALLBACK_TRACK_DURATION_SECS,
                "duration {bad:?}"
            );
        }
        assert_eq!(duration_seconds(None), FALLBACK_TRACK_DURATION_SECS);
    }

    #[test]
    fn test_single_track_is_now() {
        let tracks = vec![ScrobbleTrack::new("Only", None)];
        assert_eq!(synthesize_timestamps(&tracks, 1000), vec![1000]);
    }

    #[test]
    fn test_empty_batch() {
        assert!(synthesize_timestamps(&[], 1000).is_empty());
    }

    #[test]
    fn test_uses_following_track_duration() {
        let tracks = vec![
            ScrobbleTrack::new("A", Some("3:00")),
            ScrobbleTrack::new("B", None),
        ];
        assert_eq!(synthesize_timestamps(&tracks, 1000), vec![820, 1000]);
    }

    #[test]
    fn test_three_tracks() {
        let tracks = vec![
            ScrobbleTrack::new("A", Some("2:00")),
            ScrobbleTrack::new("B", Some("3:30")),
            ScrobbleTrack::new("C", Some("1:00")),
        ];
        assert_eq!(
            synthesize_timestamps(&tracks, 10_000),
            vec![9_730, 9_940, 10_000]
        );
    }

    #[test]
    fn test_monotonic_and_same_length() {
        let tracks: Vec<_> = ["4:01", "", "0:00", "10:59", "bogus", "0:01"]
            .iter()
            .enumerate()
            .map(|(i, d)| ScrobbleTrack::new(&format!("Track {i}"), Some(d)))
            .collect();

        let timestamps = synthesize_timestamps(&tracks, 1_700_000_000);
        assert_eq!(timestamps.len(), tracks.len());
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*timestamps.last().unwrap(), 1_700_000_000);
    }

    #[test]
    fn test_never_underflows() {
        let tracks = vec![
            ScrobbleTrack::new("A", Some("5:00")),
            ScrobbleTrack::new("B", Some("5:00")),
        ];
        assert_eq!(synthesize_timestamps(&tracks, 100), vec![0, 100]);
    }

    #[test]
    fn test_now_variant_ends_at_wall_clock() {
        let before = current_unix_time();
        let timestamps = synthesize_timestamps_now(&[ScrobbleTrack::new("A", None)]);
        let after = current_unix_time();
        assert!(timestamps[0] >= before && timestamps[0] <= after);
    }
}
