use super::utils::Context;
use record_scrobbler::timestamps::current_unix_time;
use record_scrobbler::{AlbumScrobbler, HistoryEntry};

/// Handle the scrobble command: submit one track and record it in the
/// user's history
pub async fn handle_scrobble(
    context: &Context,
    artist: &str,
    track: &str,
    album: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let lastfm = context.authenticated_lastfm_client()?;
    let username = lastfm
        .session()
        .map(|s| s.username.clone())
        .ok_or("Not logged in to Last.fm")?;

    let scrobbler = AlbumScrobbler::new(context.discogs_client(), lastfm);
    let summary = scrobbler
        .scrobble_single(artist, track, album, current_unix_time())
        .await?;

    if summary.accepted == 0 {
        println!("⚠️  Last.fm ignored the scrobble");
        return Ok(());
    }

    println!("✅ Scrobbled {artist} - {track}");

    let mut history = context.store.load_history(&username)?;
    history.add(HistoryEntry::now(artist.trim(), track.trim(), album.map(str::trim)));
    if let Err(e) = context.store.save_history(&username, &history) {
        println!("⚠️  Warning: Failed to save history: {e}");
    }

    Ok(())
}
