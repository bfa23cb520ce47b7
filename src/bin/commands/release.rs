use super::utils::{format_timestamp, Context};
use record_scrobbler::timestamps::{current_unix_time, synthesize_timestamps};
use record_scrobbler::{AlbumScrobbler, ScrobblerError};

/// Handle the release command: print the tracklist and the timestamps a
/// scrobble right now would use
pub async fn handle_show_release(
    context: &Context,
    release_id: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let release = context.discogs_client().get_release(release_id).await?;
    let tracks = release.playable_tracks();
    let timestamps = synthesize_timestamps(&tracks, current_unix_time());

    let artist = release.primary_artist().unwrap_or_default();
    match release.year {
        Some(year) if year > 0 => println!("💿 {artist} - {} ({year})", release.title),
        _ => println!("💿 {artist} - {}", release.title),
    }
    println!("{}", "=".repeat(60));

    if tracks.is_empty() {
        println!("(no playable tracks)");
        return Ok(());
    }

    for (index, (track, timestamp)) in tracks.iter().zip(&timestamps).enumerate() {
        println!(
            "{:>3}. {} [{}] @ {}",
            index + 1,
            track.title,
            track.duration.as_deref().unwrap_or("?:??"),
            format_timestamp(*timestamp)
        );
    }

    println!();
    println!("🔍 Dry run: nothing was scrobbled");
    Ok(())
}

/// Handle the scrobble-release command
pub async fn handle_scrobble_release(
    context: &Context,
    release_id: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let scrobbler = AlbumScrobbler::new(
        context.discogs_client(),
        context.authenticated_lastfm_client()?,
    );

    let outcome = match scrobbler
        .scrobble_release(release_id, current_unix_time())
        .await
    {
        Ok(outcome) => outcome,
        Err(ScrobblerError::PartialScrobble {
            submitted,
            summary,
            source,
        }) => {
            println!(
                "⚠️  Only the first {submitted} tracks were scrobbled ({} accepted, {} ignored)",
                summary.accepted, summary.ignored
            );
            println!("   Scrobbling the release again would count those tracks twice.");
            return Err((*source).into());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "🎵 {} - {}",
        outcome.batch.artist,
        outcome.batch.album.as_deref().unwrap_or("(unknown album)")
    );
    for track in &outcome.batch.tracks {
        println!("   {} @ {}", track.title, format_timestamp(track.timestamp));
    }
    println!(
        "✅ {} accepted, {} ignored",
        outcome.summary.accepted, outcome.summary.ignored
    );

    Ok(())
}
