use super::utils::Context;
use record_scrobbler::Album;

/// Case-insensitive match against the album's title, artist and year.
fn album_matches(album: &Album, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    needle.is_empty()
        || album.title.to_lowercase().contains(&needle)
        || album.artist.to_lowercase().contains(&needle)
        || (album.year > 0 && album.year.to_string().contains(&needle))
}

/// Handle the collection command
pub async fn handle_collection(
    context: &Context,
    username: &str,
    limit: usize,
    filter: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let releases = context.discogs_client().get_collection(username).await?;

    let mut albums: Vec<_> = releases
        .iter()
        .filter_map(|r| r.to_album())
        .filter(|album| filter.map_or(true, |f| album_matches(album, f)))
        .collect();
    albums.sort_by(|a, b| {
        a.artist
            .to_lowercase()
            .cmp(&b.artist.to_lowercase())
            .then(a.year.cmp(&b.year))
    });

    match filter {
        Some(f) => println!(
            "📚 {username}'s collection ({} albums matching \"{f}\")",
            albums.len()
        ),
        None => println!("📚 {username}'s collection ({} albums)", albums.len()),
    }
    for (index, album) in albums.iter().enumerate() {
        if limit > 0 && index >= limit {
            println!("  ... {} more", albums.len() - limit);
            break;
        }

        let year = if album.year > 0 {
            format!(" ({})", album.year)
        } else {
            String::new()
        };
        println!("  {:>8}  {} - {}{year}", album.id, album.artist, album.title);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album(title: &str, artist: &str, year: i32) -> Album {
        Album {
            id: 1,
            title: title.to_string(),
            artist: artist.to_string(),
            artist_id: 1,
            year,
            cover_image: String::new(),
        }
    }

    #[test]
    fn test_album_matches_title_artist_and_year() {
        let tago = album("Tago Mago", "Can", 1971);

        assert!(album_matches(&tago, "mago"));
        assert!(album_matches(&tago, "CAN"));
        assert!(album_matches(&tago, "197"));
        assert!(album_matches(&tago, "  "));
        assert!(!album_matches(&tago, "neu"));

        let undated = album("Untitled", "Unknown", 0);
        assert!(!album_matches(&undated, "0"));
    }
}
