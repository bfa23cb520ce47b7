use super::utils::Context;
use record_scrobbler::references::{display_text, link_target};
use record_scrobbler::{ProfileExcerpt, ReferenceCache, SegmentKind};

/// The artist's own sites and social pages, blanks and repeats dropped
fn artist_urls(urls: &[String]) -> Vec<&str> {
    let mut shown: Vec<&str> = Vec::new();
    for url in urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
        if !shown.contains(&url) {
            shown.push(url);
        }
    }
    shown
}

fn print_urls(urls: &[String]) {
    let urls = artist_urls(urls);
    if urls.is_empty() {
        return;
    }

    println!();
    println!("🌐 Elsewhere:");
    for url in urls {
        println!("  - {url}");
    }
}

/// Handle the profile command
pub async fn handle_profile(
    context: &Context,
    artist_id: u64,
    full: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let discogs = context.discogs_client();
    let artist = discogs.get_artist(artist_id).await?;

    println!("🎤 {}", artist.name);
    println!("{}", "=".repeat(60));

    if artist.profile.trim().is_empty() {
        println!("(no profile)");
        print_urls(&artist.urls);
        return Ok(());
    }

    let excerpt = ProfileExcerpt::new(&artist.profile, full);
    let segments = excerpt.segments();

    let mut cache = ReferenceCache::new();
    let resolved = discogs.resolve_references(&segments, &mut cache).await;
    log::debug!("Resolved {resolved} references for artist {artist_id}");

    let mut text = String::new();
    let mut links = Vec::new();
    for segment in &segments {
        let shown = display_text(segment, &cache);
        match segment.kind {
            SegmentKind::Bold => text.push_str(&format!("**{shown}**")),
            SegmentKind::Emphasis => text.push_str(&format!("_{shown}_")),
            _ => text.push_str(&shown),
        }

        if let Some(target) = link_target(segment) {
            if !links.iter().any(|(_, t)| t == &target) {
                links.push((shown, target));
            }
        }
    }

    println!("{text}");

    if excerpt.has_more {
        println!();
        println!("(run with --full to read more)");
    }

    if !links.is_empty() {
        println!();
        println!("🔗 Links:");
        for (index, (label, target)) in links.iter().enumerate() {
            let label = if label.is_empty() { target } else { label };
            println!("  [{}] {label}: {target}", index + 1);
        }
    }

    print_urls(&artist.urls);

    if !artist.members.is_empty() {
        println!();
        println!("👥 Members:");
        for member in &artist.members {
            let status = if member.active { "" } else { " (inactive)" };
            println!("  - {}{status}", member.name);
        }
    }

    Ok(())
}
