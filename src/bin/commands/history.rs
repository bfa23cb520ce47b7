use super::utils::{format_timestamp_ms, Context};

/// Handle `history list`
pub fn handle_list(context: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let username = context.username()?;
    let history = context.store.load_history(&username)?;

    if history.is_empty() {
        println!("📭 No recent scrobbles for {username}");
        return Ok(());
    }

    println!("🕐 Recent scrobbles for {username}:");
    for entry in history.entries() {
        let album = entry
            .album
            .as_deref()
            .map(|a| format!(" [{a}]"))
            .unwrap_or_default();
        println!(
            "  {:<16} {} - {}{album} ({})",
            entry.id,
            entry.artist,
            entry.track,
            format_timestamp_ms(entry.timestamp_ms)
        );
    }

    Ok(())
}

/// Handle `history remove <id>`
pub fn handle_remove(context: &Context, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let username = context.username()?;
    let mut history = context.store.load_history(&username)?;

    let Some(removed) = history.remove(id) else {
        return Err(format!("No history entry with id {id}").into());
    };

    context.store.save_history(&username, &history)?;
    println!("🗑️  Removed {} - {}", removed.artist, removed.track);
    Ok(())
}

/// Handle `history clear`
pub fn handle_clear(context: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let username = context.username()?;
    let mut history = context.store.load_history(&username)?;
    let count = history.len();

    history.clear();
    context.store.save_history(&username, &history)?;
    println!("🗑️  Cleared {count} entries");
    Ok(())
}
