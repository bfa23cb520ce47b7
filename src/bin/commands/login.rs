use super::utils::Context;

/// Handle the login command
pub async fn handle_login(
    context: &Context,
    token: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = context.lastfm_client();

    let Some(token) = token else {
        println!("🔐 Grant access in your browser:");
        println!("   {}", client.auth_url(None)?);
        println!();
        println!("Then run: record-scrobbler login --token <token>");
        return Ok(());
    };

    let session = client.get_session(token).await?;
    context.store.save_session(&session)?;
    println!("✅ Logged in as {}", session.username);

    match client.with_session(session).get_user_info(None).await {
        Ok(info) => println!("🎧 {} scrobbles so far ({})", info.playcount, info.url),
        Err(e) => log::debug!("Could not fetch user info: {e}"),
    }

    Ok(())
}
