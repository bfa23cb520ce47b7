mod commands;

use clap::Parser;
use commands::{execute_command, utils::Context, Commands};
use record_scrobbler::{ClientConfig, UserDataStore};

/// Scrobble records from a Discogs collection to Last.fm
#[derive(Parser)]
#[command(
    name = "record-scrobbler",
    about = "Scrobble records from a Discogs collection to Last.fm",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// Discogs personal access token
    #[arg(long, global = true, env = "DISCOGS_TOKEN", hide_env_values = true)]
    discogs_token: Option<String>,

    /// Last.fm API key
    #[arg(long, global = true, env = "LASTFM_API_KEY")]
    lastfm_api_key: Option<String>,

    /// Last.fm shared secret
    #[arg(long, global = true, env = "LASTFM_SECRET", hide_env_values = true)]
    lastfm_secret: Option<String>,

    /// Last.fm user whose saved session and history to use
    #[arg(long, global = true, env = "LASTFM_USER")]
    user: Option<String>,

    /// Maximum retries when rate limited (0 disables retrying)
    #[arg(long, global = true, default_value = "3")]
    max_retries: u32,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new().with_max_retries(self.max_retries);
        if let Some(token) = &self.discogs_token {
            config = config.with_discogs_token(token);
        }
        if let (Some(api_key), Some(secret)) = (&self.lastfm_api_key, &self.lastfm_secret) {
            config = config.with_lastfm_keys(api_key, secret);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let store = match UserDataStore::new() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            std::process::exit(1);
        }
    };
    log::debug!("Using data directory {}", store.root().display());

    let context = Context::new(args.client_config(), store, args.user.clone());

    if let Err(e) = execute_command(args.command, &context).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
