pub mod collection;
pub mod history;
pub mod login;
pub mod profile;
pub mod release;
pub mod scrobble;
pub mod utils;

use clap::Subcommand;
use utils::Context;

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List recent manual scrobbles, newest first
    List,
    /// Remove one entry by id
    Remove {
        /// Entry id as shown by `history list`
        id: String,
    },
    /// Remove every entry
    Clear,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show an artist's Discogs profile with references resolved
    ///
    /// Only the first paragraph is shown unless --full is given.
    ///
    /// Usage examples:
    /// # Show the start of Radiohead's biography
    /// record-scrobbler profile 3840
    ///
    /// # Show the whole biography
    /// record-scrobbler profile 3840 --full
    Profile {
        /// Discogs artist id
        artist_id: u64,

        /// Show the full profile instead of the first paragraph
        #[arg(long)]
        full: bool,
    },

    /// Show a release's tracklist with the timestamps a scrobble would use
    ///
    /// Nothing is submitted to Last.fm.
    Release {
        /// Discogs release id
        release_id: u64,
    },

    /// Scrobble a whole release as if it just finished playing
    ///
    /// Usage examples:
    /// record-scrobbler --user alice scrobble-release 249504
    ScrobbleRelease {
        /// Discogs release id
        release_id: u64,

        /// Print what would be submitted without scrobbling
        #[arg(long)]
        dry_run: bool,
    },

    /// Scrobble a single track and remember it in the history
    ///
    /// Usage examples:
    /// record-scrobbler scrobble --artist "Can" --track "Vitamin C" --album "Ege Bamyasi"
    Scrobble {
        #[arg(long)]
        artist: String,

        #[arg(long)]
        track: String,

        #[arg(long)]
        album: Option<String>,
    },

    /// Manage the manual scrobble history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// List the albums in a Discogs user's collection
    Collection {
        /// Discogs username
        username: String,

        /// Maximum number of albums to show (0 for no limit)
        #[arg(long, default_value = "0")]
        limit: usize,

        /// Only show albums whose title, artist or year contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Connect a Last.fm account
    ///
    /// Without --token, prints the URL where access can be granted. Run again
    /// with the token Last.fm hands back to store a session.
    Login {
        /// Token from the Last.fm auth callback
        #[arg(long)]
        token: Option<String>,
    },
}

/// Execute the appropriate command handler based on the parsed command
pub async fn execute_command(
    command: Commands,
    context: &Context,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Profile { artist_id, full } => {
            profile::handle_profile(context, artist_id, full).await
        }

        Commands::Release { release_id } => release::handle_show_release(context, release_id).await,

        Commands::ScrobbleRelease {
            release_id,
            dry_run,
        } => {
            if dry_run {
                release::handle_show_release(context, release_id).await
            } else {
                release::handle_scrobble_release(context, release_id).await
            }
        }

        Commands::Scrobble {
            artist,
            track,
            album,
        } => scrobble::handle_scrobble(context, &artist, &track, album.as_deref()).await,

        Commands::History { command } => match command {
            HistoryCommands::List => history::handle_list(context),
            HistoryCommands::Remove { id } => history::handle_remove(context, &id),
            HistoryCommands::Clear => history::handle_clear(context),
        },

        Commands::Collection {
            username,
            limit,
            filter,
        } => collection::handle_collection(context, &username, limit, filter.as_deref()).await,

        Commands::Login { token } => login::handle_login(context, token.as_deref()).await,
    }
}
