use crate::history::ScrobbleHistory;
use crate::session::LastFmSession;
use crate::{Result, ScrobblerError};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "record-scrobbler";
const SESSION_FILE: &str = "session.json";
const HISTORY_FILE: &str = "history.json";

/// Per-user storage for the Last.fm session and the manual scrobble history.
///
/// Files live under the XDG data directory by default:
/// `~/.local/share/record-scrobbler/users/{username}/session.json` and
/// `.../history.json`.
#[derive(Debug, Clone)]
pub struct UserDataStore {
    root: PathBuf,
}

impl UserDataStore {
    /// Store rooted in the XDG data directory.
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            ScrobblerError::Config("Cannot determine XDG data directory".to_string())
        })?;
        Ok(Self::with_root(data_dir.join(APP_DIR)))
    }

    /// Store rooted in an arbitrary directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, username: &str) -> PathBuf {
        self.root.join("users").join(username)
    }

    /// Path of the session file for `username`.
    pub fn session_path(&self, username: &str) -> PathBuf {
        self.user_dir(username).join(SESSION_FILE)
    }

    /// Path of the scrobble history file for `username`.
    pub fn history_path(&self, username: &str) -> PathBuf {
        self.user_dir(username).join(HISTORY_FILE)
    }

    /// Save a session, creating the user directory as needed.
    pub fn save_session(&self, session: &LastFmSession) -> Result<()> {
        let session_json = session
            .to_json()
            .map_err(|e| ScrobblerError::Parse(format!("Failed to serialize session: {e}")))?;

        let session_path = self.session_path(&session.username);
        write_creating_parent(&session_path, &session_json)?;

        log::debug!("Session saved to: {}", session_path.display());
        Ok(())
    }

    /// Load the saved session for `username`.
    pub fn load_session(&self, username: &str) -> Result<LastFmSession> {
        let session_path = self.session_path(username);

        if !session_path.exists() {
            return Err(ScrobblerError::Auth(format!(
                "No saved session found for user: {username}"
            )));
        }

        let session_json = fs::read_to_string(&session_path)?;
        let session = LastFmSession::from_json(&session_json)
            .map_err(|e| ScrobblerError::Parse(format!("Failed to parse session JSON: {e}")))?;

        log::debug!("Session loaded from: {}", session_path.display());
        Ok(session)
    }

    pub fn session_exists(&self, username: &str) -> bool {
        self.session_path(username).exists()
    }

    /// Remove a saved session. Missing sessions are not an error.
    pub fn remove_session(&self, username: &str) -> Result<()> {
        let session_path = self.session_path(username);

        if session_path.exists() {
            fs::remove_file(&session_path)?;
            log::debug!("Session removed from: {}", session_path.display());
        }

        Ok(())
    }

    /// List all usernames that have saved sessions.
    pub fn list_saved_users(&self) -> Result<Vec<String>> {
        let users_dir = self.root.join("users");

        if !users_dir.exists() {
            return Ok(Vec::new());
        }

        let mut users = Vec::new();
        for entry in fs::read_dir(&users_dir)? {
            let entry = entry?;

            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
                && entry.path().join(SESSION_FILE).exists()
            {
                if let Some(username) = entry.file_name().to_str() {
                    users.push(username.to_string());
                }
            }
        }

        users.sort();
        Ok(users)
    }

    /// Load the scrobble history for `username`; a missing file is an empty history.
    pub fn load_history(&self, username: &str) -> Result<ScrobbleHistory> {
        let history_path = self.history_path(username);

        if !history_path.exists() {
            return Ok(ScrobbleHistory::new());
        }

        let history_json = fs::read_to_string(&history_path)?;
        let history = ScrobbleHistory::from_json(&history_json)
            .map_err(|e| ScrobblerError::Parse(format!("Failed to parse history JSON: {e}")))?;

        log::debug!(
            "Loaded {} history entries from: {}",
            history.len(),
            history_path.display()
        );
        Ok(history)
    }

    /// Save the scrobble history. An empty history removes the file.
    pub fn save_history(&self, username: &str, history: &ScrobbleHistory) -> Result<()> {
        let history_path = self.history_path(username);

        if history.is_empty() {
            if history_path.exists() {
                fs::remove_file(&history_path)?;
                log::debug!("Removed empty history: {}", history_path.display());
            }
            return Ok(());
        }

        let history_json = history
            .to_json()
            .map_err(|e| ScrobblerError::Parse(format!("Failed to serialize history: {e}")))?;
        write_creating_parent(&history_path, &history_json)?;

        log::debug!("History saved to: {}", history_path.display());
        Ok(())
    }
}

fn write_creating_parent(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
