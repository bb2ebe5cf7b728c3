//! Typed session configuration and persisted session state.
//!
//! Replaces loose string-keyed preferences with explicit structs that are
//! read at session start and written back at checkpoints.

use crate::sync::queue::PendingChangeQueue;
use crate::sync::remote::DEFAULT_API_BASE_URL;
use crate::utils::persistence::{load_json_or_default, save_json};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const SESSION_FILE: &str = "session.json";
pub const CATALOG_FILE: &str = "achievements.json";

pub const API_URL_ENV: &str = "ACHIEVEMENT_SYNC_API_URL";
pub const GAME_ID_ENV: &str = "ACHIEVEMENT_SYNC_GAME_ID";
pub const GAME_SECRET_ENV: &str = "ACHIEVEMENT_SYNC_GAME_SECRET";
pub const USER_ID_ENV: &str = "ACHIEVEMENT_SYNC_USER_ID";
pub const ACCESS_TOKEN_ENV: &str = "ACHIEVEMENT_SYNC_ACCESS_TOKEN";

/// Per-game settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub api_base_url: String,
    pub game_id: String,
    pub game_secret: String,
    /// Optional path to the game's achievement definitions. The bundled
    /// catalog is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            game_id: String::new(),
            game_secret: String::new(),
            catalog_path: None,
        }
    }
}

impl SessionConfig {
    /// Load `config.json` from `dir` (defaults if missing or invalid), then
    /// apply environment overrides.
    pub fn load(dir: &Path) -> Self {
        let mut config: SessionConfig = load_json_or_default(&dir.join(CONFIG_FILE));
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production). Empty values are ignored.
    pub fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(API_URL_ENV) {
            self.api_base_url = url;
        }
        if let Some(game_id) = get(GAME_ID_ENV) {
            self.game_id = game_id;
        }
        if let Some(secret) = get(GAME_SECRET_ENV) {
            self.game_secret = secret;
        }
    }
}

/// Identity handed over by the authentication layer after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub access_token: String,
}

impl Credentials {
    /// Read credentials from the environment. `None` means the login step
    /// did not produce a usable identity.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Option<Self> {
        let user_id = lookup(USER_ID_ENV).filter(|v| !v.trim().is_empty())?;
        let access_token = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.trim().is_empty())?;
        Some(Self {
            user_id,
            access_token,
        })
    }
}

/// State carried between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionState {
    /// Whether the last session start reached the service.
    pub online: bool,
    /// Whether the last fetch/merge completed.
    pub achievements_loaded: bool,
    pub pending: PendingChangeQueue,
}

impl SessionState {
    pub fn load(dir: &Path) -> Self {
        load_json_or_default(&dir.join(SESSION_FILE))
    }

    pub fn save(&self, dir: &Path) -> io::Result<()> {
        save_json(&dir.join(SESSION_FILE), self)
    }

    /// Mark the session as offline. Pending changes are kept so a later
    /// session can still upload them.
    pub fn play_offline(&mut self) {
        self.online = false;
        self.achievements_loaded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.game_id.is_empty());
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_config_overrides() {
        let mut config = SessionConfig::default();
        config.apply_overrides(lookup(&[
            (GAME_ID_ENV, "game-7"),
            (GAME_SECRET_ENV, "shh"),
            (API_URL_ENV, "  "),
        ]));
        assert_eq!(config.game_id, "game-7");
        assert_eq!(config.game_secret, "shh");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_config_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"game_id":"g1"}"#).unwrap();
        let config: SessionConfig = load_json_or_default(&dir.path().join(CONFIG_FILE));
        assert_eq!(config.game_id, "g1");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_credentials_require_both_fields() {
        assert!(Credentials::from_lookup(lookup(&[(USER_ID_ENV, "u1")])).is_none());
        assert!(Credentials::from_lookup(lookup(&[
            (USER_ID_ENV, "u1"),
            (ACCESS_TOKEN_ENV, "")
        ]))
        .is_none());
        let creds = Credentials::from_lookup(lookup(&[
            (USER_ID_ENV, "u1"),
            (ACCESS_TOKEN_ENV, "tok"),
        ]))
        .unwrap();
        assert_eq!(creds.user_id, "u1");
        assert_eq!(creds.access_token, "tok");
    }

    #[test]
    fn test_session_state_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = SessionState {
            online: true,
            achievements_loaded: true,
            ..Default::default()
        };
        state.pending.enqueue_unlock("A");
        state.save(dir.path()).unwrap();

        let loaded = SessionState::load(dir.path());
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_play_offline_keeps_pending() {
        let mut state = SessionState {
            online: true,
            achievements_loaded: true,
            ..Default::default()
        };
        state.pending.enqueue_progress("X");
        state.play_offline();
        assert!(!state.online);
        assert!(!state.achievements_loaded);
        assert_eq!(state.pending.drain_progress(), vec!["X"]);
    }
}
