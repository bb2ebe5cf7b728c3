//! Client for the remote achievement service.
//!
//! Every call is a single blocking request/response with no retry; the
//! coordinator never has more than one request outstanding.

use super::error::SyncError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default service endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.fizzyo-ucl.co.uk/api/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One row of the highscore table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highscore {
    pub tag: String,
    pub score: i64,
    #[serde(default)]
    pub belongs_to_user: bool,
}

/// The remote operations the sync engine needs.
///
/// Implementations must treat `push_unlock` as idempotent on the service
/// side: a failed flush re-pushes its whole unlock list, including ids that
/// already went through.
pub trait RemoteSyncClient {
    /// Ids of the achievements the service has recorded as unlocked.
    fn fetch_unlocked(&self, user_id: &str, game_id: &str) -> Result<Vec<String>, SyncError>;

    fn push_unlock(&self, game_id: &str, achievement_id: &str) -> Result<(), SyncError>;

    fn push_highscore(&self, game_id: &str, score: i64) -> Result<(), SyncError>;

    /// Top 20 scores for the game.
    fn fetch_highscores(&self, game_id: &str) -> Result<Vec<Highscore>, SyncError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnlockedResponse {
    #[serde(default)]
    unlocked_achievements: Vec<UnlockedEntry>,
}

#[derive(Deserialize)]
struct UnlockedEntry {
    id: String,
}

#[derive(Deserialize)]
struct HighscoresResponse {
    #[serde(default)]
    highscores: Vec<Highscore>,
}

/// HTTP+JSON implementation backed by `ureq`.
pub struct HttpRemoteClient {
    agent: ureq::Agent,
    base_url: String,
    access_token: String,
    user_id: String,
    game_secret: String,
}

impl HttpRemoteClient {
    /// `access_token` is supplied by the authentication layer and is used
    /// as-is; it is never refreshed here.
    pub fn new(base_url: &str, access_token: &str, user_id: &str, game_secret: &str) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            user_id: user_id.to_string(),
            game_secret: game_secret.to_string(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    fn get(&self, url: &str) -> Result<ureq::Response, SyncError> {
        tracing::debug!(url, "GET");
        Ok(self
            .agent
            .get(url)
            .set("Authorization", &self.bearer())
            .call()?)
    }

    fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<(), SyncError> {
        tracing::debug!(url, "POST");
        self.agent
            .post(url)
            .set("Authorization", &self.bearer())
            .send_form(fields)?;
        Ok(())
    }
}

/// Decode a JSON response body, reporting failures as `ParseFailed`.
fn read_json<T: serde::de::DeserializeOwned>(response: ureq::Response) -> Result<T, SyncError> {
    response
        .into_json()
        .map_err(|e| SyncError::ParseFailed(e.to_string()))
}

pub fn unlocked_url(base_url: &str, user_id: &str, game_id: &str) -> String {
    format!(
        "{}/users/{}/unlocked-achievements/{}",
        base_url, user_id, game_id
    )
}

pub fn unlock_url(base_url: &str, game_id: &str, achievement_id: &str) -> String {
    format!(
        "{}/game/{}/achievements/{}/unlock",
        base_url, game_id, achievement_id
    )
}

pub fn highscores_url(base_url: &str, game_id: &str) -> String {
    format!("{}/games/{}/highscores", base_url, game_id)
}

impl RemoteSyncClient for HttpRemoteClient {
    fn fetch_unlocked(&self, user_id: &str, game_id: &str) -> Result<Vec<String>, SyncError> {
        let response = self.get(&unlocked_url(&self.base_url, user_id, game_id))?;
        let body = response
            .into_string()
            .map_err(|e| SyncError::ParseFailed(e.to_string()))?;
        parse_unlocked_response(&body)
    }

    fn push_unlock(&self, game_id: &str, achievement_id: &str) -> Result<(), SyncError> {
        self.post_form(
            &unlock_url(&self.base_url, game_id, achievement_id),
            &[
                ("gameSecret", self.game_secret.as_str()),
                ("userId", self.user_id.as_str()),
            ],
        )
    }

    fn push_highscore(&self, game_id: &str, score: i64) -> Result<(), SyncError> {
        let score = score.to_string();
        self.post_form(
            &highscores_url(&self.base_url, game_id),
            &[
                ("gameSecret", self.game_secret.as_str()),
                ("userId", self.user_id.as_str()),
                ("score", score.as_str()),
            ],
        )
    }

    fn fetch_highscores(&self, game_id: &str) -> Result<Vec<Highscore>, SyncError> {
        let response = self.get(&highscores_url(&self.base_url, game_id))?;
        let body: HighscoresResponse = read_json(response)?;
        Ok(body.highscores)
    }
}

/// Parse the body of the unlocked-achievements endpoint.
pub fn parse_unlocked_response(body: &str) -> Result<Vec<String>, SyncError> {
    let parsed: UnlockedResponse = serde_json::from_str(body)?;
    Ok(parsed
        .unlocked_achievements
        .into_iter()
        .map(|e| e.id)
        .collect())
}
