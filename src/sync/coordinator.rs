//! Reconciliation cycle: fetch remote unlocks, merge, persist, and later
//! flush the pending queue back to the service.

use super::error::SyncError;
use super::queue::PendingChangeQueue;
use super::remote::{Highscore, RemoteSyncClient};
use crate::achievements::merge::reconcile;
use crate::achievements::progress::ProgressStore;
use crate::achievements::types::{AchievementCatalog, UNLOCKED};
use crate::session::{SessionConfig, SessionState, CATALOG_FILE};
use crate::utils::persistence::{load_json, save_json};
use std::path::PathBuf;

/// Where the coordinator is in the reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Login failed; no network calls are made this session.
    Offline,
    FetchingRemote,
    Merging,
    /// Ready for play; the queue accepts entries.
    Idle,
    Uploading,
    /// The last fetch or flush failed. A flush may be retried.
    Failed,
}

impl SyncState {
    pub fn name(&self) -> &'static str {
        match self {
            SyncState::Offline => "offline",
            SyncState::FetchingRemote => "fetching",
            SyncState::Merging => "merging",
            SyncState::Idle => "idle",
            SyncState::Uploading => "uploading",
            SyncState::Failed => "failed",
        }
    }
}

/// Result of a flush.
#[derive(Debug)]
pub enum UploadStatus {
    /// Every pending unlock was pushed and progress was saved locally.
    Complete {
        unlocks_pushed: usize,
        progress_saved: usize,
    },
    /// The flush stopped at the first error; the queue is untouched.
    Failed(SyncError),
    /// Nothing was attempted (offline session or flush not allowed yet).
    Skipped,
}

impl UploadStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, UploadStatus::Complete { .. })
    }
}

/// Owns the catalog, the pending queue and the progress store for one
/// session, and drives every remote call through `client`.
pub struct SyncCoordinator<C: RemoteSyncClient> {
    client: C,
    config: SessionConfig,
    dir: PathBuf,
    progress: ProgressStore,
    shipped: AchievementCatalog,
    catalog: AchievementCatalog,
    session: SessionState,
    user_id: Option<String>,
    state: SyncState,
}

impl<C: RemoteSyncClient> SyncCoordinator<C> {
    /// Create a coordinator rooted at `dir`. The pending queue left by a
    /// previous session is restored from disk.
    pub fn new(
        client: C,
        config: SessionConfig,
        dir: impl Into<PathBuf>,
        shipped: AchievementCatalog,
    ) -> Self {
        let dir = dir.into();
        let session = SessionState::load(&dir);
        if !session.pending.is_empty() {
            tracing::info!(
                unlocks = session.pending.unlock_count(),
                progress = session.pending.progress_count(),
                "Restored pending achievement changes from previous session"
            );
        }
        Self {
            client,
            config,
            progress: ProgressStore::new(&dir),
            dir,
            catalog: shipped.clone(),
            shipped,
            session,
            user_id: None,
            state: SyncState::Offline,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn catalog(&self) -> &AchievementCatalog {
        &self.catalog
    }

    pub fn pending(&self) -> &PendingChangeQueue {
        &self.session.pending
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn progress_store(&self) -> &ProgressStore {
        &self.progress
    }

    fn catalog_path(&self) -> PathBuf {
        self.dir.join(CATALOG_FILE)
    }

    /// The merged catalog persisted by an earlier session, laid over the
    /// shipped definitions. Shipped defaults when nothing usable is saved.
    fn saved_catalog(&self) -> AchievementCatalog {
        match load_json::<AchievementCatalog>(&self.catalog_path()) {
            Ok(Some(saved)) => self.shipped.with_state_from(&saved),
            Ok(None) => self.shipped.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable saved catalog");
                self.shipped.clone()
            }
        }
    }

    fn save_session(&self) -> bool {
        match self.session.save(&self.dir) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save session state");
                false
            }
        }
    }

    fn save_catalog(&self) -> bool {
        match save_json(&self.catalog_path(), &self.catalog) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save merged catalog");
                false
            }
        }
    }

    /// Run the start-of-session half of the cycle.
    ///
    /// `user_id` is `None` when login failed: the session goes offline, keeps
    /// the shipped catalog and makes no network calls. Otherwise the remote
    /// unlocked set is fetched and merged with the local progress snapshot.
    /// Returns true when the session is online with a freshly merged catalog
    /// that was saved to disk.
    pub fn start_session(&mut self, user_id: Option<String>) -> bool {
        let Some(user_id) = user_id else {
            tracing::warn!("Login failed, playing offline this session");
            self.state = SyncState::Offline;
            self.user_id = None;
            self.catalog = self.shipped.clone();
            self.session.play_offline();
            self.save_session();
            return false;
        };
        self.user_id = Some(user_id.clone());

        self.state = SyncState::FetchingRemote;
        tracing::info!(
            user_id = %user_id,
            game_id = %self.config.game_id,
            "Fetching unlocked achievements"
        );
        let fetched = self
            .client
            .fetch_unlocked(&user_id, &self.config.game_id)
            .and_then(|remote| {
                let local = self.progress.get(&user_id, &self.shipped)?;
                Ok((remote, local))
            });

        let (remote, local) = match fetched {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kind = e.kind(),
                    "Achievement fetch failed, using saved state"
                );
                self.state = SyncState::Failed;
                self.catalog = self.saved_catalog();
                self.session.online =
                    !matches!(e, SyncError::ConnectFailed(_) | SyncError::AuthFailed);
                self.session.achievements_loaded = false;
                self.save_session();
                return false;
            }
        };

        self.state = SyncState::Merging;
        let base = self.saved_catalog();
        let local = self.with_pending_progress(local, &base);
        self.catalog = reconcile(&base, &remote, &local);
        tracing::info!(
            remote_unlocked = remote.len(),
            unlocked = self.catalog.unlocked_count(),
            total = self.catalog.len(),
            "Merged achievement state"
        );

        self.session.online = true;
        if !self.save_catalog() {
            self.state = SyncState::Failed;
            self.session.achievements_loaded = false;
            self.save_session();
            return false;
        }
        self.session.achievements_loaded = true;
        self.save_session();
        self.state = SyncState::Idle;
        true
    }

    /// Progress values still queued from an earlier session have not reached
    /// the store yet; the saved catalog holds the latest value for those ids.
    fn with_pending_progress(
        &self,
        mut local: AchievementCatalog,
        saved: &AchievementCatalog,
    ) -> AchievementCatalog {
        for id in self.session.pending.drain_progress() {
            let (Some(queued), Some(stored)) = (saved.find(&id), local.find_mut(&id)) else {
                continue;
            };
            stored.unlock_progress = queued.unlock_progress;
        }
        local
    }

    /// Mark an achievement unlocked and queue it for upload.
    ///
    /// Returns false for unknown or already unlocked ids, which are not
    /// queued.
    pub fn record_unlock(&mut self, id: &str) -> bool {
        let Some(entry) = self.catalog.find_mut(id) else {
            tracing::warn!(achievement_id = id, "Unlock for unknown achievement ignored");
            return false;
        };
        if entry.is_unlocked() {
            return false;
        }
        entry.unlock = UNLOCKED;
        entry.unlocked_on = Some(chrono::Utc::now().to_rfc3339());
        self.session.pending.enqueue_unlock(id);
        tracing::info!(achievement_id = id, "Achievement unlocked");
        true
    }

    /// Set an achievement's progress and queue it for saving. Reaching the
    /// requirement also unlocks it.
    pub fn record_progress(&mut self, id: &str, value: i32) -> bool {
        let Some(entry) = self.catalog.find_mut(id) else {
            tracing::warn!(achievement_id = id, "Progress for unknown achievement ignored");
            return false;
        };
        entry.unlock_progress = value;
        let reached = entry.is_complete() && !entry.is_unlocked();
        self.session.pending.enqueue_progress(id);
        tracing::debug!(achievement_id = id, value, "Achievement progress updated");
        if reached {
            self.record_unlock(id);
        }
        true
    }

    /// Persist the pending queue, and the catalog unless offline.
    pub fn checkpoint(&self) -> bool {
        let session_saved = self.save_session();
        let catalog_saved = self.state == SyncState::Offline || self.save_catalog();
        session_saved && catalog_saved
    }

    /// Upload the pending queue.
    ///
    /// Unlocks are pushed one at a time in enqueue order and the first
    /// failure aborts the flush, leaving the whole queue in place for the
    /// next attempt. On success the queued progress values are copied from
    /// the catalog into the user's progress snapshot and the queue is
    /// cleared.
    pub fn flush(&mut self) -> UploadStatus {
        let user_id = match (self.state, &self.user_id) {
            (SyncState::Idle | SyncState::Failed, Some(user_id)) => user_id.clone(),
            _ => {
                tracing::info!(state = self.state.name(), "Skipping achievement upload");
                return UploadStatus::Skipped;
            }
        };

        self.state = SyncState::Uploading;
        match self.upload(&user_id) {
            Ok((unlocks_pushed, progress_saved)) => {
                self.session.pending.clear_all();
                self.save_session();
                self.save_catalog();
                self.state = SyncState::Idle;
                tracing::info!(unlocks_pushed, progress_saved, "Achievement upload complete");
                UploadStatus::Complete {
                    unlocks_pushed,
                    progress_saved,
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kind = e.kind(),
                    "Achievement upload failed, keeping queue"
                );
                self.save_session();
                self.save_catalog();
                self.state = SyncState::Failed;
                UploadStatus::Failed(e)
            }
        }
    }

    fn upload(&self, user_id: &str) -> Result<(usize, usize), SyncError> {
        let unlocks = self.session.pending.drain_unlocks();
        for id in &unlocks {
            tracing::debug!(achievement_id = %id, "Pushing unlock");
            self.client.push_unlock(&self.config.game_id, id)?;
        }

        let progress_ids = self.session.pending.drain_progress();
        if progress_ids.is_empty() {
            return Ok((unlocks.len(), 0));
        }

        let mut snapshot = self.progress.get(user_id, &self.shipped)?;
        let mut saved = 0;
        for id in &progress_ids {
            let Some(current) = self.catalog.find(id) else {
                continue;
            };
            let Some(stored) = snapshot.find_mut(id) else {
                continue;
            };
            stored.unlock_progress = current.unlock_progress;
            saved += 1;
        }
        self.progress.set(user_id, &snapshot)?;
        Ok((unlocks.len(), saved))
    }

    /// Upload a score. Never touches the network in an offline session.
    pub fn upload_score(&self, score: i64) -> bool {
        if self.state == SyncState::Offline {
            return false;
        }
        match self.client.push_highscore(&self.config.game_id, score) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, score, "Score upload failed");
                false
            }
        }
    }

    /// Top scores for the game, or `None` when offline or the fetch fails.
    pub fn highscores(&self) -> Option<Vec<Highscore>> {
        if self.state == SyncState::Offline {
            return None;
        }
        match self.client.fetch_highscores(&self.config.game_id) {
            Ok(scores) => Some(scores),
            Err(e) => {
                tracing::warn!(error = %e, "Highscore load failed");
                None
            }
        }
    }
}
