//! Per-user progress snapshots (load/save to disk).

use super::types::AchievementCatalog;
use crate::utils::persistence::{load_json, save_json};
use std::io;
use std::path::PathBuf;

/// Stores one catalog-shaped progress snapshot per user id.
pub struct ProgressStore {
    dir: PathBuf,
}

impl ProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the snapshot for `user_id`.
    pub fn snapshot_path(&self, user_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}_progress.json", sanitize_user_id(user_id)))
    }

    pub fn exists(&self, user_id: &str) -> bool {
        self.snapshot_path(user_id).exists()
    }

    /// Load the snapshot for `user_id`.
    ///
    /// When none exists yet, `shipped` is persisted as the user's baseline and
    /// returned, so progress tracking always starts from the shipped defaults.
    pub fn get(
        &self,
        user_id: &str,
        shipped: &AchievementCatalog,
    ) -> io::Result<AchievementCatalog> {
        let path = self.snapshot_path(user_id);
        if let Some(snapshot) = load_json(&path)? {
            return Ok(snapshot);
        }
        tracing::debug!(user_id, "Bootstrapping progress snapshot from shipped catalog");
        save_json(&path, shipped)?;
        Ok(shipped.clone())
    }

    /// Replace the snapshot for `user_id`.
    pub fn set(&self, user_id: &str, snapshot: &AchievementCatalog) -> io::Result<()> {
        save_json(&self.snapshot_path(user_id), snapshot)
    }
}

/// Keep user ids safe to use as file names.
pub fn sanitize_user_id(user_id: &str) -> String {
    user_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
