//! Session-local record of unlocks and progress changes awaiting upload.

use serde::{Deserialize, Serialize};

/// Two independent id lists accumulated during play.
///
/// Persisted as comma-joined strings; empty entries (from trailing or doubled
/// separators) are dropped on load. Duplicates are kept: the remote unlock is
/// idempotent, so re-pushing the same id is harmless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PendingChangeQueue {
    #[serde(with = "comma_list", default)]
    unlocks: Vec<String>,
    #[serde(with = "comma_list", default)]
    progress: Vec<String>,
}

impl PendingChangeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_unlock(&mut self, id: &str) {
        if !id.is_empty() {
            self.unlocks.push(id.to_string());
        }
    }

    pub fn enqueue_progress(&mut self, id: &str) {
        if !id.is_empty() {
            self.progress.push(id.to_string());
        }
    }

    /// Pending unlock ids in enqueue order. The queue itself is left intact
    /// until `clear_all`.
    pub fn drain_unlocks(&self) -> Vec<String> {
        self.unlocks.clone()
    }

    /// Pending progress ids in enqueue order. The queue itself is left
    /// intact until `clear_all`.
    pub fn drain_progress(&self) -> Vec<String> {
        self.progress.clone()
    }

    pub fn clear_all(&mut self) {
        self.unlocks.clear();
        self.progress.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.unlocks.is_empty() && self.progress.is_empty()
    }

    pub fn unlock_count(&self) -> usize {
        self.unlocks.len()
    }

    pub fn progress_count(&self) -> usize {
        self.progress.len()
    }
}

/// Split a comma-joined id list, skipping empty entries.
pub fn parse_id_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

mod comma_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ids: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ids.join(","))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(super::parse_id_list(&raw))
    }
}
