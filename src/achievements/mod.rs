//! Achievement catalog module.
//!
//! Holds the catalog data model, the shipped definitions, the merge of
//! remote and local state, and per-user progress snapshots stored under
//! `~/.achievement-sync/`.

pub mod data;
pub mod merge;
pub mod progress;
pub mod types;

pub use data::{bundled_catalog, load_catalog, load_catalog_file};
pub use merge::reconcile;
pub use progress::ProgressStore;
pub use types::{Achievement, AchievementCatalog, LOCKED, UNLOCKED};
