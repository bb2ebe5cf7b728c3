//! Achievement Sync - local achievement tracking reconciled against a
//! remote achievement service.
//!
//! This module exposes the sync engine for testing and external use.

pub mod achievements;
pub mod build_info;
pub mod session;
pub mod sync;
pub mod utils;

pub use achievements::{Achievement, AchievementCatalog, ProgressStore};
pub use session::{Credentials, SessionConfig, SessionState};
pub use sync::{
    HttpRemoteClient, PendingChangeQueue, RemoteSyncClient, SyncCoordinator, SyncError, SyncState,
    UploadStatus,
};
