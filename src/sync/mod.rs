//! Synchronization with the remote achievement service.
//!
//! The coordinator drives the reconciliation cycle; the queue collects
//! changes made during play; the remote client is the only code that talks
//! to the network.

pub mod coordinator;
pub mod error;
pub mod queue;
pub mod remote;

pub use coordinator::{SyncCoordinator, SyncState, UploadStatus};
pub use error::SyncError;
pub use queue::PendingChangeQueue;
pub use remote::{Highscore, HttpRemoteClient, RemoteSyncClient};
