//! Library synchronization.
//!
//! One invocation either enumerates the libraries of the media server or syncs
//! a single page of one library and returns the checkpoint for the next call.
//! Steps run strictly in sequence: load settings, authenticate, fetch the
//! page, normalize, upsert.

mod checkpoint;
mod engine;
mod types;

pub use checkpoint::{is_library_done, SyncCheckpoint};
pub use engine::SyncEngine;
pub use types::{
    PageOutcome, PageSyncResponse, SyncError, SyncRequest, SyncResponse, ViewSummary,
    ViewsResponse,
};
