//! Resumable pagination state for one library.

use serde::{Deserialize, Serialize};

/// Pagination progress handed to and returned by the external scheduler.
///
/// The engine keeps no memory between invocations: the caller feeds the
/// `offset` of the last checkpoint back in on the next call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCheckpoint {
    pub library_id: String,
    /// Where the next invocation starts. Reset to 0 once the library is done.
    pub offset: u64,
    pub done: bool,
}

impl SyncCheckpoint {
    /// Checkpoint after a page of `returned` raw items was processed at
    /// `offset`.
    ///
    /// The offset advances by the raw count, including items the normalizer
    /// later skipped or excluded, so the cursor follows the source listing.
    pub fn after_page(
        library_id: impl Into<String>,
        offset: u64,
        returned: u64,
        page_size: u32,
        total_count: Option<u64>,
    ) -> Self {
        let library_id = library_id.into();
        if is_library_done(offset, returned, page_size, total_count) {
            Self {
                library_id,
                offset: 0,
                done: true,
            }
        } else {
            Self {
                library_id,
                offset: offset + returned,
                done: false,
            }
        }
    }
}

/// A library is exhausted when the page came back short or the cursor has
/// reached the reported total. Without a reported total only a short page ends
/// the library.
pub fn is_library_done(
    offset: u64,
    returned: u64,
    page_size: u32,
    total_count: Option<u64>,
) -> bool {
    returned < page_size as u64 || total_count.is_some_and(|total| offset + returned >= total)
}
