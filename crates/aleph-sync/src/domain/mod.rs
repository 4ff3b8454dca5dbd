//! Pure logic of the sync protocol: summary diffing and peer selection.
//! The framing and session state machine that drive this over an actual
//! byte stream live in `service`.

mod error;
mod peer_selection;
mod summary;

pub use error::{SyncError, SyncResult};
pub use peer_selection::select_peer;
pub use summary::{hashes_missing_from, own_summary, validate_summary, PosetSummary, SummaryEntry};
