use std::fmt;

use sheetwright_domain::{CharacterId, ComputedSheet};

/// Where an editing session stands relative to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// Everything shown has been saved and confirmed.
    Clean,
    /// Local edits are waiting for the debounce window to close.
    Dirty,
    /// A save for `revision` is in flight. Edits may still arrive.
    Saving { revision: u64 },
    /// The engine answered for `revision`; the answer is being applied.
    Reconciling { revision: u64 },
    /// The last save failed. Cleared by another edit or a retry.
    Error { message: String },
}

impl SyncState {
    pub fn label(&self) -> &'static str {
        match self {
            SyncState::Clean => "clean",
            SyncState::Dirty => "dirty",
            SyncState::Saving { .. } => "saving",
            SyncState::Reconciling { .. } => "reconciling",
            SyncState::Error { .. } => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SyncState::Error { .. })
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Saving { revision } | SyncState::Reconciling { revision } => {
                write!(f, "{} (revision {revision})", self.label())
            }
            SyncState::Error { message } => write!(f, "error: {message}"),
            _ => f.write_str(self.label()),
        }
    }
}

/// Counters kept for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub saves_sent: u64,
    pub saves_failed: u64,
    pub stale_responses_ignored: u64,
    /// Local and authoritative sheets disagreed for the same document.
    pub divergences: u64,
}

/// Snapshot of a session for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub character_id: CharacterId,
    pub state: SyncState,
    /// Revision of the document being edited.
    pub revision: u64,
    /// Latest revision the engine confirmed.
    pub saved_revision: u64,
    pub sheet: ComputedSheet,
    pub stats: SyncStats,
}

impl SessionView {
    pub fn has_unsaved_edits(&self) -> bool {
        self.revision > self.saved_revision
    }
}
