//! Persistence port used by editing sessions.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sheetwright_domain::{CharacterDocument, CharacterId, ComputedSheet, DomainError};
use sheetwright_shared::CharacterRecord;

/// The engine's answer to a save: the authoritative sheet for one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSheet {
    /// Revision the sheet was computed from, echoed back by the engine.
    pub revision: u64,
    pub sheet: ComputedSheet,
    pub saved_at: DateTime<Utc>,
}

impl From<CharacterRecord> for SavedSheet {
    fn from(record: CharacterRecord) -> Self {
        Self {
            revision: record.revision,
            sheet: record.sheet,
            saved_at: record.saved_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Character not found: {0}")]
    NotFound(CharacterId),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Save timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid engine URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Edit(#[from] DomainError),

    #[error("Editing session has stopped")]
    Closed,
}

impl SyncError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound(_))
    }

    /// Whether sending the same document again could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Request(_) | SyncError::Timeout(_) => true,
            SyncError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Where characters are loaded from and saved to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterPersistencePort: Send + Sync {
    async fn create(&self, name: Option<String>) -> Result<CharacterRecord, SyncError>;

    async fn load(&self, id: CharacterId) -> Result<CharacterRecord, SyncError>;

    /// Save the full document; the engine echoes `revision` with its sheet.
    async fn save(
        &self,
        id: CharacterId,
        revision: u64,
        document: CharacterDocument,
    ) -> Result<SavedSheet, SyncError>;
}
