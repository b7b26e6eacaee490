//! Response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sheetwright_domain::{CharacterDocument, ComputedSheet};
use uuid::Uuid;

/// A stored character: the document plus the sheet the engine computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    pub id: Uuid,
    /// Revision echoed from the save that produced this record (0 when created).
    pub revision: u64,
    pub saved_at: DateTime<Utc>,
    pub document: CharacterDocument,
    /// Authoritative sheet for `document`.
    pub sheet: ComputedSheet,
}

/// One row of `GET /api/characters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub id: Uuid,
    pub name: String,
    pub level: u32,
    pub revision: u64,
    pub saved_at: DateTime<Utc>,
}

impl From<&CharacterRecord> for CharacterSummary {
    fn from(record: &CharacterRecord) -> Self {
        Self {
            id: record.id,
            name: record.document.name.clone(),
            level: record.sheet.level,
            revision: record.revision,
            saved_at: record.saved_at,
        }
    }
}

/// JSON body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
