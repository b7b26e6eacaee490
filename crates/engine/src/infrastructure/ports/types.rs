//! Records crossing the repository boundary.

use chrono::{DateTime, Utc};
use sheetwright_domain::{CharacterDocument, CharacterId, ComputedSheet};
use sheetwright_shared::{CharacterRecord, CharacterSummary};

/// A character as persisted: the raw document and the snapshot computed from it.
///
/// The snapshot is a cache of `compute(document)`; the document is the source
/// of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCharacter {
    pub id: CharacterId,
    pub revision: u64,
    pub saved_at: DateTime<Utc>,
    pub document: CharacterDocument,
    pub sheet: ComputedSheet,
}

impl StoredCharacter {
    pub fn name(&self) -> &str {
        &self.document.name
    }

    pub fn to_summary(&self) -> CharacterSummary {
        CharacterSummary {
            id: self.id.to_uuid(),
            name: self.document.name.clone(),
            level: self.sheet.level,
            revision: self.revision,
            saved_at: self.saved_at,
        }
    }
}

impl From<StoredCharacter> for CharacterRecord {
    fn from(stored: StoredCharacter) -> Self {
        Self {
            id: stored.id.to_uuid(),
            revision: stored.revision,
            saved_at: stored.saved_at,
            document: stored.document,
            sheet: stored.sheet,
        }
    }
}
