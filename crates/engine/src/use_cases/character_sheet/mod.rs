//! Character sheet use cases.
//!
//! Creating, saving and loading character documents. Every save recomputes the
//! sheet with the shared aggregator and stores it next to the document; the
//! stored sheet is what clients reconcile against.

mod error;

pub use error::CharacterSheetError;

use std::sync::Arc;

use sheetwright_domain::{
    compute, CharacterDocument, CharacterId, ComputedSheet, DomainError, RulesCatalog,
};

use crate::infrastructure::ports::{CharacterRepo, ClockPort, StoredCharacter};

/// Name given to characters created without one.
pub const DEFAULT_CHARACTER_NAME: &str = "New Character";

/// Longest accepted character name, in characters.
pub const MAX_NAME_LENGTH: usize = 120;

/// Container for character sheet use cases.
pub struct CharacterSheetUseCases {
    character_repo: Arc<dyn CharacterRepo>,
    clock: Arc<dyn ClockPort>,
}

impl CharacterSheetUseCases {
    pub fn new(character_repo: Arc<dyn CharacterRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            character_repo,
            clock,
        }
    }

    /// Rules tables for client pickers.
    pub fn rules(&self) -> RulesCatalog {
        RulesCatalog::new()
    }

    /// Stateless computation; nothing is stored.
    pub fn compute(&self, document: &CharacterDocument) -> ComputedSheet {
        let sheet = compute(document);
        tracing::debug!(
            level = sheet.level,
            warnings = sheet.warnings.len(),
            "Computed sheet"
        );
        sheet
    }

    /// Create a blank level-1 character.
    pub async fn create(&self, name: Option<String>) -> Result<StoredCharacter, CharacterSheetError> {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_CHARACTER_NAME.to_string());
        validate_name(&name)?;

        let document = CharacterDocument::new(name);
        let character = StoredCharacter {
            id: CharacterId::new(),
            revision: 0,
            saved_at: self.clock.now(),
            sheet: compute(&document),
            document,
        };
        self.character_repo.save(&character).await?;

        tracing::info!(
            character_id = %character.id,
            name = %character.name(),
            "Created character"
        );

        Ok(character)
    }

    pub async fn get(&self, id: CharacterId) -> Result<StoredCharacter, CharacterSheetError> {
        self.character_repo
            .get(id)
            .await?
            .ok_or(CharacterSheetError::CharacterNotFound(id))
    }

    /// All characters, ordered by name (case-insensitive) then id.
    pub async fn list(&self) -> Result<Vec<StoredCharacter>, CharacterSheetError> {
        let mut characters = self.character_repo.list().await?;
        characters.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(characters)
    }

    /// Replace a character's document and recompute its authoritative sheet.
    ///
    /// `revision` is stored and echoed as given; ordering of saves is the
    /// client's concern. A character deleted meanwhile stays deleted.
    pub async fn save(
        &self,
        id: CharacterId,
        revision: u64,
        document: CharacterDocument,
    ) -> Result<StoredCharacter, CharacterSheetError> {
        validate_name(&document.name)?;

        let sheet = compute(&document);
        let character = StoredCharacter {
            id,
            revision,
            saved_at: self.clock.now(),
            document,
            sheet,
        };
        if !self.character_repo.update(&character).await? {
            return Err(CharacterSheetError::CharacterNotFound(id));
        }

        tracing::info!(
            character_id = %id,
            revision,
            level = character.sheet.level,
            warnings = character.sheet.warnings.len(),
            "Saved character"
        );

        Ok(character)
    }

    pub async fn delete(&self, id: CharacterId) -> Result<(), CharacterSheetError> {
        if !self.character_repo.delete(id).await? {
            return Err(CharacterSheetError::CharacterNotFound(id));
        }
        tracing::info!(character_id = %id, "Deleted character");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(DomainError::validation(format!(
            "Character name is {length} characters long; the limit is {MAX_NAME_LENGTH}"
        )));
    }
    Ok(())
}
