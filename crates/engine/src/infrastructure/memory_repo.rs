//! In-memory character storage.
//!
//! The default store: nothing survives a restart. Useful for local play and
//! for tests.

use async_trait::async_trait;
use dashmap::DashMap;
use sheetwright_domain::CharacterId;

use crate::infrastructure::ports::{CharacterRepo, RepoError, StoredCharacter};

#[derive(Default)]
pub struct InMemoryCharacterRepo {
    characters: DashMap<CharacterId, StoredCharacter>,
}

impl InMemoryCharacterRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CharacterRepo for InMemoryCharacterRepo {
    async fn get(&self, id: CharacterId) -> Result<Option<StoredCharacter>, RepoError> {
        Ok(self.characters.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, character: &StoredCharacter) -> Result<(), RepoError> {
        self.characters.insert(character.id, character.clone());
        Ok(())
    }

    async fn update(&self, character: &StoredCharacter) -> Result<bool, RepoError> {
        // The entry guard holds the shard lock, so a concurrent delete waits.
        match self.characters.get_mut(&character.id) {
            Some(mut entry) => {
                *entry = character.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: CharacterId) -> Result<bool, RepoError> {
        Ok(self.characters.remove(&id).is_some())
    }

    async fn list(&self) -> Result<Vec<StoredCharacter>, RepoError> {
        Ok(self
            .characters
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}
