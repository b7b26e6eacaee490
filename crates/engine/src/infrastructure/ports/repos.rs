//! Repository port traits for character storage.

use async_trait::async_trait;
use sheetwright_domain::CharacterId;

use super::error::RepoError;
use super::types::StoredCharacter;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    // CRUD
    async fn get(&self, id: CharacterId) -> Result<Option<StoredCharacter>, RepoError>;
    /// Insert or replace.
    async fn save(&self, character: &StoredCharacter) -> Result<(), RepoError>;
    /// Replace an existing character. Returns `false`, storing nothing, when
    /// the id is absent; the check and the write happen together.
    async fn update(&self, character: &StoredCharacter) -> Result<bool, RepoError>;
    /// Returns whether a character was removed.
    async fn delete(&self, id: CharacterId) -> Result<bool, RepoError>;

    // Queries
    async fn list(&self) -> Result<Vec<StoredCharacter>, RepoError>;
}
