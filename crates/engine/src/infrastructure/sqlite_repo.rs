//! SQLite-backed character storage.
//!
//! Documents and snapshots are stored as JSON text, one row per character.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use sheetwright_domain::CharacterId;

use crate::infrastructure::ports::{CharacterRepo, RepoError, StoredCharacter};

/// SQLite implementation of [`CharacterRepo`].
pub struct SqliteCharacterRepo {
    pool: SqlitePool,
}

impl SqliteCharacterRepo {
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("characters.connect", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS characters (
                id TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                revision INTEGER NOT NULL,
                document_json TEXT NOT NULL,
                sheet_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("characters.migrate", e))?;

        Ok(Self { pool })
    }

    fn from_row(row: &SqliteRow) -> Result<StoredCharacter, RepoError> {
        let id: String = row.get("id");
        let revision: i64 = row.get("revision");
        let document_json: String = row.get("document_json");
        let sheet_json: String = row.get("sheet_json");
        let updated_at: String = row.get("updated_at");

        let id = Uuid::parse_str(&id).map_err(RepoError::serialization)?;
        let revision = u64::try_from(revision).map_err(RepoError::serialization)?;
        let saved_at = DateTime::parse_from_rfc3339(&updated_at)
            .map_err(RepoError::serialization)?
            .with_timezone(&Utc);

        Ok(StoredCharacter {
            id: CharacterId::from_uuid(id),
            revision,
            saved_at,
            document: serde_json::from_str(&document_json).map_err(RepoError::serialization)?,
            sheet: serde_json::from_str(&sheet_json).map_err(RepoError::serialization)?,
        })
    }
}

/// Column values for a character row: revision, document JSON, sheet JSON.
fn encode(character: &StoredCharacter) -> Result<(i64, String, String), RepoError> {
    let revision = i64::try_from(character.revision).map_err(RepoError::serialization)?;
    let document_json =
        serde_json::to_string(&character.document).map_err(RepoError::serialization)?;
    let sheet_json = serde_json::to_string(&character.sheet).map_err(RepoError::serialization)?;
    Ok((revision, document_json, sheet_json))
}

#[async_trait]
impl CharacterRepo for SqliteCharacterRepo {
    async fn get(&self, id: CharacterId) -> Result<Option<StoredCharacter>, RepoError> {
        let row = sqlx::query(
            "SELECT id, revision, document_json, sheet_json, updated_at FROM characters WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("characters.get", e))?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn save(&self, character: &StoredCharacter) -> Result<(), RepoError> {
        let (revision, document_json, sheet_json) = encode(character)?;

        sqlx::query(
            r#"
            INSERT INTO characters (id, name, revision, document_json, sheet_json, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                revision = excluded.revision,
                document_json = excluded.document_json,
                sheet_json = excluded.sheet_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(character.id.to_string())
        .bind(character.name())
        .bind(revision)
        .bind(document_json)
        .bind(sheet_json)
        .bind(character.saved_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("characters.save", e))?;

        Ok(())
    }

    async fn update(&self, character: &StoredCharacter) -> Result<bool, RepoError> {
        let (revision, document_json, sheet_json) = encode(character)?;

        let result = sqlx::query(
            r#"
            UPDATE characters
            SET name = ?, revision = ?, document_json = ?, sheet_json = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(character.name())
        .bind(revision)
        .bind(document_json)
        .bind(sheet_json)
        .bind(character.saved_at.to_rfc3339())
        .bind(character.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("characters.update", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: CharacterId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM characters WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("characters.delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<StoredCharacter>, RepoError> {
        let rows = sqlx::query(
            "SELECT id, revision, document_json, sheet_json, updated_at FROM characters ORDER BY name COLLATE NOCASE, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("characters.list", e))?;

        rows.iter().map(Self::from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sheetwright_domain::{
        compute, CharacterDocument, Characteristic, Points, Skill, SublimationSlot,
    };

    async fn temp_repo() -> (tempfile::TempDir, SqliteCharacterRepo) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("characters.db");
        let repo = SqliteCharacterRepo::new(path.to_str().unwrap()).await.unwrap();
        (dir, repo)
    }

    fn stored(document: CharacterDocument, revision: u64) -> StoredCharacter {
        StoredCharacter {
            id: CharacterId::new(),
            revision,
            saved_at: Utc.with_ymd_and_hms(2025, 6, 15, 10, 30, 0).unwrap(),
            sheet: compute(&document),
            document,
        }
    }

    #[tokio::test]
    async fn round_trips_document_and_snapshot() {
        let (_dir, repo) = temp_repo().await;
        let mut document = CharacterDocument::new("Aria")
            .with_characteristic(Characteristic::Body, 6)
            .with_skill(Skill::Athletics, 2)
            .with_sublimation(SublimationSlot::excellence(Skill::Athletics, 1));
        // Unknown keys survive storage untouched.
        document.skills.insert("basket_weaving".into(), Points::Valid(1));
        let character = stored(document, 12);

        repo.save(&character).await.unwrap();
        let loaded = repo.get(character.id).await.unwrap();

        assert_eq!(loaded, Some(character));
    }

    #[tokio::test]
    async fn save_replaces_existing_row() {
        let (_dir, repo) = temp_repo().await;
        let mut character = stored(CharacterDocument::new("Kest"), 1);
        repo.save(&character).await.unwrap();

        character.document.name = "Kestrel".into();
        character.revision = 2;
        repo.save(&character).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name(), "Kestrel");
        assert_eq!(all[0].revision, 2);
    }

    #[tokio::test]
    async fn list_orders_by_name_and_delete_removes() {
        let (_dir, repo) = temp_repo().await;
        let zed = stored(CharacterDocument::new("zed"), 0);
        let aria = stored(CharacterDocument::new("Aria"), 0);
        repo.save(&zed).await.unwrap();
        repo.save(&aria).await.unwrap();

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["Aria", "zed"]);

        assert!(repo.delete(zed.id).await.unwrap());
        assert!(!repo.delete(zed.id).await.unwrap());
        assert!(repo.get(zed.id).await.unwrap().is_none());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_touches_only_existing_rows() {
        let (_dir, repo) = temp_repo().await;
        let mut character = stored(CharacterDocument::new("Bram"), 1);
        assert!(!repo.update(&character).await.unwrap());
        assert!(repo.get(character.id).await.unwrap().is_none());

        repo.save(&character).await.unwrap();
        character.document.name = "Bramble".into();
        character.revision = 5;
        assert!(repo.update(&character).await.unwrap());
        assert_eq!(repo.get(character.id).await.unwrap(), Some(character.clone()));

        repo.delete(character.id).await.unwrap();
        character.revision = 6;
        assert!(!repo.update(&character).await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_character_is_none() {
        let (_dir, repo) = temp_repo().await;
        assert!(repo.get(CharacterId::new()).await.unwrap().is_none());
    }
}
