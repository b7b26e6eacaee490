//! Engine client over HTTP.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use url::Url;

use sheetwright_domain::{CharacterDocument, CharacterId};
use sheetwright_shared::{
    routes, CharacterRecord, CreateCharacterRequest, ErrorResponse, SaveCharacterRequest,
};

use crate::config::ApiConfig;
use crate::ports::{CharacterPersistencePort, SavedSheet, SyncError};

/// [`CharacterPersistencePort`] backed by the engine's REST API.
#[derive(Clone)]
pub struct HttpCharacterApi {
    client: Client,
    base_url: String,
}

impl HttpCharacterApi {
    pub fn new(config: &ApiConfig) -> Result<Self, SyncError> {
        let base_url = config.base_url.trim_end_matches('/');
        Url::parse(base_url).map_err(|e| SyncError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        })
    }

    pub fn from_env() -> Result<Self, SyncError> {
        Self::new(&ApiConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_record(
        response: Response,
        id: Option<CharacterId>,
    ) -> Result<CharacterRecord, SyncError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| SyncError::Request(e.to_string()))?;
            return Err(status_error(status, &body, id));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CharacterPersistencePort for HttpCharacterApi {
    async fn create(&self, name: Option<String>) -> Result<CharacterRecord, SyncError> {
        let response = self
            .client
            .post(self.url(routes::CHARACTERS))
            .json(&CreateCharacterRequest { name })
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;

        Self::read_record(response, None).await
    }

    async fn load(&self, id: CharacterId) -> Result<CharacterRecord, SyncError> {
        let response = self
            .client
            .get(self.url(&routes::character(id.to_uuid())))
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;

        Self::read_record(response, Some(id)).await
    }

    async fn save(
        &self,
        id: CharacterId,
        revision: u64,
        document: CharacterDocument,
    ) -> Result<SavedSheet, SyncError> {
        let response = self
            .client
            .put(self.url(&routes::character(id.to_uuid())))
            .json(&SaveCharacterRequest { revision, document })
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;

        let record = Self::read_record(response, Some(id)).await?;
        tracing::debug!(character_id = %id, revision = record.revision, "Character saved");
        Ok(record.into())
    }
}

/// Map a non-success response to an error, preferring the engine's JSON message.
fn status_error(status: StatusCode, body: &str, id: Option<CharacterId>) -> SyncError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.trim().to_string());

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => SyncError::NotFound(id),
        _ => SyncError::Server {
            status: status.as_u16(),
            message,
        },
    }
}
