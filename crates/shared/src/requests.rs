//! Request bodies.

use serde::{Deserialize, Serialize};
use sheetwright_domain::CharacterDocument;

/// Body of `POST /api/characters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterRequest {
    /// Name of the new character. Defaults to "New Character".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body of `PUT /api/characters/{id}`.
///
/// `revision` is the client's local edit counter. The engine does not
/// interpret it; it is echoed back so the client can match the response to
/// the document it sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCharacterRequest {
    pub revision: u64,
    pub document: CharacterDocument,
}
