//! HTTP routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use sheetwright_domain::{CharacterDocument, CharacterId, ComputedSheet, RulesCatalog};
use sheetwright_shared::{
    routes as paths, CharacterRecord, CharacterSummary, CreateCharacterRequest, ErrorResponse,
    SaveCharacterRequest,
};

use crate::app::App;
use crate::use_cases::CharacterSheetError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route(paths::HEALTH, get(health))
        .route(paths::RULES, get(get_rules))
        .route(paths::COMPUTE_SHEET, post(compute_sheet))
        .route(
            paths::CHARACTERS,
            get(list_characters).post(create_character),
        )
        .route(
            paths::CHARACTER,
            get(get_character)
                .put(save_character)
                .delete(delete_character),
        )
}

async fn health() -> &'static str {
    "OK"
}

async fn get_rules(State(app): State<Arc<App>>) -> Json<RulesCatalog> {
    Json(app.use_cases.character_sheet.rules())
}

async fn compute_sheet(
    State(app): State<Arc<App>>,
    Json(document): Json<CharacterDocument>,
) -> Json<ComputedSheet> {
    Json(app.use_cases.character_sheet.compute(&document))
}

// =============================================================================
// Characters
// =============================================================================

async fn list_characters(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<CharacterSummary>>, ApiError> {
    let characters = app.use_cases.character_sheet.list().await?;
    Ok(Json(characters.iter().map(|c| c.to_summary()).collect()))
}

async fn create_character(
    State(app): State<Arc<App>>,
    Json(request): Json<CreateCharacterRequest>,
) -> Result<(StatusCode, Json<CharacterRecord>), ApiError> {
    let created = app.use_cases.character_sheet.create(request.name).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_character(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CharacterRecord>, ApiError> {
    let character = app
        .use_cases
        .character_sheet
        .get(CharacterId::from_uuid(id))
        .await?;
    Ok(Json(character.into()))
}

async fn save_character(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveCharacterRequest>,
) -> Result<Json<CharacterRecord>, ApiError> {
    let saved = app
        .use_cases
        .character_sheet
        .save(CharacterId::from_uuid(id), request.revision, request.document)
        .await?;
    Ok(Json(saved.into()))
}

async fn delete_character(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .character_sheet
        .delete(CharacterId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse::new(msg))).into_response()
            }
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg))).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Internal error")),
                )
                    .into_response()
            }
        }
    }
}

impl From<CharacterSheetError> for ApiError {
    fn from(e: CharacterSheetError) -> Self {
        match e {
            CharacterSheetError::CharacterNotFound(_) => ApiError::NotFound(e.to_string()),
            CharacterSheetError::Domain(inner) => ApiError::BadRequest(inner.to_string()),
            CharacterSheetError::Repo(inner) => ApiError::Internal(inner.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::memory_repo::InMemoryCharacterRepo;

    fn test_router() -> Router {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 6, 15, 10, 30, 0).unwrap());
        let app = Arc::new(App::new(
            Arc::new(InMemoryCharacterRepo::new()),
            Arc::new(clock),
        ));
        routes().with_state(app)
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };
        (status, value)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn create(router: &Router, name: &str) -> Value {
        let (status, body) = send(
            router,
            json_request("POST", paths::CHARACTERS, json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn health_check() {
        let router = test_router();
        let (status, body) = send(&router, empty_request("GET", paths::HEALTH)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".into()));
    }

    #[tokio::test]
    async fn rules_catalog_lists_groups() {
        let router = test_router();
        let (status, body) = send(&router, empty_request("GET", paths::RULES)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["groups"].as_array().map(Vec::len), Some(8));
        assert_eq!(body["maxSublimationTier"], 4);
    }

    #[tokio::test]
    async fn compute_is_stateless() {
        let router = test_router();
        let document = CharacterDocument::new("Aria")
            .with_characteristic(sheetwright_domain::Characteristic::Body, 10)
            .with_sublimation(sheetwright_domain::SublimationSlot::new(
                sheetwright_domain::SublimationType::Defense,
                3,
            ));

        let (status, body) = send(
            &router,
            json_request(
                "POST",
                paths::COMPUTE_SHEET,
                serde_json::to_value(&document).unwrap(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resources"]["hpMax"], 160);

        let (_, list) = send(&router, empty_request("GET", paths::CHARACTERS)).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn compute_tolerates_malformed_values() {
        let router = test_router();
        let (status, body) = send(
            &router,
            json_request(
                "POST",
                paths::COMPUTE_SHEET,
                json!({ "skills": { "athletics": -5, "juggling": 2 } }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills"]["athletics"]["invested"], 0);
        assert_eq!(body["warnings"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn compute_accepts_rows_of_the_wrong_shape() {
        let router = test_router();
        let (status, body) = send(
            &router,
            json_request(
                "POST",
                paths::COMPUTE_SHEET,
                json!({
                    "skills": { "athletics": 2.5 },
                    "sublimations": [{ "tier": 2 }],
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let warnings = body["warnings"].as_array().cloned().unwrap_or_default();
        let for_field = |field: &str| {
            warnings
                .iter()
                .find(|w| w["field"] == field)
                .cloned()
                .unwrap_or(Value::Null)
        };
        assert_eq!(for_field("sublimations[0].type")["kind"], "invalid_input");
        assert_eq!(for_field("skills.athletics")["kind"], "invalid_input");
        assert_eq!(body["skills"]["athletics"]["invested"], 2);
        assert_eq!(body["sublimations"]["slotsUsed"], 0);
    }

    #[tokio::test]
    async fn create_then_get() {
        let router = test_router();
        let created = create(&router, "Aria").await;
        assert_eq!(created["revision"], 0);
        assert_eq!(created["document"]["name"], "Aria");
        assert_eq!(created["savedAt"], "2025-06-15T10:30:00Z");

        let id = created["id"].as_str().unwrap().to_string();
        let (status, fetched) =
            send(&router, empty_request("GET", &format!("/api/characters/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn save_echoes_revision_with_authoritative_sheet() {
        let router = test_router();
        let created = create(&router, "Kest").await;
        let id: Uuid = serde_json::from_value(created["id"].clone()).unwrap();

        let mut document: CharacterDocument =
            serde_json::from_value(created["document"].clone()).unwrap();
        document.set_characteristic(sheetwright_domain::Characteristic::Presence, 8);
        document.level = Some(20);
        let request = SaveCharacterRequest {
            revision: 42,
            document,
        };

        let (status, saved) = send(
            &router,
            json_request(
                "PUT",
                &paths::character(id),
                serde_json::to_value(&request).unwrap(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["revision"], 42);
        assert_eq!(saved["sheet"]["sublimations"]["slotsMax"], 4);

        let (_, list) = send(&router, empty_request("GET", paths::CHARACTERS)).await;
        assert_eq!(list[0]["level"], 20);
        assert_eq!(list[0]["revision"], 42);
    }

    #[tokio::test]
    async fn save_unknown_character_is_404() {
        let router = test_router();
        let request = SaveCharacterRequest {
            revision: 1,
            document: CharacterDocument::new("Ghost"),
        };
        let (status, body) = send(
            &router,
            json_request(
                "PUT",
                &paths::character(Uuid::new_v4()),
                serde_json::to_value(&request).unwrap(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().starts_with("Character not found"));
    }

    #[tokio::test]
    async fn overlong_name_is_bad_request() {
        let router = test_router();
        let (status, body) = send(
            &router,
            json_request("POST", paths::CHARACTERS, json!({ "name": "x".repeat(500) })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("limit"));
    }

    #[tokio::test]
    async fn delete_then_get_is_404() {
        let router = test_router();
        let created = create(&router, "Bram").await;
        let uri = format!("/api/characters/{}", created["id"].as_str().unwrap());

        let (status, _) = send(&router, empty_request("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&router, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, empty_request("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_id_is_rejected() {
        let router = test_router();
        let (status, _) =
            send(&router, empty_request("GET", "/api/characters/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
