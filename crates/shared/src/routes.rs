//! REST paths served by the engine.

use uuid::Uuid;

pub const HEALTH: &str = "/api/health";
pub const RULES: &str = "/api/rules";
pub const COMPUTE_SHEET: &str = "/api/sheets/compute";
pub const CHARACTERS: &str = "/api/characters";
/// Axum route pattern for one character.
pub const CHARACTER: &str = "/api/characters/{id}";

/// Concrete path of one character.
pub fn character(id: Uuid) -> String {
    format!("{CHARACTERS}/{id}")
}
