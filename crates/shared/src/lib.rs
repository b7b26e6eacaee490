//! SheetWright Protocol - Shared types for Engine and Player communication
//!
//! This crate contains the REST wire format shared between the Engine (backend)
//! and Player (client):
//! - Request bodies
//! - Response bodies, including the error body
//! - Route paths, so both sides build the same URLs
//!
//! # Design Principles
//!
//! 1. **No business logic** - pure data types and serialization
//! 2. **No domain IDs** - use raw `uuid::Uuid` in DTOs
//! 3. Documents and sheets are the domain types themselves; there is exactly
//!    one JSON shape for each

pub mod requests;
pub mod responses;
pub mod routes;

pub use requests::{CreateCharacterRequest, SaveCharacterRequest};
pub use responses::{CharacterRecord, CharacterSummary, ErrorResponse};
