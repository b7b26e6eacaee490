//! Player-side editing sessions.
//!
//! Edits recompute the sheet locally for instant feedback; the latest document
//! is saved to the engine after a quiet period and reconciled with the
//! engine's authoritative sheet.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;

pub use application::sync::{
    SaveOutcome, SaveRequest, SessionView, SyncHandle, SyncSession, SyncState, SyncStats,
};
pub use config::{ApiConfig, SyncConfig};
pub use infrastructure::HttpCharacterApi;
pub use ports::{CharacterPersistencePort, SavedSheet, SyncError};
