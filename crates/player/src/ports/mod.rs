//! Player ports.

mod persistence;

pub use persistence::{CharacterPersistencePort, SavedSheet, SyncError};

#[cfg(test)]
pub use persistence::MockCharacterPersistencePort;
