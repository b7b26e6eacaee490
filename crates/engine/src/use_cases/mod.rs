//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.

pub mod character_sheet;

pub use character_sheet::{CharacterSheetError, CharacterSheetUseCases};
