//! Application layer: editing sessions.

pub mod sync;
