//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod config;
pub mod memory_repo;
pub mod ports;
pub mod sqlite_repo;
