//! SheetWright Engine library.
//!
//! Server side of SheetWright: stores character documents and serves the
//! authoritative computed sheet for each save.
//!
//! ## Structure
//!
//! - `use_cases/` - Character sheet operations over the repository ports
//! - `infrastructure/` - Ports, storage adapters, clock and configuration
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
