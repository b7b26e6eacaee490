//! Editing-session synchronization.
//!
//! A session recomputes the sheet locally on every edit, saves the latest
//! document after a quiet period, and reconciles with the engine's
//! authoritative sheet when the save returns.
//!
//! [`SyncSession`] holds the state machine and performs no I/O; [`SyncHandle`]
//! drives one on a tokio task.

mod driver;
mod session;
mod state;

pub use driver::SyncHandle;
pub use session::{SaveOutcome, SaveRequest, SyncSession};
pub use state::{SessionView, SyncState, SyncStats};
