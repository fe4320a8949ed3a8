// src/session/mod.rs
pub mod controller;
pub mod state;
pub mod store;

pub use controller::{ExportOutcome, SessionController, SubmitOutcome};
pub use state::{Mode, RequestDraft, SessionSnapshot, ViewState};
pub use store::SessionStore;
