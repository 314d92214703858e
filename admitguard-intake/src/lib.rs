//! # AdmitGuard Intake Client
//!
//! Client-side validation-state orchestrator for the AdmitGuard
//! candidate-intake service. The authoritative rules live on the remote
//! service; this crate tracks per-field validation status, drives the
//! exception/rationale workflow, sequences submission, and projects every
//! state change over an event bus for whatever renders the form.

pub mod audit;
pub mod client;
pub mod coordinator;
pub mod events;
pub mod session;
pub mod state;
pub mod submit;

pub use events::{EventBus, IntakeEvent};
pub use session::IntakeSession;
pub use submit::{SubmitOutcome, SubmitState};
