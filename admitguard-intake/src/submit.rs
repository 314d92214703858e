//! Submission orchestration
//!
//! Sequences full-form validation → error application → candidate
//! creation. At most one submission is in flight: a submit while not Idle
//! is a no-op. The control-release contract is structural — `submit`
//! transitions back to Idle on every path because the inner sequence
//! cannot return without passing through the single exit transition.

use admitguard_common::fields::FormSnapshot;
use serde::Serialize;

use crate::client::{CandidateGateway, ValidatorBackend};
use crate::coordinator::ExceptionCoordinator;
use crate::events::{EventBus, IntakeEvent, ToastLevel};
use crate::state::FieldStateStore;

/// Submit control state. Anything but Idle means a submission is in
/// flight and the control is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
}

/// Terminal result of one submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Candidate stored; carries the server's authoritative review values
    Accepted {
        flagged_for_review: bool,
        exception_count: u32,
    },
    /// Full-form validation said no; field errors were applied, no
    /// creation call was made
    Rejected,
    /// Server rejected the creation itself (duplicate, authorization);
    /// field state left untouched for retry
    Failed { message: String },
    /// Transport failure on either call; not a validation verdict
    ConnectivityError,
    /// A submission was already in flight
    Ignored,
}

pub struct SubmitOrchestrator {
    state: SubmitState,
    bus: EventBus,
}

impl SubmitOrchestrator {
    pub fn new(bus: EventBus) -> Self {
        Self { state: SubmitState::Idle, bus }
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    fn transition(&mut self, new_state: SubmitState) {
        tracing::debug!(old_state = ?self.state, new_state = ?new_state, "Submit transition");
        self.state = new_state;
        self.bus.emit(IntakeEvent::SubmitStateChanged { state: new_state });
    }

    /// Run one submission attempt over an already-built snapshot.
    ///
    /// On success the server's `flagged_for_review` / `exception_count`
    /// are emitted verbatim in the confirmation — never the client's own
    /// tier estimate, which may legitimately differ.
    pub async fn submit(
        &mut self,
        store: &mut FieldStateStore,
        coordinator: &ExceptionCoordinator,
        backend: &dyn ValidatorBackend,
        gateway: &dyn CandidateGateway,
        snapshot: FormSnapshot,
    ) -> SubmitOutcome {
        if self.state != SubmitState::Idle {
            tracing::debug!(state = ?self.state, "Submission already in flight, ignoring");
            return SubmitOutcome::Ignored;
        }

        self.transition(SubmitState::Validating);
        let outcome = self.run(store, coordinator, backend, gateway, snapshot).await;
        // Guaranteed release: the submit control unlocks on every exit path
        self.transition(SubmitState::Idle);
        outcome
    }

    async fn run(
        &mut self,
        store: &mut FieldStateStore,
        coordinator: &ExceptionCoordinator,
        backend: &dyn ValidatorBackend,
        gateway: &dyn CandidateGateway,
        snapshot: FormSnapshot,
    ) -> SubmitOutcome {
        // Always re-validate the whole form, even when every field looks
        // valid: cross-field rules only run in the aggregate call.
        let validation = match backend.validate_form(&snapshot).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "Full-form validation call failed");
                self.bus.emit(IntakeEvent::Toast {
                    level: ToastLevel::Error,
                    message: "Could not reach the validation service. Please try again."
                        .to_string(),
                });
                return SubmitOutcome::ConnectivityError;
            }
        };

        match validation.valid {
            Some(true) => {}
            Some(false) => {
                coordinator.apply_form_errors(store, &validation);
                self.bus.emit(IntakeEvent::Toast {
                    level: ToastLevel::Error,
                    message: "Please fix validation errors before submitting.".to_string(),
                });
                return SubmitOutcome::Rejected;
            }
            // No verdict at all is failed-safe: never read as valid, never
            // read as a rejection either
            None => {
                tracing::warn!("Full-form response carried no verdict");
                self.bus.emit(IntakeEvent::Toast {
                    level: ToastLevel::Error,
                    message: "Could not reach the validation service. Please try again."
                        .to_string(),
                });
                return SubmitOutcome::ConnectivityError;
            }
        }

        self.transition(SubmitState::Submitting);

        match gateway.create(&snapshot).await {
            Ok(response) if response.success => {
                let outcome = SubmitOutcome::Accepted {
                    flagged_for_review: response.flagged_for_review,
                    exception_count: response.exception_count,
                };
                self.bus.emit(IntakeEvent::SubmissionConfirmed {
                    candidate: response.candidate,
                    flagged_for_review: response.flagged_for_review,
                    exception_count: response.exception_count,
                });
                self.bus.emit(IntakeEvent::Toast {
                    level: ToastLevel::Success,
                    message: response
                        .message
                        .unwrap_or_else(|| "Candidate submitted successfully.".to_string()),
                });
                outcome
            }
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| "Submission failed.".to_string());
                tracing::warn!(message = %message, "Candidate creation rejected");
                self.bus.emit(IntakeEvent::Toast {
                    level: ToastLevel::Error,
                    message: message.clone(),
                });
                SubmitOutcome::Failed { message }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Candidate creation call failed");
                self.bus.emit(IntakeEvent::Toast {
                    level: ToastLevel::Error,
                    message: "Could not reach the server. Please try again.".to_string(),
                });
                SubmitOutcome::ConnectivityError
            }
        }
    }
}
