//! Intake form session
//!
//! One `IntakeSession` is constructed per form session and owns every
//! piece of client state: field values, the field-state store, the
//! exception coordinator, the submit orchestrator and the clients. The
//! view layer holds a reference and subscribes to the event bus; there are
//! no ambient singletons.
//!
//! # Overlapping validation calls
//!
//! Per-field validation responses are not guaranteed to arrive in issue
//! order. Every call is bracketed by `begin_validation` /
//! `complete_validation`: begin issues a fresh request token and captures
//! the snapshot; complete applies the result only if the token is still
//! the field's current one. A superseded result is discarded before it can
//! touch the store. The `*_now` conveniences run both halves around a
//! single await and are what ordinary blur/toggle handlers call; an event
//! loop that multiplexes calls drives the two halves itself.

use std::collections::BTreeMap;
use std::sync::Arc;

use admitguard_common::config::ServiceConfig;
use admitguard_common::fields::{FieldName, FieldStatus, FieldVerdict, FormSnapshot, ScoreType};
use admitguard_common::Result;

use crate::client::{CandidateClient, CandidateGateway, ValidationClient, ValidatorBackend};
use crate::coordinator::ExceptionCoordinator;
use crate::events::{EventBus, IntakeEvent, ToastLevel};
use crate::state::FieldStateStore;
use crate::submit::{SubmitOrchestrator, SubmitOutcome, SubmitState};

/// Fields whose server-side rules reference each other: editing one
/// re-validates the other
fn paired_field(field: FieldName) -> Option<FieldName> {
    match field {
        FieldName::InterviewStatus => Some(FieldName::OfferLetterSent),
        FieldName::OfferLetterSent => Some(FieldName::InterviewStatus),
        _ => None,
    }
}

/// A validation call in flight: the token that decides whether its result
/// is still current, the status to revert to on transport failure, and
/// the snapshot to send
#[derive(Debug, Clone)]
pub struct PendingValidation {
    field: FieldName,
    token: u64,
    prior_status: FieldStatus,
    snapshot: FormSnapshot,
}

impl PendingValidation {
    pub fn field(&self) -> FieldName {
        self.field
    }

    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }
}

pub struct IntakeSession {
    values: BTreeMap<FieldName, String>,
    score_type: ScoreType,
    store: FieldStateStore,
    coordinator: ExceptionCoordinator,
    orchestrator: SubmitOrchestrator,
    backend: Arc<dyn ValidatorBackend>,
    gateway: Arc<dyn CandidateGateway>,
    bus: EventBus,
}

impl IntakeSession {
    pub fn new(
        backend: Arc<dyn ValidatorBackend>,
        gateway: Arc<dyn CandidateGateway>,
        bus: EventBus,
    ) -> Self {
        Self {
            values: BTreeMap::new(),
            score_type: ScoreType::default(),
            store: FieldStateStore::new(),
            coordinator: ExceptionCoordinator::new(bus.clone()),
            orchestrator: SubmitOrchestrator::new(bus.clone()),
            backend,
            gateway,
            bus,
        }
    }

    /// Construct a session talking to the real service
    pub fn connect(config: &ServiceConfig) -> Result<Self> {
        let bus = EventBus::default();
        let backend: Arc<dyn ValidatorBackend> = Arc::new(ValidationClient::new(config)?);
        let gateway: Arc<dyn CandidateGateway> = Arc::new(CandidateClient::new(config)?);
        Ok(Self::new(backend, gateway, bus))
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn store(&self) -> &FieldStateStore {
        &self.store
    }

    pub fn submit_state(&self) -> SubmitState {
        self.orchestrator.state()
    }

    pub fn score_type(&self) -> ScoreType {
        self.score_type
    }

    pub fn value(&self, field: FieldName) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Record user input. No validation happens until blur/change.
    pub fn set_value(&mut self, field: FieldName, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Capture the current form as an immutable snapshot
    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot::from_parts(&self.values, self.score_type, self.store.exceptions())
    }

    // ------------------------------------------------------------------
    // Per-field validation
    // ------------------------------------------------------------------

    /// Start a validation call for a field: issue the request token, mark
    /// the field Validating and capture the snapshot to send
    pub fn begin_validation(&mut self, field: FieldName) -> PendingValidation {
        let token = self.store.issue_token(field);
        let prior_status = self.store.status(field);
        self.store.set_status(field, FieldStatus::Validating);
        self.bus.emit(IntakeEvent::FieldStatusChanged {
            field,
            status: FieldStatus::Validating,
            message: None,
        });

        PendingValidation {
            field,
            token,
            prior_status,
            snapshot: self.snapshot(),
        }
    }

    /// Complete a validation call. Only the result of the most recently
    /// issued call for the field is applied; superseded results are
    /// dropped without touching any state.
    pub fn complete_validation(
        &mut self,
        pending: PendingValidation,
        result: Result<FieldVerdict>,
    ) {
        if self.store.current_token(pending.field) != pending.token {
            tracing::debug!(field = %pending.field, "Discarding superseded validation result");
            return;
        }

        match result {
            Ok(verdict) => {
                self.coordinator.apply_verdict(&mut self.store, pending.field, &verdict);
            }
            Err(e) => {
                // Not a verdict: revert to the pre-call status, never
                // silently Valid
                tracing::warn!(field = %pending.field, error = %e, "Field validation call failed");
                self.store.set_status(pending.field, pending.prior_status);
                self.bus.emit(IntakeEvent::FieldStatusChanged {
                    field: pending.field,
                    status: pending.prior_status,
                    message: None,
                });
                self.bus.emit(IntakeEvent::Toast {
                    level: ToastLevel::Warning,
                    message: "Could not reach the validation service. Please retry.".to_string(),
                });
            }
        }
    }

    /// Run one begin → call → complete cycle sequentially
    pub async fn validate_field_now(&mut self, field: FieldName) {
        let pending = self.begin_validation(field);
        let backend = Arc::clone(&self.backend);
        let result = backend.validate_field(field, &pending.snapshot).await;
        self.complete_validation(pending, result);
    }

    // ------------------------------------------------------------------
    // Field event handlers
    // ------------------------------------------------------------------

    /// Input lost focus
    pub async fn field_blurred(&mut self, field: FieldName) {
        self.validate_field_now(field).await;
    }

    /// Select value changed; also re-validates the paired field so the
    /// server re-checks their consistency
    pub async fn field_changed(&mut self, field: FieldName) {
        self.validate_field_now(field).await;
        if let Some(pair) = paired_field(field) {
            self.validate_field_now(pair).await;
        }
    }

    /// Switch between percentage and CGPA; re-validates the score field
    /// if it has a value
    pub async fn set_score_type(&mut self, score_type: ScoreType) {
        if self.score_type == score_type {
            return;
        }
        self.score_type = score_type;
        self.bus.emit(IntakeEvent::ScoreTypeChanged { score_type });

        if !self.value(FieldName::PercentageCgpa).is_empty() {
            self.validate_field_now(FieldName::PercentageCgpa).await;
        }
    }

    /// Flip a soft field's exception toggle. The tier recomputes
    /// immediately and the server sees the new flag through exactly one
    /// re-validation of the field.
    pub async fn toggle_exception(&mut self, field: FieldName, enabled: bool) {
        if self.coordinator.set_exception_enabled(&mut self.store, field, enabled) {
            self.validate_field_now(field).await;
        }
    }

    /// Rationale text edited: local sufficiency signal only, no network
    pub fn rationale_changed(&mut self, field: FieldName, text: &str) {
        self.coordinator.rationale_edited(&mut self.store, field, text);
    }

    /// Rationale lost focus: re-validate so server-side rationale checks
    /// run against the latest text
    pub async fn rationale_blurred(&mut self, field: FieldName) {
        self.validate_field_now(field).await;
    }

    // ------------------------------------------------------------------
    // Submission and reset
    // ------------------------------------------------------------------

    /// Run the full submit sequence. On acceptance the form is wiped back
    /// to its initial state; on rejection or failure all field state is
    /// kept so the user can retry without re-entering data.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let snapshot = self.snapshot();
        let outcome = self
            .orchestrator
            .submit(
                &mut self.store,
                &self.coordinator,
                self.backend.as_ref(),
                self.gateway.as_ref(),
                snapshot,
            )
            .await;

        if matches!(outcome, SubmitOutcome::Accepted { .. }) {
            self.wipe();
        }
        outcome
    }

    /// Explicit user reset
    pub fn reset(&mut self) {
        self.wipe();
    }

    fn wipe(&mut self) {
        self.values.clear();
        self.score_type = ScoreType::default();
        self.store.reset_all();
        self.bus.emit(IntakeEvent::FormReset);
        self.coordinator.recompute_tier(&self.store);
        tracing::info!("Form state reset");
    }
}
