//! Intake event types and EventBus
//!
//! The session broadcasts every observable state change as an
//! `IntakeEvent`; whatever renders the form subscribes instead of being
//! called back directly. Events serialize with a `type` tag so they can be
//! forwarded over any text transport unchanged.

use admitguard_common::api::CandidateRecord;
use admitguard_common::fields::{AggregateFlagTier, FieldName, FieldStatus, ScoreType};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::submit::SubmitState;

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
}

/// State changes observable by the view layer
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum IntakeEvent {
    /// A field's validation status changed; `message` carries the
    /// server's error text for invalid statuses
    FieldStatusChanged {
        field: FieldName,
        status: FieldStatus,
        message: Option<String>,
    },

    /// The exception panel for a soft field became visible/hidden
    ExceptionPanelVisible { field: FieldName, visible: bool },

    /// The user's exception toggle state for a field
    ExceptionToggled { field: FieldName, enabled: bool },

    /// Local rationale length signal (server remains authoritative)
    RationaleSufficiency {
        field: FieldName,
        chars: usize,
        sufficient: bool,
    },

    /// Aggregate flag tier recomputed from the exception map
    TierChanged {
        tier: AggregateFlagTier,
        enabled_count: usize,
    },

    /// Score representation switched
    ScoreTypeChanged { score_type: ScoreType },

    /// Submit control state (Idle means interactive)
    SubmitStateChanged { state: SubmitState },

    /// Submission accepted; values are the server's, verbatim
    SubmissionConfirmed {
        candidate: Option<CandidateRecord>,
        flagged_for_review: bool,
        exception_count: u32,
    },

    /// All field state wiped back to initial
    FormReset,

    /// Out-of-band notification
    Toast { level: ToastLevel, message: String },
}

/// Broadcast bus for intake events
///
/// Thin wrapper over `tokio::sync::broadcast`; emitting with no
/// subscribers is not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<IntakeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IntakeEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: IntakeEvent) {
        // A send error only means no receivers are currently subscribed
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
