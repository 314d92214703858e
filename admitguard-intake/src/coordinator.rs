//! Exception workflow coordination
//!
//! Translates validation verdicts into field-store updates and recomputes
//! the aggregate flag tier. The coordinator is synchronous and owns no
//! state of its own; the session drives it and issues the re-validation
//! calls toggles require. Panel visibility rules:
//!
//! - valid          → panel hidden, toggle untouched
//! - soft-invalid   → panel shown, toggle untouched
//! - hard-invalid   → panel forced hidden regardless of the toggle
//!
//! The tier is always recomputed from the full exception map. Counting the
//! whole map (not just visible panels) keeps it correct after resets and
//! bulk error application.

use admitguard_common::api::FormValidationResult;
use admitguard_common::fields::{
    AggregateFlagTier, FieldName, FieldStatus, FieldVerdict, RATIONALE_MIN_CHARS,
};

use crate::events::{EventBus, IntakeEvent};
use crate::state::FieldStateStore;

pub struct ExceptionCoordinator {
    bus: EventBus,
}

impl ExceptionCoordinator {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    /// Apply a completed validation verdict to the store.
    ///
    /// Callers are responsible for the staleness check — only the result
    /// of the most recently issued call for a field may reach this point.
    pub fn apply_verdict(
        &self,
        store: &mut FieldStateStore,
        field: FieldName,
        verdict: &FieldVerdict,
    ) {
        let (status, message, panel_visible) = match verdict {
            FieldVerdict::Valid => (FieldStatus::Valid, None, false),
            FieldVerdict::SoftInvalid { error } => {
                (FieldStatus::SoftInvalid, Some(error.clone()), true)
            }
            FieldVerdict::HardInvalid { error } => {
                (FieldStatus::HardInvalid, Some(error.clone()), false)
            }
        };

        store.set_status(field, status);
        tracing::debug!(field = %field, status = ?status, "Applied validation verdict");

        self.bus.emit(IntakeEvent::FieldStatusChanged { field, status, message });
        if field.is_soft() {
            self.bus
                .emit(IntakeEvent::ExceptionPanelVisible { field, visible: panel_visible });
        }

        self.recompute_tier(store);
    }

    /// Flip a soft field's exception toggle, preserving the rationale.
    /// Returns true when the caller must re-validate the field (always,
    /// for soft fields — the server must see the new flag).
    pub fn set_exception_enabled(
        &self,
        store: &mut FieldStateStore,
        field: FieldName,
        enabled: bool,
    ) -> bool {
        if !field.is_soft() {
            tracing::warn!(field = %field, "Ignoring exception toggle on strict field");
            return false;
        }

        store.set_exception_enabled(field, enabled);
        self.bus.emit(IntakeEvent::ExceptionToggled { field, enabled });
        self.recompute_tier(store);
        true
    }

    /// Update rationale text. Local sufficiency signal only — no network.
    pub fn rationale_edited(&self, store: &mut FieldStateStore, field: FieldName, text: &str) {
        if !field.is_soft() {
            return;
        }

        store.set_rationale(field, text.to_string());
        let chars = text.trim().chars().count();
        self.bus.emit(IntakeEvent::RationaleSufficiency {
            field,
            chars,
            sufficient: chars >= RATIONALE_MIN_CHARS,
        });
    }

    /// Apply a full-form rejection: hard errors as HardInvalid messages,
    /// soft errors as SoftInvalid with the panel forced visible.
    pub fn apply_form_errors(&self, store: &mut FieldStateStore, result: &FormValidationResult) {
        for (field, error) in result.known_errors() {
            store.set_status(field, FieldStatus::HardInvalid);
            self.bus.emit(IntakeEvent::FieldStatusChanged {
                field,
                status: FieldStatus::HardInvalid,
                message: Some(error.to_string()),
            });
            if field.is_soft() {
                self.bus
                    .emit(IntakeEvent::ExceptionPanelVisible { field, visible: false });
            }
        }

        for (field, error) in result.known_soft_errors() {
            store.set_status(field, FieldStatus::SoftInvalid);
            self.bus.emit(IntakeEvent::FieldStatusChanged {
                field,
                status: FieldStatus::SoftInvalid,
                message: Some(error.to_string()),
            });
            self.bus
                .emit(IntakeEvent::ExceptionPanelVisible { field, visible: true });
        }

        self.recompute_tier(store);
    }

    /// Recompute the aggregate tier from the full exception map
    pub fn recompute_tier(&self, store: &FieldStateStore) -> AggregateFlagTier {
        let enabled_count = store.enabled_exception_count();
        let tier = AggregateFlagTier::from_enabled_count(enabled_count);
        self.bus.emit(IntakeEvent::TierChanged { tier, enabled_count });
        tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ExceptionCoordinator, FieldStateStore, tokio::sync::broadcast::Receiver<IntakeEvent>) {
        let bus = EventBus::new(64);
        let rx = bus.subscribe();
        (ExceptionCoordinator::new(bus), FieldStateStore::new(), rx)
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<IntakeEvent>) -> Vec<IntakeEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_valid_verdict_hides_panel_but_keeps_toggle() {
        let (coordinator, mut store, mut rx) = setup();
        store.set_exception(FieldName::GraduationYear, true, "kept".into());

        coordinator.apply_verdict(&mut store, FieldName::GraduationYear, &FieldVerdict::Valid);

        assert_eq!(store.status(FieldName::GraduationYear), FieldStatus::Valid);
        // Toggle is a user action; a valid verdict does not clear it
        assert!(store.exception(FieldName::GraduationYear).unwrap().enabled);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            IntakeEvent::ExceptionPanelVisible { field: FieldName::GraduationYear, visible: false }
        )));
    }

    #[test]
    fn test_soft_invalid_shows_panel() {
        let (coordinator, mut store, mut rx) = setup();

        coordinator.apply_verdict(
            &mut store,
            FieldName::DateOfBirth,
            &FieldVerdict::SoftInvalid { error: "Too young".into() },
        );

        assert_eq!(store.status(FieldName::DateOfBirth), FieldStatus::SoftInvalid);
        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            IntakeEvent::ExceptionPanelVisible { field: FieldName::DateOfBirth, visible: true }
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            IntakeEvent::FieldStatusChanged { status: FieldStatus::SoftInvalid, message: Some(m), .. }
                if m == "Too young"
        )));
    }

    #[test]
    fn test_hard_invalid_forces_panel_hidden() {
        let (coordinator, mut store, mut rx) = setup();
        store.set_exception_enabled(FieldName::DateOfBirth, true);

        // Server says hard (e.g. malformed date) even though the field is
        // in the soft set and the toggle is on
        coordinator.apply_verdict(
            &mut store,
            FieldName::DateOfBirth,
            &FieldVerdict::HardInvalid { error: "Bad format".into() },
        );

        assert_eq!(store.status(FieldName::DateOfBirth), FieldStatus::HardInvalid);
        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            IntakeEvent::ExceptionPanelVisible { field: FieldName::DateOfBirth, visible: false }
        )));
    }

    #[test]
    fn test_toggle_on_strict_field_is_rejected() {
        let (coordinator, mut store, _rx) = setup();
        assert!(!coordinator.set_exception_enabled(&mut store, FieldName::Email, true));
        assert_eq!(store.enabled_exception_count(), 0);
    }

    #[test]
    fn test_tier_recompute_is_idempotent() {
        let (coordinator, mut store, _rx) = setup();
        store.set_exception_enabled(FieldName::DateOfBirth, true);
        store.set_exception_enabled(FieldName::GraduationYear, true);

        let first = coordinator.recompute_tier(&store);
        let second = coordinator.recompute_tier(&store);
        assert_eq!(first, AggregateFlagTier::Some);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rationale_sufficiency_signal() {
        let (coordinator, mut store, mut rx) = setup();

        coordinator.rationale_edited(&mut store, FieldName::ScreeningTestScore, "too short");
        coordinator.rationale_edited(
            &mut store,
            FieldName::ScreeningTestScore,
            "score dip due to documented illness during the test window",
        );

        let events = drain(&mut rx);
        let signals: Vec<bool> = events
            .iter()
            .filter_map(|e| match e {
                IntakeEvent::RationaleSufficiency { sufficient, .. } => Some(*sufficient),
                _ => None,
            })
            .collect();
        assert_eq!(signals, vec![false, true]);
    }

    #[test]
    fn test_apply_form_errors_marks_both_kinds() {
        let (coordinator, mut store, mut rx) = setup();

        let result: FormValidationResult = serde_json::from_str(
            r#"{
                "valid": false,
                "errors": {"email": "Invalid format"},
                "soft_errors": {"graduation_year": {"error": "Out of range"}}
            }"#,
        )
        .unwrap();

        coordinator.apply_form_errors(&mut store, &result);

        assert_eq!(store.status(FieldName::Email), FieldStatus::HardInvalid);
        assert_eq!(store.status(FieldName::GraduationYear), FieldStatus::SoftInvalid);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            IntakeEvent::ExceptionPanelVisible { field: FieldName::GraduationYear, visible: true }
        )));
    }
}
