//! Per-field validation state store
//!
//! Pure record store with last-write-wins semantics per field. No
//! validation logic lives here; the coordinator and session decide what to
//! write. The store also owns the per-field request-token counters that
//! implement the "latest issued call wins" discipline: it is the single
//! shared mutable resource that overlapping validation calls touch, so the
//! staleness guard lives next to the data it protects.

use admitguard_common::fields::{ExceptionRecord, FieldName, FieldStatus};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct FieldStateStore {
    statuses: BTreeMap<FieldName, FieldStatus>,
    exceptions: BTreeMap<FieldName, ExceptionRecord>,
    tokens: BTreeMap<FieldName, u64>,
}

impl FieldStateStore {
    /// All fields Unvalidated; an exception record (disabled, empty
    /// rationale) for every soft field
    pub fn new() -> Self {
        Self {
            statuses: FieldName::ALL
                .into_iter()
                .map(|f| (f, FieldStatus::Unvalidated))
                .collect(),
            exceptions: FieldName::SOFT
                .into_iter()
                .map(|f| (f, ExceptionRecord::default()))
                .collect(),
            tokens: BTreeMap::new(),
        }
    }

    pub fn status(&self, field: FieldName) -> FieldStatus {
        self.statuses
            .get(&field)
            .copied()
            .unwrap_or(FieldStatus::Unvalidated)
    }

    pub fn set_status(&mut self, field: FieldName, status: FieldStatus) {
        self.statuses.insert(field, status);
    }

    /// Exception record for a soft field; `None` for strict fields
    pub fn exception(&self, field: FieldName) -> Option<&ExceptionRecord> {
        self.exceptions.get(&field)
    }

    /// Overwrite a soft field's exception record. Writes to strict fields
    /// are ignored — they carry no exception state.
    pub fn set_exception(&mut self, field: FieldName, enabled: bool, rationale: String) {
        if let Some(record) = self.exceptions.get_mut(&field) {
            record.enabled = enabled;
            record.rationale = rationale;
        }
    }

    /// Flip the toggle, keeping the rationale text the user already typed
    pub fn set_exception_enabled(&mut self, field: FieldName, enabled: bool) {
        if let Some(record) = self.exceptions.get_mut(&field) {
            record.enabled = enabled;
        }
    }

    pub fn set_rationale(&mut self, field: FieldName, rationale: String) {
        if let Some(record) = self.exceptions.get_mut(&field) {
            record.rationale = rationale;
        }
    }

    /// Count of enabled exceptions across the full soft-field set
    pub fn enabled_exception_count(&self) -> usize {
        self.exceptions.values().filter(|r| r.enabled).count()
    }

    /// Full exception map, for snapshot assembly
    pub fn exceptions(&self) -> &BTreeMap<FieldName, ExceptionRecord> {
        &self.exceptions
    }

    /// Issue a new request token for a field. The returned token is the
    /// field's current one until the next issue; results carrying an older
    /// token must be discarded.
    pub fn issue_token(&mut self, field: FieldName) -> u64 {
        let token = self.tokens.entry(field).or_insert(0);
        *token += 1;
        *token
    }

    pub fn current_token(&self, field: FieldName) -> u64 {
        self.tokens.get(&field).copied().unwrap_or(0)
    }

    /// Restore the exact initial state in a single observable step: every
    /// field Unvalidated, every exception disabled with an empty
    /// rationale. Token counters survive the reset so a stale in-flight
    /// result from before the reset can never be applied after it.
    pub fn reset_all(&mut self) {
        self.statuses = FieldName::ALL
            .into_iter()
            .map(|f| (f, FieldStatus::Unvalidated))
            .collect();
        self.exceptions = FieldName::SOFT
            .into_iter()
            .map(|f| (f, ExceptionRecord::default()))
            .collect();
        for token in self.tokens.values_mut() {
            *token += 1;
        }
    }
}

impl Default for FieldStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let store = FieldStateStore::new();
        for field in FieldName::ALL {
            assert_eq!(store.status(field), FieldStatus::Unvalidated);
        }
        for field in FieldName::SOFT {
            let record = store.exception(field).unwrap();
            assert!(!record.enabled);
            assert!(record.rationale.is_empty());
        }
        for field in FieldName::STRICT {
            assert!(store.exception(field).is_none());
        }
    }

    #[test]
    fn test_last_write_wins() {
        let mut store = FieldStateStore::new();
        store.set_status(FieldName::Email, FieldStatus::Valid);
        store.set_status(FieldName::Email, FieldStatus::HardInvalid);
        assert_eq!(store.status(FieldName::Email), FieldStatus::HardInvalid);
    }

    #[test]
    fn test_exception_writes_to_strict_fields_are_ignored() {
        let mut store = FieldStateStore::new();
        store.set_exception(FieldName::Email, true, "should not stick".into());
        assert!(store.exception(FieldName::Email).is_none());
        assert_eq!(store.enabled_exception_count(), 0);
    }

    #[test]
    fn test_toggle_preserves_rationale() {
        let mut store = FieldStateStore::new();
        store.set_rationale(FieldName::DateOfBirth, "medical gap, documents attached".into());
        store.set_exception_enabled(FieldName::DateOfBirth, true);
        let record = store.exception(FieldName::DateOfBirth).unwrap();
        assert!(record.enabled);
        assert_eq!(record.rationale, "medical gap, documents attached");
    }

    #[test]
    fn test_enabled_count_spans_full_soft_set() {
        let mut store = FieldStateStore::new();
        store.set_exception_enabled(FieldName::DateOfBirth, true);
        store.set_exception_enabled(FieldName::GraduationYear, true);
        store.set_exception_enabled(FieldName::ScreeningTestScore, true);
        assert_eq!(store.enabled_exception_count(), 3);

        store.set_exception_enabled(FieldName::GraduationYear, false);
        assert_eq!(store.enabled_exception_count(), 2);
    }

    #[test]
    fn test_tokens_are_monotonic_per_field() {
        let mut store = FieldStateStore::new();
        let first = store.issue_token(FieldName::Email);
        let second = store.issue_token(FieldName::Email);
        assert!(second > first);
        assert_eq!(store.current_token(FieldName::Email), second);
        // Independent counter per field
        assert_eq!(store.current_token(FieldName::Phone), 0);
    }

    #[test]
    fn test_reset_all_restores_initial_state() {
        let mut store = FieldStateStore::new();
        store.set_status(FieldName::Email, FieldStatus::HardInvalid);
        store.set_exception(FieldName::DateOfBirth, true, "long rationale here".into());

        store.reset_all();

        for field in FieldName::ALL {
            assert_eq!(store.status(field), FieldStatus::Unvalidated);
        }
        for field in FieldName::SOFT {
            let record = store.exception(field).unwrap();
            assert!(!record.enabled);
            assert!(record.rationale.is_empty());
        }
    }

    #[test]
    fn test_reset_all_invalidates_outstanding_tokens() {
        let mut store = FieldStateStore::new();
        let token = store.issue_token(FieldName::Email);
        store.reset_all();
        assert_ne!(store.current_token(FieldName::Email), token);
    }
}
