//! Audit log filtering
//!
//! Pure, synchronous view over a cached audit snapshot. The cache is
//! replaced wholesale on every fetch; the filter never re-sorts —
//! chronological order is meaningful audit data.

use admitguard_common::api::AuditEntry;
use serde::{Deserialize, Serialize};

/// Which slice of the log to show, applied before the text search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditFilterTier {
    /// No tier filter
    #[default]
    All,
    /// Only entries flagged for manager review
    Flagged,
    /// Only entries with at least one exception
    Exceptions,
}

/// Apply tier + free-text predicate over the entries, preserving input
/// order. The search is a case-insensitive substring match over candidate
/// name or email; whitespace-only search means no text filter.
pub fn apply<'a>(
    entries: &'a [AuditEntry],
    tier: AuditFilterTier,
    search: &str,
) -> Vec<&'a AuditEntry> {
    let query = search.trim().to_lowercase();

    entries
        .iter()
        .filter(|e| match tier {
            AuditFilterTier::All => true,
            AuditFilterTier::Flagged => e.flagged_for_review,
            AuditFilterTier::Exceptions => e.exception_count > 0,
        })
        .filter(|e| {
            query.is_empty()
                || e.candidate_name.to_lowercase().contains(&query)
                || e.candidate_email.to_lowercase().contains(&query)
        })
        .collect()
}

/// Cached audit snapshot plus the current filter settings
#[derive(Debug, Default)]
pub struct AuditView {
    entries: Vec<AuditEntry>,
    tier: AuditFilterTier,
    search: String,
}

impl AuditView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache wholesale (never merged)
    pub fn replace(&mut self, entries: Vec<AuditEntry>) {
        tracing::debug!(entries = entries.len(), "Audit cache replaced");
        self.entries = entries;
    }

    pub fn set_tier(&mut self, tier: AuditFilterTier) {
        self.tier = tier;
    }

    pub fn tier(&self) -> AuditFilterTier {
        self.tier
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// The cached entries under the current filter settings
    pub fn filtered(&self) -> Vec<&AuditEntry> {
        apply(&self.entries, self.tier, &self.search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, email: &str, exceptions: u32, flagged: bool) -> AuditEntry {
        AuditEntry {
            candidate_name: name.to_string(),
            candidate_email: email.to_string(),
            action: "SUBMISSION".to_string(),
            exception_count: exceptions,
            flagged_for_review: flagged,
            ..Default::default()
        }
    }

    fn sample_log() -> Vec<AuditEntry> {
        vec![
            entry("Priya Sharma", "priya.s@example.com", 3, true),
            entry("Rahul Verma", "rahul@example.com", 0, false),
            entry("Anita Desai", "anita@example.com", 1, false),
            entry("Priyanka Iyer", "p.iyer@example.com", 4, true),
            entry("Suresh Kumar", "suresh@example.com", 0, false),
            entry("Deepa Nair", "deepa@example.com", 2, false),
            entry("Arjun Mehta", "arjun.priya@example.com", 0, true),
            entry("Kavita Rao", "kavita@example.com", 0, false),
            entry("Vikram Singh", "vikram@example.com", 3, true),
            entry("Meera Pillai", "meera@example.com", 1, false),
        ]
    }

    #[test]
    fn test_tier_all_with_empty_search_returns_everything() {
        let log = sample_log();
        assert_eq!(apply(&log, AuditFilterTier::All, "").len(), 10);
        // Whitespace-only search is no filter
        assert_eq!(apply(&log, AuditFilterTier::All, "   ").len(), 10);
    }

    #[test]
    fn test_flagged_tier_plus_search_preserves_order() {
        let log = sample_log();
        let filtered = apply(&log, AuditFilterTier::Flagged, "priya");

        // Flagged AND name/email contains "priya" (case-insensitive):
        // Priya Sharma, Priyanka Iyer, Arjun Mehta (email match), in
        // original order
        let names: Vec<&str> = filtered.iter().map(|e| e.candidate_name.as_str()).collect();
        assert_eq!(names, vec!["Priya Sharma", "Priyanka Iyer", "Arjun Mehta"]);
    }

    #[test]
    fn test_exceptions_tier() {
        let log = sample_log();
        let filtered = apply(&log, AuditFilterTier::Exceptions, "");
        assert!(filtered.iter().all(|e| e.exception_count > 0));
        assert_eq!(filtered.len(), 6);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let log = sample_log();
        let lower = apply(&log, AuditFilterTier::All, "priya");
        let upper = apply(&log, AuditFilterTier::All, "PRIYA");
        assert_eq!(lower.len(), upper.len());
    }

    #[test]
    fn test_filter_is_deterministic() {
        let log = sample_log();
        let first: Vec<String> = apply(&log, AuditFilterTier::Flagged, "a")
            .iter()
            .map(|e| e.candidate_name.clone())
            .collect();
        let second: Vec<String> = apply(&log, AuditFilterTier::Flagged, "a")
            .iter()
            .map(|e| e.candidate_name.clone())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_view_replaces_cache_wholesale() {
        let mut view = AuditView::new();
        view.replace(sample_log());
        assert_eq!(view.filtered().len(), 10);

        view.replace(vec![entry("Solo Entry", "solo@example.com", 0, false)]);
        assert_eq!(view.filtered().len(), 1);
    }

    #[test]
    fn test_view_combines_tier_and_search() {
        let mut view = AuditView::new();
        view.replace(sample_log());
        view.set_tier(AuditFilterTier::Flagged);
        view.set_search("priya");
        assert_eq!(view.filtered().len(), 3);
    }
}
