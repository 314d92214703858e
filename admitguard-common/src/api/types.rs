//! Wire types for the AdmitGuard validation/candidate/audit service
//!
//! All responses are decoded tolerantly: unknown keys are ignored and
//! missing optionals default. A per-field response without a `valid` key
//! yields no verdict at all (failed-safe) — it is never read as valid.

use crate::fields::{FieldName, FieldVerdict, ScoreType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

// ========================================
// Validation responses
// ========================================

/// Raw body of `POST /api/validate/{field}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldResult {
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub exception_allowed: Option<bool>,
}

impl FieldResult {
    /// Normalize into a verdict. `None` means the response carried no
    /// usable verdict and the call must be treated as failed.
    pub fn into_verdict(self) -> Option<FieldVerdict> {
        match self.valid? {
            true => Some(FieldVerdict::Valid),
            false => {
                let error = self.error.unwrap_or_else(|| "Invalid value.".to_string());
                if self.exception_allowed.unwrap_or(false) {
                    Some(FieldVerdict::SoftInvalid { error })
                } else {
                    Some(FieldVerdict::HardInvalid { error })
                }
            }
        }
    }
}

/// Detail record under `soft_errors` in the full-form response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoftErrorDetail {
    #[serde(default)]
    pub error: String,
}

/// Body of `POST /api/validate` (full form)
///
/// Error maps are keyed by wire field name; keys that don't name a known
/// field are skipped by the typed accessors rather than failing decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormValidationResult {
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
    #[serde(default)]
    pub soft_errors: BTreeMap<String, SoftErrorDetail>,
}

impl FormValidationResult {
    /// Hard errors for fields this client knows about
    pub fn known_errors(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.errors
            .iter()
            .filter_map(|(k, v)| Some((FieldName::from_str(k).ok()?, v.as_str())))
    }

    /// Soft errors for fields this client knows about
    pub fn known_soft_errors(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.soft_errors
            .iter()
            .filter_map(|(k, v)| Some((FieldName::from_str(k).ok()?, v.error.as_str())))
    }
}

// ========================================
// Candidate records
// ========================================

/// Exception applied to a stored candidate / audit entry
///
/// Field kept as the raw wire name so an unknown field in server data
/// never breaks decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppliedException {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub rationale: String,
}

/// A candidate as stored by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: Uuid,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub highest_qualification: String,
    #[serde(default)]
    pub graduation_year: String,
    #[serde(default)]
    pub percentage_cgpa: String,
    #[serde(default)]
    pub score_type: ScoreType,
    #[serde(default)]
    pub screening_test_score: String,
    #[serde(default)]
    pub interview_status: String,
    #[serde(default)]
    pub aadhaar: String,
    #[serde(default)]
    pub offer_letter_sent: String,
    #[serde(default)]
    pub exceptions: Vec<AppliedException>,
    #[serde(default)]
    pub exception_count: u32,
    #[serde(default)]
    pub flagged_for_review: bool,
    #[serde(default)]
    pub submitted_at: String,
}

/// Body of `POST /api/candidates`
///
/// On 422 the same shape carries `success: false` plus `errors`.
/// `flagged_for_review` and `exception_count` are the server's
/// authoritative values for the confirmation view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub candidate: Option<CandidateRecord>,
    #[serde(default)]
    pub flagged_for_review: bool,
    #[serde(default)]
    pub exception_count: u32,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

/// Body of `GET /api/candidates`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateListResponse {
    #[serde(default)]
    pub candidates: Vec<CandidateRecord>,
    #[serde(default)]
    pub total: u64,
}

/// Body of `GET /api/candidates/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub candidate: CandidateRecord,
}

// ========================================
// Audit log and dashboard
// ========================================

/// One submission event in the server-owned audit log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub candidate_id: Option<Uuid>,
    #[serde(default)]
    pub candidate_name: String,
    #[serde(default)]
    pub candidate_email: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub exception_count: u32,
    #[serde(default)]
    pub flagged_for_review: bool,
    #[serde(default)]
    pub exceptions: Vec<AppliedException>,
    #[serde(default)]
    pub timestamp: String,
}

impl AuditEntry {
    /// Parsed timestamp, if the server sent a recognizable one
    pub fn timestamp_parsed(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}

/// Body of `GET /api/audit-log`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLogResponse {
    #[serde(default)]
    pub log: Vec<AuditEntry>,
}

/// Body of `GET /api/dashboard`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_submissions: u64,
    #[serde(default)]
    pub flagged_count: u64,
    #[serde(default)]
    pub exception_rate: f64,
}

// ========================================
// Admin types
// ========================================

/// Body of `POST /api/admin/login` and the admin CRUD mutations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /api/admin/status`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminStatusResponse {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub user: Option<String>,
}

/// Aggregate statistics in the admin candidate listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub flagged: u64,
    #[serde(default)]
    pub exception_rate: f64,
}

/// Body of `GET /api/admin/candidates`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminListResponse {
    #[serde(default)]
    pub candidates: Vec<CandidateRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub stats: AdminStats,
}

/// Body of `PUT /api/admin/candidates/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpdateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub candidate: Option<CandidateRecord>,
}

/// Partial candidate edit sent by the admin panel
///
/// Only present keys are serialized; absent fields stay untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_letter_sent: Option<String>,
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_result_verdicts() {
        let valid = FieldResult { valid: Some(true), error: None, exception_allowed: None };
        assert_eq!(valid.into_verdict(), Some(FieldVerdict::Valid));

        let soft = FieldResult {
            valid: Some(false),
            error: Some("Too low".into()),
            exception_allowed: Some(true),
        };
        assert_eq!(
            soft.into_verdict(),
            Some(FieldVerdict::SoftInvalid { error: "Too low".into() })
        );

        // exception_allowed absent → hard, regardless of the field
        let hard = FieldResult { valid: Some(false), error: None, exception_allowed: None };
        assert_eq!(
            hard.into_verdict(),
            Some(FieldVerdict::HardInvalid { error: "Invalid value.".into() })
        );
    }

    #[test]
    fn test_missing_valid_yields_no_verdict() {
        let json = r#"{"error": "something", "extra_key": 42}"#;
        let result: FieldResult = serde_json::from_str(json).unwrap();
        assert!(result.into_verdict().is_none());
    }

    #[test]
    fn test_field_result_tolerates_unknown_keys() {
        let json = r#"{"valid": false, "error": "Bad", "rule_type": "soft", "exception_allowed": true}"#;
        let result: FieldResult = serde_json::from_str(json).unwrap();
        assert_eq!(
            result.into_verdict(),
            Some(FieldVerdict::SoftInvalid { error: "Bad".into() })
        );
    }

    #[test]
    fn test_form_result_skips_unknown_field_keys() {
        let json = r#"{
            "valid": false,
            "errors": {"email": "Invalid format", "mystery_field": "??"},
            "soft_errors": {"graduation_year": {"error": "Out of range"}}
        }"#;
        let result: FormValidationResult = serde_json::from_str(json).unwrap();

        let errors: Vec<_> = result.known_errors().collect();
        assert_eq!(errors, vec![(FieldName::Email, "Invalid format")]);

        let soft: Vec<_> = result.known_soft_errors().collect();
        assert_eq!(soft, vec![(FieldName::GraduationYear, "Out of range")]);
    }

    #[test]
    fn test_submission_response_defaults() {
        let json = r#"{"success": true}"#;
        let response: SubmissionResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert!(!response.flagged_for_review);
        assert_eq!(response.exception_count, 0);
        assert!(response.candidate.is_none());
    }

    #[test]
    fn test_audit_entry_timestamp_parsing() {
        let entry = AuditEntry {
            timestamp: "2025-11-03T14:22:05.123456".to_string(),
            ..Default::default()
        };
        assert!(entry.timestamp_parsed().is_some());

        let bad = AuditEntry { timestamp: "yesterday".to_string(), ..Default::default() };
        assert!(bad.timestamp_parsed().is_none());
    }

    #[test]
    fn test_candidate_update_serializes_only_present_fields() {
        let update = CandidateUpdate {
            email: Some("new@example.com".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["email"], "new@example.com");
    }
}
