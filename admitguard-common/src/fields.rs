//! Candidate form field model
//!
//! The field set is fixed: seven strict fields whose failures always block,
//! and four soft fields whose failures the reviewer may override with an
//! exception + rationale. Overridability of a concrete failure is decided
//! by the server, not by set membership — see `FieldVerdict`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Minimum rationale length used for the local sufficiency signal.
///
/// UI hint only — the server is authoritative over rationale acceptance.
pub const RATIONALE_MIN_CHARS: usize = 30;

/// Identifier for a candidate form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    FullName,
    Email,
    Phone,
    DateOfBirth,
    HighestQualification,
    GraduationYear,
    PercentageCgpa,
    ScreeningTestScore,
    InterviewStatus,
    Aadhaar,
    OfferLetterSent,
}

impl FieldName {
    /// All form fields, in form order
    pub const ALL: [FieldName; 11] = [
        FieldName::FullName,
        FieldName::Email,
        FieldName::Phone,
        FieldName::DateOfBirth,
        FieldName::HighestQualification,
        FieldName::GraduationYear,
        FieldName::PercentageCgpa,
        FieldName::ScreeningTestScore,
        FieldName::InterviewStatus,
        FieldName::Aadhaar,
        FieldName::OfferLetterSent,
    ];

    /// Fields whose validation failures are always hard-blocking
    pub const STRICT: [FieldName; 7] = [
        FieldName::FullName,
        FieldName::Email,
        FieldName::Phone,
        FieldName::HighestQualification,
        FieldName::InterviewStatus,
        FieldName::Aadhaar,
        FieldName::OfferLetterSent,
    ];

    /// Fields whose failures may be overridden with an exception
    pub const SOFT: [FieldName; 4] = [
        FieldName::DateOfBirth,
        FieldName::GraduationYear,
        FieldName::PercentageCgpa,
        FieldName::ScreeningTestScore,
    ];

    pub fn is_soft(self) -> bool {
        Self::SOFT.contains(&self)
    }

    /// Wire name (snake_case), as used in API paths and JSON keys
    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::FullName => "full_name",
            FieldName::Email => "email",
            FieldName::Phone => "phone",
            FieldName::DateOfBirth => "date_of_birth",
            FieldName::HighestQualification => "highest_qualification",
            FieldName::GraduationYear => "graduation_year",
            FieldName::PercentageCgpa => "percentage_cgpa",
            FieldName::ScreeningTestScore => "screening_test_score",
            FieldName::InterviewStatus => "interview_status",
            FieldName::Aadhaar => "aadhaar",
            FieldName::OfferLetterSent => "offer_letter_sent",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| crate::Error::Parse(format!("unknown field: {}", s)))
    }
}

/// Validation status of a single field
///
/// Exactly one status per field at any time. Transitions are driven only
/// by the latest completed validation call for that field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// No completed validation yet
    Unvalidated,
    /// A validation call is in flight
    Validating,
    /// Latest call reported valid
    Valid,
    /// Latest call reported invalid, override possible
    SoftInvalid,
    /// Latest call reported invalid, no override possible
    HardInvalid,
}

/// Normalized per-field validation verdict
///
/// `exception_allowed` on the wire decides soft vs hard; absent means hard
/// regardless of the field's soft-set membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldVerdict {
    Valid,
    SoftInvalid { error: String },
    HardInvalid { error: String },
}

impl FieldVerdict {
    /// The field status this verdict maps to
    pub fn status(&self) -> FieldStatus {
        match self {
            FieldVerdict::Valid => FieldStatus::Valid,
            FieldVerdict::SoftInvalid { .. } => FieldStatus::SoftInvalid,
            FieldVerdict::HardInvalid { .. } => FieldStatus::HardInvalid,
        }
    }
}

/// Per-field exception override state
///
/// Exists for every soft field from form initialization; reset, never
/// deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub rationale: String,
}

impl ExceptionRecord {
    /// Local sufficiency signal only — the server decides acceptance
    pub fn rationale_sufficient(&self) -> bool {
        self.rationale.trim().chars().count() >= RATIONALE_MIN_CHARS
    }
}

/// Review-urgency classification derived from the enabled-exception count
///
/// Always recomputed from the full exception map, never patched
/// incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFlagTier {
    None,
    Some,
    Flagged,
}

impl AggregateFlagTier {
    pub fn from_enabled_count(count: usize) -> Self {
        match count {
            0 => AggregateFlagTier::None,
            1 | 2 => AggregateFlagTier::Some,
            _ => AggregateFlagTier::Flagged,
        }
    }
}

/// Score representation for the `percentage_cgpa` field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    #[default]
    Percentage,
    Cgpa,
}

impl ScoreType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreType::Percentage => "percentage",
            ScoreType::Cgpa => "cgpa",
        }
    }
}

/// Immutable capture of the full form, sent as the body of every
/// validation and submission call
///
/// Built fresh for each call and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormSnapshot {
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
    pub exceptions: BTreeMap<FieldName, ExceptionRecord>,
}

impl FormSnapshot {
    /// Assemble a snapshot from the session's current values and
    /// exception map
    pub fn from_parts(
        values: &BTreeMap<FieldName, String>,
        score_type: ScoreType,
        exceptions: &BTreeMap<FieldName, ExceptionRecord>,
    ) -> Self {
        let value = |f: FieldName| values.get(&f).cloned().unwrap_or_default();
        Self {
            full_name: value(FieldName::FullName),
            email: value(FieldName::Email),
            phone: value(FieldName::Phone),
            date_of_birth: value(FieldName::DateOfBirth),
            highest_qualification: value(FieldName::HighestQualification),
            graduation_year: value(FieldName::GraduationYear),
            percentage_cgpa: value(FieldName::PercentageCgpa),
            score_type,
            screening_test_score: value(FieldName::ScreeningTestScore),
            interview_status: value(FieldName::InterviewStatus),
            aadhaar: value(FieldName::Aadhaar),
            offer_letter_sent: value(FieldName::OfferLetterSent),
            exceptions: exceptions.clone(),
        }
    }

    /// Value of a single field, as the wire carries it
    pub fn value(&self, field: FieldName) -> &str {
        match field {
            FieldName::FullName => &self.full_name,
            FieldName::Email => &self.email,
            FieldName::Phone => &self.phone,
            FieldName::DateOfBirth => &self.date_of_birth,
            FieldName::HighestQualification => &self.highest_qualification,
            FieldName::GraduationYear => &self.graduation_year,
            FieldName::PercentageCgpa => &self.percentage_cgpa,
            FieldName::ScreeningTestScore => &self.screening_test_score,
            FieldName::InterviewStatus => &self.interview_status,
            FieldName::Aadhaar => &self.aadhaar,
            FieldName::OfferLetterSent => &self.offer_letter_sent,
        }
    }
}
