//! Typed audit state threaded through the workflow, and the patch nodes return.

use super::reducer::{AppendOnly, LastWrite, Reducer};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while constructing an audit state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// The audit subject was empty or whitespace.
    #[error("audit subject must not be empty")]
    EmptySubject,
}

/// A severity label that is not one of `critical`, `warning` or `info`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown severity `{0}`")]
pub struct UnknownSeverity(pub String);

/// How serious a compliance issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Blocks publication.
    Critical,
    /// Needs review.
    Warning,
    /// Informational only.
    Info,
}

impl Severity {
    /// Upper-case label used in reports and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

/// A single violation found during an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    /// Rule family, e.g. `Restricted Content`.
    pub category: String,
    /// Severity assigned by the rule that fired.
    pub severity: Severity,
    /// Human readable explanation.
    pub description: String,
    /// Position in the media the issue refers to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ComplianceIssue {
    /// Create an issue without a media timestamp.
    pub fn new(
        category: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            severity,
            description: description.into(),
            timestamp: None,
        }
    }

    /// Attach a media timestamp such as `00:32`.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Overall result of an audit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FinalStatus {
    /// Content passed every rule.
    Pass,
    /// At least one rule fired.
    Fail,
    /// No evaluation has completed yet.
    #[default]
    Pending,
}

impl FinalStatus {
    /// Upper-case label used in reports and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Pending => "PENDING",
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial update produced by a node.
///
/// `None` leaves an overwrite field untouched; list fields only carry additions, so a patch
/// cannot drop or reorder accumulated entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct StatePatch {
    /// Replacement for the working content.
    pub content: Option<String>,
    /// Replacement for the transcript.
    pub transcript: Option<String>,
    /// Replacement for the OCR lines.
    pub ocr_text: Option<Vec<String>>,
    /// Issues to append.
    pub compliance_results: Vec<ComplianceIssue>,
    /// Diagnostics to append.
    pub errors: Vec<String>,
    /// Replacement for the final status.
    pub final_status: Option<FinalStatus>,
    /// Replacement for the final report.
    pub final_report: Option<String>,
    /// Replacement for the routing flag.
    pub compliant: Option<bool>,
}

/// State record for one audit.
///
/// The subject fields are fixed at construction. Every other field is wrapped in the reducer
/// that defines its merge policy and changes only through [`AuditState::apply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditState {
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_id: Option<String>,
    content: LastWrite<String>,
    transcript: LastWrite<Option<String>>,
    ocr_text: LastWrite<Vec<String>>,
    compliance_results: AppendOnly<ComplianceIssue>,
    errors: AppendOnly<String>,
    final_status: LastWrite<FinalStatus>,
    final_report: LastWrite<Option<String>>,
    compliant: LastWrite<bool>,
}

impl AuditState {
    /// Start an audit for `query` with empty accumulators and a pending status.
    pub fn new(query: impl Into<String>) -> Result<Self, StateError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(StateError::EmptySubject);
        }
        Ok(Self {
            query,
            video_url: None,
            video_id: None,
            content: LastWrite::default(),
            transcript: LastWrite::default(),
            ocr_text: LastWrite::default(),
            compliance_results: AppendOnly::new(),
            errors: AppendOnly::new(),
            final_status: LastWrite::default(),
            final_report: LastWrite::default(),
            compliant: LastWrite::default(),
        })
    }

    /// Record the video this audit refers to.
    pub fn with_video_url(mut self, video_url: impl Into<String>) -> Self {
        self.video_url = Some(video_url.into());
        self
    }

    /// Record the host-assigned short video identifier.
    pub fn with_video_id(mut self, video_id: impl Into<String>) -> Self {
        self.video_id = Some(video_id.into());
        self
    }

    /// Seed the transcript extracted ahead of the audit.
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = LastWrite::new(Some(transcript.into()));
        self
    }

    /// Seed the OCR lines extracted ahead of the audit.
    pub fn with_ocr_text(mut self, lines: Vec<String>) -> Self {
        self.ocr_text = LastWrite::new(lines);
        self
    }

    /// Fold a node patch into the state using each field's reducer.
    pub fn apply(&mut self, patch: StatePatch) {
        let StatePatch {
            content,
            transcript,
            ocr_text,
            compliance_results,
            errors,
            final_status,
            final_report,
            compliant,
        } = patch;

        self.content.reduce(content);
        self.transcript.reduce(transcript.map(Some));
        self.ocr_text.reduce(ocr_text);
        self.compliance_results.reduce(compliance_results);
        self.errors.reduce(errors);
        self.final_status.reduce(final_status);
        self.final_report.reduce(final_report.map(Some));
        self.compliant.reduce(compliant);
    }

    /// Audit subject used as the retrieval query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Video under audit, if any.
    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    /// Short video identifier, if assigned.
    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    /// Current working content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Transcript, if extracted.
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    /// OCR lines, if extracted.
    pub fn ocr_text(&self) -> &[String] {
        &self.ocr_text
    }

    /// Issues accumulated so far.
    pub fn compliance_results(&self) -> &[ComplianceIssue] {
        &self.compliance_results
    }

    /// Diagnostics accumulated so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Current overall status.
    pub fn final_status(&self) -> FinalStatus {
        *self.final_status
    }

    /// Report written by the compliance step.
    pub fn final_report(&self) -> Option<&str> {
        self.final_report.as_deref()
    }

    /// Routing flag set by the compliance and remediation steps.
    pub fn compliant(&self) -> bool {
        *self.compliant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_empty_and_pending() {
        let state = AuditState::new("compliance guidelines").expect("state");
        assert_eq!(state.query(), "compliance guidelines");
        assert_eq!(state.content(), "");
        assert!(state.compliance_results().is_empty());
        assert!(state.errors().is_empty());
        assert_eq!(state.final_status(), FinalStatus::Pending);
        assert!(state.final_report().is_none());
        assert!(!state.compliant());
    }

    #[test]
    fn blank_subject_is_rejected() {
        assert_eq!(AuditState::new("  \n").unwrap_err(), StateError::EmptySubject);
    }

    #[test]
    fn apply_appends_lists_and_overwrites_scalars() {
        let mut state = AuditState::new("q")
            .expect("state")
            .with_transcript("hello")
            .with_ocr_text(vec!["SALE".into()]);
        let first = ComplianceIssue::new("A", Severity::Warning, "first");
        let second = ComplianceIssue::new("B", Severity::Info, "second").with_timestamp("00:32");

        state.apply(StatePatch {
            content: Some("retrieved".into()),
            compliance_results: vec![first.clone()],
            errors: vec!["e1".into()],
            ..Default::default()
        });
        state.apply(StatePatch {
            content: Some("redacted".into()),
            compliance_results: vec![second.clone()],
            compliant: Some(true),
            ..Default::default()
        });

        assert_eq!(state.content(), "redacted");
        assert_eq!(state.compliance_results(), &[first, second]);
        assert_eq!(state.errors(), &["e1".to_string()]);
        assert!(state.compliant());
        assert_eq!(state.transcript(), Some("hello"));
        assert_eq!(state.ocr_text(), &["SALE".to_string()]);
    }

    #[test]
    fn empty_patch_leaves_state_unchanged() {
        let mut state = AuditState::new("q").expect("state");
        state.apply(StatePatch {
            final_status: Some(FinalStatus::Fail),
            final_report: Some("report".into()),
            ..Default::default()
        });
        let before = state.clone();
        state.apply(StatePatch::default());
        assert_eq!(state, before);
    }

    #[test]
    fn severity_parsing_names_the_rejected_label() {
        assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Warning));
        let error = "fatal".parse::<Severity>().unwrap_err();
        assert_eq!(error, UnknownSeverity("fatal".into()));
        assert_eq!(error.to_string(), "unknown severity `fatal`");
    }

    #[test]
    fn issues_serialize_with_upper_case_severity() {
        let issue = ComplianceIssue::new("Restricted Content", Severity::Critical, "found");
        let json = serde_json::to_value(&issue).expect("json");
        assert_eq!(json["severity"], "CRITICAL");
        assert!(json.get("timestamp").is_none());
        assert_eq!(serde_json::to_value(FinalStatus::Pass).expect("json"), "PASS");
    }
}
