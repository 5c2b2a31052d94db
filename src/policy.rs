//! Compliance policies evaluated by the check step of the audit workflow.
//!
//! A policy turns a block of text into a [`PolicyVerdict`]: a pass/fail decision plus the issues
//! that explain it. The shipped [`BlockedTermPolicy`] fails empty content and any content that
//! contains a blocked term (case-insensitive substring match). Richer rule- or model-based
//! classifiers plug in through [`CompliancePolicy`].

use crate::config::Config;
pub use crate::workflow::state::{ComplianceIssue, Severity};

/// Category attached to the issue raised for empty content.
pub const MISSING_CONTENT_CATEGORY: &str = "Missing Content";
/// Category used for blocked terms that do not name their own.
pub const DEFAULT_TERM_CATEGORY: &str = "Restricted Content";
/// Blocked term used when configuration does not supply any.
pub const DEFAULT_BLOCKED_TERM: &str = "restricted";

/// Outcome of evaluating content against a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyVerdict {
    /// Whether the content may be published as-is.
    pub compliant: bool,
    /// One entry per rule that fired, in rule order.
    pub issues: Vec<ComplianceIssue>,
}

/// Pure evaluation function used by the compliance step.
///
/// Implementations must not perform I/O; the workflow may evaluate the same content repeatedly.
pub trait CompliancePolicy: Send + Sync {
    /// Evaluate `content` and report the decision with its supporting issues.
    fn evaluate(&self, content: &str) -> PolicyVerdict;
}

/// A single term that fails compliance when present in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedTerm {
    term: String,
    needle: String,
    category: String,
    severity: Severity,
}

impl BlockedTerm {
    /// Create a critical rule for `term` under the default category.
    pub fn new(term: impl Into<String>) -> Self {
        let term = term.into();
        let needle = term.to_lowercase();
        Self {
            term,
            needle,
            category: DEFAULT_TERM_CATEGORY.to_string(),
            severity: Severity::Critical,
        }
    }

    /// Override the severity reported when the term is found.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Override the category reported when the term is found.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// The term as configured.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Severity reported for matches.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    fn issue(&self, occurrences: usize) -> ComplianceIssue {
        ComplianceIssue::new(
            self.category.clone(),
            self.severity,
            format!(
                "Content contains blocked term \"{}\" ({occurrences} occurrence{})",
                self.term,
                if occurrences == 1 { "" } else { "s" }
            ),
        )
    }
}

/// Default policy: non-empty content free of every blocked term.
#[derive(Debug, Clone)]
pub struct BlockedTermPolicy {
    terms: Vec<BlockedTerm>,
}

impl BlockedTermPolicy {
    /// Build a policy over the given rules.
    pub fn new(terms: Vec<BlockedTerm>) -> Self {
        Self { terms }
    }

    /// Build the policy described by the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.blocked_terms.clone())
    }

    /// Rules evaluated by this policy, in evaluation order.
    pub fn terms(&self) -> &[BlockedTerm] {
        &self.terms
    }
}

impl Default for BlockedTermPolicy {
    fn default() -> Self {
        Self::new(vec![BlockedTerm::new(DEFAULT_BLOCKED_TERM)])
    }
}

impl CompliancePolicy for BlockedTermPolicy {
    fn evaluate(&self, content: &str) -> PolicyVerdict {
        if content.is_empty() {
            return PolicyVerdict {
                compliant: false,
                issues: vec![ComplianceIssue::new(
                    MISSING_CONTENT_CATEGORY,
                    Severity::Critical,
                    "No content was available to evaluate for this audit subject",
                )],
            };
        }

        let haystack = content.to_lowercase();
        let issues: Vec<ComplianceIssue> = self
            .terms
            .iter()
            .filter(|rule| !rule.needle.is_empty())
            .filter_map(|rule| {
                let occurrences = haystack.matches(rule.needle.as_str()).count();
                (occurrences > 0).then(|| rule.issue(occurrences))
            })
            .collect();

        PolicyVerdict {
            compliant: issues.is_empty(),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_fails_with_missing_content_issue() {
        let verdict = BlockedTermPolicy::default().evaluate("");
        assert!(!verdict.compliant);
        assert_eq!(verdict.issues.len(), 1);
        assert_eq!(verdict.issues[0].category, MISSING_CONTENT_CATEGORY);
        assert_eq!(verdict.issues[0].severity, Severity::Critical);
    }

    #[test]
    fn whitespace_only_content_is_not_empty() {
        let verdict = BlockedTermPolicy::default().evaluate("   ");
        assert!(verdict.compliant);
        assert!(verdict.issues.is_empty());
    }

    #[test]
    fn blocked_term_matches_case_insensitively() {
        let verdict = BlockedTermPolicy::default().evaluate("This clip is RESTRICTED. Restricted!");
        assert!(!verdict.compliant);
        assert_eq!(verdict.issues.len(), 1);
        let issue = &verdict.issues[0];
        assert_eq!(issue.category, DEFAULT_TERM_CATEGORY);
        assert!(issue.description.contains("\"restricted\""));
        assert!(issue.description.contains("2 occurrences"));
        assert!(issue.timestamp.is_none());
    }

    #[test]
    fn clean_content_passes() {
        let verdict = BlockedTermPolicy::default().evaluate("Use the logo on a white background.");
        assert!(verdict.compliant);
        assert!(verdict.issues.is_empty());
    }

    #[test]
    fn every_fired_rule_contributes_an_issue_in_rule_order() {
        let policy = BlockedTermPolicy::new(vec![
            BlockedTerm::new("guaranteed").with_severity(Severity::Warning),
            BlockedTerm::new("Restricted").with_category("Legal"),
            BlockedTerm::new("unused"),
        ]);
        let verdict = policy.evaluate("Guaranteed results, restricted footage");
        assert!(!verdict.compliant);
        let summary: Vec<_> = verdict
            .issues
            .iter()
            .map(|issue| (issue.category.as_str(), issue.severity))
            .collect();
        assert_eq!(
            summary,
            vec![
                (DEFAULT_TERM_CATEGORY, Severity::Warning),
                ("Legal", Severity::Critical)
            ]
        );
    }

    #[test]
    fn evaluation_is_repeatable() {
        let policy = BlockedTermPolicy::default();
        let first = policy.evaluate("restricted");
        let second = policy.evaluate("restricted");
        assert_eq!(first, second);
    }
}
