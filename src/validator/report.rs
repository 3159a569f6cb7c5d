//! Conformance report types

use serde::Serialize;

/// Outcome of one conformance check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub check: String,
    pub passed: bool,
    /// The check had nothing to exercise; counts as passed
    pub skipped: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn pass(check: &str, detail: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            passed: true,
            skipped: false,
            detail: detail.into(),
        }
    }

    pub fn fail(check: &str, detail: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            passed: false,
            skipped: false,
            detail: detail.into(),
        }
    }

    pub fn skip(check: &str, detail: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            passed: true,
            skipped: true,
            detail: detail.into(),
        }
    }
}

/// All checks run against one server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConformanceReport {
    pub url: String,
    pub passed: bool,
    pub checks: Vec<CheckResult>,
}

impl ConformanceReport {
    pub fn new(url: impl Into<String>, checks: Vec<CheckResult>) -> Self {
        let passed = checks.iter().all(|c| c.passed);
        Self {
            url: url.into(),
            passed,
            checks,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.check == name)
    }
}
