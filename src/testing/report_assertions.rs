//! Fluent assertion API for parse reports

use crate::parsing::{Failure, FailureKind, ParseReport};
use serde_json::Value;

/// Create an assertion builder for a report
pub fn assert_report(report: &ParseReport) -> ReportAssertion<'_> {
    ReportAssertion {
        report,
        context: "report".to_string(),
    }
}

pub struct ReportAssertion<'a> {
    pub(crate) report: &'a ParseReport,
    pub(crate) context: String,
}

impl<'a> ReportAssertion<'a> {
    /// Assert the parse succeeded
    pub fn found(self) -> Self {
        if let Some(failure) = self.report.failure() {
            panic!(
                "{}: Expected a successful parse, got {} (deepest: {})",
                self.context,
                failure,
                failure.deepest()
            );
        }
        self
    }

    /// Assert the parse failed with `kind`
    pub fn failed_with(self, kind: FailureKind) -> Self {
        match self.report.code() {
            Some(actual) => assert_eq!(
                actual, kind,
                "{}: Expected failure {}, found {}",
                self.context, kind, actual
            ),
            None => panic!(
                "{}: Expected failure {}, but the parse succeeded with {:?}",
                self.context,
                kind,
                self.report.result()
            ),
        }
        self
    }

    pub fn result(self, expected: &Value) -> Self {
        assert_eq!(
            self.report.result(),
            Some(expected),
            "{}: Unexpected result",
            self.context
        );
        self
    }

    /// Assert the value at a JSON pointer (`/children/0/name`) inside the result
    pub fn result_at(self, pointer: &str, expected: &Value) -> Self {
        let actual = self
            .report
            .result()
            .and_then(|result| result.pointer(pointer));
        assert_eq!(
            actual,
            Some(expected),
            "{}: Unexpected value at {}",
            self.context,
            pointer
        );
        self
    }

    pub fn cursor(self, expected: usize) -> Self {
        assert_eq!(
            self.report.current_token_idx(),
            expected,
            "{}: Unexpected currentTokenIdx",
            self.context
        );
        self
    }

    pub fn tokens_count(self, expected: usize) -> Self {
        assert_eq!(
            self.report.tokens_count(),
            expected,
            "{}: Unexpected tokensCount",
            self.context
        );
        self
    }

    /// Run assertions against the innermost failure
    pub fn deepest<F>(self, assertion: F) -> Self
    where
        F: FnOnce(FailureAssertion<'_>),
    {
        let failure = self
            .report
            .failure()
            .unwrap_or_else(|| panic!("{}: Expected a failure", self.context));
        assertion(FailureAssertion {
            failure: failure.deepest(),
            context: format!("{}.deepest", self.context),
        });
        self
    }

    /// Run assertions against the top-level failure
    pub fn failure<F>(self, assertion: F) -> Self
    where
        F: FnOnce(FailureAssertion<'_>),
    {
        let failure = self
            .report
            .failure()
            .unwrap_or_else(|| panic!("{}: Expected a failure", self.context));
        assertion(FailureAssertion {
            failure,
            context: format!("{}.failure", self.context),
        });
        self
    }
}

pub struct FailureAssertion<'a> {
    pub(crate) failure: &'a Failure,
    pub(crate) context: String,
}

impl<'a> FailureAssertion<'a> {
    pub fn kind(self, expected: FailureKind) -> Self {
        assert_eq!(
            self.failure.kind, expected,
            "{}: Unexpected failure kind",
            self.context
        );
        self
    }

    pub fn cursor(self, expected: usize) -> Self {
        assert_eq!(
            self.failure.cursor, expected,
            "{}: Unexpected cursor",
            self.context
        );
        self
    }

    pub fn rule(self, expected: &str) -> Self {
        assert_eq!(
            self.failure.rule.as_deref(),
            Some(expected),
            "{}: Unexpected rule",
            self.context
        );
        self
    }

    pub fn context(self, expected: &str) -> Self {
        assert_eq!(
            self.failure.context.as_deref(),
            Some(expected),
            "{}: Unexpected context",
            self.context
        );
        self
    }

    /// Assert the full dot-joined context path
    pub fn hierarchy(self, expected: &str) -> Self {
        assert_eq!(
            self.failure.context_hierarchy, expected,
            "{}: Unexpected context hierarchy",
            self.context
        );
        self
    }

    /// Assert the context path passes through `fragment`
    pub fn hierarchy_contains(self, fragment: &str) -> Self {
        assert!(
            self.failure.context_hierarchy.contains(fragment),
            "{}: Expected context hierarchy to contain '{}', but got '{}'",
            self.context,
            fragment,
            self.failure.context_hierarchy
        );
        self
    }

    /// Assert the validation diagnostic
    pub fn error(self, expected: &str) -> Self {
        assert_eq!(
            self.diagnostic(),
            expected,
            "{}: Unexpected validation diagnostic",
            self.context
        );
        self
    }

    pub fn error_contains(self, fragment: &str) -> Self {
        let actual = self.diagnostic();
        assert!(
            actual.contains(fragment),
            "{}: Expected validation diagnostic to contain '{}', but got '{}'",
            self.context,
            fragment,
            actual
        );
        self
    }

    fn diagnostic(&self) -> &str {
        self.failure
            .error
            .as_deref()
            .unwrap_or_else(|| panic!("{}: Expected a validation diagnostic", self.context))
    }
}
