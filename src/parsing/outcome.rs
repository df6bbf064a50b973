//! Parse outcomes
//!
//! Grammatical failure is a value, never an error: every step of the parser returns a
//! [ParseOutcome] that is either a match (with the cursor after it) or a tagged
//! [Failure] describing where and why the match did not happen.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Why a context, rule or parse did not match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// A lexer token was expected past the last token
    EndOfTokens,
    /// The token at the cursor has another type
    TokenNotMatching,
    /// None of a context's rules matched
    NoRuleMatching,
    /// An element of a rule's expression did not match
    ExpressionNotMatching,
    /// The expression matched but the rule's validation hook rejected it
    ValidationRejected,
    /// The root matched without consuming every token
    FileNotFullyParsed,
}

impl FailureKind {
    /// The wire code, e.g. `no-rule-matching`
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::EndOfTokens => "end-of-tokens",
            FailureKind::TokenNotMatching => "token-not-matching",
            FailureKind::NoRuleMatching => "no-rule-matching",
            FailureKind::ExpressionNotMatching => "expression-not-matching",
            FailureKind::ValidationRejected => "validation-rejected",
            FailureKind::FileNotFullyParsed => "file-not-fully-parsed",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A tagged parse failure with its diagnostic context
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: FailureKind,
    /// Token index reported to the caller. Rule-level failures report the position the
    /// rule started at, so a failed alternative never moves the cursor.
    pub cursor: usize,
    /// Furthest token index the failed attempt got to before giving up
    pub reached: usize,
    /// Type of the rule the failure belongs to
    pub rule: Option<String>,
    /// Context being resolved
    pub context: Option<String>,
    /// Expression element that failed
    pub expression: Option<String>,
    /// Dot-joined path of contexts from the root
    pub context_hierarchy: String,
    /// Diagnostic returned by a validation hook
    pub error: Option<String>,
    /// The failure that caused this one
    pub cause: Option<Box<Failure>>,
}

impl Failure {
    pub fn new(kind: FailureKind, cursor: usize, context_hierarchy: impl Into<String>) -> Self {
        Self {
            kind,
            cursor,
            reached: cursor,
            rule: None,
            context: None,
            expression: None,
            context_hierarchy: context_hierarchy.into(),
            error: None,
            cause: None,
        }
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }

    pub fn reaching(mut self, reached: usize) -> Self {
        self.reached = self.reached.max(reached);
        self
    }

    pub fn caused_by(mut self, cause: Failure) -> Self {
        self.reached = self.reached.max(cause.reached);
        self.cause = Some(Box::new(cause));
        self
    }

    /// This failure followed by its causes, outermost first
    pub fn chain(&self) -> impl Iterator<Item = &Failure> {
        std::iter::successors(Some(self), |failure| failure.cause.as_deref())
    }

    /// The innermost cause: the point where matching actually stopped
    pub fn deepest(&self) -> &Failure {
        self.chain().last().unwrap_or(self)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at token {} ({})",
            self.kind, self.cursor, self.context_hierarchy
        )?;
        if let Some(error) = &self.error {
            write!(f, ": {}", error)?;
        }
        Ok(())
    }
}

/// Result of resolving a context, running a rule or parsing a token stream
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T = Value> {
    Matched { next_cursor: usize, value: T },
    Failed(Failure),
}

impl<T> ParseOutcome<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, ParseOutcome::Matched { .. })
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ParseOutcome::Matched { .. } => None,
            ParseOutcome::Failed(failure) => Some(failure),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ParseOutcome::Matched { value, .. } => Some(value),
            ParseOutcome::Failed(_) => None,
        }
    }

    /// Cursor after a match, or the cursor reported by the failure
    pub fn cursor(&self) -> usize {
        match self {
            ParseOutcome::Matched { next_cursor, .. } => *next_cursor,
            ParseOutcome::Failed(failure) => failure.cursor,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        match self {
            ParseOutcome::Matched { next_cursor, value } => ParseOutcome::Matched {
                next_cursor,
                value: f(value),
            },
            ParseOutcome::Failed(failure) => ParseOutcome::Failed(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_serde_names() {
        for kind in [
            FailureKind::EndOfTokens,
            FailureKind::TokenNotMatching,
            FailureKind::NoRuleMatching,
            FailureKind::ExpressionNotMatching,
            FailureKind::ValidationRejected,
            FailureKind::FileNotFullyParsed,
        ] {
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                Value::String(kind.code().to_string())
            );
        }
    }

    #[test]
    fn test_deepest_follows_causes() {
        let failure = Failure::new(FailureKind::NoRuleMatching, 0, "root").caused_by(
            Failure::new(FailureKind::ExpressionNotMatching, 0, "root")
                .with_expression("B")
                .caused_by(
                    Failure::new(FailureKind::TokenNotMatching, 3, "root.B").with_context("B"),
                ),
        );

        assert_eq!(failure.chain().count(), 3);
        assert_eq!(failure.reached, 3);
        let deepest = failure.deepest();
        assert_eq!(deepest.kind, FailureKind::TokenNotMatching);
        assert_eq!(deepest.cursor, 3);
        assert_eq!(deepest.context.as_deref(), Some("B"));
    }

    #[test]
    fn test_display() {
        let failure = Failure::new(FailureKind::ValidationRejected, 2, "root.tag")
            .with_error(Some("tags differ".to_string()));
        assert_eq!(
            failure.to_string(),
            "validation-rejected at token 2 (root.tag): tags differ"
        );
    }

    #[test]
    fn test_map_keeps_cursor() {
        let outcome: ParseOutcome<usize> = ParseOutcome::Matched {
            next_cursor: 4,
            value: 1,
        };
        let mapped = outcome.map(|v| v + 1);
        assert_eq!(mapped.cursor(), 4);
        assert_eq!(mapped.value(), Some(&2));
    }
}
