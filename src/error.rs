//! Error types
//!
//! Two classes of errors exist and they never mix:
//!
//!     - [GrammarError]: the grammar (or the options it is compiled against) cannot be
//!       executed at all. Raised once, when a [Parser](crate::parsing::Parser) is built.
//!     - [ParseError]: a fatal problem discovered while running a parse. It aborts the
//!       whole parse instead of taking part in backtracking.
//!
//! Inputs that simply do not match the grammar are neither: they come back as a tagged
//! [Failure](crate::parsing::Failure) inside a [ParseReport](crate::parsing::ParseReport).

use thiserror::Error;

/// A grammar that cannot be executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A rule with an empty (or absent) expression.
    #[error("Missing expression attribute in rule {rule}")]
    EmptyExpression { rule: String },

    /// The root context names a lexer token instead of a rule.
    #[error("The root must be a rule. I found a lexer token {root}")]
    TerminalRoot { root: String },

    /// The root context is neither a rule type nor a lexer token.
    #[error("Unknown root context {root}")]
    UnknownRoot { root: String },

    /// An expression element is neither a rule type nor a lexer token.
    #[error("Unknown rule or token {context} in rule {rule}")]
    UnknownContext { rule: String, context: String },

    /// A rule matches a lexer token but declares no `value` template.
    #[error("Missing value attribute in rule {rule} (it references the lexer token {terminal})")]
    MissingValueTemplate { rule: String, terminal: String },

    /// A rule names a validation hook that the registry does not provide.
    #[error("Validation function {name}, not found in options (rule {rule})")]
    MissingValidation { rule: String, name: String },

    /// A `$i` template reference outside `1..=arity`.
    #[error("Template variable ${index} in rule {rule} is out of range (expression has {arity} elements)")]
    TemplateIndexOutOfRange {
        rule: String,
        index: usize,
        arity: usize,
    },
}

/// A fatal error raised while a parse is running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `$index.attr` was resolved against a sub-result that carries no `data` mapping.
    #[error("Cannot read attribute {attr} of ${index}: the sub-result has no data")]
    AttributeOnPlainValue { index: usize, attr: String },

    /// A `$index` reference with no matching sub-result.
    #[error("Template variable ${index} has no sub-result ({available} available)")]
    MissingSubResult { index: usize, available: usize },

    /// The configured step budget ran out before the parse finished.
    #[error("Step budget of {limit} rule evaluations exceeded")]
    StepBudgetExceeded { limit: usize },

    /// Contexts nested deeper than the configured bound.
    #[error("Maximum nesting depth {limit} exceeded")]
    DepthExceeded { limit: usize },
}
