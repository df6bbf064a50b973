//! Result envelope
//!
//! `ParseReport` is what a caller gets back from [Parser::parse](super::Parser::parse).
//! It serializes to the envelope shape tooling expects:
//!
//! ```text
//! { "found": true,  "result": {...}, "currentTokenIdx": 3, "tokensCount": 3 }
//! { "found": false, "code": "no-rule-matching", "currentTokenIdx": 0, "tokensCount": 3,
//!   "rule": ..., "context": ..., "contextHierarchy": "tag", ... }
//! ```

use super::outcome::{Failure, FailureKind, ParseOutcome};
use crate::token::Token;
use serde::{Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
    outcome: ParseOutcome<Value>,
    tokens_count: usize,
    consumed: Option<Vec<Token>>,
}

impl ParseReport {
    pub fn new(outcome: ParseOutcome<Value>, tokens_count: usize) -> Self {
        Self {
            outcome,
            tokens_count,
            consumed: None,
        }
    }

    /// Attach the tokens a partial match consumed
    pub fn with_consumed(mut self, consumed: Vec<Token>) -> Self {
        self.consumed = Some(consumed);
        self
    }

    pub fn found(&self) -> bool {
        self.outcome.is_matched()
    }

    /// The synthesized root value of a successful parse
    pub fn result(&self) -> Option<&Value> {
        self.outcome.value()
    }

    pub fn into_result(self) -> Result<Value, Failure> {
        match self.outcome {
            ParseOutcome::Matched { value, .. } => Ok(value),
            ParseOutcome::Failed(failure) => Err(failure),
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.outcome.failure()
    }

    pub fn code(&self) -> Option<FailureKind> {
        self.failure().map(|failure| failure.kind)
    }

    pub fn current_token_idx(&self) -> usize {
        self.outcome.cursor()
    }

    pub fn tokens_count(&self) -> usize {
        self.tokens_count
    }

    /// Tokens consumed by a root match that did not reach the end of the input
    pub fn consumed_tokens(&self) -> Option<&[Token]> {
        self.consumed.as_deref()
    }

    pub fn outcome(&self) -> &ParseOutcome<Value> {
        &self.outcome
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Value>,
    current_token_idx: usize,
    tokens_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expression: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context_hierarchy: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens_to_count: Option<&'a [Token]>,
}

impl Serialize for ParseReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let failure = self.failure();
        Envelope {
            found: self.found(),
            result: self.result(),
            current_token_idx: self.current_token_idx(),
            tokens_count: self.tokens_count,
            code: self.code(),
            rule: failure.and_then(|f| f.rule.as_deref()),
            context: failure.and_then(|f| f.context.as_deref()),
            expression: failure.and_then(|f| f.expression.as_deref()),
            context_hierarchy: failure.map(|f| f.context_hierarchy.as_str()),
            error: failure.and_then(|f| f.error.as_deref()),
            tokens_to_count: self.consumed_tokens(),
        }
        .serialize(serializer)
    }
}
