//! Grammar Model
//!
//! The in-memory shape of a grammar document:
//!
//! ```yaml
//! root: tag
//! lexerTokens: [OPEN_TAG, TEXT, CLOSE_TAG]
//! rules:
//!   - type: tag
//!     expression: [OPEN_TAG, TEXT, CLOSE_TAG]
//!     value: { name: $1.name, text: $2 }
//!     valid: checkMatchingTag
//! ```
//!
//! Rules sharing a `type` are ordered alternatives for that context, tried in the order
//! they appear in `rules`. Lexer tokens are the leaf contexts, matched against a token's
//! `type`.
//!
//! This is pure data. [compiled::CompiledGrammar] checks it and turns it into the form the
//! parser runs.

pub mod compiled;
pub mod loader;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A complete grammar: root context, rules and lexer token names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    pub root: String,
    #[serde(default)]
    pub rules: Vec<GrammarRule>,
    #[serde(default, rename = "lexerTokens")]
    pub lexer_tokens: Vec<String>,
}

impl Grammar {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            rules: Vec::new(),
            lexer_tokens: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: GrammarRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn lexer_tokens<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lexer_tokens.extend(names.into_iter().map(Into::into));
        self
    }

    /// Rules for `context`, in declaration order
    pub fn rules_for<'a>(&'a self, context: &'a str) -> impl Iterator<Item = &'a GrammarRule> {
        self.rules.iter().filter(move |rule| rule.kind == context)
    }

    pub fn is_lexer_token(&self, name: &str) -> bool {
        self.lexer_tokens.iter().any(|token| token == name)
    }
}

/// One alternative for a context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarRule {
    /// The context this rule produces
    #[serde(rename = "type")]
    pub kind: String,
    /// Sub-contexts to match, in order
    #[serde(default)]
    pub expression: Vec<String>,
    /// Output template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Name of a validation hook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<String>,
}

impl GrammarRule {
    pub fn new<I, S>(kind: impl Into<String>, expression: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: kind.into(),
            expression: expression.into_iter().map(Into::into).collect(),
            value: None,
            valid: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_validation(mut self, name: impl Into<String>) -> Self {
        self.valid = Some(name.into());
        self
    }
}
