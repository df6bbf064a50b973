//! Tokens and sub-results
//!
//! Tokens are produced by an external lexer. The engine only ever looks at their `type`
//! (matched against lexer token names in the grammar) and, when templating or validating,
//! at their `data` payload.
//!
//! A [SubResult] is what one element of a rule's expression produced: the raw token for a
//! lexer token, or the already-synthesized value of a nested rule.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A lexed token: `{ "type": ..., "data": { "value": ..., ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl Token {
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Token whose payload is just `{ "value": value }`
    pub fn with_value(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(kind, json!({ "value": value.into() }))
    }

    /// The `data.value` field, when present
    pub fn value(&self) -> Option<&Value> {
        self.data.get("value")
    }

    /// A field of the `data` payload
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// The token as a JSON value, in its wire shape
    pub fn to_value(&self) -> Value {
        json!({ "type": self.kind, "data": self.data })
    }
}

/// The value produced by one matched element of a rule expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SubResult<'t> {
    /// A lexer token matched directly
    Token(&'t Token),
    /// The synthesized value of a nested rule
    Node(Value),
}

impl<'t> SubResult<'t> {
    /// The `data` mapping of a token-like sub-result.
    ///
    /// Synthesized values qualify too when they carry a `data` field. Only a mapping
    /// counts: scalar or absent data yields `None`.
    pub fn data(&self) -> Option<&Value> {
        let data = match self {
            SubResult::Token(token) => &token.data,
            SubResult::Node(value) => value.get("data")?,
        };
        data.is_object().then_some(data)
    }

    /// A field of the `data` mapping
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.data().and_then(|data| data.get(name))
    }

    /// `data.value`, the payload of a terminal token
    pub fn inner_value(&self) -> Option<&Value> {
        self.attr("value")
    }

    pub fn as_token(&self) -> Option<&'t Token> {
        match self {
            SubResult::Token(token) => Some(*token),
            SubResult::Node(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            SubResult::Token(token) => token.to_value(),
            SubResult::Node(value) => value.clone(),
        }
    }
}
