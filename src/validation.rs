//! Validation hooks
//!
//! A rule may name a validation hook (`valid: checkMatchingTag`). Once the rule's
//! expression has matched and its value has been synthesized, the hook decides whether
//! the match stands. A rejected match backtracks exactly like a syntactic mismatch.
//!
//! Hooks are registered by name in a [ValidationRegistry]. Names are resolved when the
//! grammar is compiled, so a rule naming an unknown hook never reaches the parser.

use crate::grammar::GrammarRule;
use crate::token::SubResult;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of a validation hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject { error: Option<String> },
}

impl Verdict {
    pub fn reject(error: impl Into<String>) -> Self {
        Verdict::Reject {
            error: Some(error.into()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

impl From<bool> for Verdict {
    fn from(accepted: bool) -> Self {
        if accepted {
            Verdict::Accept
        } else {
            Verdict::Reject { error: None }
        }
    }
}

impl From<Result<(), String>> for Verdict {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Verdict::Accept,
            Err(error) => Verdict::reject(error),
        }
    }
}

/// A semantic predicate over a rule's synthesized value and raw sub-results
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Value, sub_results: &[SubResult<'_>], rule: &GrammarRule)
        -> Verdict;
}

impl<F, V> Validator for F
where
    F: Fn(&Value, &[SubResult<'_>], &GrammarRule) -> V + Send + Sync,
    V: Into<Verdict>,
{
    fn validate(
        &self,
        value: &Value,
        sub_results: &[SubResult<'_>],
        rule: &GrammarRule,
    ) -> Verdict {
        self(value, sub_results, rule).into()
    }
}

/// Named validation hooks
#[derive(Clone, Default)]
pub struct ValidationRegistry {
    hooks: HashMap<String, Arc<dyn Validator>>,
}

impl ValidationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure under `name`, replacing any previous hook of that name.
    ///
    /// The closure may return a `bool`, a `Result<(), String>` or a [Verdict].
    pub fn register<F, V>(&mut self, name: impl Into<String>, hook: F) -> &mut Self
    where
        F: Fn(&Value, &[SubResult<'_>], &GrammarRule) -> V + Send + Sync + 'static,
        V: Into<Verdict>,
    {
        self.hooks.insert(name.into(), Arc::new(hook));
        self
    }

    /// Register a [Validator] implementation under `name`
    pub fn register_validator(
        &mut self,
        name: impl Into<String>,
        validator: impl Validator + 'static,
    ) -> &mut Self {
        self.hooks.insert(name.into(), Arc::new(validator));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Validator>> {
        self.hooks.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for ValidationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ValidationRegistry")
            .field("hooks", &names)
            .finish()
    }
}
