//! Parser options

use crate::grammar::GrammarRule;
use crate::token::SubResult;
use crate::validation::{ValidationRegistry, Validator, Verdict};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Post-processing applied to the value of a successful parse
pub type Normalizer = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Default bound on context nesting.
///
/// Sequences are written as right-recursive rules, so nesting grows with the input. The
/// bound keeps a long input from overflowing the stack of a default-sized thread.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Caller-supplied configuration for a [Parser](super::Parser)
#[derive(Clone)]
pub struct ParseOptions {
    pub validations: ValidationRegistry,
    pub normalizer: Option<Normalizer>,
    /// Upper bound on rule evaluations per parse. Unbounded when `None`.
    pub max_steps: Option<usize>,
    /// Upper bound on nested context resolutions. Unbounded when `None`.
    pub max_depth: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            validations: ValidationRegistry::default(),
            normalizer: None,
            max_steps: None,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validations(mut self, validations: ValidationRegistry) -> Self {
        self.validations = validations;
        self
    }

    /// Register a validation hook
    pub fn validation<F, V>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Value, &[SubResult<'_>], &GrammarRule) -> V + Send + Sync + 'static,
        V: Into<Verdict>,
    {
        self.validations.register(name, hook);
        self
    }

    pub fn validator(mut self, name: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.validations.register_validator(name, validator);
        self
    }

    pub fn with_normalizer(
        mut self,
        normalizer: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.normalizer = Some(Arc::new(normalizer));
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Replace the nesting bound. Run deep parses on a thread with a matching stack size.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Remove the nesting bound
    pub fn unbounded_depth(mut self) -> Self {
        self.max_depth = None;
        self
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("validations", &self.validations)
            .field("normalizer", &self.normalizer.is_some())
            .field("max_steps", &self.max_steps)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
