//! Compiled grammar
//!
//! Compilation runs every check that makes a grammar executable, once, before any token
//! is looked at:
//!
//!     - the root context names a rule
//!     - every rule has a non-empty expression
//!     - every expression element names a rule type or a lexer token
//!     - every rule that matches a lexer token declares a value template
//!     - every template reference `$i` addresses an element of the expression
//!     - every validation hook named by a rule is registered
//!
//! The result groups rules per context (declaration order preserved), resolves each
//! expression element to a rule group or a lexer token, compiles each value template and
//! binds each rule to its validator. The parser never looks anything up by name.

use super::{Grammar, GrammarRule};
use crate::error::GrammarError;
use crate::template::Template;
use crate::validation::{ValidationRegistry, Validator};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What an expression element resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextRef {
    /// A composite context: index of its rule group
    Rules(usize),
    /// A lexer token, matched against `Token::kind`
    Terminal(String),
}

/// One element of a compiled expression
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub target: ContextRef,
}

/// A rule ready to run
#[derive(Clone)]
pub struct CompiledRule {
    pub source: GrammarRule,
    pub expression: Vec<Element>,
    pub template: Option<Template>,
    pub validator: Option<(String, Arc<dyn Validator>)>,
}

impl fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRule")
            .field("source", &self.source)
            .field("expression", &self.expression)
            .field("template", &self.template)
            .field("validator", &self.validator.as_ref().map(|(name, _)| name))
            .finish()
    }
}

/// All alternatives for one context, in declaration order
#[derive(Debug, Clone)]
pub struct RuleGroup {
    pub context: String,
    pub rules: Vec<CompiledRule>,
}

#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    root: usize,
    groups: Vec<RuleGroup>,
}

impl CompiledGrammar {
    pub fn compile(
        grammar: &Grammar,
        validations: &ValidationRegistry,
    ) -> Result<Self, GrammarError> {
        let mut group_index: HashMap<&str, usize> = HashMap::new();
        for rule in &grammar.rules {
            let next = group_index.len();
            group_index.entry(rule.kind.as_str()).or_insert(next);
        }

        let root = match group_index.get(grammar.root.as_str()) {
            Some(&index) => index,
            None if grammar.is_lexer_token(&grammar.root) => {
                return Err(GrammarError::TerminalRoot {
                    root: grammar.root.clone(),
                })
            }
            None => {
                return Err(GrammarError::UnknownRoot {
                    root: grammar.root.clone(),
                })
            }
        };

        let mut groups: Vec<RuleGroup> = Vec::with_capacity(group_index.len());
        for rule in &grammar.rules {
            let compiled = compile_rule(rule, grammar, &group_index, validations)?;
            let index = group_index[rule.kind.as_str()];
            if index == groups.len() {
                groups.push(RuleGroup {
                    context: rule.kind.clone(),
                    rules: Vec::new(),
                });
            }
            groups[index].rules.push(compiled);
        }

        Ok(Self { root, groups })
    }

    pub fn root(&self) -> &RuleGroup {
        &self.groups[self.root]
    }

    pub fn group(&self, index: usize) -> &RuleGroup {
        &self.groups[index]
    }

    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }
}

fn compile_rule(
    rule: &GrammarRule,
    grammar: &Grammar,
    group_index: &HashMap<&str, usize>,
    validations: &ValidationRegistry,
) -> Result<CompiledRule, GrammarError> {
    if rule.expression.is_empty() {
        return Err(GrammarError::EmptyExpression {
            rule: rule.kind.clone(),
        });
    }

    let mut expression = Vec::with_capacity(rule.expression.len());
    for name in &rule.expression {
        // Rule types win over lexer tokens of the same name
        let target = match group_index.get(name.as_str()) {
            Some(&index) => ContextRef::Rules(index),
            None if grammar.is_lexer_token(name) => ContextRef::Terminal(name.clone()),
            None => {
                return Err(GrammarError::UnknownContext {
                    rule: rule.kind.clone(),
                    context: name.clone(),
                })
            }
        };
        expression.push(Element {
            name: name.clone(),
            target,
        });
    }

    if rule.value.is_none() {
        let terminal = expression.iter().find_map(|element| match &element.target {
            ContextRef::Terminal(name) => Some(name),
            ContextRef::Rules(_) => None,
        });
        if let Some(terminal) = terminal {
            return Err(GrammarError::MissingValueTemplate {
                rule: rule.kind.clone(),
                terminal: terminal.clone(),
            });
        }
    }

    let template = rule.value.as_ref().map(Template::compile);
    if let Some(index) = template
        .as_ref()
        .and_then(|template| template.first_out_of_range(expression.len()))
    {
        return Err(GrammarError::TemplateIndexOutOfRange {
            rule: rule.kind.clone(),
            index,
            arity: expression.len(),
        });
    }

    let validator = match &rule.valid {
        Some(name) => {
            let hook = validations
                .get(name)
                .ok_or_else(|| GrammarError::MissingValidation {
                    rule: rule.kind.clone(),
                    name: name.clone(),
                })?;
            Some((name.clone(), hook))
        }
        None => None,
    };

    Ok(CompiledRule {
        source: rule.clone(),
        expression,
        template,
        validator,
    })
}
