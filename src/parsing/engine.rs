//! Parser Engine - ordered choice with backtracking
//!
//! Three mutually recursive steps walk the compiled grammar:
//!
//! 1. resolve: an expression element is either a rule group (go to 2) or a lexer token,
//!    matched against the token at the cursor.
//! 2. attempt: try each rule of a group in declaration order. The first rule that
//!    matches wins; later alternatives are never tried, even if they would match more.
//! 3. evaluate: run one rule's expression left to right (each element through 1),
//!    threading the cursor. Any element failing aborts the rule and reports the cursor
//!    the rule started at. Once the whole expression matched, render the value template
//!    and run the validation hook, whose rejection is reported the same way.
//!
//! When every alternative fails, the failure keeps the one that reached furthest into the
//! input as its cause; a validation rejection counts as reaching the end of its match.
//!
//! Because a failed rule always reports its start position, the next alternative and the
//! enclosing rule's following elements resume from where they would have without it.
//!
//! There is no memoization: grammars with many overlapping alternatives are exponential
//! on long inputs. `max_steps` bounds the work when that matters.
//!
//! Each nested context resolution is one level of native recursion, and right-recursive
//! sequence rules nest once per element. `max_depth` turns a would-be stack overflow into
//! [ParseError::DepthExceeded].

use super::outcome::{Failure, FailureKind, ParseOutcome};
use crate::error::ParseError;
use crate::grammar::compiled::{CompiledGrammar, CompiledRule, ContextRef, Element, RuleGroup};
use crate::token::{SubResult, Token};
use crate::validation::Verdict;
use serde_json::Value;
use tracing::trace;

/// Per-parse state. The grammar and tokens are only borrowed.
pub struct Engine<'p, 't> {
    grammar: &'p CompiledGrammar,
    tokens: &'t [Token],
    max_steps: Option<usize>,
    max_depth: Option<usize>,
    steps: usize,
    depth: usize,
}

impl<'p, 't> Engine<'p, 't> {
    pub fn new(grammar: &'p CompiledGrammar, tokens: &'t [Token]) -> Self {
        Self {
            grammar,
            tokens,
            max_steps: None,
            max_depth: None,
            steps: 0,
            depth: 0,
        }
    }

    pub fn max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve the root context from the first token.
    ///
    /// Does not require the whole stream to be consumed; that is the driver's job.
    pub fn run(&mut self) -> Result<ParseOutcome<Value>, ParseError> {
        let grammar = self.grammar;
        let root = grammar.root();
        self.attempt(None, root, 0, &root.context)
    }

    /// Rule evaluations performed so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn resolve(
        &mut self,
        enclosing: &CompiledRule,
        element: &Element,
        cursor: usize,
        hierarchy: &str,
    ) -> Result<ParseOutcome<SubResult<'t>>, ParseError> {
        match &element.target {
            ContextRef::Rules(index) => {
                let grammar = self.grammar;
                let group = grammar.group(*index);
                Ok(self
                    .attempt(Some(enclosing), group, cursor, hierarchy)?
                    .map(SubResult::Node))
            }
            ContextRef::Terminal(name) => Ok(self.match_terminal(enclosing, name, cursor, hierarchy)),
        }
    }

    fn match_terminal(
        &self,
        enclosing: &CompiledRule,
        name: &str,
        cursor: usize,
        hierarchy: &str,
    ) -> ParseOutcome<SubResult<'t>> {
        let tokens = self.tokens;
        let Some(token) = tokens.get(cursor) else {
            trace!(context = hierarchy, cursor, "end of tokens");
            return ParseOutcome::Failed(
                Failure::new(FailureKind::EndOfTokens, cursor, hierarchy)
                    .with_rule(&enclosing.source.kind)
                    .with_context(name),
            );
        };

        if token.kind != name {
            return ParseOutcome::Failed(
                Failure::new(FailureKind::TokenNotMatching, cursor, hierarchy)
                    .with_rule(&enclosing.source.kind)
                    .with_context(name),
            );
        }

        trace!(context = hierarchy, cursor, "MATCH token {}", name);
        ParseOutcome::Matched {
            next_cursor: cursor + 1,
            value: SubResult::Token(token),
        }
    }

    fn attempt(
        &mut self,
        enclosing: Option<&CompiledRule>,
        group: &RuleGroup,
        cursor: usize,
        hierarchy: &str,
    ) -> Result<ParseOutcome<Value>, ParseError> {
        self.enter()?;
        let mut cause: Option<Failure> = None;

        for rule in &group.rules {
            match self.evaluate(rule, cursor, hierarchy)? {
                matched @ ParseOutcome::Matched { .. } => {
                    self.depth -= 1;
                    return Ok(matched);
                }
                ParseOutcome::Failed(failure) => {
                    // Keep the alternative that got furthest into the input
                    let further = cause
                        .as_ref()
                        .map_or(true, |best| failure.reached > best.reached);
                    if further {
                        cause = Some(failure);
                    }
                }
            }
        }

        self.depth -= 1;
        let mut failure =
            Failure::new(FailureKind::NoRuleMatching, cursor, hierarchy).with_context(&group.context);
        if let Some(rule) = enclosing {
            failure = failure.with_rule(&rule.source.kind);
        }
        if let Some(cause) = cause {
            failure = failure.caused_by(cause);
        }
        Ok(ParseOutcome::Failed(failure))
    }

    fn evaluate(
        &mut self,
        rule: &CompiledRule,
        cursor: usize,
        hierarchy: &str,
    ) -> Result<ParseOutcome<Value>, ParseError> {
        self.step()?;
        trace!(rule = %rule.source.kind, context = hierarchy, cursor, "attempting rule");

        let start = cursor;
        let mut cursor = cursor;
        let mut sub_results: Vec<SubResult<'t>> = Vec::with_capacity(rule.expression.len());

        for element in &rule.expression {
            let path = format!("{}.{}", hierarchy, element.name);
            match self.resolve(rule, element, cursor, &path)? {
                ParseOutcome::Matched { next_cursor, value } => {
                    cursor = next_cursor;
                    sub_results.push(value);
                }
                ParseOutcome::Failed(cause) => {
                    return Ok(ParseOutcome::Failed(
                        Failure::new(FailureKind::ExpressionNotMatching, start, hierarchy)
                            .with_rule(&rule.source.kind)
                            .with_expression(&element.name)
                            .caused_by(cause),
                    ));
                }
            }
        }

        let value = match &rule.template {
            Some(template) => template.render(&sub_results)?,
            None => Value::Null,
        };

        if let Some((name, validator)) = &rule.validator {
            match validator.validate(&value, &sub_results, &rule.source) {
                Verdict::Accept => {
                    trace!(rule = %rule.source.kind, context = hierarchy, "validation {} accepted", name);
                }
                Verdict::Reject { error } => {
                    trace!(rule = %rule.source.kind, context = hierarchy, "validation {} rejected", name);
                    return Ok(ParseOutcome::Failed(
                        Failure::new(FailureKind::ValidationRejected, start, hierarchy)
                            .with_rule(&rule.source.kind)
                            .with_error(error)
                            .reaching(cursor),
                    ));
                }
            }
        }

        trace!(rule = %rule.source.kind, context = hierarchy, cursor, "MATCH rule");
        Ok(ParseOutcome::Matched {
            next_cursor: cursor,
            value,
        })
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        match self.max_depth {
            Some(limit) if self.depth > limit => {
                trace!(depth = self.depth, "nesting bound reached");
                Err(ParseError::DepthExceeded { limit })
            }
            _ => Ok(()),
        }
    }

    fn step(&mut self) -> Result<(), ParseError> {
        self.steps += 1;
        match self.max_steps {
            Some(limit) if self.steps > limit => Err(ParseError::StepBudgetExceeded { limit }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, GrammarRule};
    use crate::validation::ValidationRegistry;
    use serde_json::json;

    fn compile(grammar: &Grammar) -> CompiledGrammar {
        CompiledGrammar::compile(grammar, &ValidationRegistry::new()).unwrap()
    }

    fn tokens(kinds: &[&str]) -> Vec<Token> {
        kinds
            .iter()
            .map(|kind| Token::with_value(*kind, kind.to_lowercase()))
            .collect()
    }

    #[test]
    fn test_run_does_not_require_full_consumption() {
        let grammar = compile(
            &Grammar::new("a")
                .rule(GrammarRule::new("a", ["A"]).with_value(json!("$1")))
                .lexer_tokens(["A"]),
        );
        let input = tokens(&["A", "A"]);
        let outcome = Engine::new(&grammar, &input).run().unwrap();
        assert_eq!(
            outcome,
            ParseOutcome::Matched {
                next_cursor: 1,
                value: json!("a")
            }
        );
    }

    #[test]
    fn test_failed_alternative_rolls_back() {
        // pair -> A B | A C ; the first alternative consumes A before failing
        let grammar = compile(
            &Grammar::new("pair")
                .rule(GrammarRule::new("pair", ["A", "B"]).with_value(json!("ab")))
                .rule(GrammarRule::new("pair", ["A", "C"]).with_value(json!("ac")))
                .lexer_tokens(["A", "B", "C"]),
        );
        let input = tokens(&["A", "C"]);
        let outcome = Engine::new(&grammar, &input).run().unwrap();
        assert_eq!(
            outcome,
            ParseOutcome::Matched {
                next_cursor: 2,
                value: json!("ac")
            }
        );
    }

    #[test]
    fn test_terminal_failures() {
        let grammar = compile(
            &Grammar::new("pair")
                .rule(GrammarRule::new("pair", ["A", "B"]).with_value(json!("ab")))
                .lexer_tokens(["A", "B"]),
        );

        let input = tokens(&["A"]);
        let outcome = Engine::new(&grammar, &input).run().unwrap();
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::NoRuleMatching);
        assert_eq!(failure.cursor, 0);
        assert_eq!(failure.rule, None);
        let deepest = failure.deepest();
        assert_eq!(deepest.kind, FailureKind::EndOfTokens);
        assert_eq!(deepest.cursor, 1);
        assert_eq!(deepest.context_hierarchy, "pair.B");

        let input = tokens(&["A", "A"]);
        let outcome = Engine::new(&grammar, &input).run().unwrap();
        let deepest = outcome.failure().unwrap().deepest();
        assert_eq!(deepest.kind, FailureKind::TokenNotMatching);
        assert_eq!(deepest.rule.as_deref(), Some("pair"));
        assert_eq!(deepest.context.as_deref(), Some("B"));
    }

    #[test]
    fn test_cause_is_the_furthest_alternative() {
        let grammar = compile(
            &Grammar::new("s")
                .rule(GrammarRule::new("s", ["A", "B", "C"]).with_value(json!(1)))
                .rule(GrammarRule::new("s", ["X"]).with_value(json!(2)))
                .lexer_tokens(["A", "B", "C", "X"]),
        );
        let input = tokens(&["A", "B", "D"]);
        let outcome = Engine::new(&grammar, &input).run().unwrap();
        let failure = outcome.failure().unwrap();
        let cause = failure.cause.as_deref().unwrap();
        assert_eq!(cause.kind, FailureKind::ExpressionNotMatching);
        assert_eq!(cause.expression.as_deref(), Some("C"));
        assert_eq!(failure.reached, 2);
        assert_eq!(failure.deepest().cursor, 2);
    }

    #[test]
    fn test_step_budget() {
        let grammar = compile(
            &Grammar::new("list")
                .rule(GrammarRule::new("list", ["A", "list"]).with_value(json!("$2")))
                .rule(GrammarRule::new("list", ["A"]).with_value(json!("$1")))
                .lexer_tokens(["A"]),
        );
        let input = tokens(&["A"; 10]);

        let mut engine = Engine::new(&grammar, &input);
        assert!(engine.run().unwrap().is_matched());
        let needed = engine.steps();

        let err = Engine::new(&grammar, &input)
            .max_steps(Some(needed - 1))
            .run()
            .unwrap_err();
        assert_eq!(err, ParseError::StepBudgetExceeded { limit: needed - 1 });
        assert!(Engine::new(&grammar, &input)
            .max_steps(Some(needed))
            .run()
            .is_ok());
    }

    #[test]
    fn test_depth_bound() {
        // list -> A list | A nests one level per token, plus one for the failed tail
        let grammar = compile(
            &Grammar::new("list")
                .rule(GrammarRule::new("list", ["A", "list"]).with_value(json!("$2")))
                .rule(GrammarRule::new("list", ["A"]).with_value(json!("$1")))
                .lexer_tokens(["A"]),
        );
        let input = tokens(&["A"; 10]);

        assert!(Engine::new(&grammar, &input)
            .max_depth(Some(11))
            .run()
            .unwrap()
            .is_matched());
        let err = Engine::new(&grammar, &input)
            .max_depth(Some(10))
            .run()
            .unwrap_err();
        assert_eq!(err, ParseError::DepthExceeded { limit: 10 });
    }

    #[test]
    fn test_depth_unwinds_between_alternatives() {
        // Sibling alternatives start from the same depth, so a wide grammar stays shallow
        let grammar = compile(
            &Grammar::new("s")
                .rule(GrammarRule::new("s", ["x", "x", "x", "x"]).with_value(json!(1)))
                .rule(GrammarRule::new("x", ["B"]).with_value(json!("$1")))
                .rule(GrammarRule::new("x", ["A"]).with_value(json!("$1")))
                .lexer_tokens(["A", "B"]),
        );
        let input = tokens(&["A"; 4]);
        let mut engine = Engine::new(&grammar, &input).max_depth(Some(2));
        assert!(engine.run().unwrap().is_matched());
    }
}
