//! Top-level driver
//!
//! A `Parser` is a compiled grammar plus the options it was compiled against. It holds no
//! state between calls: each [Parser::parse] builds its own engine, so one parser can be
//! shared freely across threads.

use super::engine::Engine;
use super::options::{Normalizer, ParseOptions};
use super::outcome::{Failure, FailureKind, ParseOutcome};
use super::report::ParseReport;
use crate::error::{GrammarError, ParseError};
use crate::grammar::compiled::CompiledGrammar;
use crate::grammar::Grammar;
use crate::token::Token;
use std::fmt;
use tracing::debug;

pub struct Parser {
    grammar: CompiledGrammar,
    normalizer: Option<Normalizer>,
    max_steps: Option<usize>,
    max_depth: Option<usize>,
}

impl Parser {
    /// Compile `grammar` against `options`.
    ///
    /// Every configuration error is reported here; a parser that builds can only fail a
    /// parse with a tagged failure (or a [ParseError]).
    pub fn new(grammar: &Grammar, options: ParseOptions) -> Result<Self, GrammarError> {
        let compiled = CompiledGrammar::compile(grammar, &options.validations)?;
        Ok(Self {
            grammar: compiled,
            normalizer: options.normalizer,
            max_steps: options.max_steps,
            max_depth: options.max_depth,
        })
    }

    pub fn grammar(&self) -> &CompiledGrammar {
        &self.grammar
    }

    /// Parse a complete token stream.
    ///
    /// The root context must match from the first token and consume every token;
    /// a shorter match is reported as `file-not-fully-parsed`.
    pub fn parse(&self, tokens: &[Token]) -> Result<ParseReport, ParseError> {
        let mut engine = Engine::new(&self.grammar, tokens)
            .max_steps(self.max_steps)
            .max_depth(self.max_depth);
        let outcome = engine.run()?;
        let root = &self.grammar.root().context;

        let report = match outcome {
            ParseOutcome::Matched { next_cursor, .. } if next_cursor != tokens.len() => {
                let failure = Failure::new(FailureKind::FileNotFullyParsed, next_cursor, root.as_str())
                    .with_rule(root.as_str());
                ParseReport::new(ParseOutcome::Failed(failure), tokens.len())
                    .with_consumed(tokens[..next_cursor].to_vec())
            }
            ParseOutcome::Matched { next_cursor, value } => {
                let value = match &self.normalizer {
                    Some(normalizer) => normalizer(value),
                    None => value,
                };
                ParseReport::new(ParseOutcome::Matched { next_cursor, value }, tokens.len())
            }
            failed @ ParseOutcome::Failed(_) => ParseReport::new(failed, tokens.len()),
        };

        debug!(
            found = report.found(),
            code = report.code().map(|kind| kind.code()),
            cursor = report.current_token_idx(),
            tokens = tokens.len(),
            steps = engine.steps(),
            "parse finished"
        );
        Ok(report)
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("grammar", &self.grammar)
            .field("normalizer", &self.normalizer.is_some())
            .field("max_steps", &self.max_steps)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
