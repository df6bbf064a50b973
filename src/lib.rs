//! # universal-parser
//!
//! A grammar-driven parser for token streams produced by an external lexer.
//!
//! A grammar is data: a root context, a list of rules and the names of the lexer
//! tokens. Each rule says which sequence of sub-contexts makes up its context, how to
//! build the resulting node from what matched (a value template with `$1`, `$2.name`
//! references) and, optionally, which validation hook must accept the match.
//!
//! Matching is ordered choice with backtracking: the alternatives of a context are tried
//! in the order they are declared, the first one that matches wins, and a failed
//! alternative leaves the cursor where it found it.
//!
//! File Layout
//!
//!     src/
//!       ├── token        Tokens and sub-results
//!       ├── grammar      Grammar model, document loader, compiled form
//!       ├── template     Value templates and variable resolution
//!       ├── validation   Validation hooks and their registry
//!       ├── parsing      Engine, driver, outcomes and the result envelope
//!       ├── error        Configuration and fatal parse errors
//!       └── testing      Fluent assertions for parse reports
//!
//! Grammatical failure is never an error: [Parser::parse](parsing::Parser::parse) returns
//! a [ParseReport](parsing::ParseReport) whose `found` flag and failure code say what
//! happened. Errors are reserved for grammars that cannot run at all ([GrammarError]) and
//! for fatal conditions met while running ([ParseError]).
//!
//! For testing guidelines, see the [testing module](testing).

pub mod error;
pub mod grammar;
pub mod parsing;
pub mod template;
pub mod testing;
pub mod token;
pub mod validation;

pub use error::{GrammarError, ParseError};
pub use grammar::loader::{GrammarLoader, LoaderError};
pub use grammar::{Grammar, GrammarRule};
pub use parsing::{Failure, FailureKind, ParseOptions, ParseOutcome, ParseReport, Parser};
pub use token::{SubResult, Token};
pub use validation::{ValidationRegistry, Validator, Verdict};

use std::path::Path;

/// Compile an in-memory grammar into a [Parser]
pub fn compile(grammar: &Grammar, options: ParseOptions) -> Result<Parser, GrammarError> {
    Parser::new(grammar, options)
}

/// Load a grammar document from `path` and compile it into a [Parser]
pub fn compile_from_file<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<Parser, LoaderError> {
    GrammarLoader::from_path(path)?.compile(options)
}
