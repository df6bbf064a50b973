//! Parsing
//!
//! [Parser] drives a compiled grammar over a token stream and returns a [ParseReport].
//! The matching itself (ordered choice, backtracking, templating, validation) lives in
//! [engine].

pub mod engine;
pub mod options;
pub mod outcome;
pub mod parser;
pub mod report;

pub use options::{Normalizer, ParseOptions, DEFAULT_MAX_DEPTH};
pub use outcome::{Failure, FailureKind, ParseOutcome};
pub use parser::Parser;
pub use report::ParseReport;
