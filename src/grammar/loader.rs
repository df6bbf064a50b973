//! Grammar loading utilities
//!
//! `GrammarLoader` reads a grammar document from a file or a string. Documents are YAML;
//! since YAML is a superset of JSON, JSON documents load the same way.
//!
//! # Example
//!
//! ```rust,ignore
//! use universal_parser::grammar::loader::GrammarLoader;
//! use universal_parser::parsing::{ParseOptions, Parser};
//!
//! let grammar = GrammarLoader::from_path("html-parser.yaml")?.load()?;
//! let parser = Parser::new(&grammar, ParseOptions::default())?;
//! ```

use super::Grammar;
use crate::error::GrammarError;
use crate::parsing::{ParseOptions, Parser};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Error that can occur when loading grammars
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Grammar error: {0}")]
    Grammar(#[from] GrammarError),
}

/// Grammar document loader
pub struct GrammarLoader {
    source: String,
}

impl GrammarLoader {
    /// Load the document text from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoaderError> {
        let source = fs::read_to_string(path)?;
        Ok(GrammarLoader { source })
    }

    /// Load the document text from a string
    pub fn from_string<S: Into<String>>(source: S) -> Self {
        GrammarLoader {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parse the document as YAML (or JSON)
    pub fn load(&self) -> Result<Grammar, LoaderError> {
        Ok(serde_yaml::from_str(&self.source)?)
    }

    /// Parse the document as strict JSON
    pub fn load_json(&self) -> Result<Grammar, LoaderError> {
        Ok(serde_json::from_str(&self.source)?)
    }

    /// Parse the document and compile it into a [Parser]
    pub fn compile(&self, options: ParseOptions) -> Result<Parser, LoaderError> {
        let grammar = self.load()?;
        Ok(Parser::new(&grammar, options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TAG_GRAMMAR: &str = r#"
root: tag
lexerTokens:
  - OPEN_TAG
  - TEXT
  - CLOSE_TAG
rules:
  - type: tag
    expression: [OPEN_TAG, TEXT, CLOSE_TAG]
    value:
      name: $1.name
      text: $2
    valid: checkMatchingTag
"#;

    #[test]
    fn test_load_yaml_string() {
        let grammar = GrammarLoader::from_string(TAG_GRAMMAR).load().unwrap();

        assert_eq!(grammar.root, "tag");
        assert_eq!(grammar.lexer_tokens, vec!["OPEN_TAG", "TEXT", "CLOSE_TAG"]);
        assert_eq!(grammar.rules.len(), 1);
        assert_eq!(
            grammar.rules[0].value,
            Some(json!({ "name": "$1.name", "text": "$2" }))
        );
        assert_eq!(grammar.rules[0].valid.as_deref(), Some("checkMatchingTag"));
    }

    #[test]
    fn test_yaml_loader_accepts_json() {
        let source = r#"{"root": "a", "lexerTokens": ["A"], "rules": [{"type": "a", "expression": ["A"], "value": "$1"}]}"#;
        let from_yaml = GrammarLoader::from_string(source).load().unwrap();
        let from_json = GrammarLoader::from_string(source).load_json().unwrap();
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_invalid_document() {
        let err = GrammarLoader::from_string("rules: [").load().unwrap_err();
        assert!(matches!(err, LoaderError::Yaml(_)));

        let err = GrammarLoader::from_string("{").load_json().unwrap_err();
        assert!(matches!(err, LoaderError::Json(_)));
    }

    #[test]
    fn test_compile_reports_grammar_errors() {
        let err = GrammarLoader::from_string(TAG_GRAMMAR)
            .compile(ParseOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Grammar(GrammarError::MissingValidation { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = GrammarLoader::from_path("does/not/exist.yaml").err().unwrap();
        assert!(matches!(err, LoaderError::Io(_)));
    }
}
