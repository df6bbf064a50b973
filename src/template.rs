//! AST Template Engine
//!
//! A rule's `value` is a template for the node it synthesizes. Templates are plain data
//! (maps, sequences, scalars) in which strings may embed variable references:
//!
//! ```text
//! $1          the first sub-result (a token's data.value, or the nested node itself)
//! $2.name     the `name` field of the second sub-result's data
//! "<$1>"      interpolation, when every reference resolves to a string
//! ```
//!
//! Templates are compiled once, when the grammar is compiled, so the reference pattern is
//! never re-scanned during a parse.
//!
//! Combination rules for a string holding references:
//!     - every resolved value is a string: splice them back in place of their references
//!     - otherwise, one reference: the resolved value itself (no stringification)
//!     - otherwise: the resolved values, in order, as a sequence

use crate::error::ParseError;
use crate::token::SubResult;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::ops::Range;

/// `$` + 1-based index + optional `.attr`
static VARIABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([0-9]+)(?:\.([A-Za-z0-9_]+))?").unwrap());

/// A `$index[.attr]` reference found in a template string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
    /// 1-based position of the sub-result
    pub index: usize,
    pub attr: Option<String>,
    /// Byte range of the reference in the template string
    pub span: Range<usize>,
}

impl VariableRef {
    /// All references embedded in `source`, in order of appearance
    pub fn scan(source: &str) -> Vec<VariableRef> {
        VARIABLE_REGEX
            .captures_iter(source)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                // An index too large for usize can never be in range; keep it so the
                // grammar compiler reports it.
                let index = caps[1].parse().unwrap_or(usize::MAX);
                Some(VariableRef {
                    index,
                    attr: caps.get(2).map(|m| m.as_str().to_string()),
                    span: whole.range(),
                })
            })
            .collect()
    }

    fn resolve(&self, sub_results: &[SubResult<'_>]) -> Result<Value, ParseError> {
        let sub = self
            .index
            .checked_sub(1)
            .and_then(|i| sub_results.get(i))
            .ok_or(ParseError::MissingSubResult {
                index: self.index,
                available: sub_results.len(),
            })?;

        match &self.attr {
            Some(attr) => {
                let data = sub.data().ok_or_else(|| ParseError::AttributeOnPlainValue {
                    index: self.index,
                    attr: attr.clone(),
                })?;
                Ok(data.get(attr).cloned().unwrap_or(Value::Null))
            }
            None => Ok(match sub.inner_value() {
                Some(value) => value.clone(),
                None => sub.to_value(),
            }),
        }
    }
}

/// A compiled output template
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// Passed through unchanged
    Literal(Value),
    /// Keys preserved in declaration order, values templated
    Object(Vec<(String, Template)>),
    Array(Vec<Template>),
    /// A string with at least one variable reference
    Text {
        source: String,
        refs: Vec<VariableRef>,
    },
}

impl Template {
    pub fn compile(value: &Value) -> Template {
        match value {
            Value::Object(map) => Template::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Template::compile(value)))
                    .collect(),
            ),
            Value::Array(items) => Template::Array(items.iter().map(Template::compile).collect()),
            Value::String(source) => {
                let refs = VariableRef::scan(source);
                if refs.is_empty() {
                    Template::Literal(value.clone())
                } else {
                    Template::Text {
                        source: source.clone(),
                        refs,
                    }
                }
            }
            other => Template::Literal(other.clone()),
        }
    }

    /// Every variable reference in the template, depth-first
    pub fn references(&self) -> Vec<&VariableRef> {
        let mut found = Vec::new();
        self.collect_references(&mut found);
        found
    }

    fn collect_references<'a>(&'a self, found: &mut Vec<&'a VariableRef>) {
        match self {
            Template::Literal(_) => {}
            Template::Object(entries) => entries
                .iter()
                .for_each(|(_, template)| template.collect_references(found)),
            Template::Array(items) => items
                .iter()
                .for_each(|template| template.collect_references(found)),
            Template::Text { refs, .. } => found.extend(refs.iter()),
        }
    }

    /// First reference index that cannot address an expression of `arity` elements
    pub fn first_out_of_range(&self, arity: usize) -> Option<usize> {
        self.references()
            .into_iter()
            .map(|r| r.index)
            .find(|&index| index == 0 || index > arity)
    }

    /// Synthesize a value from the sub-results of one rule invocation
    pub fn render(&self, sub_results: &[SubResult<'_>]) -> Result<Value, ParseError> {
        match self {
            Template::Literal(value) => Ok(value.clone()),
            Template::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, template) in entries {
                    map.insert(key.clone(), template.render(sub_results)?);
                }
                Ok(Value::Object(map))
            }
            Template::Array(items) => items
                .iter()
                .map(|template| template.render(sub_results))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Template::Text { source, refs } => render_text(source, refs, sub_results),
        }
    }
}

fn render_text(
    source: &str,
    refs: &[VariableRef],
    sub_results: &[SubResult<'_>],
) -> Result<Value, ParseError> {
    let mut values = refs
        .iter()
        .map(|r| r.resolve(sub_results))
        .collect::<Result<Vec<_>, _>>()?;

    if values.iter().all(Value::is_string) {
        let mut spliced = String::with_capacity(source.len());
        let mut last = 0;
        for (r, value) in refs.iter().zip(&values) {
            spliced.push_str(&source[last..r.span.start]);
            if let Value::String(s) = value {
                spliced.push_str(s);
            }
            last = r.span.end;
        }
        spliced.push_str(&source[last..]);
        return Ok(Value::String(spliced));
    }

    if values.len() == 1 {
        Ok(values.remove(0))
    } else {
        Ok(Value::Array(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;
    use serde_json::json;

    fn render(template: Value, subs: &[SubResult<'_>]) -> Result<Value, ParseError> {
        Template::compile(&template).render(subs)
    }

    #[test]
    fn test_scan_references() {
        let refs = VariableRef::scan("$1 and $12.name_x!");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].index, 1);
        assert_eq!(refs[0].attr, None);
        assert_eq!(refs[0].span, 0..2);
        assert_eq!(refs[1].index, 12);
        assert_eq!(refs[1].attr.as_deref(), Some("name_x"));
        assert_eq!(refs[1].span, 7..17);
    }

    #[test]
    fn test_plain_string_is_literal() {
        assert_eq!(
            Template::compile(&json!("no refs $ here")),
            Template::Literal(json!("no refs $ here"))
        );
    }

    #[test]
    fn test_string_splice() {
        let word = Token::with_value("word", "hi");
        let value = render(json!("<$1>"), &[SubResult::Token(&word)]).unwrap();
        assert_eq!(value, json!("<hi>"));
    }

    #[test]
    fn test_splice_uses_reference_positions() {
        // A substituted value that looks like a reference is not substituted again
        let a = Token::with_value("word", "$2");
        let b = Token::with_value("word", "b");
        let value = render(
            json!("$1-$2-$1"),
            &[SubResult::Token(&a), SubResult::Token(&b)],
        )
        .unwrap();
        assert_eq!(value, json!("$2-b-$2"));
    }

    #[test]
    fn test_object_passthrough() {
        let node = SubResult::Node(json!({ "tag": "div" }));
        let value = render(json!("$1"), &[node]).unwrap();
        assert_eq!(value, json!({ "tag": "div" }));
    }

    #[test]
    fn test_single_non_string_ignores_surrounding_text() {
        let node = SubResult::Node(json!({ "tag": "div" }));
        let value = render(json!("child: $1"), &[node]).unwrap();
        assert_eq!(value, json!({ "tag": "div" }));
    }

    #[test]
    fn test_mixed_references_yield_sequence() {
        let word = Token::with_value("word", "hi");
        let node = SubResult::Node(json!({ "tag": "div" }));
        let value = render(json!("$1 $2"), &[SubResult::Token(&word), node]).unwrap();
        assert_eq!(value, json!(["hi", { "tag": "div" }]));
    }

    #[test]
    fn test_attribute_access() {
        let attr = Token::new("attr", json!({ "name": "id", "value": "x" }));
        let first = Token::with_value("word", "ignored");
        let value = render(
            json!("$2.name"),
            &[SubResult::Token(&first), SubResult::Token(&attr)],
        )
        .unwrap();
        assert_eq!(value, json!("id"));
    }

    #[test]
    fn test_missing_attribute_is_null() {
        let token = Token::with_value("word", "hi");
        let value = render(json!("$1.nope"), &[SubResult::Token(&token)]).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_non_string_attribute_is_not_stringified() {
        let token = Token::new("number", json!({ "value": 42 }));
        let value = render(json!("$1"), &[SubResult::Token(&token)]).unwrap();
        assert_eq!(value, json!(42));
    }

    #[test]
    fn test_token_without_value_resolves_to_itself() {
        let token = Token::new("OPEN_TAG", json!({ "name": "p" }));
        let value = render(json!("$1"), &[SubResult::Token(&token)]).unwrap();
        assert_eq!(value, json!({ "type": "OPEN_TAG", "data": { "name": "p" } }));
    }

    #[test]
    fn test_attribute_on_plain_value_is_an_error() {
        let node = SubResult::Node(json!({ "tag": "div" }));
        let err = render(json!("$1.tag"), &[node]).unwrap_err();
        assert_eq!(
            err,
            ParseError::AttributeOnPlainValue {
                index: 1,
                attr: "tag".to_string()
            }
        );
    }

    #[test]
    fn test_attribute_on_scalar_token_data_is_an_error() {
        let token = Token::new("WORD", json!("hi"));
        let err = render(json!("$1.name"), &[SubResult::Token(&token)]).unwrap_err();
        assert_eq!(
            err,
            ParseError::AttributeOnPlainValue {
                index: 1,
                attr: "name".to_string()
            }
        );
    }

    #[test]
    fn test_missing_sub_result_is_an_error() {
        let err = render(json!("$3"), &[]).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingSubResult {
                index: 3,
                available: 0
            }
        );
    }

    #[test]
    fn test_nested_structures_keep_shape_and_key_order() {
        let open = Token::new("OPEN_TAG", json!({ "name": "p" }));
        let text = Token::with_value("TEXT", "hi");
        let value = render(
            json!({
                "name": "$1.name",
                "kind": "element",
                "depth": 1,
                "children": ["$2", { "raw": true }]
            }),
            &[SubResult::Token(&open), SubResult::Token(&text)],
        )
        .unwrap();
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"name":"p","kind":"element","depth":1,"children":["hi",{"raw":true}]}"#
        );
    }

    #[test]
    fn test_first_out_of_range() {
        let template = Template::compile(&json!({ "a": "$1", "b": ["$4.name"] }));
        assert_eq!(template.first_out_of_range(4), None);
        assert_eq!(template.first_out_of_range(3), Some(4));
        assert_eq!(Template::compile(&json!("$0")).first_out_of_range(3), Some(0));
    }
}
