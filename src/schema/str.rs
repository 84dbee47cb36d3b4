//! String constraints: length bounds and pattern matching.

use std::hash::{Hash, Hasher};

use regex::Regex;
use serde_json::{Map, Value};

use crate::compile::{self, SchemaError};
use crate::result::{Kind, ValidateResult};
use super::Meta;

/// A source pattern with its compiled form. Compiled once at schema compile
/// time; equality and hashing go by source text, which is what the caching
/// contract needs.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub source: String,
    pub regex: Regex,
}

impl Pattern {
    pub(crate) fn compile(source: &str) -> Result<Pattern, SchemaError> {
        let regex = Regex::new(source).map_err(|e| SchemaError::InvalidPattern {
            pattern: source.to_string(),
            source: e,
        })?;
        Ok(Pattern { source: source.to_string(), regex })
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StringNode {
    pub meta: Meta,
    /// Length bounds count Unicode scalar values, not bytes.
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
}

impl StringNode {
    /// Check order: length bounds, then pattern.
    pub fn validate(&self, v: &Value) -> ValidateResult {
        if v.is_null() {
            return ValidateResult::InputNull;
        }
        let s = match v.as_str() {
            Some(s) => s,
            None => {
                return ValidateResult::TypeMismatch {
                    expected: Kind::String,
                    actual: Kind::of(v),
                };
            }
        };

        if self.min_length.is_some() || self.max_length.is_some() {
            let len = s.chars().count();
            let too_short = self.min_length.is_some_and(|min| len < min);
            let too_long = self.max_length.is_some_and(|max| len > max);
            if too_short || too_long {
                return ValidateResult::LengthOutOfRange {
                    min: self.min_length,
                    max: self.max_length,
                    actual: len,
                };
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.regex.is_match(s) {
                return ValidateResult::PatternMismatch {
                    pattern: pattern.source.clone(),
                    value: s.to_string(),
                };
            }
        }

        ValidateResult::Success
    }
}

pub(crate) fn compile(doc: &Map<String, Value>, meta: Meta) -> Result<StringNode, SchemaError> {
    let min_length = compile::get_usize(doc, "minLength")?;
    let max_length = compile::get_usize(doc, "maxLength")?;
    let pattern = match compile::get_str(doc, "pattern")? {
        Some(src) => Some(Pattern::compile(src)?),
        None => None,
    };
    Ok(StringNode { meta, min_length, max_length, pattern })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(doc: Value) -> StringNode {
        compile(doc.as_object().unwrap(), Meta::default()).unwrap()
    }

    #[test]
    fn length_counts_unicode_scalars() {
        let n = node(json!({"minLength": 3, "maxLength": 3}));
        assert_eq!(n.validate(&json!("αβγ")), ValidateResult::Success);
        assert_eq!(
            n.validate(&json!("ab")),
            ValidateResult::LengthOutOfRange { min: Some(3), max: Some(3), actual: 2 }
        );
    }

    #[test]
    fn length_reported_before_pattern() {
        let n = node(json!({"minLength": 5, "pattern": "^[0-9]+$"}));
        // "ab" violates both; length wins
        assert_eq!(
            n.validate(&json!("ab")),
            ValidateResult::LengthOutOfRange { min: Some(5), max: None, actual: 2 }
        );
        assert_eq!(
            n.validate(&json!("abcdef")),
            ValidateResult::PatternMismatch {
                pattern: "^[0-9]+$".to_string(),
                value: "abcdef".to_string(),
            }
        );
        assert_eq!(n.validate(&json!("123456")), ValidateResult::Success);
    }

    #[test]
    fn null_and_type_mismatch() {
        let n = node(json!({}));
        assert_eq!(n.validate(&json!(null)), ValidateResult::InputNull);
        assert_eq!(
            n.validate(&json!(12)),
            ValidateResult::TypeMismatch { expected: Kind::String, actual: Kind::Integer }
        );
    }

    #[test]
    fn invalid_pattern_is_a_compile_error() {
        let doc = json!({"pattern": "["});
        let err = compile(doc.as_object().unwrap(), Meta::default()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn patterns_equal_by_source() {
        let a = Pattern::compile("^a+$").unwrap();
        let b = Pattern::compile("^a+$").unwrap();
        assert_eq!(a, b);
    }
}
