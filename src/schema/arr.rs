//! Array constraints: item count bounds, uniqueness, per-item sub-schema.

use serde_json::{Map, Value};

use crate::compile::{self, Compiler, SchemaError};
use crate::num::json_eq;
use crate::result::{Kind, ValidateResult};
use super::{validate_at, Meta, NodeId, SchemaNode};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayNode {
    pub meta: Meta,
    /// Sub-schema every element must satisfy, if declared.
    pub items: Option<NodeId>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
}

impl ArrayNode {
    /// Check order: count bounds, uniqueness, then per-item validation.
    /// The first failing element short-circuits, annotated with its index.
    pub fn validate(&self, nodes: &[SchemaNode], v: &Value) -> ValidateResult {
        if v.is_null() {
            return ValidateResult::InputNull;
        }
        let items = match v.as_array() {
            Some(items) => items,
            None => {
                return ValidateResult::TypeMismatch {
                    expected: Kind::Array,
                    actual: Kind::of(v),
                };
            }
        };

        let count = items.len();
        let too_few = self.min_items.is_some_and(|min| count < min);
        let too_many = self.max_items.is_some_and(|max| count > max);
        if too_few || too_many {
            return ValidateResult::ItemCountOutOfRange {
                min: self.min_items,
                max: self.max_items,
                actual: count,
            };
        }

        if self.unique_items {
            // pairwise with JSON-number semantics (1 == 1.0); arrays under a
            // uniqueItems constraint are small in practice
            for i in 0..count {
                for j in (i + 1)..count {
                    if json_eq(&items[i], &items[j]) {
                        return ValidateResult::DuplicateItems { first: i, second: j };
                    }
                }
            }
        }

        if let Some(item_schema) = self.items {
            for (index, item) in items.iter().enumerate() {
                let r = validate_at(nodes, item_schema, item);
                if r.is_failure() {
                    return ValidateResult::Item { index, cause: Box::new(r) };
                }
            }
        }

        ValidateResult::Success
    }
}

pub(crate) fn compile(
    c: &mut Compiler,
    doc: &Map<String, Value>,
    meta: Meta,
) -> Result<ArrayNode, SchemaError> {
    let items = match doc.get("items") {
        None => None,
        Some(child @ Value::Object(_)) => Some(c.compile_child(child)?),
        Some(other) => return Err(compile::malformed("items", "a schema object", other)),
    };
    let min_items = compile::get_usize(doc, "minItems")?;
    let max_items = compile::get_usize(doc, "maxItems")?;
    let unique_items = compile::get_bool(doc, "uniqueItems")?.unwrap_or(false);

    Ok(ArrayNode { meta, items, min_items, max_items, unique_items })
}

#[cfg(test)]
mod tests {
    use crate::result::{Kind, ValidateResult};
    use serde_json::json;

    fn schema(doc: serde_json::Value) -> crate::schema::CompiledSchema {
        crate::compile::compile(&doc).unwrap()
    }

    #[test]
    fn count_bounds_before_uniqueness() {
        let s = schema(json!({"type": "array", "minItems": 3, "uniqueItems": true}));
        // [1, 1] violates both; the count bound is reported
        assert_eq!(
            s.validate(&json!([1, 1])),
            ValidateResult::ItemCountOutOfRange { min: Some(3), max: None, actual: 2 }
        );
    }

    #[test]
    fn duplicate_items_carry_both_indices() {
        let s = schema(json!({"type": "array", "uniqueItems": true}));
        assert_eq!(
            s.validate(&json!([1, 2, 1.0])),
            ValidateResult::DuplicateItems { first: 0, second: 2 }
        );
        assert_eq!(s.validate(&json!([1, 2, 3])), ValidateResult::Success);
    }

    #[test]
    fn first_failing_item_is_annotated_with_its_index() {
        let s = schema(json!({"type": "array", "items": {"type": "integer", "minimum": 0}}));
        let r = s.validate(&json!([1, 2, -3, -4]));
        match r {
            ValidateResult::Item { index, cause } => {
                assert_eq!(index, 2);
                assert!(matches!(*cause, ValidateResult::BelowMinimum { .. }));
            }
            other => panic!("expected Item failure, got {other:?}"),
        }
    }

    #[test]
    fn null_elements_fail_item_schema_as_input_null() {
        let s = schema(json!({"type": "array", "items": {"type": "string"}}));
        assert_eq!(
            s.validate(&json!(["a", null])),
            ValidateResult::Item { index: 1, cause: Box::new(ValidateResult::InputNull) }
        );
    }

    #[test]
    fn null_and_type_mismatch() {
        let s = schema(json!({"type": "array"}));
        assert_eq!(s.validate(&json!(null)), ValidateResult::InputNull);
        assert_eq!(
            s.validate(&json!({"0": 1})),
            ValidateResult::TypeMismatch { expected: Kind::Array, actual: Kind::Object }
        );
    }
}
