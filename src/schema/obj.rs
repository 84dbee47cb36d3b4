//! Object constraints: required properties, property-count bounds, declared
//! and pattern-matched property schemas, and the undeclared-property policy.

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::compile::{self, Compiler, SchemaError};
use crate::result::{Kind, ValidateResult};
use super::str::Pattern;
use super::{validate_at, Meta, NodeId, SchemaNode};

/// Policy for properties with no declared or pattern-matched schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Additional {
    Allow,
    Deny,
    Schema(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectNode {
    pub meta: Meta,
    /// Declared properties in document order.
    pub properties: IndexMap<String, NodeId>,
    pub required: Vec<String>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
    pub pattern_properties: Vec<(Pattern, NodeId)>,
    pub additional: Additional,
}

// IndexMap has no Hash impl; hash entries in order.
impl Hash for ObjectNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.meta.hash(state);
        for (k, id) in &self.properties {
            k.hash(state);
            id.hash(state);
        }
        self.required.hash(state);
        self.min_properties.hash(state);
        self.max_properties.hash(state);
        self.pattern_properties.hash(state);
        self.additional.hash(state);
    }
}

impl ObjectNode {
    /// Check order: required presence, property-count bounds, then each
    /// property of the input in its own (preserved) order: declared schema
    /// first, then every matching pattern schema, then the additional policy.
    pub fn validate(&self, nodes: &[SchemaNode], v: &Value) -> ValidateResult {
        if v.is_null() {
            return ValidateResult::InputNull;
        }
        let map = match v.as_object() {
            Some(map) => map,
            None => {
                return ValidateResult::TypeMismatch {
                    expected: Kind::Object,
                    actual: Kind::of(v),
                };
            }
        };

        for name in &self.required {
            if !map.contains_key(name) {
                return ValidateResult::MissingProperty { name: name.clone() };
            }
        }

        let count = map.len();
        let too_few = self.min_properties.is_some_and(|min| count < min);
        let too_many = self.max_properties.is_some_and(|max| count > max);
        if too_few || too_many {
            return ValidateResult::PropertyCountOutOfRange {
                min: self.min_properties,
                max: self.max_properties,
                actual: count,
            };
        }

        for (name, child) in map {
            let mut matched = false;

            if let Some(&id) = self.properties.get(name) {
                matched = true;
                let r = validate_at(nodes, id, child);
                if r.is_failure() {
                    return ValidateResult::Property { name: name.clone(), cause: Box::new(r) };
                }
            }

            for (pattern, id) in &self.pattern_properties {
                if pattern.regex.is_match(name) {
                    matched = true;
                    let r = validate_at(nodes, *id, child);
                    if r.is_failure() {
                        return ValidateResult::Property { name: name.clone(), cause: Box::new(r) };
                    }
                }
            }

            if !matched {
                match self.additional {
                    Additional::Allow => {}
                    Additional::Deny => {
                        return ValidateResult::UndeclaredProperty { name: name.clone() };
                    }
                    Additional::Schema(id) => {
                        let r = validate_at(nodes, id, child);
                        if r.is_failure() {
                            return ValidateResult::Property { name: name.clone(), cause: Box::new(r) };
                        }
                    }
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
) -> Result<ObjectNode, SchemaError> {
    let mut properties = IndexMap::new();
    if let Some(props) = doc.get("properties") {
        let props = props
            .as_object()
            .ok_or_else(|| compile::malformed("properties", "an object of schemas", props))?;
        for (name, child) in props {
            properties.insert(name.clone(), c.compile_child(child)?);
        }
    }

    let mut required = Vec::new();
    if let Some(req) = doc.get("required") {
        let req = req
            .as_array()
            .ok_or_else(|| compile::malformed("required", "an array of strings", req))?;
        for entry in req {
            let name = entry
                .as_str()
                .ok_or_else(|| compile::malformed("required", "an array of strings", entry))?;
            required.push(name.to_string());
        }
    }

    let min_properties = compile::get_usize(doc, "minProperties")?;
    let max_properties = compile::get_usize(doc, "maxProperties")?;

    let mut pattern_properties = Vec::new();
    if let Some(pats) = doc.get("patternProperties") {
        let pats = pats
            .as_object()
            .ok_or_else(|| compile::malformed("patternProperties", "an object of schemas", pats))?;
        for (src, child) in pats {
            let pattern = Pattern::compile(src)?;
            pattern_properties.push((pattern, c.compile_child(child)?));
        }
    }

    let additional = match doc.get("additionalProperties") {
        None | Some(Value::Bool(true)) => Additional::Allow,
        Some(Value::Bool(false)) => Additional::Deny,
        Some(child @ Value::Object(_)) => Additional::Schema(c.compile_child(child)?),
        Some(other) => {
            return Err(compile::malformed("additionalProperties", "a boolean or a schema object", other));
        }
    };

    Ok(ObjectNode {
        meta,
        properties,
        required,
        min_properties,
        max_properties,
        pattern_properties,
        additional,
    })
}

#[cfg(test)]
mod tests {
    use crate::result::{Kind, ValidateResult};
    use serde_json::json;

    fn schema(doc: serde_json::Value) -> crate::schema::CompiledSchema {
        crate::compile::compile(&doc).unwrap()
    }

    #[test]
    fn required_before_property_validation() {
        let s = schema(json!({
            "type": "object",
            "properties": {"a": {"type": "integer"}},
            "required": ["b"]
        }));
        // "a" holds a bad value AND "b" is missing; required is reported first
        assert_eq!(
            s.validate(&json!({"a": "not an int"})),
            ValidateResult::MissingProperty { name: "b".to_string() }
        );
    }

    #[test]
    fn required_means_present_even_if_null() {
        let s = schema(json!({"type": "object", "required": ["a"]}));
        assert_eq!(s.validate(&json!({"a": null})), ValidateResult::Success);
        assert_eq!(
            s.validate(&json!({})),
            ValidateResult::MissingProperty { name: "a".to_string() }
        );
    }

    #[test]
    fn property_count_bounds() {
        let s = schema(json!({"type": "object", "maxProperties": 1}));
        assert_eq!(
            s.validate(&json!({"a": 1, "b": 2})),
            ValidateResult::PropertyCountOutOfRange { min: None, max: Some(1), actual: 2 }
        );
    }

    #[test]
    fn first_failing_property_is_annotated_with_its_key() {
        let s = schema(json!({
            "type": "object",
            "properties": {"age": {"type": "integer", "minimum": 0}}
        }));
        let r = s.validate(&json!({"name": "x", "age": -1}));
        match r {
            ValidateResult::Property { name, cause } => {
                assert_eq!(name, "age");
                assert!(matches!(*cause, ValidateResult::BelowMinimum { .. }));
            }
            other => panic!("expected Property failure, got {other:?}"),
        }
    }

    #[test]
    fn undeclared_properties_rejected_when_additional_false() {
        let s = schema(json!({
            "type": "object",
            "properties": {"a": {"type": "integer"}},
            "additionalProperties": false
        }));
        assert_eq!(s.validate(&json!({"a": 1})), ValidateResult::Success);
        assert_eq!(
            s.validate(&json!({"a": 1, "b": 2})),
            ValidateResult::UndeclaredProperty { name: "b".to_string() }
        );
    }

    #[test]
    fn undeclared_properties_validate_against_additional_schema() {
        let s = schema(json!({
            "type": "object",
            "properties": {"a": {"type": "integer"}},
            "additionalProperties": {"type": "string"}
        }));
        assert_eq!(s.validate(&json!({"a": 1, "b": "ok"})), ValidateResult::Success);
        assert_eq!(
            s.validate(&json!({"a": 1, "b": 2})),
            ValidateResult::Property {
                name: "b".to_string(),
                cause: Box::new(ValidateResult::TypeMismatch {
                    expected: Kind::String,
                    actual: Kind::Integer,
                }),
            }
        );
    }

    #[test]
    fn pattern_properties_apply_to_matching_keys() {
        let s = schema(json!({
            "type": "object",
            "patternProperties": {"^x_": {"type": "integer"}},
            "additionalProperties": false
        }));
        assert_eq!(s.validate(&json!({"x_a": 1, "x_b": 2})), ValidateResult::Success);
        assert!(matches!(
            s.validate(&json!({"x_a": "nope"})),
            ValidateResult::Property { .. }
        ));
        assert_eq!(
            s.validate(&json!({"y": 1})),
            ValidateResult::UndeclaredProperty { name: "y".to_string() }
        );
    }

    #[test]
    fn null_and_type_mismatch() {
        let s = schema(json!({"type": "object"}));
        assert_eq!(s.validate(&json!(null)), ValidateResult::InputNull);
        assert_eq!(
            s.validate(&json!([])),
            ValidateResult::TypeMismatch { expected: Kind::Object, actual: Kind::Array }
        );
    }
}
