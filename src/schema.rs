//! Compiled schema nodes and the validation dispatch.
//!
//! A schema document compiles once into an arena of immutable nodes
//! (`CompiledSchema`); every `validate` call afterwards is a pure, read-only
//! traversal driven by the value's runtime shape. Nodes reference children by
//! arena index, so recursive schemas are representable without ownership
//! cycles. A compiled tree holds no validation-time state and can be shared
//! across threads freely.

pub mod arr;
pub mod compose;
pub mod int;
pub mod number;
pub mod obj;
pub mod str;

use std::hash::{Hash, Hasher};

use serde_json::{Map, Value};

use crate::num::{json_eq, Num};
use crate::result::{Kind, ValidateResult};

pub use arr::ArrayNode;
pub use compose::{AllOfNode, AnyOfNode, NotNode, OneOfNode};
pub use int::IntegerNode;
pub use number::NumberNode;
pub use obj::{Additional, ObjectNode};
pub use str::{Pattern, StringNode};

/// Index of a node in its `CompiledSchema` arena.
pub type NodeId = usize;

/// Annotations every keyword family carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Meta {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// The empty schema: accepts every value, null included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AnyNode {
    pub meta: Meta,
}

/// Exactly null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NullNode {
    pub meta: Meta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BooleanNode {
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumNode {
    pub meta: Meta,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstNode {
    pub meta: Meta,
    pub value: Value,
}

/// A `$ref`, resolved at compile time to an arena index. The source string is
/// kept for re-emission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefNode {
    pub meta: Meta,
    pub reference: String,
    pub target: NodeId,
}

impl NullNode {
    pub fn validate(&self, v: &Value) -> ValidateResult {
        if v.is_null() {
            ValidateResult::Success
        } else {
            ValidateResult::TypeMismatch { expected: Kind::Null, actual: Kind::of(v) }
        }
    }
}

impl BooleanNode {
    pub fn validate(&self, v: &Value) -> ValidateResult {
        if v.is_null() {
            return ValidateResult::InputNull;
        }
        if v.is_boolean() {
            ValidateResult::Success
        } else {
            ValidateResult::TypeMismatch { expected: Kind::Boolean, actual: Kind::of(v) }
        }
    }
}

impl EnumNode {
    /// Null is a member only when the enum lists it; otherwise null keeps its
    /// dedicated failure. Membership uses JSON-number equality (1 == 1.0).
    pub fn validate(&self, v: &Value) -> ValidateResult {
        if v.is_null() && !self.values.iter().any(Value::is_null) {
            return ValidateResult::InputNull;
        }
        if self.values.iter().any(|member| json_eq(member, v)) {
            ValidateResult::Success
        } else {
            ValidateResult::NotInEnum { value: v.clone() }
        }
    }
}

impl ConstNode {
    pub fn validate(&self, v: &Value) -> ValidateResult {
        if v.is_null() && !self.value.is_null() {
            return ValidateResult::InputNull;
        }
        if json_eq(&self.value, v) {
            ValidateResult::Success
        } else {
            ValidateResult::ConstMismatch { expected: self.value.clone(), actual: v.clone() }
        }
    }
}

// serde_json::Value is PartialEq but not Eq/Hash; enum and const members
// never hold NaN (serde_json numbers are finite), so equality is a proper
// equivalence and hashing can go through the compact serialization.
impl Eq for EnumNode {}

impl Hash for EnumNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.meta.hash(state);
        for v in &self.values {
            v.to_string().hash(state);
        }
    }
}

impl Eq for ConstNode {}

impl Hash for ConstNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.meta.hash(state);
        self.value.to_string().hash(state);
    }
}

/// One compiled, immutable node per keyword family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaNode {
    Any(AnyNode),
    Null(NullNode),
    Boolean(BooleanNode),
    Integer(IntegerNode),
    Number(NumberNode),
    String(StringNode),
    Array(ArrayNode),
    Object(ObjectNode),
    Enum(EnumNode),
    Const(ConstNode),
    AllOf(AllOfNode),
    AnyOf(AnyOfNode),
    OneOf(OneOfNode),
    Not(NotNode),
    Ref(RefNode),
}

impl SchemaNode {
    pub fn meta(&self) -> &Meta {
        match self {
            SchemaNode::Any(n) => &n.meta,
            SchemaNode::Null(n) => &n.meta,
            SchemaNode::Boolean(n) => &n.meta,
            SchemaNode::Integer(n) => &n.meta,
            SchemaNode::Number(n) => &n.meta,
            SchemaNode::String(n) => &n.meta,
            SchemaNode::Array(n) => &n.meta,
            SchemaNode::Object(n) => &n.meta,
            SchemaNode::Enum(n) => &n.meta,
            SchemaNode::Const(n) => &n.meta,
            SchemaNode::AllOf(n) => &n.meta,
            SchemaNode::AnyOf(n) => &n.meta,
            SchemaNode::OneOf(n) => &n.meta,
            SchemaNode::Not(n) => &n.meta,
            SchemaNode::Ref(n) => &n.meta,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.meta().title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.meta().description.as_deref()
    }
}

// ------------------------------ Dispatch ---------------------------------- //

pub(crate) fn validate_at(nodes: &[SchemaNode], id: NodeId, v: &Value) -> ValidateResult {
    match &nodes[id] {
        SchemaNode::Any(_) => ValidateResult::Success,
        SchemaNode::Null(n) => n.validate(v),
        SchemaNode::Boolean(n) => n.validate(v),
        SchemaNode::Integer(n) => n.validate(v),
        SchemaNode::Number(n) => n.validate(v),
        SchemaNode::String(n) => n.validate(v),
        SchemaNode::Array(n) => n.validate(nodes, v),
        SchemaNode::Object(n) => n.validate(nodes, v),
        SchemaNode::Enum(n) => n.validate(v),
        SchemaNode::Const(n) => n.validate(v),
        SchemaNode::AllOf(n) => n.validate_with(|id| validate_at(nodes, id, v)),
        SchemaNode::AnyOf(n) => n.validate_with(|id| validate_at(nodes, id, v)),
        SchemaNode::OneOf(n) => n.validate_with(|id| validate_at(nodes, id, v)),
        SchemaNode::Not(n) => n.validate_with(|id| validate_at(nodes, id, v)),
        SchemaNode::Ref(r) => validate_at(nodes, r.target, v),
    }
}

/// Known-integer entry point. Numeric and composition nodes skip value
/// classification; everything else goes through the boxed form, so the
/// outcome is identical to `validate_at` on `Value::from(value)` by
/// construction.
pub(crate) fn validate_i64_at(nodes: &[SchemaNode], id: NodeId, value: i64) -> ValidateResult {
    match &nodes[id] {
        SchemaNode::Integer(n) => n.check(value),
        SchemaNode::Number(n) => n.check(Num::Int(value)),
        SchemaNode::AllOf(n) => n.validate_with(|id| validate_i64_at(nodes, id, value)),
        SchemaNode::AnyOf(n) => n.validate_with(|id| validate_i64_at(nodes, id, value)),
        SchemaNode::OneOf(n) => n.validate_with(|id| validate_i64_at(nodes, id, value)),
        SchemaNode::Not(n) => n.validate_with(|id| validate_i64_at(nodes, id, value)),
        SchemaNode::Ref(r) => validate_i64_at(nodes, r.target, value),
        _ => validate_at(nodes, id, &Value::from(value)),
    }
}

// ---------------------------- Compiled tree ------------------------------- //

/// An immutable, compiled schema: the node arena, the root index, and the
/// definitions table (kept for re-emission). Equality is structural over all
/// constraint fields, which makes compiled schemas usable as cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompiledSchema {
    pub(crate) nodes: Vec<SchemaNode>,
    pub(crate) root: NodeId,
    pub(crate) defs: Vec<(String, NodeId)>,
}

impl CompiledSchema {
    /// Check a value against the schema. Never panics, never errors: any
    /// input, null included, produces a `ValidateResult`.
    pub fn validate(&self, value: &Value) -> ValidateResult {
        validate_at(&self.nodes, self.root, value)
    }

    /// Fast path for an already-known 64-bit integer. Produces results
    /// identical to `validate(&Value::from(value))`.
    pub fn validate_i64(&self, value: i64) -> ValidateResult {
        validate_i64_at(&self.nodes, self.root, value)
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_success()
    }

    pub fn root(&self) -> &SchemaNode {
        &self.nodes[self.root]
    }

    /// Re-serialize the compiled tree's keyword set into an equivalent schema
    /// document. Compiling the emission yields an equal tree.
    pub fn to_document(&self) -> Value {
        let mut doc = match emit(&self.nodes, self.root) {
            Value::Object(map) => map,
            _ => unreachable!("emit always yields an object"),
        };
        if !self.defs.is_empty() {
            let mut defs = Map::new();
            for (name, id) in &self.defs {
                defs.insert(name.clone(), emit(&self.nodes, *id));
            }
            doc.insert("definitions".into(), Value::Object(defs));
        }
        Value::Object(doc)
    }
}

// ------------------------------ Emission ---------------------------------- //

fn put_meta(map: &mut Map<String, Value>, meta: &Meta) {
    if let Some(title) = &meta.title {
        map.insert("title".into(), title.clone().into());
    }
    if let Some(description) = &meta.description {
        map.insert("description".into(), description.clone().into());
    }
}

fn put_count(map: &mut Map<String, Value>, key: &str, v: Option<usize>) {
    if let Some(v) = v {
        map.insert(key.into(), Value::from(v as u64));
    }
}

/// Emit one node's keyword set. `$ref` nodes emit their reference string
/// without expanding, so reference cycles terminate.
fn emit(nodes: &[SchemaNode], id: NodeId) -> Value {
    let mut map = Map::new();
    match &nodes[id] {
        SchemaNode::Any(n) => {
            put_meta(&mut map, &n.meta);
        }
        SchemaNode::Null(n) => {
            map.insert("type".into(), "null".into());
            put_meta(&mut map, &n.meta);
        }
        SchemaNode::Boolean(n) => {
            map.insert("type".into(), "boolean".into());
            put_meta(&mut map, &n.meta);
        }
        SchemaNode::Integer(n) => {
            map.insert("type".into(), "integer".into());
            put_meta(&mut map, &n.meta);
            if let Some(m) = n.minimum {
                let key = if n.exclusive_minimum { "exclusiveMinimum" } else { "minimum" };
                map.insert(key.into(), m.into());
            }
            if let Some(m) = n.maximum {
                let key = if n.exclusive_maximum { "exclusiveMaximum" } else { "maximum" };
                map.insert(key.into(), m.into());
            }
            if let Some(m) = n.multiple_of {
                map.insert("multipleOf".into(), m.into());
            }
        }
        SchemaNode::Number(n) => {
            map.insert("type".into(), "number".into());
            put_meta(&mut map, &n.meta);
            if let Some(m) = n.minimum {
                let key = if n.exclusive_minimum { "exclusiveMinimum" } else { "minimum" };
                map.insert(key.into(), m.0.into());
            }
            if let Some(m) = n.maximum {
                let key = if n.exclusive_maximum { "exclusiveMaximum" } else { "maximum" };
                map.insert(key.into(), m.0.into());
            }
            if let Some(m) = n.multiple_of {
                map.insert("multipleOf".into(), m.0.into());
            }
        }
        SchemaNode::String(n) => {
            map.insert("type".into(), "string".into());
            put_meta(&mut map, &n.meta);
            put_count(&mut map, "minLength", n.min_length);
            put_count(&mut map, "maxLength", n.max_length);
            if let Some(pattern) = &n.pattern {
                map.insert("pattern".into(), pattern.source.clone().into());
            }
        }
        SchemaNode::Array(n) => {
            map.insert("type".into(), "array".into());
            put_meta(&mut map, &n.meta);
            if let Some(items) = n.items {
                map.insert("items".into(), emit(nodes, items));
            }
            put_count(&mut map, "minItems", n.min_items);
            put_count(&mut map, "maxItems", n.max_items);
            if n.unique_items {
                map.insert("uniqueItems".into(), true.into());
            }
        }
        SchemaNode::Object(n) => {
            map.insert("type".into(), "object".into());
            put_meta(&mut map, &n.meta);
            if !n.properties.is_empty() {
                let mut props = Map::new();
                for (name, id) in &n.properties {
                    props.insert(name.clone(), emit(nodes, *id));
                }
                map.insert("properties".into(), Value::Object(props));
            }
            if !n.required.is_empty() {
                map.insert(
                    "required".into(),
                    Value::Array(n.required.iter().cloned().map(Value::from).collect()),
                );
            }
            put_count(&mut map, "minProperties", n.min_properties);
            put_count(&mut map, "maxProperties", n.max_properties);
            if !n.pattern_properties.is_empty() {
                let mut pats = Map::new();
                for (pattern, id) in &n.pattern_properties {
                    pats.insert(pattern.source.clone(), emit(nodes, *id));
                }
                map.insert("patternProperties".into(), Value::Object(pats));
            }
            match n.additional {
                Additional::Allow => {}
                Additional::Deny => {
                    map.insert("additionalProperties".into(), false.into());
                }
                Additional::Schema(id) => {
                    map.insert("additionalProperties".into(), emit(nodes, id));
                }
            }
        }
        SchemaNode::Enum(n) => {
            put_meta(&mut map, &n.meta);
            map.insert("enum".into(), Value::Array(n.values.clone()));
        }
        SchemaNode::Const(n) => {
            put_meta(&mut map, &n.meta);
            map.insert("const".into(), n.value.clone());
        }
        SchemaNode::AllOf(n) => {
            put_meta(&mut map, &n.meta);
            map.insert(
                "allOf".into(),
                Value::Array(n.branches.iter().map(|&id| emit(nodes, id)).collect()),
            );
        }
        SchemaNode::AnyOf(n) => {
            put_meta(&mut map, &n.meta);
            map.insert(
                "anyOf".into(),
                Value::Array(n.branches.iter().map(|&id| emit(nodes, id)).collect()),
            );
        }
        SchemaNode::OneOf(n) => {
            put_meta(&mut map, &n.meta);
            map.insert(
                "oneOf".into(),
                Value::Array(n.branches.iter().map(|&id| emit(nodes, id)).collect()),
            );
        }
        SchemaNode::Not(n) => {
            put_meta(&mut map, &n.meta);
            map.insert("not".into(), emit(nodes, n.child));
        }
        SchemaNode::Ref(n) => {
            put_meta(&mut map, &n.meta);
            map.insert("$ref".into(), n.reference.clone().into());
        }
    }
    Value::Object(map)
}

// ------------------------------- Tests ------------------------------------ //
