//! Schema compiler: document tree in, node arena out.
//!
//! Compilation is a pure function of the document's structure. Malformed
//! documents fail here with a `SchemaError`; no partial tree is ever
//! returned. Definition names are registered before their bodies compile, so
//! recursive and mutually-recursive `$ref`s resolve by index without eager
//! deep-copying.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::result::Kind;
use crate::schema::{
    arr, compose, int, number, obj, str, AnyNode, AnyOfNode, BooleanNode, CompiledSchema,
    ConstNode, EnumNode, Meta, NodeId, NotNode, NullNode, RefNode, SchemaNode,
};

/// Fatal, compile-time schema problems. Disjoint from `ValidateResult`:
/// schema authors get these, value producers get validation failures.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unresolved reference {0:?}")]
    UnresolvedReference(String),
    #[error("malformed keyword {keyword:?}: expected {expected}, found {found}")]
    MalformedKeyword {
        keyword: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("unknown type {0:?}")]
    UnknownType(String),
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("schema document is not valid JSON: {0}")]
    Parse(String),
}

// Keywords that imply a family when `type` is absent.
const OBJECT_KEYWORDS: &[&str] = &[
    "properties", "required", "additionalProperties", "patternProperties",
    "minProperties", "maxProperties",
];
const ARRAY_KEYWORDS: &[&str] = &["items", "minItems", "maxItems", "uniqueItems"];
const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern"];
const NUMBER_KEYWORDS: &[&str] = &[
    "minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum", "multipleOf",
];

/// Compile a schema document into an immutable validator.
///
/// Idempotent and side-effect-free: compiling the same document twice yields
/// two independently-owned, structurally-equal trees.
pub fn compile(document: &Value) -> Result<CompiledSchema, SchemaError> {
    let root_doc = document
        .as_object()
        .ok_or_else(|| malformed("schema", "an object", document))?;

    let mut c = Compiler {
        // slot 0 is the root; filled in last
        nodes: vec![SchemaNode::Any(AnyNode::default())],
        defs: Vec::new(),
    };

    // Register every definition name before compiling any body, so refs
    // between definitions (and back to the root) resolve in one pass.
    let mut bodies: Vec<(NodeId, &Value)> = Vec::new();
    for key in ["definitions", "$defs"] {
        if let Some(defs) = root_doc.get(key) {
            let defs = defs
                .as_object()
                .ok_or_else(|| malformed(key, "an object of schemas", defs))?;
            for (name, body) in defs {
                let id = c.reserve();
                c.defs.push((name.clone(), id));
                bodies.push((id, body));
            }
        }
    }
    for (id, body) in bodies {
        let node = c.compile_node(body)?;
        c.nodes[id] = node;
    }

    let root = c.compile_node(document)?;
    c.nodes[0] = root;
    c.check_ref_chains()?;

    Ok(CompiledSchema { nodes: c.nodes, root: 0, defs: c.defs })
}

/// Parse schema text, then compile. Parse failures carry the JSON path of
/// the offending token.
pub fn compile_str(src: &str) -> Result<CompiledSchema, SchemaError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    let document: Value = serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        SchemaError::Parse(format!("at JSON path {path}: {}", err.into_inner()))
    })?;
    compile(&document)
}

pub struct Compiler {
    nodes: Vec<SchemaNode>,
    defs: Vec<(String, NodeId)>,
}

impl Compiler {
    fn reserve(&mut self) -> NodeId {
        self.nodes.push(SchemaNode::Any(AnyNode::default()));
        self.nodes.len() - 1
    }

    fn push(&mut self, node: SchemaNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Compile a nested schema and return its arena index.
    pub(crate) fn compile_child(&mut self, doc: &Value) -> Result<NodeId, SchemaError> {
        let node = self.compile_node(doc)?;
        Ok(self.push(node))
    }

    /// Dispatch order: `$ref`, explicit `type` (string or union array),
    /// `enum`, `const`, composition keywords, then family inference from
    /// whichever constraint keywords are present. An object with none of
    /// these is the empty schema.
    fn compile_node(&mut self, doc: &Value) -> Result<SchemaNode, SchemaError> {
        let map = doc
            .as_object()
            .ok_or_else(|| malformed("schema", "an object", doc))?;

        let meta = Meta {
            title: get_str(map, "title")?.map(String::from),
            description: get_str(map, "description")?.map(String::from),
        };

        if let Some(reference) = get_str(map, "$ref")? {
            let target = self.resolve_ref(reference)?;
            return Ok(SchemaNode::Ref(RefNode {
                meta,
                reference: reference.to_string(),
                target,
            }));
        }

        if let Some(ty) = map.get("type") {
            return match ty {
                Value::String(s) => self.compile_typed(s, map, meta),
                Value::Array(names) => {
                    if names.is_empty() {
                        return Err(malformed("type", "a type name or a non-empty array of type names", ty));
                    }
                    let mut branches = Vec::with_capacity(names.len());
                    for name in names {
                        let name = name.as_str().ok_or_else(|| {
                            malformed("type", "a type name or a non-empty array of type names", name)
                        })?;
                        let node = self.compile_typed(name, map, Meta::default())?;
                        branches.push(self.push(node));
                    }
                    Ok(SchemaNode::AnyOf(AnyOfNode { meta, branches }))
                }
                other => Err(malformed("type", "a type name or a non-empty array of type names", other)),
            };
        }

        if let Some(raw) = map.get("enum") {
            let values = raw
                .as_array()
                .ok_or_else(|| malformed("enum", "a non-empty array", raw))?;
            if values.is_empty() {
                return Err(malformed("enum", "a non-empty array", raw));
            }
            return Ok(SchemaNode::Enum(EnumNode { meta, values: values.clone() }));
        }

        if let Some(value) = map.get("const") {
            return Ok(SchemaNode::Const(ConstNode { meta, value: value.clone() }));
        }

        if let Some(raw) = map.get("allOf") {
            let branches = compose::compile_branches(self, raw, "allOf")?;
            return Ok(SchemaNode::AllOf(compose::AllOfNode { meta, branches }));
        }
        if let Some(raw) = map.get("anyOf") {
            let branches = compose::compile_branches(self, raw, "anyOf")?;
            return Ok(SchemaNode::AnyOf(AnyOfNode { meta, branches }));
        }
        if let Some(raw) = map.get("oneOf") {
            let branches = compose::compile_branches(self, raw, "oneOf")?;
            return Ok(SchemaNode::OneOf(compose::OneOfNode { meta, branches }));
        }
        if let Some(child) = map.get("not") {
            if !child.is_object() {
                return Err(malformed("not", "a schema object", child));
            }
            let child = self.compile_child(child)?;
            return Ok(SchemaNode::Not(NotNode { meta, child }));
        }

        let has_any = |keys: &[&str]| keys.iter().any(|k| map.contains_key(*k));
        if has_any(OBJECT_KEYWORDS) {
            return obj::compile(self, map, meta).map(SchemaNode::Object);
        }
        if has_any(ARRAY_KEYWORDS) {
            return arr::compile(self, map, meta).map(SchemaNode::Array);
        }
        if has_any(STRING_KEYWORDS) {
            return str::compile(map, meta).map(SchemaNode::String);
        }
        if has_any(NUMBER_KEYWORDS) {
            return number::compile(map, meta).map(SchemaNode::Number);
        }

        Ok(SchemaNode::Any(AnyNode { meta }))
    }

    fn compile_typed(
        &mut self,
        name: &str,
        map: &Map<String, Value>,
        meta: Meta,
    ) -> Result<SchemaNode, SchemaError> {
        match name {
            "integer" => int::compile(map, meta).map(SchemaNode::Integer),
            "number" => number::compile(map, meta).map(SchemaNode::Number),
            "string" => str::compile(map, meta).map(SchemaNode::String),
            "boolean" => Ok(SchemaNode::Boolean(BooleanNode { meta })),
            "null" => Ok(SchemaNode::Null(NullNode { meta })),
            "array" => arr::compile(self, map, meta).map(SchemaNode::Array),
            "object" => obj::compile(self, map, meta).map(SchemaNode::Object),
            other => Err(SchemaError::UnknownType(other.to_string())),
        }
    }

    /// `#` is the document root; `#/definitions/<name>` and `#/$defs/<name>`
    /// look up the definitions table. Anything else is unresolved, at
    /// compile time, never deferred to validation.
    fn resolve_ref(&self, reference: &str) -> Result<NodeId, SchemaError> {
        if reference == "#" {
            return Ok(0);
        }
        let name = reference
            .strip_prefix("#/definitions/")
            .or_else(|| reference.strip_prefix("#/$defs/"));
        name.and_then(|name| {
            self.defs
                .iter()
                .find(|(def, _)| def == name)
                .map(|&(_, id)| id)
        })
        .ok_or_else(|| SchemaError::UnresolvedReference(reference.to_string()))
    }

    /// Reject reference chains that never reach a concrete schema (a ref
    /// whose every hop is another ref, looping).
    fn check_ref_chains(&self) -> Result<(), SchemaError> {
        for (start, node) in self.nodes.iter().enumerate() {
            let SchemaNode::Ref(r) = node else { continue };
            let mut seen = vec![start];
            let mut cursor = r.target;
            while let SchemaNode::Ref(next) = &self.nodes[cursor] {
                if seen.contains(&cursor) {
                    return Err(SchemaError::MalformedKeyword {
                        keyword: "$ref",
                        expected: "a reference chain ending at a concrete schema",
                        found: r.reference.clone(),
                    });
                }
                seen.push(cursor);
                cursor = next.target;
            }
        }
        Ok(())
    }
}

// --------------------------- Keyword readers ------------------------------ //

pub(crate) fn malformed(keyword: &'static str, expected: &'static str, found: &Value) -> SchemaError {
    SchemaError::MalformedKeyword {
        keyword,
        expected,
        found: Kind::of(found).name().to_string(),
    }
}

pub(crate) fn get_i64(doc: &Map<String, Value>, key: &'static str) -> Result<Option<i64>, SchemaError> {
    match doc.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| malformed(key, "an integer", v)),
    }
}

pub(crate) fn get_f64(
    doc: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<ordered_float::OrderedFloat<f64>>, SchemaError> {
    match doc.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(|f| Some(ordered_float::OrderedFloat(f)))
            .ok_or_else(|| malformed(key, "a number", v)),
    }
}

pub(crate) fn get_usize(doc: &Map<String, Value>, key: &'static str) -> Result<Option<usize>, SchemaError> {
    match doc.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|u| Some(u as usize))
            .ok_or_else(|| malformed(key, "a non-negative integer", v)),
    }
}

pub(crate) fn get_bool(doc: &Map<String, Value>, key: &'static str) -> Result<Option<bool>, SchemaError> {
    match doc.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(v) => Err(malformed(key, "a boolean", v)),
    }
}

pub(crate) fn get_str<'a>(
    doc: &'a Map<String, Value>,
    key: &'static str,
) -> Result<Option<&'a str>, SchemaError> {
    match doc.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(v) => Err(malformed(key, "a string", v)),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_must_be_an_object() {
        assert!(matches!(
            compile(&json!("integer")),
            Err(SchemaError::MalformedKeyword { keyword: "schema", .. })
        ));
        assert!(matches!(
            compile(&json!(true)),
            Err(SchemaError::MalformedKeyword { keyword: "schema", .. })
        ));
    }

    #[test]
    fn unknown_type_is_rejected() {
        match compile(&json!({"type": "decimal"})) {
            Err(SchemaError::UnknownType(name)) => assert_eq!(name, "decimal"),
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn wrong_keyword_shapes_are_compile_errors() {
        let bad = [
            json!({"type": "integer", "minimum": "zero"}),
            json!({"type": "integer", "minimum": 1.5}),
            json!({"type": "string", "minLength": -1}),
            json!({"type": "string", "pattern": 12}),
            json!({"type": "array", "items": [1]}),
            json!({"type": "object", "required": "a"}),
            json!({"type": "object", "properties": []}),
            json!({"enum": {}}),
            json!({"enum": []}),
            json!({"allOf": {}}),
            json!({"not": "x"}),
            json!({"type": 3}),
            json!({"title": 1}),
        ];
        for doc in &bad {
            assert!(compile(doc).is_err(), "compiled a malformed document: {doc}");
        }
    }

    #[test]
    fn number_minimum_accepts_integer_literals() {
        // {"type":"number","minimum":0} is well-formed; the bound widens to f64
        let s = compile(&json!({"type": "number", "minimum": 0})).unwrap();
        assert!(s.is_valid(&json!(0.5)));
        assert!(!s.is_valid(&json!(-0.5)));
    }

    #[test]
    fn unresolved_reference_fails_at_compile_time() {
        match compile(&json!({"$ref": "#/definitions/missing"})) {
            Err(SchemaError::UnresolvedReference(r)) => {
                assert_eq!(r, "#/definitions/missing");
            }
            other => panic!("expected UnresolvedReference, got {other:?}"),
        }
        assert!(compile(&json!({"$ref": "http://elsewhere/schema"})).is_err());
    }

    #[test]
    fn refs_resolve_across_definition_spellings() {
        let s = compile(&json!({
            "$ref": "#/$defs/id",
            "$defs": {"id": {"type": "string", "minLength": 1}}
        }))
        .unwrap();
        assert!(s.is_valid(&json!("x")));
        assert!(!s.is_valid(&json!("")));
    }

    #[test]
    fn mutually_recursive_definitions_compile() {
        let s = compile(&json!({
            "$ref": "#/definitions/a",
            "definitions": {
                "a": {
                    "type": "object",
                    "properties": {"b": {"$ref": "#/definitions/b"}}
                },
                "b": {
                    "type": "object",
                    "properties": {"a": {"$ref": "#/definitions/a"}}
                }
            }
        }))
        .unwrap();
        assert!(s.is_valid(&json!({"b": {"a": {"b": {}}}})));
        assert!(!s.is_valid(&json!({"b": 3})));
    }

    #[test]
    fn pure_reference_cycles_are_rejected() {
        let err = compile(&json!({
            "$ref": "#/definitions/a",
            "definitions": {
                "a": {"$ref": "#/definitions/b"},
                "b": {"$ref": "#/definitions/a"}
            }
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::MalformedKeyword { keyword: "$ref", .. }));
    }

    #[test]
    fn family_is_inferred_from_keywords_when_type_is_absent() {
        let cases = [
            (json!({"properties": {"a": {}}}), "object"),
            (json!({"minItems": 1}), "array"),
            (json!({"pattern": "^a"}), "string"),
            (json!({"minimum": 0}), "number"),
        ];
        for (doc, family) in &cases {
            let s = compile(doc).unwrap();
            let ok = match (s.root(), *family) {
                (SchemaNode::Object(_), "object") => true,
                (SchemaNode::Array(_), "array") => true,
                (SchemaNode::String(_), "string") => true,
                (SchemaNode::Number(_), "number") => true,
                _ => false,
            };
            assert!(ok, "inferred the wrong family for {doc}");
        }
    }

    #[test]
    fn inferred_number_accepts_integers_and_reals() {
        let s = compile(&json!({"minimum": 2})).unwrap();
        assert!(s.is_valid(&json!(2)));
        assert!(s.is_valid(&json!(2.5)));
        assert!(!s.is_valid(&json!(1)));
    }

    #[test]
    fn compile_str_reports_the_failing_path() {
        let err = compile_str(r#"{"type": "integer", "minimum": }"#).unwrap_err();
        match err {
            SchemaError::Parse(msg) => assert!(msg.contains("minimum"), "missing path in {msg:?}"),
            other => panic!("expected Parse, got {other:?}"),
        }

        let ok = compile_str(r#"{"type": "integer", "minimum": 3}"#).unwrap();
        assert!(ok.is_valid(&json!(3)));
    }

    #[test]
    fn compilation_is_idempotent() {
        let doc = json!({
            "type": "array",
            "items": {"$ref": "#/definitions/n"},
            "definitions": {"n": {"type": "integer", "multipleOf": 2}}
        });
        let a = compile(&doc).unwrap();
        let b = compile(&doc).unwrap();
        assert_eq!(a, b);
        // independently owned: validating one does not disturb the other
        assert!(a.is_valid(&json!([2, 4])));
        assert!(!b.is_valid(&json!([3])));
    }

    #[test]
    fn exclusive_flag_without_bound_normalizes_away() {
        let bare = compile(&json!({"type": "integer", "exclusiveMinimum": true})).unwrap();
        let unconstrained = compile(&json!({"type": "integer"})).unwrap();
        assert_eq!(bare, unconstrained);
    }
}
