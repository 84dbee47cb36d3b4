//! Validation outcomes as plain data.
//!
//! One tagged union covers every way a value can fail a schema, each variant
//! carrying the violated constraint's parameters plus the offending value (or
//! its shape), so a caller can render a diagnostic without re-deriving
//! context. Outcomes are returned, never thrown: batch validation of many
//! values never needs error-based control flow.

use serde::Serialize;
use serde_json::Value;

use crate::num::Num;

/// Runtime shape of a JSON value, used in type-mismatch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    pub fn of(v: &Value) -> Kind {
        match v {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(n) => {
                if n.as_i64().is_some() || n.as_u64().is_some() {
                    Kind::Integer
                } else {
                    Kind::Number
                }
            }
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of checking one value against one schema node.
///
/// Exactly one failure is ever reported per validation call: the first one
/// encountered in the node's fixed check order. Composition nodes aggregate
/// child outcomes per their operator; `Item`/`Property` wrap the first
/// failing child of a container with its position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValidateResult {
    Success,

    /// The input itself was null where the node required a value.
    /// Distinct from a type mismatch.
    InputNull,
    TypeMismatch { expected: Kind, actual: Kind },

    BelowMinimum { minimum: Num, value: Num, exclusive: bool },
    AboveMaximum { maximum: Num, value: Num, exclusive: bool },
    NotMultipleOf { divisor: Num, value: Num },

    /// String length outside [min, max]; length counted in Unicode scalars.
    LengthOutOfRange { min: Option<usize>, max: Option<usize>, actual: usize },
    PatternMismatch { pattern: String, value: String },

    ItemCountOutOfRange { min: Option<usize>, max: Option<usize>, actual: usize },
    /// `uniqueItems`: the two indices holding the same value.
    DuplicateItems { first: usize, second: usize },
    /// First failing array element, annotated with its index.
    Item { index: usize, cause: Box<ValidateResult> },

    MissingProperty { name: String },
    PropertyCountOutOfRange { min: Option<usize>, max: Option<usize>, actual: usize },
    /// First failing property value, annotated with its key.
    Property { name: String, cause: Box<ValidateResult> },
    /// Property not declared and `additionalProperties` is false.
    UndeclaredProperty { name: String },

    NotInEnum { value: Value },
    ConstMismatch { expected: Value, actual: Value },

    /// anyOf: no branch matched; child failures kept for diagnostics.
    AnyOfNoneMatched { failures: Vec<ValidateResult> },
    /// oneOf: zero branches matched.
    OneOfNoneMatched { failures: Vec<ValidateResult> },
    /// oneOf: more than one branch matched; their indices.
    OneOfMultipleMatched { matched: Vec<usize> },
    /// not: the negated schema matched.
    NotMatched,
}

impl ValidateResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidateResult::Success)
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }
}

fn fmt_bound(f: &mut std::fmt::Formatter<'_>, lo: Option<usize>, hi: Option<usize>) -> std::fmt::Result {
    match (lo, hi) {
        (Some(lo), Some(hi)) => write!(f, "[{lo}, {hi}]"),
        (Some(lo), None) => write!(f, "[{lo}, ..]"),
        (None, Some(hi)) => write!(f, "[.., {hi}]"),
        (None, None) => write!(f, "[.., ..]"),
    }
}

impl std::fmt::Display for ValidateResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ValidateResult::*;
        match self {
            Success => write!(f, "ok"),
            InputNull => write!(f, "input is null"),
            TypeMismatch { expected, actual } => {
                write!(f, "expected {expected}, found {actual}")
            }
            BelowMinimum { minimum, value, exclusive } => {
                let op = if *exclusive { ">" } else { ">=" };
                write!(f, "{value} violates minimum: must be {op} {minimum}")
            }
            AboveMaximum { maximum, value, exclusive } => {
                let op = if *exclusive { "<" } else { "<=" };
                write!(f, "{value} violates maximum: must be {op} {maximum}")
            }
            NotMultipleOf { divisor, value } => {
                write!(f, "{value} is not a multiple of {divisor}")
            }
            LengthOutOfRange { min, max, actual } => {
                write!(f, "length {actual} outside ")?;
                fmt_bound(f, *min, *max)
            }
            PatternMismatch { pattern, value } => {
                write!(f, "{value:?} does not match pattern {pattern:?}")
            }
            ItemCountOutOfRange { min, max, actual } => {
                write!(f, "item count {actual} outside ")?;
                fmt_bound(f, *min, *max)
            }
            DuplicateItems { first, second } => {
                write!(f, "items {first} and {second} are equal")
            }
            Item { index, cause } => write!(f, "item {index}: {cause}"),
            MissingProperty { name } => write!(f, "required property {name:?} is missing"),
            PropertyCountOutOfRange { min, max, actual } => {
                write!(f, "property count {actual} outside ")?;
                fmt_bound(f, *min, *max)
            }
            Property { name, cause } => write!(f, "property {name:?}: {cause}"),
            UndeclaredProperty { name } => {
                write!(f, "property {name:?} is not declared and additional properties are not allowed")
            }
            NotInEnum { value } => write!(f, "{value} is not one of the allowed values"),
            ConstMismatch { expected, actual } => {
                write!(f, "expected the constant {expected}, found {actual}")
            }
            AnyOfNoneMatched { failures } => {
                write!(f, "no anyOf branch matched ({} tried)", failures.len())
            }
            OneOfNoneMatched { failures } => {
                write!(f, "no oneOf branch matched ({} tried)", failures.len())
            }
            OneOfMultipleMatched { matched } => {
                write!(f, "{} oneOf branches matched, expected exactly one", matched.len())
            }
            NotMatched => write!(f, "value matches the negated schema"),
        }
    }
}
