//! Real-number constraints. Accepts both integer-like and real inputs;
//! comparisons run in f64.

use ordered_float::OrderedFloat;
use serde_json::{Map, Value};

use crate::compile::{self, SchemaError};
use crate::num::{self, Num};
use crate::result::{Kind, ValidateResult};
use super::Meta;

// OrderedFloat keeps the node Eq + Hash for schema caching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NumberNode {
    pub meta: Meta,
    pub minimum: Option<OrderedFloat<f64>>,
    pub exclusive_minimum: bool,
    pub maximum: Option<OrderedFloat<f64>>,
    pub exclusive_maximum: bool,
    pub multiple_of: Option<OrderedFloat<f64>>,
}

impl NumberNode {
    pub fn validate(&self, v: &Value) -> ValidateResult {
        if v.is_null() {
            return ValidateResult::InputNull;
        }
        match num::classify(v) {
            Some(n) => self.check(n),
            None => ValidateResult::TypeMismatch {
                expected: Kind::Number,
                actual: Kind::of(v),
            },
        }
    }

    /// Check order: minimum, maximum, multipleOf. Failure payloads keep the
    /// input's own representation (`Int` stays `Int`).
    pub fn check(&self, value: Num) -> ValidateResult {
        let x = value.as_f64();

        if let Some(minimum) = self.minimum {
            let below = if self.exclusive_minimum { x <= minimum.0 } else { x < minimum.0 };
            if below {
                return ValidateResult::BelowMinimum {
                    minimum: Num::Real(minimum.0),
                    value,
                    exclusive: self.exclusive_minimum,
                };
            }
        }

        if let Some(maximum) = self.maximum {
            let above = if self.exclusive_maximum { x >= maximum.0 } else { x > maximum.0 };
            if above {
                return ValidateResult::AboveMaximum {
                    maximum: Num::Real(maximum.0),
                    value,
                    exclusive: self.exclusive_maximum,
                };
            }
        }

        if let Some(divisor) = self.multiple_of {
            // native f64 remainder; no sign normalization
            if x % divisor.0 != 0.0 {
                return ValidateResult::NotMultipleOf {
                    divisor: Num::Real(divisor.0),
                    value,
                };
            }
        }

        ValidateResult::Success
    }
}

pub(crate) fn compile(doc: &Map<String, Value>, meta: Meta) -> Result<NumberNode, SchemaError> {
    let mut minimum = compile::get_f64(doc, "minimum")?;
    let mut exclusive_minimum = false;
    match doc.get("exclusiveMinimum") {
        None => {}
        Some(Value::Bool(b)) => exclusive_minimum = *b,
        Some(Value::Number(_)) => {
            exclusive_minimum = true;
            minimum = compile::get_f64(doc, "exclusiveMinimum")?;
        }
        Some(other) => {
            return Err(compile::malformed("exclusiveMinimum", "a boolean or a number", other));
        }
    }

    let mut maximum = compile::get_f64(doc, "maximum")?;
    let mut exclusive_maximum = false;
    match doc.get("exclusiveMaximum") {
        None => {}
        Some(Value::Bool(b)) => exclusive_maximum = *b,
        Some(Value::Number(_)) => {
            exclusive_maximum = true;
            maximum = compile::get_f64(doc, "exclusiveMaximum")?;
        }
        Some(other) => {
            return Err(compile::malformed("exclusiveMaximum", "a boolean or a number", other));
        }
    }

    let multiple_of = compile::get_f64(doc, "multipleOf")?.filter(|m| m.0 != 0.0);

    Ok(NumberNode {
        meta,
        minimum,
        // flag without a bound normalizes away, as in the integer family
        exclusive_minimum: exclusive_minimum && minimum.is_some(),
        maximum,
        exclusive_maximum: exclusive_maximum && maximum.is_some(),
        multiple_of,
    })
}
