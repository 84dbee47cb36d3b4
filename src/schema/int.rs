//! Integer constraints: bounds and divisibility over the 64-bit signed range.

use serde_json::{Map, Value};

use crate::compile::{self, SchemaError};
use crate::num::{self, Num};
use crate::result::{Kind, ValidateResult};
use super::Meta;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IntegerNode {
    pub meta: Meta,
    pub minimum: Option<i64>,
    pub exclusive_minimum: bool,
    pub maximum: Option<i64>,
    pub exclusive_maximum: bool,
    /// `None` = no divisibility check. A document `multipleOf` of 0 compiles
    /// to `None` rather than "everything fails division by zero".
    pub multiple_of: Option<i64>,
}

impl IntegerNode {
    pub fn validate(&self, v: &Value) -> ValidateResult {
        if v.is_null() {
            return ValidateResult::InputNull;
        }
        match num::classify(v) {
            Some(Num::Int(i)) => self.check(i),
            // Reals are never integer-like, even when whole (5.0 fails here).
            _ => ValidateResult::TypeMismatch {
                expected: Kind::Integer,
                actual: Kind::of(v),
            },
        }
    }

    /// Check order: minimum, maximum, multipleOf. First failure wins.
    pub fn check(&self, value: i64) -> ValidateResult {
        if let Some(minimum) = self.minimum {
            let below = if self.exclusive_minimum { value <= minimum } else { value < minimum };
            if below {
                return ValidateResult::BelowMinimum {
                    minimum: Num::Int(minimum),
                    value: Num::Int(value),
                    exclusive: self.exclusive_minimum,
                };
            }
        }

        if let Some(maximum) = self.maximum {
            let above = if self.exclusive_maximum { value >= maximum } else { value > maximum };
            if above {
                return ValidateResult::AboveMaximum {
                    maximum: Num::Int(maximum),
                    value: Num::Int(value),
                    exclusive: self.exclusive_maximum,
                };
            }
        }

        if let Some(divisor) = self.multiple_of {
            // i64::MIN % -1 overflows; wrapping_rem yields the two's-complement
            // remainder (0) instead of panicking.
            if value.wrapping_rem(divisor) != 0 {
                return ValidateResult::NotMultipleOf {
                    divisor: Num::Int(divisor),
                    value: Num::Int(value),
                };
            }
        }

        ValidateResult::Success
    }
}

/// `exclusiveMinimum`/`exclusiveMaximum` accept both spellings: boolean
/// (modifies `minimum`/`maximum`) or numeric (is itself the exclusive bound).
pub(crate) fn compile(doc: &Map<String, Value>, meta: Meta) -> Result<IntegerNode, SchemaError> {
    let mut minimum = compile::get_i64(doc, "minimum")?;
    let mut exclusive_minimum = false;
    match doc.get("exclusiveMinimum") {
        None => {}
        Some(Value::Bool(b)) => exclusive_minimum = *b,
        Some(Value::Number(_)) => {
            exclusive_minimum = true;
            minimum = compile::get_i64(doc, "exclusiveMinimum")?;
        }
        Some(other) => {
            return Err(compile::malformed("exclusiveMinimum", "a boolean or an integer", other));
        }
    }

    let mut maximum = compile::get_i64(doc, "maximum")?;
    let mut exclusive_maximum = false;
    match doc.get("exclusiveMaximum") {
        None => {}
        Some(Value::Bool(b)) => exclusive_maximum = *b,
        Some(Value::Number(_)) => {
            exclusive_maximum = true;
            maximum = compile::get_i64(doc, "exclusiveMaximum")?;
        }
        Some(other) => {
            return Err(compile::malformed("exclusiveMaximum", "a boolean or an integer", other));
        }
    }

    let multiple_of = match compile::get_i64(doc, "multipleOf")? {
        Some(0) => None, // 0 means "no constraint"
        other => other,
    };

    Ok(IntegerNode {
        meta,
        minimum,
        // the flag is meaningless without a bound; normalize it away so
        // structural equality sees through the spelling
        exclusive_minimum: exclusive_minimum && minimum.is_some(),
        maximum,
        exclusive_maximum: exclusive_maximum && maximum.is_some(),
        multiple_of,
    })
}
