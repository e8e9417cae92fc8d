//! Validation - coerce or reject a raw value against a [`PropertyType`].
//!
//! Pure functions, no state. Defaults are never synthesised here; the
//! property model applies them once at registration.

use crate::error::TypeMismatch;
use crate::types::{PropertyType, Value};

/// Validate `raw` against `ty`, returning the coerced value.
///
/// - `String`: anything with a string conversion, converted.
/// - `Number`: anything whose numeric coercion is not NaN, coerced.
/// - `Boolean`: always succeeds with the value's truthiness.
/// - `List`, `Record`, `Function`: accepted as-is when already of that shape.
/// - `Unconstrained`: passes through.
pub fn validate(ty: PropertyType, raw: Value) -> Result<Value, TypeMismatch> {
    match ty {
        PropertyType::String => match raw.to_display_string() {
            Some(s) => Ok(Value::String(s)),
            None => Err(mismatch(ty, &raw)),
        },
        PropertyType::Number => {
            let n = raw.to_number();
            if n.is_nan() {
                Err(mismatch(ty, &raw))
            } else {
                Ok(Value::Number(n))
            }
        }
        PropertyType::Boolean => Ok(Value::Bool(raw.is_truthy())),
        PropertyType::List => match raw {
            Value::List(_) => Ok(raw),
            _ => Err(mismatch(ty, &raw)),
        },
        PropertyType::Record => match raw {
            Value::Record(_) => Ok(raw),
            _ => Err(mismatch(ty, &raw)),
        },
        PropertyType::Function => match raw {
            Value::Function(_) => Ok(raw),
            _ => Err(mismatch(ty, &raw)),
        },
        PropertyType::Unconstrained => Ok(raw),
    }
}

fn mismatch(expected: PropertyType, raw: &Value) -> TypeMismatch {
    TypeMismatch {
        expected,
        found: raw.describe(),
    }
}
