//! Comparison operators
//!
//! Comparisons are three-valued: `Some(bool)` or `None` for Null. The public
//! operators wrap the result back into a `Value` (Boolean or Null); the
//! strict forms reject Null instead.

use crate::coerce::Numeric;
use crate::error::{RuntimeError, RuntimeResult};
use crate::runtime::Runtime;
use crate::value::Value;
use std::cmp::Ordering;

type Ternary = Option<bool>;

fn ternary_value(result: Ternary) -> Value {
    result.map(Value::Boolean).unwrap_or(Value::Null)
}

impl Runtime {
    /// `=`
    pub fn equals(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        self.compare_eq(left, right).map(ternary_value)
    }

    /// `<>`
    pub fn not_equals(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        self.compare_eq(left, right)
            .map(|result| ternary_value(result.map(|eq| !eq)))
    }

    /// `<`
    pub fn less_than(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        self.compare_lt(left, right, false).map(ternary_value)
    }

    /// `<=`
    pub fn less_than_or_equal(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        self.compare_lt(left, right, true).map(ternary_value)
    }

    /// `>`, the negation of `<=`
    pub fn greater_than(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        self.compare_lt(left, right, true)
            .map(|result| ternary_value(result.map(|lte| !lte)))
    }

    /// `>=`, the negation of `<`
    pub fn greater_than_or_equal(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        self.compare_lt(left, right, false)
            .map(|result| ternary_value(result.map(|lt| !lt)))
    }

    pub fn strict_less_than(&self, left: &Value, right: &Value) -> RuntimeResult<bool> {
        strict(self.compare_lt(left, right, false)?, "<")
    }

    pub fn strict_less_than_or_equal(&self, left: &Value, right: &Value) -> RuntimeResult<bool> {
        strict(self.compare_lt(left, right, true)?, "<=")
    }

    pub fn strict_greater_than(&self, left: &Value, right: &Value) -> RuntimeResult<bool> {
        strict(self.compare_lt(left, right, true)?, ">").map(|lte| !lte)
    }

    pub fn strict_greater_than_or_equal(&self, left: &Value, right: &Value) -> RuntimeResult<bool> {
        strict(self.compare_lt(left, right, false)?, ">=").map(|lt| !lt)
    }

    /// `Is`: object identity. Both operands must be objects or Nothing.
    pub fn is(&self, left: &Value, right: &Value) -> RuntimeResult<bool> {
        match (left, right) {
            (Value::Nothing, Value::Nothing) => Ok(true),
            (Value::Object(a), Value::Object(b)) => Ok(a.ptr_eq(b)),
            (Value::Object(_), Value::Nothing) | (Value::Nothing, Value::Object(_)) => Ok(false),
            _ => Err(RuntimeError::object_required("Is")),
        }
    }

    fn compare_eq(&self, left: &Value, right: &Value) -> RuntimeResult<Ternary> {
        let left = self.val(left)?;
        let right = self.val(right)?;
        self.reduced_eq(&left, &right)
    }

    fn reduced_eq(&self, left: &Value, right: &Value) -> RuntimeResult<Ternary> {
        if matches!(left, Value::Array(_)) || matches!(right, Value::Array(_)) {
            return Err(RuntimeError::type_mismatch("="));
        }
        let equal = match (left, right) {
            (Value::Null, _) | (_, Value::Null) => return Ok(None),
            (Value::Empty, Value::Empty) => true,
            (Value::Empty, other) | (other, Value::Empty) => match other {
                Value::String(s) => s.is_empty(),
                Value::Boolean(b) => !b,
                numeric => self.to_numeric(numeric, "=")?.is_zero(),
            },
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Boolean(_), Value::String(_)) | (Value::String(_), Value::Boolean(_)) => false,
            (Value::Boolean(b), other) | (other, Value::Boolean(b)) => {
                let n = self.to_numeric(other, "=")?.to_f64();
                if *b {
                    n == -1.0
                } else {
                    n == 0.0
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::String(_), _) | (_, Value::String(_)) => false,
            (Value::Currency(a), Value::Currency(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a.linear() == b.linear(),
            (a, b) => match (as_numeric(a), as_numeric(b)) {
                (Some(x), Some(y)) => x.to_f64() == y.to_f64(),
                _ => {
                    return Err(RuntimeError::internal(format!(
                        "don't know how to compare {} with {}",
                        a.kind_name(),
                        b.kind_name()
                    )))
                }
            },
        };
        Ok(Some(equal))
    }

    /// `<` (or `<=` when `or_equal`)
    fn compare_lt(&self, left: &Value, right: &Value, or_equal: bool) -> RuntimeResult<Ternary> {
        let left = self.val(left)?;
        let right = self.val(right)?;
        match self.reduced_eq(&left, &right)? {
            None => return Ok(None),
            Some(true) => return Ok(Some(or_equal)),
            Some(false) => {}
        }

        let less = match (&left, &right) {
            (Value::String(a), Value::String(b)) => ordinal(a, b) == Ordering::Less,
            (Value::String(a), Value::Empty) => ordinal(a, "") == Ordering::Less,
            (Value::Empty, Value::String(b)) => ordinal("", b) == Ordering::Less,
            (Value::String(a), other) if a.is_empty() => 0.0 < self.comparable(other)?,
            (other, Value::String(b)) if b.is_empty() => self.comparable(other)? < 0.0,
            // A non-blank string sorts after every non-string
            (Value::String(_), _) => false,
            (_, Value::String(_)) => true,
            (Value::Currency(a), Value::Currency(b)) => a < b,
            (Value::Date(a), Value::Date(b)) => a.linear() < b.linear(),
            (a, b) => self.comparable(a)? < self.comparable(b)?,
        };
        Ok(Some(less))
    }

    /// Numeric position of a reduced non-string value, as `CDbl` gives it.
    /// Only two dates are ordered by their linear day count.
    fn comparable(&self, value: &Value) -> RuntimeResult<f64> {
        Ok(self.to_numeric(value, "<")?.to_f64())
    }
}

fn as_numeric(value: &Value) -> Option<Numeric> {
    match value {
        Value::Byte(b) => Some(Numeric::Byte(*b)),
        Value::Integer(i) => Some(Numeric::Integer(*i)),
        Value::Long(l) => Some(Numeric::Long(*l)),
        Value::Single(s) => Some(Numeric::Single(*s)),
        Value::Double(d) => Some(Numeric::Double(*d)),
        Value::Currency(c) => Some(Numeric::Currency(*c)),
        Value::Date(d) => Some(Numeric::Date(*d)),
        _ => None,
    }
}

/// Binary comparison of UTF-16 code units
fn ordinal(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

fn strict(result: Ternary, context: &str) -> RuntimeResult<bool> {
    result.ok_or_else(|| RuntimeError::invalid_use_of_null(context))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_uses_code_units() {
        assert_eq!(ordinal("B", "a"), Ordering::Less);
        assert_eq!(ordinal("abc", "abd"), Ordering::Less);
        // Surrogate pairs sort below U+FF21 in UTF-16
        assert_eq!(ordinal("\u{1F600}", "\u{FF21}"), Ordering::Less);
    }

    #[test]
    fn test_strict_rejects_null() {
        assert!(strict(Some(true), "<").unwrap());
        assert_eq!(strict(None, "<").unwrap_err().number(), 94);
    }
}
