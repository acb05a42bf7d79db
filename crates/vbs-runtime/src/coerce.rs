//! Coercion engine: `VAL`, `NUM`, `STR`, `IF` and `OBJ`
//!
//! Operators never look at objects directly. They first reduce operands with
//! [`Runtime::val`], which calls an object's default member, and then
//! classify the result into a [`Numeric`] when arithmetic is required.

use crate::currency::Currency;
use crate::date::VbDate;
use crate::error::{RuntimeError, RuntimeResult};
use crate::number::{format_float, parse_numeric};
use crate::runtime::Runtime;
use crate::value::Value;

/// Operand reduced to one of the numeric tiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    Boolean(bool),
    Byte(u8),
    Integer(i16),
    Long(i32),
    Single(f32),
    Double(f64),
    Currency(Currency),
    Date(VbDate),
}

impl Numeric {
    /// Plain numeric value; dates give their serial
    pub(crate) fn to_f64(self) -> f64 {
        match self {
            Numeric::Boolean(b) => bool_number(b) as f64,
            Numeric::Byte(b) => f64::from(b),
            Numeric::Integer(i) => f64::from(i),
            Numeric::Long(l) => f64::from(l),
            Numeric::Single(s) => f64::from(s),
            Numeric::Double(d) => d,
            Numeric::Currency(c) => c.to_f64(),
            Numeric::Date(d) => d.serial(),
        }
    }

    /// Value on a chronologically ordered axis; dates give their linear
    /// day count
    pub(crate) fn to_linear(self) -> f64 {
        match self {
            Numeric::Date(d) => d.linear(),
            other => other.to_f64(),
        }
    }

    /// Exact integer for the integral tiers
    pub(crate) fn as_integral(self) -> Option<i64> {
        match self {
            Numeric::Boolean(b) => Some(bool_number(b)),
            Numeric::Byte(b) => Some(i64::from(b)),
            Numeric::Integer(i) => Some(i64::from(i)),
            Numeric::Long(l) => Some(i64::from(l)),
            _ => None,
        }
    }

    pub(crate) fn is_zero(self) -> bool {
        match self {
            Numeric::Currency(c) => c.is_zero(),
            other => other.to_f64() == 0.0,
        }
    }

    /// Position on the promotion ladder used by `NUM`
    fn rank(self) -> u8 {
        match self {
            Numeric::Boolean(_) => 0,
            Numeric::Byte(_) => 1,
            Numeric::Integer(_) => 2,
            Numeric::Long(_) => 3,
            Numeric::Single(_) => 4,
            Numeric::Currency(_) => 5,
            Numeric::Double(_) => 6,
            Numeric::Date(_) => 7,
        }
    }

    /// Narrowest tier holding both operands. A Single cannot carry every
    /// Long, so that pair meets at Double as it does in arithmetic.
    fn common_tier(self, other: Numeric) -> Numeric {
        let (low, high) = if self.rank() <= other.rank() {
            (self, other)
        } else {
            (other, self)
        };
        match (low, high) {
            (Numeric::Long(_), Numeric::Single(_)) => Numeric::Double(0.0),
            _ => high,
        }
    }

    pub(crate) fn into_value(self) -> Value {
        match self {
            Numeric::Boolean(b) => Value::Boolean(b),
            Numeric::Byte(b) => Value::Byte(b),
            Numeric::Integer(i) => Value::Integer(i),
            Numeric::Long(l) => Value::Long(l),
            Numeric::Single(s) => Value::Single(s),
            Numeric::Double(d) => Value::Double(d),
            Numeric::Currency(c) => Value::Currency(c),
            Numeric::Date(d) => Value::Date(d),
        }
    }

    /// Convert to the tier of `template`
    fn widen_to(self, template: Numeric, context: &str) -> RuntimeResult<Numeric> {
        let value = self.to_f64();
        let converted = match template {
            Numeric::Boolean(_) => Numeric::Boolean(value != 0.0),
            Numeric::Byte(_) => Numeric::Byte(round_into(value, context)?),
            Numeric::Integer(_) => Numeric::Integer(round_into(value, context)?),
            Numeric::Long(_) => Numeric::Long(round_into(value, context)?),
            Numeric::Single(_) => Numeric::Single(value as f32),
            Numeric::Double(_) => Numeric::Double(value),
            Numeric::Currency(_) => Numeric::Currency(match self {
                Numeric::Currency(c) => c,
                _ => Currency::from_f64(value).ok_or_else(|| RuntimeError::overflow(context))?,
            }),
            Numeric::Date(_) => Numeric::Date(match self {
                Numeric::Date(d) => d,
                _ => VbDate::from_serial(value)?,
            }),
        };
        Ok(converted)
    }
}

/// True is -1, False is 0
pub(crate) fn bool_number(value: bool) -> i64 {
    if value {
        -1
    } else {
        0
    }
}

/// Round half-to-even and narrow, raising `Overflow` outside the target range
pub(crate) fn round_into<T: TryFrom<i64>>(value: f64, context: &str) -> RuntimeResult<T> {
    let rounded = value.round_ties_even();
    if !rounded.is_finite() || rounded.abs() > 9.0e18 {
        return Err(RuntimeError::overflow(context));
    }
    T::try_from(rounded as i64).map_err(|_| RuntimeError::overflow(context))
}

impl Runtime {
    /// `VAL`: reduce a value to a non-reference value.
    ///
    /// Objects are replaced by the result of their default member, which
    /// must not itself be an object. Arrays pass through unchanged.
    pub fn val(&self, value: &Value) -> RuntimeResult<Value> {
        match value {
            Value::Nothing => Err(RuntimeError::object_variable_not_set("default member")),
            Value::Object(object) => {
                let result = self.invoker().invoke(value, None, &[])?;
                match result {
                    Value::Object(_) | Value::Nothing => {
                        Err(RuntimeError::type_mismatch(object.type_name().to_string()))
                    }
                    other => Ok(other),
                }
            }
            other => Ok(other.clone()),
        }
    }

    /// `NUM`: reduce to a numeric value wide enough for `value` and every
    /// candidate (used for `For` loop bounds).
    pub fn num(&self, value: &Value, candidates: &[Value]) -> RuntimeResult<Value> {
        let operand = self.num_operand(value)?;
        let mut tier = operand;
        for candidate in candidates {
            tier = tier.common_tier(self.num_operand(candidate)?);
        }
        operand.widen_to(tier, "NUM").map(Numeric::into_value)
    }

    fn num_operand(&self, value: &Value) -> RuntimeResult<Numeric> {
        match self.val(value)? {
            Value::Null => Err(RuntimeError::invalid_use_of_null("NUM")),
            reduced => self.to_numeric(&reduced, "NUM"),
        }
    }

    /// `STR`: `VAL` followed by string conversion; Empty and Null give ""
    pub fn str(&self, value: &Value) -> RuntimeResult<String> {
        let reduced = self.val(value)?;
        self.format_value(&reduced, "STR")
    }

    /// `IF`: truth of a condition expression
    pub fn if_condition(&self, value: &Value) -> RuntimeResult<bool> {
        match self.val(value)? {
            Value::Null | Value::Empty => Ok(false),
            Value::Boolean(b) => Ok(b),
            reduced => Ok(!self.to_numeric(&reduced, "If")?.is_zero()),
        }
    }

    /// `OBJ`: right-hand side of `Set`; must be an object or Nothing
    pub fn obj(&self, value: &Value) -> RuntimeResult<Value> {
        match value {
            Value::Object(_) | Value::Nothing => Ok(value.clone()),
            other => Err(RuntimeError::object_required(other.kind_name())),
        }
    }

    /// Classify an already reduced value for arithmetic.
    ///
    /// Empty is Integer 0 and numeric strings become Double. Callers deal
    /// with Null before getting here.
    pub(crate) fn to_numeric(&self, value: &Value, context: &str) -> RuntimeResult<Numeric> {
        let numeric = match value {
            Value::Empty => Numeric::Integer(0),
            Value::Boolean(b) => Numeric::Boolean(*b),
            Value::Byte(b) => Numeric::Byte(*b),
            Value::Integer(i) => Numeric::Integer(*i),
            Value::Long(l) => Numeric::Long(*l),
            Value::Single(s) => Numeric::Single(*s),
            Value::Double(d) => Numeric::Double(*d),
            Value::Currency(c) => Numeric::Currency(*c),
            Value::Date(d) => Numeric::Date(*d),
            Value::String(s) => Numeric::Double(parse_number_text(s, context)?),
            Value::Null => return Err(RuntimeError::invalid_use_of_null(context)),
            Value::Array(_) | Value::Object(_) | Value::Nothing => {
                return Err(RuntimeError::type_mismatch(context))
            }
        };
        Ok(numeric)
    }

    /// Text form of a reduced value, as `CStr` renders it
    pub(crate) fn format_value(&self, value: &Value, context: &str) -> RuntimeResult<String> {
        let text = match value {
            Value::Empty | Value::Null => String::new(),
            Value::Boolean(true) => "True".to_string(),
            Value::Boolean(false) => "False".to_string(),
            Value::Byte(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Long(l) => l.to_string(),
            Value::Single(s) => format_float(f64::from(*s), 7),
            Value::Double(d) => format_float(*d, 15),
            Value::Currency(c) => c.to_string(),
            Value::Date(d) => d.format(self.date_order()),
            Value::String(s) => s.to_string(),
            Value::Array(_) | Value::Object(_) | Value::Nothing => {
                return Err(RuntimeError::type_mismatch(context))
            }
        };
        Ok(text)
    }
}

/// Parse a numeric string, raising `TypeMismatch` when it is not a number
/// and `Overflow` when it is beyond the Double range
pub(crate) fn parse_number_text(text: &str, context: &str) -> RuntimeResult<f64> {
    let parsed = parse_numeric(text).ok_or_else(|| RuntimeError::type_mismatch(context))?;
    if parsed.value.is_infinite() {
        return Err(RuntimeError::overflow(context));
    }
    Ok(parsed.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_into_is_bankers() {
        assert_eq!(round_into::<i16>(2.5, "t").unwrap(), 2);
        assert_eq!(round_into::<i16>(3.5, "t").unwrap(), 4);
        assert_eq!(round_into::<i16>(-2.5, "t").unwrap(), -2);
        assert!(round_into::<i16>(32767.5, "t").is_err());
        assert!(round_into::<u8>(-0.6, "t").is_err());
        assert_eq!(round_into::<u8>(-0.5, "t").unwrap(), 0);
        assert!(round_into::<i32>(f64::INFINITY, "t").is_err());
    }

    #[test]
    fn test_num_widens_to_candidates() {
        let rt = Runtime::new();
        assert_eq!(rt.num(&Value::Byte(3), &[]).unwrap(), Value::Byte(3));
        assert_eq!(
            rt.num(&Value::Integer(3), &[Value::Long(10)]).unwrap(),
            Value::Long(3)
        );
        assert_eq!(
            rt.num(&Value::Integer(1), &[Value::Long(10), Value::Double(0.5)]).unwrap(),
            Value::Double(1.0)
        );
        assert_eq!(rt.num(&Value::Empty, &[]).unwrap(), Value::Integer(0));
        assert_eq!(rt.num(&Value::string("2.5"), &[]).unwrap(), Value::Double(2.5));
    }

    #[test]
    fn test_num_keeps_long_precision_against_single() {
        let rt = Runtime::new();
        assert_eq!(
            rt.num(&Value::Long(16_777_217), &[Value::Single(1.0)]).unwrap(),
            Value::Double(16_777_217.0)
        );
        assert_eq!(
            rt.num(&Value::Single(1.5), &[Value::Long(2)]).unwrap(),
            Value::Double(1.5)
        );
        assert_eq!(
            rt.num(&Value::Integer(3), &[Value::Single(0.5)]).unwrap(),
            Value::Single(3.0)
        );
        assert_eq!(
            rt.num(&Value::Long(5), &[Value::Single(0.5), Value::Integer(1)]).unwrap(),
            Value::Double(5.0)
        );
    }

    #[test]
    fn test_num_rejects() {
        let rt = Runtime::new();
        assert_eq!(rt.num(&Value::Null, &[]).unwrap_err().number(), 94);
        assert_eq!(rt.num(&Value::string("True"), &[]).unwrap_err().number(), 13);
        assert_eq!(rt.num(&Value::string("1/1/2000"), &[]).unwrap_err().number(), 13);
    }

    #[test]
    fn test_if_condition() {
        let rt = Runtime::new();
        assert!(!rt.if_condition(&Value::Empty).unwrap());
        assert!(!rt.if_condition(&Value::Null).unwrap());
        assert!(rt.if_condition(&Value::string("2")).unwrap());
        assert!(!rt.if_condition(&Value::Double(0.0)).unwrap());
        assert_eq!(rt.if_condition(&Value::string("yes")).unwrap_err().number(), 13);
    }

    #[test]
    fn test_obj() {
        let rt = Runtime::new();
        assert_eq!(rt.obj(&Value::Nothing).unwrap(), Value::Nothing);
        assert_eq!(rt.obj(&Value::Integer(1)).unwrap_err().number(), 424);
    }
}
