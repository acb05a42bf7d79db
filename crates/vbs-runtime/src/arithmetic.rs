//! Arithmetic operators
//!
//! Every binary operator reduces its operands with `VAL`, lets Null win,
//! treats Empty as zero and then climbs the promotion ladder:
//! Boolean/Byte → Integer → Long → Single → Double. Integral overflow moves
//! the result one tier up instead of wrapping. Currency raises on overflow,
//! Date falls back to Double.

use crate::coerce::{bool_number, round_into, Numeric};
use crate::currency::Currency;
use crate::date::VbDate;
use crate::error::{RuntimeError, RuntimeResult};
use crate::runtime::Runtime;
use crate::value::Value;

impl Runtime {
    /// `+`
    pub fn add(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        let left = self.val(left)?;
        let right = self.val(right)?;
        match (&left, &right) {
            (Value::Null, _) | (_, Value::Null) => return Ok(Value::Null),
            (Value::Empty, Value::Empty) => return Ok(Value::Integer(0)),
            (Value::Empty, other) | (other, Value::Empty) => {
                if matches!(other, Value::Array(_)) {
                    return Err(RuntimeError::type_mismatch("+"));
                }
                return Ok(other.clone());
            }
            (Value::String(a), Value::String(b)) => return self.join_strings(a, b, "+"),
            _ => {}
        }

        let a = self.to_numeric(&left, "+")?;
        let b = self.to_numeric(&right, "+")?;
        match (a, b) {
            (Numeric::Currency(c), Numeric::Date(d)) | (Numeric::Date(d), Numeric::Currency(c)) => {
                Ok(date_or_double(d.linear() + c.to_f64()))
            }
            (Numeric::Currency(_), _) | (_, Numeric::Currency(_)) => {
                currency_op(a, b, Currency::checked_add, "+")
            }
            (Numeric::Date(_), _) | (_, Numeric::Date(_)) => {
                Ok(date_or_double(a.to_linear() + b.to_linear()))
            }
            _ => ladder(a, b, |x, y| x + y, |x, y| x + y, "+"),
        }
    }

    /// `-`
    pub fn subtract(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        let left = self.val(left)?;
        let right = self.val(right)?;
        match (&left, &right) {
            (Value::Null, _) | (_, Value::Null) => return Ok(Value::Null),
            (Value::Empty, Value::Empty) => return Ok(Value::Integer(0)),
            (Value::Empty, other) => return self.negate(other),
            (other, Value::Empty) => {
                return self.to_numeric(other, "-").map(Numeric::into_value);
            }
            _ => {}
        }

        let a = self.to_numeric(&left, "-")?;
        let b = self.to_numeric(&right, "-")?;
        match (a, b) {
            (Numeric::Date(x), Numeric::Date(y)) => Ok(Value::Double(x.linear() - y.linear())),
            (Numeric::Currency(_), Numeric::Date(_)) | (Numeric::Date(_), Numeric::Currency(_)) => {
                Ok(date_or_double(a.to_linear() - b.to_linear()))
            }
            (Numeric::Currency(_), _) | (_, Numeric::Currency(_)) => {
                currency_op(a, b, Currency::checked_sub, "-")
            }
            (Numeric::Date(_), _) | (_, Numeric::Date(_)) => {
                Ok(date_or_double(a.to_linear() - b.to_linear()))
            }
            _ => ladder(a, b, |x, y| x - y, |x, y| x - y, "-"),
        }
    }

    /// `*`
    pub fn multiply(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        let Some((a, b)) = self.numeric_pair(left, right, "*")? else {
            return Ok(Value::Null);
        };
        let (a, b) = (date_as_double(a), date_as_double(b));
        match (a, b) {
            (Numeric::Currency(_), Numeric::Double(_)) | (Numeric::Double(_), Numeric::Currency(_)) => {
                finite_double(a.to_f64() * b.to_f64(), "*")
            }
            (Numeric::Currency(_), _) | (_, Numeric::Currency(_)) => {
                currency_op(a, b, Currency::checked_mul, "*")
            }
            _ => ladder(a, b, |x, y| x * y, |x, y| x * y, "*"),
        }
    }

    /// `/`: zero over zero is Overflow, anything else over zero is
    /// DivisionByZero
    pub fn divide(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        let Some((a, b)) = self.numeric_pair(left, right, "/")? else {
            return Ok(Value::Null);
        };
        if b.is_zero() {
            return Err(if a.is_zero() {
                RuntimeError::overflow("/")
            } else {
                RuntimeError::division_by_zero("/")
            });
        }

        let currency_pair = matches!(a, Numeric::Currency(_)) && is_currency_compatible(b)
            || matches!(b, Numeric::Currency(_)) && is_currency_compatible(a);
        if currency_pair {
            return currency_op(a, b, Currency::checked_div, "/");
        }

        let quotient = a.to_f64() / b.to_f64();
        if is_single_tier(a, b) {
            let single = quotient as f32;
            if single.is_finite() {
                return Ok(Value::Single(single));
            }
        }
        finite_double(quotient, "/")
    }

    /// `\`: integer division of the rounded operands
    pub fn int_divide(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        self.integral_division(left, right, "\\", |x, y| x / y)
    }

    /// `Mod`: remainder of the rounded operands, signed like the dividend
    pub fn modulo(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        self.integral_division(left, right, "Mod", |x, y| x % y)
    }

    /// `^`: always Double
    pub fn power(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        let Some((a, b)) = self.numeric_pair(left, right, "^")? else {
            return Ok(Value::Null);
        };
        let (base, exponent) = (a.to_f64(), b.to_f64());
        if base == 0.0 && exponent < 0.0 || base < 0.0 && exponent.fract() != 0.0 {
            return Err(RuntimeError::invalid_argument("^"));
        }
        let result = base.powf(exponent);
        if result.is_nan() {
            return Err(RuntimeError::invalid_argument("^"));
        }
        finite_double(result, "^")
    }

    /// Unary `-`
    pub fn negate(&self, value: &Value) -> RuntimeResult<Value> {
        let negated = match self.val(value)? {
            Value::Null => Value::Null,
            Value::Empty => Value::Integer(0),
            Value::Boolean(b) => Value::Integer(-(bool_number(b) as i16)),
            Value::Byte(b) => Value::Integer(-i16::from(b)),
            Value::Integer(i) => i
                .checked_neg()
                .map(Value::Integer)
                .unwrap_or(Value::Long(-i32::from(i))),
            Value::Long(l) => l
                .checked_neg()
                .map(Value::Long)
                .unwrap_or(Value::Double(-f64::from(l))),
            Value::Single(s) => Value::Single(-s),
            Value::Double(d) => Value::Double(-d),
            Value::Currency(c) => Value::Currency(
                c.checked_neg()
                    .ok_or_else(|| RuntimeError::overflow("-"))?,
            ),
            Value::Date(d) => date_or_double(-d.linear()),
            other => Value::Double(-self.to_numeric(&other, "-")?.to_f64()),
        };
        Ok(negated)
    }

    /// `&`: both Null gives Null, otherwise Null and Empty count as ""
    pub fn concat(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        let left = self.val(left)?;
        let right = self.val(right)?;
        if left.is_null() && right.is_null() {
            return Ok(Value::Null);
        }
        let mut text = self.format_value(&left, "&")?;
        text.push_str(&self.format_value(&right, "&")?);
        self.check_string_length(&text, "&")?;
        Ok(Value::from(text))
    }

    /// Left-to-right `&` over any number of operands
    pub fn concat_all(&self, values: &[Value]) -> RuntimeResult<Value> {
        let Some((first, rest)) = values.split_first() else {
            return Ok(Value::string(""));
        };
        let mut acc = self.val(first)?;
        for value in rest {
            acc = self.concat(&acc, value)?;
        }
        match acc {
            Value::Null | Value::String(_) => Ok(acc),
            other => Ok(Value::from(self.format_value(&other, "&")?)),
        }
    }

    fn join_strings(&self, a: &str, b: &str, context: &str) -> RuntimeResult<Value> {
        let text = format!("{}{}", a, b);
        self.check_string_length(&text, context)?;
        Ok(Value::from(text))
    }

    /// Reduce both operands for a numeric operator; `None` when either is
    /// Null
    fn numeric_pair(
        &self,
        left: &Value,
        right: &Value,
        context: &str,
    ) -> RuntimeResult<Option<(Numeric, Numeric)>> {
        let left = self.val(left)?;
        let right = self.val(right)?;
        if left.is_null() || right.is_null() {
            return Ok(None);
        }
        Ok(Some((
            self.to_numeric(&left, context)?,
            self.to_numeric(&right, context)?,
        )))
    }

    fn integral_division(
        &self,
        left: &Value,
        right: &Value,
        context: &str,
        op: fn(i64, i64) -> i64,
    ) -> RuntimeResult<Value> {
        let Some((a, b)) = self.numeric_pair(left, right, context)? else {
            return Ok(Value::Null);
        };
        let x = round_to_long(a, context)?;
        let y = round_to_long(b, context)?;
        if y == 0 {
            return Err(RuntimeError::division_by_zero(context));
        }
        let result = op(x, y);

        match (a, b) {
            (Numeric::Byte(_), Numeric::Byte(_)) => Ok(Value::Byte(result as u8)),
            _ if is_integer_tier(a) && is_integer_tier(b) => Ok(i16::try_from(result)
                .map(Value::Integer)
                .unwrap_or(Value::Long(result as i32))),
            _ => i32::try_from(result)
                .map(Value::Long)
                .map_err(|_| RuntimeError::overflow(context)),
        }
    }
}

/// Shared integral/floating ladder for `+`, `-` and `*`
fn ladder(
    a: Numeric,
    b: Numeric,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
    context: &str,
) -> RuntimeResult<Value> {
    if let (Some(x), Some(y)) = (a.as_integral(), b.as_integral()) {
        let result = int_op(x, y);
        let value = match (a, b) {
            (Numeric::Boolean(_), Numeric::Boolean(_)) if result == 0 || result == -1 => {
                Value::Boolean(result != 0)
            }
            (Numeric::Byte(_), Numeric::Byte(_)) if (0..=255).contains(&result) => {
                Value::Byte(result as u8)
            }
            _ => integral_result(result, is_integer_tier(a) && is_integer_tier(b)),
        };
        return Ok(value);
    }

    let result = float_op(a.to_f64(), b.to_f64());
    if is_single_tier(a, b) {
        let single = result as f32;
        if single.is_finite() {
            return Ok(Value::Single(single));
        }
    }
    finite_double(result, context)
}

/// Smallest of Integer (when allowed), Long and Double that holds `value`
fn integral_result(value: i64, integer_allowed: bool) -> Value {
    if integer_allowed {
        if let Ok(integer) = i16::try_from(value) {
            return Value::Integer(integer);
        }
    }
    i32::try_from(value)
        .map(Value::Long)
        .unwrap_or(Value::Double(value as f64))
}

/// Boolean, Byte or Integer
fn is_integer_tier(n: Numeric) -> bool {
    matches!(n, Numeric::Boolean(_) | Numeric::Byte(_) | Numeric::Integer(_))
}

/// Single arithmetic applies when a Single meets nothing wider than Integer
fn is_single_tier(a: Numeric, b: Numeric) -> bool {
    let fits = |n: Numeric| is_integer_tier(n) || matches!(n, Numeric::Single(_));
    fits(a) && fits(b) && (matches!(a, Numeric::Single(_)) || matches!(b, Numeric::Single(_)))
}

fn is_currency_compatible(n: Numeric) -> bool {
    matches!(n, Numeric::Currency(_)) || n.as_integral().is_some()
}

fn date_as_double(n: Numeric) -> Numeric {
    match n {
        Numeric::Date(d) => Numeric::Double(d.serial()),
        other => other,
    }
}

fn date_or_double(linear: f64) -> Value {
    VbDate::from_linear(linear)
        .map(Value::Date)
        .unwrap_or(Value::Double(linear))
}

fn finite_double(value: f64, context: &str) -> RuntimeResult<Value> {
    if value.is_finite() {
        Ok(Value::Double(value))
    } else {
        Err(RuntimeError::overflow(context))
    }
}

fn to_currency(n: Numeric, context: &str) -> RuntimeResult<Currency> {
    let converted = match n {
        Numeric::Currency(c) => Some(c),
        other => match other.as_integral() {
            Some(integral) => Currency::from_i64(integral),
            None => Currency::from_f64(other.to_f64()),
        },
    };
    converted.ok_or_else(|| RuntimeError::overflow(context))
}

fn currency_op(
    a: Numeric,
    b: Numeric,
    op: fn(Currency, Currency) -> Option<Currency>,
    context: &str,
) -> RuntimeResult<Value> {
    let x = to_currency(a, context)?;
    let y = to_currency(b, context)?;
    op(x, y)
        .map(Value::Currency)
        .ok_or_else(|| RuntimeError::overflow(context))
}

/// Operand of `\` and `Mod`: rounded half-to-even into the Long range
fn round_to_long(n: Numeric, context: &str) -> RuntimeResult<i64> {
    match n {
        Numeric::Currency(c) => i32::try_from(c.round_to_integer())
            .map(i64::from)
            .map_err(|_| RuntimeError::overflow(context)),
        other => match other.as_integral() {
            Some(integral) => Ok(integral),
            None => round_into::<i32>(other.to_f64(), context).map(i64::from),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_result_tiers() {
        assert_eq!(integral_result(5, true), Value::Integer(5));
        assert_eq!(integral_result(40_000, true), Value::Long(40_000));
        assert_eq!(integral_result(5, false), Value::Long(5));
        assert_eq!(integral_result(3_000_000_000, false), Value::Double(3e9));
    }

    #[test]
    fn test_single_tier() {
        assert!(is_single_tier(Numeric::Single(1.0), Numeric::Integer(1)));
        assert!(!is_single_tier(Numeric::Single(1.0), Numeric::Long(1)));
        assert!(!is_single_tier(Numeric::Integer(1), Numeric::Integer(1)));
    }

    #[test]
    fn test_round_to_long() {
        assert_eq!(round_to_long(Numeric::Double(2.5), "t").unwrap(), 2);
        assert_eq!(
            round_to_long(Numeric::Currency(Currency::from_scaled(35_000)), "t").unwrap(),
            4
        );
        assert!(round_to_long(Numeric::Double(3e9), "t").is_err());
    }
}
