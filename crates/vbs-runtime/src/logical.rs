//! Logical operators
//!
//! `Not`, `And`, `Or`, `Xor`, `Eqv` and `Imp` are bitwise. Boolean pairs
//! stay Boolean, Byte pairs stay Byte, Integer-or-narrower gives Integer and
//! everything else is rounded to Long.

use crate::coerce::round_into;
use crate::error::{RuntimeError, RuntimeResult};
use crate::runtime::Runtime;
use crate::value::Value;

/// Operand of a bitwise operator
#[derive(Debug, Clone, Copy, PartialEq)]
enum Bits {
    Boolean(bool),
    Byte(u8),
    Integer(i16),
    Long(i32),
}

impl Bits {
    fn to_i32(self) -> i32 {
        match self {
            Bits::Boolean(b) => -i32::from(b),
            Bits::Byte(b) => i32::from(b),
            Bits::Integer(i) => i32::from(i),
            Bits::Long(l) => l,
        }
    }

    fn is_zero(self) -> bool {
        self.to_i32() == 0
    }

    fn all_set(self) -> bool {
        match self {
            Bits::Byte(b) => b == u8::MAX,
            other => other.to_i32() == -1,
        }
    }

    /// Value with every bit set, in the same tier as `self`
    fn all_set_like(self) -> Value {
        match self {
            Bits::Boolean(_) => Value::Boolean(true),
            Bits::Byte(_) => Value::Byte(u8::MAX),
            Bits::Integer(_) => Value::Integer(-1),
            Bits::Long(_) => Value::Long(-1),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Bits::Boolean(b) => Value::Boolean(b),
            Bits::Byte(b) => Value::Byte(b),
            Bits::Integer(i) => Value::Integer(i),
            Bits::Long(l) => Value::Long(l),
        }
    }
}

/// Apply a bitwise operation and narrow the result to the common tier
fn combine(a: Bits, b: Bits, op: fn(i32, i32) -> i32) -> Value {
    let result = op(a.to_i32(), b.to_i32());
    match (a, b) {
        (Bits::Boolean(_), Bits::Boolean(_)) => Value::Boolean(result != 0),
        (Bits::Byte(_), Bits::Byte(_)) => Value::Byte(result as u8),
        (Bits::Long(_), _) | (_, Bits::Long(_)) => Value::Long(result),
        _ => Value::Integer(result as i16),
    }
}

impl Runtime {
    /// Reduce an operand; `None` for Null
    fn bits(&self, value: &Value, context: &str) -> RuntimeResult<Option<Bits>> {
        let bits = match self.val(value)? {
            Value::Null => return Ok(None),
            Value::Empty => Bits::Integer(0),
            Value::Boolean(b) => Bits::Boolean(b),
            Value::Byte(b) => Bits::Byte(b),
            Value::Integer(i) => Bits::Integer(i),
            Value::Long(l) => Bits::Long(l),
            Value::Currency(c) => Bits::Long(
                i32::try_from(c.round_to_integer()).map_err(|_| RuntimeError::overflow(context))?,
            ),
            other => Bits::Long(round_into(self.to_numeric(&other, context)?.to_f64(), context)?),
        };
        Ok(Some(bits))
    }

    fn bits_pair(
        &self,
        left: &Value,
        right: &Value,
        context: &str,
    ) -> RuntimeResult<(Option<Bits>, Option<Bits>)> {
        Ok((self.bits(left, context)?, self.bits(right, context)?))
    }

    /// `Not`
    pub fn not(&self, value: &Value) -> RuntimeResult<Value> {
        let result = match self.bits(value, "Not")? {
            None => Value::Null,
            Some(Bits::Boolean(b)) => Value::Boolean(!b),
            Some(Bits::Byte(b)) => Value::Byte(!b),
            Some(Bits::Integer(i)) => Value::Integer(!i),
            Some(Bits::Long(l)) => Value::Long(!l),
        };
        Ok(result)
    }

    /// `And`: `Null And False` is False
    pub fn and(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        Ok(match self.bits_pair(left, right, "And")? {
            (Some(a), Some(b)) => combine(a, b, |x, y| x & y),
            (None, Some(x)) | (Some(x), None) if x.is_zero() => x.into_value(),
            _ => Value::Null,
        })
    }

    /// `Or`: `Null Or True` is True
    pub fn or(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        Ok(match self.bits_pair(left, right, "Or")? {
            (Some(a), Some(b)) => combine(a, b, |x, y| x | y),
            (None, Some(x)) | (Some(x), None) if x.all_set() => x.into_value(),
            _ => Value::Null,
        })
    }

    /// `Xor`
    pub fn xor(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        Ok(match self.bits_pair(left, right, "Xor")? {
            (Some(a), Some(b)) => combine(a, b, |x, y| x ^ y),
            _ => Value::Null,
        })
    }

    /// `Eqv`
    pub fn eqv(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        Ok(match self.bits_pair(left, right, "Eqv")? {
            (Some(a), Some(b)) => combine(a, b, |x, y| !(x ^ y)),
            _ => Value::Null,
        })
    }

    /// `Imp`: `Null Imp True` is True, `False Imp Null` is True
    pub fn imp(&self, left: &Value, right: &Value) -> RuntimeResult<Value> {
        Ok(match self.bits_pair(left, right, "Imp")? {
            (Some(a), Some(b)) => combine(a, b, |x, y| !x | y),
            (None, Some(b)) if b.all_set() => b.into_value(),
            (Some(a), None) if a.is_zero() => a.all_set_like(),
            _ => Value::Null,
        })
    }
}
