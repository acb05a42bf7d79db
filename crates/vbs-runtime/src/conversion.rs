//! Conversion builtins: `CBool`, `CByte`, `CInt`, `CLng`, `CSng`, `CDbl`,
//! `CCur`, `CDate` and `CStr`
//!
//! Shared template: reduce with `VAL`, Empty becomes the target's zero, Null
//! raises `InvalidUseOfNull`, then convert through the numeric tiers. Range
//! failures are `Overflow`; text that is not a number is `TypeMismatch`.

use crate::coerce::{round_into, Numeric};
use crate::currency::Currency;
use crate::date::VbDate;
use crate::error::{RuntimeError, RuntimeResult};
use crate::number::parse_numeric;
use crate::runtime::Runtime;
use crate::value::Value;

impl Runtime {
    /// Reduce a conversion argument; `None` for Empty
    fn conversion_operand(&self, value: &Value, name: &str) -> RuntimeResult<Option<Numeric>> {
        match self.val(value)? {
            Value::Empty => Ok(None),
            Value::Null => Err(RuntimeError::invalid_use_of_null(name)),
            reduced => self.to_numeric(&reduced, name).map(Some),
        }
    }

    pub fn cbool(&self, value: &Value) -> RuntimeResult<Value> {
        let result = match self.val(value)? {
            Value::Empty => false,
            Value::Null => return Err(RuntimeError::invalid_use_of_null("CBool")),
            Value::Boolean(b) => b,
            Value::String(text) => {
                let trimmed = text.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    true
                } else if trimmed.eq_ignore_ascii_case("false") {
                    false
                } else {
                    !self.to_numeric(&Value::String(text), "CBool")?.is_zero()
                }
            }
            other => !self.to_numeric(&other, "CBool")?.is_zero(),
        };
        Ok(Value::Boolean(result))
    }

    pub fn cbyte(&self, value: &Value) -> RuntimeResult<Value> {
        self.convert_integral(value, "CByte").map(Value::Byte)
    }

    pub fn cint(&self, value: &Value) -> RuntimeResult<Value> {
        self.convert_integral(value, "CInt").map(Value::Integer)
    }

    pub fn clng(&self, value: &Value) -> RuntimeResult<Value> {
        self.convert_integral(value, "CLng").map(Value::Long)
    }

    fn convert_integral<T: TryFrom<i64> + Default>(
        &self,
        value: &Value,
        name: &str,
    ) -> RuntimeResult<T> {
        match self.conversion_operand(value, name)? {
            None => Ok(T::default()),
            Some(Numeric::Currency(c)) => {
                T::try_from(c.round_to_integer()).map_err(|_| RuntimeError::overflow(name))
            }
            Some(other) => round_into(other.to_f64(), name),
        }
    }

    pub fn csng(&self, value: &Value) -> RuntimeResult<Value> {
        let Some(operand) = self.conversion_operand(value, "CSng")? else {
            return Ok(Value::Single(0.0));
        };
        let single = operand.to_f64() as f32;
        if single.is_infinite() {
            return Err(RuntimeError::overflow("CSng"));
        }
        Ok(Value::Single(single))
    }

    pub fn cdbl(&self, value: &Value) -> RuntimeResult<Value> {
        let double = self
            .conversion_operand(value, "CDbl")?
            .map(Numeric::to_f64)
            .unwrap_or(0.0);
        Ok(Value::Double(double))
    }

    /// Plain decimal strings convert exactly, so the range check sees every
    /// digit
    pub fn ccur(&self, value: &Value) -> RuntimeResult<Value> {
        let reduced = self.val(value)?;
        if let Value::String(text) = &reduced {
            if let Some((mantissa, scale)) = parse_numeric(text).and_then(|n| n.decimal) {
                return Currency::from_decimal(mantissa, scale)
                    .map(Value::Currency)
                    .ok_or_else(|| RuntimeError::overflow("CCur"));
            }
        }
        let currency = match self.conversion_operand(&reduced, "CCur")? {
            None => Currency::ZERO,
            Some(Numeric::Currency(c)) => c,
            Some(other) => {
                let converted = match other.as_integral() {
                    Some(integral) => Currency::from_i64(integral),
                    None => Currency::from_f64(other.to_f64()),
                };
                converted.ok_or_else(|| RuntimeError::overflow("CCur"))?
            }
        };
        Ok(Value::Currency(currency))
    }

    /// Numbers are read as serials; other text is parsed as a date string
    pub fn cdate(&self, value: &Value) -> RuntimeResult<Value> {
        let date = match self.val(value)? {
            Value::Empty => VbDate::ZERO,
            Value::Null => return Err(RuntimeError::invalid_use_of_null("CDate")),
            Value::Date(d) => d,
            Value::String(text) => match parse_numeric(&text) {
                Some(number) => VbDate::from_serial(number.value)?,
                None => VbDate::parse(&text, self.date_order(), self.reference_year())
                    .ok_or_else(|| RuntimeError::type_mismatch("CDate"))?,
            },
            other => VbDate::from_serial(self.to_numeric(&other, "CDate")?.to_f64())?,
        };
        Ok(Value::Date(date))
    }

    pub fn cstr(&self, value: &Value) -> RuntimeResult<Value> {
        let reduced = self.val(value)?;
        if reduced.is_null() {
            return Err(RuntimeError::invalid_use_of_null("CStr"));
        }
        let text = self.format_value(&reduced, "CStr")?;
        Ok(Value::from(text))
    }
}
