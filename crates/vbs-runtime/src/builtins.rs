//! Introspection and array builtins

use crate::date::VbDate;
use crate::error::{RuntimeError, RuntimeResult};
use crate::number::parse_numeric;
use crate::runtime::Runtime;
use crate::value::Value;

impl Runtime {
    /// `VarType`
    pub fn var_type(&self, value: &Value) -> Value {
        Value::Integer(value.var_type() as i16)
    }

    /// `TypeName`
    pub fn type_name(&self, value: &Value) -> Value {
        Value::from(value.type_name())
    }

    /// `IsEmpty`
    pub fn is_empty(&self, value: &Value) -> bool {
        value.is_empty()
    }

    /// `IsNull`
    pub fn is_null(&self, value: &Value) -> bool {
        value.is_null()
    }

    /// `IsNumeric`: numeric tiers, Empty and numeric text; dates are not
    /// numeric
    pub fn is_numeric(&self, value: &Value) -> bool {
        match self.val(value) {
            Ok(Value::String(text)) => parse_numeric(&text).is_some(),
            Ok(reduced) => matches!(
                reduced,
                Value::Empty
                    | Value::Boolean(_)
                    | Value::Byte(_)
                    | Value::Integer(_)
                    | Value::Long(_)
                    | Value::Single(_)
                    | Value::Double(_)
                    | Value::Currency(_)
            ),
            Err(_) => false,
        }
    }

    /// `IsDate`: Date values and text that parses as a date
    pub fn is_date(&self, value: &Value) -> bool {
        match self.val(value) {
            Ok(Value::Date(_)) => true,
            Ok(Value::String(text)) => {
                VbDate::parse(&text, self.date_order(), self.reference_year()).is_some()
            }
            _ => false,
        }
    }

    /// `IsObject`
    pub fn is_object(&self, value: &Value) -> bool {
        matches!(value, Value::Object(_) | Value::Nothing)
    }

    /// `IsArray`
    pub fn is_array(&self, value: &Value) -> bool {
        matches!(value, Value::Array(_))
    }

    /// `LBound(array[, dimension])`
    pub fn lbound(&self, array: &Value, dimension: Option<&Value>) -> RuntimeResult<Value> {
        let (array, dimension) = self.bound_arguments(array, dimension, "LBound")?;
        Ok(Value::Long(array.lbound(dimension)? as i32))
    }

    /// `UBound(array[, dimension])`
    pub fn ubound(&self, array: &Value, dimension: Option<&Value>) -> RuntimeResult<Value> {
        let (array, dimension) = self.bound_arguments(array, dimension, "UBound")?;
        Ok(Value::Long(array.ubound(dimension)? as i32))
    }

    fn bound_arguments<'a>(
        &self,
        array: &'a Value,
        dimension: Option<&Value>,
        name: &str,
    ) -> RuntimeResult<(&'a crate::value::VbArray, usize)> {
        let Value::Array(array) = array else {
            return Err(RuntimeError::type_mismatch(name));
        };
        let dimension = match dimension {
            None => 1,
            Some(value) => match self.clng(value)? {
                Value::Long(d) => {
                    usize::try_from(d).map_err(|_| RuntimeError::subscript_out_of_range(name))?
                }
                _ => return Err(RuntimeError::internal("CLng returned a non-Long")),
            },
        };
        Ok((array, dimension))
    }

    /// `Len`: UTF-16 length of the string form; Null gives Null
    pub fn len(&self, value: &Value) -> RuntimeResult<Value> {
        let reduced = self.val(value)?;
        if reduced.is_null() {
            return Ok(Value::Null);
        }
        let text = self.format_value(&reduced, "Len")?;
        Ok(Value::Long(text.encode_utf16().count() as i32))
    }

    /// `String(count, character)`: `character` is a string (its first
    /// character is used) or a character code
    pub fn string(&self, count: &Value, character: &Value) -> RuntimeResult<Value> {
        let count = self.val(count)?;
        let character = self.val(character)?;
        if count.is_null() || character.is_null() {
            return Ok(Value::Null);
        }

        let count = match self.clng(&count)? {
            Value::Long(n) => usize::try_from(n).map_err(|_| RuntimeError::invalid_argument("String"))?,
            _ => return Err(RuntimeError::internal("CLng returned a non-Long")),
        };
        let fill = match &character {
            Value::String(text) => text
                .chars()
                .next()
                .ok_or_else(|| RuntimeError::invalid_argument("String"))?,
            other => match self.clng(other)? {
                Value::Long(code) => char::from(code.rem_euclid(256) as u8),
                _ => return Err(RuntimeError::internal("CLng returned a non-Long")),
            },
        };

        if count.saturating_mul(fill.len_utf16()) > self.options().max_string_length {
            return Err(RuntimeError::out_of_string_space("String"));
        }
        Ok(Value::from(std::iter::repeat(fill).take(count).collect::<String>()))
    }
}
