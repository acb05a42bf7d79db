//! Runtime value representation
//!
//! - Empty, Null, Nothing, Boolean and the numeric tiers: immediate values
//! - Strings: immutable, reference-counted (`Arc<str>`)
//! - Arrays: copy-on-write (`VbArray` wrapping `Arc<Vec<Value>>`), value semantics
//! - Objects: shared handles to a host-provided `ScriptObject`

use crate::currency::Currency;
use crate::date::VbDate;
use crate::error::{RuntimeError, RuntimeResult};
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// VBScript variant
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// Uninitialised variable
    #[default]
    Empty,
    /// Explicit "no valid data"
    Null,
    Boolean(bool),
    Byte(u8),
    /// 16-bit signed integer
    Integer(i16),
    /// 32-bit signed integer
    Long(i32),
    Single(f32),
    Double(f64),
    Currency(Currency),
    Date(VbDate),
    String(Arc<str>),
    Array(VbArray),
    Object(ObjectRef),
    /// Null object reference
    Nothing,
}

/// VarType constants
pub mod vartype {
    pub const EMPTY: i32 = 0;
    pub const NULL: i32 = 1;
    pub const INTEGER: i32 = 2;
    pub const LONG: i32 = 3;
    pub const SINGLE: i32 = 4;
    pub const DOUBLE: i32 = 5;
    pub const CURRENCY: i32 = 6;
    pub const DATE: i32 = 7;
    pub const STRING: i32 = 8;
    pub const OBJECT: i32 = 9;
    pub const BOOLEAN: i32 = 11;
    pub const VARIANT: i32 = 12;
    pub const BYTE: i32 = 17;
    pub const ARRAY: i32 = 8192;
}

impl Value {
    pub fn string(text: impl Into<Arc<str>>) -> Value {
        Value::String(text.into())
    }

    pub fn object(object: impl ScriptObject + 'static) -> Value {
        Value::Object(ObjectRef::new(object))
    }

    /// Everything except arrays, objects and Nothing
    pub fn is_value_type(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Object(_) | Value::Nothing)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Name reported by `TypeName`
    pub fn type_name(&self) -> String {
        match self {
            Value::Object(object) => object.type_name().to_string(),
            Value::Array(_) => "Variant()".to_string(),
            other => other.kind_name().to_string(),
        }
    }

    /// Static name of the active case
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Empty => "Empty",
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Byte(_) => "Byte",
            Value::Integer(_) => "Integer",
            Value::Long(_) => "Long",
            Value::Single(_) => "Single",
            Value::Double(_) => "Double",
            Value::Currency(_) => "Currency",
            Value::Date(_) => "Date",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::Nothing => "Nothing",
        }
    }

    /// Code reported by `VarType`
    pub fn var_type(&self) -> i32 {
        match self {
            Value::Empty => vartype::EMPTY,
            Value::Null => vartype::NULL,
            Value::Boolean(_) => vartype::BOOLEAN,
            Value::Byte(_) => vartype::BYTE,
            Value::Integer(_) => vartype::INTEGER,
            Value::Long(_) => vartype::LONG,
            Value::Single(_) => vartype::SINGLE,
            Value::Double(_) => vartype::DOUBLE,
            Value::Currency(_) => vartype::CURRENCY,
            Value::Date(_) => vartype::DATE,
            Value::String(_) => vartype::STRING,
            Value::Array(_) => vartype::ARRAY | vartype::VARIANT,
            Value::Object(_) | Value::Nothing => vartype::OBJECT,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Byte(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Long(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Single(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<Currency> for Value {
    fn from(value: Currency) -> Self {
        Value::Currency(value)
    }
}

impl From<VbDate> for Value {
    fn from(value: VbDate) -> Self {
        Value::Date(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value.into())
    }
}

impl From<VbArray> for Value {
    fn from(value: VbArray) -> Self {
        Value::Array(value)
    }
}

// ============================================================================
// Arrays
// ============================================================================

/// Fixed-rank, zero-based array.
///
/// Cheap to clone; mutation through a shared handle copies the elements
/// first (`Arc::make_mut`).
#[derive(Clone, Debug, PartialEq)]
pub struct VbArray {
    lengths: Arc<[usize]>,
    items: Arc<Vec<Value>>,
}

impl VbArray {
    /// `Dim a(u1, u2, ...)`: every element starts out Empty
    pub fn with_upper_bounds(upper_bounds: &[usize]) -> RuntimeResult<Self> {
        if upper_bounds.is_empty() {
            return Err(RuntimeError::subscript_out_of_range("Dim"));
        }
        let lengths: Vec<usize> = upper_bounds.iter().map(|u| u + 1).collect();
        let total = lengths
            .iter()
            .try_fold(1usize, |acc, len| acc.checked_mul(*len))
            .ok_or_else(|| RuntimeError::overflow("Dim"))?;
        Ok(VbArray {
            lengths: lengths.into(),
            items: Arc::new(vec![Value::Empty; total]),
        })
    }

    /// One-dimensional array holding `values`; `Array()` has upper bound -1
    pub fn from_values(values: Vec<Value>) -> Self {
        VbArray {
            lengths: vec![values.len()].into(),
            items: Arc::new(values),
        }
    }

    pub fn rank(&self) -> usize {
        self.lengths.len()
    }

    /// Total element count
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lower bound of the 1-based `dimension`; always zero
    pub fn lbound(&self, dimension: usize) -> RuntimeResult<i64> {
        self.dimension_length(dimension, "LBound").map(|_| 0)
    }

    /// Upper bound of the 1-based `dimension`
    pub fn ubound(&self, dimension: usize) -> RuntimeResult<i64> {
        self.dimension_length(dimension, "UBound")
            .map(|len| len as i64 - 1)
    }

    pub fn get(&self, indices: &[i64]) -> RuntimeResult<&Value> {
        let offset = self.offset(indices)?;
        Ok(&self.items[offset])
    }

    pub fn set(&mut self, indices: &[i64], value: Value) -> RuntimeResult<()> {
        let offset = self.offset(indices)?;
        Arc::make_mut(&mut self.items)[offset] = value;
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    fn dimension_length(&self, dimension: usize, context: &str) -> RuntimeResult<usize> {
        dimension
            .checked_sub(1)
            .and_then(|index| self.lengths.get(index))
            .copied()
            .ok_or_else(|| RuntimeError::subscript_out_of_range(context))
    }

    /// Row-major offset of `indices`
    fn offset(&self, indices: &[i64]) -> RuntimeResult<usize> {
        if indices.len() != self.lengths.len() {
            return Err(RuntimeError::subscript_out_of_range("array index"));
        }
        let mut offset = 0usize;
        for (index, len) in indices.iter().zip(self.lengths.iter()) {
            let index = usize::try_from(*index)
                .ok()
                .filter(|i| i < len)
                .ok_or_else(|| RuntimeError::subscript_out_of_range("array index"))?;
            offset = offset * len + index;
        }
        Ok(offset)
    }
}

// ============================================================================
// Objects
// ============================================================================

/// Member exposed by a script object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSignature {
    pub name: String,
    /// Accepted argument counts
    pub arity: RangeInclusive<usize>,
}

impl MemberSignature {
    pub fn new(name: impl Into<String>, arity: RangeInclusive<usize>) -> Self {
        MemberSignature {
            name: name.into(),
            arity,
        }
    }
}

/// Host object reachable from script code.
///
/// Implemented by the object-model layer; the runtime only needs to read the
/// member table and call members by their declared name.
pub trait ScriptObject: Send + Sync {
    /// Name reported by `TypeName`
    fn type_name(&self) -> &str;

    /// Declared name of the default member, if the type has one
    fn default_member(&self) -> Option<&str> {
        None
    }

    fn members(&self) -> Vec<MemberSignature>;

    /// Call a member by its declared name
    fn call(&self, member: &str, args: &[Value]) -> RuntimeResult<Value>;
}

/// Shared handle to a script object; equality is identity
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn ScriptObject>);

impl ObjectRef {
    pub fn new(object: impl ScriptObject + 'static) -> Self {
        ObjectRef(Arc::new(object))
    }

    pub fn from_arc(object: Arc<dyn ScriptObject>) -> Self {
        ObjectRef(object)
    }

    /// True when both handles point at the same allocation
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl std::ops::Deref for ObjectRef {
    type Target = dyn ScriptObject;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.0.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl ScriptObject for Probe {
        fn type_name(&self) -> &str {
            "Probe"
        }

        fn members(&self) -> Vec<MemberSignature> {
            Vec::new()
        }

        fn call(&self, member: &str, _args: &[Value]) -> RuntimeResult<Value> {
            Err(RuntimeError::member_not_supported(member))
        }
    }

    #[test]
    fn test_var_type_codes() {
        assert_eq!(Value::Empty.var_type(), 0);
        assert_eq!(Value::Boolean(true).var_type(), 11);
        assert_eq!(Value::Byte(1).var_type(), 17);
        assert_eq!(Value::from(VbArray::from_values(vec![])).var_type(), 8204);
        assert_eq!(Value::Nothing.var_type(), 9);
    }

    #[test]
    fn test_array_bounds() {
        let array = VbArray::with_upper_bounds(&[2, 3]).unwrap();
        assert_eq!(array.rank(), 2);
        assert_eq!(array.len(), 12);
        assert_eq!(array.ubound(1).unwrap(), 2);
        assert_eq!(array.ubound(2).unwrap(), 3);
        assert!(array.ubound(3).is_err());
        assert!(array.lbound(0).is_err());
        assert_eq!(VbArray::from_values(vec![]).ubound(1).unwrap(), -1);
    }

    #[test]
    fn test_array_copy_on_write() {
        let mut first = VbArray::with_upper_bounds(&[1, 1]).unwrap();
        let second = first.clone();
        first.set(&[1, 0], Value::Integer(5)).unwrap();
        assert_eq!(first.get(&[1, 0]).unwrap(), &Value::Integer(5));
        assert_eq!(second.get(&[1, 0]).unwrap(), &Value::Empty);
        assert!(first.get(&[2, 0]).is_err());
        assert!(first.get(&[-1, 0]).is_err());
        assert!(first.get(&[0]).is_err());
    }

    #[test]
    fn test_object_identity() {
        let a = ObjectRef::new(Probe);
        let b = a.clone();
        let c = ObjectRef::new(Probe);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(Value::Object(a).type_name(), "Probe");
    }
}
