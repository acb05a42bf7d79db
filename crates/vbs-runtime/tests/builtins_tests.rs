//! Logical operators, coercion helpers and introspection builtins

mod common;

use common::*;
#[allow(unused_imports)]
use common::{assert_eq, assert_ne};
use rstest::rstest;
use vbs_runtime::{VbArray, VbDate, Value};

#[rstest]
#[case(Value::Boolean(true), Value::Boolean(false))]
#[case(Value::Integer(0), Value::Integer(-1))]
#[case(Value::Byte(0x0F), Value::Byte(0xF0))]
#[case(Value::Empty, Value::Integer(-1))]
#[case(Value::Double(1.5), Value::Long(-3))]
#[case(Value::Null, Value::Null)]
fn test_not(#[case] value: Value, #[case] expected: Value) {
    assert_eq!(rt().not(&value).unwrap(), expected);
}

#[test]
fn test_bitwise_tiers() {
    let rt = rt();
    assert_eq!(
        rt.and(&Value::Integer(12), &Value::Integer(10)).unwrap(),
        Value::Integer(8)
    );
    assert_eq!(
        rt.or(&Value::Byte(1), &Value::Byte(2)).unwrap(),
        Value::Byte(3)
    );
    assert_eq!(
        rt.xor(&Value::Boolean(true), &Value::Boolean(true)).unwrap(),
        Value::Boolean(false)
    );
    assert_eq!(
        rt.eqv(&Value::Boolean(false), &Value::Boolean(false)).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        rt.imp(&Value::Boolean(true), &Value::Boolean(false)).unwrap(),
        Value::Boolean(false)
    );
    assert_eq!(
        rt.or(&Value::Long(65536), &Value::Integer(1)).unwrap(),
        Value::Long(65537)
    );
    assert_eq!(
        rt.and(&s("6"), &Value::Integer(3)).unwrap(),
        Value::Long(2)
    );
}

#[test]
fn test_null_logic() {
    let rt = rt();
    let t = Value::Boolean(true);
    let f = Value::Boolean(false);
    assert_eq!(rt.and(&Value::Null, &f).unwrap(), f);
    assert_eq!(rt.and(&Value::Null, &t).unwrap(), Value::Null);
    assert_eq!(rt.or(&t, &Value::Null).unwrap(), t);
    assert_eq!(rt.or(&f, &Value::Null).unwrap(), Value::Null);
    assert_eq!(rt.xor(&t, &Value::Null).unwrap(), Value::Null);
    assert_eq!(rt.eqv(&Value::Null, &f).unwrap(), Value::Null);
    assert_eq!(rt.imp(&Value::Null, &t).unwrap(), t);
    assert_eq!(rt.imp(&f, &Value::Null).unwrap(), t);
    assert_eq!(rt.imp(&t, &Value::Null).unwrap(), Value::Null);
    assert_eq!(
        rt.imp(&Value::Integer(0), &Value::Null).unwrap(),
        Value::Integer(-1)
    );
}

#[test]
fn test_logical_overflow() {
    assert_error(rt().not(&Value::Double(3e9)), 6);
}

#[test]
fn test_val_and_str() {
    let rt = rt();
    assert_eq!(rt.val(&boxed(s("inner"))).unwrap(), s("inner"));
    assert_error(rt.val(&boxed(boxed(Value::Empty))), 13);
    assert_error(rt.val(&Value::Nothing), 91);
    assert_eq!(rt.str(&Value::Empty).unwrap(), "");
    assert_eq!(rt.str(&Value::Double(2.5)).unwrap(), "2.5");
}

#[test]
fn test_var_type_and_type_name() {
    let rt = rt();
    assert_eq!(rt.var_type(&Value::Integer(1)), Value::Integer(2));
    assert_eq!(rt.var_type(&s("x")), Value::Integer(8));
    assert_eq!(rt.type_name(&Value::Double(1.0)), s("Double"));
    assert_eq!(rt.type_name(&boxed(Value::Empty)), s("Boxed"));
    assert_eq!(
        rt.type_name(&Value::Array(VbArray::from_values(vec![]))),
        s("Variant()")
    );
}

#[rstest]
#[case(Value::Empty, true)]
#[case(Value::Integer(3), true)]
#[case(s(" 1.5e3 "), true)]
#[case(s("&HFF"), true)]
#[case(s("abc"), false)]
#[case(Value::Null, false)]
#[case(Value::Date(VbDate::ZERO), false)]
#[case(Value::Nothing, false)]
fn test_is_numeric(#[case] value: Value, #[case] expected: bool) {
    assert_eq!(rt().is_numeric(&value), expected);
}

#[test]
fn test_is_predicates() {
    let rt = rt();
    assert!(rt.is_date(&s("July 4, 1776")));
    assert!(rt.is_date(&Value::Date(VbDate::ZERO)));
    assert!(!rt.is_date(&s("12")));
    assert!(rt.is_empty(&Value::Empty));
    assert!(!rt.is_empty(&s("")));
    assert!(rt.is_null(&Value::Null));
    assert!(rt.is_object(&Value::Nothing));
    assert!(!rt.is_object(&Value::Integer(1)));
    assert!(rt.is_array(&Value::Array(VbArray::from_values(vec![]))));
}

#[test]
fn test_bounds() {
    let rt = rt();
    let grid = Value::Array(VbArray::with_upper_bounds(&[3, 5]).unwrap());
    assert_eq!(rt.lbound(&grid, None).unwrap(), Value::Long(0));
    assert_eq!(rt.ubound(&grid, None).unwrap(), Value::Long(3));
    assert_eq!(rt.ubound(&grid, Some(&Value::Integer(2))).unwrap(), Value::Long(5));
    assert_error(rt.ubound(&grid, Some(&Value::Integer(3))), 9);
    assert_error(rt.lbound(&grid, Some(&Value::Integer(0))), 9);
    assert_error(rt.ubound(&Value::Integer(1), None), 13);
    let empty = Value::Array(VbArray::from_values(vec![]));
    assert_eq!(rt.ubound(&empty, None).unwrap(), Value::Long(-1));
}

#[test]
fn test_len() {
    let rt = rt();
    assert_eq!(rt.len(&s("hello")).unwrap(), Value::Long(5));
    assert_eq!(rt.len(&s("\u{1F600}")).unwrap(), Value::Long(2));
    assert_eq!(rt.len(&Value::Integer(-12)).unwrap(), Value::Long(3));
    assert_eq!(rt.len(&Value::Empty).unwrap(), Value::Long(0));
    assert_eq!(rt.len(&Value::Null).unwrap(), Value::Null);
}

#[test]
fn test_string_builtin() {
    let rt = rt();
    assert_eq!(rt.string(&Value::Integer(3), &s("xyz")).unwrap(), s("xxx"));
    assert_eq!(rt.string(&Value::Integer(2), &Value::Integer(65)).unwrap(), s("AA"));
    assert_eq!(rt.string(&Value::Integer(0), &s("x")).unwrap(), s(""));
    assert_eq!(rt.string(&Value::Null, &s("x")).unwrap(), Value::Null);
    assert_error(rt.string(&Value::Integer(-1), &s("x")), 5);
    assert_error(rt.string(&Value::Integer(1), &s("")), 5);
}
