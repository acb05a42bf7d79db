//! Property-based checks of operator laws

mod common;

use common::*;
#[allow(unused_imports)]
use common::{assert_eq, assert_ne};
use proptest::prelude::*;
use vbs_runtime::{Currency, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Empty),
        any::<bool>().prop_map(Value::Boolean),
        any::<u8>().prop_map(Value::Byte),
        any::<i16>().prop_map(Value::Integer),
        any::<i32>().prop_map(Value::Long),
        (-1e6f32..1e6f32).prop_map(Value::Single),
        (-1e12f64..1e12f64).prop_map(Value::Double),
        (-1_000_000_000_000i64..1_000_000_000_000i64)
            .prop_map(|scaled| Value::Currency(Currency::from_scaled(scaled))),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Value::string),
    ]
}

fn number() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i16>().prop_map(Value::Integer),
        any::<i32>().prop_map(Value::Long),
        (-1e12f64..1e12f64).prop_map(Value::Double),
    ]
}

fn truth(value: Value) -> bool {
    match value {
        Value::Boolean(b) => b,
        other => panic!("expected Boolean, got {:?}", other),
    }
}

proptest! {
    #[test]
    fn null_poisons_arithmetic(value in scalar()) {
        let rt = rt();
        prop_assert_eq!(rt.add(&Value::Null, &value).unwrap(), Value::Null);
        prop_assert_eq!(rt.multiply(&value, &Value::Null).unwrap(), Value::Null);
        prop_assert_eq!(rt.equals(&value, &Value::Null).unwrap(), Value::Null);
        prop_assert_eq!(rt.less_than(&Value::Null, &value).unwrap(), Value::Null);
    }

    #[test]
    fn empty_is_additive_identity_for_integers(n in any::<i16>()) {
        let rt = rt();
        prop_assert_eq!(rt.add(&Value::Integer(n), &Value::Empty).unwrap(), Value::Integer(n));
        prop_assert_eq!(rt.add(&Value::Empty, &Value::Integer(n)).unwrap(), Value::Integer(n));
    }

    #[test]
    fn integer_addition_never_wraps(a in any::<i16>(), b in any::<i16>()) {
        let expected = i32::from(a) + i32::from(b);
        let sum = rt().add(&Value::Integer(a), &Value::Integer(b)).unwrap();
        match sum {
            Value::Integer(n) => prop_assert_eq!(i32::from(n), expected),
            Value::Long(n) => {
                prop_assert_eq!(n, expected);
                prop_assert!(i16::try_from(expected).is_err());
            }
            other => prop_assert!(false, "unexpected result {:?}", other),
        }
    }

    #[test]
    fn long_addition_is_exact(a in any::<i32>(), b in any::<i32>()) {
        let expected = i64::from(a) + i64::from(b);
        let sum = rt().add(&Value::Long(a), &Value::Long(b)).unwrap();
        match sum {
            Value::Long(n) => prop_assert_eq!(i64::from(n), expected),
            Value::Double(d) => prop_assert_eq!(d, expected as f64),
            other => prop_assert!(false, "unexpected result {:?}", other),
        }
    }

    #[test]
    fn equality_is_symmetric(a in scalar(), b in scalar()) {
        let rt = rt();
        prop_assert_eq!(rt.equals(&a, &b).unwrap(), rt.equals(&b, &a).unwrap());
    }

    #[test]
    fn numbers_are_totally_ordered(a in number(), b in number()) {
        let rt = rt();
        let lt = truth(rt.less_than(&a, &b).unwrap());
        let eq = truth(rt.equals(&a, &b).unwrap());
        let gt = truth(rt.greater_than(&a, &b).unwrap());
        prop_assert_eq!(u8::from(lt) + u8::from(eq) + u8::from(gt), 1);
    }

    #[test]
    fn strings_are_totally_ordered(a in "[a-zA-Z]{0,6}", b in "[a-zA-Z]{0,6}") {
        let rt = rt();
        let (a, b) = (s(&a), s(&b));
        let lt = truth(rt.less_than(&a, &b).unwrap());
        let eq = truth(rt.equals(&a, &b).unwrap());
        let gt = truth(rt.greater_than(&a, &b).unwrap());
        prop_assert_eq!(u8::from(lt) + u8::from(eq) + u8::from(gt), 1);
    }

    #[test]
    fn positive_serials_survive_cdate(serial in 0.0f64..2_958_465.0) {
        let rt = rt();
        let date = rt.cdate(&Value::Double(serial)).unwrap();
        prop_assert_eq!(rt.cdbl(&date).unwrap(), Value::Double(serial));
    }

    #[test]
    fn negative_serials_survive_cdate(serial in -657_434.0f64..=-1.0) {
        let rt = rt();
        let date = rt.cdate(&Value::Double(serial)).unwrap();
        prop_assert_eq!(rt.cdbl(&date).unwrap(), Value::Double(serial));
    }

    #[test]
    fn currency_sums_stay_in_range(a in any::<i64>(), b in any::<i64>()) {
        let (a, b) = (Currency::from_scaled(a), Currency::from_scaled(b));
        match a.scaled().checked_add(b.scaled()) {
            Some(expected) => {
                prop_assert_eq!(a.checked_add(b).map(|c| c.scaled()), Some(expected))
            }
            None => prop_assert!(a.checked_add(b).is_none()),
        }
    }

    #[test]
    fn currency_addition_overflows_instead_of_wrapping(cents in 1i64..1_000_000) {
        let rt = rt();
        let result = rt.add(
            &Value::Currency(Currency::MAX),
            &Value::Currency(Currency::from_scaled(cents)),
        );
        prop_assert_eq!(result.unwrap_err().number(), 6);
    }
}
