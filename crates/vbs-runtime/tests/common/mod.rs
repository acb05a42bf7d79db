//! Shared test utilities
//!
//! Sample script objects and assertion helpers used across the integration
//! tests.

#![allow(dead_code)]

use vbs_runtime::{
    DateOrder, MemberSignature, RuntimeError, RuntimeOptions, RuntimeResult, Runtime,
    ScriptObject, Value,
};

// Re-export testing utilities
pub use pretty_assertions::{assert_eq, assert_ne};

/// Runtime with en-US dates and a fixed reference year
pub fn rt() -> Runtime {
    rt_with_order(DateOrder::Mdy)
}

pub fn rt_with_order(order: DateOrder) -> Runtime {
    Runtime::with_options(RuntimeOptions {
        date_order: order,
        reference_year: Some(2024),
        log_trapped_errors: false,
        ..RuntimeOptions::default()
    })
}

pub fn s(text: &str) -> Value {
    Value::string(text)
}

/// Assert that an operation failed with the given VBScript error number
pub fn assert_error(result: RuntimeResult<Value>, number: i32) {
    match result {
        Err(err) => assert_eq!(err.number(), number, "unexpected error: {}", err),
        Ok(value) => panic!("Expected error {}, got {:?}", number, value),
    }
}

/// Object whose default member `Value` returns a fixed value
pub struct Boxed {
    pub inner: Value,
}

impl ScriptObject for Boxed {
    fn type_name(&self) -> &str {
        "Boxed"
    }

    fn default_member(&self) -> Option<&str> {
        Some("Value")
    }

    fn members(&self) -> Vec<MemberSignature> {
        vec![MemberSignature::new("Value", 0..=0)]
    }

    fn call(&self, member: &str, _args: &[Value]) -> RuntimeResult<Value> {
        match member {
            "Value" => Ok(self.inner.clone()),
            other => Err(RuntimeError::member_not_supported(other)),
        }
    }
}

pub fn boxed(inner: Value) -> Value {
    Value::object(Boxed { inner })
}

/// Object without a default member
pub struct Plain;

impl ScriptObject for Plain {
    fn type_name(&self) -> &str {
        "Plain"
    }

    fn members(&self) -> Vec<MemberSignature> {
        vec![MemberSignature::new("Name", 0..=0)]
    }

    fn call(&self, _member: &str, _args: &[Value]) -> RuntimeResult<Value> {
        Ok(Value::string("plain"))
    }
}
