//! VBScript runtime core
//!
//! This library provides the dynamic-typing semantics of VBScript:
//! - The `Value` variant model (Empty, Null, numeric tiers, Currency, Date,
//!   strings, arrays, objects)
//! - Coercion (`val`, `num`, `str`, `if_condition`, `obj`)
//! - Arithmetic, comparison and logical operators with VBScript promotion
//!   and three-valued Null logic
//! - Conversion builtins (`CBool` .. `CStr`) and introspection builtins
//! - Error trapping (`On Error Resume Next`) and request-scoped disposal
//!
//! All operations hang off a per-request [`Runtime`]:
//!
//! ```
//! use vbs_runtime::{Runtime, Value};
//!
//! let rt = Runtime::new();
//! let sum = rt.add(&Value::Byte(250), &Value::Byte(10)).unwrap();
//! assert_eq!(sum, Value::Integer(260));
//! ```

/// Runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod currency;
pub mod date;
pub mod disposal;
pub mod error;
pub mod invoke;
pub mod number;
pub mod runtime;
pub mod trap;
pub mod value;

mod arithmetic;
mod builtins;
mod coerce;
mod comparison;
mod conversion;
mod logical;

pub use currency::Currency;
pub use date::VbDate;
pub use disposal::{Disposable, DisposalScope, DisposeError};
pub use error::{ErrorReport, RuntimeError, RuntimeResult};
pub use invoke::{DispatchInvoker, MemberCache, MemberInvoker};
pub use runtime::{Runtime, RuntimeOptions};
pub use trap::ErrorToken;
pub use value::{MemberSignature, ObjectRef, ScriptObject, Value, VbArray};
pub use vbs_config::{DateOrder, MAX_STRING_LENGTH};
