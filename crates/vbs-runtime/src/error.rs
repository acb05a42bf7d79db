//! Runtime error type
//!
//! Every error raised by the runtime maps onto one of the VBScript error
//! numbers so the caller can populate `Err.Number` / `Err.Description`.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Runtime error raised by coercion, operators and conversions.
///
/// The optional `context` names the operation or member that failed and is
/// rendered the way VBScript does it: `Type mismatch: 'CInt'`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Value cannot be coerced, compared or converted as required
    #[error("{}", describe("Type mismatch", .context))]
    TypeMismatch { context: Option<String> },
    /// Null reached an operation that forbids it
    #[error("{}", describe("Invalid use of Null", .context))]
    InvalidUseOfNull { context: Option<String> },
    /// Target of an operation is Nothing
    #[error("{}", describe("Object variable not set", .context))]
    ObjectVariableNotSet { context: Option<String> },
    /// Member lookup failed
    #[error("{}", describe("Object doesn't support this property or method", .context))]
    ObjectDoesNotSupportPropertyOrMember { context: Option<String> },
    /// Value type used where an object reference is required
    #[error("{}", describe("Object required", .context))]
    ObjectRequired { context: Option<String> },
    /// Result outside the representable range of the target type
    #[error("{}", describe("Overflow", .context))]
    Overflow { context: Option<String> },
    /// Non-zero value divided by zero
    #[error("{}", describe("Division by zero", .context))]
    DivisionByZero { context: Option<String> },
    /// String result exceeds the configured ceiling
    #[error("{}", describe("Out of string space", .context))]
    OutOfStringSpace { context: Option<String> },
    /// Argument outside an operation's accepted domain
    #[error("{}", describe("Invalid procedure call or argument", .context))]
    InvalidProcedureCallOrArgument { context: Option<String> },
    /// Array dimension or index out of bounds
    #[error("{}", describe("Subscript out of range", .context))]
    SubscriptOutOfRange { context: Option<String> },
    /// Member invoked with an arity it does not accept
    #[error("{}", describe("Wrong number of arguments or invalid property assignment", .context))]
    WrongArgumentCount { context: Option<String> },
    /// Engine invariant violated
    #[error("Internal error: {msg}")]
    Internal { msg: String },
}

fn describe(base: &str, context: &Option<String>) -> String {
    match context {
        Some(context) => format!("{}: '{}'", base, context),
        None => base.to_string(),
    }
}

impl RuntimeError {
    /// Type mismatch raised by the named operation
    pub fn type_mismatch(context: impl Into<String>) -> Self {
        RuntimeError::TypeMismatch {
            context: Some(context.into()),
        }
    }

    /// Invalid use of Null raised by the named operation
    pub fn invalid_use_of_null(context: impl Into<String>) -> Self {
        RuntimeError::InvalidUseOfNull {
            context: Some(context.into()),
        }
    }

    pub fn object_variable_not_set(context: impl Into<String>) -> Self {
        RuntimeError::ObjectVariableNotSet {
            context: Some(context.into()),
        }
    }

    pub fn member_not_supported(context: impl Into<String>) -> Self {
        RuntimeError::ObjectDoesNotSupportPropertyOrMember {
            context: Some(context.into()),
        }
    }

    pub fn object_required(context: impl Into<String>) -> Self {
        RuntimeError::ObjectRequired {
            context: Some(context.into()),
        }
    }

    pub fn overflow(context: impl Into<String>) -> Self {
        RuntimeError::Overflow {
            context: Some(context.into()),
        }
    }

    pub fn division_by_zero(context: impl Into<String>) -> Self {
        RuntimeError::DivisionByZero {
            context: Some(context.into()),
        }
    }

    pub fn out_of_string_space(context: impl Into<String>) -> Self {
        RuntimeError::OutOfStringSpace {
            context: Some(context.into()),
        }
    }

    pub fn invalid_argument(context: impl Into<String>) -> Self {
        RuntimeError::InvalidProcedureCallOrArgument {
            context: Some(context.into()),
        }
    }

    pub fn subscript_out_of_range(context: impl Into<String>) -> Self {
        RuntimeError::SubscriptOutOfRange {
            context: Some(context.into()),
        }
    }

    pub fn wrong_argument_count(context: impl Into<String>) -> Self {
        RuntimeError::WrongArgumentCount {
            context: Some(context.into()),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        RuntimeError::Internal { msg: msg.into() }
    }

    /// VBScript error number (`Err.Number`)
    pub fn number(&self) -> i32 {
        match self {
            RuntimeError::InvalidProcedureCallOrArgument { .. } => 5,
            RuntimeError::Overflow { .. } => 6,
            RuntimeError::SubscriptOutOfRange { .. } => 9,
            RuntimeError::DivisionByZero { .. } => 11,
            RuntimeError::TypeMismatch { .. } => 13,
            RuntimeError::OutOfStringSpace { .. } => 14,
            RuntimeError::Internal { .. } => 51,
            RuntimeError::ObjectVariableNotSet { .. } => 91,
            RuntimeError::InvalidUseOfNull { .. } => 94,
            RuntimeError::ObjectRequired { .. } => 424,
            RuntimeError::ObjectDoesNotSupportPropertyOrMember { .. } => 438,
            RuntimeError::WrongArgumentCount { .. } => 450,
        }
    }

    /// VBScript error description (`Err.Description`), without context
    pub fn description(&self) -> &'static str {
        match self {
            RuntimeError::TypeMismatch { .. } => "Type mismatch",
            RuntimeError::InvalidUseOfNull { .. } => "Invalid use of Null",
            RuntimeError::ObjectVariableNotSet { .. } => "Object variable not set",
            RuntimeError::ObjectDoesNotSupportPropertyOrMember { .. } => {
                "Object doesn't support this property or method"
            }
            RuntimeError::ObjectRequired { .. } => "Object required",
            RuntimeError::Overflow { .. } => "Overflow",
            RuntimeError::DivisionByZero { .. } => "Division by zero",
            RuntimeError::OutOfStringSpace { .. } => "Out of string space",
            RuntimeError::InvalidProcedureCallOrArgument { .. } => {
                "Invalid procedure call or argument"
            }
            RuntimeError::SubscriptOutOfRange { .. } => "Subscript out of range",
            RuntimeError::WrongArgumentCount { .. } => {
                "Wrong number of arguments or invalid property assignment"
            }
            RuntimeError::Internal { .. } => "Internal error",
        }
    }

    /// Snapshot suitable for reporting to the user
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            number: self.number(),
            description: self.to_string(),
            source: "Microsoft VBScript runtime error",
        }
    }
}

/// Serializable view of an error (`Err.Number`, `Err.Description`, `Err.Source`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub number: i32,
    pub description: String,
    pub source: &'static str,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.source, self.number, self.description)
    }
}

/// Result alias used throughout the runtime
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_context() {
        let err = RuntimeError::type_mismatch("CInt");
        assert_eq!(err.to_string(), "Type mismatch: 'CInt'");
    }

    #[test]
    fn test_display_without_context() {
        let err = RuntimeError::Overflow { context: None };
        assert_eq!(err.to_string(), "Overflow");
    }

    #[test]
    fn test_error_numbers() {
        assert_eq!(RuntimeError::type_mismatch("x").number(), 13);
        assert_eq!(RuntimeError::invalid_use_of_null("x").number(), 94);
        assert_eq!(RuntimeError::object_variable_not_set("x").number(), 91);
        assert_eq!(RuntimeError::member_not_supported("x").number(), 438);
        assert_eq!(RuntimeError::overflow("x").number(), 6);
        assert_eq!(RuntimeError::division_by_zero("x").number(), 11);
        assert_eq!(RuntimeError::out_of_string_space("x").number(), 14);
        assert_eq!(RuntimeError::invalid_argument("x").number(), 5);
        assert_eq!(RuntimeError::subscript_out_of_range("x").number(), 9);
    }

    #[test]
    fn test_report_serializes() {
        let report = RuntimeError::division_by_zero("/").report();
        assert_eq!(report.number, 11);
        assert_eq!(report.description, "Division by zero: '/'");
    }
}
