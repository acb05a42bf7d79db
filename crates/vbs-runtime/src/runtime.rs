//! Per-request runtime
//!
//! A [`Runtime`] is created when a script request starts and dropped when it
//! ends. It owns the request's options, member invoker, error trap and
//! disposal scope. The operator families are implemented on it in their own
//! modules (`arithmetic`, `comparison`, `logical`, `conversion`, `builtins`,
//! `coerce`).

use crate::disposal::{Disposable, DisposalScope, DisposeError};
use crate::error::{RuntimeError, RuntimeResult};
use crate::invoke::{DispatchInvoker, MemberInvoker};
use crate::trap::{ErrorToken, ErrorTrap};
use chrono::Datelike;
use std::cell::RefCell;
use std::sync::Arc;
use vbs_config::{DateOrder, RuntimeConfig, MAX_STRING_LENGTH};

/// Settings that shape runtime behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Component order for numeric date strings and date output
    pub date_order: DateOrder,
    /// String ceiling in UTF-16 code units
    pub max_string_length: usize,
    /// Emit a debug event for every trapped error
    pub log_trapped_errors: bool,
    /// Year assumed by date strings without one; the current year when unset
    pub reference_year: Option<i32>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        RuntimeOptions {
            date_order: DateOrder::Mdy,
            max_string_length: MAX_STRING_LENGTH,
            log_trapped_errors: true,
            reference_year: None,
        }
    }
}

impl From<&RuntimeConfig> for RuntimeOptions {
    fn from(config: &RuntimeConfig) -> Self {
        RuntimeOptions {
            date_order: config.date_order(),
            max_string_length: config.max_string_length(),
            log_trapped_errors: config.log_trapped_errors(),
            reference_year: None,
        }
    }
}

/// Request-scoped runtime state
pub struct Runtime {
    options: RuntimeOptions,
    invoker: Arc<dyn MemberInvoker>,
    trap: RefCell<ErrorTrap>,
    disposals: DisposalScope,
}

impl Runtime {
    /// Runtime with default options and a private member cache
    pub fn new() -> Self {
        Self::with_options(RuntimeOptions::default())
    }

    pub fn with_options(options: RuntimeOptions) -> Self {
        Self::with_invoker(options, Arc::new(DispatchInvoker::new()))
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::with_options(RuntimeOptions::from(config))
    }

    /// Runtime using a caller-supplied invoker (which may share its cache
    /// with other requests)
    pub fn with_invoker(options: RuntimeOptions, invoker: Arc<dyn MemberInvoker>) -> Self {
        let trap = ErrorTrap::new(options.log_trapped_errors);
        Runtime {
            options,
            invoker,
            trap: RefCell::new(trap),
            disposals: DisposalScope::new(),
        }
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    pub fn invoker(&self) -> &dyn MemberInvoker {
        self.invoker.as_ref()
    }

    pub(crate) fn date_order(&self) -> DateOrder {
        self.options.date_order
    }

    pub(crate) fn reference_year(&self) -> i32 {
        self.options
            .reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Fail with `OutOfStringSpace` when `text` exceeds the ceiling
    pub(crate) fn check_string_length(&self, text: &str, context: &str) -> RuntimeResult<()> {
        // UTF-16 length is at least the char count and at most the byte count
        if text.len() <= self.options.max_string_length {
            return Ok(());
        }
        if text.encode_utf16().count() > self.options.max_string_length {
            return Err(RuntimeError::out_of_string_space(context));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Error trapping
    // ------------------------------------------------------------------

    pub fn acquire_token(&self) -> ErrorToken {
        self.trap.borrow_mut().acquire()
    }

    pub fn release_token(&self, token: ErrorToken) {
        self.trap.borrow_mut().release(token)
    }

    /// `On Error Resume Next`
    pub fn enable_trapping(&self, token: ErrorToken) -> RuntimeResult<()> {
        self.trap.borrow_mut().enable(token)
    }

    /// `On Error Goto 0`
    pub fn disable_trapping(&self, token: ErrorToken) -> RuntimeResult<()> {
        self.trap.borrow_mut().disable(token)
    }

    /// Run `action` under `token`.
    ///
    /// Returns `Ok(Some(value))` on success and `Ok(None)` when the failure
    /// was trapped. With trapping disabled the error propagates and the
    /// token is released.
    pub fn execute<T>(
        &self,
        token: ErrorToken,
        action: impl FnOnce(&Runtime) -> RuntimeResult<T>,
    ) -> RuntimeResult<Option<T>> {
        self.trap.borrow().is_trapping(token)?;
        match action(self) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                self.trap.borrow_mut().handle(token, error)?;
                Ok(None)
            }
        }
    }

    /// `Err` as seen by script code after a trapped failure
    pub fn last_trapped_error(&self) -> Option<RuntimeError> {
        self.trap.borrow().last_error().cloned()
    }

    /// `Err.Clear`
    pub fn clear_trapped_error(&self) {
        self.trap.borrow_mut().clear()
    }

    // ------------------------------------------------------------------
    // Disposal
    // ------------------------------------------------------------------

    /// Tie `resource` to the lifetime of this request
    pub fn register_disposable(&self, resource: impl Disposable + 'static) {
        self.disposals.register(resource)
    }

    /// Dispose registered resources now instead of at drop
    pub fn dispose_all(&self) -> Vec<DisposeError> {
        self.disposals.dispose_all()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("options", &self.options)
            .field("disposals", &self.disposals)
            .finish_non_exhaustive()
    }
}
