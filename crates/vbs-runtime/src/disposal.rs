//! Request-scoped resource disposal
//!
//! Resources created while a request runs are registered with a
//! [`DisposalScope`]. When the scope ends they are disposed in reverse
//! registration order; each disposal is isolated so a failing (or panicking)
//! resource does not keep the rest alive.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Something that holds an external resource
pub trait Disposable {
    /// Label used when reporting failures
    fn name(&self) -> &str;

    fn dispose(&mut self) -> Result<(), DisposeError>;
}

/// Failure while releasing a resource
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to dispose {resource}: {reason}")]
pub struct DisposeError {
    pub resource: String,
    pub reason: String,
}

impl DisposeError {
    pub fn new(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        DisposeError {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

/// Owner of the disposable resources of one request
#[derive(Default)]
pub struct DisposalScope {
    resources: RefCell<Vec<Box<dyn Disposable>>>,
}

impl DisposalScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, resource: impl Disposable + 'static) {
        self.resources.borrow_mut().push(Box::new(resource));
    }

    pub fn len(&self) -> usize {
        self.resources.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.borrow().is_empty()
    }

    /// Dispose everything registered so far, newest first
    pub fn dispose_all(&self) -> Vec<DisposeError> {
        let resources = std::mem::take(&mut *self.resources.borrow_mut());
        let mut failures = Vec::new();
        for mut resource in resources.into_iter().rev() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| resource.dispose()));
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(error)) => Some(error),
                Err(payload) => Some(DisposeError::new(
                    resource.name(),
                    panic_message(payload.as_ref()),
                )),
            };
            if let Some(error) = failure {
                tracing::warn!(resource = %error.resource, reason = %error.reason, "disposal failed");
                failures.push(error);
            }
        }
        failures
    }
}

impl Drop for DisposalScope {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl std::fmt::Debug for DisposalScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposalScope")
            .field("resources", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct Handle {
        name: String,
        log: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl Disposable for Handle {
        fn name(&self) -> &str {
            &self.name
        }

        fn dispose(&mut self) -> Result<(), DisposeError> {
            self.log.borrow_mut().push(self.name.clone());
            if self.fail {
                Err(DisposeError::new(&self.name, "busy"))
            } else {
                Ok(())
            }
        }
    }

    fn handle(name: &str, log: &Rc<RefCell<Vec<String>>>, fail: bool) -> Handle {
        Handle {
            name: name.to_string(),
            log: log.clone(),
            fail,
        }
    }

    #[test]
    fn test_disposes_in_reverse_order_despite_failures() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let scope = DisposalScope::new();
        scope.register(handle("first", &log, false));
        scope.register(handle("second", &log, true));
        scope.register(handle("third", &log, false));

        let failures = scope.dispose_all();
        assert_eq!(*log.borrow(), vec!["third", "second", "first"]);
        assert_eq!(failures, vec![DisposeError::new("second", "busy")]);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_drop_disposes() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let scope = DisposalScope::new();
            scope.register(handle("conn", &log, false));
        }
        assert_eq!(*log.borrow(), vec!["conn"]);
    }
}
