//! Error trapping (`On Error Resume Next` / `On Error Goto 0`)
//!
//! Every lexical error-handling scope holds an [`ErrorToken`]. A token is
//! either disabled (errors propagate) or trapping (errors are recorded in the
//! single last-error slot and execution continues). The slot is shared by
//! all tokens of one request, so an inner failure can overwrite an outer one.

use crate::error::{RuntimeError, RuntimeResult};
use std::collections::HashMap;

/// Handle for one error-handling scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorToken(u32);

impl ErrorToken {
    pub fn id(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrapState {
    Disabled,
    Trapping,
}

/// Per-request trap table
#[derive(Debug, Default)]
pub struct ErrorTrap {
    states: HashMap<u32, TrapState>,
    free: Vec<u32>,
    next_id: u32,
    last_error: Option<RuntimeError>,
    log_trapped: bool,
}

impl ErrorTrap {
    pub fn new(log_trapped: bool) -> Self {
        ErrorTrap {
            log_trapped,
            ..Self::default()
        }
    }

    /// Take a token from the free list, or mint a new one
    pub fn acquire(&mut self) -> ErrorToken {
        let id = self.free.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        });
        self.states.insert(id, TrapState::Disabled);
        tracing::trace!(token = id, "error token acquired");
        ErrorToken(id)
    }

    /// Return a token to the free list; releasing twice is a no-op
    pub fn release(&mut self, token: ErrorToken) {
        if self.states.remove(&token.0).is_some() {
            self.free.push(token.0);
            tracing::trace!(token = token.0, "error token released");
        }
    }

    pub fn enable(&mut self, token: ErrorToken) -> RuntimeResult<()> {
        self.set_state(token, TrapState::Trapping)
    }

    pub fn disable(&mut self, token: ErrorToken) -> RuntimeResult<()> {
        self.set_state(token, TrapState::Disabled)
    }

    /// Both transitions clear the pending error
    fn set_state(&mut self, token: ErrorToken, state: TrapState) -> RuntimeResult<()> {
        let slot = self
            .states
            .get_mut(&token.0)
            .ok_or_else(|| unknown_token(token))?;
        *slot = state;
        self.last_error = None;
        Ok(())
    }

    pub fn is_trapping(&self, token: ErrorToken) -> RuntimeResult<bool> {
        self.states
            .get(&token.0)
            .map(|state| *state == TrapState::Trapping)
            .ok_or_else(|| unknown_token(token))
    }

    /// Route a failure raised under `token`.
    ///
    /// Trapping tokens record the error and swallow it; disabled tokens are
    /// released and the error is handed back for propagation.
    pub fn handle(&mut self, token: ErrorToken, error: RuntimeError) -> RuntimeResult<()> {
        if self.is_trapping(token)? {
            if self.log_trapped {
                tracing::debug!(
                    token = token.0,
                    number = error.number(),
                    error = %error,
                    "error trapped"
                );
            }
            self.last_error = Some(error);
            Ok(())
        } else {
            self.release(token);
            Err(error)
        }
    }

    pub fn last_error(&self) -> Option<&RuntimeError> {
        self.last_error.as_ref()
    }

    pub fn clear(&mut self) {
        self.last_error = None;
    }

    /// Tokens currently handed out
    pub fn active_tokens(&self) -> usize {
        self.states.len()
    }
}

fn unknown_token(token: ErrorToken) -> RuntimeError {
    RuntimeError::internal(format!("unknown error token {}", token.0))
}
