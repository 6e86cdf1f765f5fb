//! Cooperative cancellation.
//!
//! A request carries a [`CancellationToken`]; resolution polls it at every
//! stage boundary and every few units of body work. A cancelled request
//! publishes nothing.

use lres_fir::ResolveError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

#[derive(Debug)]
struct TokenState {
    cancelled: AtomicBool,
    /// Checks left before the token cancels itself; negative means never.
    remaining: AtomicI64,
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        CancellationToken::new()
    }
}

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken {
            state: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                remaining: AtomicI64::new(-1),
            }),
        }
    }

    /// A token that lets `checks` polls pass and cancels on the next one.
    pub fn after_checks(checks: u32) -> CancellationToken {
        let token = CancellationToken::new();
        token
            .state
            .remaining
            .store(i64::from(checks), Ordering::SeqCst);
        token
    }

    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Poll the token.
    pub fn check(&self) -> Result<(), ResolveError> {
        if self.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }
        let remaining = self.state.remaining.load(Ordering::SeqCst);
        if remaining >= 0 {
            if remaining == 0 {
                self.cancel();
                return Err(ResolveError::Cancelled);
            }
            self.state.remaining.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Polls a token every `interval` units of work, and at every checkpoint.
#[derive(Debug)]
pub struct Progress {
    token: CancellationToken,
    interval: u32,
    units: u32,
}

impl Progress {
    pub fn new(token: CancellationToken, interval: u32) -> Progress {
        Progress {
            token,
            interval: interval.max(1),
            units: 0,
        }
    }

    /// One unit of work.
    pub fn tick(&mut self) -> Result<(), ResolveError> {
        self.units += 1;
        if self.units >= self.interval {
            self.units = 0;
            self.token.check()?;
        }
        Ok(())
    }

    /// Unconditional poll, used at stage boundaries.
    pub fn checkpoint(&mut self) -> Result<(), ResolveError> {
        self.units = 0;
        self.token.check()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
