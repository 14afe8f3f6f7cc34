//! # In-Flight Guard
//!
//! One operation per fund at a time. Any fund-mutating entry point enters
//! the guard first; a second entry for the same fund, whether re-entrant
//! from adapter code or from another thread, is rejected outright.
//!
//! The guard is released when the [`InFlightGuard`] is dropped, so every
//! exit path (commit, error, panic unwinding) frees the fund.

use parking_lot::Mutex;
use shared_types::FundId;
use std::collections::HashSet;

/// Funds with an operation in flight.
#[derive(Debug, Default)]
pub struct FundLocks {
    in_flight: Mutex<HashSet<FundId>>,
}

impl FundLocks {
    /// Empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `fund` busy. `None` if it already is.
    #[must_use]
    pub fn try_enter(&self, fund: FundId) -> Option<InFlightGuard<'_>> {
        if self.in_flight.lock().insert(fund) {
            Some(InFlightGuard { locks: self, fund })
        } else {
            None
        }
    }

    /// Whether `fund` has an operation in flight.
    #[must_use]
    pub fn is_in_flight(&self, fund: &FundId) -> bool {
        self.in_flight.lock().contains(fund)
    }
}

/// Marks a fund busy until dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    locks: &'a FundLocks,
    fund: FundId,
}

impl InFlightGuard<'_> {
    /// Fund held by this guard.
    #[must_use]
    pub fn fund(&self) -> FundId {
        self.fund
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.locks.in_flight.lock().remove(&self.fund);
    }
}
