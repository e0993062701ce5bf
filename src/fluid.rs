use core::cell::UnsafeCell;
use core::fmt::{Debug, Formatter};
use std::time::{Duration, Instant};

use crate::err::{abend, FatalError};
use crate::guard::{Goal, Guard};
use crate::sync::thread;
use crate::types::Unpacked;

/// How long a finished access may keep retrying its end goal before the
/// failure is treated as a broken invariant.
const RELEASE_TIMEOUT: Duration = Duration::from_millis(10);

/// A value of a user-chosen type behind a [Guard].
///
/// The wrapped value is reachable only through [alter](Fluid::alter) and
/// [check](Fluid::check), which bracket a user callback between the matching
/// begin/end goals and hand it a reference of the right mutability for the
/// duration of the call. Both brackets are try-only: when access cannot be
/// granted at this instant, the callback is not invoked and the caller gets
/// `false` back immediately. Turning that `false` into "try another job" is
/// the scheduler's business, not the fluid's.
pub struct Fluid<T> {
    guard: Guard,
    data: UnsafeCell<T>,
}

// The guard hands out either one exclusive reference or shared references
// with no writer active, never both; `alter` may run on any thread (T: Send)
// and `check` may read from several threads at once (T: Sync).
unsafe impl<T: Send + Sync> Sync for Fluid<T> {}

impl<T: Default> Fluid<T> {
    /// Create a fluid around a default-constructed value, with the guard's
    /// [default reader limit](crate::DEFAULT_READER_LIMIT).
    pub fn new() -> Self {
        Self {
            guard: Guard::new(),
            data: UnsafeCell::new(T::default()),
        }
    }

    /// Create a fluid whose guard rejects more than `reader_limit` active
    /// readers.
    pub fn with_reader_limit(reader_limit: u32) -> Self {
        Self {
            guard: Guard::with_reader_limit(reader_limit),
            data: UnsafeCell::new(T::default()),
        }
    }
}

impl<T: Default> Default for Fluid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Fluid<T> {
    /// Run `func` with exclusive mutable access to the wrapped value.
    ///
    /// Returns `false` without invoking `func` when write access cannot be
    /// granted at this instant: a writer is active, or readers are active, in
    /// which case this call has claimed the pending write and the guard
    /// rejects new readers until the active ones drain. Returns `true` once
    /// `func` has run and the access has been returned.
    pub fn alter(&self, func: impl FnOnce(&mut T)) -> bool {
        if !self.guard.run(Goal::BeginWrite) {
            return false;
        }
        func(unsafe { &mut *self.data.get() });
        self.release(Goal::EndWrite);
        true
    }

    /// Run `func` with shared read-only access to the wrapped value.
    ///
    /// Returns `false` without invoking `func` when read access cannot be
    /// granted at this instant (a writer is active or pending, or the guard's
    /// reader limit is reached). Returns `true` once `func` has run and the
    /// access has been returned.
    pub fn check(&self, func: impl FnOnce(&T)) -> bool {
        if !self.guard.run(Goal::BeginRead) {
            return false;
        }
        func(unsafe { &*self.data.get() });
        self.release(Goal::EndRead);
        true
    }

    /// A lock-free snapshot of the guard's state, for diagnostics only.
    pub fn state(&self) -> Unpacked {
        self.guard.state()
    }

    /// Return a granted access.
    ///
    /// An end goal always has an edge out of the modes a granted access can
    /// observe, so a rejection here can only mean CAS contention. Yield and
    /// retry briefly; an expired window means the state machine was driven
    /// outside its contract.
    fn release(&self, goal: Goal) {
        if self.guard.run(goal) {
            return;
        }
        let started: Instant = Instant::now();
        while started.elapsed() < RELEASE_TIMEOUT {
            thread::yield_now();
            if self.guard.run(goal) {
                return;
            }
        }
        abend(FatalError::ReleaseDeadlineExceeded {
            goal,
            mode: self.guard.state().mode,
            timeout_ms: RELEASE_TIMEOUT.as_millis() as u64,
        });
    }
}

impl<T> Debug for Fluid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Fluid").field("guard", &self.guard).finish_non_exhaustive()
    }
}

#[cfg(all(test, not(loom), not(feature = "shuttle")))]
mod tests {
    use test_log::test;

    use super::Fluid;
    use crate::mode::Mode;

    #[test]
    fn test_alter_mutates_in_place_and_returns_to_idle() {
        let fluid: Fluid<Vec<u64>> = Fluid::new();
        assert!(fluid.alter(|values| values.extend([1, 2, 3])));
        assert_eq!(fluid.state().mode, Mode::Idle);
        assert_eq!(fluid.state().readers, 0);

        let mut snapshot: Vec<u64> = Vec::new();
        assert!(fluid.check(|values| snapshot = values.clone()));
        assert_eq!(snapshot, vec![1, 2, 3]);
        assert_eq!(fluid.state().mode, Mode::Idle);
    }

    #[test]
    fn test_rejected_check_does_not_invoke_the_callback() {
        let fluid: Fluid<u64> = Fluid::with_reader_limit(0);
        // A zero reader limit turns every check into a rejection.
        assert!(!fluid.check(|_| panic!("the callback must not run")));
        assert_eq!(fluid.state().mode, Mode::Idle);
    }

    #[test]
    fn test_accesses_nest_across_distinct_fluids() {
        let outer: Fluid<u64> = Fluid::new();
        let inner: Fluid<u64> = Fluid::new();
        let nested: bool = outer.alter(|value| {
            *value = 7;
            assert!(inner.check(|other| assert_eq!(*other, 0)));
        });
        assert!(nested);
        assert_eq!(outer.state().mode, Mode::Idle);
        assert_eq!(inner.state().mode, Mode::Idle);
    }
}
