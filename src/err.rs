use displaydoc::Display;

use crate::guard::Goal;
use crate::mode::Mode;

/// Tried to decode {0} as a guard mode, but it does not correlate to a valid mode.
#[derive(Debug, Display, Eq, PartialEq)]
pub struct OutOfBoundsModeError(pub(crate) u32);

/// A broken invariant of the toolkit. These are programming errors, not runtime
/// conditions: every one of them means some component held access it could not
/// return or released access it did not hold. They are routed through [abend]
/// rather than propagated.
#[derive(Debug, Display, Eq, PartialEq)]
pub enum FatalError {
    /** A guard could not reach goal {goal} within {timeout_ms} ms after
       finishing an access; the guard reported mode {mode}.
    */
    ReleaseDeadlineExceeded {
        /// The release goal that kept being rejected.
        goal: Goal,
        /// The mode observed when the deadline elapsed.
        mode: Mode,
        /// The length of the recovery window.
        timeout_ms: u64,
    },

    /** Logical process `{process}` found its vacancy flag already released
       while finishing a step.
    */
    VacancyViolated {
        /// Name of the offending process.
        process: String,
    },
}

/// Emit a diagnostic for a broken invariant and terminate the process.
///
/// A panic would take down only the offending worker thread; the rest of the
/// staff would keep running over state that can no longer be trusted.
pub(crate) fn abend(error: FatalError) -> ! {
    tracing::error!("fatal invariant violation: {error}");
    std::process::abort();
}
