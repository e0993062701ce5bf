use core::fmt::{Debug, Formatter};

use crate::err::{abend, FatalError};
use crate::log::Log;
use crate::sync::{AtomicBool, AtomicUsize, Ordering};

/// Classification of one [LogicalProcess::process] dispatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The process was not active.
    Idle = 0,
    /// Another worker was already running the process.
    Busy = 1,
    /// The step ran and reported progress.
    Done = 2,
    /// The step ran and reported no progress.
    Fail = 3,
}

/// The number of outcomes.
pub(crate) const OUTCOME_COUNT: usize = 4;

impl Outcome {
    const fn label(self) -> &'static str {
        match self {
            Outcome::Idle => "Idle",
            Outcome::Busy => "Busy",
            Outcome::Done => "Done",
            Outcome::Fail => "Fail",
        }
    }
}

/// Outcome counters for a logical process or a staff member.
pub struct Statistics {
    counts: [AtomicUsize; OUTCOME_COUNT],
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Statistics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self {
            counts: core::array::from_fn(|_| AtomicUsize::new(0)),
        }
    }

    /// Count one dispatch outcome.
    pub fn record(&self, outcome: Outcome) {
        self.counts[outcome as usize].fetch_add(1, Ordering::Relaxed);
    }

    /// The number of dispatches with the given outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.counts[outcome as usize].load(Ordering::Relaxed)
    }

    /// The number of dispatches that actually ran a step.
    pub fn executed(&self) -> usize {
        self.count(Outcome::Done) + self.count(Outcome::Fail)
    }

    /// Render the counters as a percentage breakdown through `log`.
    ///
    /// Each line narrows the population: the idle share of all dispatches,
    /// the busy share of dispatches that found the process active, and the
    /// done/fail split of dispatches that ran a step.
    pub fn expose(&self, log: &Log, header: &str) {
        let m: [usize; OUTCOME_COUNT] = core::array::from_fn(|i| self.counts[i].load(Ordering::Relaxed));
        let idle: usize = m[Outcome::Idle as usize];
        let busy: usize = m[Outcome::Busy as usize];
        let done: usize = m[Outcome::Done as usize];
        let fail: usize = m[Outcome::Fail as usize];

        log.vital(header);
        log.vital(format!(
            "  {}      {:6.2} %  {:10}",
            Outcome::Idle.label(),
            share(idle, idle + busy + done + fail),
            idle
        ));
        log.vital(format!(
            "    {}    {:6.2} %  {:10}",
            Outcome::Busy.label(),
            share(busy, busy + done + fail),
            busy
        ));
        log.vital(format!(
            "      {}  {:6.2} %  {:10}",
            Outcome::Done.label(),
            share(done, done + fail),
            done
        ));
        log.vital(format!(
            "      {}  {:6.2} %  {:10}",
            Outcome::Fail.label(),
            share(fail, done + fail),
            fail
        ));
    }
}

fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

impl Debug for Statistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Statistics")
            .field("idle", &self.count(Outcome::Idle))
            .field("busy", &self.count(Outcome::Busy))
            .field("done", &self.count(Outcome::Done))
            .field("fail", &self.count(Outcome::Fail))
            .finish()
    }
}

/// A step function wrapped into a process that any worker thread may advance.
///
/// A process is a unit of cooperative work: workers race to claim it, the
/// winner invokes exactly one step, and the losers immediately move on. The
/// claim is a single atomic flag, never a lock, so a worker is never parked on
/// a process someone else is running.
pub struct LogicalProcess {
    /// Process name, useful for logging.
    name: String,
    /// The step function. Reports `true` when it made progress.
    step: Box<dyn Fn(&Log) -> bool + Send + Sync>,
    /// Idle/active flag. Flipped by [start](Self::start)/[stop](Self::stop).
    active: AtomicBool,
    /// Busy/vacant flag. Claimed by the dispatching worker for one step.
    vacant: AtomicBool,
    stat: Statistics,
}

impl LogicalProcess {
    /// Wrap `step` into a process. The process starts inactive and vacant.
    pub fn new(name: impl Into<String>, step: impl Fn(&Log) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            step: Box::new(step),
            active: AtomicBool::new(false),
            vacant: AtomicBool::new(true),
            stat: Statistics::new(),
        }
    }

    /// Allow workers to run steps of this process.
    pub fn start(&self) {
        self.active.store(true, Ordering::Release);
    }

    /// Stop workers from running further steps of this process.
    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// The process name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the process is currently active.
    pub fn live(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// The process's outcome counters.
    pub fn statistics(&self) -> &Statistics {
        &self.stat
    }

    /// Render the process's counters through `log`.
    pub fn info(&self, log: &Log) {
        self.stat.expose(log, &format!("Process `{}` statistics:", self.name));
    }

    /// Try to run one step of this process.
    ///
    /// Never blocks: an inactive process reports [Outcome::Idle] and a process
    /// already claimed by another worker reports [Outcome::Busy], both
    /// immediately. Otherwise the step runs under the claim and its progress
    /// report becomes [Outcome::Done] or [Outcome::Fail].
    pub fn process(&self, log: &Log) -> Outcome {
        if !self.active.load(Ordering::Acquire) {
            self.stat.record(Outcome::Idle);
            return Outcome::Idle;
        }

        if self
            .vacant
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.stat.record(Outcome::Busy);
            return Outcome::Busy;
        }

        let outcome: Outcome = if (self.step)(log) {
            Outcome::Done
        } else {
            Outcome::Fail
        };
        self.stat.record(outcome);

        // The claim is still ours, so the flag must read as occupied.
        if self
            .vacant
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            abend(FatalError::VacancyViolated {
                process: self.name.clone(),
            });
        }
        outcome
    }
}

impl Debug for LogicalProcess {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LogicalProcess")
            .field("name", &self.name)
            .field("active", &self.active)
            .field("vacant", &self.vacant)
            .field("stat", &self.stat)
            .finish_non_exhaustive()
    }
}
