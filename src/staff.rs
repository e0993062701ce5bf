use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::log::Log;
use crate::process::{LogicalProcess, Statistics};
use crate::sync::{thread, Arc, AtomicBool, Ordering};

/// Single-letter labels handed out to members in creation order.
const MEMBER_LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Termination handshake shared between a member and its thread.
struct MemberFlags {
    terminate: AtomicBool,
    terminated: AtomicBool,
}

/// One worker thread of the staff.
struct Member {
    label: char,
    flags: Arc<MemberFlags>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Member {
    fn new(label: char) -> Self {
        Self {
            label,
            flags: Arc::new(MemberFlags {
                terminate: AtomicBool::new(false),
                terminated: AtomicBool::new(true),
            }),
            handle: None,
        }
    }

    fn live(&self) -> bool {
        !self.flags.terminated.load(Ordering::Acquire)
    }
}

/// A fixed set of `STAFF` worker threads racing to advance a shared set of
/// [logical processes](LogicalProcess).
///
/// Each member repeatedly picks a uniformly random process and tries to run
/// one step of it. A process that is inactive, already claimed, or whose step
/// cannot make progress costs the member nothing but the dispatch: there is no
/// queue, no lock and no waiting anywhere on the path, so the only way for the
/// staff to stall is for every active process to be simultaneously occupied,
/// a transient condition. Fairness is probabilistic; with at least one active
/// process, starvation is impossible in expectation.
///
/// Members are created inactive. [start](Self::start) spawns the threads,
/// [stop](Self::stop) requests termination and joins them; dropping the staff
/// stops it.
pub struct Staff<const STAFF: usize> {
    processes: Arc<[Arc<LogicalProcess>]>,
    members: Vec<Member>,
}

impl<const STAFF: usize> core::fmt::Debug for Staff<STAFF> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let labels: Vec<char> = self.members.iter().map(|member| member.label).collect();
        f.debug_struct("Staff")
            .field("members", &labels)
            .field("processes", &self.processes.len())
            .finish()
    }
}

impl<const STAFF: usize> Staff<STAFF> {
    /// Create a staff over the shared process list. The list is frozen for
    /// the lifetime of the pool; processes are activated and deactivated
    /// individually through their own `start`/`stop`.
    pub fn new(processes: Vec<Arc<LogicalProcess>>) -> Self {
        assert!(
            STAFF <= MEMBER_LABELS.len(),
            "a staff is limited to {} single-letter members",
            MEMBER_LABELS.len()
        );
        Self {
            processes: processes.into(),
            members: (0..STAFF)
                .map(|i| Member::new(MEMBER_LABELS[i] as char))
                .collect(),
        }
    }

    /// Spawn every member thread.
    pub fn start(&mut self) {
        for member in &mut self.members {
            if member.handle.is_some() {
                continue;
            }
            member.flags.terminate.store(false, Ordering::Release);
            let processes: Arc<[Arc<LogicalProcess>]> = self.processes.clone();
            let flags: Arc<MemberFlags> = member.flags.clone();
            let label: char = member.label;
            member.handle = Some(thread::spawn(move || member_loop(label, &processes, &flags)));
        }
    }

    /// Request every member to terminate, wait until all of them report
    /// termination, then join the threads.
    pub fn stop(&mut self) {
        for member in &self.members {
            member.flags.terminate.store(true, Ordering::Release);
        }
        while self.members.iter().any(Member::live) {
            thread::yield_now();
        }
        for member in &mut self.members {
            if let Some(handle) = member.handle.take() {
                let _ = handle.join();
            }
        }
    }
}

impl<const STAFF: usize> Drop for Staff<STAFF> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The per-member loop: pick a random process, run one step, account for the
/// outcome. No sleep and no yield between iterations; the vacancy flags, the
/// guards' try-only contract and the random pick keep the loop from camping
/// on a single hot process.
fn member_loop(label: char, processes: &[Arc<LogicalProcess>], flags: &MemberFlags) {
    let log: Log = Log::new(label.to_string());
    flags.terminated.store(false, Ordering::Release);

    let branches: usize = processes.len();
    if branches == 0 {
        log.vital("staff member started with no logical processes");
        flags.terminated.store(true, Ordering::Release);
        return;
    }

    let mut random: StdRng = StdRng::from_entropy();
    let uniform: Uniform<usize> = Uniform::from(0..branches);
    let stat: Statistics = Statistics::new();

    log.vital(format!("staff member started, {branches} branches"));
    while !flags.terminate.load(Ordering::Acquire) {
        stat.record(processes[uniform.sample(&mut random)].process(&log));
    }

    stat.expose(&log, &format!("Thread `{label}` statistics:"));
    flags.terminated.store(true, Ordering::Release);
}

#[cfg(all(test, not(loom), not(feature = "shuttle")))]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use test_log::test;

    use super::Staff;
    use crate::process::{LogicalProcess, Outcome};

    #[test]
    fn test_stop_before_start_is_a_no_op() {
        let mut staff: Staff<2> = Staff::new(Vec::new());
        staff.stop();
    }

    #[test]
    fn test_staff_without_processes_starts_and_stops() {
        let mut staff: Staff<1> = Staff::new(Vec::new());
        staff.start();
        staff.stop();
    }

    #[test]
    fn test_members_advance_an_active_process() {
        let process: Arc<LogicalProcess> = Arc::new(LogicalProcess::new("p", |_| true));
        let mut staff: Staff<2> = Staff::new(vec![process.clone()]);

        staff.start();
        process.start();
        std::thread::sleep(Duration::from_millis(50));
        process.stop();
        staff.stop();

        assert!(process.statistics().count(Outcome::Done) > 0);
        assert_eq!(process.statistics().count(Outcome::Fail), 0);
    }

    #[test]
    fn test_members_leave_inactive_processes_alone() {
        let process: Arc<LogicalProcess> = Arc::new(LogicalProcess::new("p", |_| {
            panic!("an inactive process must not be stepped")
        }));
        let mut staff: Staff<1> = Staff::new(vec![process.clone()]);

        staff.start();
        std::thread::sleep(Duration::from_millis(20));
        staff.stop();

        assert_eq!(process.statistics().executed(), 0);
        assert!(process.statistics().count(Outcome::Idle) > 0);
    }
}
