#![cfg(not(any(loom, feature = "shuttle")))]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use test_log::test;
use tracing::debug;

use fluid::{Fluid, Log, LogicalProcess, Outcome, Staff};

const CAPACITY: usize = 5;
const L: usize = 256;

struct Matrix {
    cells: Vec<f64>,
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            cells: vec![0.0; L * L],
        }
    }
}

/// A two-phase step over a shared pool of fluids: phase 0 scatters writes
/// into a random matrix, phase 1 averages a random sample of a random matrix.
/// A granted access advances the phase (weighted heavily toward reading); a
/// rejected access leaves the phase unchanged and reports no progress.
fn make_step(
    data: Arc<[Arc<Fluid<Matrix>>]>,
    inside: Arc<AtomicUsize>,
    overlaps: Arc<AtomicUsize>,
) -> impl Fn(&Log) -> bool + Send + Sync + 'static {
    let phase: AtomicUsize = AtomicUsize::new(0);
    move |_log: &Log| {
        if inside.fetch_add(1, Ordering::SeqCst) != 0 {
            overlaps.fetch_add(1, Ordering::SeqCst);
        }

        let mut random = rand::thread_rng();
        let target: usize = random.gen_range(0..CAPACITY);
        let advanced: bool = match phase.load(Ordering::Relaxed) {
            0 => data[target].alter(|m| {
                for _ in 0..500 {
                    let cell: usize = random.gen_range(0..L * L);
                    m.cells[cell] = random.gen_range(0.0..1.0);
                }
            }),
            _ => data[target].check(|m| {
                let mut avg: f64 = 0.0;
                for _ in 0..50 {
                    avg += m.cells[random.gen_range(0..L * L)];
                }
                let _ = avg / 50.0;
            }),
        };
        if advanced {
            let draw: u32 = random.gen_range(0..=100);
            phase.store(if draw == 0 { 0 } else { 1 }, Ordering::Relaxed);
        }

        inside.fetch_sub(1, Ordering::SeqCst);
        advanced
    }
}

#[test]
fn test_staff_smoke_run() {
    let data: Arc<[Arc<Fluid<Matrix>>]> = (0..CAPACITY)
        .map(|_| Arc::new(Fluid::new()))
        .collect::<Vec<Arc<Fluid<Matrix>>>>()
        .into();
    let overlaps: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));

    let processes: Vec<Arc<LogicalProcess>> = (0..10)
        .map(|i| {
            let inside: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
            Arc::new(LogicalProcess::new(
                format!("P{i}"),
                make_step(data.clone(), inside, overlaps.clone()),
            ))
        })
        .collect();

    let mut staff: Staff<2> = Staff::new(processes.clone());
    staff.start();
    for process in &processes {
        process.start();
        assert!(process.live());
    }

    thread::sleep(Duration::from_millis(250));

    for process in &processes {
        process.stop();
    }
    staff.stop();

    let log: Log = Log::new("staff_test");
    for process in &processes {
        process.info(&log);
    }

    // Every step ran under its process's vacancy claim.
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);

    let executed: usize = processes
        .iter()
        .map(|process| process.statistics().executed())
        .sum();
    let done: usize = processes
        .iter()
        .map(|process| process.statistics().count(Outcome::Done))
        .sum();
    debug!("executed {executed} steps, {done} with progress");
    assert!(executed > 0);
    assert!(done > 0);

    for fluid in data.iter() {
        assert_eq!(fluid.state().readers, 0);
    }
}
