use fluid::{Fluid, Mode};

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::Arc;
        pub(crate) use loom::thread;
    } else if #[cfg(feature = "shuttle")] {
        pub(crate) use shuttle::sync::Arc;
        pub(crate) use shuttle::thread;
    } else {
        pub(crate) use std::sync::Arc;
        pub(crate) use std::thread;
    }
}

/// Drive one writer and `READERS` readers over a single fluid for a handful
/// of attempts each, then assert the quiescent invariants: the guard settled
/// back to idle and the value saw every successful write.
pub(crate) fn fluid_contention_test<const READERS: usize>(attempts: usize) {
    let fluid: Arc<Fluid<usize>> = Arc::new(Fluid::new());

    let reader_handles: Vec<thread::JoinHandle<usize>> = (0..READERS)
        .map(|_| {
            let fluid: Arc<Fluid<usize>> = fluid.clone();
            thread::spawn(move || {
                let mut successes: usize = 0;
                for _ in 0..attempts {
                    let mut observed: usize = 0;
                    if fluid.check(|value| observed = *value) {
                        successes += 1;
                        assert!(observed <= attempts);
                    }
                }
                successes
            })
        })
        .collect();

    let mut writes: usize = 0;
    for _ in 0..attempts {
        if fluid.alter(|value| *value += 1) {
            writes += 1;
        }
    }

    for handle in reader_handles {
        handle.join().expect("a reader thread panicked");
    }

    let state = fluid.state();
    assert_eq!(state.mode, Mode::Idle);
    assert_eq!(state.readers, 0);

    let mut settled: usize = 0;
    assert!(fluid.check(|value| settled = *value));
    assert_eq!(settled, writes);
}
