//! # Fluid
//!
//! A small toolkit of cooperative, non-blocking concurrency primitives: a
//! deadlock-avoiding shared-data guard implemented as a single-word atomic
//! finite state machine, and a scheduler built on top of it that lets a fixed
//! pool of worker threads race to advance a fixed set of logical processes
//! without ever blocking.
//!
//! Every entry into and exit out of a [Fluid]'s value is try-only: on
//! contention the caller is told "not now" instead of being parked. The
//! [Staff] turns that answer into scheduling: a worker whose pick was busy or
//! contended immediately moves on to another random process. Nothing in the
//! core ever sleeps, parks or waits on a queue, which makes deadlock
//! structurally impossible and gives the pool its progress guarantee.
//!
//! # Usage
//! ## Example
//! ```edition2021
//! use fluid::{Fluid, Log, LogicalProcess, Staff};
//! use std::sync::Arc;
//!
//! // A shared value behind a guard. Reads and writes are bracketed callbacks.
//! let counters: Arc<Fluid<Vec<u64>>> = Arc::new(Fluid::new());
//! assert!(counters.alter(|values| values.resize(8, 0)));
//!
//! // Two logical processes over the same fluid: one writes, one reads.
//! let writer: Arc<LogicalProcess> = {
//!     let counters = counters.clone();
//!     Arc::new(LogicalProcess::new("writer", move |_log: &Log| {
//!         counters.alter(|values| values[3] += 1)
//!     }))
//! };
//! let reader: Arc<LogicalProcess> = {
//!     let counters = counters.clone();
//!     Arc::new(LogicalProcess::new("reader", move |_log: &Log| {
//!         counters.check(|values| {
//!             let _ = values[3];
//!         })
//!     }))
//! };
//!
//! // Two worker threads race to advance whichever process is vacant.
//! let mut staff: Staff<2> = Staff::new(vec![writer.clone(), reader.clone()]);
//! staff.start();
//! writer.start();
//! reader.start();
//!
//! std::thread::sleep(std::time::Duration::from_millis(50));
//!
//! writer.stop();
//! reader.stop();
//! staff.stop();
//!
//! assert!(writer.statistics().executed() > 0);
//! ```
//!
//! ## Details
//! A [Guard] packs its whole state, a coarse [Mode] plus the number of
//! active readers, into one atomic word and advances it along a constant
//! transition table, one compare-and-swap at a time. [Guard::run] drives the
//! word toward one of four [Goal]s and reports `false` the instant the table
//! has no edge for the current mode, so no caller is ever parked. A writer
//! arriving while readers are active claims the pending write (moving the
//! mode to a finishing state that rejects new readers) but does not wait for
//! the drain; its caller retries later or does something else.
//!
//! [Fluid] pairs a guard with an owned value and exposes the two brackets
//! [alter](Fluid::alter) and [check](Fluid::check). [LogicalProcess] wraps a
//! step function with an activity flag, a one-word vacancy claim and outcome
//! counters. [Staff] owns the worker threads.
//!
//! [render_transition_graph] and [table_summary] render the transition table
//! itself, so the documentation of the state machine is generated from the
//! same data the runtime executes.
//!
//! # Limitations
//! There is no fairness guarantee between readers and writers, no queueing of
//! rejected callers and no priority handling. At most two read sessions are
//! active on one guard at a time (a third begin-read finds no edge), and a
//! step that holds a write access for a long time starves every other access
//! to the same fluid for exactly that long; steps are expected to be short.
#![warn(missing_debug_implementations, missing_docs)]

mod err;
mod fluid;
mod graph;
mod guard;
mod log;
mod mode;
mod process;
mod staff;
mod sync;
mod types;

pub use err::{FatalError, OutOfBoundsModeError};
pub use fluid::Fluid;
pub use graph::{render_transition_graph, table_summary, write_transition_graphs, Highlight};
pub use guard::{Goal, Guard, DEFAULT_READER_LIMIT};
pub use log::Log;
pub use mode::Mode;
pub use process::{LogicalProcess, Outcome, Statistics};
pub use staff::Staff;
pub use types::Unpacked;
