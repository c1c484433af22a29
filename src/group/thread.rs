//! Shared-memory task group over threads
//!
//! Runs a whole group inside one process, one task per thread. Barrier and
//! reductions are both built on a single generation-counted all-gather: every
//! member deposits a raw `u64`, the last arrival publishes the full slot
//! vector and bumps the generation, and everyone folds the published values
//! locally. A barrier is an all-gather whose values are ignored.
//!
//! Floating-point reductions ride on the same gather by passing bit patterns
//! through `f64::to_bits`/`from_bits`; every member folds the identical slot
//! vector, so every member computes the identical result.

use super::{fold_f64, fold_u64, ReduceOp, TaskGroup};
use std::sync::{Arc, Condvar, Mutex};

struct GatherState {
    /// Bumped each time a gather completes; waiters key off it
    generation: u64,
    /// Members that have deposited a value this round
    arrived: usize,
    /// Deposit slots, indexed by ordinal
    slots: Vec<u64>,
    /// Slot snapshot from the last completed round
    published: Vec<u64>,
}

struct Shared {
    state: Mutex<GatherState>,
    cv: Condvar,
}

/// One member of a shared-memory group
///
/// Created in bulk by [`ThreadGroup::members`]; each member is moved onto its
/// own thread and carries its ordinal plus a handle to the shared rendezvous
/// state.
pub struct ThreadGroup {
    ordinal: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl ThreadGroup {
    /// Create all members of a group of the given size
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn members(size: usize) -> Vec<ThreadGroup> {
        assert!(size > 0, "group size must be at least 1");

        let shared = Arc::new(Shared {
            state: Mutex::new(GatherState {
                generation: 0,
                arrived: 0,
                slots: vec![0; size],
                published: vec![0; size],
            }),
            cv: Condvar::new(),
        });

        (0..size)
            .map(|ordinal| ThreadGroup {
                ordinal,
                size,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    /// All-gather one value per member; returns every member's value
    fn gather(&self, value: u64) -> Vec<u64> {
        let mut state = self.shared.state.lock().unwrap();
        let generation = state.generation;

        let ordinal = self.ordinal;
        state.slots[ordinal] = value;
        state.arrived += 1;

        if state.arrived == self.size {
            state.published = state.slots.clone();
            state.arrived = 0;
            state.generation += 1;
            self.shared.cv.notify_all();
            state.published.clone()
        } else {
            while state.generation == generation {
                state = self.shared.cv.wait(state).unwrap();
            }
            state.published.clone()
        }
    }
}

impl TaskGroup for ThreadGroup {
    fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        self.gather(0);
    }

    fn reduce_u64(&self, value: u64, op: ReduceOp) -> u64 {
        fold_u64(&self.gather(value), op)
    }

    fn reduce_f64(&self, value: f64, op: ReduceOp) -> f64 {
        let bits = self.gather(value.to_bits());
        let values: Vec<f64> = bits.into_iter().map(f64::from_bits).collect();
        fold_f64(&values, op)
    }
}
