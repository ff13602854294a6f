//! Alignment DP uses i for the first series (rows) and j for the second
//! (columns).

pub mod orchestrator;
pub mod partition;
pub mod recurrence;
pub mod traceback;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use orchestrator::{Aligner, Alignment};
pub use partition::{compute_region, plan_regions, precompute, CostContext, Region};
pub use recurrence::{score_streaming, Predecessor, PredecessorGrid, Recurrence};
pub use traceback::{traceback, WarpPath};


/// Progress of a single alignment call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignStage {
    Idle,
    AnchorsBuilt,
    MatricesAllocated,
    CostsReady,
    RecurrenceComplete,
    Scored,
}

/// Cooperative cancellation flag shared with cost precomputation workers.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
