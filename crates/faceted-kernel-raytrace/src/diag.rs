//! Rate-limited shot-time diagnostics.
//!
//! Every anomaly is counted; only the first few of each kind are logged so
//! a large trace over bad geometry does not flood the output. The counters
//! are process-wide and shared by all threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Default number of occurrences of each anomaly that get logged.
pub const DEFAULT_LOG_LIMIT: usize = 6;

/// Kinds of recoverable anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anomaly {
    /// A ray produced more hits than the primitive's cap.
    HitCapExceeded,
    /// A solid produced an odd number of hits.
    OddHits,
    /// A synthetic hit was inserted to restore entry/exit alternation.
    FictitiousHit,
    /// A trailing unpaired hit was discarded.
    DroppedHit,
    /// A surface parameter came out negative.
    NegativeUv,
    /// A facet was rejected at prep.
    DegenerateFacet,
}

impl Anomaly {
    const COUNT: usize = 6;

    fn slot(self) -> usize {
        self as usize
    }
}

/// Counters for every [`Anomaly`] kind.
#[derive(Debug)]
pub struct Diagnostics {
    counts: [AtomicUsize; Anomaly::COUNT],
    log_limit: AtomicUsize,
}

impl Diagnostics {
    /// Fresh counters with the default log limit.
    pub fn new() -> Self {
        Self {
            counts: Default::default(),
            log_limit: AtomicUsize::new(DEFAULT_LOG_LIMIT),
        }
    }

    /// Count one occurrence. Returns true when it should be logged.
    pub fn record(&self, kind: Anomaly) -> bool {
        let prev = self.counts[kind.slot()].fetch_add(1, Ordering::Relaxed);
        prev < self.log_limit.load(Ordering::Relaxed)
    }

    /// Occurrences of `kind` since the last reset.
    pub fn count(&self, kind: Anomaly) -> usize {
        self.counts[kind.slot()].load(Ordering::Relaxed)
    }

    /// Change how many occurrences of each kind are logged.
    pub fn set_log_limit(&self, limit: usize) {
        self.log_limit.store(limit, Ordering::Relaxed);
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for c in &self.counts {
            c.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

static DIAGNOSTICS: OnceLock<Diagnostics> = OnceLock::new();

/// The process-wide counters.
pub fn diagnostics() -> &'static Diagnostics {
    DIAGNOSTICS.get_or_init(Diagnostics::new)
}

/// Zero the process-wide counters.
pub fn reset_diagnostics() {
    diagnostics().reset();
}

/// Count an anomaly on the process-wide counters.
pub(crate) fn note(kind: Anomaly) -> bool {
    diagnostics().record(kind)
}
