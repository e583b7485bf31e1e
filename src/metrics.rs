use lazy_static::lazy_static;

#[cfg(feature = "export-metrics")]
use metrics::{Counter, counter};

// Without the export-metrics feature, counters compile down to nothing and
// call sites stay unconditional.
#[cfg(not(feature = "export-metrics"))]
pub struct Counter;

#[cfg(not(feature = "export-metrics"))]
impl Counter {
    #[inline(always)]
    pub fn increment(&self, _value: u64) {}
}

pub struct Metrics {
    pub acks: Counter,
    pub stale_acks: Counter,
    pub loss_ranges: Counter,
    pub ignored_loss_ranges: Counter,
    pub decreases: Counter,
    pub suppressed_decreases: Counter,
    pub slow_start_exits: Counter,
    pub timeouts: Counter,
}

impl Metrics {
    #[cfg(feature = "export-metrics")]
    pub fn new() -> Self {
        Self {
            acks: counter!("udtcc_acks"),
            stale_acks: counter!("udtcc_stale_acks"),
            loss_ranges: counter!("udtcc_loss_ranges"),
            ignored_loss_ranges: counter!("udtcc_ignored_loss_ranges"),
            decreases: counter!("udtcc_decreases"),
            suppressed_decreases: counter!("udtcc_suppressed_decreases"),
            slow_start_exits: counter!("udtcc_slow_start_exits"),
            timeouts: counter!("udtcc_timeouts"),
        }
    }

    #[cfg(not(feature = "export-metrics"))]
    pub fn new() -> Self {
        Self {
            acks: Counter,
            stale_acks: Counter,
            loss_ranges: Counter,
            ignored_loss_ranges: Counter,
            decreases: Counter,
            suppressed_decreases: Counter,
            slow_start_exits: Counter,
            timeouts: Counter,
        }
    }
}

lazy_static! {
    pub static ref METRICS: Metrics = Metrics::new();
}
