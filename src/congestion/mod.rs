pub mod aimd;
pub mod fixed;
pub mod tracing;

use std::{str::FromStr, time::Instant};

use crate::{
    constants::DEFAULT_SYN_INTERVAL, error::Error, params::CongestionParameters, seq_nr::SeqNr,
};

use self::aimd::Aimd;
use self::tracing::TracingController;

/// A congestion control law driven by the events a UDT-style connection
/// observes. Implementations never touch the wire: they read link
/// measurements from [`CongestionParameters`] and write pacing decisions
/// back through its setters.
///
/// All defaults are no-ops, so a custom law only overrides the events it
/// cares about.
#[allow(unused_variables)]
pub trait CongestionController: Send + core::fmt::Debug {
    /// Called once after the handshake, before any event. `now` anchors the
    /// controller's internal timers.
    fn init(&mut self, params: &mut CongestionParameters, now: Instant) {}

    /// Final bookkeeping before the connection goes away. No events follow.
    fn close(&mut self, params: &CongestionParameters) {}

    /// A cumulative acknowledgment up to and including `ack_nr`.
    fn on_ack(&mut self, params: &mut CongestionParameters, ack_nr: SeqNr, now: Instant) {}

    /// A loss report for the inclusive range `range_start..=range_end`.
    fn on_loss(
        &mut self,
        params: &mut CongestionParameters,
        range_start: SeqNr,
        range_end: SeqNr,
        now: Instant,
    ) {
    }

    /// The retransmission timer fired without an intervening ACK.
    fn on_timeout(&mut self, params: &mut CongestionParameters, now: Instant) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CongestionAlgorithm {
    /// UDT's native control law: slow start, then rate-based AIMD.
    #[default]
    Aimd,
}

impl FromStr for CongestionAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("aimd") || s.eq_ignore_ascii_case("udt") {
            Ok(CongestionAlgorithm::Aimd)
        } else {
            Err(Error::UnknownAlgorithm(s.to_owned()))
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CongestionConfig {
    pub algorithm: CongestionAlgorithm,
    /// Wrap the controller to log pacing transitions.
    pub tracing: bool,
}

impl CongestionConfig {
    pub fn create(&self) -> Box<dyn CongestionController> {
        ::tracing::debug!(algorithm = ?self.algorithm, tracing = self.tracing, "creating congestion controller");
        match (self.algorithm, self.tracing) {
            (CongestionAlgorithm::Aimd, false) => Box::new(Aimd::new()),
            (CongestionAlgorithm::Aimd, true) => Box::new(TracingController::new(Aimd::new())),
        }
    }

    /// The tick period every controller created from this config assumes
    /// unless the engine overrides it.
    pub fn syn_interval() -> std::time::Duration {
        DEFAULT_SYN_INTERVAL
    }
}
