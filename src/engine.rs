use std::time::{Duration, Instant};

use tracing::debug;

use crate::{
    congestion::{CongestionConfig, CongestionController},
    error::{Error, Result},
    metrics::METRICS,
    params::CongestionParameters,
    seq_nr::SeqNr,
};

/// Event totals kept by the engine for the life of one connection.
#[derive(Debug, Default, Clone)]
pub struct ControlStats {
    /// ACK events processed, stale ones included.
    pub acks: u64,
    /// Packets newly acknowledged, summed over all ACK events.
    pub packets_acked: u64,
    /// Loss ranges reported.
    pub loss_ranges: u64,
    /// Packets covered by the reported loss ranges.
    pub packets_lost: u64,
    /// Retransmission timeouts.
    pub timeouts: u64,
}

/// The connection-facing surface of congestion control.
///
/// Owns the shared parameter block and one controller, created per
/// connection and never shared. The connection pushes link measurements and
/// events in, and reads `packet_send_period` / `congestion_window_size` back
/// before each transmission opportunity. The controller-facing setters on
/// [`CongestionParameters`] are reachable only inside event callbacks, so
/// holding an engine cannot corrupt the control law's outputs.
///
/// Call [`CongestionEngine::init`] once after the handshake, feed events from
/// a single task, and finish with [`CongestionEngine::close`].
#[derive(Debug)]
pub struct CongestionEngine {
    params: CongestionParameters,
    controller: Box<dyn CongestionController>,
    stats: ControlStats,
    /// High-water cumulative ACK, for the newly-acked accounting.
    last_ack: SeqNr,
}

impl CongestionEngine {
    pub fn new(config: &CongestionConfig) -> Self {
        Self {
            params: CongestionParameters::new(CongestionConfig::syn_interval()),
            controller: config.create(),
            stats: ControlStats::default(),
            last_ack: SeqNr::default(),
        }
    }

    /// Like [`CongestionEngine::new`] with a non-default control-loop tick.
    pub fn with_syn_interval(config: &CongestionConfig, syn_interval: Duration) -> Result<Self> {
        if syn_interval.is_zero() {
            return Err(Error::ZeroSynInterval);
        }
        Ok(Self {
            params: CongestionParameters::new(syn_interval),
            controller: config.create(),
            stats: ControlStats::default(),
            last_ack: SeqNr::default(),
        })
    }

    /// Runs a caller-supplied control law instead of one of the built-in
    /// algorithms. The controller must be freshly constructed; it is bound to
    /// this engine for good.
    pub fn with_controller(
        controller: Box<dyn CongestionController>,
        syn_interval: Duration,
    ) -> Result<Self> {
        if syn_interval.is_zero() {
            return Err(Error::ZeroSynInterval);
        }
        Ok(Self {
            params: CongestionParameters::new(syn_interval),
            controller,
            stats: ControlStats::default(),
            last_ack: SeqNr::default(),
        })
    }

    /// Starts the control law. Call once, after the handshake and after the
    /// first measured inputs (if any) have been set.
    pub fn init(&mut self, now: Instant) {
        self.last_ack = self.params.send_current_seq_nr();
        self.controller.init(&mut self.params, now);
    }

    /// Logs terminal statistics. No events may follow.
    pub fn close(&mut self) {
        self.controller.close(&self.params);
        debug!(
            stats = ?self.stats,
            controller = ?self.controller,
            period = self.params.packet_send_period(),
            window = self.params.congestion_window_size(),
            "congestion engine closed"
        );
    }

    /// A cumulative acknowledgment up to and including `ack_nr`.
    pub fn on_ack(&mut self, ack_nr: SeqNr, now: Instant) {
        METRICS.acks.increment(1);
        self.stats.acks += 1;
        let newly_acked = ack_nr - self.last_ack;
        if newly_acked > 0 {
            self.stats.packets_acked += newly_acked as u64;
            self.last_ack = ack_nr;
        }
        self.controller.on_ack(&mut self.params, ack_nr, now);
    }

    /// A loss report for the inclusive range `range_start..=range_end`.
    pub fn on_loss(&mut self, range_start: SeqNr, range_end: SeqNr, now: Instant) {
        METRICS.loss_ranges.increment(1);
        self.stats.loss_ranges += 1;
        let span = range_end - range_start;
        if span >= 0 {
            self.stats.packets_lost += span as u64 + 1;
        }
        self.controller
            .on_loss(&mut self.params, range_start, range_end, now);
    }

    /// The connection's retransmission timer fired with no intervening ACK.
    pub fn on_timeout(&mut self, now: Instant) {
        METRICS.timeouts.increment(1);
        self.stats.timeouts += 1;
        self.controller.on_timeout(&mut self.params, now);
    }

    // Measured inputs, pushed by the connection as its estimators update.

    pub fn set_bandwidth_estimate(&mut self, packets_per_second: u32) {
        self.params.set_bandwidth_estimate(packets_per_second);
    }

    pub fn set_receive_rate(&mut self, packets_per_second: u32) {
        self.params.set_receive_rate(packets_per_second);
    }

    pub fn set_round_trip_time(&mut self, rtt: Duration) {
        self.params.set_round_trip_time(rtt);
    }

    pub fn set_max_segment_size(&mut self, bytes: u32) {
        self.params.set_max_segment_size(bytes);
    }

    pub fn set_send_current_seq_nr(&mut self, seq_nr: SeqNr) {
        self.params.set_send_current_seq_nr(seq_nr);
    }

    // Control outputs, read by the send path.

    /// Gap to enforce between consecutive sends, in microseconds.
    pub fn packet_send_period(&self) -> f64 {
        self.params.packet_send_period()
    }

    /// [`CongestionEngine::packet_send_period`] as a [`Duration`].
    pub fn send_interval(&self) -> Duration {
        Duration::from_secs_f64(self.params.packet_send_period() / 1_000_000.)
    }

    /// Packets allowed in flight.
    pub fn congestion_window_size(&self) -> f64 {
        self.params.congestion_window_size()
    }

    pub fn max_congestion_window_size(&self) -> f64 {
        self.params.max_congestion_window_size()
    }

    pub fn ack_timer_period(&self) -> Duration {
        self.params.ack_timer_period()
    }

    pub fn ack_packet_interval(&self) -> u32 {
        self.params.ack_packet_interval()
    }

    pub fn retransmit_timeout(&self) -> Option<Duration> {
        self.params.retransmit_timeout()
    }

    pub fn syn_interval(&self) -> Duration {
        self.params.syn_interval()
    }

    // Measured inputs, readable back.

    pub fn bandwidth_estimate(&self) -> u32 {
        self.params.bandwidth_estimate()
    }

    pub fn receive_rate(&self) -> u32 {
        self.params.receive_rate()
    }

    /// Smoothed RTT as last pushed, in microseconds.
    pub fn round_trip_time(&self) -> u32 {
        self.params.round_trip_time()
    }

    pub fn max_segment_size(&self) -> u32 {
        self.params.max_segment_size()
    }

    pub fn send_current_seq_nr(&self) -> SeqNr {
        self.params.send_current_seq_nr()
    }

    pub fn stats(&self) -> &ControlStats {
        &self.stats
    }
}
