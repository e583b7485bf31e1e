// UDT's native control law (Gu & Grossman, "UDT: UDP-based data transfer for
// high-speed wide area networks"): window-driven slow start, then rate-based
// additive increase with randomized multiplicative decrease.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, trace};

use crate::{
    constants::{INITIAL_CONGESTION_WINDOW, MIN_CONGESTION_WINDOW},
    metrics::METRICS,
    params::CongestionParameters,
    seq_nr::SeqNr,
};

use super::CongestionController;

// Floor for the per-tick rate increase, in packets per tick.
const MIN_RATE_INCREASE: f64 = 0.01;
// Scaling constant of UDT's bandwidth-probing increase formula.
const DAIMD_BETA: f64 = 0.000_001_5;
const BITS_PER_BYTE: f64 = 8.0;

// The send period grows by this factor each time a decrease is applied; the
// pacing counterpart of halving the window.
const DECREASE_PERIOD_FACTOR: f64 = 2.0;

// At most this many decreases are applied within one congestion epoch.
const MAX_DECREASES_PER_EPOCH: u32 = 5;

// EWMA weight when folding a finished epoch's NAK count into the average.
const NAK_EWMA_ALPHA: f64 = 0.125;

// Headroom in packets added on top of the receive-rate window ceiling.
const CEILING_SLACK_PACKETS: f64 = 16.0;

/// UDT's slow-start + AIMD controller.
pub struct Aimd {
    slow_start: bool,
    /// Highest cumulative ACK seen; anything at or below it is stale.
    last_ack: SeqNr,
    /// ACK mark slow-start growth is measured from.
    slow_start_last_ack: SeqNr,
    /// A loss or timeout happened since the last rate-adjustment tick.
    loss_since_last_tick: bool,
    /// Highest sequence number sent when the last decrease was applied. Loss
    /// ranges ending at or before this belong to an already-penalized episode.
    last_decrease_max_seq: SeqNr,
    /// Send period captured right before the last decrease was applied.
    last_decrease_period: f64,
    /// NAK events seen in the current congestion epoch.
    nak_count: u32,
    /// Only every this-many-th NAK within an epoch triggers a decrease.
    decrease_random_threshold: u32,
    /// EWMA of NAK counts over past epochs.
    avg_nak_count: u32,
    /// Decreases applied in the current epoch.
    decrease_count: u32,
    last_rate_adjustment: Instant,
}

impl Aimd {
    pub fn new() -> Self {
        Self {
            slow_start: true,
            last_ack: SeqNr::default(),
            slow_start_last_ack: SeqNr::default(),
            loss_since_last_tick: false,
            last_decrease_max_seq: SeqNr::default(),
            last_decrease_period: 1.0,
            nak_count: 0,
            decrease_random_threshold: 1,
            avg_nak_count: 0,
            decrease_count: 0,
            // Placeholder until init() anchors the timer.
            last_rate_adjustment: Instant::now(),
        }
    }

    fn rtt_and_tick_us(params: &CongestionParameters) -> f64 {
        params.round_trip_time() as f64 + params.syn_interval_us() as f64
    }

    /// Leaves slow start for good. The send period is pinned to the measured
    /// receive rate when one exists, else derived from the current window.
    fn stop_slow_start(&mut self, params: &mut CongestionParameters) {
        self.slow_start = false;
        METRICS.slow_start_exits.increment(1);

        let receive_rate = params.receive_rate();
        if receive_rate > 0 {
            params.set_packet_send_period(1_000_000. / receive_rate as f64);
        } else {
            // No arrival-rate report yet: pace the current window over one
            // RTT plus a tick.
            params.set_packet_send_period(
                Self::rtt_and_tick_us(params) / params.congestion_window_size(),
            );
        }
        debug!(
            period = params.packet_send_period(),
            window = params.congestion_window_size(),
            "slow start over"
        );
    }

    fn reroll_decrease_threshold(&mut self) {
        // The threshold tracks recent NAK density per epoch.
        let bound = self.avg_nak_count.max(1);
        self.decrease_random_threshold = rand::rng().random_range(1..=bound);
    }

    /// Folds the finished epoch's NAK count into the running average.
    fn roll_epoch(&mut self) {
        self.avg_nak_count = (self.avg_nak_count as f64 * (1. - NAK_EWMA_ALPHA)
            + self.nak_count as f64 * NAK_EWMA_ALPHA)
            .ceil() as u32;
    }

    fn apply_decrease(&mut self, params: &mut CongestionParameters) {
        self.last_decrease_period = params.packet_send_period();

        params.set_congestion_window_size(params.congestion_window_size() / 2.);
        params.set_packet_send_period(self.last_decrease_period * DECREASE_PERIOD_FACTOR);
        self.last_decrease_max_seq = params.send_current_seq_nr();
        self.reroll_decrease_threshold();

        METRICS.decreases.increment(1);
        trace!(
            window = params.congestion_window_size(),
            period = params.packet_send_period(),
            threshold = self.decrease_random_threshold,
            last_decrease_max_seq = %self.last_decrease_max_seq,
            "applied decrease"
        );
    }

    /// UDT's bandwidth-probing additive term: step size scales with the
    /// estimated headroom left on the link and flattens out near capacity.
    fn additive_increase(&mut self, params: &mut CongestionParameters) {
        let period = params.packet_send_period();
        let syn = params.syn_interval_us() as f64;
        let bandwidth = params.bandwidth_estimate() as f64;
        let mss = params.max_segment_size() as f64;

        let current_rate = 1_000_000. / period;
        let mut headroom = bandwidth - current_rate;
        // While still recovering from a decrease, probe at most a ninth of
        // the estimated capacity.
        if period > self.last_decrease_period && headroom > bandwidth / 9. {
            headroom = bandwidth / 9.;
        }

        let inc = if headroom <= 0. || mss <= 0. {
            MIN_RATE_INCREASE
        } else {
            let step = 10f64.powf((headroom * mss * BITS_PER_BYTE).log10().ceil()) * DAIMD_BETA
                / mss;
            step.max(MIN_RATE_INCREASE)
        };

        params.set_packet_send_period(period * syn / (period * inc + syn));
        params.set_congestion_window_size(params.congestion_window_size() + inc);
    }

    /// Damped pull of the send period toward the receiver's link-capacity
    /// estimate.
    fn blend_toward_bandwidth(&mut self, params: &mut CongestionParameters) {
        let bandwidth = params.bandwidth_estimate();
        if bandwidth == 0 {
            return;
        }
        let target = 1_000_000. / bandwidth as f64;
        params.set_packet_send_period((params.packet_send_period() * 7. + target) / 8.);
    }
}

impl Default for Aimd {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Aimd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "aimd:slow_start={},naks={}/{}(avg {}),decreases={}",
            self.slow_start,
            self.nak_count,
            self.decrease_random_threshold,
            self.avg_nak_count,
            self.decrease_count
        )
    }
}

impl CongestionController for Aimd {
    fn init(&mut self, params: &mut CongestionParameters, now: Instant) {
        self.slow_start = true;
        self.last_ack = params.send_current_seq_nr();
        self.slow_start_last_ack = self.last_ack;
        self.loss_since_last_tick = false;
        self.last_decrease_max_seq = params.send_current_seq_nr();
        self.last_decrease_period = 1.0;
        self.nak_count = 0;
        self.decrease_random_threshold = 1;
        self.avg_nak_count = 0;
        self.decrease_count = 0;
        self.last_rate_adjustment = now;

        params.set_congestion_window_size(INITIAL_CONGESTION_WINDOW);
        let bandwidth = params.bandwidth_estimate();
        if bandwidth > 0 {
            params.set_packet_send_period(
                1_000_000. / (INITIAL_CONGESTION_WINDOW * bandwidth as f64),
            );
        } else {
            // No estimate yet: spread the initial window over one tick.
            params.set_packet_send_period(
                params.syn_interval_us() as f64 / INITIAL_CONGESTION_WINDOW,
            );
        }
        // Periodic ACKs once per tick; no packet-count-driven ACKs.
        params.set_ack_timer(params.syn_interval_us());

        debug!(
            window = params.congestion_window_size(),
            period = params.packet_send_period(),
            "initialized"
        );
    }

    fn close(&mut self, params: &CongestionParameters) {
        debug!(
            period = params.packet_send_period(),
            window = params.congestion_window_size(),
            slow_start = self.slow_start,
            avg_nak_count = self.avg_nak_count,
            "closing"
        );
    }

    fn on_ack(&mut self, params: &mut CongestionParameters, ack_nr: SeqNr, now: Instant) {
        // A cumulative ACK that does not advance carries no new information.
        if ack_nr - self.last_ack <= 0 {
            METRICS.stale_acks.increment(1);
            return;
        }
        self.last_ack = ack_nr;

        // Rate adjustments run at most once per SYN interval.
        let syn = Duration::from_micros(params.syn_interval_us() as u64);
        if now.duration_since(self.last_rate_adjustment) < syn {
            return;
        }
        self.last_rate_adjustment = now;

        // The window ceiling tracks the latest arrival-rate report: what the
        // receiver absorbs in one RTT plus one tick, with some slack.
        let receive_rate = params.receive_rate();
        if receive_rate > 0 {
            let ceiling = receive_rate as f64 / 1_000_000. * Self::rtt_and_tick_us(params)
                + CEILING_SLACK_PACKETS;
            params.set_max_congestion_window_size(ceiling);
        }

        if self.slow_start {
            let newly_acked = ack_nr - self.slow_start_last_ack;
            self.slow_start_last_ack = ack_nr;
            if newly_acked > 0 {
                let grown = params.congestion_window_size() + newly_acked as f64;
                let ceiling = params.max_congestion_window_size();
                if ceiling > 0. && grown > ceiling {
                    params.set_congestion_window_size(ceiling);
                    self.stop_slow_start(params);
                } else {
                    params.set_congestion_window_size(grown);
                }
            }
        }
        if self.slow_start {
            return;
        }

        // Congestion avoidance. A tick that saw loss only clears the flag;
        // growth resumes on the next clean tick.
        if self.loss_since_last_tick {
            self.loss_since_last_tick = false;
            return;
        }
        self.additive_increase(params);
        self.blend_toward_bandwidth(params);
    }

    fn on_loss(
        &mut self,
        params: &mut CongestionParameters,
        range_start: SeqNr,
        range_end: SeqNr,
        _now: Instant,
    ) {
        // Everything sent up to the last decrease has been penalized already.
        if range_end - self.last_decrease_max_seq <= 0 {
            METRICS.ignored_loss_ranges.increment(1);
            trace!(
                %range_start,
                %range_end,
                last_decrease_max_seq = %self.last_decrease_max_seq,
                "ignoring loss range from an already-penalized episode"
            );
            return;
        }

        if self.slow_start {
            self.stop_slow_start(params);
        }
        self.loss_since_last_tick = true;

        if range_start - self.last_decrease_max_seq > 0 {
            // Loss of data sent after the previous decrease opens a new
            // congestion epoch.
            self.roll_epoch();
            self.nak_count = 1;
            self.decrease_count = 1;
            self.apply_decrease(params);
        } else {
            // The range straddles the epoch boundary: count it, and only
            // decrease again at the randomized NAK cadence.
            self.nak_count += 1;
            if self.decrease_count < MAX_DECREASES_PER_EPOCH
                && self.nak_count % self.decrease_random_threshold == 0
            {
                self.decrease_count += 1;
                self.apply_decrease(params);
            } else {
                METRICS.suppressed_decreases.increment(1);
                trace!(
                    nak_count = self.nak_count,
                    threshold = self.decrease_random_threshold,
                    decrease_count = self.decrease_count,
                    "suppressed decrease"
                );
            }
        }
    }

    fn on_timeout(&mut self, params: &mut CongestionParameters, _now: Instant) {
        if self.slow_start {
            self.stop_slow_start(params);
        }
        self.loss_since_last_tick = true;

        // Harsher than a loss: collapse the window to its floor and halve
        // the rate, then start a fresh epoch.
        self.roll_epoch();
        self.nak_count = 0;
        self.decrease_count = 1;
        self.last_decrease_period = params.packet_send_period();
        params.set_congestion_window_size(MIN_CONGESTION_WINDOW);
        params.set_packet_send_period(self.last_decrease_period * DECREASE_PERIOD_FACTOR);
        self.last_decrease_max_seq = params.send_current_seq_nr();
        self.reroll_decrease_threshold();

        debug!(
            period = params.packet_send_period(),
            window = params.congestion_window_size(),
            "timeout, collapsed window"
        );
    }
}
