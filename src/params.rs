use std::time::Duration;

use crate::{
    constants::{
        INITIAL_CONGESTION_WINDOW, MAX_PACKET_SEND_PERIOD, MIN_CONGESTION_WINDOW,
        MIN_PACKET_SEND_PERIOD,
    },
    seq_nr::SeqNr,
};

/// State shared between a connection and its congestion controller.
///
/// The connection pushes link measurements in through
/// [`crate::CongestionEngine`] and reads the pacing outputs back out.
/// Controllers get `&mut CongestionParameters` inside event callbacks and
/// use the clamping setters below, which uphold the pacing invariants no
/// matter what a control law computes. Single writer at a time; making
/// writes visible across threads is the connection layer's problem.
#[derive(Debug)]
pub struct CongestionParameters {
    packet_send_period: f64,
    congestion_window_size: f64,
    max_congestion_window_size: f64,
    bandwidth_estimate: u32,
    max_segment_size: u32,
    send_current_seq_nr: SeqNr,
    receive_rate: u32,
    round_trip_time_us: u32,
    syn_interval_us: u32,
    ack_timer_period_us: u32,
    ack_packet_interval: u32,
    retransmit_timeout: Option<Duration>,
}

impl CongestionParameters {
    pub fn new(syn_interval: Duration) -> Self {
        Self {
            packet_send_period: MIN_PACKET_SEND_PERIOD,
            congestion_window_size: INITIAL_CONGESTION_WINDOW,
            max_congestion_window_size: 0.,
            bandwidth_estimate: 0,
            max_segment_size: 0,
            send_current_seq_nr: SeqNr::default(),
            receive_rate: 0,
            round_trip_time_us: 0,
            syn_interval_us: syn_interval.as_micros().clamp(1, u32::MAX as u128) as u32,
            ack_timer_period_us: 0,
            ack_packet_interval: 0,
            retransmit_timeout: None,
        }
    }

    /// Gap between consecutive packet sends, in microseconds.
    pub fn packet_send_period(&self) -> f64 {
        self.packet_send_period
    }

    /// Packets allowed in flight.
    pub fn congestion_window_size(&self) -> f64 {
        self.congestion_window_size
    }

    /// Upper clamp on the window, in packets. Zero until the controller has
    /// derived a receiver-capacity ceiling.
    pub fn max_congestion_window_size(&self) -> f64 {
        self.max_congestion_window_size
    }

    /// Receiver-estimated link capacity, in packets per second.
    pub fn bandwidth_estimate(&self) -> u32 {
        self.bandwidth_estimate
    }

    pub fn max_segment_size(&self) -> u32 {
        self.max_segment_size
    }

    /// Highest sequence number handed to the send path so far.
    pub fn send_current_seq_nr(&self) -> SeqNr {
        self.send_current_seq_nr
    }

    /// Packet arrival rate observed by the receiver, in packets per second.
    pub fn receive_rate(&self) -> u32 {
        self.receive_rate
    }

    /// Smoothed round-trip time, in microseconds.
    pub fn round_trip_time(&self) -> u32 {
        self.round_trip_time_us
    }

    /// Control-loop tick period, in microseconds. Non-zero.
    pub fn syn_interval_us(&self) -> u32 {
        self.syn_interval_us
    }

    pub fn syn_interval(&self) -> Duration {
        Duration::from_micros(self.syn_interval_us as u64)
    }

    pub fn ack_timer_period(&self) -> Duration {
        Duration::from_micros(self.ack_timer_period_us as u64)
    }

    /// Send one ACK per this many received packets. Zero means the periodic
    /// timer alone drives ACKs.
    pub fn ack_packet_interval(&self) -> u32 {
        self.ack_packet_interval
    }

    /// Controller-overridden retransmission timeout, if the control law set
    /// one. `None` leaves the RTT-derived timeout in charge.
    pub fn retransmit_timeout(&self) -> Option<Duration> {
        self.retransmit_timeout
    }

    // Connection-side inputs.

    pub fn set_bandwidth_estimate(&mut self, packets_per_second: u32) {
        self.bandwidth_estimate = packets_per_second;
    }

    pub fn set_receive_rate(&mut self, packets_per_second: u32) {
        self.receive_rate = packets_per_second;
    }

    pub fn set_round_trip_time(&mut self, rtt: Duration) {
        self.round_trip_time_us = rtt.as_micros().min(u32::MAX as u128) as u32;
    }

    pub fn set_max_segment_size(&mut self, bytes: u32) {
        self.max_segment_size = bytes;
    }

    pub fn set_send_current_seq_nr(&mut self, seq_nr: SeqNr) {
        self.send_current_seq_nr = seq_nr;
    }

    // Controller-side outputs. Non-finite values are dropped rather than
    // stored, so the pacing values stay usable even if a control law
    // miscomputes.

    /// Clamped into `[MIN_PACKET_SEND_PERIOD, MAX_PACKET_SEND_PERIOD]`.
    pub fn set_packet_send_period(&mut self, period_us: f64) {
        if !period_us.is_finite() {
            return;
        }
        self.packet_send_period = period_us.clamp(MIN_PACKET_SEND_PERIOD, MAX_PACKET_SEND_PERIOD);
    }

    /// Clamped to at least [`MIN_CONGESTION_WINDOW`] and, while a ceiling is
    /// set, to at most the ceiling.
    pub fn set_congestion_window_size(&mut self, packets: f64) {
        if !packets.is_finite() {
            return;
        }
        let mut window = packets.max(MIN_CONGESTION_WINDOW);
        if self.max_congestion_window_size > 0. {
            window = window.min(self.max_congestion_window_size);
        }
        self.congestion_window_size = window;
    }

    /// Zero clears the ceiling. A non-zero ceiling is floored at
    /// [`MIN_CONGESTION_WINDOW`] and pulls the current window down under it.
    pub fn set_max_congestion_window_size(&mut self, packets: f64) {
        if !packets.is_finite() {
            return;
        }
        self.max_congestion_window_size = if packets > 0. {
            packets.max(MIN_CONGESTION_WINDOW)
        } else {
            0.
        };
        if self.max_congestion_window_size > 0.
            && self.congestion_window_size > self.max_congestion_window_size
        {
            self.congestion_window_size = self.max_congestion_window_size;
        }
    }

    /// Clamped to at most the SYN interval.
    pub fn set_ack_timer(&mut self, period_us: u32) {
        self.ack_timer_period_us = period_us.min(self.syn_interval_us);
    }

    pub fn set_ack_interval(&mut self, packets: u32) {
        self.ack_packet_interval = packets;
    }

    pub fn set_retransmit_timeout(&mut self, rto: Duration) {
        self.retransmit_timeout = Some(rto);
    }
}
