use std::time::Instant;

use crate::params::CongestionParameters;

use super::CongestionController;

/// Pins the window and send period at init and ignores every congestion
/// event. For tests and for links whose capacity is known out of band.
#[derive(Debug, Clone, Copy)]
pub struct Fixed {
    packet_send_period: f64,
    congestion_window_size: f64,
}

impl Fixed {
    pub fn new(packet_send_period_us: f64, congestion_window_size: f64) -> Self {
        Self {
            packet_send_period: packet_send_period_us,
            congestion_window_size,
        }
    }
}

impl Default for Fixed {
    fn default() -> Self {
        Self::new(1., 16.)
    }
}

impl CongestionController for Fixed {
    fn init(&mut self, params: &mut CongestionParameters, _now: Instant) {
        params.set_packet_send_period(self.packet_send_period);
        params.set_congestion_window_size(self.congestion_window_size);
    }
}
