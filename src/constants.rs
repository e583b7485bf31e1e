use std::time::Duration;

use tracing::Level;

// UDT's fixed control-loop tick (the SYN interval). Rate adjustments and
// periodic ACK timers are paced by this.
pub const DEFAULT_SYN_INTERVAL: Duration = Duration::from_millis(10);

// u32 SeqNrs live in a 31-bit modular space; the top bit is reserved for
// control packets on the wire.
pub const SEQ_NR_MODULUS: u32 = 1 << 31;

// Initial congestion window in packets, per the UDT spec.
pub const INITIAL_CONGESTION_WINDOW: f64 = 16.0;
// Multiplicative decreases and timeouts never shrink the window below this.
pub const MIN_CONGESTION_WINDOW: f64 = 2.0;

// Inter-packet send period clamps, in microseconds. The upper bound keeps a
// throttled-to-death connection sending at least one packet per second.
pub const MIN_PACKET_SEND_PERIOD: f64 = 1.0;
pub const MAX_PACKET_SEND_PERIOD: f64 = 1_000_000.0;

pub const CONGESTION_TRACING_LOG_LEVEL: Level = Level::DEBUG;
