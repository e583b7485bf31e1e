#[macro_use]
mod macros;

mod congestion;
mod constants;
mod engine;
mod error;
mod metrics;
mod params;
mod seq_nr;
#[cfg(test)]
mod test_util;
mod utils;

pub use congestion::{
    CongestionAlgorithm, CongestionConfig, CongestionController, aimd::Aimd, fixed::Fixed,
    tracing::TracingController,
};
pub use engine::{CongestionEngine, ControlStats};
pub use error::{Error, Result};
pub use params::CongestionParameters;
pub use seq_nr::SeqNr;
