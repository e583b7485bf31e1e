use std::time::Instant;

use crate::{
    constants::CONGESTION_TRACING_LOG_LEVEL, params::CongestionParameters, seq_nr::SeqNr,
};

use super::CongestionController;

/// Pacing outputs captured around an event to detect transitions worth
/// logging.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pacing {
    period: f64,
    window: f64,
}

impl Pacing {
    fn of(params: &CongestionParameters) -> Self {
        Self {
            period: params.packet_send_period(),
            window: params.congestion_window_size(),
        }
    }
}

/// Wraps any controller and logs whenever an event changed the pacing
/// outputs. ACKs are rate-limited as they arrive in bulk; losses and
/// timeouts are logged every time.
#[derive(Debug)]
pub struct TracingController<I> {
    inner: I,
}

impl<I> TracingController<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I: CongestionController> CongestionController for TracingController<I> {
    fn init(&mut self, params: &mut CongestionParameters, now: Instant) {
        self.inner.init(params, now);
        ::tracing::event!(
            CONGESTION_TRACING_LOG_LEVEL,
            after = ?Pacing::of(params),
            "init"
        );
    }

    fn close(&mut self, params: &CongestionParameters) {
        self.inner.close(params);
    }

    fn on_ack(&mut self, params: &mut CongestionParameters, ack_nr: SeqNr, now: Instant) {
        let before = Pacing::of(params);
        self.inner.on_ack(params, ack_nr, now);
        let after = Pacing::of(params);
        if before != after {
            log_every_ms!(
                500,
                CONGESTION_TRACING_LOG_LEVEL,
                %ack_nr,
                ?before,
                ?after,
                "on_ack changed pacing"
            );
        }
    }

    fn on_loss(
        &mut self,
        params: &mut CongestionParameters,
        range_start: SeqNr,
        range_end: SeqNr,
        now: Instant,
    ) {
        let before = Pacing::of(params);
        self.inner.on_loss(params, range_start, range_end, now);
        let after = Pacing::of(params);
        if before != after {
            ::tracing::event!(
                CONGESTION_TRACING_LOG_LEVEL,
                %range_start,
                %range_end,
                ?before,
                ?after,
                "on_loss changed pacing"
            );
        }
    }

    fn on_timeout(&mut self, params: &mut CongestionParameters, now: Instant) {
        let before = Pacing::of(params);
        self.inner.on_timeout(params, now);
        let after = Pacing::of(params);
        if before != after {
            ::tracing::event!(
                CONGESTION_TRACING_LOG_LEVEL,
                ?before,
                ?after,
                "on_timeout changed pacing"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::TracingController;
    use crate::{
        congestion::{CongestionController, aimd::Aimd},
        constants::DEFAULT_SYN_INTERVAL,
        params::CongestionParameters,
        seq_nr::SeqNr,
        test_util::setup_test_logging,
    };

    #[test]
    fn test_wrapped_controller_behaves_like_inner() {
        setup_test_logging();
        let mut traced_params = CongestionParameters::new(DEFAULT_SYN_INTERVAL);
        let mut plain_params = CongestionParameters::new(DEFAULT_SYN_INTERVAL);
        let mut traced = TracingController::new(Aimd::new());
        let mut plain = Aimd::new();

        let now = Instant::now();
        for (c, p) in [
            (
                &mut traced as &mut dyn CongestionController,
                &mut traced_params,
            ),
            (&mut plain, &mut plain_params),
        ] {
            p.set_send_current_seq_nr(SeqNr::new(100));
            c.init(p, now);
            let later = now + DEFAULT_SYN_INTERVAL;
            c.on_ack(p, SeqNr::new(116), later);
            c.on_loss(p, SeqNr::new(140), SeqNr::new(141), later);
            c.on_timeout(p, later);
            c.close(p);
        }

        assert_eq!(
            traced_params.packet_send_period(),
            plain_params.packet_send_period()
        );
        assert_eq!(
            traced_params.congestion_window_size(),
            plain_params.congestion_window_size()
        );
    }
}
