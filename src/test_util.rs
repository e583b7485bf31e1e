use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::TRACE.into())
                .from_env_lossy(),
        )
        .try_init();
}
