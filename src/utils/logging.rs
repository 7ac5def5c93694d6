use tracing::Level;

// setup_tracing installs a JSON subscriber suitable for CloudWatch. Calling it
// again after a subscriber is installed is a no-op.
pub fn setup_tracing() {
    setup_tracing_with_level(Level::INFO);
}

pub fn setup_tracing_with_level(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        // the module path in every log line is noise in CloudWatch
        .with_target(false)
        // ANSI color codes show up as garbage in CloudWatch logs
        .with_ansi(false)
        // CloudWatch adds the ingestion time
        .without_time()
        .json()
        .try_init();
}
