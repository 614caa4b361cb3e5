use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the process-wide subscriber: conservative defaults, full
/// control through `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .parse_lossy(
                "clipvault_server=info,clipvault_service=info,clipvault_db=info,\
                 clipvault_recency=info,clipvault_pipeline=info",
            )
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
