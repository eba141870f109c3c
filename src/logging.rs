use std::io::IsTerminal;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Diagnostics share stderr with the progress lines; stdout carries only digests or the JSON report.
/// `RUST_LOG` wins over `--log-level`, which only applies to this crate's own targets.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(log_level)))
        .unwrap_or_else(|_| EnvFilter::new("checksum=warn"));

    let stderr = std::io::stderr();
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(stderr.is_terminal())
                .with_target(false)
                .without_time(),
        )
        .try_init()?;

    Ok(())
}

fn default_directive(log_level: &str) -> String {
    if log_level.contains('=') || log_level.contains(',') {
        log_level.to_string()
    } else {
        format!("checksum={log_level}")
    }
}
