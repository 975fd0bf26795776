use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::cli::LogFormatArg;

/// Installs the global subscriber and routes `log` records into it.
pub fn init(format: LogFormatArg) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = Registry::default().with(filter);

    match format {
        LogFormatArg::Pretty => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer()))?
        }
        LogFormatArg::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_current_span(true)),
        )?,
    }

    tracing_log::LogTracer::init()?;
    Ok(())
}
