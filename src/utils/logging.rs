//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::LoggingConfig;
use crate::utils::error::{EngineError, Result};

/// Build the filter: `RUST_LOG` wins over the configured level
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            EngineError::config(format!("invalid log level '{}': {}", config.level, e))
        }),
    }
}

/// Install the global subscriber on stdout. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    install(config, std::io::stdout)
}

/// Same as [`init_logging`] but on stderr, leaving stdout to command output
pub fn init_cli_logging(config: &LoggingConfig) -> Result<()> {
    install(config, std::io::stderr)
}

fn install<W>(config: &LoggingConfig, writer: W) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| EngineError::internal(format!("failed to install logger: {}", e)))
}
