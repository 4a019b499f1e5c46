//! Pushgateway liveness monitor (upsetter)
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │                    UPSETTER                      │
//!                  │                                                  │
//!   GET            │  ┌────────────┐   ┌────────────┐   ┌──────────┐  │
//!   /api/v1/metrics│  │pushgateway │──▶│ reconcile  │──▶│ liveness │  │
//!  ────────────────┼─▶│  client    │   │ (per tick) │   │ detector │  │
//!                  │  └────────────┘   └─────┬──────┘   └──────────┘  │
//!                  │                         │ actions                │
//!   PUT/POST/DELETE│  ┌────────────┐         ▼                        │
//!  ◀───────────────┼──│  monitor   │◀── Push / Delete                 │
//!   /metrics/<key> │  │ tick loop  │                                  │
//!                  │  └────────────┘                                  │
//!                  │  config · lifecycle · observability              │
//!                  └──────────────────────────────────────────────────┘
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use upsetter::config::{load_config, validate_config, ConfigError, LogFormat, UpsetterConfig};
use upsetter::lifecycle::startup;
use upsetter::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "upsetter", version)]
#[command(about = "Infers job liveness from Pushgateway push times and writes an up metric back", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "UPSETTER_CONFIG")]
    config: Option<PathBuf>,

    /// Pushgateway URL.
    #[arg(long, env = "UPSETTER_URL")]
    url: Option<String>,

    /// Refresh period (e.g. 20s).
    #[arg(long, env = "UPSETTER_REFRESH")]
    refresh: Option<String>,

    /// Group TTL (e.g. 24h, 0 disables expiry).
    #[arg(long, env = "UPSETTER_TTL")]
    ttl: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "UPSETTER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format.
    #[arg(long, env = "UPSETTER_LOG_FORMAT", value_enum)]
    log_format: Option<LogFormat>,

    /// Enable the Prometheus metrics endpoint on this address.
    #[arg(long, env = "UPSETTER_METRICS_ADDRESS")]
    metrics_address: Option<String>,

    /// Run a single tick and exit.
    #[arg(long)]
    once: bool,
}

impl Cli {
    /// Load the file (or defaults) and apply flag overrides.
    fn resolve(&self) -> Result<UpsetterConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => UpsetterConfig::default(),
        };

        if let Some(url) = &self.url {
            config.pushgateway.url = url.clone();
        }
        if let Some(refresh) = &self.refresh {
            config.polling.refresh = refresh.clone();
        }
        if let Some(ttl) = &self.ttl {
            config.polling.ttl = ttl.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
        if let Some(address) = &self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = address.clone();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = cli.resolve()?;

    logging::init_logging(
        &config.observability.log_level,
        config.observability.log_format,
    )?;

    tracing::info!("upsetter v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config, cli.once).await?;
    Ok(())
}
