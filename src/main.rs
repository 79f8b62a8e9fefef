use anyhow::{Context, Result};
use buckshot_stress::config::HarnessConfig;
use buckshot_stress::coordinator::StressCoordinator;
use buckshot_stress::metrics::{render_metrics, start_metrics_server, MetricsConfig};
use buckshot_stress::session::ScriptKind;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "buckshot-stress",
    version,
    about = "Concurrent connection stress harness for the Buckshot game server"
)]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Server address, host:port.
    #[arg(long)]
    target: Option<String>,
    /// Number of simulated clients.
    #[arg(long, short = 'c')]
    clients: Option<usize>,
    /// Seconds each client stays connected.
    #[arg(long, short = 'd')]
    duration: Option<f64>,
    /// Clients launched per batch.
    #[arg(long)]
    batch_size: Option<usize>,
    /// Pause between batches, in milliseconds.
    #[arg(long)]
    batch_delay_ms: Option<u64>,
    /// Cap on clients connected at once.
    #[arg(long)]
    max_in_flight: Option<usize>,
    /// Open-file limit to request before launching.
    #[arg(long)]
    fd_limit: Option<u64>,
    /// Skip raising the open-file limit.
    #[arg(long)]
    no_fd_limit: bool,
    /// Interaction script each client runs.
    #[arg(long, value_enum)]
    script: Option<ScriptKind>,
    /// Serve Prometheus metrics on this address during the run.
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,
    /// Print the run result as JSON instead of a summary line.
    #[arg(long)]
    json: bool,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> Result<(HarnessConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_file(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => HarnessConfig::default(),
        };

        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(clients) = self.clients {
            config.clients = clients;
        }
        if let Some(duration) = self.duration {
            config.duration_secs = duration;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(delay) = self.batch_delay_ms {
            config.batch_delay_ms = delay;
        }
        if self.max_in_flight.is_some() {
            config.max_in_flight = self.max_in_flight;
        }
        if self.fd_limit.is_some() {
            config.fd_limit = self.fd_limit;
        }
        if self.no_fd_limit {
            config.fd_limit = None;
        }
        if let Some(script) = self.script {
            config.script = script;
        }
        if self.metrics_addr.is_some() {
            config.metrics_addr = self.metrics_addr;
        }

        Ok((config, self.json))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let (config, json) = cli.into_config()?;

    if let Some(addr) = config.metrics_addr {
        match start_metrics_server(MetricsConfig::with_addr(addr)) {
            Ok(_) => tracing::info!("Metrics available on http://{}/metrics", addr),
            Err(e) => tracing::warn!("Metrics disabled: {}", e),
        }
    }

    let coordinator = StressCoordinator::new(config).context("invalid configuration")?;
    let result = coordinator.run().await.context("stress run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result);
    }

    // Final scrape, for runs that end before anything polled the endpoint
    if let Some(dump) = render_metrics() {
        eprintln!("{}", dump);
    }

    Ok(())
}
