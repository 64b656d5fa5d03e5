//! relaymq server binary
//!
//! Loads configuration, starts the delivery pipeline and serves the HTTP API
//! until Ctrl-C, then drains in-flight jobs before exiting.

use std::sync::Arc;

use clap::Parser;
use relaymq::Broker;
use relaymq::config::{Settings, load_config, validate};
use relaymq::delivery::HttpDelivery;
use relaymq::transport;
use relaymq::utils::logging;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Command-line overrides, applied on top of file and environment settings.
#[derive(Debug, Parser)]
#[command(name = "relaymq", version, about = "Minimal in-memory message broker")]
struct Cli {
    /// Listening host
    #[arg(long)]
    host: Option<String>,
    /// Listening port
    #[arg(long)]
    port: Option<u16>,
    /// Number of buffered delivery jobs
    #[arg(long)]
    jobs: Option<usize>,
    /// Number of delivery workers
    #[arg(long)]
    workers: Option<usize>,
    /// Default log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(host) = self.host {
            settings.server.host = host;
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(jobs) = self.jobs {
            settings.broker.job_buffer = jobs;
        }
        if let Some(workers) = self.workers {
            settings.broker.workers = workers;
        }
        if let Some(level) = self.log_level {
            settings.log.level = level;
        }
        settings
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    if let Err(e) = run_server(cli).await {
        logging::init("error");
        error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run_server(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = cli.apply(load_config()?);
    validate(&settings)?;
    logging::init(&settings.log.level);

    info!("###### Starting relaymq ######");
    info!(
        host = %settings.server.host,
        port = settings.server.port,
        jobs = settings.broker.job_buffer,
        workers = settings.broker.workers,
        "configuration loaded"
    );

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;

    let broker = Arc::new(Broker::new(settings.broker.clone()));
    let delivery = HttpDelivery::new(settings.broker.delivery_timeout())?;
    let runtime = broker.start(Arc::new(delivery));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for shutdown signal: {e}");
        }
        info!("Shutdown signal received. Exiting gracefully.");
    };

    let served = transport::serve(listener, broker.clone(), shutdown).await;
    runtime.shutdown().await;
    served?;

    Ok(())
}
