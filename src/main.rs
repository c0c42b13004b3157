//! INS Driver - bus-facing daemon
//!
//! Reads fix and command events as JSON lines on stdin, drives the INS over
//! TCP and writes query replies as JSON lines on stdout. Logs go to stderr
//! (and optionally a rolling file).

use clap::Parser;
use ins_driver::config::{self, AppConfig, LoggingConfig};
use ins_driver::core::bus::{pump_inbound, pump_outbound, BusRouter};
use ins_driver::core::driver::Driver;
use ins_driver::core::logger::WireLogger;
use ins_driver::core::transport::TcpSession;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// INS driver daemon
#[derive(Parser, Debug)]
#[command(
    name = "ins-driver",
    version,
    about = "Drive a PIXSE/CONFIG inertial navigation system from host bus events",
    long_about = None
)]
struct Args {
    /// Config file (defaults to the per-user config directory)
    #[arg(short, long, env = "INS_DRIVER_CONFIG")]
    config: Option<PathBuf>,

    /// INS host, overrides the config file
    #[arg(short = 'H', long, env = "INS_HOST")]
    host: Option<String>,

    /// INS port, overrides the config file
    #[arg(short, long, env = "INS_PORT")]
    port: Option<u16>,

    /// Also log to a daily rolling file in the data directory
    #[arg(long)]
    log_file: bool,

    /// Record TX/RX frames to this file
    #[arg(long)]
    wire_log: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn init_logging(logging: &LoggingConfig, to_file: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let directory = logging
        .directory
        .clone()
        .or_else(|| to_file.then(config::log_dir).flatten());

    match directory {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, "ins-driver.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stderr_layer).init();
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(host) = args.host {
        config.device.host = host;
    }
    if let Some(port) = args.port {
        config.device.port = port;
    }
    if let Some(path) = args.wire_log {
        config.logging.wire_log = Some(path);
    }
    config.validate()?;

    if args.dump_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let _guard = init_logging(&config.logging, args.log_file)?;
    tracing::info!("Starting INS driver v{}", ins_driver::VERSION);

    let mut session = TcpSession::new(config.device.clone());
    if let Some(path) = &config.logging.wire_log {
        tracing::info!("Recording wire traffic to {}", path.display());
        session = session.with_wire_log(WireLogger::shared(path, config.logging.wire_log_format)?);
    }

    let driver = Driver::new(Box::new(session), config.driver.clone());
    let router = BusRouter::new(config.bus.clone());
    let (tx, rx) = mpsc::channel(config.driver.event_buffer);

    // Outbound replies to stdout
    let responses = driver.subscribe();
    let out_router = router.clone();
    let writer = tokio::spawn(async move {
        if let Err(e) = pump_outbound(tokio::io::stdout(), &out_router, responses).await {
            tracing::error!("Response writer failed: {}", e);
        }
    });

    // Inbound events from stdin, on a plain thread so a pending read never
    // holds up shutdown
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        if let Err(e) = pump_inbound(stdin.lock(), &router, &tx) {
            tracing::error!("Bus reader failed: {}", e);
        }
        tracing::info!("Bus input closed");
    });

    let mut driver_task = tokio::spawn(driver.run(rx));

    tokio::select! {
        result = &mut driver_task => {
            let stats = result?;
            tracing::info!(
                "Driver finished: {} sent, {} failed attempts, {} dropped, {} responses",
                stats.sent,
                stats.failed_attempts,
                stats.dropped,
                stats.responses
            );
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            driver_task.abort();
        }
    }

    // Driver dropped its sender, so the writer drains and exits
    let _ = writer.await;
    Ok(())
}
