//! INS CLI - one-shot commands for commissioning and scripting
//!
//! Lists the command set, encodes frames, decodes replies and performs single
//! round trips against the INS without running the bus daemon.

use clap::{Parser, Subcommand, ValueEnum};
use ins_driver::cli::{self, format_command_list, format_request, CliResult, ExitCodes};
use ins_driver::core::bus::CommandResponse;
use ins_driver::core::fix::GpsFix;
use ins_driver::core::protocol::{self, CommandKind, Request};
use ins_driver::core::transport::{DeviceLink, TcpSession};
use ins_driver::AppConfig;
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI output format
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format for scripting
    Json,
}

impl From<OutputFormat> for cli::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// INS CLI
#[derive(Parser, Debug)]
#[command(
    name = "ins-cli",
    version,
    about = "One-shot PIXSE/CONFIG commands for an inertial navigation system",
    long_about = None
)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Position for the manual fix command
#[derive(clap::Args, Debug, Clone, Copy)]
struct FixArgs {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Altitude in meters
    #[arg(long, allow_hyphen_values = true, default_value = "0.0")]
    alt: f64,
}

impl FixArgs {
    fn fix(&self) -> Option<GpsFix> {
        Some(GpsFix::new(self.lat?, self.lon?, self.alt))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the command set
    List,

    /// Print the wire frame for a command
    Encode {
        /// Command name or ordinal (e.g. `reset`, `8`)
        command: String,

        #[command(flatten)]
        fix: FixArgs,
    },

    /// Extract the value token from a raw reply
    Decode {
        /// Raw reply text, e.g. `$PIXSE,CONFIG,GPSKFM,2*47`
        raw: String,
    },

    /// Send one command to the INS and print any reply
    Send {
        /// Command name or ordinal
        command: String,

        #[command(flatten)]
        fix: FixArgs,

        /// Config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// INS host, overrides config
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// INS port, overrides config
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show exit codes
    ExitCodes,
}

fn encode(command: &str, fix: FixArgs) -> Result<Request, CliResult> {
    let kind: CommandKind = command.parse()?;
    Ok(protocol::encode(kind, fix.fix().as_ref())?)
}

async fn send(
    cli: &Cli,
    command: &str,
    fix: FixArgs,
    config: Option<&PathBuf>,
    host: Option<&String>,
    port: Option<u16>,
) -> Result<CliResult, CliResult> {
    let request = encode(command, fix)?;

    let mut config = match config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(host) = host {
        config.device.host.clone_from(host);
    }
    if let Some(port) = port {
        config.device.port = port;
    }
    config.validate()?;

    if !cli.quiet {
        eprintln!("Sending {} to {}...", request.kind, config.device.address());
    }

    let session = TcpSession::new(config.device);
    let reply = session.send(&request.message, request.expects_reply()).await?;

    let output = match reply {
        Some(token) => {
            let response = CommandResponse::new(&token, request.kind);
            match cli.format {
                OutputFormat::Json => serde_json::json!({
                    "command": request.kind.name(),
                    "reply": token,
                    "data": response.data,
                })
                .to_string(),
                OutputFormat::Text => response.data,
            }
        }
        None if request.expects_reply() => {
            return Err(CliResult::error(ExitCodes::TIMEOUT, "No reply from INS"));
        }
        None => match cli.format {
            OutputFormat::Json => serde_json::json!({ "command": request.kind.name(), "sent": true }).to_string(),
            OutputFormat::Text => "OK".to_string(),
        },
    };
    Ok(CliResult::success_with_message(output))
}

async fn run(cli: &Cli) -> Result<CliResult, CliResult> {
    match &cli.command {
        Commands::List => Ok(CliResult::success_with_message(
            format_command_list(cli.format.into()).trim_end().to_string(),
        )),
        Commands::Encode { command, fix } => {
            let request = encode(command, *fix)?;
            Ok(CliResult::success_with_message(format_request(&request, cli.format.into())))
        }
        Commands::Decode { raw } => {
            let token = protocol::decode(raw.as_bytes())
                .map_err(|e| CliResult::error(ExitCodes::PROTOCOL_ERROR, e.to_string()))?;
            Ok(CliResult::success_with_message(token))
        }
        Commands::Send {
            command,
            fix,
            config,
            host,
            port,
        } => send(cli, command, *fix, config.as_ref(), host.as_ref(), *port).await,
        Commands::ExitCodes => {
            cli::print_exit_codes();
            Ok(CliResult::success())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(&cli).await.unwrap_or_else(|err| err);
    match &result {
        CliResult::Success(Some(msg)) => println!("{msg}"),
        CliResult::Success(None) => {}
        CliResult::Error(code, msg) => {
            if !cli.quiet {
                eprintln!("Error: {} ({})", msg, cli::exit_code_description(*code));
            }
        }
    }
    result.to_exit_code()
}
