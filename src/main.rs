mod dispatch;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use inpanzee::config::Config;
use inpanzee::Gateway;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command line client for the Kong Admin API
#[derive(Parser, Debug)]
#[command(name = "inpanzee", version, about, long_about = None)]
struct Args {
    /// Admin API scheme
    #[arg(long, global = true)]
    scheme: Option<String>,

    /// Admin API host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Admin API port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show node information
    Info,
    /// Show server and database status
    Status,
    /// List resources of one kind
    List {
        /// Resource kind (services, routes, upstreams, targets, ...)
        kind: String,
        /// Owning service or upstream, for routes and targets
        #[arg(long)]
        parent: Option<String>,
    },
    /// Fetch one resource by id
    Get {
        kind: String,
        id: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Delete one resource by id
    Delete {
        kind: String,
        id: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Persist the connection flags as defaults
    Config,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("inpanzee started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("inpanzee").join("inpanzee.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".inpanzee").join("inpanzee.log");
    }
    PathBuf::from("inpanzee.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let config = Config::load().merged(args.scheme.as_deref(), args.host.as_deref(), args.port);

    match args.command {
        Command::Config => {
            config.save().context("Failed to save configuration")?;
            if let Some(path) = Config::config_path() {
                println!("saved {}", path.display());
            }
        }
        Command::Info => dispatch::print(&connect(&config)?.info().await?)?,
        Command::Status => dispatch::print(&connect(&config)?.status().await?)?,
        Command::List { kind, parent } => {
            dispatch::list(&connect(&config)?, &kind, parent.as_deref()).await?
        }
        Command::Get { kind, id, parent } => {
            let value = dispatch::get(&connect(&config)?, &kind, &id, parent.as_deref()).await?;
            dispatch::print(&value)?
        }
        Command::Delete { kind, id, parent } => {
            dispatch::delete(&connect(&config)?, &kind, &id, parent.as_deref()).await?
        }
    }

    Ok(())
}

fn connect(config: &Config) -> Result<Gateway> {
    let address = config.effective_address()?;
    tracing::info!(
        "Using Admin API at {}://{}:{}",
        address.scheme,
        address.host,
        address.port
    );

    Gateway::new(&address.scheme, &address.host, address.port)
        .context("Failed to initialize gateway client")
}
