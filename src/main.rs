#![forbid(unsafe_code)]

mod cli;
mod collection;
mod commands;
mod constants;
mod error;
mod expansion;
mod lock;
mod registry;
mod setter;
mod storage;

use clap::Parser;
use tracing::{Level as TraceLevel, debug};
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use registry::Registry;
use setter::CommandSetter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // Logs go to stderr so stdout stays parseable (list/current output)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let registry = Registry::new(Registry::default_root());
    let setter = CommandSetter::from_env();
    debug!("Configuration root: {:?}", registry.root());

    if let Err(err) = commands::run(&cli.command, &registry, &setter) {
        eprintln!("wallshelf: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}
