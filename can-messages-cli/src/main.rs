//! CAN Message Database Compiler
//!
//! Builds the rover's CAN message database from the catalog in the
//! can-messages library, validates it, and hands it to the compiler
//! collaborator:
//! - DBC database file
//! - Generated C sources
//! - Markdown documentation
//!
//! Runs without arguments; flags only adjust logging and artifact locations.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

mod compiler;
mod config;

use compiler::ExternalCompiler;
use config::AppConfig;

/// CAN Message Database Compiler - validate and compile the CAN protocol
#[derive(Parser, Debug)]
#[command(name = "can-messages-cli")]
#[command(about = "Build and validate the CAN message database", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (TOML) with output paths and generator commands
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("CAN Message Database Compiler v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using can-messages library v{}", can_messages::VERSION);

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    log::debug!("Configuration: {:?}", config);

    let builder = can_messages::catalog::builder().context("Invalid message definition")?;

    let compiler = ExternalCompiler::new(
        config.output.database_file.clone(),
        config.codegen.clone(),
        config.docs.clone(),
    );

    let summary = can_messages::compile(builder, &compiler, &config.output)
        .context("CAN database build failed")?;

    log::info!(
        "Done: {} messages, {} signals ({} extended frames)",
        summary.stats.num_messages,
        summary.stats.num_signals,
        summary.stats.num_extended
    );
    log::info!("  Database:      {:?}", summary.database_file);
    log::info!("  Sources:       {:?}", summary.source_dir);
    log::info!("  Documentation: {:?}", summary.docs_file);

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
