use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, error, info, warn};
use std::fs;
use std::io;
use std::path::PathBuf;

use repeatr::cli::Cli;
use repeatr::config::Config;
use repeatr::controller::{Controller, Preanswers};
use repeatr::style::{self, Level, paint};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("repeatr")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("repeatr.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // Filter wide open; the effective level is the max level set below
    let env = env_logger::Env::default().default_filter_or("trace");
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();
    apply_log_level(None);

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Apply the configured level unless RUST_LOG already chose one
fn apply_log_level(level: Option<&str>) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    match level.unwrap_or("info").parse::<LevelFilter>() {
        Ok(filter) => log::set_max_level(filter),
        Err(_) => {
            log::set_max_level(LevelFilter::Info);
            warn!("Unknown log_level {:?}, using info", level);
        }
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn run_application(cli: &Cli, config: Config) -> Result<i32> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
        print!("{}", config.to_yaml()?);
    }

    let strict_exit = config.strict_exit;
    let controller = Controller::new(
        config,
        Preanswers {
            count: cli.count,
            assume_yes: cli.yes,
        },
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;

    let mut input = io::stdin().lock();
    let mut output = io::stdout();

    match runtime.block_on(controller.run(&mut input, &mut output, interrupted())) {
        Ok(completion) => {
            info!("Batch completed: {:?}", completion);
            Ok(completion.exit_code(strict_exit))
        }
        Err(e) => {
            warn!("Aborted: {}", e);
            eprintln!("{}", paint(&format!("Error: {}", e), Level::Fatal));
            Ok(1)
        }
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if cli.no_color {
        style::disable_color();
    }

    setup_logging().context("Failed to setup logging")?;

    // Load configuration
    let mut config = Config::load(cli.config.as_ref())
        .inspect_err(|e| error!("{:#}", e))
        .context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config
        .validate()
        .inspect_err(|e| error!("Invalid configuration: {}", e))
        .context("Invalid configuration")?;
    apply_log_level(config.log_level.as_deref());

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    let code = run_application(&cli, config).context("Application failed")?;

    std::process::exit(code);
}
