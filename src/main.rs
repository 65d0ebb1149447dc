use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use mongo_tour::{ConfigManager, ConnectionManager, TourConfig, WorkflowReport, run_tour};

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(report) => {
            for step in &report.steps {
                println!("{step}");
            }
            println!("{}", report.summary_line());
            if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("mongo-tour: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<WorkflowReport> {
    let config = load_config()?.with_env_overrides();
    log::info!("Touring {} on {}", config.database, config.uri);

    let manager = ConnectionManager::new().context("Failed to start async runtime")?;
    let report = run_tour(&manager, &config)
        .with_context(|| format!("Failed to connect to {}", config.uri))?;
    Ok(report)
}

/// The config file named on the command line, else the saved one, else defaults.
fn load_config() -> anyhow::Result<TourConfig> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => ConfigManager::load_from(&path),
        None => ConfigManager::new()?.load(),
    }
}
