//! Application entry point for tifinnity-scheduler.
//!
//! Initializes all components and runs the subscription order scheduler,
//! either as a periodic background loop or as a one-shot cron-style pass.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use log::debug;
use log::info;

use tifinnity_scheduler::config::Config;
use tifinnity_scheduler::logging::setup_logging;
use tifinnity_scheduler::repository::Repository;
use tifinnity_scheduler::service::Services;
use tifinnity_scheduler::task::order_scheduler::OrderSchedulerTask;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let config = load_config()?;

    let db = setup_repository(&config, init_start).await?;
    let services = Arc::new(Services::new(db));

    if config.run_once {
        return run_once(&services).await;
    }

    setup_scheduler(&config, &services)?;
    run(init_start).await
}

fn load_config() -> Result<Arc<Config>> {
    let config = Arc::new(Config::new());
    setup_logging(&config)?;
    info!("Starting tifinnity-scheduler...");
    Ok(config)
}

async fn setup_repository(config: &Config, init_start: Instant) -> Result<Arc<Repository>> {
    debug!("Setting up Repository...");
    let db = Arc::new(Repository::new(&config.db_url, &config.db_path).await?);

    info!("Running database migrations...");
    db.run_migrations().await?;
    info!(
        "Database setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );

    Ok(db)
}

/// Executes a single scheduling pass and prints the summary JSON to stdout.
///
/// Exits non-zero only on a job-level failure (the subscription listing
/// itself failed); per-subscription errors are part of the summary.
async fn run_once(services: &Services) -> Result<()> {
    let summary = services.order_scheduler.run_today().await?;
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn setup_scheduler(config: &Config, services: &Services) -> Result<()> {
    debug!("Setting up OrderSchedulerTask...");
    OrderSchedulerTask::new(services.order_scheduler.clone(), config.poll_interval).start()?;
    Ok(())
}

async fn run(init_start: Instant) -> Result<()> {
    info!(
        "tifinnity-scheduler is up in {:.2}s. Press Ctrl+C to stop.",
        init_start.elapsed().as_secs_f64()
    );

    tokio::signal::ctrl_c().await?;
    info!("Ctrl+C received, shutting down.");

    Ok(())
}
