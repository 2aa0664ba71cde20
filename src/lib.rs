pub mod collectors;
pub mod config;
pub mod models;
pub mod monitor;
pub mod utils;

#[cfg(test)]
mod testutil;

pub use crate::collectors::discovery::discover;
pub use crate::models::gpu::GpuDevice;
pub use crate::models::history::History;
pub use crate::models::snapshot::MetricSnapshot;

use crate::config::AppConfig;
use crate::monitor::Monitor;
use anyhow::Context;
use log::{debug, error, info};
use std::time::Duration;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting application");

    tokio::select! {
        result = main_loop(config) => {
            match result {
                Ok(_) => info!("Application completed successfully"),
                Err(e) => {
                    error!("Application error: {e:#}");
                    // Print chain of error causes
                    let mut source = e.source();
                    while let Some(e) = source {
                        error!("Caused by: {e}");
                        source = e.source();
                    }
                    return Err(e).context("Application failed to run");
                }
            }
        }
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    Ok(())
}

async fn main_loop(config: AppConfig) -> anyhow::Result<()> {
    anyhow::ensure!(
        config.monitor.polling_ms > 0,
        "polling_ms must be greater than zero"
    );
    let mut interval = tokio::time::interval(Duration::from_millis(config.monitor.polling_ms));

    debug!("Discovering GPUs");
    let mut monitor = Monitor::new(config);
    loop {
        interval.tick().await; // Wait for the next tick
        monitor.tick()?;
    }
}
