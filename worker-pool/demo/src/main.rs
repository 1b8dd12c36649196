// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use worker_pool_demo::{run, Cli, DemoConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match DemoConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            warn!("failed to load config: {e:#}, using defaults");
            DemoConfig::default()
        }
    };
    config.apply(&cli);
    config.validate()?;

    info!(
        workers = config.pool.max_workers,
        jobs = config.jobs,
        task = ?config.task,
        "running worker pool demo"
    );

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Ctrl+C received, initiating shutdown");
    };

    let summary = run(&config, ctrl_c).await?;

    println!("=== RESULTS ===");
    println!("Jobs submitted: {}", summary.submitted);
    println!("Succeeded:      {}", summary.succeeded);
    println!("Failed:         {}", summary.failed);
    println!("Total:          {}", summary.total);
    if summary.interrupted {
        println!("Run was interrupted before all results arrived");
    }
    println!("Total time: {:.2}s", summary.elapsed.as_secs_f64());

    Ok(())
}
