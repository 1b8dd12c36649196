// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use worker_pool_core::PoolConfig;

/// Which task every generated job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// x + y for consecutive pairs
    Sum,
    /// code point sum of random words
    Runes,
    /// a fixed constant
    Const,
    /// always fails
    Fail,
    /// sleeps for `sleep_ms` then returns it
    Sleep,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub pool: PoolConfig,
    pub jobs: usize,
    pub task: TaskKind,
    pub queue_capacity: usize,
    pub word_length: usize,
    pub constant: i64,
    pub sleep_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            jobs: 1_000,
            task: TaskKind::Sum,
            queue_capacity: 64,
            word_length: 32,
            constant: 12,
            sleep_ms: 10,
        }
    }
}

impl DemoConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let config: DemoConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.pool.max_workers > 0, "pool.max_workers must be at least 1");
        anyhow::ensure!(self.queue_capacity > 0, "queue_capacity must be at least 1");
        Ok(())
    }

    /// Command line flags win over the file
    pub fn apply(&mut self, cli: &Cli) {
        if let Some(workers) = cli.workers {
            self.pool.max_workers = workers;
        }
        if let Some(jobs) = cli.jobs {
            self.jobs = jobs;
        }
        if let Some(task) = cli.task {
            self.task = task;
        }
        if let Some(ms) = cli.shutdown_timeout_ms {
            self.pool.shutdown_timeout = Duration::from_millis(ms);
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "worker-pool-demo", about = "Runs a batch of jobs through a bounded worker pool")]
pub struct Cli {
    /// JSON configuration file; defaults are used when it is missing
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Number of workers in the pool
    #[arg(long)]
    pub workers: Option<usize>,

    /// Number of jobs to submit
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Task every job runs
    #[arg(long, value_enum)]
    pub task: Option<TaskKind>,

    /// Upper bound on waiting for workers during shutdown
    #[arg(long)]
    pub shutdown_timeout_ms: Option<u64>,
}
