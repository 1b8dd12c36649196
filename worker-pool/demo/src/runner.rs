// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{ConstTask, DemoConfig, FailingTask, SleepTask, SumRunesTask, SumTask, TaskKind};
use anyhow::Context;
use futures::StreamExt;
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use worker_pool_core::{merge_results, Job, JobHandle, Payload, Task, WorkerPool};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total: i64,
    pub interrupted: bool,
    pub elapsed: Duration,
}

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn random_word(rng: &mut impl Rng, length: usize) -> String {
    (0..length)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect()
}

fn build_job(
    config: &DemoConfig,
    index: usize,
    rng: &mut impl Rng,
) -> (Job<i64>, JobHandle<i64>) {
    match config.task {
        TaskKind::Sum => SumTask::job(index as i64, index as i64 + 1),
        TaskKind::Runes => SumRunesTask::job(&random_word(rng, config.word_length)),
        TaskKind::Const => {
            let task: Arc<dyn Task<Output = i64>> = Arc::new(ConstTask(config.constant));
            Job::new(task, Payload::new("const", Default::default()))
        }
        TaskKind::Fail => {
            let task: Arc<dyn Task<Output = i64>> = Arc::new(FailingTask);
            Job::new(task, Payload::new("fail", Default::default()))
        }
        TaskKind::Sleep => SleepTask::job(config.sleep_ms),
    }
}

/// Submits `config.jobs` jobs to a fresh pool and folds the merged results.
///
/// Resolving `shutdown` stops the run early; the pool is stopped either way.
pub async fn run(
    config: &DemoConfig,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<RunSummary> {
    config.validate()?;
    let started = Instant::now();

    let (queue, rx) = mpsc::channel(config.queue_capacity);
    let mut pool = WorkerPool::<i64>::new(config.pool.clone());
    pool.start(ReceiverStream::new(rx));

    // ThreadRng is not Send, so every job is built before the first await
    let jobs: Vec<_> = {
        let mut rng = rand::rng();
        (0..config.jobs)
            .map(|index| build_job(config, index, &mut rng))
            .collect()
    };

    tokio::pin!(shutdown);

    let mut handles = Vec::with_capacity(jobs.len());
    let mut interrupted = false;
    for (job, handle) in jobs {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                interrupted = true;
                break;
            }
            sent = queue.send(job) => sent.context("job queue closed")?,
        }
        handles.push(handle);
    }
    drop(queue);

    let mut summary = RunSummary {
        submitted: handles.len(),
        interrupted,
        ..Default::default()
    };
    info!(jobs = summary.submitted, "jobs submitted");

    // a shutdown seen during submission has already completed and must not
    // be polled again
    let folded: anyhow::Result<()> = if summary.interrupted {
        Ok(())
    } else {
        let mut results = merge_results(handles);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    summary.interrupted = true;
                    break Ok(());
                }
                next = results.next() => match next {
                    Some(Ok(value)) => match summary.total.checked_add(value) {
                        Some(total) => {
                            summary.succeeded += 1;
                            summary.total = total;
                        }
                        None => {
                            break Err(anyhow::anyhow!(
                                "total overflows i64 after {} results",
                                summary.succeeded
                            ))
                        }
                    },
                    Some(Err(e)) => {
                        warn!("job failed: {e}");
                        summary.failed += 1;
                    }
                    None => break Ok(()),
                },
            }
        }
    };

    if summary.interrupted {
        warn!(
            pending = summary.submitted - summary.succeeded - summary.failed,
            "run interrupted, stopping pool with jobs in flight"
        );
    }

    anyhow::ensure!(pool.stop().await, "worker pool registry still open after stop");
    folded?;

    summary.elapsed = started.elapsed();
    Ok(summary)
}
