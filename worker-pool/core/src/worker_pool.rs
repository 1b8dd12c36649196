// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{AvailabilityRegistry, Job, PoolConfig, Worker, WorkerStopper};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

enum PoolState {
    Idle,
    Running {
        workers: Vec<WorkerStopper>,
        dispatcher: JoinHandle<()>,
    },
    Stopped,
}

/// Fixed-size pool of workers fed from a stream of jobs.
///
/// Lifecycle is `new` → `start` → `stop`. Starting or stopping twice is a
/// programming error and panics. Jobs still waiting for a worker when the
/// pool stops resolve to [`crate::TaskError::PoolStopped`]; callers that need
/// every result should drain their handles before stopping.
pub struct WorkerPool<T: Send + 'static> {
    config: PoolConfig,
    registry: Arc<AvailabilityRegistry<T>>,
    cancel: CancellationToken,
    shutdown_tx: mpsc::Sender<usize>,
    shutdown_rx: mpsc::Receiver<usize>,
    state: PoolState,
}

impl<T: Send + 'static> WorkerPool<T> {
    pub fn new(config: PoolConfig) -> Self {
        assert!(config.max_workers > 0, "worker pool needs at least one worker");

        let registry = Arc::new(AvailabilityRegistry::new(config.max_workers));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(config.max_workers);

        Self {
            config,
            registry,
            cancel: CancellationToken::new(),
            shutdown_tx,
            shutdown_rx,
            state: PoolState::Idle,
        }
    }

    pub fn with_workers(max_workers: usize) -> Self {
        Self::new(PoolConfig::new(max_workers))
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn worker_count(&self) -> usize {
        self.config.max_workers
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, PoolState::Running { .. })
    }

    /// Idle workers currently registered. Does not disturb the registry.
    pub fn available_workers(&self) -> usize {
        self.registry.available()
    }

    /// True until `stop` has closed the registry
    pub fn is_open(&self) -> bool {
        self.registry.is_open()
    }

    /// Starts every worker and the dispatch loop over `jobs`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Panics
    ///
    /// If the pool was already started or has been stopped.
    pub fn start<S>(&mut self, jobs: S)
    where
        S: Stream<Item = Job<T>> + Send + 'static,
    {
        match self.state {
            PoolState::Idle => {}
            PoolState::Running { .. } => panic!("worker pool already started"),
            PoolState::Stopped => panic!("cannot start a stopped worker pool"),
        }

        info!(workers = self.config.max_workers, "starting worker pool");

        let workers = (0..self.config.max_workers)
            .map(|id| Worker::new(id, self.registry.clone(), self.shutdown_tx.clone()).start())
            .collect();

        let dispatcher = tokio::spawn(dispatch(jobs, self.registry.clone(), self.cancel.clone()));

        self.state = PoolState::Running {
            workers,
            dispatcher,
        };
    }

    /// Stops every worker, waits for their acknowledgements and closes the
    /// registry. Returns true when the registry is closed.
    ///
    /// # Panics
    ///
    /// If the pool was already stopped.
    pub async fn stop(&mut self) -> bool {
        match std::mem::replace(&mut self.state, PoolState::Stopped) {
            PoolState::Stopped => panic!("worker pool already stopped"),
            PoolState::Idle => {
                debug!("stopping a worker pool that was never started");
            }
            PoolState::Running {
                workers,
                dispatcher,
            } => {
                info!(workers = workers.len(), "stopping worker pool");
                self.cancel.cancel();

                let expected = workers.len();
                let tasks: Vec<(usize, JoinHandle<()>)> = workers
                    .into_iter()
                    .map(|worker| (worker.id(), worker.stop()))
                    .collect();

                let acked = self.await_acknowledgements(expected).await;
                if acked < expected {
                    warn!(
                        acked,
                        expected, "shutdown timed out, aborting remaining workers"
                    );
                    for (id, task) in &tasks {
                        if !task.is_finished() {
                            warn!(worker = id, "aborting worker");
                            task.abort();
                        }
                    }
                }

                if let Err(e) = dispatcher.await {
                    warn!("dispatch loop ended abnormally: {e}");
                }
            }
        }

        self.registry.close().await;
        info!("worker pool stopped");

        !self.registry.is_open()
    }

    /// Counts shutdown acknowledgements until all arrived or the configured
    /// timeout elapsed
    async fn await_acknowledgements(&mut self, expected: usize) -> usize {
        let mut acked = 0;
        let shutdown_rx = &mut self.shutdown_rx;

        let wait_all = async {
            while acked < expected {
                match shutdown_rx.recv().await {
                    Some(id) => {
                        debug!(worker = id, "worker shutdown acknowledged");
                        acked += 1;
                    }
                    None => break,
                }
            }
        };

        if timeout(self.config.shutdown_timeout, wait_all).await.is_err() {
            debug!("timed out waiting for shutdown acknowledgements");
        }

        acked
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        // dropped stoppers already end the workers; this ends the dispatcher
        // and releases dispatch tasks still waiting for a worker
        self.cancel.cancel();
        self.registry.shutdown();
    }
}

/// Pairs each incoming job with an idle worker.
///
/// Every job gets its own task that waits for a worker, so the loop keeps
/// accepting jobs while all workers are busy. Assignment order across those
/// tasks is not guaranteed.
async fn dispatch<T, S>(
    jobs: S,
    registry: Arc<AvailabilityRegistry<T>>,
    cancel: CancellationToken,
) where
    T: Send + 'static,
    S: Stream<Item = Job<T>> + Send + 'static,
{
    let mut jobs = Box::pin(jobs);

    loop {
        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            job = jobs.next() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let registry = registry.clone();
        tokio::spawn(async move {
            // blocks until a worker is idle
            let Some(worker) = registry.acquire().await else {
                debug!("registry closed, dropping job");
                return;
            };

            let id = worker.id();
            if worker.deliver(job).await.is_err() {
                debug!(worker = id, "worker stopped before job delivery, dropping job");
            }
        });
    }

    debug!("dispatch loop exited");
}
