// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{AvailabilityRegistry, Job, TaskError};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Dispatchable reference to an idle worker, as stored in the registry
pub struct WorkerHandle<T: Send + 'static> {
    id: usize,
    jobs: mpsc::Sender<Job<T>>,
}

impl<T: Send + 'static> WorkerHandle<T> {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Hands a job to the worker. Gives the job back if the worker is gone.
    pub async fn deliver(self, job: Job<T>) -> Result<(), Job<T>> {
        self.jobs.send(job).await.map_err(|e| e.0)
    }
}

/// Owner side of a running worker, used to stop it exactly once
pub struct WorkerStopper {
    id: usize,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl WorkerStopper {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Signals the worker to stop and returns its task handle.
    ///
    /// A worker busy with a job finishes it before it sees the signal.
    pub fn stop(self) -> JoinHandle<()> {
        if self.stop_tx.send(()).is_err() {
            debug!(worker = self.id, "worker already exited before stop");
        }
        self.task
    }
}

enum Event<T: Send + 'static> {
    Job(Job<T>),
    Stop,
}

/// Execution agent that processes one job at a time
pub struct Worker<T: Send + 'static> {
    id: usize,
    registry: Arc<AvailabilityRegistry<T>>,
    jobs_tx: mpsc::Sender<Job<T>>,
    jobs_rx: mpsc::Receiver<Job<T>>,
    shutdown_ack: mpsc::Sender<usize>,
}

impl<T: Send + 'static> Worker<T> {
    pub fn new(
        id: usize,
        registry: Arc<AvailabilityRegistry<T>>,
        shutdown_ack: mpsc::Sender<usize>,
    ) -> Self {
        // single slot: a worker only registers while idle
        let (jobs_tx, jobs_rx) = mpsc::channel(1);
        Self {
            id,
            registry,
            jobs_tx,
            jobs_rx,
            shutdown_ack,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Spawns the worker loop
    pub fn start(self) -> WorkerStopper {
        let id = self.id;
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(stop_rx));
        WorkerStopper { id, stop_tx, task }
    }

    async fn run(mut self, mut stop_rx: oneshot::Receiver<()>) {
        debug!(worker = self.id, "worker started");

        loop {
            let handle = WorkerHandle {
                id: self.id,
                jobs: self.jobs_tx.clone(),
            };
            if !self.registry.publish(handle).await {
                debug!(worker = self.id, "registry closed, worker exiting");
                break;
            }

            let event = tokio::select! {
                biased;
                // a dropped stopper counts as a stop signal
                _ = &mut stop_rx => Event::Stop,
                job = self.jobs_rx.recv() => match job {
                    Some(job) => Event::Job(job),
                    None => Event::Stop,
                },
            };

            match event {
                Event::Job(job) => Self::execute(self.id, job).await,
                Event::Stop => {
                    debug!(worker = self.id, "worker received stop signal");
                    break;
                }
            }
        }

        if self.shutdown_ack.send(self.id).await.is_err() {
            debug!(worker = self.id, "pool no longer listening for shutdown acks");
        }
        debug!(worker = self.id, "worker stopped");
    }

    async fn execute(id: usize, job: Job<T>) {
        let Job {
            payload,
            task,
            result_tx,
        } = job;

        debug!(worker = id, job_type = %payload.job_type, "executing job");

        let result = match AssertUnwindSafe(task.run(&payload)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(TaskError::Panicked(panic_message(panic.as_ref()))),
        };

        if let Err(e) = &result {
            error!(worker = id, job_type = %payload.job_type, "error running job: {e}");
        }

        // oneshot send never blocks; an abandoned handle just loses the result
        if result_tx.send(result).is_err() {
            debug!(worker = id, "job result dropped, submitter is gone");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
