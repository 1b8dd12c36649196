// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{JobResult, Payload, Task, TaskError};
use futures::stream::{self, Once};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// One request for execution: a payload, the task to run it with, and the
/// private channel the result goes back on.
///
/// A job is handed to exactly one worker and executed exactly once.
pub struct Job<T: Send + 'static> {
    pub(crate) payload: Payload,
    pub(crate) task: Arc<dyn Task<Output = T>>,
    pub(crate) result_tx: oneshot::Sender<JobResult<T>>,
}

impl<T: Send + 'static> Job<T> {
    /// Creates a job together with the handle its result will arrive on
    pub fn new(task: Arc<dyn Task<Output = T>>, payload: Payload) -> (Self, JobHandle<T>) {
        let (result_tx, result_rx) = oneshot::channel();
        let job = Job {
            payload,
            task,
            result_tx,
        };
        (job, JobHandle { rx: result_rx })
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl<T: Send + 'static> std::fmt::Debug for Job<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

/// Submitter side of a job's result channel.
///
/// Resolves to the job's [`JobResult`]. If the job was dropped without being
/// executed (the pool stopped while it was in flight) it resolves to
/// [`TaskError::PoolStopped`] instead of waiting forever.
#[derive(Debug)]
pub struct JobHandle<T> {
    rx: oneshot::Receiver<JobResult<T>>,
}

impl<T> JobHandle<T> {
    /// Single-item stream, suitable as an input to the result merger
    pub fn into_stream(self) -> Once<Self> {
        stream::once(self)
    }
}

impl<T> Future for JobHandle<T> {
    type Output = JobResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(TaskError::PoolStopped)),
            Poll::Pending => Poll::Pending,
        }
    }
}
