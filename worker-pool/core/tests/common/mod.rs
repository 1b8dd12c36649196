// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use worker_pool_core::{Job, JobHandle, JobResult, Payload, Task, TaskError, WorkerPool};

pub const WAIT: Duration = Duration::from_secs(5);

pub struct MessageTask;

#[async_trait]
impl Task for MessageTask {
    type Output = String;

    async fn run(&self, _payload: &Payload) -> JobResult<String> {
        Ok("job done!".to_string())
    }
}

pub struct SumTask;

#[async_trait]
impl Task for SumTask {
    type Output = i64;

    async fn run(&self, payload: &Payload) -> JobResult<i64> {
        let parse = |key: &str| -> JobResult<i64> {
            payload
                .param(key)
                .ok_or_else(|| TaskError::invalid_param(key, "missing"))?
                .parse()
                .map_err(|_| TaskError::invalid_param(key, "not an integer"))
        };
        Ok(parse("x")? + parse("y")?)
    }
}

pub struct ConstTask(pub i64);

#[async_trait]
impl Task for ConstTask {
    type Output = i64;

    async fn run(&self, _payload: &Payload) -> JobResult<i64> {
        Ok(self.0)
    }
}

pub struct FailingTask;

#[async_trait]
impl Task for FailingTask {
    type Output = i64;

    async fn run(&self, _payload: &Payload) -> JobResult<i64> {
        Err(TaskError::failed("boom"))
    }
}

pub struct PanickingTask;

#[async_trait]
impl Task for PanickingTask {
    type Output = i64;

    async fn run(&self, _payload: &Payload) -> JobResult<i64> {
        panic!("task blew up");
    }
}

/// Blocks inside `run` until the test releases a permit, counting how many
/// jobs are executing meanwhile
pub struct GatedTask {
    pub gate: Arc<Semaphore>,
    pub executing: Arc<AtomicUsize>,
}

impl GatedTask {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            executing: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Task for GatedTask {
    type Output = i64;

    async fn run(&self, _payload: &Payload) -> JobResult<i64> {
        self.executing.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| TaskError::failed("gate closed"))?;
        permit.forget();
        self.executing.fetch_sub(1, Ordering::SeqCst);
        Ok(1)
    }
}

pub fn sum_job(x: i64, y: i64) -> (Job<i64>, JobHandle<i64>) {
    let payload = Payload::default()
        .with_param("x", x.to_string())
        .with_param("y", y.to_string());
    let task: Arc<dyn Task<Output = i64>> = Arc::new(SumTask);
    Job::new(task, payload)
}

/// Polls until `check` holds, panicking after [`WAIT`]
pub async fn eventually(mut check: impl FnMut() -> bool, what: &str) {
    let polled = tokio::time::timeout(WAIT, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "timed out waiting for {what}");
}

pub async fn wait_for_idle<T: Send + 'static>(pool: &WorkerPool<T>) {
    let expected = pool.worker_count();
    eventually(|| pool.available_workers() == expected, "all workers idle").await;
}
