// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use worker_pool_core::{Job, JobHandle, JobResult, Payload, Task, TaskError};

fn required<'a>(payload: &'a Payload, key: &str) -> JobResult<&'a str> {
    payload
        .param(key)
        .ok_or_else(|| TaskError::invalid_param(key, "missing"))
}

fn integer(payload: &Payload, key: &str) -> JobResult<i64> {
    required(payload, key)?
        .parse()
        .map_err(|_| TaskError::invalid_param(key, "not an integer"))
}

/// Adds the `x` and `y` parameters
pub struct SumTask;

impl SumTask {
    pub fn job(x: i64, y: i64) -> (Job<i64>, JobHandle<i64>) {
        let payload = Payload::new("sum", Default::default())
            .with_param("x", x.to_string())
            .with_param("y", y.to_string());
        let task: Arc<dyn Task<Output = i64>> = Arc::new(SumTask);
        Job::new(task, payload)
    }
}

#[async_trait]
impl Task for SumTask {
    type Output = i64;

    async fn run(&self, payload: &Payload) -> JobResult<i64> {
        let x = integer(payload, "x")?;
        let y = integer(payload, "y")?;
        x.checked_add(y)
            .ok_or_else(|| TaskError::failed(format!("{x} + {y} overflows")))
    }
}

/// Sums the code points of the `word` parameter, ignoring whitespace
pub struct SumRunesTask;

impl SumRunesTask {
    pub fn job(word: &str) -> (Job<i64>, JobHandle<i64>) {
        let payload = Payload::new("sum_runes", Default::default()).with_param("word", word);
        let task: Arc<dyn Task<Output = i64>> = Arc::new(SumRunesTask);
        Job::new(task, payload)
    }
}

#[async_trait]
impl Task for SumRunesTask {
    type Output = i64;

    async fn run(&self, payload: &Payload) -> JobResult<i64> {
        let word = required(payload, "word")?;
        Ok(word
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c as i64)
            .sum())
    }
}

/// Always returns the same value
pub struct ConstTask(pub i64);

#[async_trait]
impl Task for ConstTask {
    type Output = i64;

    async fn run(&self, _payload: &Payload) -> JobResult<i64> {
        Ok(self.0)
    }
}

/// Always fails
pub struct FailingTask;

#[async_trait]
impl Task for FailingTask {
    type Output = i64;

    async fn run(&self, payload: &Payload) -> JobResult<i64> {
        Err(TaskError::failed(format!(
            "'{}' jobs are configured to fail",
            payload.job_type
        )))
    }
}

/// Sleeps for `ms` milliseconds and returns the delay
pub struct SleepTask;

impl SleepTask {
    pub fn job(ms: u64) -> (Job<i64>, JobHandle<i64>) {
        let payload = Payload::new("sleep", Default::default()).with_param("ms", ms.to_string());
        let task: Arc<dyn Task<Output = i64>> = Arc::new(SleepTask);
        Job::new(task, payload)
    }
}

#[async_trait]
impl Task for SleepTask {
    type Output = i64;

    async fn run(&self, payload: &Payload) -> JobResult<i64> {
        let ms = integer(payload, "ms")?;
        let delay = u64::try_from(ms).map_err(|_| TaskError::invalid_param("ms", "negative"))?;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(ms)
    }
}
