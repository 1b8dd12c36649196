// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;
use worker_pool_core::{merge_results, Payload, Task, TaskError, WorkerPool};
use worker_pool_demo::{FailingTask, SleepTask, SumRunesTask, SumTask};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_sum_task_adds_params() {
    let payload = Payload::default().with_param("x", "5").with_param("y", "7");
    assert_eq!(SumTask.run(&payload).await, Ok(12));
}

#[tokio::test]
async fn test_sum_task_rejects_missing_param() {
    let payload = Payload::default().with_param("x", "5");
    assert_eq!(
        SumTask.run(&payload).await,
        Err(TaskError::invalid_param("y", "missing"))
    );
}

#[tokio::test]
async fn test_sum_task_reports_overflow() {
    let payload = Payload::default()
        .with_param("x", i64::MAX.to_string())
        .with_param("y", "1");
    assert!(matches!(SumTask.run(&payload).await, Err(TaskError::Failed(_))));
}

#[tokio::test]
async fn test_sum_runes_ignores_whitespace() {
    let payload = Payload::default().with_param("word", " a b\tc\n");
    assert_eq!(SumRunesTask.run(&payload).await, Ok(97 + 98 + 99));
}

#[tokio::test]
async fn test_failing_task_names_job_type() {
    let payload = Payload::new("nightly", Default::default());
    match FailingTask.run(&payload).await {
        Err(TaskError::Failed(msg)) => assert!(msg.contains("nightly")),
        other => panic!("Expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sleep_task_returns_its_delay() {
    let payload = Payload::default().with_param("ms", "5");
    assert_eq!(SleepTask.run(&payload).await, Ok(5));

    let negative = Payload::default().with_param("ms", "-1");
    assert_eq!(
        SleepTask.run(&negative).await,
        Err(TaskError::invalid_param("ms", "negative"))
    );
}

#[tokio::test]
async fn test_sleep_job_carries_delay_param() {
    let (job, _handle) = SleepTask::job(30);
    assert_eq!(job.payload().param("ms"), Some("30"));
}

#[tokio::test]
async fn test_sum_runes_jobs_through_pool() {
    let words = [
        "a new era of information is arising with guilhebl software solutions ... 123456789",
        " a b c d e f g h i j k l m n o p q r s t u v x z ",
        " test data !@#$%^",
        " !@#!%$#%!#%!#%!#%!_#)%*_@$)*%@#+%(#%{PQWIOR{PQIRAF:ALSKFMZX>V M>A< BDKJAS{PQOIRQOPWIRQ QWIEQ{WPI!@_$)(!_)%(*",
    ];

    let (queue, rx) = mpsc::channel(4);
    let mut pool = WorkerPool::<i64>::with_workers(4);
    pool.start(ReceiverStream::new(rx));

    let mut handles = Vec::new();
    for word in words {
        let (job, handle) = SumRunesTask::job(word);
        queue.send(job).await.unwrap();
        handles.push(handle);
    }

    let sum: i64 = timeout(WAIT, merge_results(handles).collect::<Vec<_>>())
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.unwrap())
        .sum();
    assert_eq!(sum, 17311);

    assert!(pool.stop().await);
}

#[tokio::test]
async fn test_sum_jobs_through_pool() {
    let (queue, rx) = mpsc::channel(4);
    let mut pool = WorkerPool::<i64>::with_workers(2);
    pool.start(ReceiverStream::new(rx));

    let (job, handle) = SumTask::job(40, 2);
    queue.send(job).await.unwrap();

    assert_eq!(timeout(WAIT, handle).await.unwrap(), Ok(42));
    assert!(pool.stop().await);
}
