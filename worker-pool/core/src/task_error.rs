// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Outcome of a single job: either the task's value or the reason it failed
pub type JobResult<T> = Result<T, TaskError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The task ran and reported a failure
    #[error("task failed: {0}")]
    Failed(String),

    /// A required payload parameter was missing or malformed
    #[error("invalid parameter '{key}': {reason}")]
    InvalidParam { key: String, reason: String },

    /// The task panicked while running; the worker survived
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The pool stopped before the job produced a result
    #[error("worker pool stopped before the job completed")]
    PoolStopped,
}

impl TaskError {
    pub fn failed(msg: impl Into<String>) -> Self {
        TaskError::Failed(msg.into())
    }

    pub fn invalid_param(key: impl Into<String>, reason: impl Into<String>) -> Self {
        TaskError::InvalidParam {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
