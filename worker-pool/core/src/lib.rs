// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod payload;
pub use payload::Payload;

mod task_error;
pub use task_error::{JobResult, TaskError};

mod task;
pub use task::Task;

mod job;
pub use job::{Job, JobHandle};

mod availability_registry;
pub use availability_registry::AvailabilityRegistry;

mod worker;
pub use worker::{Worker, WorkerHandle, WorkerStopper};

mod pool_config;
pub use pool_config::PoolConfig;

mod worker_pool;
pub use worker_pool::WorkerPool;

pub mod result_merger;
pub use result_merger::{merge, merge_results};
