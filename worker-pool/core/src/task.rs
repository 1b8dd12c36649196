// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{JobResult, Payload};
use async_trait::async_trait;

/// Business logic executed by a worker for one job.
///
/// One instance may be shared by many workers at the same time, so any
/// mutable state inside an implementation needs its own synchronization.
/// Failures are reported through the returned [`JobResult`], never by
/// aborting the worker.
#[async_trait]
pub trait Task: Send + Sync {
    type Output: Send + 'static;

    async fn run(&self, payload: &Payload) -> JobResult<Self::Output>;
}
