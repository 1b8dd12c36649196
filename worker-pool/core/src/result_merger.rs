// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fan-in of many result streams into one.
//!
//! Each input gets a forwarding task. Forwarders report on a shared
//! completion channel when their input is exhausted, and a coordinating task
//! holds the last output sender until it has counted every completion, so
//! the merged stream ends exactly when all inputs have ended.

use crate::{JobHandle, JobResult};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, trace};

/// Merges `streams` into one stream with unspecified interleaving.
///
/// Must be called from within a Tokio runtime. Dropping the merged stream
/// stops the forwarders at their next item.
pub fn merge<S>(streams: impl IntoIterator<Item = S>) -> ReceiverStream<S::Item>
where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
{
    let streams: Vec<S> = streams.into_iter().collect();
    let inputs = streams.len();

    let (out_tx, out_rx) = mpsc::channel(inputs.max(1));
    let (done_tx, mut done_rx) = mpsc::channel::<usize>(inputs.max(1));

    for (index, stream) in streams.into_iter().enumerate() {
        let out_tx = out_tx.clone();
        let done_tx = done_tx.clone();

        tokio::spawn(async move {
            let mut stream = Box::pin(stream);
            while let Some(item) = stream.next().await {
                if out_tx.send(item).await.is_err() {
                    debug!(input = index, "merged stream dropped, forwarder exiting");
                    break;
                }
            }
            if done_tx.send(index).await.is_err() {
                trace!(input = index, "merge coordinator gone");
            }
        });
    }
    drop(done_tx);

    tokio::spawn(async move {
        let mut finished = 0;
        while finished < inputs {
            match done_rx.recv().await {
                Some(index) => {
                    trace!(input = index, "input drained");
                    finished += 1;
                }
                // a forwarder died without reporting
                None => break,
            }
        }
        trace!(inputs, finished, "all inputs drained, closing merged stream");
        drop(out_tx);
    });

    ReceiverStream::new(out_rx)
}

/// Merges the results of many jobs into one stream
pub fn merge_results<T>(
    handles: impl IntoIterator<Item = JobHandle<T>>,
) -> ReceiverStream<JobResult<T>>
where
    T: Send + 'static,
{
    merge(handles.into_iter().map(JobHandle::into_stream))
}
