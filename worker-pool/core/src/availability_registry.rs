// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::WorkerHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// Bounded FIFO of idle workers shared by the dispatcher and the workers.
///
/// Workers publish a handle each time they become idle; dispatch tasks take
/// one handle per job. The capacity equals the worker count, so publishing
/// never waits while the pool is healthy.
pub struct AvailabilityRegistry<T: Send + 'static> {
    tx: mpsc::Sender<WorkerHandle<T>>,
    // tokio's Mutex is fair, so waiting dispatch tasks are served in order
    rx: Mutex<mpsc::Receiver<WorkerHandle<T>>>,
    closing: CancellationToken,
    closed: AtomicBool,
}

impl<T: Send + 'static> AvailabilityRegistry<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "availability registry needs a capacity of at least one");
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
            closing: CancellationToken::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Number of idle worker handles currently queued. Does not consume any.
    pub fn available(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Publishes an idle worker. Returns false once the registry is closing.
    pub async fn publish(&self, handle: WorkerHandle<T>) -> bool {
        if self.closing.is_cancelled() {
            return false;
        }
        self.tx.send(handle).await.is_ok()
    }

    /// Waits for the next idle worker.
    ///
    /// Returns `None` when the registry is closed, even if handles are still
    /// queued.
    pub async fn acquire(&self) -> Option<WorkerHandle<T>> {
        tokio::select! {
            biased;
            _ = self.closing.cancelled() => None,
            handle = async { self.rx.lock().await.recv().await } => handle,
        }
    }

    /// Wakes every pending `acquire` with `None` and fails later `publish`
    /// calls without waiting for the receiver lock. Queued handles stay until
    /// `close`.
    pub fn shutdown(&self) {
        self.closing.cancel();
    }

    /// Closes the registry and discards every queued handle.
    ///
    /// Pending `acquire` calls resolve to `None` and later `publish` calls
    /// fail.
    pub async fn close(&self) {
        self.shutdown();

        let mut rx = self.rx.lock().await;
        rx.close();
        while rx.try_recv().is_ok() {}

        self.closed.store(true, Ordering::Release);
    }

    /// Non-consuming openness probe
    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }
}
