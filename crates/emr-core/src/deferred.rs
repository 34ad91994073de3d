//! Cancellable delayed mutations.
//!
//! Form actions settle after a configured latency. Each pending action
//! carries a [`CancellationToken`]; cancelling it before the delay elapses
//! guarantees the store is never touched. An action that does fire runs
//! against the store as it is at that moment, so a record deleted in the
//! meantime surfaces as `NotFound`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::export::{present_report, ExportResult, ReportDocument, ReportPresenter};
use crate::store::{Hospital, StoreError, StoreResult};

/// Deferred mutation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeferredError {
    #[error("Action cancelled before it settled")]
    Cancelled,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Pending action aborted: {0}")]
    Aborted(String),
}

pub type DeferredResult<T> = Result<T, DeferredError>;

/// Cancels the paired [`CancellationToken`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes cancellation from a [`CancelHandle`].
#[derive(Debug, Clone)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Never resolves if the handle is dropped
    /// without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// A linked handle/token pair.
pub fn cancellation_pair() -> (CancelHandle, CancellationToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancellationToken { rx })
}

/// Wait `delay`, then apply `op` to the store unless cancelled first.
pub async fn settle<T, F>(
    delay: Duration,
    mut token: CancellationToken,
    hospital: &Mutex<Hospital>,
    op: F,
) -> DeferredResult<T>
where
    F: FnOnce(&mut Hospital) -> StoreResult<T>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::debug!("pending action cancelled");
            return Err(DeferredError::Cancelled);
        }
        _ = tokio::time::sleep(delay) => {}
    }
    if token.is_cancelled() {
        return Err(DeferredError::Cancelled);
    }

    let mut hospital = hospital.lock().map_err(|_| DeferredError::Poisoned)?;
    Ok(op(&mut hospital)?)
}

/// A spawned [`settle`] that can be cancelled from the caller's side.
#[derive(Debug)]
pub struct PendingAction<T> {
    handle: CancelHandle,
    task: JoinHandle<DeferredResult<T>>,
}

impl<T: Send + 'static> PendingAction<T> {
    /// Spawn onto the current tokio runtime.
    pub fn spawn<F>(delay: Duration, hospital: Arc<Mutex<Hospital>>, op: F) -> Self
    where
        F: FnOnce(&mut Hospital) -> StoreResult<T> + Send + 'static,
    {
        let (handle, token) = cancellation_pair();
        let task = tokio::spawn(async move { settle(delay, token, &hospital, op).await });
        Self { handle, task }
    }

    /// Cancel; a no-op if the action has already settled.
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub async fn wait(self) -> DeferredResult<T> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(DeferredError::Aborted(e.to_string())),
        }
    }
}

/// Present a report, keep it up for `teardown_after`, then tear it down.
pub async fn print_report(
    presenter: &dyn ReportPresenter,
    document: &ReportDocument,
    teardown_after: Duration,
) -> ExportResult<()> {
    present_report(presenter, document)?;
    tokio::time::sleep(teardown_after).await;
    presenter.teardown(document)
}
