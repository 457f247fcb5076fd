//! Per-request context: request id, deadline and cancellation
//!
//! Every store call made on behalf of a request goes through
//! [`RequestContext::run`], which races the call against the deadline and
//! the cancellation signal and labels failures with the lookup stage.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::result::{Error, QueryStage, Result};

/// Cancels the request it was created with
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            deadline: None,
            cancel: None,
        }
    }

    /// Fail store calls still running `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach a cancellation signal and return the handle that fires it
    pub fn cancellable(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Run one store call for `stage`
    ///
    /// Store errors come back as `Error::Query` labelled with `stage`.
    /// Cancellation or an expired deadline drops the in-flight call and
    /// returns `Error::Cancelled`.
    pub async fn run<T, F>(&self, stage: QueryStage, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(cancelled(stage, "request cancelled"));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(cancelled(stage, "deadline exceeded"));
            }
        }

        let mut cancel = self.cancel.clone();
        let cancel_signal = async move {
            if let Some(rx) = cancel.as_mut() {
                // A dropped handle can no longer cancel; wait forever instead.
                if rx.wait_for(|cancelled| *cancelled).await.map(|_| ()).is_ok() {
                    return;
                }
            }
            std::future::pending::<()>().await
        };

        let deadline = self.deadline;
        let deadline_signal = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel_signal => Err(cancelled(stage, "request cancelled")),
            _ = deadline_signal => Err(cancelled(stage, "deadline exceeded")),
            result = call => result.map_err(|err| Error::query(stage, err)),
        }
    }
}

fn cancelled(stage: QueryStage, reason: &str) -> Error {
    Error::Cancelled {
        stage,
        reason: reason.to_string(),
    }
}
