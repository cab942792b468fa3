// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::mpsc::{self, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::trace;

/// Background job that waits `delay`, runs, and reports back over a channel.
///
/// Dropping the handle cancels the task: a cancelled task never sends, even if
/// its job already ran.
#[derive(Debug)]
pub struct DeferredTask {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DeferredTask {
    pub fn spawn<T, F>(delay: Duration, tx: Sender<T>, job: F) -> Self
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            match cancel_rx.recv_timeout(delay) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    trace!("deferred task cancelled before it ran");
                    return;
                }
            }

            let output = job();
            if matches!(cancel_rx.try_recv(), Err(TryRecvError::Empty)) {
                let _ = tx.send(output);
            } else {
                trace!("deferred task cancelled after it ran");
            }
        });

        Self {
            cancel: Some(cancel_tx),
            handle: Some(handle),
        }
    }

    /// Sends `event` after `delay` unless cancelled first.
    pub fn schedule<T>(delay: Duration, tx: Sender<T>, event: T) -> Self
    where
        T: Send + 'static,
    {
        Self::spawn(delay, tx, move || event)
    }

    pub fn cancel(&mut self) {
        self.cancel.take();
        self.handle.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for DeferredTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::DeferredTask;
    use std::sync::mpsc::{self, TryRecvError};
    use std::time::Duration;

    #[test]
    fn scheduled_event_arrives_after_delay_and_not_before() {
        let (tx, rx) = mpsc::channel();
        let _task = DeferredTask::schedule(Duration::from_millis(200), tx, "done");

        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("done"));
    }

    #[test]
    fn dropped_task_never_delivers() {
        let (tx, rx) = mpsc::channel();
        let task = DeferredTask::schedule(Duration::from_millis(50), tx, 7_u8);
        drop(task);

        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn cancel_is_idempotent() {
        let (tx, _rx) = mpsc::channel::<()>();
        let mut task = DeferredTask::schedule(Duration::from_secs(60), tx, ());
        assert!(!task.is_cancelled());
        task.cancel();
        task.cancel();
        assert!(task.is_cancelled());
        assert!(task.is_finished());
    }
}
