// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;
use tracing::{debug, warn};
use workbook_app::{DeferredTask, SubmissionToken, SummaryPayload};
use workbook_dispatch::Dispatcher;
use workbook_tui::{InternalEvent, WorkbookRuntime};

/// Runs submissions through a [`Dispatcher`] after the configured delay.
pub struct DispatchRuntime {
    dispatcher: Arc<dyn Dispatcher>,
    delay: Duration,
}

impl DispatchRuntime {
    pub fn new(dispatcher: Arc<dyn Dispatcher>, delay: Duration) -> Self {
        Self { dispatcher, delay }
    }
}

impl WorkbookRuntime for DispatchRuntime {
    fn submission_delay(&self) -> Duration {
        self.delay
    }

    fn spawn_submission(
        &mut self,
        token: SubmissionToken,
        payload: &SummaryPayload,
        tx: Sender<InternalEvent>,
    ) -> Result<DeferredTask> {
        debug!(token = token.get(), delay_ms = self.delay.as_millis(), "scheduling submission");
        let dispatcher = Arc::clone(&self.dispatcher);
        let payload = payload.clone();
        Ok(DeferredTask::spawn(self.delay, tx, move || {
            match dispatcher.dispatch(&payload) {
                Ok(()) => InternalEvent::SubmissionElapsed { token },
                Err(error) => {
                    warn!(token = token.get(), error = %format!("{error:#}"), "dispatch failed");
                    InternalEvent::SubmissionFailed {
                        token,
                        message: format!("{error:#}"),
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::DispatchRuntime;
    use anyhow::{Result, bail};
    use crate::config::Config;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};
    use workbook_app::{
        SUBMISSION_DELAY, SubmissionToken, SummaryPayload, WorkbookCommand, WorkbookEvent,
        WorkbookState,
    };
    use workbook_dispatch::{Dispatcher, SimulatedDispatcher};
    use workbook_tui::{InternalEvent, WorkbookRuntime};

    #[derive(Default)]
    struct CountingDispatcher {
        calls: AtomicUsize,
        fail: bool,
    }

    impl Dispatcher for CountingDispatcher {
        fn dispatch(&self, _payload: &SummaryPayload) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("server returned 503");
            }
            Ok(())
        }
    }

    fn started(state: &mut WorkbookState) -> (SubmissionToken, SummaryPayload) {
        state.dispatch(WorkbookCommand::SetEmail("user@example.com".to_owned()));
        match state.dispatch(WorkbookCommand::Submit).into_iter().next() {
            Some(WorkbookEvent::SubmissionStarted { token, payload }) => (token, payload),
            other => panic!("expected submission start, got {other:?}"),
        }
    }

    #[test]
    fn simulated_dispatch_reports_elapsed_after_delay() -> Result<()> {
        let mut runtime =
            DispatchRuntime::new(Arc::new(SimulatedDispatcher), Duration::from_millis(30));
        let mut state = WorkbookState::default();
        let (token, payload) = started(&mut state);

        let (tx, rx) = mpsc::channel();
        let _task = runtime.spawn_submission(token, &payload, tx)?;
        let event = rx.recv_timeout(Duration::from_secs(5))?;
        assert_eq!(event, InternalEvent::SubmissionElapsed { token });
        Ok(())
    }

    #[test]
    fn default_config_holds_processing_for_the_full_delay() -> Result<()> {
        let delay = Config::default().submission_delay()?;
        assert_eq!(delay, SUBMISSION_DELAY);
        assert_eq!(delay, Duration::from_millis(1500));

        let mut runtime = DispatchRuntime::new(Arc::new(SimulatedDispatcher), delay);
        assert_eq!(runtime.submission_delay(), delay);
        let mut state = WorkbookState::default();
        let (token, payload) = started(&mut state);

        let (tx, rx) = mpsc::channel();
        let started_at = Instant::now();
        let _task = runtime.spawn_submission(token, &payload, tx)?;
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());

        let event = rx.recv_timeout(Duration::from_secs(5))?;
        assert_eq!(event, InternalEvent::SubmissionElapsed { token });
        assert!(started_at.elapsed() >= delay);
        Ok(())
    }

    #[test]
    fn dispatcher_error_reports_failure_message() -> Result<()> {
        let dispatcher = Arc::new(CountingDispatcher {
            fail: true,
            ..CountingDispatcher::default()
        });
        let mut runtime = DispatchRuntime::new(dispatcher.clone(), Duration::from_millis(10));
        let mut state = WorkbookState::default();
        let (token, payload) = started(&mut state);

        let (tx, rx) = mpsc::channel();
        let _task = runtime.spawn_submission(token, &payload, tx)?;
        match rx.recv_timeout(Duration::from_secs(5))? {
            InternalEvent::SubmissionFailed {
                token: failed,
                message,
            } => {
                assert_eq!(failed, token);
                assert!(message.contains("503"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn cancelled_submission_never_dispatches() -> Result<()> {
        let dispatcher = Arc::new(CountingDispatcher::default());
        let mut runtime = DispatchRuntime::new(dispatcher.clone(), Duration::from_millis(100));
        let mut state = WorkbookState::default();
        let (token, payload) = started(&mut state);

        let (tx, rx) = mpsc::channel();
        let task = runtime.spawn_submission(token, &payload, tx)?;
        drop(task);
        assert!(rx.recv_timeout(Duration::from_millis(400)).is_err());
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
        Ok(())
    }
}
