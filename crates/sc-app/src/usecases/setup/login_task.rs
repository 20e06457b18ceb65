//! Background login task owned by a setup flow.

use std::sync::Arc;

use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info_span, warn, Instrument};

use sc_core::ids::FlowId;
use sc_core::ports::{FlowProgressPort, VehicleConnection};

/// What the login attempt concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn,
    Failed,
}

/// The task ended without producing an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginTaskError {
    #[error("login task panicked")]
    Panicked,
    #[error("login task was cancelled")]
    Cancelled,
}

/// Handle to a running or finished login attempt.
///
/// The outcome is cached once awaited so the login step can be re-run
/// without awaiting the handle twice.
pub struct LoginTask {
    handle: Option<JoinHandle<LoginOutcome>>,
    outcome: Option<Result<LoginOutcome, LoginTaskError>>,
}

impl LoginTask {
    /// Spawns the login and re-signals the flow when it ends, whatever the
    /// outcome, including a panic.
    pub fn spawn(
        flow_id: FlowId,
        connection: Arc<dyn VehicleConnection>,
        progress: Arc<dyn FlowProgressPort>,
    ) -> Self {
        let span = info_span!("usecase.setup_flow.login_task", flow_id = %flow_id);
        let handle = tokio::spawn(
            async move {
                let signal = ProgressOnExit {
                    flow_id: Some(flow_id),
                    progress,
                };
                let outcome = run_login(connection.as_ref()).await;
                debug!(?outcome, "login task finished");
                signal.notify().await;
                outcome
            }
            .instrument(span),
        );

        Self {
            handle: Some(handle),
            outcome: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.is_finished(),
            None => true,
        }
    }

    pub fn abort(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    /// Handle that can stop the task while another caller is waiting on it.
    /// `None` once the outcome was collected.
    pub fn abort_handle(&self) -> Option<AbortHandle> {
        self.handle.as_ref().map(JoinHandle::abort_handle)
    }

    /// Waits for the task and returns its outcome.
    pub async fn wait(&mut self) -> Result<LoginOutcome, LoginTaskError> {
        if let Some(outcome) = self.outcome {
            return outcome;
        }

        let outcome = match self.handle.take() {
            Some(handle) => match handle.await {
                Ok(outcome) => Ok(outcome),
                Err(err) if err.is_panic() => Err(LoginTaskError::Panicked),
                Err(_) => Err(LoginTaskError::Cancelled),
            },
            None => Err(LoginTaskError::Cancelled),
        };
        self.outcome = Some(outcome);
        outcome
    }
}

impl Drop for LoginTask {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

/// Re-signals the flow once the task ends. If the task unwinds or is
/// aborted before `notify` ran, the signal is sent from `Drop`.
struct ProgressOnExit {
    flow_id: Option<FlowId>,
    progress: Arc<dyn FlowProgressPort>,
}

impl ProgressOnExit {
    async fn notify(mut self) {
        if let Some(flow_id) = self.flow_id.take() {
            self.progress.notify_progress(&flow_id).await;
        }
    }
}

impl Drop for ProgressOnExit {
    fn drop(&mut self) {
        let Some(flow_id) = self.flow_id.take() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let progress = self.progress.clone();
        runtime.spawn(async move {
            progress.notify_progress(&flow_id).await;
        });
    }
}

async fn run_login(connection: &dyn VehicleConnection) -> LoginOutcome {
    if let Err(err) = connection.login().await {
        error!(error = %err, "Failed to login");
        return LoginOutcome::Failed;
    }
    if !connection.logged_in() {
        warn!("login returned but the connection is not logged in");
        return LoginOutcome::Failed;
    }
    LoginOutcome::LoggedIn
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use sc_core::ports::Vehicle;
    use tokio::sync::Notify;

    use super::*;

    enum Behavior {
        Succeed,
        Fail,
        NotLoggedIn,
        Panic,
        Hang,
    }

    struct StubConnection {
        behavior: Behavior,
    }

    #[async_trait]
    impl VehicleConnection for StubConnection {
        async fn login(&self) -> anyhow::Result<()> {
            match self.behavior {
                Behavior::Succeed | Behavior::NotLoggedIn => Ok(()),
                Behavior::Fail => Err(anyhow::anyhow!("bad credentials")),
                Behavior::Panic => panic!("client library bug"),
                Behavior::Hang => {
                    std::future::pending::<()>().await;
                    Ok(())
                }
            }
        }

        fn logged_in(&self) -> bool {
            matches!(self.behavior, Behavior::Succeed)
        }

        async fn validate_login(&self) -> anyhow::Result<bool> {
            Ok(true)
        }

        fn vehicles(&self) -> Vec<Arc<dyn Vehicle>> {
            Vec::new()
        }
    }

    #[derive(Default)]
    struct CountingProgress {
        calls: AtomicUsize,
        notify: Notify,
    }

    #[async_trait]
    impl FlowProgressPort for CountingProgress {
        async fn notify_progress(&self, _flow_id: &FlowId) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.notify.notify_one();
        }
    }

    fn spawn(behavior: Behavior, progress: Arc<CountingProgress>) -> LoginTask {
        LoginTask::spawn(
            FlowId::new(),
            Arc::new(StubConnection { behavior }),
            progress,
        )
    }

    #[tokio::test]
    async fn successful_login_notifies_and_reports_logged_in() {
        let progress = Arc::new(CountingProgress::default());
        let mut task = spawn(Behavior::Succeed, progress.clone());

        assert_eq!(task.wait().await, Ok(LoginOutcome::LoggedIn));
        assert_eq!(progress.calls.load(Ordering::SeqCst), 1);
        assert!(task.is_finished());
    }

    #[tokio::test]
    async fn failing_login_still_notifies() {
        let progress = Arc::new(CountingProgress::default());
        let mut task = spawn(Behavior::Fail, progress.clone());

        assert_eq!(task.wait().await, Ok(LoginOutcome::Failed));
        assert_eq!(progress.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn not_logged_in_after_login_is_a_failure() {
        let progress = Arc::new(CountingProgress::default());
        let mut task = spawn(Behavior::NotLoggedIn, progress);

        assert_eq!(task.wait().await, Ok(LoginOutcome::Failed));
    }

    #[tokio::test]
    async fn panicking_login_is_reported_cached_and_still_notifies() {
        let progress = Arc::new(CountingProgress::default());
        let mut task = spawn(Behavior::Panic, progress.clone());

        assert_eq!(task.wait().await, Err(LoginTaskError::Panicked));
        assert_eq!(task.wait().await, Err(LoginTaskError::Panicked));

        tokio::time::timeout(Duration::from_secs(5), progress.notify.notified())
            .await
            .expect("panicked login task should still re-signal the flow");
        assert_eq!(progress.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn aborted_task_reports_cancelled() {
        let progress = Arc::new(CountingProgress::default());
        let mut task = spawn(Behavior::Hang, progress);
        assert!(!task.is_finished());

        task.abort();

        assert_eq!(task.wait().await, Err(LoginTaskError::Cancelled));
        assert!(task.is_finished());
    }

    #[tokio::test]
    async fn abort_handle_stops_a_task_that_is_being_waited_on() {
        let progress = Arc::new(CountingProgress::default());
        let mut task = spawn(Behavior::Hang, progress.clone());
        let abort = task.abort_handle().unwrap();

        let waiter = tokio::spawn(async move { task.wait().await });
        tokio::task::yield_now().await;
        abort.abort();

        let outcome = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiting on an aborted task should return")
            .unwrap();
        assert_eq!(outcome, Err(LoginTaskError::Cancelled));

        tokio::time::timeout(Duration::from_secs(5), progress.notify.notified())
            .await
            .expect("aborted login task should still re-signal the flow");
    }
}
