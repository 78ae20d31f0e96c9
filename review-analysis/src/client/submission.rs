//! Abandonable background submissions.

use review_common::logging::generate_trace_id;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{AnalysisOutcome, ResilientClient};

/// Handle to a submission running on the tokio runtime.
///
/// Abandoning the handle (explicitly, or by dropping it) cancels the pending
/// backoff or in-flight request, and the outcome is never delivered.
pub struct Submission {
    id: String,
    token: CancellationToken,
    handle: JoinHandle<Option<AnalysisOutcome>>,
}

impl Submission {
    pub(crate) fn spawn(client: ResilientClient, text: String) -> Self {
        let id = generate_trace_id();
        let token = CancellationToken::new();
        let task_token = token.clone();

        tracing::debug!(submission = %id, "Starting submission");
        let task_id = id.clone();
        let handle = tokio::spawn(async move {
            client
                .run_until_cancelled(&task_id, &text, &task_token)
                .await
        });

        Self { id, token, handle }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Withdraw interest in this submission.
    pub fn abandon(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!(submission = %self.id, "Abandoning submission");
            self.token.cancel();
        }
    }

    pub fn is_abandoned(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the background task has stopped running.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the outcome.
    ///
    /// Returns `None` if the submission was abandoned, even when the task had
    /// already produced a result before the abandonment.
    pub async fn outcome(mut self) -> Option<AnalysisOutcome> {
        self.join().await
    }

    /// Wait for the task without giving up ownership of it.
    ///
    /// Dropping this future leaves the submission running. Must not be polled
    /// again once it has completed.
    async fn join(&mut self) -> Option<AnalysisOutcome> {
        let joined = (&mut self.handle).await;
        if self.token.is_cancelled() {
            return None;
        }
        match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                tracing::warn!(submission = %self.id, error = %e, "Submission task cancelled by runtime");
                None
            }
        }
    }
}

impl Drop for Submission {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// The caller's single current submission.
///
/// Starting a new submission abandons the previous one, so a stale result can
/// never land in state that belongs to a newer submission.
#[derive(Default)]
pub struct SubmissionSlot {
    current: Option<Submission>,
}

impl SubmissionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a submission, abandoning any previous one. Returns its id.
    pub fn start(&mut self, client: &ResilientClient, text: impl Into<String>) -> String {
        self.abandon();
        let submission = client.spawn(text);
        let id = submission.id().to_string();
        self.current = Some(submission);
        id
    }

    /// A submission is running and has not been abandoned.
    pub fn is_pending(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| !s.is_finished() && !s.is_abandoned())
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(Submission::id)
    }

    /// Abandon the current submission, if any.
    pub fn abandon(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.abandon();
        }
    }

    /// Wait for the current submission's outcome and clear the slot.
    ///
    /// Cancel safe: if this future is dropped before the submission finishes,
    /// the submission stays in the slot and keeps running.
    pub async fn outcome(&mut self) -> Option<AnalysisOutcome> {
        let outcome = self.current.as_mut()?.join().await;
        self.current = None;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{status, ScriptedTransport, ONE_ASPECT};
    use crate::client::ResilienceConfig;
    use std::sync::Arc;
    use std::time::Duration;

    fn client(transport: &Arc<ScriptedTransport>) -> ResilientClient {
        ResilientClient::with_transport(
            transport.clone(),
            ResilienceConfig {
                max_retries: 3,
                base_backoff_ms: 1000,
                max_backoff_ms: 60_000,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_submission_delivers_outcome() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(429, ""),
            status(200, ONE_ASPECT),
        ]));
        let submission = client(&transport).spawn("The battery is great.");
        assert_eq!(submission.id().len(), 36);

        let outcome = submission.outcome().await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_mid_backoff_yields_nothing() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(429, ""),
            status(200, ONE_ASPECT),
        ]));
        let submission = client(&transport).spawn("review");

        // First attempt is rate limited; the task is now in its 1s backoff.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(transport.calls(), 1);

        submission.abandon();
        assert!(submission.is_abandoned());
        assert!(submission.outcome().await.is_none());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abandon_after_completion_still_hides_result() {
        let transport = Arc::new(ScriptedTransport::always(status(200, ONE_ASPECT)));
        let submission = client(&transport).spawn("review");

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(submission.is_finished());

        submission.abandon();
        assert!(submission.outcome().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_abandons() {
        let transport = Arc::new(ScriptedTransport::always(status(429, "")));
        let submission = client(&transport).spawn("review");

        tokio::time::sleep(Duration::from_millis(500)).await;
        drop(submission);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn new_submission_abandons_previous() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(429, ""),
            status(200, ONE_ASPECT),
        ]));
        let client = client(&transport);
        let mut slot = SubmissionSlot::new();

        let first = slot.start(&client, "first review");
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(slot.is_pending());

        let second = slot.start(&client, "second review");
        assert_ne!(first, second);
        assert_eq!(slot.current_id(), Some(second.as_str()));

        // Only the second submission reports; the first was abandoned in backoff.
        let outcome = slot.outcome().await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 1);
        assert_eq!(transport.calls(), 2);
        assert!(!slot.is_pending());
        assert!(slot.outcome().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn validation_error_through_slot() {
        let transport = Arc::new(ScriptedTransport::always(status(200, "[]")));
        let mut slot = SubmissionSlot::new();
        slot.start(&client(&transport), "  ");

        let outcome = slot.outcome().await.unwrap();
        assert!(matches!(outcome, AnalysisOutcome::ValidationError { .. }));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupted_wait_keeps_submission() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(429, ""),
            status(200, ONE_ASPECT),
        ]));
        let mut slot = SubmissionSlot::new();
        let id = slot.start(&client(&transport), "review");

        // Stop waiting while the task sits in its 1s backoff.
        tokio::select! {
            _ = slot.outcome() => panic!("outcome arrived before the backoff elapsed"),
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }
        assert!(slot.is_pending());
        assert_eq!(slot.current_id(), Some(id.as_str()));

        let outcome = slot.outcome().await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(transport.calls(), 2);
        assert!(slot.current_id().is_none());
    }
}
