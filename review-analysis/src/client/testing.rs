//! Scripted transport for driving the retry loop in unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

use super::{Transport, TransportError, TransportResponse};
use crate::model::AnalysisRequest;

pub(crate) type Step = Result<TransportResponse, TransportError>;

/// Replays a fixed script of responses; the last step repeats forever.
pub(crate) struct ScriptedTransport {
    script: Vec<Step>,
    calls: AtomicUsize,
    sent_at: Mutex<Vec<Instant>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<Step>) -> Self {
        assert!(!script.is_empty(), "script needs at least one step");
        Self {
            script,
            calls: AtomicUsize::new(0),
            sent_at: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn always(step: Step) -> Self {
        Self::new(vec![step])
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn sent_at(&self) -> Vec<Instant> {
        self.sent_at.lock().unwrap().clone()
    }
}

pub(crate) fn status(code: u16, body: &str) -> Step {
    Ok(TransportResponse::new(code, body))
}

pub(crate) fn refused() -> Step {
    Err(TransportError::Connect("connection refused".into()))
}

pub(crate) const ONE_ASPECT: &str =
    r#"[{"aspect":"battery","opinion":"great","context":"The battery is great.","sentiment":"Positive","score":0.62}]"#;

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, _request: &AnalysisRequest) -> Result<TransportResponse, TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent_at.lock().unwrap().push(Instant::now());
        let idx = call.min(self.script.len() - 1);
        self.script[idx].clone()
    }
}
