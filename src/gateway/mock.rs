//! Scripted test double for the analysis gateway

use super::{parse_assessment, AnalysisGateway, GatewayError};
use crate::record::Assessment;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Assessment(Assessment),
    /// Provider text, run through the same validation as a real reply
    Raw(String),
    Failure(GatewayError),
}

impl Reply {
    fn resolve(self) -> Result<Assessment, GatewayError> {
        match self {
            Self::Assessment(a) => Ok(a),
            Self::Raw(text) => parse_assessment(&text),
            Self::Failure(e) => Err(e),
        }
    }
}

/// Mock gateway for testing. Returns preconfigured replies.
///
/// Queued replies are consumed in order; once the queue is empty the
/// standing reply (if any) answers every call. With neither, calls fail
/// as `Unreachable`.
pub struct MockGateway {
    queue: Mutex<VecDeque<Reply>>,
    standing: Option<Reply>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    received: Mutex<Vec<String>>,
}

impl MockGateway {
    fn with_standing(standing: Option<Reply>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            standing,
            delay: None,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with the same assessment.
    pub fn replying(assessment: Assessment) -> Self {
        Self::with_standing(Some(Reply::Assessment(assessment)))
    }

    /// Answer every call with raw provider text.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::with_standing(Some(Reply::Raw(text.into())))
    }

    /// Fail every call with the given error.
    pub fn failing(error: GatewayError) -> Self {
        Self::with_standing(Some(Reply::Failure(error)))
    }

    /// No standing reply; only queued replies are served.
    pub fn scripted() -> Self {
        Self::with_standing(None)
    }

    /// Queue an assessment for the next unanswered call.
    pub fn then_reply(self, assessment: Assessment) -> Self {
        self.push(Reply::Assessment(assessment))
    }

    /// Queue raw provider text for the next unanswered call.
    pub fn then_raw(self, text: impl Into<String>) -> Self {
        self.push(Reply::Raw(text.into()))
    }

    /// Queue a failure for the next unanswered call.
    pub fn then_fail(self, error: GatewayError) -> Self {
        self.push(Reply::Failure(error))
    }

    /// Sleep before answering, to let concurrent callers interleave.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn push(mut self, reply: Reply) -> Self {
        self.queue
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    /// Number of `infer` calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Proposal texts received, in call order
    pub fn received(&self) -> Vec<String> {
        self.received
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn next_reply(&self) -> Option<Reply> {
        let queued = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        queued.or_else(|| self.standing.clone())
    }
}

#[async_trait]
impl AnalysisGateway for MockGateway {
    async fn infer(&self, content: &str) -> Result<Assessment, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut received) = self.received.lock() {
            received.push(content.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply() {
            Some(reply) => reply.resolve(),
            None => Err(GatewayError::Unreachable(
                "mock gateway has no reply configured".to_string(),
            )),
        }
    }
}
