//! RecordingTransport - in-memory transport for tests and simulations
//!
//! Records every attempted request and can be told to fail, so delivery and
//! retry behavior can be checked without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use contracts::{ContractError, HttpMethod, Transport, TransportRequest, TransportResponse};

#[derive(Debug, Default)]
struct RecordingState {
    attempts: Vec<TransportRequest>,
    delivered: Vec<TransportRequest>,
    /// Per-call outcome overrides, consumed front to back (`true` = fail)
    script: VecDeque<bool>,
    failing: bool,
    feed_body: Option<Bytes>,
}

/// Cloneable handle to a shared request log
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    name: Arc<str>,
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingTransport {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            state: Arc::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fail every request until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Fail the next `n` requests, then fall back to the default outcome.
    pub fn fail_next(&self, n: usize) {
        self.state().script.extend(std::iter::repeat_n(true, n));
    }

    /// Let the next `n` requests succeed, even while failing is set.
    pub fn succeed_next(&self, n: usize) {
        self.state().script.extend(std::iter::repeat_n(false, n));
    }

    /// Body returned for GET requests.
    pub fn set_feed_body(&self, body: impl Into<Bytes>) {
        self.state().feed_body = Some(body.into());
    }

    /// Every request seen, including failed ones.
    pub fn attempts(&self) -> Vec<TransportRequest> {
        self.state().attempts.clone()
    }

    /// Requests that were answered with success.
    pub fn delivered(&self) -> Vec<TransportRequest> {
        self.state().delivered.clone()
    }

    /// Successful requests of one method.
    pub fn delivered_with(&self, method: HttpMethod) -> Vec<TransportRequest> {
        self.state()
            .delivered
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    pub fn attempt_count(&self) -> usize {
        self.state().attempts.len()
    }
}

impl Transport for RecordingTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ContractError> {
        let mut state = self.state();
        state.attempts.push(request.clone());

        let fail = state.script.pop_front().unwrap_or(state.failing);
        if fail {
            return Err(ContractError::http_status(request.method, request.url, 503));
        }

        let body = match request.method {
            HttpMethod::Get => state
                .feed_body
                .clone()
                .unwrap_or_else(|| Bytes::from_static(br#"{"datastreams":[]}"#)),
            HttpMethod::Put | HttpMethod::Post => Bytes::new(),
        };
        state.delivered.push(request);

        Ok(TransportResponse { status: 200, body })
    }
}
