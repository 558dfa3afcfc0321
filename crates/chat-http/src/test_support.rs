//! Scripted transport used by this crate's tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::error::HttpError;
use crate::request::{HttpRequest, HttpResponse};
use crate::transport::HttpTransport;

/// Answers requests from a queue of canned results (200 `{}` once empty) and
/// records every request it sees
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, String>>>,
    calls: Mutex<Vec<HttpRequest>>,
    log: Mutex<Vec<String>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Each call sleeps for `latency` before answering
    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency: Some(latency),
            ..Self::default()
        })
    }

    pub fn push(&self, response: HttpResponse) {
        self.script.lock().push_back(Ok(response));
    }

    pub fn push_error(&self, message: &str) {
        self.script.lock().push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().clone()
    }

    /// `start <url>` / `end <url>` entries in call order
    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.log.lock().push(format!("start {}", request.url));
        self.calls.lock().push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = self.script.lock().pop_front();
        self.log.lock().push(format!("end {}", request.url));
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(HttpError::Transport(message)),
            None => Ok(HttpResponse::new(200, "{}")),
        }
    }
}
