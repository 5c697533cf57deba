//! Scripted transport for exercising retry and cache behaviour without a network

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{FetchRequest, Method, Params, Transport, TransportError, TransportResponse};

/// Transport that replays a fixed script of outcomes and records requests
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    pub(crate) calls: Mutex<Vec<(Method, String, Params)>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<Result<TransportResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn ok(body: &str) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    pub(crate) fn status(status: u16) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status,
            body: String::new(),
        })
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &FetchRequest<'_>) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push((
            request.method,
            request.url.to_string(),
            request.params.clone(),
        ));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("script exhausted".into())))
    }
}
