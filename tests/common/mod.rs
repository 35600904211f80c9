//! Shared test doubles.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cordial::{Error, Request, Response, Result, Transport};

/// Transport double with scripted responses, a dispatch counter, and a
/// recording of every request it saw.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Response>>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Script a 200 response with a JSON body.
    pub fn push_ok(&self, body: serde_json::Value) {
        self.responses.lock().unwrap().push_back(Ok(Response {
            status: 200,
            body: Some(body),
        }));
    }

    /// Script an empty 204 response.
    pub fn push_empty(&self) {
        self.responses.lock().unwrap().push_back(Ok(Response {
            status: 204,
            body: None,
        }));
    }

    /// Script a failure.
    pub fn push_err(&self, err: Error) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    /// Number of dispatches that reached this transport.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request dispatched, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: &Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(Response {
                    status: 204,
                    body: None,
                })
            })
    }
}
