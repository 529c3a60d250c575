//! Shared fixtures: a transport that records requests and replays canned
//! responses, plus a client wired to it.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use activity_feeds::{Client, ClientConfig, HttpRequest, HttpResponse, Result, Transport};
use async_trait::async_trait;
use serde_json::Value;

pub const BASE: &str = "https://api.stream-io-api.com/api/v1.0/";

#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<HttpResponse>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response. Requests beyond the queue get `200 {}`.
    pub fn respond(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or(HttpResponse { status: 200, body: b"{}".to_vec() }))
    }
}

pub fn client(transport: &Arc<RecordingTransport>) -> Client {
    Client::with_transport(ClientConfig::new("key"), transport.clone()).unwrap()
}

pub fn body_json(request: &HttpRequest) -> Value {
    serde_json::from_slice(request.body.as_deref().expect("request has no body")).unwrap()
}
