//! Recording in-memory transport for façade tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::error::ApiError;
use crate::rest::{ApiRequest, TagManagerApi};

type Key = (Method, String);

/// Answers queued per (method, path), in order. Unscripted calls fail
/// with a 404 so a test notices unexpected traffic.
#[derive(Default)]
pub struct MockApi {
    responses: Mutex<HashMap<Key, VecDeque<Result<Value, String>>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: Method, path: &str, body: Value) {
        self.push(method, path, Ok(body));
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Err(message.to_string()));
    }

    fn push(&self, method: Method, path: &str, answer: Result<Value, String>) {
        self.responses
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(answer);
    }

    /// Every request executed so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The single request sent with `method` to `path`.
    pub fn request(&self, method: Method, path: &str) -> ApiRequest {
        let matching: Vec<ApiRequest> = self
            .requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect();
        assert_eq!(matching.len(), 1, "expected one {method} {path}, got {matching:?}");
        matching.into_iter().next().unwrap()
    }
}

#[async_trait]
impl TagManagerApi for MockApi {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.requests.lock().unwrap().push(request.clone());

        let answer = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&(request.method.clone(), request.path.clone()))
            .and_then(VecDeque::pop_front);

        match answer {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(ApiError::Google {
                status: StatusCode::BAD_REQUEST,
                message,
            }),
            None => Err(ApiError::Google {
                status: StatusCode::NOT_FOUND,
                message: format!("unscripted {} {}", request.method, request.path),
            }),
        }
    }
}
