// src/http/mock.rs
// =============================================================================
// Test-only HttpClient that records every request it receives and answers
// with a canned outcome.
// =============================================================================

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;

use super::client::{HttpClient, HttpRequest, HttpResponse};
use crate::error::{Result, RetrieverError};

pub(crate) enum Outcome {
    Respond(HttpResponse),
    Fail(fn() -> RetrieverError),
    Hang,
}

pub(crate) struct RecordingClient {
    outcome: Outcome,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingClient {
    pub(crate) fn ok(body: &[u8]) -> Self {
        Self::responding(StatusCode::OK, &[], body)
    }

    pub(crate) fn responding(
        status: StatusCode,
        headers: &[(&'static str, &str)],
        body: &[u8],
    ) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(
                HeaderName::from_static(*name),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        Self::with_outcome(Outcome::Respond(HttpResponse {
            status,
            headers: map,
            body: body.to_vec(),
        }))
    }

    pub(crate) fn failing(make_error: fn() -> RetrieverError) -> Self {
        Self::with_outcome(Outcome::Fail(make_error))
    }

    pub(crate) fn hanging() -> Self {
        Self::with_outcome(Outcome::Hang)
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl HttpClient for RecordingClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        match &self.outcome {
            Outcome::Respond(response) => Ok(response.clone()),
            Outcome::Fail(make_error) => Err(make_error()),
            Outcome::Hang => std::future::pending().await,
        }
    }
}
