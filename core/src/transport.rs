//! Blocking HTTP executor for `HttpRequest` values.
//!
//! The core never needs this module: it exists so hosts without their own
//! HTTP stack (the integration tests, simple tools) can run a round-trip.
//! 4xx/5xx answers come back as data so `ProductClient::parse_*` stays in
//! charge of status interpretation.

use std::time::{Duration, Instant};

use tracing::{debug, warn};
use ureq::{Agent, RequestBuilder};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// A `ureq` agent with a global per-request timeout.
#[derive(Clone)]
pub struct Transport {
    agent: Agent,
    timeout: Duration,
}

impl Transport {
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent, timeout }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute `request` and return the response, whatever its status.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let started = Instant::now();
        let headers = request.headers.as_slice();
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&request.path), headers).call(),
            (HttpMethod::Delete, _) => {
                with_headers(self.agent.delete(&request.path), headers).call()
            }
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&request.path), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_headers(self.agent.post(&request.path), headers).send_empty()
            }
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&request.path), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => {
                with_headers(self.agent.put(&request.path), headers).send_empty()
            }
        };

        let mut response = result.map_err(|e| {
            warn!(method = %request.method, path = %request.path, error = %e, "request failed");
            map_transport_error(e)
        })?;

        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                Some((name.as_str().to_string(), value.to_str().ok()?.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(map_transport_error)?;

        debug!(
            method = %request.method,
            path = %request.path,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(ClientConfig::DEFAULT_TIMEOUT)
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

fn map_transport_error(error: ureq::Error) -> ApiError {
    match error {
        ureq::Error::Timeout(_) => ApiError::Timeout,
        other => ApiError::Network(other.to_string()),
    }
}
