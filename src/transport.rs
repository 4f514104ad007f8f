//! Shared HTTP plumbing for the identity and OTP backends.
//!
//! Every backend interaction in this crate goes through one place so
//! request construction, timeouts, auth, and error mapping stay uniform:
//! - Build a `Transport` once and hand it to each client.
//! - Call `request_json` with a fully-formed URL; it returns status + body.
//! - HTTP Basic auth is built per request from a borrowed credential pair
//!   and never outlives the request.
//!
//! Bodies are captured leniently: a non-JSON or empty body reads as
//! `Value::Null` so callers can decide between "failure with a message"
//! and "failure without one" instead of losing the status code to a parse
//! error.

use crate::credentials::Credentials;
use crate::error::Error;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct Transport {
    client: Client,
}

impl Transport {
    /// Build a transport with the crate's timeouts and the given user agent.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(user_agent: &str) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Execute a JSON request, optionally authenticated with HTTP Basic
    /// auth from the given credentials.
    ///
    /// # Errors
    /// Returns `Error::Network` if the request fails in transit. Non-2xx
    /// responses are returned as an `ApiResponse` for the caller to map.
    pub(crate) async fn request_json(
        &self,
        method: Method,
        url: &str,
        credentials: Option<&Credentials>,
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        debug!("request: {} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        if let Some(credentials) = credentials {
            request = request.basic_auth(credentials.username(), Some(credentials.expose_password()));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        Ok(ApiResponse { status, body })
    }
}

/// Status and lenient JSON body of a backend response.
pub(crate) struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// Pass 2xx responses through; map anything else to `Error::Backend`
    /// with the backend's message when one is present.
    pub(crate) fn into_success(self) -> Result<Self, Error> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(self.into_backend_error())
        }
    }

    pub(crate) fn into_backend_error(self) -> Error {
        Error::Backend {
            status: self.status,
            message: backend_message(&self.body),
        }
    }
}

/// Probe the well-known places backends put human-readable messages.
pub(crate) fn backend_message(body: &Value) -> Option<String> {
    let candidates = [
        &body["message"],
        &body["error"]["rawMessage"],
        &body["error"]["message"],
    ];
    candidates
        .into_iter()
        .find_map(Value::as_str)
        .map(str::to_string)
}
