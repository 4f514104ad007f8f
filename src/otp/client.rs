//! Request layer for the OTP delivery service.

use crate::config::FlowConfig;
use crate::contact::ContactInfo;
use crate::credentials::Credentials;
use crate::error::Error;
use crate::transport::{self, Transport};
use reqwest::Method;
use serde_json::{Value, json};
use tracing::instrument;
use url::Url;

/// Number of digits in a delivered code.
pub const OTP_LENGTH: usize = 5;

/// Fallback verification failure message when the backend supplies none.
pub const INVALID_OTP_MESSAGE: &str = "Invalid OTP or credentials";

/// Prompt shown while waiting for a code when the backend supplied no
/// delivery confirmation of its own.
pub const DEFAULT_DELIVERY_PROMPT: &str =
    "Enter the OTP sent to your registered email and phone number to complete login.";

/// Result of a single verification round trip. An explicit failure is
/// recoverable data, not an error: the flow stays on the code-entry step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct OtpClient {
    transport: Transport,
    config: FlowConfig,
}

impl OtpClient {
    #[must_use]
    pub fn new(transport: Transport, config: FlowConfig) -> Self {
        Self { transport, config }
    }

    /// Request a new code be sent to the resolved contact channels.
    ///
    /// Returns the backend's human-readable delivery confirmation; the code
    /// itself never reaches the client. A new issuance invalidates any
    /// outstanding code server-side.
    ///
    /// # Errors
    /// `Error::ConfigMissing` when the service base URL is absent or
    /// unusable, `Error::Backend` on non-2xx, `Error::Network` in transit.
    #[instrument(skip(self, credentials, contact))]
    pub async fn issue(
        &self,
        credentials: &Credentials,
        contact: &ContactInfo,
    ) -> Result<String, Error> {
        let base = self.config.require_etl_base_url()?;
        let mut url = Url::parse(&format!("{base}/otp"))
            .map_err(|_| Error::ConfigMissing("etlBaseUrl"))?;
        url.query_pairs_mut()
            .append_pair("username", credentials.username())
            .append_pair("email", &contact.email)
            .append_pair("phone", &contact.phone);

        let response = self
            .transport
            .request_json(Method::GET, url.as_str(), Some(credentials), None)
            .await?
            .into_success()?;

        Ok(transport::backend_message(&response.body)
            .unwrap_or_else(|| DEFAULT_DELIVERY_PROMPT.to_string()))
    }

    /// Submit a candidate code for validation.
    ///
    /// Only a well-formed body with `success: true` counts as success; any
    /// other shape, non-2xx included, is a failure carrying the backend's
    /// message when one is present. One round trip per call, no retries.
    ///
    /// # Errors
    /// `Error::ConfigMissing` when the service base URL is absent,
    /// `Error::Network` when no response was obtained at all.
    #[instrument(skip(self, credentials, code))]
    pub async fn verify(
        &self,
        credentials: &Credentials,
        code: &str,
    ) -> Result<VerifyOutcome, Error> {
        let base = self.config.require_etl_base_url()?;
        let url = format!("{base}/verify-otp");
        let body = json!({
            "username": credentials.username(),
            "otp": code
        });

        let response = self
            .transport
            .request_json(Method::POST, &url, Some(credentials), Some(&body))
            .await?;

        let success = response.status.is_success()
            && response
                .body
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false);

        Ok(VerifyOutcome {
            success,
            message: transport::backend_message(&response.body),
        })
    }
}
