//! Password-reset initiation and completion.
//!
//! A two-step, stateless flow: request a reset email for a username or
//! address, then submit the new password against the single-use activation
//! key embedded in the emailed link. Neither step authenticates; the
//! activation key is the whole proof of possession.

use crate::config::FlowConfig;
use crate::error::Error;
use crate::transport::{self, Transport};
use reqwest::Method;
use serde_json::json;
use tracing::instrument;
use url::Url;

/// Shown instead of the backend's raw complaint when the deployment has no
/// reset-mail recipient configured; that is an administrator problem, not
/// something the user can act on.
pub const RECIPIENT_NOT_CONFIGURED: &str = "Recipient email address not configured.";

/// Single-use token identifying which reset request is being completed.
/// Extracted from the entry URL, never user-entered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivationKey(String);

impl ActivationKey {
    /// Take the activation key from the reset-link URL the user followed:
    /// the last non-empty path segment.
    #[must_use]
    pub fn from_entry_url(entry_url: &str) -> Option<Self> {
        let url = Url::parse(entry_url).ok()?;
        let key = url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .last()?;
        Some(Self(key.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug)]
pub struct PasswordReset {
    transport: Transport,
    config: FlowConfig,
}

impl PasswordReset {
    #[must_use]
    pub fn new(transport: Transport, config: FlowConfig) -> Self {
        Self { transport, config }
    }

    /// Request a reset link for the given username or email address. One
    /// submission per call; callers disable re-submission while a request
    /// is outstanding.
    ///
    /// # Errors
    /// `Error::Backend` on non-2xx, with the backend's message except when
    /// it complains about an unconfigured mail recipient, which maps to
    /// [`RECIPIENT_NOT_CONFIGURED`].
    #[instrument(skip(self, username_or_email))]
    pub async fn initiate(&self, username_or_email: &str) -> Result<(), Error> {
        let base = self.config.require_rest_base_url()?;
        let url = format!("{base}/passwordreset");
        let body = json!({ "usernameOrEmail": username_or_email });

        let response = self
            .transport
            .request_json(Method::POST, &url, None, Some(&body))
            .await?;

        if response.status.is_success() {
            return Ok(());
        }

        let message = transport::backend_message(&response.body).map(|message| {
            if message.contains("recipient") {
                RECIPIENT_NOT_CONFIGURED.to_string()
            } else {
                message
            }
        });
        Err(Error::Backend {
            status: response.status,
            message,
        })
    }

    /// Submit the new password against the activation key.
    ///
    /// # Errors
    /// `Error::PasswordMismatch` when the confirmation differs from the
    /// new password; checked before any request is made. `Error::Backend`
    /// on non-2xx.
    #[instrument(skip_all)]
    pub async fn complete(
        &self,
        new_password: &str,
        password_confirmation: &str,
        key: &ActivationKey,
    ) -> Result<(), Error> {
        if new_password != password_confirmation {
            return Err(Error::PasswordMismatch);
        }

        let base = self.config.require_rest_base_url()?;
        let url = format!("{base}/passwordreset/{}", key.as_str());
        let body = json!({ "newPassword": new_password });

        self.transport
            .request_json(Method::POST, &url, None, Some(&body))
            .await?
            .into_success()?;
        Ok(())
    }
}
