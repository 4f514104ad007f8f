//! Flow configuration, loaded once by the host at startup and injected
//! into each component at construction. Absent values read as `None`;
//! validation lives with the callers that fail closed on them.

use crate::error::Error;
use std::time::Duration;

/// Seconds a fresh OTP delivery blocks the resend action.
pub const DEFAULT_RESEND_COOLDOWN_SECS: u64 = 30;

/// Immutable configuration for the recovery and OTP login flows.
#[derive(Clone, Debug, Default)]
pub struct FlowConfig {
    etl_base_url: Option<String>,
    otp_enabled: Option<bool>,
    sub_domain: Option<String>,
    otp_key: Option<String>,
    rest_base_url: Option<String>,
    resend_cooldown_secs: Option<u64>,
}

impl FlowConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_etl_base_url(mut self, url: impl Into<String>) -> Self {
        self.etl_base_url = normalize_base_url(url.into());
        self
    }

    #[must_use]
    pub fn with_otp_enabled(mut self, enabled: bool) -> Self {
        self.otp_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_sub_domain(mut self, url: impl Into<String>) -> Self {
        self.sub_domain = normalize_base_url(url.into());
        self
    }

    #[must_use]
    pub fn with_otp_key(mut self, key: impl Into<String>) -> Self {
        self.otp_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_rest_base_url(mut self, url: impl Into<String>) -> Self {
        self.rest_base_url = normalize_base_url(url.into());
        self
    }

    #[must_use]
    pub fn with_resend_cooldown_secs(mut self, seconds: u64) -> Self {
        self.resend_cooldown_secs = Some(seconds);
        self
    }

    /// Base URL of the OTP delivery service, or `None` when not configured.
    #[must_use]
    pub fn etl_base_url(&self) -> Option<&str> {
        self.etl_base_url.as_deref()
    }

    /// Whether the OTP continuation is enabled for this deployment. The
    /// host decides routing on this; the flow itself does not gate on it.
    #[must_use]
    pub fn otp_enabled(&self) -> Option<bool> {
        self.otp_enabled
    }

    /// Base URL of the identity backend's auth sub-domain.
    #[must_use]
    pub fn sub_domain(&self) -> Option<&str> {
        self.sub_domain.as_deref()
    }

    /// Static shared key for the OTP backend. Part of the configuration
    /// surface; no client-side endpoint consumes it.
    #[must_use]
    pub fn otp_key(&self) -> Option<&str> {
        self.otp_key.as_deref()
    }

    /// Base URL of the REST API serving the password-reset endpoints.
    #[must_use]
    pub fn rest_base_url(&self) -> Option<&str> {
        self.rest_base_url.as_deref()
    }

    #[must_use]
    pub fn resend_cooldown(&self) -> Duration {
        Duration::from_secs(
            self.resend_cooldown_secs
                .unwrap_or(DEFAULT_RESEND_COOLDOWN_SECS),
        )
    }

    pub(crate) fn require_etl_base_url(&self) -> Result<&str, Error> {
        self.etl_base_url().ok_or(Error::ConfigMissing("etlBaseUrl"))
    }

    pub(crate) fn require_sub_domain(&self) -> Result<&str, Error> {
        self.sub_domain().ok_or(Error::ConfigMissing("subDomain"))
    }

    pub(crate) fn require_rest_base_url(&self) -> Result<&str, Error> {
        self.rest_base_url()
            .ok_or(Error::ConfigMissing("restBaseUrl"))
    }
}

/// Trailing slashes are stripped so endpoint paths can be appended
/// uniformly; empty values read back as absent.
fn normalize_base_url(url: String) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
