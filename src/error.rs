use reqwest::StatusCode;
use thiserror::Error;

/// Generic fallback shown when the backend supplies no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Contact channel used for out-of-band OTP delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Phone,
}

impl Channel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email address",
            Self::Phone => "phone number",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A required configuration field is absent or unusable. Fails closed.
    #[error("missing configuration: {0}")]
    ConfigMissing(&'static str),

    /// No user identity is available yet. Callers treat this as a silent
    /// no-op, not a user-visible failure.
    #[error("no user identity available")]
    MissingIdentity,

    /// The account has no verified attribute for the given channel, so the
    /// code cannot be delivered.
    #[error("no verified {0} on file")]
    ContactNotConfigured(Channel),

    /// Non-2xx or malformed response from a backend endpoint.
    #[error("backend request failed ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Backend {
        status: StatusCode,
        message: Option<String>,
    },

    /// Transport failure before a response was obtained. Surfaced to users
    /// exactly like a backend failure without a message.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The new password and its confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,
}

impl Error {
    /// True for failures that are a legitimate intermediate state rather
    /// than something to show the user.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::MissingIdentity)
    }

    /// The user-facing rendering of this failure. Backend messages pass
    /// through verbatim when present.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigMissing(_) => {
                "The system is not set up for this operation. Please contact your system administrator.".to_string()
            }
            Self::MissingIdentity => GENERIC_FAILURE_MESSAGE.to_string(),
            Self::ContactNotConfigured(channel) => format!(
                "No verified {channel} is configured for this account. Please contact your system administrator."
            ),
            Self::Backend {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Backend { message: None, .. } | Self::Network(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            Self::PasswordMismatch => "Passwords do not match.".to_string(),
        }
    }
}
