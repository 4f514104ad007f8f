//! Seam to the host identity provider.
//!
//! Primary credential verification and session storage belong to the host;
//! this crate only needs to re-establish the session after a successful
//! OTP verification and read whether a practice location is selected.

use crate::credentials::Credentials;

/// The practice/work-location context a user must select before accessing
/// clinical functionality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionLocation {
    pub uuid: String,
    pub display: String,
}

/// The slice of the host session this crate reads.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub location: Option<SessionLocation>,
}

impl Session {
    #[must_use]
    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }
}

/// Host identity provider. Implementations decide how a session is
/// re-established; errors stay opaque to this crate and surface to users
/// as a generic verification failure.
#[allow(async_fn_in_trait)]
pub trait SessionProvider {
    /// Re-establish the current session using the original credential
    /// pair. Required because primary login establishes no durable
    /// session; the session only becomes durable after OTP success.
    async fn refresh(&self, credentials: &Credentials) -> anyhow::Result<Session>;
}
