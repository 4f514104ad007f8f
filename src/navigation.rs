//! Post-login navigation targets and referrer validation.

use crate::session::Session;

/// Route constants shared with the host shell.
pub mod paths {
    pub const LOGIN: &str = "/login";
    pub const LANDING: &str = "/home";
    pub const SELECT_LOCATION: &str = "/login/location";
}

/// Terminal destination of a successful OTP verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// The refreshed session has no selected practice location yet.
    SelectLocation,
    /// Default landing destination.
    Landing,
    /// Validated caller-supplied "continue to" target.
    Path(String),
}

impl Destination {
    #[must_use]
    pub fn as_path(&self) -> &str {
        match self {
            Self::SelectLocation => paths::SELECT_LOCATION,
            Self::Landing => paths::LANDING,
            Self::Path(path) => path,
        }
    }
}

/// Where an explicit cancel sends the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelDestination {
    /// Return to the previous navigation history entry.
    Back,
    /// No history to return to; force the login entry point.
    Login,
}

/// Accept a referrer only when it is a relative path: a single leading
/// `/`, never protocol-relative. Anything else is discarded rather than
/// used as a redirect target.
#[must_use]
pub fn validate_referrer(raw: &str) -> Option<&str> {
    if raw.starts_with('/') && !raw.starts_with("//") {
        Some(raw)
    } else {
        None
    }
}

/// Compute the terminal destination from the refreshed session and the
/// optional referrer carried through the flow. The location check wins:
/// a session without a selected location always lands on the selection
/// step, referrer or not.
#[must_use]
pub fn resolve_destination(session: &Session, referrer: Option<&str>) -> Destination {
    if !session.has_location() {
        return Destination::SelectLocation;
    }

    match referrer.and_then(validate_referrer) {
        Some(path) => Destination::Path(path.to_string()),
        None => Destination::Landing,
    }
}
