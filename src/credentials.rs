use secrecy::{ExposeSecret, SecretString};

/// The credential pair for the login attempt currently in flight.
///
/// Held only for the lifetime of a single recovery or OTP flow and passed
/// by reference through it; the password is zeroized when the flow is torn
/// down. Never serialized, never logged.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Expose the password for HTTP Basic auth construction only.
    pub(crate) fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
