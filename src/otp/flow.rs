//! The OTP login continuation.
//!
//! This flow takes over after primary credential verification and ends
//! with an authenticated session and a navigation decision:
//! - `begin` resolves the verified contact channels, requests a code, and
//!   starts the resend cooldown.
//! - `enter_code`/`submit` verify a candidate code. Success refreshes the
//!   host session with the original credentials and computes the terminal
//!   destination; failure returns to code entry with the surfaced message
//!   and the entered code cleared, contact info and cooldown intact.
//! - `resend` repeats the full delivery sequence; channels are re-resolved
//!   every time.
//! - `cancel` marks the flow's cancellation token. A verification result
//!   arriving after that point is discarded instead of mutating state.
//!
//! One flow instance owns its contact info, delivery state, and cooldown
//! exclusively; nothing is shared across concurrent flows. The credential
//! pair lives inside the flow and is zeroized when the flow is dropped.

use crate::config::FlowConfig;
use crate::contact::{ContactInfo, ContactResolver};
use crate::credentials::Credentials;
use crate::error::Error;
use crate::navigation::{self, CancelDestination, Destination};
use crate::otp::client::{DEFAULT_DELIVERY_PROMPT, INVALID_OTP_MESSAGE, OTP_LENGTH, OtpClient};
use crate::otp::cooldown::ResendCooldown;
use crate::session::SessionProvider;
use crate::transport::Transport;
use secrecy::SecretString;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Navigation-state payload handed over by the primary login step.
///
/// Exists only long enough to seed a flow; the credential pair moves into
/// the flow and is destroyed with it.
pub struct FlowSeed {
    pub username: String,
    pub password: SecretString,
    /// Person UUID of the identity being logged in. May be empty while the
    /// identity is still unknown; delivery silently short-circuits then.
    pub user_uuid: String,
    /// Delivery confirmation already shown by the previous step, if any.
    pub message: Option<String>,
    /// "Continue to where I was going" target; validated before use.
    pub referrer: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    AwaitingCode,
    Verifying,
    Success,
}

/// Per-flow cancellation marker. Teardown cancels it; completion handlers
/// check it before touching flow state so a stale verification result is
/// discarded rather than applied.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a `submit` call resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Verification and session refresh succeeded; navigate there.
    Authenticated(Destination),
    /// Verification failed; the flow is back on code entry with this
    /// message and the entered code cleared.
    Rejected(String),
    /// The flow was cancelled while the request was in flight; the result
    /// was discarded without touching flow state.
    Discarded,
}

pub struct OtpFlow<S> {
    contacts: ContactResolver,
    otp: OtpClient,
    sessions: S,
    credentials: Credentials,
    user_uuid: String,
    referrer: Option<String>,
    cooldown_duration: Duration,
    cooldown: ResendCooldown,
    contact: Option<ContactInfo>,
    delivery_message: Option<String>,
    attempt: Option<String>,
    error: Option<String>,
    state: FlowState,
    cancellation: CancelToken,
}

impl<S: SessionProvider> OtpFlow<S> {
    #[must_use]
    pub fn new(config: FlowConfig, transport: Transport, sessions: S, seed: FlowSeed) -> Self {
        let FlowSeed {
            username,
            password,
            user_uuid,
            message,
            referrer,
        } = seed;
        Self {
            contacts: ContactResolver::new(transport.clone(), config.clone()),
            otp: OtpClient::new(transport, config.clone()),
            sessions,
            credentials: Credentials::new(username, password),
            user_uuid,
            referrer,
            cooldown_duration: config.resend_cooldown(),
            cooldown: ResendCooldown::new(),
            contact: None,
            delivery_message: message,
            attempt: None,
            error: None,
            state: FlowState::AwaitingCode,
            cancellation: CancelToken::new(),
        }
    }

    /// Entry sequence: resolve contact channels, issue a code, start the
    /// cooldown, and return the delivery confirmation to display.
    ///
    /// # Errors
    /// Everything the resolver and issuer can fail with. A
    /// `MissingIdentity` error is a legitimate pre-identity state and
    /// should be treated as a silent no-op by callers.
    #[instrument(skip(self))]
    pub async fn begin(&mut self) -> Result<&str, Error> {
        self.deliver().await?;
        Ok(self.delivery_message())
    }

    /// Re-run the delivery sequence for a manual resend. Contact channels
    /// are resolved again from scratch and the cooldown restarts. The
    /// cooldown is advisory; callers gate the affordance on `can_resend`,
    /// this method does not refuse.
    ///
    /// # Errors
    /// Same as `begin`.
    #[instrument(skip(self))]
    pub async fn resend(&mut self) -> Result<&str, Error> {
        self.deliver().await?;
        Ok(self.delivery_message())
    }

    async fn deliver(&mut self) -> Result<(), Error> {
        let contact = self
            .contacts
            .resolve(&self.user_uuid, &self.credentials)
            .await?;
        let message = self.otp.issue(&self.credentials, &contact).await?;

        if self.cancellation.is_cancelled() {
            debug!("delivery completed after cancellation; discarding");
            return Ok(());
        }

        self.contact = Some(contact);
        self.delivery_message = Some(message);
        self.cooldown.start(self.cooldown_duration);
        self.error = None;
        self.state = FlowState::AwaitingCode;
        Ok(())
    }

    /// Record the user-entered code. It is held only until the next
    /// `submit` and cleared on failure, so nothing carries over between
    /// attempts.
    pub fn enter_code(&mut self, code: impl Into<String>) {
        self.attempt = Some(code.into());
    }

    /// Verify the entered code and, on success, establish the durable
    /// session and compute where to navigate.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(code) = self.attempt.take() else {
            return self.reject(INVALID_OTP_MESSAGE.to_string());
        };
        if code.len() != OTP_LENGTH {
            // Not worth a round trip; the backend would refuse it anyway.
            return self.reject(INVALID_OTP_MESSAGE.to_string());
        }

        self.state = FlowState::Verifying;
        self.error = None;

        let outcome = self.otp.verify(&self.credentials, &code).await;

        if self.cancellation.is_cancelled() {
            debug!("verification completed after cancellation; discarding");
            return SubmitOutcome::Discarded;
        }

        match outcome {
            Ok(verdict) if verdict.success => self.establish_session().await,
            Ok(verdict) => self.reject(
                verdict
                    .message
                    .unwrap_or_else(|| INVALID_OTP_MESSAGE.to_string()),
            ),
            Err(err) => {
                // Transport or setup failure; same recoverable transition
                // as an explicit rejection.
                warn!("verification request failed: {err}");
                self.reject(INVALID_OTP_MESSAGE.to_string())
            }
        }
    }

    async fn establish_session(&mut self) -> SubmitOutcome {
        match self.sessions.refresh(&self.credentials).await {
            Ok(session) => {
                if self.cancellation.is_cancelled() {
                    debug!("session refresh completed after cancellation; discarding");
                    return SubmitOutcome::Discarded;
                }
                let destination =
                    navigation::resolve_destination(&session, self.referrer.as_deref());
                self.state = FlowState::Success;
                SubmitOutcome::Authenticated(destination)
            }
            Err(err) => {
                warn!("session refresh failed after OTP success: {err}");
                self.reject(INVALID_OTP_MESSAGE.to_string())
            }
        }
    }

    fn reject(&mut self, message: String) -> SubmitOutcome {
        self.state = FlowState::AwaitingCode;
        self.attempt = None;
        self.error = Some(message.clone());
        SubmitOutcome::Rejected(message)
    }

    /// Abort the flow. Marks the cancellation token so in-flight results
    /// are discarded, then reports where the host should navigate.
    pub fn cancel(&mut self, has_history: bool) -> CancelDestination {
        self.cancellation.cancel();
        if has_history {
            CancelDestination::Back
        } else {
            CancelDestination::Login
        }
    }

    #[must_use]
    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Message to display while waiting for the code.
    #[must_use]
    pub fn delivery_message(&self) -> &str {
        self.delivery_message
            .as_deref()
            .unwrap_or(DEFAULT_DELIVERY_PROMPT)
    }

    /// The last surfaced failure, if the flow is back on code entry.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn entered_code(&self) -> Option<&str> {
        self.attempt.as_deref()
    }

    #[must_use]
    pub fn contact(&self) -> Option<&ContactInfo> {
        self.contact.as_ref()
    }

    #[must_use]
    pub fn cooldown(&self) -> &ResendCooldown {
        &self.cooldown
    }

    /// Mutable handle for driving the cooldown cadence.
    pub fn cooldown_mut(&mut self) -> &mut ResendCooldown {
        &mut self.cooldown
    }

    #[must_use]
    pub fn can_resend(&self) -> bool {
        self.cooldown.can_resend()
    }

    /// Clone of the flow's cancellation token, for the host to mark on
    /// teardown.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancellation.clone()
    }
}
