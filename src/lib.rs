//! # Karibu (Account Recovery & OTP Login)
//!
//! `karibu` implements the self-service flows bolted onto an existing
//! clinical identity system: password-reset initiation/completion, and the
//! OTP-augmented login continuation that runs after primary credential
//! verification.
//!
//! ## OTP continuation
//!
//! The [`OtpFlow`](otp::flow::OtpFlow) controller owns the whole
//! continuation: resolve the user's verified contact channels, issue a
//! one-time code through the delivery service, gate resends behind a
//! cooldown, verify the entered code, then refresh the host session and
//! decide where to navigate (practice-location selection, a validated
//! "continue to" target, or the default landing page).
//!
//! Credentials for the in-flight attempt live in a
//! [`Credentials`](credentials::Credentials) handle that is zeroized when
//! the flow is dropped; they are never persisted or logged.
//!
//! ## Password reset
//!
//! [`PasswordReset`](reset::PasswordReset) covers the independent two-step
//! recovery flow: request a reset email, then submit the new password
//! against the single-use activation key from the emailed link.
//!
//! ## Seams
//!
//! The host shell supplies a [`SessionProvider`](session::SessionProvider)
//! for session refresh and an immutable [`FlowConfig`](config::FlowConfig)
//! loaded once at startup. Rendering, localization, and notification
//! presentation stay on the host side; this crate returns messages and
//! destinations, it never displays them.

pub mod config;
pub mod contact;
pub mod credentials;
pub mod error;
pub mod navigation;
pub mod otp;
pub mod reset;
pub mod session;
pub mod transport;

pub use config::FlowConfig;
pub use contact::{ContactInfo, ContactResolver};
pub use credentials::Credentials;
pub use error::{Channel, Error};
pub use navigation::{CancelDestination, Destination};
pub use otp::{
    CancelToken, CooldownState, FlowSeed, FlowState, OtpClient, OtpFlow, ResendCooldown,
    SubmitOutcome, VerifyOutcome,
};
pub use reset::{ActivationKey, PasswordReset};
pub use session::{Session, SessionLocation, SessionProvider};
pub use transport::Transport;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
