//! OTP-augmented login continuation: issuance/verification clients, the
//! resend cooldown, and the flow controller that orchestrates them.

pub mod client;
pub mod cooldown;
pub mod flow;

pub use client::{OtpClient, VerifyOutcome};
pub use cooldown::{CooldownState, ResendCooldown};
pub use flow::{CancelToken, FlowSeed, FlowState, OtpFlow, SubmitOutcome};
