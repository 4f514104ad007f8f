//! Cooldown gating the "resend code" action.
//!
//! The timer is advisory: it drives the resend affordance and nothing
//! else. Verification never blocks on it. State lives with the flow that
//! owns it and dies with the flow; re-entry always starts fresh.

use std::time::Duration;
use tokio::time::interval;

/// `Expired` enables resend exactly like `Idle` but is kept distinct so a
/// caller can tell "ran out" from "never requested".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CooldownState {
    Idle,
    Running,
    Expired,
}

#[derive(Clone, Debug)]
pub struct ResendCooldown {
    state: CooldownState,
    remaining_secs: u64,
}

impl ResendCooldown {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: CooldownState::Idle,
            remaining_secs: 0,
        }
    }

    /// Start (or restart, from any state) the countdown.
    pub fn start(&mut self, duration: Duration) {
        self.remaining_secs = duration.as_secs();
        self.state = if self.remaining_secs == 0 {
            CooldownState::Expired
        } else {
            CooldownState::Running
        };
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) {
        if self.state != CooldownState::Running {
            return;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = CooldownState::Expired;
        }
    }

    #[must_use]
    pub fn state(&self) -> CooldownState {
        self.state
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == CooldownState::Running
    }

    /// Whether the resend action is available again.
    #[must_use]
    pub fn can_resend(&self) -> bool {
        !self.is_active()
    }

    /// Drive the countdown on a one-second cadence until it expires. The
    /// tick source is dropped as soon as the countdown reaches zero.
    pub async fn run(&mut self) {
        if !self.is_active() {
            return;
        }
        let mut ticker = interval(Duration::from_secs(1));
        // The first interval tick completes immediately.
        ticker.tick().await;
        while self.is_active() {
            ticker.tick().await;
            self.tick();
        }
    }
}

impl Default for ResendCooldown {
    fn default() -> Self {
        Self::new()
    }
}
