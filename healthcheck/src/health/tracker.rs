//! Model of how the container runtime turns probe exits into a container health state.
//!
//! The probe is stateless; the runtime owns the interval, the start-period grace and the
//! retry count. This tracker reproduces those rules so the end-to-end behavior of an
//! image's `HEALTHCHECK` declaration can be checked without a runtime.

use super::result::ProbeResult;
use crate::policy::HealthcheckPolicy;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HealthState {
    /// No successful probe yet.
    Starting,
    Healthy,
    Unhealthy,
}

pub struct HealthStatusTracker {
    policy: HealthcheckPolicy,
    state: HealthState,
    failing_streak: u32,
}

impl HealthStatusTracker {
    pub fn new(policy: HealthcheckPolicy) -> Self {
        Self {
            policy,
            state: HealthState::Starting,
            failing_streak: 0,
        }
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn failing_streak(&self) -> u32 {
        self.failing_streak
    }

    /// Offsets from container start at which the runtime launches the probe.
    pub fn probe_schedule(&self) -> impl Iterator<Item = Duration> {
        let interval = self.policy.interval();
        (1u32..).map(move |n| interval * n)
    }

    /// Records one probe run that started `since_start` after the container started.
    pub fn observe(&mut self, since_start: Duration, result: &ProbeResult) -> HealthState {
        self.observe_exit(since_start, i32::from(result.exit_code()))
    }

    /// Records a raw exit status. Anything but zero counts as a failure.
    pub fn observe_exit(&mut self, since_start: Duration, exit_code: i32) -> HealthState {
        if exit_code == 0 {
            self.failing_streak = 0;
            self.state = HealthState::Healthy;
            return self.state;
        }

        // Until the first success, failures inside the start period are free.
        if self.state == HealthState::Starting && since_start < self.policy.start_period() {
            debug!(
                since_start_secs = since_start.as_secs(),
                start_period_secs = self.policy.start_period_secs,
                "[Health Tracker] Ignoring failure during start period"
            );
            return self.state;
        }

        self.failing_streak += 1;
        if self.failing_streak >= self.policy.retries && self.state != HealthState::Unhealthy {
            warn!(
                failing_streak = self.failing_streak,
                retries = self.policy.retries,
                "[Health Tracker] Container marked unhealthy"
            );
            self.state = HealthState::Unhealthy;
        }
        self.state
    }
}
