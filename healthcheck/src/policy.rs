use crate::utils::errors::ProbeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The schedule the container runtime applies around the probe.
///
/// The probe itself never loops or retries. These values are declared on the image
/// (`HEALTHCHECK --interval=.. --timeout=.. --start-period=.. --retries=..`) and enforced
/// by the runtime, which launches the probe once per interval and counts its failures.
///
/// Example:
/// ```yaml
/// interval_secs: 30
/// timeout_secs: 5
/// start_period_secs: 30
/// retries: 3
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HealthcheckPolicy {
    #[serde(default = "HealthcheckPolicy::default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "HealthcheckPolicy::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "HealthcheckPolicy::default_start_period_secs")]
    pub start_period_secs: u64,
    #[serde(default = "HealthcheckPolicy::default_retries")]
    pub retries: u32,
}

impl HealthcheckPolicy {
    /// Time between two probe launches. Defaults to 30 seconds.
    pub const fn default_interval_secs() -> u64 {
        30
    }

    /// Time the runtime lets a single probe run. Defaults to 5 seconds.
    pub const fn default_timeout_secs() -> u64 {
        5
    }

    /// Grace period after container start during which failures are not counted.
    /// Defaults to 30 seconds.
    pub const fn default_start_period_secs() -> u64 {
        30
    }

    /// Consecutive failures that mark the container unhealthy. Defaults to 3.
    pub const fn default_retries() -> u32 {
        3
    }

    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub const fn start_period(&self) -> Duration {
        Duration::from_secs(self.start_period_secs)
    }

    /// Checks the values the runtime would reject or silently misinterpret.
    pub fn validate(&self) -> Result<(), ProbeError> {
        let invalid = |message: &str| {
            Err(ProbeError::InvalidPolicy {
                message: message.to_string(),
            })
        };
        if self.interval_secs == 0 {
            return invalid("interval must be at least one second");
        }
        if self.timeout_secs == 0 {
            return invalid("timeout must be at least one second");
        }
        if self.retries == 0 {
            return invalid("retries must be at least 1");
        }
        Ok(())
    }

    /// The runtime's timeout in the unit the probe's `--timeout-ms` takes.
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_secs.saturating_mul(1_000)
    }

    /// Renders the option part of a Dockerfile `HEALTHCHECK` instruction.
    pub fn to_dockerfile_flags(&self) -> String {
        format!(
            "--interval={}s --timeout={}s --start-period={}s --retries={}",
            self.interval_secs, self.timeout_secs, self.start_period_secs, self.retries
        )
    }
}

impl Default for HealthcheckPolicy {
    fn default() -> Self {
        Self {
            interval_secs: Self::default_interval_secs(),
            timeout_secs: Self::default_timeout_secs(),
            start_period_secs: Self::default_start_period_secs(),
            retries: Self::default_retries(),
        }
    }
}
