use reqwest::StatusCode;
use std::{fmt, process::ExitCode, time::Duration};

/// Exit status reported for a healthy target.
pub const EXIT_HEALTHY: u8 = 0;
/// Exit status reported for every other outcome, including invalid input.
pub const EXIT_UNHEALTHY: u8 = 1;

/// Why a probe did not see a healthy target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnhealthyCause {
    /// The target answered, but not with a 2xx status.
    Status(StatusCode),
    /// The request failed before a response arrived (refused, reset, DNS, ...).
    Connection(String),
}

/// Outcome of a single probe invocation.
///
/// The runtime only ever sees [`ProbeResult::exit_code`]; the variants exist so the
/// cause can be logged for operators.
#[derive(Clone, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ProbeResult {
    Healthy { status: StatusCode },
    Unhealthy(UnhealthyCause),
    /// No response within the deadline. The request was abandoned.
    Indeterminate { timeout: Duration },
}

impl ProbeResult {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeResult::Healthy { .. })
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_healthy() {
            EXIT_HEALTHY
        } else {
            EXIT_UNHEALTHY
        }
    }
}

impl From<&ProbeResult> for ExitCode {
    fn from(result: &ProbeResult) -> Self {
        ExitCode::from(result.exit_code())
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeResult::Healthy { status } => write!(f, "healthy ({})", status),
            ProbeResult::Unhealthy(UnhealthyCause::Status(status)) => {
                write!(f, "unhealthy ({})", status)
            },
            ProbeResult::Unhealthy(UnhealthyCause::Connection(message)) => {
                write!(f, "unhealthy (connection error: {})", message)
            },
            ProbeResult::Indeterminate { timeout } => {
                write!(f, "indeterminate (no response within {:?})", timeout)
            },
        }
    }
}
