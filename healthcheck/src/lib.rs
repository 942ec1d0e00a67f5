//! Single-shot HTTP health probe.
//!
//! The `healthcheck` binary is meant to be the command of a container `HEALTHCHECK`
//! directive. Each run issues one request and maps the outcome to an exit status; the
//! interval, start period and retry count stay with the container runtime (see
//! [`health::tracker`] for a model of those rules).

pub mod args;
pub mod config;
pub mod health;
pub mod policy;
pub mod probe;
pub mod utils;

pub use args::ProbeArgs;
pub use config::{HealthPath, ProbeConfig};
pub use health::{ProbeResult, UnhealthyCause};
pub use policy::HealthcheckPolicy;
pub use probe::{probe_once, run_probe, HttpProber};
