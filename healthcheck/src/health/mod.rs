//! Probe outcomes and the runtime's view of them.

pub mod result;
pub mod tracker;

// Re-export commonly used types.
pub use result::{ProbeResult, UnhealthyCause, EXIT_HEALTHY, EXIT_UNHEALTHY};
pub use tracker::{HealthState, HealthStatusTracker};
