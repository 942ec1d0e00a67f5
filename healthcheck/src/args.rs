use crate::{
    config::{parse_port, ProbeConfig, DEFAULT_HEALTH_PATH, DEFAULT_HOST, DEFAULT_PORT},
    utils::errors::ProbeError,
};
use clap::Parser;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Probe a local HTTP health endpoint once and report the result as the exit status:
/// 0 when it answers 2xx within the timeout, 1 otherwise.
#[derive(Parser, Debug, Clone)]
#[command(name = "healthcheck", version)]
pub struct ProbeArgs {
    /// Port the served application listens on
    #[arg(value_name = "PORT", env = "PORT", default_value_t = DEFAULT_PORT.to_string())]
    pub port: String,
    /// Health endpoint path, with or without the leading slash
    #[arg(value_name = "PATH", env = "API_PATH", default_value = DEFAULT_HEALTH_PATH)]
    pub path: String,
    /// Host to probe
    #[arg(long, env = "HEALTHCHECK_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// Upper bound for the whole request, in milliseconds
    #[arg(long, env = "HEALTHCHECK_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
}

impl ProbeArgs {
    /// Validates the raw arguments. Ports and paths are checked here rather than by clap
    /// so that bad input exits with the same status as an unhealthy target.
    pub fn into_config(self) -> Result<ProbeConfig, ProbeError> {
        let port = parse_port(&self.port)?;
        let path = self.path.parse()?;
        if self.timeout_ms == 0 {
            return Err(ProbeError::InvalidTimeout {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(ProbeConfig::new(port, path)
            .with_host(self.host)
            .with_timeout(Duration::from_millis(self.timeout_ms)))
    }
}
