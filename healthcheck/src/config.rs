use crate::{policy::HealthcheckPolicy, utils::errors::ProbeError};
use std::{fmt, str::FromStr, time::Duration};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HEALTH_PATH: &str = "actuator/health";
pub const DEFAULT_HOST: &str = "localhost";
/// Longest health path accepted on the command line.
pub const MAX_PATH_LENGTH: usize = 100;

/// Parses a port the way the probe accepts it: ASCII digits only, in `1..=65535`.
pub fn parse_port(value: &str) -> Result<u16, ProbeError> {
    let invalid = |message: &str| ProbeError::InvalidPort {
        value: value.to_string(),
        message: message.to_string(),
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("must only contain digits"));
    }
    match value.parse::<u32>() {
        Ok(port) if (1..=u16::MAX as u32).contains(&port) => Ok(port as u16),
        _ => Err(invalid("must be between 1 and 65535")),
    }
}

/// Path of the health endpoint, stored without its leading slash.
///
/// Only ASCII letters, digits, `/`, `_` and `-` are allowed so the value can be pasted
/// into the request line without any escaping. An empty path probes the server root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealthPath(String);

impl HealthPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for HealthPath {
    type Err = ProbeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ProbeError::InvalidPath {
            value: value.to_string(),
            message: message.to_string(),
        };
        let trimmed = value.strip_prefix('/').unwrap_or(value);
        if trimmed.len() > MAX_PATH_LENGTH {
            return Err(invalid("longer than 100 characters"));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-'))
        {
            return Err(invalid(
                "only letters, digits, '/', '_' and '-' are allowed",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl Default for HealthPath {
    fn default() -> Self {
        Self(DEFAULT_HEALTH_PATH.to_string())
    }
}

impl fmt::Display for HealthPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything one probe invocation needs. `timeout` bounds the whole invocation and
/// defaults to the runtime's own `HEALTHCHECK --timeout`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    pub host: String,
    pub port: u16,
    pub path: HealthPath,
    pub timeout: Duration,
}

impl ProbeConfig {
    pub fn new(port: u16, path: HealthPath) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port,
            path,
            timeout: HealthcheckPolicy::default().timeout(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}/{}", self.host, self.port, self.path)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, HealthPath::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("8080"), Ok(8080));
        assert_eq!(parse_port("1"), Ok(1));
        assert_eq!(parse_port("65535"), Ok(65535));
        assert!(parse_port("0").is_err());
        assert!(parse_port("65536").is_err());
        assert!(parse_port("").is_err());
        assert!(parse_port("-1").is_err());
        assert!(parse_port("80a").is_err());
        assert!(parse_port(" 80").is_err());
        assert!(parse_port("99999999999999999999").is_err());
    }

    #[test]
    fn test_health_path_validation() {
        assert_eq!(
            "actuator/health".parse::<HealthPath>().unwrap().as_str(),
            "actuator/health"
        );
        assert_eq!("/healthz".parse::<HealthPath>().unwrap().as_str(), "healthz");
        assert_eq!("".parse::<HealthPath>().unwrap().as_str(), "");
        assert_eq!(
            "api/v1/health_check-ready".parse::<HealthPath>().unwrap().as_str(),
            "api/v1/health_check-ready"
        );
        assert!("health?verbose=1".parse::<HealthPath>().is_err());
        assert!("health check".parse::<HealthPath>().is_err());
        assert!("../etc/passwd".parse::<HealthPath>().is_err());
        assert!("a".repeat(MAX_PATH_LENGTH + 1).parse::<HealthPath>().is_err());
        assert!("a".repeat(MAX_PATH_LENGTH).parse::<HealthPath>().is_ok());
    }

    #[test]
    fn test_default_url() {
        let config = ProbeConfig::default();
        assert_eq!(config.url(), "http://localhost:8080/actuator/health");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_url_with_overrides() {
        let config = ProbeConfig::new(9000, "/readiness".parse().unwrap())
            .with_host("127.0.0.1")
            .with_timeout(Duration::from_millis(250));
        assert_eq!(config.url(), "http://127.0.0.1:9000/readiness");
        assert_eq!(config.timeout, Duration::from_millis(250));
    }
}
