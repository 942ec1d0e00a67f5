use crate::{arch::Architecture, variant::LATEST_VERSION};
pub use healthcheck::utils::yaml::load;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::PathBuf, time::Duration};

/// Configuration of a single install run.
///
/// Every field has a default, so the file is optional. Example:
/// ```yaml
/// url_template: "https://github.com/gptq/healthcheck/releases/download/{version}/{binary}"
/// version: "v1.2.0"
/// destination: "/usr/local/bin/healthcheck"
/// request_timeout_secs: 60
/// sha256:
///   amd64: "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InstallerConfig {
    #[serde(default = "InstallerConfig::default_url_template")]
    pub url_template: String,
    #[serde(default = "InstallerConfig::default_version")]
    pub version: String,
    #[serde(default = "InstallerConfig::default_destination")]
    pub destination: PathBuf,
    #[serde(default = "InstallerConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Expected digests per architecture. Architectures without an entry are only
    /// checked structurally.
    #[serde(default)]
    pub sha256: HashMap<Architecture, String>,
}

impl InstallerConfig {
    pub fn default_url_template() -> String {
        "https://github.com/gptq/healthcheck/releases/latest/download/{binary}".to_string()
    }

    pub fn default_version() -> String {
        LATEST_VERSION.to_string()
    }

    pub fn default_destination() -> PathBuf {
        PathBuf::from("/usr/local/bin/healthcheck")
    }

    /// Upper bound for downloading the artifact. Defaults to 120 seconds.
    pub const fn default_request_timeout_secs() -> u64 {
        120
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn expected_sha256(&self, architecture: Architecture) -> Option<&str> {
        self.sha256.get(&architecture).map(String::as_str)
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            url_template: Self::default_url_template(),
            version: Self::default_version(),
            destination: Self::default_destination(),
            request_timeout_secs: Self::default_request_timeout_secs(),
            sha256: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs::File, io::Write};
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: InstallerConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, InstallerConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert_eq!(config.version, "latest");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().expect("tempdir failure");
        let file_path = dir.path().join("installer.yaml");
        let mut file = File::create(&file_path).expect("create failure");
        let raw_yaml_content = r#"
            url_template: "https://mirror.internal/healthcheck/{version}/{binary}"
            version: "v1.2.0"
            destination: "/opt/bin/healthcheck"
            sha256:
              arm64: "abc123"
        "#;
        writeln!(file, "{}", raw_yaml_content).expect("write_all failure");

        let config = load::<InstallerConfig>(&file_path).unwrap();
        assert_eq!(config.version, "v1.2.0");
        assert_eq!(config.destination, PathBuf::from("/opt/bin/healthcheck"));
        assert_eq!(config.expected_sha256(Architecture::Arm64), Some("abc123"));
        assert_eq!(config.expected_sha256(Architecture::Amd64), None);
        assert_eq!(config.request_timeout_secs, 120);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(serde_yaml::from_str::<InstallerConfig>("retries: 3").is_err());
        assert!(serde_yaml::from_str::<InstallerConfig>("sha256:\n  riscv64: abc").is_err());
    }
}
