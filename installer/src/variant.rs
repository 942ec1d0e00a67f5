use crate::{arch::Architecture, utils::errors::InstallerError};
use std::fmt;
use url::Url;

pub const ARTIFACT_PREFIX: &str = "healthcheck";
pub const LATEST_VERSION: &str = "latest";
pub const BINARY_PLACEHOLDER: &str = "{binary}";
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// One published healthcheck binary. Identity is architecture plus release tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinaryVariant {
    architecture: Architecture,
    version: String,
}

impl BinaryVariant {
    pub fn new(architecture: Architecture, version: impl Into<String>) -> Self {
        Self {
            architecture,
            version: version.into(),
        }
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Release asset name, e.g. `healthcheck-arm64`.
    pub fn artifact_name(&self) -> String {
        format!("{}-{}", ARTIFACT_PREFIX, self.architecture)
    }

    /// Expands the artifact store template for this variant.
    ///
    /// `{binary}` is mandatory. A pinned version also needs `{version}` in the template,
    /// otherwise the download would silently ignore the pin.
    pub fn download_url(&self, template: &str) -> Result<Url, InstallerError> {
        let invalid = |message: &str| InstallerError::InvalidUrlTemplate {
            template: template.to_string(),
            message: message.to_string(),
        };
        if !template.contains(BINARY_PLACEHOLDER) {
            return Err(invalid("missing the {binary} placeholder"));
        }
        if self.version != LATEST_VERSION && !template.contains(VERSION_PLACEHOLDER) {
            return Err(invalid(
                "a pinned version requires the {version} placeholder",
            ));
        }
        let expanded = template
            .replace(BINARY_PLACEHOLDER, &self.artifact_name())
            .replace(VERSION_PLACEHOLDER, &self.version);
        let url = Url::parse(&expanded).map_err(|e| invalid(&e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(&format!("unsupported scheme '{}'", other))),
        }
    }
}

impl fmt::Display for BinaryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.artifact_name(), self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GITHUB_TEMPLATE: &str =
        "https://github.com/gptq/healthcheck/releases/latest/download/{binary}";

    #[test]
    fn test_artifact_names() {
        assert_eq!(
            BinaryVariant::new(Architecture::Amd64, LATEST_VERSION).artifact_name(),
            "healthcheck-amd64"
        );
        assert_eq!(
            BinaryVariant::new(Architecture::Arm64, LATEST_VERSION).artifact_name(),
            "healthcheck-arm64"
        );
    }

    #[test]
    fn test_download_url_latest() {
        let url = BinaryVariant::new(Architecture::Arm64, LATEST_VERSION)
            .download_url(GITHUB_TEMPLATE)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://github.com/gptq/healthcheck/releases/latest/download/healthcheck-arm64"
        );
    }

    #[test]
    fn test_download_url_pinned_version() {
        let url = BinaryVariant::new(Architecture::Amd64, "v1.2.0")
            .download_url("https://example.com/releases/download/{version}/{binary}")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/releases/download/v1.2.0/healthcheck-amd64"
        );
    }

    #[test]
    fn test_invalid_templates() {
        let pinned = BinaryVariant::new(Architecture::Amd64, "v1.2.0");
        assert!(matches!(
            pinned.download_url(GITHUB_TEMPLATE),
            Err(InstallerError::InvalidUrlTemplate { .. })
        ));

        let latest = BinaryVariant::new(Architecture::Amd64, LATEST_VERSION);
        assert!(latest
            .download_url("https://example.com/healthcheck")
            .is_err());
        assert!(latest.download_url("ftp://example.com/{binary}").is_err());
        assert!(latest.download_url("not a url {binary}").is_err());
    }

    #[test]
    fn test_display() {
        let variant = BinaryVariant::new(Architecture::Amd64, "v1.2.0");
        assert_eq!(variant.to_string(), "healthcheck-amd64@v1.2.0");
    }
}
