use crate::errors::PackagingError;
pub use healthcheck::utils::yaml::load;
use healthcheck::{
    config::{DEFAULT_HEALTH_PATH, DEFAULT_PORT},
    HealthPath, HealthcheckPolicy,
};
use serde::{Deserialize, Serialize};

/// Fixed location of the probe in the final image. It is on `PATH`, so the
/// `HEALTHCHECK` command can call it by name.
pub const HEALTHCHECK_BINARY_PATH: &str = "/usr/local/bin/healthcheck";
pub const HEALTHCHECK_COMMAND: &str = "healthcheck";

/// Everything needed to render the image of one service.
///
/// Example:
/// ```yaml
/// build:
///   image: "maven:3.8-openjdk-11"
///   copy: ["pom.xml", "src"]
///   command: "mvn package -DskipTests"
///   artifact: "/app/target/*.jar"
///   artifact_name: "app.jar"
/// runtime:
///   image: "openjdk:11-jre-slim"
///   command: ["java", "-jar", "app.jar"]
/// service:
///   port: 8080
///   health_path: "actuator/health"
/// healthcheck:
///   retries: 3
/// installer:
///   source:
///     type: "path"
///     path: "tools/healthcheck"
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImageRecipe {
    pub build: ApplicationBuild,
    pub runtime: RuntimeStage,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub healthcheck: HealthcheckPolicy,
    #[serde(default)]
    pub installer: InstallerStage,
}

/// The application build stage. Its internals are opaque here: files are copied in,
/// one command runs, and one artifact is taken out.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationBuild {
    pub image: String,
    #[serde(default = "default_workdir")]
    pub workdir: String,
    pub copy: Vec<String>,
    pub command: String,
    pub artifact: String,
    pub artifact_name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeStage {
    pub image: String,
    #[serde(default = "default_workdir")]
    pub workdir: String,
    pub command: Vec<String>,
}

/// Port and health route of the served application. They feed both the `ENV` lines the
/// application reads and the probe arguments, which keeps the two in sync.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "ServiceConfig::default_port")]
    pub port: u16,
    #[serde(default = "ServiceConfig::default_health_path")]
    pub health_path: String,
}

impl ServiceConfig {
    pub const fn default_port() -> u16 {
        DEFAULT_PORT
    }

    pub fn default_health_path() -> String {
        DEFAULT_HEALTH_PATH.to_string()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: Self::default_port(),
            health_path: Self::default_health_path(),
        }
    }
}

/// The throwaway stage that builds and runs the installer. Only the placed binary
/// leaves it.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstallerStage {
    #[serde(default = "InstallerStage::default_image")]
    pub image: String,
    #[serde(default)]
    pub source: InstallerSource,
    /// Release tag passed to the installer. Defaults to the installer's own default.
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub url_template: Option<String>,
}

impl InstallerStage {
    pub fn default_image() -> String {
        "rust:1-slim-bookworm".to_string()
    }
}

impl Default for InstallerStage {
    fn default() -> Self {
        Self {
            image: Self::default_image(),
            source: InstallerSource::default(),
            release: None,
            url_template: None,
        }
    }
}

/// Where the installer stage gets the installer's sources from.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallerSource {
    /// A directory of the build context holding this workspace.
    Path { path: String },
    /// A git repository, optionally pinned to a revision.
    Git {
        url: String,
        #[serde(default)]
        rev: Option<String>,
    },
}

impl Default for InstallerSource {
    fn default() -> Self {
        InstallerSource::Path {
            path: "tools/healthcheck".to_string(),
        }
    }
}

fn default_workdir() -> String {
    "/app".to_string()
}

impl ImageRecipe {
    /// Rejects recipes that would build an image whose probe can never pass.
    pub fn validate(&self) -> Result<(), PackagingError> {
        let invalid = |message: String| Err(PackagingError::InvalidRecipe { message });

        if self.service.port == 0 {
            return invalid("service.port must be between 1 and 65535".to_string());
        }
        if let Err(e) = self.service.health_path.parse::<HealthPath>() {
            return invalid(format!("service.health_path: {}", e));
        }
        if let Err(e) = self.healthcheck.validate() {
            return invalid(format!("healthcheck: {}", e));
        }
        if self.build.copy.is_empty() {
            return invalid("build.copy must list at least one path".to_string());
        }
        if self.runtime.command.is_empty() {
            return invalid("runtime.command must not be empty".to_string());
        }
        for (field, value) in [
            ("build.image", &self.build.image),
            ("build.command", &self.build.command),
            ("build.artifact", &self.build.artifact),
            ("build.artifact_name", &self.build.artifact_name),
            ("runtime.image", &self.runtime.image),
            ("installer.image", &self.installer.image),
        ] {
            if value.trim().is_empty() {
                return invalid(format!("{} must not be empty", field));
            }
        }
        // Rendered into a single RUN line.
        for (field, value) in [
            ("installer.release", &self.installer.release),
            ("installer.url_template", &self.installer.url_template),
        ] {
            if let Some(value) = value {
                if value.is_empty() || value.chars().any(char::is_control) {
                    return invalid(format!(
                        "{} must be non-empty and free of control characters",
                        field
                    ));
                }
            }
        }
        Ok(())
    }

    /// Health path as the probe receives it, without a leading slash.
    pub fn probe_path(&self) -> Result<HealthPath, PackagingError> {
        self.service
            .health_path
            .parse()
            .map_err(|e| PackagingError::InvalidRecipe {
                message: format!("service.health_path: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_RECIPE: &str = r#"
        build:
          image: "maven:3.8-openjdk-11"
          copy: ["pom.xml", "src"]
          command: "mvn package -DskipTests"
          artifact: "/app/target/*.jar"
          artifact_name: "app.jar"
        runtime:
          image: "openjdk:11-jre-slim"
          command: ["java", "-jar", "app.jar"]
    "#;

    #[test]
    fn test_minimal_recipe_uses_defaults() {
        let recipe: ImageRecipe = serde_yaml::from_str(MINIMAL_RECIPE).unwrap();
        assert_eq!(recipe.service.port, 8080);
        assert_eq!(recipe.service.health_path, "actuator/health");
        assert_eq!(recipe.healthcheck, HealthcheckPolicy::default());
        assert_eq!(recipe.build.workdir, "/app");
        assert_eq!(recipe.installer.source, InstallerSource::default());
        assert!(recipe.validate().is_ok());
    }

    #[test]
    fn test_git_installer_source() {
        let source: InstallerSource = serde_yaml::from_str(
            "type: git\nurl: https://github.com/gptq/healthcheck\nrev: v1.2.0",
        )
        .unwrap();
        assert_eq!(
            source,
            InstallerSource::Git {
                url: "https://github.com/gptq/healthcheck".to_string(),
                rev: Some("v1.2.0".to_string()),
            }
        );
    }

    #[test]
    fn test_invalid_recipes_rejected() {
        let mut recipe: ImageRecipe = serde_yaml::from_str(MINIMAL_RECIPE).unwrap();
        recipe.service.health_path = "health?full=true".to_string();
        assert!(recipe.validate().is_err());

        let mut recipe: ImageRecipe = serde_yaml::from_str(MINIMAL_RECIPE).unwrap();
        recipe.service.port = 0;
        assert!(recipe.validate().is_err());

        let mut recipe: ImageRecipe = serde_yaml::from_str(MINIMAL_RECIPE).unwrap();
        recipe.healthcheck.retries = 0;
        assert!(recipe.validate().is_err());

        let mut recipe: ImageRecipe = serde_yaml::from_str(MINIMAL_RECIPE).unwrap();
        recipe.runtime.command.clear();
        assert!(recipe.validate().is_err());

        let mut recipe: ImageRecipe = serde_yaml::from_str(MINIMAL_RECIPE).unwrap();
        recipe.installer.url_template = Some("https://host/{binary}\nRUN rm -rf /".to_string());
        assert!(recipe.validate().is_err());
    }
}
