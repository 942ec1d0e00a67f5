use crate::{
    arch::Architecture,
    config::InstallerConfig,
    store::ArtifactStore,
    utils::errors::InstallerError,
    variant::BinaryVariant,
    verify::{sha256_hex, verify_elf, verify_sha256},
};
use std::{
    fs::{self, Permissions},
    io::Write,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};
use tracing::info;

/// Mode of the placed binary: executable by the runtime whatever user it probes as.
pub const EXECUTABLE_MODE: u32 = 0o755;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallReport {
    pub variant: BinaryVariant,
    pub destination: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Maps the reported architecture to the one variant published for it.
pub fn select_variant(reported_arch: &str, version: &str) -> Result<BinaryVariant, InstallerError> {
    let architecture: Architecture = reported_arch.parse()?;
    Ok(BinaryVariant::new(architecture, version))
}

pub struct Installer {
    config: InstallerConfig,
}

impl Installer {
    pub fn new(config: InstallerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Selects, fetches, verifies and places the binary, in that order.
    ///
    /// Any failure leaves the destination untouched. Nothing is fetched when the
    /// architecture or the url template is rejected.
    pub async fn install<S: ArtifactStore>(
        &self,
        reported_arch: &str,
        store: S,
    ) -> Result<InstallReport, InstallerError> {
        let variant = select_variant(reported_arch, &self.config.version)?;
        let url = variant.download_url(&self.config.url_template)?;
        info!(
            reported_arch = reported_arch,
            variant = %variant,
            url = url.as_str(),
            "[Installer] Selected binary variant"
        );

        let bytes = store.fetch(&url).await?;
        // The store is not needed past this point.
        drop(store);

        verify_elf(&bytes, variant.architecture())?;
        let sha256 = match self.config.expected_sha256(variant.architecture()) {
            Some(expected) => verify_sha256(&bytes, expected)?,
            None => sha256_hex(&bytes),
        };

        write_executable(&self.config.destination, &bytes)?;
        info!(
            variant = %variant,
            destination = ?self.config.destination,
            sha256 = sha256.as_str(),
            size_bytes = bytes.len(),
            "[Installer] Installed healthcheck binary"
        );

        Ok(InstallReport {
            variant,
            destination: self.config.destination.clone(),
            sha256,
            size_bytes: bytes.len(),
        })
    }
}

/// Writes `bytes` to `destination` with [`EXECUTABLE_MODE`].
///
/// The content is staged in a temporary file next to the destination and renamed over
/// it, so readers see either the old file or the complete new one.
pub fn write_executable(destination: &Path, bytes: &[u8]) -> Result<(), InstallerError> {
    let write_error = |message: String| InstallerError::WriteError {
        path: destination.to_path_buf(),
        message,
    };

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .map_err(|e| write_error(format!("failed to create {:?}: {}", dir, e)))?;

    let mut staged = tempfile::Builder::new()
        .prefix(".healthcheck-")
        .tempfile_in(dir)
        .map_err(|e| write_error(format!("failed to create staging file: {}", e)))?;
    staged
        .write_all(bytes)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| write_error(format!("failed to write staging file: {}", e)))?;
    fs::set_permissions(staged.path(), Permissions::from_mode(EXECUTABLE_MODE))
        .map_err(|e| write_error(format!("failed to set permissions: {}", e)))?;
    staged
        .persist(destination)
        .map_err(|e| write_error(format!("failed to move into place: {}", e.error)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockArtifactStore;
    use healthcheck_testing_framework::elf::{fake_amd64_binary, fake_arm64_binary};
    use tempfile::tempdir;

    fn installer_into(dir: &Path) -> Installer {
        Installer::new(InstallerConfig {
            url_template: "https://releases.example.com/{version}/{binary}".to_string(),
            destination: dir.join("bin").join("healthcheck"),
            ..InstallerConfig::default()
        })
    }

    #[tokio::test]
    async fn test_install_selects_variant_for_arch() {
        let dir = tempdir().unwrap();
        let installer = installer_into(dir.path());

        let mut store = MockArtifactStore::new();
        store
            .expect_fetch()
            .withf(|url| {
                url.as_str() == "https://releases.example.com/latest/healthcheck-arm64"
            })
            .times(1)
            .returning(|_| Ok(fake_arm64_binary()));

        let report = installer.install("aarch64", store).await.unwrap();
        assert_eq!(report.variant.architecture(), Architecture::Arm64);
        assert_eq!(report.variant.artifact_name(), "healthcheck-arm64");
        assert_eq!(fs::read(&report.destination).unwrap(), fake_arm64_binary());
        assert_eq!(report.sha256, sha256_hex(&fake_arm64_binary()));

        let mode = fs::metadata(&report.destination).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, EXECUTABLE_MODE);
    }

    #[tokio::test]
    async fn test_unsupported_arch_never_fetches_or_writes() {
        let dir = tempdir().unwrap();
        let installer = installer_into(dir.path());

        let mut store = MockArtifactStore::new();
        store.expect_fetch().never();

        let result = installer.install("riscv64", store).await;
        assert!(matches!(
            result,
            Err(InstallerError::UnsupportedArchitecture { .. })
        ));
        assert!(!installer.config().destination.exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_destination_untouched() {
        let dir = tempdir().unwrap();
        let installer = installer_into(dir.path());
        let destination = installer.config().destination.clone();
        fs::create_dir_all(destination.parent().unwrap()).unwrap();
        fs::write(&destination, b"previous").unwrap();

        let mut store = MockArtifactStore::new();
        store.expect_fetch().times(1).returning(|url| {
            Err(InstallerError::FetchError {
                url: url.to_string(),
                message: "connection reset".to_string(),
            })
        });

        let result = installer.install("x86_64", store).await;
        assert!(matches!(result, Err(InstallerError::FetchError { .. })));
        assert_eq!(fs::read(&destination).unwrap(), b"previous");
    }

    #[tokio::test]
    async fn test_wrong_machine_binary_rejected() {
        let dir = tempdir().unwrap();
        let installer = installer_into(dir.path());

        let mut store = MockArtifactStore::new();
        store
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(fake_arm64_binary()));

        let result = installer.install("x86_64", store).await;
        assert!(matches!(
            result,
            Err(InstallerError::VerificationError { .. })
        ));
        assert!(!installer.config().destination.exists());
    }

    #[tokio::test]
    async fn test_checksum_mismatch_rejected() {
        let dir = tempdir().unwrap();
        let mut config = installer_into(dir.path()).config().clone();
        config.sha256.insert(Architecture::Amd64, "00".repeat(32));
        let installer = Installer::new(config);

        let mut store = MockArtifactStore::new();
        store
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(fake_amd64_binary()));

        let result = installer.install("amd64", store).await;
        assert!(matches!(
            result,
            Err(InstallerError::VerificationError { .. })
        ));
        assert!(!installer.config().destination.exists());
    }

    #[tokio::test]
    async fn test_checksum_match_accepted() {
        let dir = tempdir().unwrap();
        let mut config = installer_into(dir.path()).config().clone();
        config
            .sha256
            .insert(Architecture::Amd64, sha256_hex(&fake_amd64_binary()));
        let installer = Installer::new(config);

        let mut store = MockArtifactStore::new();
        store
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(fake_amd64_binary()));

        let report = installer.install("x86_64", store).await.unwrap();
        assert_eq!(report.size_bytes, fake_amd64_binary().len());
    }

    #[test]
    fn test_select_variant_is_deterministic() {
        for reported in ["x86_64", "aarch64"] {
            let first = select_variant(reported, "v1").unwrap();
            let second = select_variant(reported, "v1").unwrap();
            assert_eq!(first, second);
        }
        assert!(select_variant("mips", "v1").is_err());
    }

    #[test]
    fn test_write_executable_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("healthcheck");
        write_executable(&destination, b"one").unwrap();
        write_executable(&destination, b"two").unwrap();
        assert_eq!(fs::read(&destination).unwrap(), b"two");

        // No staging files left behind.
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
