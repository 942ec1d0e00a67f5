use anyhow::{Context, Result};
use clap::Parser;
use healthcheck_installer::{
    arch::detect_host_architecture,
    config::load,
    utils::logging::{setup_logging, setup_panic_handler},
    HttpArtifactStore, Installer, InstallerConfig,
};
use std::path::PathBuf;
use tracing::info;

/// Download the healthcheck binary built for this machine and install it.
#[derive(Parser, Debug)]
#[command(name = "healthcheck-installer", version)]
struct InstallerArgs {
    /// Architecture to install for instead of the kernel's machine name
    /// (accepts e.g. x86_64, amd64, aarch64, arm64)
    #[arg(long, env = "HEALTHCHECK_ARCH")]
    arch: Option<String>,
    /// YAML file with installer settings
    #[arg(short, long, value_parser)]
    config_path: Option<PathBuf>,
    /// Where to place the binary
    #[arg(long)]
    destination: Option<PathBuf>,
    /// Release tag to install
    #[arg(long = "release", value_name = "TAG")]
    release: Option<String>,
    /// Artifact URL template with a {binary} and optionally a {version} placeholder
    #[arg(long)]
    url_template: Option<String>,
    /// Expected SHA-256 of the binary for the selected architecture
    #[arg(long)]
    sha256: Option<String>,
}

impl InstallerArgs {
    fn resolve_config(&self) -> Result<InstallerConfig> {
        let mut config = match &self.config_path {
            Some(path) => load::<InstallerConfig>(path)?,
            None => InstallerConfig::default(),
        };
        if let Some(destination) = &self.destination {
            config.destination = destination.clone();
        }
        if let Some(release) = &self.release {
            config.version = release.clone();
        }
        if let Some(url_template) = &self.url_template {
            config.url_template = url_template.clone();
        }
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = InstallerArgs::parse();
    setup_logging();
    setup_panic_handler();

    let mut config = args.resolve_config()?;
    let reported_arch = match &args.arch {
        Some(arch) => arch.clone(),
        None => detect_host_architecture()?,
    };
    if let Some(sha256) = &args.sha256 {
        let architecture = reported_arch.parse()?;
        config.sha256.insert(architecture, sha256.clone());
    }

    let store = HttpArtifactStore::new(config.request_timeout())?;
    let report = Installer::new(config)
        .install(&reported_arch, store)
        .await
        .context("healthcheck install failed")?;

    info!(
        variant = %report.variant,
        destination = ?report.destination,
        sha256 = report.sha256.as_str(),
        "[Installer] Done"
    );
    Ok(())
}
