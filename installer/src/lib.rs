//! Build-time installer for the healthcheck probe.
//!
//! Runs once while the image is assembled: normalizes the reported CPU architecture,
//! picks the matching release binary, downloads and verifies it, and places it at a
//! fixed executable path. Every failure is fatal so an image either carries a working
//! probe or is not built at all.

pub mod arch;
pub mod config;
pub mod install;
pub mod store;
pub mod utils;
pub mod variant;
pub mod verify;

pub use arch::Architecture;
pub use config::InstallerConfig;
pub use install::{InstallReport, Installer};
pub use store::{ArtifactStore, HttpArtifactStore};
pub use variant::BinaryVariant;
