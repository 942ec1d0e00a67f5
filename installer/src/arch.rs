use crate::utils::errors::InstallerError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::IntoEnumIterator;

/// ELF `e_machine` values of the supported architectures.
pub const EM_X86_64: u16 = 62;
pub const EM_AARCH64: u16 = 183;

/// CPU architectures a healthcheck binary is published for.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Architecture {
    Amd64,
    Arm64,
}

/// Every spelling we accept, as reported by `uname -m`, Docker's `TARGETARCH` or
/// Rust/Go target names. Anything not listed here is rejected.
const ARCHITECTURE_ALIASES: &[(&str, Architecture)] = &[
    ("x86_64", Architecture::Amd64),
    ("x86-64", Architecture::Amd64),
    ("amd64", Architecture::Amd64),
    ("x64", Architecture::Amd64),
    ("aarch64", Architecture::Arm64),
    ("arm64", Architecture::Arm64),
    ("armv8", Architecture::Arm64),
];

impl Architecture {
    pub fn elf_machine(&self) -> u16 {
        match self {
            Architecture::Amd64 => EM_X86_64,
            Architecture::Arm64 => EM_AARCH64,
        }
    }

    /// Comma separated list of the canonical names, for error messages.
    pub fn supported() -> String {
        Architecture::iter()
            .map(|arch| arch.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Architecture {
    type Err = InstallerError;

    fn from_str(reported: &str) -> Result<Self, Self::Err> {
        let normalized = reported.trim().to_ascii_lowercase();
        ARCHITECTURE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, arch)| *arch)
            .ok_or_else(|| InstallerError::UnsupportedArchitecture {
                reported: reported.to_string(),
                supported: Architecture::supported(),
            })
    }
}

/// Machine name of the running kernel, the same string `uname -m` prints.
pub fn detect_host_architecture() -> Result<String, InstallerError> {
    let uts = nix::sys::utsname::uname().map_err(|e| {
        InstallerError::ArchitectureDetectionError {
            message: format!("uname failed: {}", e),
        }
    })?;
    Ok(uts.machine().to_string_lossy().into_owned())
}
