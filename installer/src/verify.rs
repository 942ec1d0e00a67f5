//! Integrity checks on a fetched artifact before it is placed on the image.

use crate::{arch::Architecture, utils::errors::InstallerError};
use sha2::{Digest, Sha256};

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";
const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;
const E_MACHINE_OFFSET: usize = 18;
const ELF64_HEADER_LEN: usize = 64;

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Checks that `bytes` is a 64-bit little-endian ELF file built for `architecture`.
///
/// A binary for the wrong machine would fail to exec on every probe, which the runtime
/// cannot tell apart from an unhealthy service.
pub fn verify_elf(bytes: &[u8], architecture: Architecture) -> Result<(), InstallerError> {
    let fail = |message: String| Err(InstallerError::VerificationError { message });

    if bytes.len() < ELF64_HEADER_LEN {
        return fail(format!(
            "artifact is {} bytes, too short for an ELF header",
            bytes.len()
        ));
    }
    if &bytes[..4] != ELF_MAGIC {
        return fail("artifact is not an ELF executable".to_string());
    }
    if bytes[4] != ELFCLASS64 || bytes[5] != ELFDATA2LSB {
        return fail("artifact is not a 64-bit little-endian ELF file".to_string());
    }
    let machine = u16::from_le_bytes([bytes[E_MACHINE_OFFSET], bytes[E_MACHINE_OFFSET + 1]]);
    if machine != architecture.elf_machine() {
        return fail(format!(
            "artifact targets ELF machine {}, expected {} for {}",
            machine,
            architecture.elf_machine(),
            architecture
        ));
    }
    Ok(())
}

/// Compares against an expected SHA-256, given as hex with an optional `sha256:` prefix.
pub fn verify_sha256(bytes: &[u8], expected: &str) -> Result<String, InstallerError> {
    let expected = expected
        .trim()
        .trim_start_matches("sha256:")
        .to_ascii_lowercase();
    let actual = sha256_hex(bytes);
    if actual != expected {
        return Err(InstallerError::VerificationError {
            message: format!("sha256 mismatch: expected {}, got {}", expected, actual),
        });
    }
    Ok(actual)
}
