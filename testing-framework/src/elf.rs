//! Builders for byte strings that look like Linux executables.

pub const EM_X86_64: u16 = 62;
pub const EM_AARCH64: u16 = 183;

const ELF_HEADER_LEN: usize = 64;

/// A minimal 64-bit little-endian ELF executable header for `machine`, followed by
/// `payload`. Only the identification bytes, type, machine and version are filled in.
pub fn fake_elf(machine: u16, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0u8; ELF_HEADER_LEN];
    bytes[..4].copy_from_slice(b"\x7fELF");
    bytes[4] = 2; // ELFCLASS64
    bytes[5] = 1; // ELFDATA2LSB
    bytes[6] = 1; // EV_CURRENT
    bytes[16..18].copy_from_slice(&2u16.to_le_bytes()); // ET_EXEC
    bytes[18..20].copy_from_slice(&machine.to_le_bytes());
    bytes[20..24].copy_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

pub fn fake_amd64_binary() -> Vec<u8> {
    fake_elf(EM_X86_64, b"healthcheck for x86_64")
}

pub fn fake_arm64_binary() -> Vec<u8> {
    fake_elf(EM_AARCH64, b"healthcheck for aarch64")
}
