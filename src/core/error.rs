use thiserror::Error;

/// Everything that can stop the emulator.
///
/// The console is a closed, deterministic system, so every one of these is fatal.
/// Nothing is retried, the message identifies the failing header, mapper, opcode, or address.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The image does not start with `NES\x1A`
    #[error("invalid cartridge header magic {0:02X?}")]
    InvalidHeader([u8; 4]),
    /// The image is shorter than its header says it should be
    #[error("cartridge image is truncated: expected {expected:#X} bytes, found {found:#X}")]
    TruncatedImage { expected: usize, found: usize },
    /// No mapper implementation for this id
    #[error("unsupported mapper {0} ({0:#04X})")]
    UnsupportedMapper(u8),
    /// The opcode table has no entry for the byte fetched at `addr`
    #[error("illegal opcode {opcode:#04X} at {addr:#06X}")]
    IllegalOpcode { opcode: u8, addr: u16 },
    /// An address escaped the 16 bit address space
    #[error("address {0:#X} is outside of the CPU address space")]
    AddressOutOfRange(usize),
}

/// Result type used throughout [crate::core].
pub type Result<T> = std::result::Result<T, Error>;
