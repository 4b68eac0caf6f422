mod mapper;
pub use mapper::{get_mapper, Mapper};
pub mod mappers;

use log::*;
use std::fmt::{Debug, Display};

use crate::core::{Error, Result};

/// Size of the iNES header
pub const HEADER_SIZE: usize = 16;
/// Size of the optional trainer between the header and PRG ROM
pub const TRAINER_SIZE: usize = 512;
/// Size of a single PRG ROM bank
pub const PRG_BANK_SIZE: usize = 0x4000;
/// Size of a single CHR ROM bank
pub const CHR_BANK_SIZE: usize = 0x2000;
const MAGIC: [u8; 4] = [b'N', b'E', b'S', 0x1A];

/// How the PPU's 4 logical nametables map onto its nametable RAM.
///
/// Named after the direction the nametables are mirrored in, so [Mirroring::Horizontal] means
/// `0x2000` and `0x2400` share memory.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    /// The cartridge provides enough RAM for 4 unique nametables
    FourScreen,
}

/// An NES cartridge, parsed from an iNES image.
///
/// The ROM is immutable once parsed, and is copied into the console's memory by its [Mapper]
/// when the cartridge is inserted.
#[derive(Clone, PartialEq, Eq)]
pub struct Cartridge {
    /// The 16KB PRG ROM banks, in the order they appear in the image
    pub prg_banks: Vec<Vec<u8>>,
    /// CHR ROM, empty if the cartridge uses CHR RAM
    pub chr_rom: Vec<u8>,
    pub mirroring: Mirroring,
    pub mapper_id: u8,
    // Whether the cartridge has battery backed RAM
    battery: bool,
    // Whether the image had a trainer, which is skipped
    trainer: bool,
}

impl Cartridge {
    /// Parse the contents of an iNES (.nes) file.
    ///
    /// Fails if the magic number is wrong, or if the image is shorter than its header claims.
    /// The mapper is only checked when the cartridge is inserted.
    /// ```
    /// use tinynes::core::{Cartridge, Error, Mirroring};
    /// let mut image = vec![b'N', b'E', b'S', 0x1A, 1, 0, 0x01, 0x00];
    /// image.resize(16 + 0x4000, 0);
    /// let cartridge = Cartridge::from_ines(&image).unwrap();
    /// assert_eq!(cartridge.prg_banks.len(), 1);
    /// assert_eq!(cartridge.mirroring, Mirroring::Vertical);
    /// assert_eq!(
    ///     Cartridge::from_ines(&image[..100]),
    ///     Err(Error::TruncatedImage { expected: 0x4010, found: 100 })
    /// );
    /// ```
    pub fn from_ines(bytes: &[u8]) -> Result<Cartridge> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::TruncatedImage {
                expected: HEADER_SIZE,
                found: bytes.len(),
            });
        }
        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != MAGIC {
            return Err(Error::InvalidHeader(magic));
        }
        debug!("Cartridge header: {:02X?}", &bytes[0..HEADER_SIZE]);
        let prg_banks = bytes[4] as usize;
        let chr_banks = bytes[5] as usize;
        let battery = (bytes[6] & 0x02) != 0;
        let trainer = (bytes[6] & 0x04) != 0;
        let four_screen = (bytes[6] & 0x08) != 0;
        debug!(
            "Trainer: {}, four screen: {}, battery backed ram: {}",
            trainer, four_screen, battery
        );
        let prg_start = HEADER_SIZE + if trainer { TRAINER_SIZE } else { 0 };
        let chr_start = prg_start + prg_banks * PRG_BANK_SIZE;
        let total = chr_start + chr_banks * CHR_BANK_SIZE;
        // A cartridge without any program is as good as a truncated one
        let expected = total.max(prg_start + PRG_BANK_SIZE);
        if bytes.len() < expected {
            return Err(Error::TruncatedImage {
                expected,
                found: bytes.len(),
            });
        }
        // The low nibble of byte 7 holds console type flags, not mapper bits.
        // Archaic images often have junk in bytes 7 to 15, so the high nibble is ignored
        let mapper_id = match bytes[7] & 0x0C {
            0x04 => {
                debug!("Archaic iNES detected");
                bytes[6] >> 4
            }
            _ => (bytes[6] >> 4) | (bytes[7] & 0xF0),
        };
        let mirroring = if four_screen {
            Mirroring::FourScreen
        } else if (bytes[6] & 0x01) == 0 {
            Mirroring::Horizontal
        } else {
            Mirroring::Vertical
        };
        debug!(
            "{} PRG banks, {} CHR banks, {:?} mirroring, mapper {}",
            prg_banks, chr_banks, mirroring, mapper_id
        );
        if bytes.len() > total {
            debug!("Ignoring {:#X} trailing bytes", bytes.len() - total);
        }
        Ok(Cartridge {
            prg_banks: bytes[prg_start..chr_start]
                .chunks(PRG_BANK_SIZE)
                .map(|b| b.to_vec())
                .collect(),
            chr_rom: bytes[chr_start..total].to_vec(),
            mirroring,
            mapper_id,
            battery,
            trainer,
        })
    }
    /// [true] if the cartridge has battery backed RAM (i.e. save data), [false] otherwise
    pub fn has_battery_backed_ram(&self) -> bool {
        self.battery
    }
    /// [true] if the image contained a trainer
    pub fn has_trainer(&self) -> bool {
        self.trainer
    }
    /// [true] if the cartridge has no CHR ROM, and so uses 8KB of CHR RAM instead
    pub fn uses_chr_ram(&self) -> bool {
        self.chr_rom.is_empty()
    }
}

impl Display for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mapper {} with {}KB PRG ROM and {}KB CHR {}",
            self.mapper_id,
            self.prg_banks.len() * PRG_BANK_SIZE / 0x400,
            if self.uses_chr_ram() {
                CHR_BANK_SIZE / 0x400
            } else {
                self.chr_rom.len() / 0x400
            },
            if self.uses_chr_ram() { "RAM" } else { "ROM" }
        )
    }
}
impl Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cartridge({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cartridge, Mirroring};
    use crate::core::Error;
    use test_case::test_case;

    fn image(flags6: u8, flags7: u8, prg: u8, chr: u8) -> Vec<u8> {
        let mut bytes = vec![b'N', b'E', b'S', 0x1A, prg, chr, flags6, flags7];
        bytes.resize(16, 0);
        if flags6 & 0x04 != 0 {
            bytes.extend([0xEE; 512]);
        }
        (0..prg).for_each(|i| bytes.extend(vec![i; 0x4000]));
        bytes.extend(vec![0xCC; chr as usize * 0x2000]);
        bytes
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = image(0, 0, 1, 1);
        bytes[3] = 0x1B;
        assert_eq!(
            Cartridge::from_ines(&bytes),
            Err(Error::InvalidHeader([b'N', b'E', b'S', 0x1B]))
        );
    }
    #[test]
    fn test_short_header() {
        assert_eq!(
            Cartridge::from_ines(b"NES\x1A"),
            Err(Error::TruncatedImage {
                expected: 16,
                found: 4
            })
        );
    }
    #[test]
    fn test_truncated_chr() {
        let mut bytes = image(0, 0, 1, 1);
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            Cartridge::from_ines(&bytes),
            Err(Error::TruncatedImage { .. })
        ));
    }
    #[test]
    fn test_no_prg_banks() {
        assert!(matches!(
            Cartridge::from_ines(&image(0, 0, 0, 1)),
            Err(Error::TruncatedImage { .. })
        ));
    }
    #[test]
    fn test_banks_split() {
        let c = Cartridge::from_ines(&image(0, 0, 2, 1)).unwrap();
        assert_eq!(c.prg_banks.len(), 2);
        assert_eq!(c.prg_banks[1][0], 1);
        assert_eq!(c.chr_rom.len(), 0x2000);
        assert!(!c.uses_chr_ram());
    }
    #[test]
    fn test_trainer_skipped() {
        let c = Cartridge::from_ines(&image(0x04, 0, 1, 0)).unwrap();
        assert!(c.has_trainer());
        assert_eq!(c.prg_banks[0][0], 0);
        assert!(c.uses_chr_ram());
    }
    #[test_case(0x00, 0x00, 0 ; "nrom")]
    #[test_case(0x10, 0x00, 1 ; "low nibble")]
    #[test_case(0x40, 0x10, 0x14 ; "high nibble")]
    #[test_case(0x20, 0x14, 2 ; "archaic ignores byte 7")]
    #[test_case(0x00, 0x01, 0 ; "vs unisystem flag is not part of the id")]
    #[test_case(0x00, 0x0B, 0 ; "low nibble of byte 7 ignored")]
    fn test_mapper_id(flags6: u8, flags7: u8, id: u8) {
        assert_eq!(
            Cartridge::from_ines(&image(flags6, flags7, 1, 0))
                .unwrap()
                .mapper_id,
            id
        );
    }
    #[test_case(0x00, Mirroring::Horizontal)]
    #[test_case(0x01, Mirroring::Vertical)]
    #[test_case(0x09, Mirroring::FourScreen)]
    fn test_mirroring(flags6: u8, mirroring: Mirroring) {
        assert_eq!(
            Cartridge::from_ines(&image(flags6, 0, 1, 0))
                .unwrap()
                .mirroring,
            mirroring
        );
    }
    #[test]
    fn test_battery() {
        assert!(Cartridge::from_ines(&image(0x02, 0, 1, 0))
            .unwrap()
            .has_battery_backed_ram());
    }
}
