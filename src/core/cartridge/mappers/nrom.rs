use std::fmt::{Debug, Display};

use log::*;

use crate::core::{
    cartridge::{CHR_BANK_SIZE, PRG_BANK_SIZE},
    Bus, Cartridge, Error, Mapper, Ppu, Result,
};

/// Where the first PRG bank is mapped
const PRG_LOW: usize = 0x8000;
/// Where the last PRG bank is mapped
const PRG_HIGH: usize = PRG_LOW + PRG_BANK_SIZE;

#[derive(Default)]
/// NROM cartridge mapper (mapper 0)
///
/// The first bank is mapped to `0x8000` and the last to `0xC000`, so a cartridge with a single
/// bank has it mirrored in both halves.
pub struct NRom {}

impl Mapper for NRom {
    fn mapper_num(&self) -> u8 {
        0
    }
    fn load(&self, cartridge: &Cartridge, bus: &mut Bus, ppu: &mut Ppu) -> Result<()> {
        let (first, last) = match (cartridge.prg_banks.first(), cartridge.prg_banks.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => {
                return Err(Error::TruncatedImage {
                    expected: PRG_BANK_SIZE,
                    found: 0,
                })
            }
        };
        bus.write(PRG_LOW, first)?;
        bus.write(PRG_HIGH, last)?;
        bus.lock_prg_rom();
        if cartridge.prg_banks.len() > 2 {
            warn!(
                "NROM cartridge has {} PRG banks, only the first and last are mapped",
                cartridge.prg_banks.len()
            );
        }
        // Each 4KB chunk of CHR fills one pattern table
        let chr_len = cartridge.chr_rom.len().min(CHR_BANK_SIZE);
        ppu.load_pattern_table(&cartridge.chr_rom[..chr_len], cartridge.uses_chr_ram());
        ppu.set_mirroring(cartridge.mirroring);
        ppu.decode_tiles();
        debug!(
            "Loaded {} PRG banks and {:#X} bytes of CHR",
            cartridge.prg_banks.len(),
            chr_len
        );
        Ok(())
    }
}

impl Display for NRom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NROM")
    }
}
impl Debug for NRom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::NRom;
    use crate::core::{Bus, Cartridge, Mapper, Mirroring, Ppu};
    use assert_hex::assert_eq_hex;

    fn cartridge(prg: &[u8], chr: u8) -> Cartridge {
        let mut bytes = vec![b'N', b'E', b'S', 0x1A, prg.len() as u8, chr, 0x01, 0x00];
        bytes.resize(16, 0);
        prg.iter().for_each(|v| bytes.extend(vec![*v; 0x4000]));
        (0..chr).for_each(|_| {
            bytes.extend(vec![0xFF; 0x1000]);
            bytes.extend(vec![0x00; 0x1000]);
        });
        Cartridge::from_ines(&bytes).unwrap()
    }

    #[test]
    fn test_single_bank_mirrored() {
        let mut bus = Bus::new();
        let mut ppu = Ppu::new();
        NRom::default()
            .load(&cartridge(&[0xAA], 1), &mut bus, &mut ppu)
            .unwrap();
        assert_eq_hex!(bus.read(0x8000).unwrap(), 0xAA);
        assert_eq_hex!(bus.read(0xFFFF).unwrap(), 0xAA);
        assert!(bus.prg_rom_locked());
    }
    #[test]
    fn test_first_and_last_banks() {
        let mut bus = Bus::new();
        let mut ppu = Ppu::new();
        NRom::default()
            .load(&cartridge(&[0x11, 0x22, 0x33], 1), &mut bus, &mut ppu)
            .unwrap();
        assert_eq_hex!(bus.read(0xBFFF).unwrap(), 0x11);
        assert_eq_hex!(bus.read(0xC000).unwrap(), 0x33);
    }
    #[test]
    fn test_chr_and_mirroring() {
        let mut bus = Bus::new();
        let mut ppu = Ppu::new();
        NRom::default()
            .load(&cartridge(&[0x00], 1), &mut bus, &mut ppu)
            .unwrap();
        assert_eq_hex!(ppu.pattern_table(0)[0], 0xFF);
        assert_eq_hex!(ppu.pattern_table(1)[0], 0x00);
        assert_eq!(ppu.mirroring(), Mirroring::Vertical);
        // Both planes of the first table are set
        assert_eq!(ppu.tiles()[0][3][3], 3);
        assert_eq!(ppu.tiles()[256][3][3], 0);
    }
}
