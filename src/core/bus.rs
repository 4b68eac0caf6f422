use log::*;

use crate::core::{
    registers::{FRAME_COUNTER, JOY1, OAMDMA, POWER_UP_GATED, SND_CHN},
    Error, Result,
};

/// Size of the CPU's address space
pub const MEM_SIZE: usize = 0x10000;
/// Size of the console's internal RAM
const RAM_SIZE: usize = 0x800;
/// End of the (mirrored) internal RAM
const RAM_END: usize = 0x2000;
/// End of the (mirrored) PPU registers
const PPU_REGISTERS_END: usize = 0x4000;
/// First APU register
const APU_REGISTERS_START: usize = 0x4000;
/// Last channel register, the status and frame counter registers are matched separately
const APU_CHANNEL_REGISTERS_END: usize = 0x4013;
/// Start of the cartridge's PRG ROM windows
pub const PRG_ROM_START: usize = 0x8000;

/// A write that landed on a memory mapped register.
///
/// Returned by [Bus::write] so the owner of the bus can forward it to the right unit
/// before the next instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterWrite {
    /// One of the 8 PPU registers, `addr` is the canonical address in `0x2000..0x2008`
    Ppu { addr: usize, value: u8 },
    /// The OAM DMA register, `page` is the high byte of the source address
    OamDma(u8),
    /// An APU register
    Apu { addr: usize, value: u8 },
    /// The controller strobe
    Controller(u8),
}

/// The CPU's memory bus.
///
/// Stores the entire 64KB address space as a flat array.
/// Mirrored regions are written to every mirror when any of them is written, so reading never
/// needs to translate an address.
pub struct Bus {
    mem: Vec<u8>,
    // Whether the PPU is warmed up enough to accept writes to PPUCTRL, PPUMASK, PPUSCROLL and PPUADDR
    ppu_writes_enabled: bool,
    // Whether the mapper has finished loading PRG ROM, after which it is read only
    prg_rom_locked: bool,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Create a bus with every byte set to 0 and the PPU registers still gated.
    pub fn new() -> Bus {
        Bus {
            mem: vec![0; MEM_SIZE],
            ppu_writes_enabled: false,
            prg_rom_locked: false,
        }
    }
    /// Mask an address to 16 bits.
    ///
    /// ```
    /// use tinynes::core::Bus;
    /// assert_eq!(Bus::mask(0x1_2345), Ok(0x2345));
    /// ```
    pub fn mask(addr: usize) -> Result<usize> {
        let masked = addr & 0xFFFF;
        if masked < MEM_SIZE {
            Ok(masked)
        } else {
            Err(Error::AddressOutOfRange(addr))
        }
    }
    /// Read a byte.
    ///
    /// Does not have any side effects, registers that change state when read are handled by
    /// [Nes::read_byte][crate::core::Nes::read_byte].
    pub fn read(&self, addr: usize) -> Result<u8> {
        Ok(self.mem[Bus::mask(addr)?])
    }
    /// Write a run of bytes starting at `addr`.
    ///
    /// Every byte is copied to all of its mirrors.
    /// Returns the register write triggered by the first byte, if it landed on a register.
    /// ```
    /// use tinynes::core::{Bus, RegisterWrite};
    /// let mut bus = Bus::new();
    /// assert_eq!(bus.write(0x0012, &[0x34]), Ok(None));
    /// assert_eq!(bus.read(0x1012), Ok(0x34));
    /// assert_eq!(
    ///     bus.write(0x4015, &[0x0F]),
    ///     Ok(Some(RegisterWrite::Apu { addr: 0x4015, value: 0x0F }))
    /// );
    /// ```
    pub fn write(&mut self, addr: usize, bytes: &[u8]) -> Result<Option<RegisterWrite>> {
        let mut register_write = None;
        for (i, value) in bytes.iter().enumerate() {
            let masked = Bus::mask(addr + i)?;
            let w = self.write_one(masked, *value);
            if i == 0 {
                register_write = w;
            }
        }
        Ok(register_write)
    }
    /// Allow writes to the gated PPU registers.
    pub fn enable_ppu_writes(&mut self) {
        self.ppu_writes_enabled = true;
    }
    /// Whether the gated PPU registers currently accept writes.
    pub fn ppu_writes_enabled(&self) -> bool {
        self.ppu_writes_enabled
    }
    /// Make `0x8000..0x10000` read only.
    ///
    /// Called by the mapper once it has copied the PRG banks into place.
    pub fn lock_prg_rom(&mut self) {
        self.prg_rom_locked = true;
    }
    pub fn prg_rom_locked(&self) -> bool {
        self.prg_rom_locked
    }

    fn write_one(&mut self, addr: usize, value: u8) -> Option<RegisterWrite> {
        match addr {
            0..RAM_END => {
                (addr % RAM_SIZE..RAM_END)
                    .step_by(RAM_SIZE)
                    .for_each(|a| self.mem[a] = value);
                None
            }
            RAM_END..PPU_REGISTERS_END => {
                let reg = RAM_END + addr % 8;
                if !self.ppu_writes_enabled && POWER_UP_GATED.contains(&reg) {
                    debug!(
                        "Dropping write of {:#04X} to {:#06X} during PPU warm up",
                        value, addr
                    );
                    return None;
                }
                (reg..PPU_REGISTERS_END)
                    .step_by(8)
                    .for_each(|a| self.mem[a] = value);
                Some(RegisterWrite::Ppu { addr: reg, value })
            }
            OAMDMA => {
                self.mem[addr] = value;
                Some(RegisterWrite::OamDma(value))
            }
            JOY1 => {
                self.mem[addr] = value;
                Some(RegisterWrite::Controller(value))
            }
            APU_REGISTERS_START..=APU_CHANNEL_REGISTERS_END | SND_CHN | FRAME_COUNTER => {
                self.mem[addr] = value;
                Some(RegisterWrite::Apu { addr, value })
            }
            PRG_ROM_START.. if self.prg_rom_locked => {
                debug!("Ignoring write of {:#04X} to PRG ROM at {:#06X}", value, addr);
                None
            }
            _ => {
                self.mem[addr] = value;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Bus, RegisterWrite};
    use assert_hex::assert_eq_hex;
    use test_case::test_case;

    #[test_case(0x0000)]
    #[test_case(0x0123)]
    #[test_case(0x07FF)]
    #[test_case(0x0800)]
    #[test_case(0x1ABC)]
    fn test_ram_mirrors(addr: usize) {
        let mut bus = Bus::new();
        bus.write(addr, &[0x5A]).unwrap();
        let base = addr % 0x800;
        [base, base + 0x800, base + 0x1000, base + 0x1800]
            .iter()
            .for_each(|a| assert_eq_hex!(bus.read(*a).unwrap(), 0x5A));
    }
    #[test]
    fn test_ppu_register_mirrors() {
        let mut bus = Bus::new();
        bus.enable_ppu_writes();
        let w = bus.write(0x3456, &[0x12]).unwrap();
        assert_eq!(
            w,
            Some(RegisterWrite::Ppu {
                addr: 0x2006,
                value: 0x12
            })
        );
        assert_eq_hex!(bus.read(0x2006).unwrap(), 0x12);
        assert_eq_hex!(bus.read(0x3FFE).unwrap(), 0x12);
        assert_eq_hex!(bus.read(0x2007).unwrap(), 0x00);
    }
    #[test_case(0x2000)]
    #[test_case(0x2001)]
    #[test_case(0x2005)]
    #[test_case(0x2006)]
    #[test_case(0x2008)]
    fn test_gated_registers_dropped_before_power_up(addr: usize) {
        let mut bus = Bus::new();
        assert_eq!(bus.write(addr, &[0x80]).unwrap(), None);
        assert_eq_hex!(bus.read(addr).unwrap(), 0x00);
    }
    #[test]
    fn test_ungated_ppu_registers_before_power_up() {
        let mut bus = Bus::new();
        assert_eq!(
            bus.write(0x2003, &[0x10]).unwrap(),
            Some(RegisterWrite::Ppu {
                addr: 0x2003,
                value: 0x10
            })
        );
        assert_eq!(
            bus.write(0x2007, &[0x22]).unwrap(),
            Some(RegisterWrite::Ppu {
                addr: 0x2007,
                value: 0x22
            })
        );
    }
    #[test]
    fn test_register_classification() {
        let mut bus = Bus::new();
        assert_eq!(
            bus.write(0x4014, &[0x02]).unwrap(),
            Some(RegisterWrite::OamDma(0x02))
        );
        assert_eq!(
            bus.write(0x4016, &[0x01]).unwrap(),
            Some(RegisterWrite::Controller(0x01))
        );
        assert_eq!(
            bus.write(0x4017, &[0x40]).unwrap(),
            Some(RegisterWrite::Apu {
                addr: 0x4017,
                value: 0x40
            })
        );
        assert_eq!(bus.write(0x4018, &[0x40]).unwrap(), None);
        assert_eq!(bus.write(0x8000, &[0xEA]).unwrap(), None);
    }
    #[test]
    fn test_addresses_are_masked() {
        let mut bus = Bus::new();
        bus.write(0x1_6000, &[0x77]).unwrap();
        assert_eq_hex!(bus.read(0x6000).unwrap(), 0x77);
        assert_eq_hex!(bus.read(0x2_6000).unwrap(), 0x77);
    }
    #[test]
    fn test_locked_prg_rom_ignores_writes() {
        let mut bus = Bus::new();
        bus.write(0x8000, &[0xA9; 0x8000]).unwrap();
        bus.lock_prg_rom();
        assert_eq!(bus.write(0x8000, &[0x00]).unwrap(), None);
        assert_eq!(bus.write(0xFFFF, &[0x00]).unwrap(), None);
        assert_eq_hex!(bus.read(0x8000).unwrap(), 0xA9);
        assert_eq_hex!(bus.read(0xFFFF).unwrap(), 0xA9);
        // PRG RAM below the ROM stays writable
        bus.write(0x6000, &[0x42]).unwrap();
        assert_eq_hex!(bus.read(0x6000).unwrap(), 0x42);
    }
    #[test]
    fn test_bulk_write() {
        let mut bus = Bus::new();
        let bank = [0xAB; 0x4000];
        assert_eq!(bus.write(0xC000, &bank).unwrap(), None);
        assert_eq_hex!(bus.read(0xC000).unwrap(), 0xAB);
        assert_eq_hex!(bus.read(0xFFFF).unwrap(), 0xAB);
        assert_eq_hex!(bus.read(0xBFFF).unwrap(), 0x00);
    }
}
