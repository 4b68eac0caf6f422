use std::fmt::{Debug, Display};

use crate::core::{cartridge::mappers::NRom, Bus, Cartridge, Error, Ppu, Result};

/// A cartridge mapper.
///
/// Copies the cartridge's program and character data into the console when the cartridge is
/// inserted. Every mapper is identified by its iNES mapper number.
pub trait Mapper: Debug + Display {
    /// The iNES mapper number this mapper implements
    fn mapper_num(&self) -> u8;
    /// Load the cartridge's PRG ROM into the CPU's address space and its CHR data into the PPU.
    fn load(&self, cartridge: &Cartridge, bus: &mut Bus, ppu: &mut Ppu) -> Result<()>;
}

/// Get the mapper implementation for a given mapper id.
///
/// ```
/// use tinynes::core::{get_mapper, Error};
/// assert_eq!(get_mapper(0).unwrap().mapper_num(), 0);
/// assert_eq!(get_mapper(4).unwrap_err(), Error::UnsupportedMapper(4));
/// ```
pub fn get_mapper(mapper_id: u8) -> Result<Box<dyn Mapper>> {
    match mapper_id {
        0 => Ok(Box::new(NRom::default())),
        _ => Err(Error::UnsupportedMapper(mapper_id)),
    }
}
