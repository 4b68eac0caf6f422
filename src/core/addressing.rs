use crate::core::{
    opcodes::{AddressingMode, Index},
    Nes, Result,
};

/// The resolved operand of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// The instruction has no operand
    None,
    /// The instruction operates on A
    Accumulator,
    /// The value is part of the instruction
    Immediate(u8),
    /// The effective address of the operand
    Address(usize),
}

fn page_crossed(base: u16, addr: u16) -> bool {
    (base & 0xFF00) != (addr & 0xFF00)
}

impl Nes {
    /// Resolve the operand of the instruction at the PC using a given addressing mode.
    ///
    /// Returns the operand, and whether resolving it crossed a page boundary.
    /// For relative addressing the operand is the branch target, and the page cross is between
    /// the target and the instruction after the branch.
    /// Only reads the instruction bytes and pointers, never the operand itself, so resolving
    /// has no side effects on memory mapped registers.
    pub fn resolve_operand(&self, mode: AddressingMode) -> Result<(Operand, bool)> {
        let pc = self.cpu.p_c;
        let b1 = self.bus.read(pc.wrapping_add(1) as usize)?;
        let word = || -> Result<u16> {
            Ok(b1 as u16 | ((self.bus.read(pc.wrapping_add(2) as usize)? as u16) << 8))
        };
        let index = |i: Index| match i {
            Index::X => self.cpu.x,
            Index::Y => self.cpu.y,
        };
        Ok(match mode {
            AddressingMode::Implied => (Operand::None, false),
            AddressingMode::Accumulator => (Operand::Accumulator, false),
            AddressingMode::Immediate => (Operand::Immediate(b1), false),
            AddressingMode::ZeroPage => (Operand::Address(b1 as usize), false),
            // Zero page indexing never leaves the zero page
            AddressingMode::ZeroPageIndexed(i) => {
                (Operand::Address(b1.wrapping_add(index(i)) as usize), false)
            }
            AddressingMode::Absolute => (Operand::Address(word()? as usize), false),
            AddressingMode::AbsoluteIndexed(i) => {
                let base = word()?;
                let addr = base.wrapping_add(index(i) as u16);
                (Operand::Address(addr as usize), page_crossed(base, addr))
            }
            AddressingMode::Indirect => {
                let ptr = word()?;
                // The high byte is fetched without carrying into the pointer's high byte
                let hi_ptr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let addr = self.bus.read(ptr as usize)? as u16
                    | ((self.bus.read(hi_ptr as usize)? as u16) << 8);
                (Operand::Address(addr as usize), false)
            }
            AddressingMode::IndexedIndirect => {
                let zp = b1.wrapping_add(self.cpu.x);
                (Operand::Address(self.read_zp_pointer(zp)? as usize), false)
            }
            AddressingMode::IndirectIndexed => {
                let base = self.read_zp_pointer(b1)?;
                let addr = base.wrapping_add(self.cpu.y as u16);
                (Operand::Address(addr as usize), page_crossed(base, addr))
            }
            AddressingMode::Relative => {
                let next = pc.wrapping_add(2);
                let target = next.wrapping_add_signed(b1 as i8 as i16);
                (Operand::Address(target as usize), page_crossed(next, target))
            }
        })
    }
    // Read a little endian pointer from the zero page, wrapping from 0xFF to 0x00
    fn read_zp_pointer(&self, addr: u8) -> Result<u16> {
        Ok(self.bus.read(addr as usize)? as u16
            | ((self.bus.read(addr.wrapping_add(1) as usize)? as u16) << 8))
    }
}
