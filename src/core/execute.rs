use crate::core::{
    addressing::Operand,
    opcodes::{Mnemonic, Opcode},
    status_register::BREAK_BIT,
    Nes, Result, IRQ_VECTOR,
};

impl Nes {
    /// Execute a decoded instruction with an already resolved operand.
    ///
    /// Does not advance the PC.
    /// Returns the new PC if the instruction jumped, and the number of cycles spent on top of
    /// the opcode's base cycles (taken branches).
    pub fn execute(
        &mut self,
        opcode: &Opcode,
        operand: Operand,
        crossed: bool,
    ) -> Result<(Option<u16>, u32)> {
        use Mnemonic::*;
        // Shorthand for read-modify-write instructions
        macro_rules! modify {
            ($op: ident) => {{
                let v = self.load(operand)?;
                let r = self.cpu.$op(v);
                self.store(operand, r)?;
            }};
        }
        macro_rules! branch {
            ($cond: expr) => {
                if $cond {
                    return Ok((Some(target(operand)), if crossed { 2 } else { 1 }));
                }
            };
        }
        let pc = self.cpu.p_c;
        match opcode.mnemonic {
            Adc => {
                let v = self.load(operand)?;
                self.cpu.adc(v);
            }
            Sbc => {
                let v = self.load(operand)?;
                self.cpu.sbc(v);
            }
            And => {
                let v = self.load(operand)?;
                self.cpu.and(v);
            }
            Ora => {
                let v = self.load(operand)?;
                self.cpu.ora(v);
            }
            Eor => {
                let v = self.load(operand)?;
                self.cpu.eor(v);
            }
            Bit => {
                let v = self.load(operand)?;
                self.cpu.bit(v);
            }
            Cmp => {
                let v = self.load(operand)?;
                self.cpu.compare(self.cpu.a, v);
            }
            Cpx => {
                let v = self.load(operand)?;
                self.cpu.compare(self.cpu.x, v);
            }
            Cpy => {
                let v = self.load(operand)?;
                self.cpu.compare(self.cpu.y, v);
            }
            Lda => {
                let v = self.load(operand)?;
                self.cpu.lda(v);
            }
            Ldx => {
                let v = self.load(operand)?;
                self.cpu.ldx(v);
            }
            Ldy => {
                let v = self.load(operand)?;
                self.cpu.ldy(v);
            }
            Sta => self.store(operand, self.cpu.a)?,
            Stx => self.store(operand, self.cpu.x)?,
            Sty => self.store(operand, self.cpu.y)?,
            Asl => modify!(asl),
            Lsr => modify!(lsr),
            Rol => modify!(rol),
            Ror => modify!(ror),
            Inc => modify!(inc),
            Dec => modify!(dec),
            Inx => self.cpu.x = self.cpu.inc(self.cpu.x),
            Iny => self.cpu.y = self.cpu.inc(self.cpu.y),
            Dex => self.cpu.x = self.cpu.dec(self.cpu.x),
            Dey => self.cpu.y = self.cpu.dec(self.cpu.y),
            Tax => self.cpu.ldx(self.cpu.a),
            Tay => self.cpu.ldy(self.cpu.a),
            Tsx => self.cpu.ldx(self.cpu.s_p),
            Txa => self.cpu.lda(self.cpu.x),
            Tya => self.cpu.lda(self.cpu.y),
            // The only transfer that leaves the flags alone
            Txs => self.cpu.s_p = self.cpu.x,
            Bcc => branch!(!self.cpu.s_r.c),
            Bcs => branch!(self.cpu.s_r.c),
            Bne => branch!(!self.cpu.s_r.z),
            Beq => branch!(self.cpu.s_r.z),
            Bpl => branch!(!self.cpu.s_r.n),
            Bmi => branch!(self.cpu.s_r.n),
            Bvc => branch!(!self.cpu.s_r.v),
            Bvs => branch!(self.cpu.s_r.v),
            Jmp => return Ok((Some(target(operand)), 0)),
            Jsr => {
                // Pushes the address of the last byte of the JSR
                self.push_u16(pc.wrapping_add(2))?;
                return Ok((Some(target(operand)), 0));
            }
            Rts => {
                let addr = self.pull_u16()?;
                return Ok((Some(addr.wrapping_add(1)), 0));
            }
            Rti => {
                let s = self.pull()?;
                self.cpu.s_r.from_byte(s);
                let addr = self.pull_u16()?;
                return Ok((Some(addr), 0));
            }
            Brk => {
                self.push_u16(pc.wrapping_add(2))?;
                self.push(self.cpu.s_r.to_byte() | BREAK_BIT)?;
                self.cpu.s_r.b = true;
                self.cpu.s_r.i = true;
                return Ok((Some(self.read_vector(IRQ_VECTOR)?), 0));
            }
            Pha => self.push(self.cpu.a)?,
            Php => self.push(self.cpu.s_r.to_byte() | BREAK_BIT)?,
            Pla => {
                let v = self.pull()?;
                self.cpu.lda(v);
            }
            Plp => {
                let v = self.pull()?;
                self.cpu.s_r.from_byte(v);
            }
            Clc => self.cpu.s_r.c = false,
            Sec => self.cpu.s_r.c = true,
            Cli => self.cpu.s_r.i = false,
            Sei => self.cpu.s_r.i = true,
            Clv => self.cpu.s_r.v = false,
            Cld => self.cpu.s_r.d = false,
            Sed => self.cpu.s_r.d = true,
            Nop => {}
        }
        Ok((None, 0))
    }
    // Get the value of an operand, reading memory if needed
    fn load(&mut self, operand: Operand) -> Result<u8> {
        match operand {
            Operand::Accumulator => Ok(self.cpu.a),
            Operand::Immediate(v) => Ok(v),
            Operand::Address(addr) => self.read_byte(addr),
            Operand::None => Ok(0),
        }
    }
    fn store(&mut self, operand: Operand, value: u8) -> Result<()> {
        match operand {
            Operand::Accumulator => self.cpu.a = value,
            Operand::Address(addr) => self.write_byte(addr, value)?,
            Operand::Immediate(_) | Operand::None => {}
        }
        Ok(())
    }
    /// Push a byte onto the stack.
    ///
    /// The stack pointer wraps around within the stack page.
    pub fn push(&mut self, value: u8) -> Result<()> {
        self.write_byte(self.cpu.stack_addr(), value)?;
        self.cpu.s_p = self.cpu.s_p.wrapping_sub(1);
        Ok(())
    }
    /// Pull a byte off of the stack.
    pub fn pull(&mut self) -> Result<u8> {
        self.cpu.s_p = self.cpu.s_p.wrapping_add(1);
        self.bus.read(self.cpu.stack_addr())
    }
    /// Push a 16 bit value, high byte first.
    pub fn push_u16(&mut self, value: u16) -> Result<()> {
        self.push((value >> 8) as u8)?;
        self.push((value & 0xFF) as u8)
    }
    /// Pull a 16 bit value, low byte first.
    pub fn pull_u16(&mut self) -> Result<u16> {
        let lo = self.pull()? as u16;
        let hi = self.pull()? as u16;
        Ok((hi << 8) | lo)
    }
    /// Read a little endian address out of one of the vectors at the top of memory.
    pub fn read_vector(&self, addr: usize) -> Result<u16> {
        Ok(self.bus.read(addr)? as u16 | ((self.bus.read(addr + 1)? as u16) << 8))
    }
}

fn target(operand: Operand) -> u16 {
    match operand {
        Operand::Address(addr) => addr as u16,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{addressing::Operand, opcodes::decode, Nes};
    use assert_hex::assert_eq_hex;

    fn run(nes: &mut Nes, opcode: u8, operand: Operand) -> (Option<u16>, u32) {
        nes.execute(&decode(opcode).unwrap(), operand, false).unwrap()
    }

    #[test]
    fn test_push_wraps_within_stack_page() {
        let mut nes = Nes::new();
        nes.cpu.s_p = 0x00;
        nes.push(0x12).unwrap();
        nes.push(0x34).unwrap();
        assert_eq_hex!(nes.bus.read(0x100).unwrap(), 0x12);
        assert_eq_hex!(nes.bus.read(0x1FF).unwrap(), 0x34);
        assert_eq_hex!(nes.cpu.s_p, 0xFE);
        assert_eq_hex!(nes.pull().unwrap(), 0x34);
        assert_eq_hex!(nes.pull().unwrap(), 0x12);
    }
    #[test]
    fn test_php_sets_break_bit() {
        let mut nes = Nes::new();
        nes.cpu.s_p = 0xFD;
        nes.cpu.s_r.c = true;
        run(&mut nes, 0x08, Operand::None);
        assert_eq_hex!(nes.bus.read(0x1FD).unwrap(), 0x35);
    }
    #[test]
    fn test_plp_ignores_break_bit() {
        let mut nes = Nes::new();
        nes.cpu.s_p = 0xFC;
        nes.bus.write(0x1FD, &[0xFF]).unwrap();
        run(&mut nes, 0x28, Operand::None);
        assert!(!nes.cpu.s_r.b);
        assert!(nes.cpu.s_r.n && nes.cpu.s_r.c);
    }
    #[test]
    fn test_txs_leaves_flags() {
        let mut nes = Nes::new();
        nes.cpu.x = 0x00;
        nes.cpu.s_r.z = false;
        run(&mut nes, 0x9A, Operand::None);
        assert_eq_hex!(nes.cpu.s_p, 0x00);
        assert!(!nes.cpu.s_r.z);
    }
    #[test]
    fn test_read_modify_write_accumulator() {
        let mut nes = Nes::new();
        nes.cpu.a = 0x81;
        run(&mut nes, 0x0A, Operand::Accumulator);
        assert_eq_hex!(nes.cpu.a, 0x02);
        assert!(nes.cpu.s_r.c);
    }
    #[test]
    fn test_read_modify_write_memory() {
        let mut nes = Nes::new();
        nes.bus.write(0x10, &[0xFF]).unwrap();
        run(&mut nes, 0xE6, Operand::Address(0x10));
        assert_eq_hex!(nes.bus.read(0x10).unwrap(), 0x00);
        assert!(nes.cpu.s_r.z);
    }
    #[test]
    fn test_branch_cycles() {
        let mut nes = Nes::new();
        nes.cpu.s_r.z = true;
        let op = decode(0xF0).unwrap();
        assert_eq!(
            nes.execute(&op, Operand::Address(0x1234), false).unwrap(),
            (Some(0x1234), 1)
        );
        assert_eq!(
            nes.execute(&op, Operand::Address(0x1234), true).unwrap(),
            (Some(0x1234), 2)
        );
        nes.cpu.s_r.z = false;
        assert_eq!(
            nes.execute(&op, Operand::Address(0x1234), true).unwrap(),
            (None, 0)
        );
    }
    #[test]
    fn test_jsr_rts() {
        let mut nes = Nes::new();
        nes.cpu.s_p = 0xFD;
        nes.cpu.p_c = 0x8010;
        assert_eq!(run(&mut nes, 0x20, Operand::Address(0x9000)).0, Some(0x9000));
        assert_eq_hex!(nes.bus.read(0x1FD).unwrap(), 0x80);
        assert_eq_hex!(nes.bus.read(0x1FC).unwrap(), 0x12);
        assert_eq!(run(&mut nes, 0x60, Operand::None).0, Some(0x8013));
        assert_eq_hex!(nes.cpu.s_p, 0xFD);
    }
}
