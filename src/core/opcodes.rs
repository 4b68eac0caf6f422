//! The CPU's opcode table.
//!
//! Every one of the 256 possible opcode bytes maps to either an [Opcode] descriptor or nothing,
//! in which case the byte is an illegal opcode.
//! The descriptor only says *what* to do, the actual work is done by one executor per [Mnemonic]
//! in [Nes][crate::core::Nes], and the operand is resolved by one routine per [AddressingMode].
use std::fmt::Display;

/// The instruction an opcode performs, independent of its addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

impl Mnemonic {
    /// Whether crossing a page while indexing costs an extra cycle.
    ///
    /// Only instructions that just read their operand pay it, stores and read-modify-write
    /// instructions always take the longer path and have it baked into their base cost.
    pub fn has_page_cross_penalty(&self) -> bool {
        use Mnemonic::*;
        matches!(self, Adc | And | Cmp | Eor | Lda | Ldx | Ldy | Ora | Sbc)
    }
}

impl Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_uppercase())
    }
}

/// The index register used by an indexed addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    X,
    Y,
}

/// How an instruction finds its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand
    Implied,
    /// Operates on A
    Accumulator,
    /// The byte after the opcode
    Immediate,
    /// An address in the zero page
    ZeroPage,
    /// An address in the zero page plus X or Y, wrapping within the zero page
    ZeroPageIndexed(Index),
    /// A full 16 bit address
    Absolute,
    /// A full 16 bit address plus X or Y
    AbsoluteIndexed(Index),
    /// A pointer to the address, only used by JMP
    Indirect,
    /// `($nn,X)`, a zero page pointer offset by X
    IndexedIndirect,
    /// `($nn),Y`, a zero page pointer whose target is offset by Y
    IndirectIndexed,
    /// A signed offset from the next instruction, only used by branches
    Relative,
}

impl AddressingMode {
    /// The total length of an instruction using this mode, including the opcode.
    pub const fn bytes(&self) -> u16 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteIndexed(_)
            | AddressingMode::Indirect => 3,
            _ => 2,
        }
    }
}

/// Describes a single opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Length of the instruction in bytes
    pub bytes: u16,
    /// Base cycle cost, before page crossing and branch penalties
    pub cycles: u32,
}

const fn op(mnemonic: Mnemonic, mode: AddressingMode, cycles: u32) -> Option<Opcode> {
    Some(Opcode {
        mnemonic,
        mode,
        bytes: mode.bytes(),
        cycles,
    })
}

/// The opcode table, indexed by opcode byte.
pub const OPCODES: [Option<Opcode>; 0x100] = build_table();

const fn build_table() -> [Option<Opcode>; 0x100] {
    use AddressingMode::*;
    use Index::*;
    use Mnemonic::*;
    let mut t: [Option<Opcode>; 0x100] = [None; 0x100];
    // Loads and stores
    t[0xA9] = op(Lda, Immediate, 2);
    t[0xA5] = op(Lda, ZeroPage, 3);
    t[0xB5] = op(Lda, ZeroPageIndexed(X), 4);
    t[0xAD] = op(Lda, Absolute, 4);
    t[0xBD] = op(Lda, AbsoluteIndexed(X), 4);
    t[0xB9] = op(Lda, AbsoluteIndexed(Y), 4);
    t[0xA1] = op(Lda, IndexedIndirect, 6);
    t[0xB1] = op(Lda, IndirectIndexed, 5);
    t[0xA2] = op(Ldx, Immediate, 2);
    t[0xA6] = op(Ldx, ZeroPage, 3);
    t[0xB6] = op(Ldx, ZeroPageIndexed(Y), 4);
    t[0xAE] = op(Ldx, Absolute, 4);
    t[0xBE] = op(Ldx, AbsoluteIndexed(Y), 4);
    t[0xA0] = op(Ldy, Immediate, 2);
    t[0xA4] = op(Ldy, ZeroPage, 3);
    t[0xB4] = op(Ldy, ZeroPageIndexed(X), 4);
    t[0xAC] = op(Ldy, Absolute, 4);
    t[0xBC] = op(Ldy, AbsoluteIndexed(X), 4);
    t[0x85] = op(Sta, ZeroPage, 3);
    t[0x95] = op(Sta, ZeroPageIndexed(X), 4);
    t[0x8D] = op(Sta, Absolute, 4);
    t[0x9D] = op(Sta, AbsoluteIndexed(X), 5);
    t[0x99] = op(Sta, AbsoluteIndexed(Y), 5);
    t[0x81] = op(Sta, IndexedIndirect, 6);
    t[0x91] = op(Sta, IndirectIndexed, 6);
    t[0x86] = op(Stx, ZeroPage, 3);
    t[0x96] = op(Stx, ZeroPageIndexed(Y), 4);
    t[0x8E] = op(Stx, Absolute, 4);
    t[0x84] = op(Sty, ZeroPage, 3);
    t[0x94] = op(Sty, ZeroPageIndexed(X), 4);
    t[0x8C] = op(Sty, Absolute, 4);
    // Arithmetic and logic
    t[0x69] = op(Adc, Immediate, 2);
    t[0x65] = op(Adc, ZeroPage, 3);
    t[0x75] = op(Adc, ZeroPageIndexed(X), 4);
    t[0x6D] = op(Adc, Absolute, 4);
    t[0x7D] = op(Adc, AbsoluteIndexed(X), 4);
    t[0x79] = op(Adc, AbsoluteIndexed(Y), 4);
    t[0x61] = op(Adc, IndexedIndirect, 6);
    t[0x71] = op(Adc, IndirectIndexed, 5);
    t[0xE9] = op(Sbc, Immediate, 2);
    t[0xE5] = op(Sbc, ZeroPage, 3);
    t[0xF5] = op(Sbc, ZeroPageIndexed(X), 4);
    t[0xED] = op(Sbc, Absolute, 4);
    t[0xFD] = op(Sbc, AbsoluteIndexed(X), 4);
    t[0xF9] = op(Sbc, AbsoluteIndexed(Y), 4);
    t[0xE1] = op(Sbc, IndexedIndirect, 6);
    t[0xF1] = op(Sbc, IndirectIndexed, 5);
    t[0x29] = op(And, Immediate, 2);
    t[0x25] = op(And, ZeroPage, 3);
    t[0x35] = op(And, ZeroPageIndexed(X), 4);
    t[0x2D] = op(And, Absolute, 4);
    t[0x3D] = op(And, AbsoluteIndexed(X), 4);
    t[0x39] = op(And, AbsoluteIndexed(Y), 4);
    t[0x21] = op(And, IndexedIndirect, 6);
    t[0x31] = op(And, IndirectIndexed, 5);
    t[0x09] = op(Ora, Immediate, 2);
    t[0x05] = op(Ora, ZeroPage, 3);
    t[0x15] = op(Ora, ZeroPageIndexed(X), 4);
    t[0x0D] = op(Ora, Absolute, 4);
    t[0x1D] = op(Ora, AbsoluteIndexed(X), 4);
    t[0x19] = op(Ora, AbsoluteIndexed(Y), 4);
    t[0x01] = op(Ora, IndexedIndirect, 6);
    t[0x11] = op(Ora, IndirectIndexed, 5);
    t[0x49] = op(Eor, Immediate, 2);
    t[0x45] = op(Eor, ZeroPage, 3);
    t[0x55] = op(Eor, ZeroPageIndexed(X), 4);
    t[0x4D] = op(Eor, Absolute, 4);
    t[0x5D] = op(Eor, AbsoluteIndexed(X), 4);
    t[0x59] = op(Eor, AbsoluteIndexed(Y), 4);
    t[0x41] = op(Eor, IndexedIndirect, 6);
    t[0x51] = op(Eor, IndirectIndexed, 5);
    t[0x24] = op(Bit, ZeroPage, 3);
    t[0x2C] = op(Bit, Absolute, 4);
    // Compares
    t[0xC9] = op(Cmp, Immediate, 2);
    t[0xC5] = op(Cmp, ZeroPage, 3);
    t[0xD5] = op(Cmp, ZeroPageIndexed(X), 4);
    t[0xCD] = op(Cmp, Absolute, 4);
    t[0xDD] = op(Cmp, AbsoluteIndexed(X), 4);
    t[0xD9] = op(Cmp, AbsoluteIndexed(Y), 4);
    t[0xC1] = op(Cmp, IndexedIndirect, 6);
    t[0xD1] = op(Cmp, IndirectIndexed, 5);
    t[0xE0] = op(Cpx, Immediate, 2);
    t[0xE4] = op(Cpx, ZeroPage, 3);
    t[0xEC] = op(Cpx, Absolute, 4);
    t[0xC0] = op(Cpy, Immediate, 2);
    t[0xC4] = op(Cpy, ZeroPage, 3);
    t[0xCC] = op(Cpy, Absolute, 4);
    // Read-modify-write
    t[0x0A] = op(Asl, Accumulator, 2);
    t[0x06] = op(Asl, ZeroPage, 5);
    t[0x16] = op(Asl, ZeroPageIndexed(X), 6);
    t[0x0E] = op(Asl, Absolute, 6);
    t[0x1E] = op(Asl, AbsoluteIndexed(X), 7);
    t[0x4A] = op(Lsr, Accumulator, 2);
    t[0x46] = op(Lsr, ZeroPage, 5);
    t[0x56] = op(Lsr, ZeroPageIndexed(X), 6);
    t[0x4E] = op(Lsr, Absolute, 6);
    t[0x5E] = op(Lsr, AbsoluteIndexed(X), 7);
    t[0x2A] = op(Rol, Accumulator, 2);
    t[0x26] = op(Rol, ZeroPage, 5);
    t[0x36] = op(Rol, ZeroPageIndexed(X), 6);
    t[0x2E] = op(Rol, Absolute, 6);
    t[0x3E] = op(Rol, AbsoluteIndexed(X), 7);
    t[0x6A] = op(Ror, Accumulator, 2);
    t[0x66] = op(Ror, ZeroPage, 5);
    t[0x76] = op(Ror, ZeroPageIndexed(X), 6);
    t[0x6E] = op(Ror, Absolute, 6);
    t[0x7E] = op(Ror, AbsoluteIndexed(X), 7);
    t[0xE6] = op(Inc, ZeroPage, 5);
    t[0xF6] = op(Inc, ZeroPageIndexed(X), 6);
    t[0xEE] = op(Inc, Absolute, 6);
    t[0xFE] = op(Inc, AbsoluteIndexed(X), 7);
    t[0xC6] = op(Dec, ZeroPage, 5);
    t[0xD6] = op(Dec, ZeroPageIndexed(X), 6);
    t[0xCE] = op(Dec, Absolute, 6);
    t[0xDE] = op(Dec, AbsoluteIndexed(X), 7);
    // Register increments, decrements and transfers
    t[0xE8] = op(Inx, Implied, 2);
    t[0xC8] = op(Iny, Implied, 2);
    t[0xCA] = op(Dex, Implied, 2);
    t[0x88] = op(Dey, Implied, 2);
    t[0xAA] = op(Tax, Implied, 2);
    t[0xA8] = op(Tay, Implied, 2);
    t[0xBA] = op(Tsx, Implied, 2);
    t[0x8A] = op(Txa, Implied, 2);
    t[0x9A] = op(Txs, Implied, 2);
    t[0x98] = op(Tya, Implied, 2);
    // Branches
    t[0x90] = op(Bcc, Relative, 2);
    t[0xB0] = op(Bcs, Relative, 2);
    t[0xF0] = op(Beq, Relative, 2);
    t[0x30] = op(Bmi, Relative, 2);
    t[0xD0] = op(Bne, Relative, 2);
    t[0x10] = op(Bpl, Relative, 2);
    t[0x50] = op(Bvc, Relative, 2);
    t[0x70] = op(Bvs, Relative, 2);
    // Jumps, subroutines and interrupts
    t[0x4C] = op(Jmp, Absolute, 3);
    t[0x6C] = op(Jmp, Indirect, 5);
    t[0x20] = op(Jsr, Absolute, 6);
    t[0x60] = op(Rts, Implied, 6);
    t[0x40] = op(Rti, Implied, 6);
    t[0x00] = op(Brk, Implied, 7);
    // Stack
    t[0x48] = op(Pha, Implied, 3);
    t[0x08] = op(Php, Implied, 3);
    t[0x68] = op(Pla, Implied, 4);
    t[0x28] = op(Plp, Implied, 4);
    // Flags
    t[0x18] = op(Clc, Implied, 2);
    t[0x38] = op(Sec, Implied, 2);
    t[0x58] = op(Cli, Implied, 2);
    t[0x78] = op(Sei, Implied, 2);
    t[0xB8] = op(Clv, Implied, 2);
    t[0xD8] = op(Cld, Implied, 2);
    t[0xF8] = op(Sed, Implied, 2);
    t[0xEA] = op(Nop, Implied, 2);
    t
}

/// Look up the descriptor for an opcode byte.
///
/// ```
/// use tinynes::core::opcodes::{decode, Mnemonic, AddressingMode};
/// let lda = decode(0xA9).unwrap();
/// assert_eq!(lda.mnemonic, Mnemonic::Lda);
/// assert_eq!(lda.mode, AddressingMode::Immediate);
/// assert_eq!(lda.bytes, 2);
/// assert!(decode(0x02).is_none());
/// ```
pub fn decode(opcode: u8) -> Option<Opcode> {
    OPCODES[opcode as usize]
}

fn combine_le_bytes(bytes: &[u8]) -> u16 {
    bytes[0] as u16 + ((bytes[1] as u16) << 8)
}

/// Format an instruction in assembly form, i.e. `LDA $1234,X`.
///
/// Used for debugging and logging.
/// `operands` must contain at least as many bytes as the instruction uses,
/// and illegal opcodes are formatted as a raw `.db` byte.
/// Relative branches are shown as their raw offset.
pub fn format_opcode(opcode: u8, operands: &[u8]) -> String {
    use AddressingMode::*;
    let Some(op) = decode(opcode) else {
        return format!(".db ${:02X}", opcode);
    };
    let m = op.mnemonic;
    match op.mode {
        Implied => format!("{}", m),
        Accumulator => format!("{} A", m),
        Immediate => format!("{} #${:02X}", m, operands[0]),
        ZeroPage => format!("{} ${:02X}", m, operands[0]),
        ZeroPageIndexed(i) => format!("{} ${:02X},{:?}", m, operands[0], i),
        Absolute => format!("{} ${:04X}", m, combine_le_bytes(operands)),
        AbsoluteIndexed(i) => format!("{} ${:04X},{:?}", m, combine_le_bytes(operands), i),
        Indirect => format!("{} (${:04X})", m, combine_le_bytes(operands)),
        IndexedIndirect => format!("{} (${:02X},X)", m, operands[0]),
        IndirectIndexed => format!("{} (${:02X}),Y", m, operands[0]),
        Relative => format!("{} {:+}", m, operands[0] as i8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_official_opcode_count() {
        assert_eq!(OPCODES.iter().filter(|o| o.is_some()).count(), 151);
    }
    #[test]
    fn test_byte_lengths_follow_mode() {
        OPCODES.iter().flatten().for_each(|o| {
            assert_eq!(o.bytes, o.mode.bytes(), "{:?}", o);
        });
    }
    #[test_case(0x02)]
    #[test_case(0x80)]
    #[test_case(0xFF)]
    #[test_case(0xEB)]
    fn test_unofficial_opcodes_are_illegal(opcode: u8) {
        assert!(decode(opcode).is_none());
    }
    #[test]
    fn test_every_mnemonic_has_an_opcode() {
        let count = OPCODES
            .iter()
            .flatten()
            .map(|o| o.mnemonic)
            .collect::<std::collections::HashSet<Mnemonic>>()
            .len();
        assert_eq!(count, 56);
    }
    #[test]
    fn test_format_opcode() {
        insta::assert_snapshot!(format_opcode(0xA9, &[0x18]), @"LDA #$18");
        insta::assert_snapshot!(format_opcode(0xBD, &[0x34, 0x12]), @"LDA $1234,X");
        insta::assert_snapshot!(format_opcode(0xB1, &[0x80]), @"LDA ($80),Y");
        insta::assert_snapshot!(format_opcode(0x6C, &[0xFF, 0x02]), @"JMP ($02FF)");
        insta::assert_snapshot!(format_opcode(0xD0, &[0xFE]), @"BNE -2");
        insta::assert_snapshot!(format_opcode(0x0A, &[]), @"ASL A");
        insta::assert_snapshot!(format_opcode(0x02, &[]), @".db $02");
    }
}
