use std::fmt::Debug;

use crate::core::StatusRegister;

/// Base address of the stack page
pub const STACK_PAGE: usize = 0x100;

/// The CPU of the NES.
///
/// Contains all registers and is responsible for changing the flags when the values are set/unset.
/// Anything that touches memory (addressing, the stack, interrupts) is done by [Nes][crate::core::Nes],
/// which owns both the CPU and the bus.
#[derive(Clone, PartialEq, Eq)]
pub struct Cpu {
    /// Accumulator
    pub a: u8,
    /// X index register
    pub x: u8,
    /// Y index register
    pub y: u8,
    /// Program counter
    pub p_c: u16,
    /// Stack pointer, as an offset into the stack page
    pub s_p: u8,
    /// Status register
    pub s_r: StatusRegister,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            p_c: 0,
            s_p: 0,
            s_r: StatusRegister::new(),
        }
    }
    /// The address the stack pointer currently points to.
    ///
    /// Always inside `0x100..=0x1FF`.
    pub fn stack_addr(&self) -> usize {
        STACK_PAGE + self.s_p as usize
    }
    /// Load some value into A.
    /// Sets the status register accordingly.
    ///
    /// ```
    /// let mut cpu = tinynes::core::Cpu::new();
    /// cpu.lda(0x18);
    /// assert_eq!(cpu.a, 0x18);
    /// ```
    pub fn lda(&mut self, value: u8) {
        self.a = value;
        self.set_zn(self.a);
    }
    /// Load some value into X.
    /// Sets the status register accordingly.
    ///
    /// ```
    /// let mut cpu = tinynes::core::Cpu::new();
    /// cpu.ldx(0x18);
    /// assert_eq!(cpu.x, 0x18);
    /// ```
    pub fn ldx(&mut self, value: u8) {
        self.x = value;
        self.set_zn(self.x);
    }
    /// Load some value into Y.
    /// Sets the status register accordingly.
    pub fn ldy(&mut self, value: u8) {
        self.y = value;
        self.set_zn(self.y);
    }
    /// Add some value with A and the carry bit in the status register.
    /// * Zero is set if A = 0 after the operation
    /// * Carry is set if the unsigned result doesn't fit in a byte
    /// * Overflow is set if signed overflow occurs
    /// * Negative flag is set if the seventh bit is set
    pub fn adc(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + self.s_r.c as u16;
        let result = sum as u8;
        self.s_r.c = sum > 0xFF;
        // If A and value are the same sign but the result is a different sign, overflow has occured
        self.s_r.v = (!(self.a ^ value) & (self.a ^ result) & 0x80) != 0;
        self.a = result;
        self.set_zn(self.a);
    }
    /// Subtract some value and the inverse of the carry bit from A.
    ///
    /// Identical to adding the one's complement of the value.
    pub fn sbc(&mut self, value: u8) {
        self.adc(!value);
    }
    /// Perform an AND (`&`) operation between A and some value.
    /// ```
    /// let mut cpu = tinynes::core::Cpu::new();
    /// cpu.a = 0xAA;
    /// cpu.and(0x0F);
    /// assert_eq!(cpu.a, 0x0A);
    /// ```
    pub fn and(&mut self, value: u8) {
        self.a &= value;
        self.set_zn(self.a);
    }
    /// Perform an OR (`|`) operation between A and some value.
    pub fn ora(&mut self, value: u8) {
        self.a |= value;
        self.set_zn(self.a);
    }
    /// Perform an exclusive OR (`^`) operation between A and some value.
    pub fn eor(&mut self, value: u8) {
        self.a ^= value;
        self.set_zn(self.a);
    }
    /// Compare a register with some value, used by CMP, CPX and CPY.
    pub fn compare(&mut self, register: u8, value: u8) {
        self.s_r.c = register >= value;
        self.set_zn(register.wrapping_sub(value));
    }
    /// Test bits in A against some value.
    /// * Zero is set if `A & value` is 0
    /// * Overflow and negative are copied from bits 6 and 7 of the value
    pub fn bit(&mut self, value: u8) {
        self.s_r.z = (self.a & value) == 0;
        self.s_r.v = (value & 0x40) != 0;
        self.s_r.n = (value & 0x80) != 0;
    }
    /// Shift left, returning the result.
    pub fn asl(&mut self, value: u8) -> u8 {
        self.s_r.c = (value & 0x80) != 0;
        let result = value << 1;
        self.set_zn(result);
        result
    }
    /// Logical shift right, returning the result.
    pub fn lsr(&mut self, value: u8) -> u8 {
        self.s_r.c = (value & 0x01) != 0;
        let result = value >> 1;
        self.set_zn(result);
        result
    }
    /// Rotate left through the carry flag, returning the result.
    pub fn rol(&mut self, value: u8) -> u8 {
        let result = (value << 1) | self.s_r.c as u8;
        self.s_r.c = (value & 0x80) != 0;
        self.set_zn(result);
        result
    }
    /// Rotate right through the carry flag, returning the result.
    pub fn ror(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | ((self.s_r.c as u8) << 7);
        self.s_r.c = (value & 0x01) != 0;
        self.set_zn(result);
        result
    }
    /// Increment some value, returning the result.
    pub fn inc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_zn(result);
        result
    }
    /// Decrement some value, returning the result.
    pub fn dec(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_zn(result);
        result
    }
    /// Set the zero and negative flags from a value that was just produced.
    pub fn set_zn(&mut self, value: u8) {
        self.s_r.z = value == 0;
        self.s_r.n = (value & 0x80) != 0;
    }
}

impl Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PC={:04X} A={:02X} X={:02X} Y={:02X} SP={:02X} SR={:?}",
            self.p_c, self.a, self.x, self.y, self.s_p, self.s_r
        )
    }
}
