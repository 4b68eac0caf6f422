use std::fmt::Debug;

/// Bit set in the status byte pushed by `BRK` and `PHP`.
pub const BREAK_BIT: u8 = 0x10;
/// Bit that always reads as set.
pub const UNUSED_BIT: u8 = 0x20;

/// The status register of the CPU.
///
/// Every flag is tracked on its own and only packed into a byte when it is pushed to the stack.
#[derive(Clone, PartialEq, Eq)]
pub struct StatusRegister {
    /// The carry flag, also known as the unsigned overflow flag
    pub c: bool,
    /// The zero flag
    pub z: bool,
    /// The interrupt disable flag
    pub i: bool,
    /// The decimal mode flag, stored but ignored by the console's arithmetic
    pub d: bool,
    /// The break command flag
    pub b: bool,
    /// The (signed) overflow flag
    pub v: bool,
    /// The negative flag
    pub n: bool,
}

impl Default for StatusRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusRegister {
    /// Create a new StatusRegister, with only the interrupt disable flag set.
    pub fn new() -> StatusRegister {
        StatusRegister {
            c: false,
            z: false,
            i: true,
            d: false,
            b: false,
            v: false,
            n: false,
        }
    }
    /// Get the status register as a single byte.
    ///
    /// The unused bit always reads as 1 and the break bit always reads as 0,
    /// [BREAK_BIT] is or'd in by the instructions that push it.
    /// ```
    /// let mut s = tinynes::core::StatusRegister::new();
    /// s.z = true;
    /// s.d = true;
    /// s.i = false;
    /// assert_eq!(s.to_byte(), 0b00101010);
    /// s.n = true;
    /// s.v = true;
    /// s.b = true;
    /// assert_eq!(s.to_byte(), 0b11101010);
    /// ```
    pub fn to_byte(&self) -> u8 {
        macro_rules! bit_flag {
            ($flag: ident, $bit: literal) => {
                if self.$flag {
                    0x01 << $bit
                } else {
                    0x00
                }
            };
        }
        UNUSED_BIT
            | bit_flag!(c, 0)
            | bit_flag!(z, 1)
            | bit_flag!(i, 2)
            | bit_flag!(d, 3)
            | bit_flag!(v, 6)
            | bit_flag!(n, 7)
    }
    /// Set the status register from a given byte that contains one bit per flag.
    ///
    /// The break and unused bits are ignored.
    /// ```
    /// let mut s = tinynes::core::StatusRegister::new();
    /// s.from_byte(0b11001010);
    /// assert_eq!(s.n, true);
    /// assert_eq!(s.v, true);
    /// assert_eq!(s.d, true);
    /// assert_eq!(s.z, true);
    /// assert_eq!(s.c, false);
    /// ```
    pub fn from_byte(&mut self, byte: u8) {
        self.c = (byte & 0x01) != 0;
        self.z = (byte & 0x02) != 0;
        self.i = (byte & 0x04) != 0;
        self.d = (byte & 0x08) != 0;
        self.v = (byte & 0x40) != 0;
        self.n = (byte & 0x80) != 0;
    }
}

impl Debug for StatusRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        macro_rules! format_flag {
            ($flag: ident, $name: literal) => {
                if self.$flag {
                    format!(" {}", $name)
                } else {
                    format!("!{}", $name)
                }
            };
        }
        write!(
            f,
            "[{} {} {} {} {} {}]",
            format_flag!(c, "C"),
            format_flag!(z, "Z"),
            format_flag!(i, "I"),
            format_flag!(d, "D"),
            format_flag!(v, "V"),
            format_flag!(n, "N")
        )
    }
}
