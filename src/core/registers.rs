//! Addresses of the memory mapped registers in CPU space.
//!
//! PPU registers are listed at their canonical location, they are mirrored every 8 bytes up to `0x4000`.
//! Each APU channel is addressed by its first and last register, the channels themselves take
//! the offset into that range.

/// PPUCTRL, write only
pub const PPUCTRL: usize = 0x2000;
/// PPUMASK, write only
pub const PPUMASK: usize = 0x2001;
/// PPUSTATUS, read only
pub const PPUSTATUS: usize = 0x2002;
/// OAMADDR, write only
pub const OAMADDR: usize = 0x2003;
/// OAMDATA, read/write
pub const OAMDATA: usize = 0x2004;
/// PPUSCROLL, write twice
pub const PPUSCROLL: usize = 0x2005;
/// PPUADDR, write twice
pub const PPUADDR: usize = 0x2006;
/// PPUDATA, read/write
pub const PPUDATA: usize = 0x2007;

/// Pulse 1 duty, loop and volume
pub const SQ1_VOL: usize = 0x4000;
/// Pulse 1 period high bits and length counter load
pub const SQ1_HI: usize = 0x4003;
/// Pulse 2 duty, loop and volume
pub const SQ2_VOL: usize = 0x4004;
/// Pulse 2 length counter load
pub const SQ2_HI: usize = 0x4007;
/// Triangle linear counter
pub const TRI_LINEAR: usize = 0x4008;
/// Triangle period high bits and length counter load
pub const TRI_HI: usize = 0x400B;
/// Noise loop and volume
pub const NOISE_VOL: usize = 0x400C;
/// Noise length counter load
pub const NOISE_HI: usize = 0x400F;
/// DMC IRQ, loop and rate
pub const DMC_FREQ: usize = 0x4010;
/// DMC sample length
pub const DMC_LEN: usize = 0x4013;
/// OAM DMA trigger, write only
pub const OAMDMA: usize = 0x4014;
/// Channel enable (write) and channel status (read)
pub const SND_CHN: usize = 0x4015;
/// Controller strobe (write) and controller 1 data (read)
pub const JOY1: usize = 0x4016;
/// Controller 2 data (read)
pub const JOY2: usize = 0x4017;
/// Frame sequencer mode (write)
pub const FRAME_COUNTER: usize = 0x4017;

/// PPU registers that are ignored until the console has warmed up.
pub const POWER_UP_GATED: [usize; 4] = [PPUCTRL, PPUMASK, PPUSCROLL, PPUADDR];
