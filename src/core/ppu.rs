use log::*;

use crate::core::{
    registers::{OAMADDR, OAMDATA, PPUADDR, PPUCTRL, PPUDATA, PPUMASK, PPUSCROLL, PPUSTATUS},
    Mirroring,
};

/// Number of dots per scanline
pub const DOTS_PER_SCANLINE: u32 = 341;
/// Number of scanlines per frame
pub const SCANLINES_PER_FRAME: u32 = 262;
/// Number of PPU dots per CPU cycle
pub const DOTS_PER_CPU_CYCLE: u32 = 3;
/// Number of scanlines spent in VBlank after a frame completes
pub const VBLANK_SCANLINES: u32 = 20;
/// First visible scanline, counted from the start of VBlank
const FIRST_VISIBLE_SCANLINE: u32 = VBLANK_SCANLINES + 1;
/// Number of tiles across both pattern tables
pub const TILE_COUNT: usize = 512;
/// Size of a single pattern table
pub const PATTERN_TABLE_SIZE: usize = 0x1000;
/// Size of a nametable, excluding its attribute table
pub const NAMETABLE_SIZE: usize = 0x3C0;
const NAMETABLE_STRIDE: usize = 0x400;

const VBLANK_BIT: u8 = 0x80;
const SPRITE_ZERO_BIT: u8 = 0x40;

/// An 8x8 tile, each entry is the 2 bit palette index of a pixel.
pub type Tile = [[u8; 8]; 8];

/// Decode a single tile out of pattern table data.
///
/// The low plane holds bit 0 of every pixel and the high plane, 8 bytes later, holds bit 1.
/// ```
/// use tinynes::core::decode_tile;
/// let mut pattern = [0; 16];
/// pattern[0] = 0x80;
/// pattern[8] = 0x81;
/// let tile = decode_tile(&pattern, 0);
/// assert_eq!(tile[0][0], 3);
/// assert_eq!(tile[0][7], 2);
/// assert_eq!(tile[1][0], 0);
/// ```
pub fn decode_tile(pattern: &[u8], index: usize) -> Tile {
    let mut tile: Tile = [[0; 8]; 8];
    let base = index * 16;
    tile.iter_mut().enumerate().for_each(|(y, row)| {
        let lo = pattern[base + y];
        let hi = pattern[base + y + 8];
        row.iter_mut().enumerate().for_each(|(x, pixel)| {
            let shift = 7 - x;
            *pixel = ((lo >> shift) & 0x01) | (((hi >> shift) & 0x01) << 1);
        });
    });
    tile
}

/// The register interface of the picture processing unit.
///
/// Holds everything the CPU can reach through the PPU registers: the address latch, OAM,
/// VRAM and palette RAM, plus the scanline counter that produces VBlank.
/// The pattern tables are decoded into [Tile]s whenever they change.
pub struct Ppu {
    /// The PPUCTRL register
    pub ctrl: u8,
    /// The PPUMASK register
    pub mask: u8,
    /// The PPUSTATUS register
    pub status: u8,
    /// The OAMADDR register
    pub oam_addr: u8,
    /// The Object Access Memory, or OAM
    pub oam: [u8; 0x100],
    // Both pattern tables
    pattern: Vec<u8>,
    // Whether the pattern tables are RAM
    chr_ram: bool,
    // Enough room for 4 unique nametables, only used in full by four screen mirroring
    nametable_ram: Vec<u8>,
    palette_ram: [u8; 0x20],
    mirroring: Mirroring,
    // Write toggle shared by PPUSCROLL and PPUADDR, false = first write
    w: bool,
    // Current VRAM address
    v: u16,
    // Temporary VRAM address
    t: u16,
    fine_x: u8,
    // PPUDATA read buffer
    read_buffer: u8,
    // Last value written to any register
    open_bus: u8,
    scanline: u32,
    dots: u32,
    frame: u64,
    tiles: Vec<Tile>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Ppu {
        Ppu {
            ctrl: 0,
            mask: 0,
            status: 0,
            oam_addr: 0,
            oam: [0; 0x100],
            pattern: vec![0; 2 * PATTERN_TABLE_SIZE],
            chr_ram: false,
            nametable_ram: vec![0; 4 * NAMETABLE_STRIDE],
            palette_ram: [0; 0x20],
            mirroring: Mirroring::Horizontal,
            w: false,
            v: 0,
            t: 0,
            fine_x: 0,
            read_buffer: 0,
            open_bus: 0,
            scanline: 0,
            dots: 0,
            frame: 0,
            tiles: vec![[[0; 8]; 8]; TILE_COUNT],
        }
    }
    /// Write to a PPU register, given its canonical address in `0x2000..0x2008`.
    pub fn write_register(&mut self, addr: usize, value: u8) {
        self.open_bus = value;
        match addr {
            PPUCTRL => {
                self.ctrl = value;
                self.t = (self.t & !0x0C00) | (((value & 0x03) as u16) << 10);
            }
            PPUMASK => self.mask = value,
            PPUSTATUS => warn!("Ignoring write of {:#04X} to read only PPUSTATUS", value),
            OAMADDR => self.oam_addr = value,
            OAMDATA => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            PPUSCROLL => {
                if self.w {
                    // Y
                    self.t = (self.t & 0x0C1F)
                        | (((value & 0x07) as u16) << 12)
                        | (((value & 0xF8) as u16) << 2);
                } else {
                    // X
                    self.t = (self.t & 0xFFE0) | (value >> 3) as u16;
                    self.fine_x = value & 0x07;
                }
                self.w = !self.w;
            }
            PPUADDR => {
                if self.w {
                    self.t = (self.t & 0xFF00) | value as u16;
                    self.v = self.t;
                } else {
                    self.t = (self.t & 0x00FF) | (((value & 0x3F) as u16) << 8);
                }
                self.w = !self.w;
            }
            PPUDATA => self.write_data(value),
            _ => warn!("Write of {:#04X} to unknown PPU register {:#06X}", value, addr),
        }
    }
    /// Read a PPU register, given its canonical address in `0x2000..0x2008`.
    ///
    /// Write only registers return the last value written to any register.
    pub fn read_register(&mut self, addr: usize) -> u8 {
        match addr {
            PPUSTATUS => self.read_status(),
            OAMDATA => self.read_oam(),
            PPUDATA => self.read_data(),
            _ => self.open_bus,
        }
    }
    /// Read PPUSTATUS.
    ///
    /// Clears the VBlank flag and resets the address latch.
    /// ```
    /// let mut ppu = tinynes::core::Ppu::new();
    /// ppu.status = 0x80;
    /// assert_eq!(ppu.read_status() & 0x80, 0x80);
    /// assert_eq!(ppu.read_status() & 0x80, 0x00);
    /// ```
    pub fn read_status(&mut self) -> u8 {
        let status = self.status;
        self.status &= !VBLANK_BIT;
        self.w = false;
        (status & 0xE0) | (self.open_bus & 0x1F)
    }
    /// Read OAMDATA, without incrementing OAMADDR.
    pub fn read_oam(&self) -> u8 {
        self.oam[self.oam_addr as usize]
    }
    /// Read PPUDATA.
    ///
    /// Reads below the palette return the buffered value from the previous read,
    /// palette reads return immediately.
    pub fn read_data(&mut self) -> u8 {
        let addr = self.v & 0x3FFF;
        let value = if addr >= 0x3F00 {
            // The buffer is filled with the nametable byte "under" the palette
            self.read_buffer = self.read_vram(addr - 0x1000);
            self.read_vram(addr)
        } else {
            let buffered = self.read_buffer;
            self.read_buffer = self.read_vram(addr);
            buffered
        };
        self.increment_addr();
        value
    }
    fn write_data(&mut self, value: u8) {
        let addr = self.v & 0x3FFF;
        match addr {
            0..0x2000 => {
                if self.chr_ram {
                    self.pattern[addr as usize] = value;
                    let tile = addr as usize / 16;
                    self.tiles[tile] = decode_tile(&self.pattern, tile);
                } else {
                    debug!("Ignoring write of {:#04X} to CHR ROM at {:#06X}", value, addr);
                }
            }
            0x2000..0x3F00 => {
                let i = self.nametable_index(addr as usize);
                self.nametable_ram[i] = value;
            }
            _ => self.palette_ram[Ppu::palette_index(addr as usize)] = value,
        }
        self.increment_addr();
    }
    fn read_vram(&self, addr: u16) -> u8 {
        match addr {
            0..0x2000 => self.pattern[addr as usize],
            0x2000..0x3F00 => self.nametable_ram[self.nametable_index(addr as usize)],
            _ => self.palette_ram[Ppu::palette_index(addr as usize)],
        }
    }
    fn increment_addr(&mut self) {
        let step = if self.ctrl & 0x04 == 0 { 1 } else { 32 };
        self.v = self.v.wrapping_add(step) & 0x3FFF;
    }
    /// Get the index into nametable RAM of an address in `0x2000..0x3F00`, following the
    /// cartridge's mirroring.
    pub fn nametable_index(&self, addr: usize) -> usize {
        let offset = (addr - 0x2000) % (4 * NAMETABLE_STRIDE);
        let table = offset / NAMETABLE_STRIDE;
        let table = match self.mirroring {
            Mirroring::Horizontal => table / 2,
            Mirroring::Vertical => table % 2,
            Mirroring::FourScreen => table,
        };
        table * NAMETABLE_STRIDE + offset % NAMETABLE_STRIDE
    }
    // Entry 0 of each sprite palette mirrors entry 0 of the matching background palette
    fn palette_index(addr: usize) -> usize {
        let i = addr % 0x20;
        if i >= 0x10 && i % 4 == 0 {
            i - 0x10
        } else {
            i
        }
    }
    /// Copy a page of CPU memory into OAM, starting at OAMADDR.
    pub fn oam_dma(&mut self, page: &[u8]) {
        page.iter().enumerate().for_each(|(i, v)| {
            self.oam[(self.oam_addr as usize + i) % 0x100] = *v;
        });
    }
    /// Load both pattern tables.
    ///
    /// `chr_ram` makes the tables writable through PPUDATA.
    /// Data shorter than the tables leaves the rest of them zeroed.
    pub fn load_pattern_table(&mut self, data: &[u8], chr_ram: bool) {
        let len = data.len().min(self.pattern.len());
        self.pattern.fill(0);
        self.pattern[..len].copy_from_slice(&data[..len]);
        self.chr_ram = chr_ram;
    }
    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
    }
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
    /// Decode every tile in both pattern tables.
    pub fn decode_tiles(&mut self) {
        self.tiles = (0..TILE_COUNT)
            .map(|i| decode_tile(&self.pattern, i))
            .collect();
    }
    /// Get the decoded tiles, the first 256 are from pattern table 0.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
    /// Get one of the two raw pattern tables.
    pub fn pattern_table(&self, table: usize) -> &[u8] {
        let start = (table % 2) * PATTERN_TABLE_SIZE;
        &self.pattern[start..start + PATTERN_TABLE_SIZE]
    }
    /// Get the tile indices of one of the four logical nametables, after mirroring.
    pub fn nametable(&self, table: usize) -> &[u8] {
        let start = self.nametable_index(0x2000 + (table % 4) * NAMETABLE_STRIDE);
        &self.nametable_ram[start..start + NAMETABLE_SIZE]
    }
    /// Get the attribute table following one of the four logical nametables.
    pub fn attribute_table(&self, table: usize) -> &[u8] {
        let start = self.nametable_index(0x2000 + (table % 4) * NAMETABLE_STRIDE);
        &self.nametable_ram[start + NAMETABLE_SIZE..start + NAMETABLE_STRIDE]
    }
    pub fn palette(&self) -> &[u8; 0x20] {
        &self.palette_ram
    }
    /// Return [true] if the NMI is enabled
    pub fn nmi_enabled(&self) -> bool {
        self.ctrl & 0x80 != 0
    }
    /// Return [true] if the VBlank flag is set
    pub fn vblank(&self) -> bool {
        self.status & VBLANK_BIT != 0
    }
    /// Return [true] if the sprite 0 hit flag is set
    pub fn sprite_zero_hit(&self) -> bool {
        self.status & SPRITE_ZERO_BIT != 0
    }
    fn rendering_enabled(&self) -> bool {
        self.mask & 0x18 != 0
    }
    /// The scanline currently being counted, `0` is the first VBlank scanline.
    pub fn scanline(&self) -> u32 {
        self.scanline
    }
    /// Number of frames completed since power up.
    pub fn frame(&self) -> u64 {
        self.frame
    }
    /// Finish the current scanline.
    ///
    /// Returns `true` if it was the last scanline of the frame, in which case VBlank starts.
    pub fn end_scanline(&mut self) -> bool {
        // Sprite 0 hit is approximated as happening on the first line the sprite covers
        if self.rendering_enabled()
            && self.scanline >= FIRST_VISIBLE_SCANLINE
            && self.scanline - FIRST_VISIBLE_SCANLINE == self.oam[0] as u32 + 1
        {
            self.status |= SPRITE_ZERO_BIT;
        }
        self.scanline += 1;
        if self.scanline == VBLANK_SCANLINES {
            self.status &= !(VBLANK_BIT | SPRITE_ZERO_BIT);
        }
        if self.scanline == SCANLINES_PER_FRAME {
            self.scanline = 0;
            self.frame += 1;
            self.status |= VBLANK_BIT;
            return true;
        }
        false
    }
    /// Advance the PPU by some number of CPU cycles.
    ///
    /// Returns `true` if a frame completed.
    pub fn advance_cpu_cycles(&mut self, cycles: u32) -> bool {
        self.dots += cycles * DOTS_PER_CPU_CYCLE;
        let mut frame_complete = false;
        while self.dots >= DOTS_PER_SCANLINE {
            self.dots -= DOTS_PER_SCANLINE;
            frame_complete |= self.end_scanline();
        }
        frame_complete
    }
}
