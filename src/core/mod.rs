//! The actual emulation code, provided as a library.
//!
//! A library for emulating the behaviour of the Nintendo Entertainment System.
//! Contains the entire state of the machine, and updates it accordingly as the NES is advanced.
//! The CPU drives time: every instruction's cycles are fed to the APU and to the PPU's scanline
//! counter, and the APU's output is available as a buffer of signed 16 bit samples.
//! ```
//! use tinynes::core::{Cartridge, Controller, Nes, Settings};
//! // A single bank cartridge that loops forever
//! let mut image = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0, 0];
//! image.resize(16, 0);
//! let mut prg = vec![0xEA; 0x4000];
//! // JMP $8000
//! prg[0..3].copy_from_slice(&[0x4C, 0x00, 0x80]);
//! // Reset vector
//! prg[0x3FFC..0x3FFE].copy_from_slice(&[0x00, 0x80]);
//! image.extend(prg);
//! image.extend(vec![0; 0x2000]);
//!
//! let cartridge = Cartridge::from_ines(&image).unwrap();
//! // The actual state of the NES
//! let mut nes = Nes::with_cartridge(cartridge).unwrap();
//! // Various configurable settings for how to run the emulator
//! let settings = Settings::default();
//! // Advance the NES by 1 instruction
//! nes.advance_instruction(&settings).unwrap();
//! // Advance the NES by 1 frame
//! let status = nes.advance_frame(&settings).unwrap();
//! assert_eq!(status.frame, 1);
//! // Press start on player 1's controller
//! nes.set_controller_state(0, Controller { start: true, ..Controller::default() });
//! // Get the audio output as a vector of samples
//! let audio_output = nes.apu.drain_samples();
//! println!("Read {} audio samples", audio_output.len());
//! ```
mod error;
pub use error::{Error, Result};
pub mod registers;
mod bus;
pub use bus::{Bus, RegisterWrite, MEM_SIZE};
mod cpu;
pub use cpu::{Cpu, STACK_PAGE};
mod status_register;
pub use status_register::StatusRegister;
pub mod opcodes;
mod addressing;
pub use addressing::Operand;
mod execute;
mod interrupt;
pub use interrupt::{Interrupt, InterruptKind};
mod nes;
pub use nes::{FrameStatus, Nes, NesState};
mod ppu;
pub use ppu::{decode_tile, Ppu, Tile};
pub mod apu;
pub use apu::Apu;
mod cartridge;
pub use cartridge::*;
mod controller;
pub use controller::{Controller, ControllerPort};
mod settings;
pub use settings::Settings;

/// The approximate clock speed of an NES, in hertz.
pub const CPU_CLOCK_SPEED: u32 = 1_789_000;
/// The location of the non-maskable interrupt's vector.
pub const NMI_VECTOR: usize = 0xFFFA;
/// The location of the reset vector.
pub const RESET_VECTOR: usize = 0xFFFC;
/// The location of the IRQ/BRK vector.
pub const IRQ_VECTOR: usize = 0xFFFE;
/// Number of CPU cycles before the PPU accepts writes to PPUCTRL, PPUMASK, PPUSCROLL and PPUADDR.
pub const POWER_UP_CYCLES: u64 = 29658;
/// The amount of cycles that transferring a page of data to the PPU's OAM memory takes.
pub const CPU_CYCLES_PER_OAM_DMA: u32 = 512;
/// The amount of cycles servicing an interrupt (or a reset) takes.
pub const INTERRUPT_CYCLES: u32 = 7;
