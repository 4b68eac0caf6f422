#![allow(unused_macros, dead_code)]
use tinynes::core::{Cartridge, Nes};

/// Where [program_image] places the program, and where the reset vector points.
pub const PROGRAM_START: u16 = 0x8000;
/// Where [program_image] places the NMI handler.
pub const NMI_HANDLER: u16 = 0x8100;
/// Where [program_image] places the IRQ/BRK handler.
pub const IRQ_HANDLER: u16 = 0x8200;

// Assemble a single bank NROM image, filled with NOPs
pub fn program_image(program: &[u8], nmi: &[u8], irq: &[u8]) -> Vec<u8> {
    let mut image = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0x01, 0x00];
    image.resize(16, 0);
    let mut prg = vec![0xEA; 0x4000];
    macro_rules! place {
        ($addr: expr, $bytes: expr) => {{
            let start = $addr as usize - 0x8000;
            prg[start..start + $bytes.len()].copy_from_slice($bytes);
        }};
    }
    place!(PROGRAM_START, program);
    place!(NMI_HANDLER, nmi);
    place!(IRQ_HANDLER, irq);
    let vectors = [NMI_HANDLER, PROGRAM_START, IRQ_HANDLER]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect::<Vec<u8>>();
    prg[0x3FFA..0x4000].copy_from_slice(&vectors);
    image.extend(prg);
    image.extend((0..0x2000).map(|i| i as u8));
    image
}

// Create an NES running a program, with an NMI handler that returns immediately
#[macro_export]
macro_rules! nes_with_program {
    ($program: expr) => {
        nes_with_program!($program, &[0x40], &[0x40])
    };
    ($program: expr, $nmi: expr) => {
        nes_with_program!($program, $nmi, &[0x40])
    };
    ($program: expr, $nmi: expr, $irq: expr) => {{
        let image = common::program_image($program, $nmi, $irq);
        tinynes::core::Nes::with_cartridge(
            tinynes::core::Cartridge::from_ines(&image).unwrap(),
        )
        .unwrap()
    }};
}

// Step the CPU alone a number of instructions, returning the total cycles
#[macro_export]
macro_rules! step_nes {
    ($nes: ident, $n: expr) => {{
        let settings = tinynes::core::Settings::default();
        (0..$n).map(|_| $nes.step(&settings).unwrap()).sum::<u32>()
    }};
}

// Advance the whole console a certain number of frames
#[macro_export]
macro_rules! advance_nes_frames {
    ($nes: ident, $frames: expr) => {{
        let settings = tinynes::core::Settings::default();
        (0..$frames)
            .map(|_| $nes.advance_frame(&settings).unwrap())
            .collect::<Vec<tinynes::core::FrameStatus>>()
    }};
}

#[macro_export]
macro_rules! set_button {
    ($nes: ident, $player_number: literal, $key: ident, $value: literal) => {{
        let mut controller = $nes.controllers[$player_number];
        controller.$key = $value;
        $nes.set_controller_state($player_number, controller);
    }};
}
#[macro_export]
macro_rules! press_button {
    ($nes: ident, $player_number: literal, $key: ident) => {
        set_button!($nes, $player_number, $key, true)
    };
}
#[macro_export]
macro_rules! release_button {
    ($nes: ident, $player_number: literal, $key: ident) => {
        set_button!($nes, $player_number, $key, false)
    };
}

pub fn nes_from_image(image: &[u8]) -> Nes {
    Nes::with_cartridge(Cartridge::from_ines(image).unwrap()).unwrap()
}
