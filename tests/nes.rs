mod common;
use assert_hex::assert_eq_hex;
use common::nes_from_image;
use tinynes::core::{Controller, Error, Nes, Settings, CPU_CYCLES_PER_OAM_DMA};

// JMP $8000
const IDLE: &[u8] = &[0x4C, 0x00, 0x80];

#[test]
fn test_reset_vector() {
    let nes = nes_with_program!(IDLE);
    assert_eq_hex!(nes.cpu.p_c, 0x8000);
    assert_eq_hex!(nes.cpu.s_p, 0xFD);
    assert!(nes.cpu.s_r.i);
    assert_eq!(nes.cycles, 7);
}

#[test]
fn test_frame_cycles() {
    let mut nes = nes_with_program!(IDLE);
    let statuses = advance_nes_frames!(nes, 3);
    assert_eq!(
        statuses.iter().map(|s| s.frame).collect::<Vec<u64>>(),
        [1, 2, 3]
    );
    statuses
        .iter()
        .for_each(|s| assert!((29778..=29784).contains(&s.cycles), "{:?}", s));
    assert!(statuses.iter().all(|s| !s.nmi_raised));
    assert!(nes.ppu.vblank());
}

#[test]
fn test_nmi_every_frame() {
    let mut nes = nes_with_program!(
        &[
            0xA9, 0x80, // LDA #$80
            0x8D, 0x00, 0x20, // STA $2000
            0x4C, 0x00, 0x80, // JMP $8000
        ],
        &[
            0xE6, 0x10, // INC $10
            0x40, // RTI
        ]
    );
    let statuses = advance_nes_frames!(nes, 3);
    assert!(statuses.iter().all(|s| s.nmi_raised));
    // The last frame's NMI is still pending
    assert_eq_hex!(nes.bus.read(0x10).unwrap(), 2);
    assert!(nes.nmi.pending);
}

#[test]
fn test_ppu_writes_gated_after_power_up() {
    let mut nes = nes_with_program!(&[
        0xA9, 0x80, // LDA #$80
        0x8D, 0x00, 0x20, // STA $2000
        0x4C, 0x05, 0x80, // JMP $8005
    ]);
    let statuses = advance_nes_frames!(nes, 2);
    assert!(statuses.iter().all(|s| !s.nmi_raised));
    assert_eq_hex!(nes.ppu.ctrl, 0x00);
    // Once warmed up the same write goes through
    nes.write_byte(0x2000, 0x80).unwrap();
    assert_eq_hex!(nes.ppu.ctrl, 0x80);
}

#[test]
fn test_enabling_nmi_during_vblank() {
    let mut nes = nes_with_program!(IDLE);
    advance_nes_frames!(nes, 2);
    assert!(nes.ppu.vblank());
    assert!(!nes.nmi.pending);
    nes.write_byte(0x2000, 0x80).unwrap();
    assert!(nes.nmi.pending);
}

#[test]
fn test_oam_dma() {
    let mut nes = nes_with_program!(&[
        0xA9, 0x02, // LDA #$02
        0x8D, 0x14, 0x40, // STA $4014
    ]);
    (0..0x100).for_each(|i| nes.write_byte(0x0200 + i, i as u8).unwrap());
    let settings = Settings::default();
    nes.advance_instruction(&settings).unwrap();
    assert_eq!(
        nes.advance_instruction(&settings).unwrap(),
        4 + CPU_CYCLES_PER_OAM_DMA
    );
    assert_eq!(nes.cycles, 7 + 2 + 4 + 512);
    (0..0x100).for_each(|i| assert_eq_hex!(nes.ppu.oam[i], i as u8));
}

#[test]
fn test_controllers() {
    let mut nes = Nes::new();
    press_button!(nes, 0, start);
    press_button!(nes, 0, right);
    press_button!(nes, 1, b);
    nes.write_byte(0x4016, 1).unwrap();
    nes.write_byte(0x4016, 0).unwrap();
    // Changes after the latch are not seen until the next strobe
    release_button!(nes, 0, start);
    let p1 = (0..9)
        .map(|_| nes.read_byte(0x4016).unwrap())
        .collect::<Vec<u8>>();
    assert_eq!(p1, [0, 0, 0, 1, 0, 0, 0, 1, 1]);
    let p2 = (0..9)
        .map(|_| nes.read_byte(0x4017).unwrap())
        .collect::<Vec<u8>>();
    assert_eq!(p2, [0, 1, 0, 0, 0, 0, 0, 0, 1]);
}

#[test]
fn test_controller_polled_by_program() {
    let mut nes = nes_with_program!(&[
        0xA9, 0x01, 0x8D, 0x16, 0x40, // LDA #1, STA $4016
        0xA9, 0x00, 0x8D, 0x16, 0x40, // LDA #0, STA $4016
        0xAD, 0x16, 0x40, 0x85, 0x00, // LDA $4016, STA $00
        0xAD, 0x16, 0x40, 0x85, 0x01, // LDA $4016, STA $01
    ]);
    nes.set_controller_state(
        0,
        Controller {
            b: true,
            ..Controller::default()
        },
    );
    step_nes!(nes, 8);
    assert_eq_hex!(nes.bus.read(0x00).unwrap(), 0);
    assert_eq_hex!(nes.bus.read(0x01).unwrap(), 1);
}

#[test]
fn test_ppu_data_through_cpu() {
    let mut nes = nes_with_program!(IDLE);
    nes.bus.enable_ppu_writes();
    // Through the mirror at 0x3FFE
    nes.write_byte(0x3FFE, 0x00).unwrap();
    nes.write_byte(0x2006, 0x10).unwrap();
    // The first read only fills the buffer
    assert_eq_hex!(nes.read_byte(0x2007).unwrap(), 0x00);
    assert_eq_hex!(nes.read_byte(0x2007).unwrap(), 0x10);
    assert_eq_hex!(nes.read_byte(0x200F).unwrap(), 0x11);
    // Palette writes and reads are not buffered
    nes.write_byte(0x2006, 0x3F).unwrap();
    nes.write_byte(0x2006, 0x01).unwrap();
    nes.write_byte(0x2007, 0x2A).unwrap();
    nes.write_byte(0x2006, 0x3F).unwrap();
    nes.write_byte(0x2006, 0x01).unwrap();
    assert_eq_hex!(nes.read_byte(0x2007).unwrap(), 0x2A);
    assert_eq_hex!(nes.ppu.palette()[1], 0x2A);
}

#[test]
fn test_apu_status_through_cpu() {
    let mut nes = Nes::new();
    nes.write_byte(0x4015, 0x01).unwrap();
    nes.write_byte(0x4003, 0x08).unwrap();
    assert_eq_hex!(nes.read_byte(0x4015).unwrap(), 0x01);
}

#[test]
fn test_audio_produced_every_frame() {
    let mut nes = nes_with_program!(&[
        0xA9, 0x01, 0x8D, 0x15, 0x40, // LDA #1, STA $4015
        0xA9, 0xBF, 0x8D, 0x00, 0x40, // LDA #$BF, STA $4000
        0xA9, 0x80, 0x8D, 0x02, 0x40, // LDA #$80, STA $4002
        0xA9, 0x08, 0x8D, 0x03, 0x40, // LDA #$08, STA $4003
        0x4C, 0x14, 0x80, // JMP $8014
    ]);
    advance_nes_frames!(nes, 1);
    let samples = nes.apu.drain_samples();
    assert!((740..=750).contains(&samples.len()));
    // A square wave, so both sides of zero are hit
    assert!(samples.iter().any(|s| *s > 1000));
    assert!(samples.iter().any(|s| *s < -1000));
}

#[test]
fn test_illegal_opcode_stops_frame() {
    let mut nes = nes_with_program!(&[0xEA, 0xEA, 0xFF]);
    let settings = Settings::default();
    assert_eq!(
        nes.advance_frame(&settings),
        Err(Error::IllegalOpcode {
            opcode: 0xFF,
            addr: 0x8002
        })
    );
}

#[test]
fn test_reset_keeps_cartridge_and_controllers() {
    let mut nes = nes_with_program!(&[0xA9, 0x33, 0x85, 0x00, 0x4C, 0x04, 0x80]);
    press_button!(nes, 1, select);
    advance_nes_frames!(nes, 1);
    assert_eq_hex!(nes.bus.read(0x00).unwrap(), 0x33);
    nes.reset().unwrap();
    assert_eq_hex!(nes.bus.read(0x00).unwrap(), 0x00);
    assert_eq_hex!(nes.cpu.p_c, 0x8000);
    assert_eq!(nes.ppu.frame(), 0);
    assert!(nes.controllers[1].select);
    assert!(nes.cartridge.is_some());
}

#[test]
fn test_unsupported_mapper() {
    let mut image = common::program_image(IDLE, &[0x40], &[0x40]);
    image[6] |= 0x10;
    let cartridge = tinynes::core::Cartridge::from_ines(&image).unwrap();
    assert_eq!(
        Nes::with_cartridge(cartridge).err(),
        Some(Error::UnsupportedMapper(1))
    );
}

#[test]
fn test_pattern_table_loaded() {
    let nes = nes_from_image(&common::program_image(IDLE, &[0x40], &[0x40]));
    assert_eq_hex!(nes.ppu.pattern_table(0)[0x123], 0x23);
    assert_eq_hex!(nes.ppu.pattern_table(1)[0x001], 0x01);
    assert_eq!(nes.ppu.tiles().len(), 512);
}
