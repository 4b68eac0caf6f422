use std::{collections::VecDeque, fmt::Debug};

use log::*;

use crate::core::{
    get_mapper,
    opcodes::{decode, format_opcode},
    registers::{JOY1, JOY2, PPUCTRL, SND_CHN},
    Apu, Bus, Cartridge, Controller, ControllerPort, Cpu, Error, Interrupt, InterruptKind, Ppu,
    RegisterWrite, Result, Settings, CPU_CYCLES_PER_OAM_DMA, INTERRUPT_CYCLES, POWER_UP_CYCLES,
    RESET_VECTOR,
};

/// A snapshot of the NES state at a given point.
/// Used for debug logging.
#[derive(Clone)]
pub struct NesState {
    cpu: Cpu,
    opcode: u8,
    operands: Vec<u8>,
}

impl NesState {
    /// Create a new NES state with the instruction given.
    /// * `instruction`: The instruction the NES is about to execute, at bytes.
    pub fn new(nes: &Nes, instruction: &[u8]) -> NesState {
        NesState {
            cpu: nes.cpu.clone(),
            opcode: instruction[0],
            operands: instruction[1..].to_vec(),
        }
    }
}
impl Debug for NesState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} NEXT INST={} (OPCODE={:02X} OPERANDS={:02X?})",
            self.cpu,
            format_opcode(self.opcode, self.operands.as_slice()),
            self.opcode,
            self.operands.as_slice()
        )
    }
}

/// What happened during a call to [Nes::advance_frame].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStatus {
    /// CPU cycles elapsed
    pub cycles: u32,
    /// Number of the frame that just completed, counting from 1
    pub frame: u64,
    /// Whether the completed frame raised an NMI
    pub nmi_raised: bool,
}

/// The NES.
///
/// The entire NES console.
/// Contains a [Cpu], [Ppu], and [Apu], and keeps them all synchonized.
/// Also owns the memory [Bus] and the [Cartridge] currently inserted in the console.
pub struct Nes {
    /// CPU of the NES
    pub cpu: Cpu,
    /// PPU of the NES
    pub ppu: Ppu,
    /// APU of the NES
    pub apu: Apu,
    /// Memory of the NES
    pub bus: Bus,
    /// Cartridge inserted in the NES
    pub cartridge: Option<Cartridge>,
    /// Player 1 and 2 controller states
    pub controllers: [Controller; 2],
    ports: [ControllerPort; 2],
    /// The non-maskable interrupt line
    pub nmi: Interrupt,
    /// Total CPU cycles since power up
    pub cycles: u64,
    // Cycles spent on OAM DMA during the current instruction
    dma_cycles: u32,
    /// The last instructions executed by the NES. Stored for debugging purposes.
    pub previous_states: VecDeque<NesState>,
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nes {
    /// Initialize an NES with no cartridge inserted and memory that is completely 0s.
    ///
    /// Since the cartridge is where the actual program is stored, this is only useful for
    /// debugging purposes or manually simulating NES behaviour.
    /// Use [`Nes::with_cartridge`] for proper emulation.
    pub fn new() -> Nes {
        Nes {
            cpu: Cpu::new(),
            ppu: Ppu::new(),
            apu: Apu::new(),
            bus: Bus::new(),
            cartridge: None,
            controllers: [Controller::new(); 2],
            ports: [ControllerPort::default(); 2],
            nmi: Interrupt::default(),
            cycles: 0,
            dma_cycles: 0,
            previous_states: VecDeque::new(),
        }
    }
    /// Initialize the NES with a given cartridge inserted.
    ///
    /// The cartridge is loaded by its mapper and the PC is initialised from the reset vector.
    /// ```rust,ignore
    /// use tinynes::core::{Nes, Cartridge};
    /// let game = include_bytes!("my_game.nes");
    /// let cartridge = Cartridge::from_ines(game)?;
    /// let nes = Nes::with_cartridge(cartridge)?;
    /// ```
    pub fn with_cartridge(cartridge: Cartridge) -> Result<Nes> {
        let mut nes = Nes::new();
        nes.cartridge = Some(cartridge);
        nes.reset()?;
        Ok(nes)
    }
    /// Reset the NES.
    ///
    /// Every component is reinstalled from scratch, the cartridge is loaded again and
    /// execution restarts at the reset vector.
    /// Controller states are kept.
    pub fn reset(&mut self) -> Result<()> {
        let cartridge = self.cartridge.take();
        let controllers = self.controllers;
        *self = Nes {
            cartridge,
            controllers,
            ..Nes::new()
        };
        if let Some(cartridge) = &self.cartridge {
            let mapper = get_mapper(cartridge.mapper_id)?;
            info!("Loading {} cartridge, {}", mapper, cartridge);
            mapper.load(cartridge, &mut self.bus, &mut self.ppu)?;
        }
        // The reset sequence leaves the stack pointer at 0xFD
        self.cpu.p_c = self.read_vector(RESET_VECTOR)?;
        self.cpu.s_p = 0xFD;
        self.cpu.s_r.i = true;
        self.cycles = INTERRUPT_CYCLES as u64;
        info!("Initialized PC to {:#X}", self.cpu.p_c);
        Ok(())
    }

    /// Read a byte of memory given an address in CPU space.
    ///
    /// This is not guaranteed to not modify the NES's state,
    /// since some read operations affect certain flags (i.e. the PPU VBlank flag)
    /// ```
    /// let mut nes = tinynes::core::Nes::new();
    /// // Read a byte of WRAM
    /// let byte = nes.read_byte(0x0123).unwrap();
    /// // Read the PPU's status register
    /// let ppu_status = nes.read_byte(0x2002).unwrap();
    /// // Read the most significant byte of the cartridge's reset vector
    /// let reset_high = nes.read_byte(0xFFFD).unwrap();
    /// ```
    pub fn read_byte(&mut self, addr: usize) -> Result<u8> {
        let addr = Bus::mask(addr)?;
        match addr {
            0x2000..0x4000 => Ok(self.ppu.read_register(PPUCTRL + addr % 8)),
            SND_CHN => Ok(self.apu.read_status()),
            JOY1 => Ok(self.ports[0].read()),
            JOY2 => Ok(self.ports[1].read()),
            _ => self.bus.read(addr),
        }
    }
    /// Write a byte using CPU memory.
    ///
    /// The write lands on the bus first, then any register it hit is dispatched to the
    /// unit that owns it.
    /// ```
    /// let mut nes = tinynes::core::Nes::new();
    /// // Set a byte's value in ram
    /// nes.write_byte(0x00, 0x12).unwrap();
    /// // Trigger an OAM DMA by writing to the OAMDMA register
    /// nes.write_byte(0x4014, 0x00).unwrap();
    /// assert_eq!(nes.ppu.oam[0], 0x12);
    /// ```
    pub fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        if let Some(register_write) = self.bus.write(addr, &[value])? {
            self.dispatch(register_write)?;
        }
        Ok(())
    }
    fn dispatch(&mut self, register_write: RegisterWrite) -> Result<()> {
        match register_write {
            RegisterWrite::Ppu { addr, value } => {
                let nmi_was_enabled = self.ppu.nmi_enabled();
                self.ppu.write_register(addr, value);
                // Enabling the NMI during VBlank triggers it immediately
                if addr == PPUCTRL && !nmi_was_enabled && self.ppu.nmi_enabled() && self.ppu.vblank()
                {
                    self.nmi.request();
                }
            }
            RegisterWrite::OamDma(page) => {
                let start = (page as usize) << 8;
                let bytes = (start..start + 0x100)
                    .map(|a| self.bus.read(a))
                    .collect::<Result<Vec<u8>>>()?;
                self.ppu.oam_dma(&bytes);
                self.dma_cycles += CPU_CYCLES_PER_OAM_DMA;
            }
            RegisterWrite::Apu { addr, value } => self.apu.write_register(addr, value),
            RegisterWrite::Controller(value) => {
                self.ports
                    .iter_mut()
                    .zip(self.controllers.iter())
                    .for_each(|(port, state)| port.write_strobe(value, *state));
            }
        }
        Ok(())
    }
    /// Update a controller's state in the NES.
    ///
    /// The ROM will still have to poll for the controller state.
    /// * `num` The controller number of the controller being updated. Should be either `0` or `1`
    /// * `state` The [`Controller`] containing the controller's state
    pub fn set_controller_state(&mut self, num: usize, state: Controller) {
        self.controllers[num] = state;
    }
    /// Raise the non-maskable interrupt, it is serviced before the next instruction.
    pub fn request_nmi(&mut self) {
        self.nmi.request();
    }
    /// Execute the next instruction in the NES's code.
    ///
    /// If an interrupt is pending it is serviced instead.
    /// Reads the next opcode using the CPU's PC, decodes the instruction, and executes it.
    /// Adds a new [`NesState`] to [`Nes::previous_states`] before executing.
    /// Does not advance anything other than the CPU.
    /// Use [Nes::advance_instruction] to emulate the entire console.
    ///
    /// Returns the number of CPU cycles taken.
    pub fn step(&mut self, settings: &Settings) -> Result<u32> {
        if let Some(kind) = self.nmi.take(self.cpu.p_c) {
            self.interrupt(kind)?;
            return Ok(INTERRUPT_CYCLES);
        }
        let pc = self.cpu.p_c;
        let inst = [
            self.bus.read(pc as usize)?,
            self.bus.read(pc.wrapping_add(1) as usize)?,
            self.bus.read(pc.wrapping_add(2) as usize)?,
        ];
        self.record_state(&inst, settings);
        let Some(opcode) = decode(inst[0]) else {
            let e = Error::IllegalOpcode {
                opcode: inst[0],
                addr: pc,
            };
            error!(
                "Encountered an error \"{}\", printing last {} states\n{:#?}",
                e,
                self.previous_states.len(),
                self.previous_states
            );
            return Err(e);
        };
        let (operand, crossed) = self.resolve_operand(opcode.mode)?;
        let (jump, extra) = self.execute(&opcode, operand, crossed)?;
        self.cpu.p_c = jump.unwrap_or(pc.wrapping_add(opcode.bytes));
        let mut cycles = opcode.cycles + extra;
        if crossed && opcode.mnemonic.has_page_cross_penalty() {
            cycles += 1;
        }
        Ok(cycles + std::mem::take(&mut self.dma_cycles))
    }
    fn record_state(&mut self, inst: &[u8], settings: &Settings) {
        if settings.trace_instructions {
            trace!("{:?}", NesState::new(self, inst));
        }
        if settings.history_len == 0 {
            return;
        }
        let state = NesState::new(self, inst);
        self.previous_states.push_back(state);
        while self.previous_states.len() > settings.history_len {
            self.previous_states.pop_front();
        }
    }
    // Push the PC and status, and jump through the interrupt's vector
    fn interrupt(&mut self, kind: InterruptKind) -> Result<()> {
        self.push_u16(self.cpu.p_c)?;
        self.push(self.cpu.s_r.to_byte())?;
        self.cpu.s_r.i = true;
        self.cpu.p_c = self.read_vector(kind.vector())?;
        Ok(())
    }
    /// Advance the NES by a single instruction, keeping the APU and PPU in step.
    ///
    /// Returns the number of CPU cycles elapsed.
    pub fn advance_instruction(&mut self, settings: &Settings) -> Result<u32> {
        let c = self.step(settings)?;
        self.cycles += c as u64;
        if !self.bus.ppu_writes_enabled() && self.cycles >= POWER_UP_CYCLES {
            debug!("PPU warmed up after {} cycles", self.cycles);
            self.bus.enable_ppu_writes();
        }
        self.apu.advance_cpu_cycles(c, &self.bus)?;
        if self.ppu.advance_cpu_cycles(c) && self.ppu.nmi_enabled() {
            self.nmi.request();
        }
        Ok(c)
    }
    /// Advance the NES by 1 frame, approx 29781 cycles.
    ///
    /// Advance the NES until the PPU has counted a full frame of scanlines and entered VBlank.
    pub fn advance_frame(&mut self, settings: &Settings) -> Result<FrameStatus> {
        let frame = self.ppu.frame();
        let mut cycles = 0;
        while self.ppu.frame() == frame {
            cycles += self.advance_instruction(settings)?;
        }
        Ok(FrameStatus {
            cycles,
            frame: self.ppu.frame(),
            nmi_raised: self.nmi.pending,
        })
    }
}
