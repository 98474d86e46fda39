use std::path::Path;

use crate::board::Board;
use crate::cartridge::{Rom, RomError};
use crate::cpu::{Bus, Cpu, Interrupt};
use crate::joypad::JoypadHandle;
use crate::mapper::{self, Mapper};
use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Called once per completed frame with the finished raster.
pub type FrameSink = Box<dyn FnMut(&[u32; SCREEN_WIDTH * SCREEN_HEIGHT]) + Send>;

/// CPU view of the machine: every access goes through the active mapper,
/// which decides what reaches the board's standard decode.
struct CpuBus<'a> {
    board: &'a mut Board,
    mapper: &'a mut dyn Mapper,
}

impl Bus for CpuBus<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        self.mapper.read(self.board, addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.mapper.write(self.board, addr, value);
    }
}

/// The assembled console: CPU core, board, and the cartridge's mapper.
pub struct Nes {
    pub cpu: Cpu,
    pub board: Board,
    mapper: Box<dyn Mapper>,
    frame_sink: Option<FrameSink>,
    ppu_clock: u64,
    frames: u64,
}

impl Nes {
    pub fn new(rom: Rom) -> Self {
        let mapper = mapper::for_id(rom.mapper_id);
        log::info!("attached mapper: {}", mapper.name());
        let mut nes = Nes {
            cpu: Cpu::new(),
            board: Board::new(rom),
            mapper,
            frame_sink: None,
            ppu_clock: 341,
            frames: 0,
        };
        nes.mapper.on_load(&mut nes.board);
        nes
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        Ok(Nes::new(Rom::load(path)?))
    }

    pub fn set_frame_sink(&mut self, sink: FrameSink) {
        self.frame_sink = Some(sink);
    }

    pub fn joypad_handle(&self, port: usize) -> JoypadHandle {
        self.board.joypads[port & 1].handle()
    }

    pub fn mapper_name(&self) -> &'static str {
        self.mapper.name()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Soft reset, as if the console's reset button were pressed.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.board.ppu.reset();
    }

    /// Power-cycle: counters, strobe state, and bank windows all return to
    /// their load-time arrangement.
    pub fn hard_reset(&mut self) {
        self.cpu.hard_reset();
        self.board.ppu.reset();
        self.board.apu.reset();
        for pad in &mut self.board.joypads {
            pad.reset();
        }
        self.board.pending_dma = None;
        self.ppu_clock = 341;
        self.frames = 0;
        self.mapper.on_load(&mut self.board);
    }

    /// Execute one CPU instruction, then satisfy any sprite-DMA request it
    /// latched. Returns the instruction's byte length.
    pub fn step(&mut self) -> u8 {
        let len = {
            let mut bus = CpuBus {
                board: &mut self.board,
                mapper: self.mapper.as_mut(),
            };
            self.cpu.execute_one(&mut bus)
        };

        if let Some(page) = self.board.pending_dma.take() {
            self.sprite_dma(page);
        }

        len
    }

    /// Copy a full 256-byte page into sprite memory through the mapper, so
    /// banked sources transfer correctly.
    fn sprite_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        for i in 0..256u16 {
            let value = self.mapper.read(&mut self.board, base.wrapping_add(i));
            self.board.ppu.oam[i as usize] = value;
        }
    }

    /// Move latched picture-unit events into the CPU and frame sink.
    /// Returns true when a frame was completed.
    fn drain_ppu_events(&mut self) -> bool {
        if self.board.ppu.pending_nmi {
            self.board.ppu.pending_nmi = false;
            self.cpu.request_irq(Interrupt::Nmi);
        }
        if self.board.ppu.frame_ready {
            self.board.ppu.frame_ready = false;
            self.frames += 1;
            if let Some(sink) = self.frame_sink.as_mut() {
                sink(&self.board.ppu.raster);
            }
            return true;
        }
        false
    }

    /// Drive the picture unit and CPU in their 3:1 cycle ratio until one
    /// frame completes. The picture unit advances in 24-dot quanta while it
    /// trails the CPU, then the CPU catches up instruction by instruction.
    pub fn run_frame(&mut self) {
        loop {
            let mut frame_done = false;

            while self.ppu_clock <= self.cpu.cycles * 3 {
                self.ppu_clock += self.board.ppu.run_dots(24) as u64;
                frame_done |= self.drain_ppu_events();
            }

            while self.cpu.cycles * 3 <= self.ppu_clock {
                self.step();
            }

            if frame_done {
                return;
            }
        }
    }
}
