use crate::apu::Apu;
use crate::cartridge::{Rom, CHR_BANK_SIZE, PRG_BANK_SIZE};
use crate::joypad::Joypad;
use crate::ppu::Ppu;

/// Everything on the system bus except the CPU core and the active mapper:
/// 64 KiB of flat CPU-visible memory, the picture and audio units, and the
/// two controller ports. Program banks are copied into the upper half of
/// `mem`, so ordinary reads there never indirect through the cartridge.
pub struct Board {
    pub mem: Box<[u8; 0x10000]>,
    pub ppu: Ppu,
    pub apu: Apu,
    pub joypads: [Joypad; 2],
    pub rom: Rom,
    /// Page number latched by a 0x4014 write; the console performs the
    /// OAM copy at the next instruction boundary.
    pub pending_dma: Option<u8>,
}

impl Board {
    pub fn new(rom: Rom) -> Self {
        Board {
            mem: Box::new([0; 0x10000]),
            ppu: Ppu::new(),
            apu: Apu::new(),
            joypads: [Joypad::new(0), Joypad::new(1)],
            rom,
            pending_dma: None,
        }
    }

    /// Standard address decode. Mappers call this for everything they do
    /// not intercept themselves.
    pub fn base_read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.mem[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => self.ppu.read_register(0x2000 + (addr & 7)),
            0x4000..=0x4015 => self.apu.read_register(addr),
            0x4016 => self.joypads[0].read(),
            0x4017 => self.joypads[1].read(),
            _ => self.mem[addr as usize],
        }
    }

    pub fn base_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.mem[(addr & 0x07FF) as usize] = value,
            0x2000..=0x3FFF => self.ppu.write_register(0x2000 + (addr & 7), value),
            0x4014 => self.pending_dma = Some(value),
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write_register(addr, value),
            0x4016 => {
                // The strobe line is wired to both controller ports.
                let restart = self.joypads[0].write(value);
                self.joypads[1].write(value);
                if restart {
                    log::trace!("joypad strobe restart");
                }
            }
            _ => self.mem[addr as usize] = value,
        }
    }

    /// Copy a 16 KiB program bank into the window at `addr`. Out-of-range
    /// bank numbers leave sentinel bytes behind instead of stale data.
    pub fn install_prg(&mut self, bank: usize, addr: u16) {
        let window = &mut self.mem[addr as usize..addr as usize + PRG_BANK_SIZE];
        match self.rom.prg_bank(bank) {
            Some(data) => window.copy_from_slice(data),
            None => {
                log::warn!(
                    "bank select out of range: PRG bank {bank} of {}",
                    self.rom.prg_count()
                );
                window.fill(0xFF);
            }
        }
    }

    /// Copy a 4 KiB pattern bank into pattern window 0 or 1.
    pub fn install_chr(&mut self, bank: usize, window: usize) {
        match self.rom.chr_bank(bank) {
            Some(data) => self.ppu.load_pattern(window, data),
            None => {
                log::warn!(
                    "bank select out of range: CHR bank {bank} of {}",
                    self.rom.chr_count()
                );
                let blank = [0xFF; CHR_BANK_SIZE];
                self.ppu.load_pattern(window, &blank);
            }
        }
    }
}
