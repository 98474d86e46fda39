use super::{install_power_on_banks, Mapper};
use crate::board::Board;
use crate::cartridge::Mirroring;

/// AOROM: the whole 32 KiB window switches at once, and writes also pick
/// which single nametable the PPU sees.
pub struct Aorom {
    mirroring_bit: Option<u8>,
}

impl Aorom {
    pub fn new() -> Self {
        Aorom { mirroring_bit: None }
    }
}

impl Default for Aorom {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper for Aorom {
    fn name(&self) -> &'static str {
        "AOROM"
    }

    fn on_load(&mut self, board: &mut Board) {
        install_power_on_banks(board);
        board.install_prg(0, 0x8000);
        board.install_prg(1, 0xC000);
    }

    fn write(&mut self, board: &mut Board, addr: u16, value: u8) {
        if addr < 0x8000 {
            board.base_write(addr, value);
            return;
        }

        let pair = (value & 0x0F) as usize * 2;
        board.install_prg(pair, 0x8000);
        board.install_prg(pair + 1, 0xC000);

        let bit = value & 0x10;
        if self.mirroring_bit != Some(bit) {
            self.mirroring_bit = Some(bit);
            board.ppu.set_mirroring(if bit == 0 {
                Mirroring::SingleScreenA
            } else {
                Mirroring::SingleScreenB
            });
        }
    }
}
