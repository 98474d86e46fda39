use super::{install_power_on_banks, Mapper};
use crate::board::Board;

/// GNROM: one register selects both a 32 KiB program pair and an 8 KiB
/// pattern pair. Bank numbers wrap around the cartridge size.
pub struct Gnrom;

impl Mapper for Gnrom {
    fn name(&self) -> &'static str {
        "GNROM"
    }

    fn on_load(&mut self, board: &mut Board) {
        install_power_on_banks(board);
    }

    fn write(&mut self, board: &mut Board, addr: u16, value: u8) {
        if addr < 0x8000 {
            board.base_write(addr, value);
            return;
        }

        let prg_count = board.rom.prg_count();
        if prg_count > 0 {
            let pair = ((value >> 4) & 3) as usize * 2;
            board.install_prg(pair % prg_count, 0x8000);
            board.install_prg((pair + 1) % prg_count, 0xC000);
        }

        let chr_count = board.rom.chr_count();
        if chr_count > 0 {
            let vbank = ((value & 3) as usize * 2) % chr_count;
            board.install_chr(vbank, 0);
            board.install_chr(vbank + 1, 1);
        }
    }
}
