use super::{install_power_on_banks, Mapper};
use crate::board::Board;

/// UNROM: switchable 16 KiB bank at 0x8000, last bank fixed at 0xC000.
pub struct Unrom;

impl Mapper for Unrom {
    fn name(&self) -> &'static str {
        "UNROM"
    }

    fn on_load(&mut self, board: &mut Board) {
        install_power_on_banks(board);
        let last = board.rom.prg_count().saturating_sub(1);
        board.install_prg(0, 0x8000);
        board.install_prg(last, 0xC000);
    }

    fn write(&mut self, board: &mut Board, addr: u16, value: u8) {
        if addr < 0x8000 {
            board.base_write(addr, value);
        } else {
            board.install_prg(value as usize, 0x8000);
        }
    }
}
