use super::{install_power_on_banks, Mapper};
use crate::board::Board;

/// CNROM: fixed program banks, writes select an 8 KiB pattern pair.
pub struct Cnrom;

impl Mapper for Cnrom {
    fn name(&self) -> &'static str {
        "CNROM"
    }

    fn on_load(&mut self, board: &mut Board) {
        install_power_on_banks(board);
    }

    fn write(&mut self, board: &mut Board, addr: u16, value: u8) {
        if addr < 0x8000 {
            board.base_write(addr, value);
        } else {
            let vbank = ((value & 3) as usize) * 2;
            board.install_chr(vbank, 0);
            board.install_chr(vbank + 1, 1);
        }
    }
}
