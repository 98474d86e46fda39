//! Cartridge mapper circuits. A mapper decorates the board's standard
//! address decode: reads and writes funnel through the active mapper, which
//! intercepts the cartridge range and swaps banks by copying them into the
//! flat memory windows.

mod aorom;
mod cnrom;
mod gnrom;
mod unrom;

pub use aorom::Aorom;
pub use cnrom::Cnrom;
pub use gnrom::Gnrom;
pub use unrom::Unrom;

use crate::board::Board;
use crate::cartridge::mapper_name;

pub trait Mapper: Send {
    fn name(&self) -> &'static str;

    /// Power-on bank setup. The default arrangement covers NROM:
    /// first bank at 0x8000, second (or the first again) at 0xC000,
    /// and the first pattern pair if the cartridge carries one.
    fn on_load(&mut self, board: &mut Board) {
        install_power_on_banks(board);
    }

    fn read(&mut self, board: &mut Board, addr: u16) -> u8 {
        board.base_read(addr)
    }

    fn write(&mut self, board: &mut Board, addr: u16, value: u8) {
        board.base_write(addr, value);
    }
}

pub(crate) fn install_power_on_banks(board: &mut Board) {
    board.install_prg(0, 0x8000);
    if board.rom.prg_count() < 2 {
        board.install_prg(0, 0xC000);
    } else {
        board.install_prg(1, 0xC000);
    }
    if board.rom.chr_count() >= 2 {
        board.install_chr(0, 0);
        board.install_chr(1, 1);
    }
    let mirroring = board.rom.mirroring;
    board.ppu.set_mirroring(mirroring);
}

/// Fixed-bank cartridge; the trait defaults are exactly its behavior.
pub struct Nrom;

impl Mapper for Nrom {
    fn name(&self) -> &'static str {
        "NROM"
    }
}

/// Pick a mapper for a header id. Unknown ids fall back to the fixed-bank
/// arrangement, which at least reaches the reset vector.
pub fn for_id(id: u8) -> Box<dyn Mapper> {
    match id {
        0 => Box::new(Nrom),
        2 => Box::new(Unrom),
        3 => Box::new(Cnrom),
        7 => Box::new(Aorom::new()),
        66 => Box::new(Gnrom),
        _ => {
            log::warn!(
                "unsupported mapper {id} ({}), falling back to fixed banks",
                mapper_name(id)
            );
            Box::new(Nrom)
        }
    }
}
