use std::env;

use anyhow::{bail, Context, Result};

use famicore::{Nes, Rom, SCREEN_HEIGHT, SCREEN_WIDTH};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <rom_file> [frames]", args[0]);
        bail!("missing ROM path");
    }

    let rom_path = &args[1];
    let frames: u64 = match args.get(2) {
        Some(arg) => arg.parse().context("frame count must be a number")?,
        None => 60,
    };

    let rom = Rom::load(rom_path).with_context(|| format!("loading {rom_path}"))?;
    println!(
        "{rom_path}: {} PRG banks, {} CHR banks, mapper {} ({}), {} mirroring",
        rom.prg_count(),
        rom.chr_count(),
        rom.mapper_id,
        rom.mapper_name(),
        rom.mirroring.describe()
    );

    let mut nes = Nes::new(rom);
    for _ in 0..frames {
        nes.run_frame();
    }

    println!(
        "ran {} frames: {} instructions, {} cpu cycles",
        nes.frames(),
        nes.cpu.instructions,
        nes.cpu.cycles
    );
    println!(
        "raster checksum: {:#010X}",
        raster_checksum(&nes.board.ppu.raster)
    );

    Ok(())
}

/// FNV-1a over the raster bytes; stable across runs of the same image,
/// handy for comparisons without a window.
fn raster_checksum(raster: &[u32; SCREEN_WIDTH * SCREEN_HEIGHT]) -> u32 {
    let mut hash: u32 = 0x811C9DC5;
    for &pixel in raster.iter() {
        for byte in pixel.to_le_bytes() {
            hash ^= byte as u32;
            hash = hash.wrapping_mul(0x01000193);
        }
    }
    hash
}
