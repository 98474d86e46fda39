use famicore::board::Board;
use famicore::cartridge::{Rom, CHR_BANK_SIZE, PRG_BANK_SIZE};
use famicore::mapper;

/// Synthetic iNES image: PRG bank `i` is filled with `0x10 + i`, 4 KiB
/// pattern bank `j` with `0x50 + j`, so bank installs are easy to spot.
fn build_image(prg_banks: usize, chr_pairs: usize, flags_6_low: u8, mapper_id: u8) -> Vec<u8> {
    let mut data = vec![0u8; 16 + prg_banks * PRG_BANK_SIZE + chr_pairs * 2 * CHR_BANK_SIZE];
    data[0..4].copy_from_slice(b"NES\x1A");
    data[4] = prg_banks as u8;
    data[5] = chr_pairs as u8;
    data[6] = ((mapper_id & 0x0F) << 4) | (flags_6_low & 0x0F);
    data[7] = mapper_id & 0xF0;
    for i in 0..prg_banks {
        let start = 16 + i * PRG_BANK_SIZE;
        data[start..start + PRG_BANK_SIZE].fill(0x10 + i as u8);
    }
    let chr_base = 16 + prg_banks * PRG_BANK_SIZE;
    for j in 0..chr_pairs * 2 {
        let start = chr_base + j * CHR_BANK_SIZE;
        data[start..start + CHR_BANK_SIZE].fill(0x50 + j as u8);
    }
    data
}

fn board_for(prg_banks: usize, chr_pairs: usize, flags_6_low: u8, mapper_id: u8) -> Board {
    let rom = Rom::from_bytes(&build_image(prg_banks, chr_pairs, flags_6_low, mapper_id)).unwrap();
    Board::new(rom)
}

#[test]
fn single_program_bank_fills_both_windows() {
    let mut board = board_for(1, 1, 0, 0);
    let mut m = mapper::for_id(0);
    m.on_load(&mut board);

    assert_eq!(board.mem[0x8000], 0x10);
    assert_eq!(board.mem[0xC000], 0x10);
    assert_eq!(board.mem[0xFFFF], 0x10);
    assert_eq!(board.ppu.peek_vram(0x0000), 0x50);
    assert_eq!(board.ppu.peek_vram(0x1000), 0x51);
}

#[test]
fn two_program_banks_land_in_order() {
    let mut board = board_for(2, 0, 0, 0);
    let mut m = mapper::for_id(0);
    m.on_load(&mut board);

    assert_eq!(board.mem[0x8000], 0x10);
    assert_eq!(board.mem[0xC000], 0x11);
}

#[test]
fn header_mirroring_reaches_the_ppu() {
    let mut board = board_for(1, 1, 0x01, 0); // vertical
    let mut m = mapper::for_id(0);
    m.on_load(&mut board);

    board.ppu.poke_vram(0x2000, 0x42);
    assert_eq!(board.ppu.peek_vram(0x2800), 0x42);
}

#[test]
fn ram_writes_pass_through_the_mapper() {
    let mut board = board_for(1, 0, 0, 0);
    let mut m = mapper::for_id(0);
    m.on_load(&mut board);

    m.write(&mut board, 0x0005, 0x77);
    assert_eq!(m.read(&mut board, 0x0005), 0x77);
    assert_eq!(m.read(&mut board, 0x1805), 0x77, "RAM mirrors every 2 KiB");
}

#[test]
fn unrom_fixes_the_last_bank_and_switches_the_first() {
    let mut board = board_for(4, 0, 0, 2);
    let mut m = mapper::for_id(2);
    assert_eq!(m.name(), "UNROM");
    m.on_load(&mut board);

    assert_eq!(board.mem[0x8000], 0x10);
    assert_eq!(board.mem[0xC000], 0x13, "last bank is fixed");

    m.write(&mut board, 0x8000, 2);
    assert_eq!(board.mem[0x8000], 0x12);
    assert_eq!(board.mem[0xC000], 0x13, "fixed bank survives a switch");
}

#[test]
fn unrom_out_of_range_select_leaves_sentinel_bytes() {
    let mut board = board_for(2, 0, 0, 2);
    let mut m = mapper::for_id(2);
    m.on_load(&mut board);

    m.write(&mut board, 0xFFFF, 9);
    assert_eq!(board.mem[0x8000], 0xFF);
    assert_eq!(board.mem[0xBFFF], 0xFF);
}

#[test]
fn cnrom_switches_the_pattern_pair() {
    let mut board = board_for(1, 2, 0, 3);
    let mut m = mapper::for_id(3);
    assert_eq!(m.name(), "CNROM");
    m.on_load(&mut board);

    assert_eq!(board.ppu.peek_vram(0x0000), 0x50);

    m.write(&mut board, 0x8000, 1);
    assert_eq!(board.ppu.peek_vram(0x0000), 0x52);
    assert_eq!(board.ppu.peek_vram(0x1000), 0x53);
    assert_eq!(board.mem[0x8000], 0x10, "program banks never move");
}

#[test]
fn aorom_switches_a_32k_pair_and_the_nametable() {
    let mut board = board_for(4, 0, 0, 7);
    let mut m = mapper::for_id(7);
    assert_eq!(m.name(), "AOROM");
    m.on_load(&mut board);

    assert_eq!(board.mem[0x8000], 0x10);
    assert_eq!(board.mem[0xC000], 0x11);

    m.write(&mut board, 0x8000, 0x01);
    assert_eq!(board.mem[0x8000], 0x12);
    assert_eq!(board.mem[0xC000], 0x13);

    // Bit 4 clear selects the first single screen.
    board.ppu.poke_vram(0x2000, 0x99);
    assert_eq!(board.ppu.peek_vram(0x2C00), 0x99);

    m.write(&mut board, 0x8000, 0x11);
    board.ppu.poke_vram(0x2400, 0x66);
    assert_eq!(board.ppu.peek_vram(0x2800), 0x66);
}

#[test]
fn gnrom_register_switches_both_and_wraps() {
    let mut board = board_for(4, 2, 0, 66);
    let mut m = mapper::for_id(66);
    assert_eq!(m.name(), "GNROM");
    m.on_load(&mut board);

    m.write(&mut board, 0x8000, 0x11);
    assert_eq!(board.mem[0x8000], 0x12);
    assert_eq!(board.mem[0xC000], 0x13);
    assert_eq!(board.ppu.peek_vram(0x0000), 0x52);
    assert_eq!(board.ppu.peek_vram(0x1000), 0x53);

    // Bank numbers beyond the cartridge wrap around.
    m.write(&mut board, 0x8000, 0x30);
    assert_eq!(board.mem[0x8000], 0x12);
    assert_eq!(board.ppu.peek_vram(0x0000), 0x50);
}

#[test]
fn unknown_mapper_falls_back_to_fixed_banks() {
    let mut board = board_for(1, 0, 0, 99);
    let mut m = mapper::for_id(99);
    assert_eq!(m.name(), "NROM");
    m.on_load(&mut board);
    assert_eq!(board.mem[0x8000], 0x10);
}
