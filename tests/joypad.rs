use famicore::board::Board;
use famicore::cartridge::{Rom, PRG_BANK_SIZE};
use famicore::joypad::Button;

fn board() -> Board {
    let mut data = vec![0u8; 16 + PRG_BANK_SIZE];
    data[0..4].copy_from_slice(b"NES\x1A");
    data[4] = 1;
    Board::new(Rom::from_bytes(&data).unwrap())
}

#[test]
fn controller_reads_through_the_bus() {
    let mut board = board();
    let handle = board.joypads[0].handle();
    handle.press(Button::A);
    handle.press(Button::Right);

    board.base_write(0x4016, 1);
    board.base_write(0x4016, 0);

    let bits: Vec<u8> = (0..8).map(|_| board.base_read(0x4016)).collect();
    assert_eq!(bits, vec![1, 0, 0, 0, 0, 0, 0, 1]);
}

#[test]
fn strobe_write_reaches_both_ports() {
    let mut board = board();
    board.base_write(0x4016, 1);
    board.base_write(0x4016, 0);

    // Skip to the signature bits on the second port.
    for _ in 0..18 {
        board.base_read(0x4017);
    }
    assert_eq!(board.base_read(0x4017), 1);
    assert_eq!(board.base_read(0x4017), 0);
}

#[test]
fn released_button_reads_zero_next_strobe() {
    let mut board = board();
    let handle = board.joypads[0].handle();
    handle.press(Button::Start);

    board.base_write(0x4016, 1);
    board.base_write(0x4016, 0);
    for _ in 0..3 {
        board.base_read(0x4016);
    }
    assert_eq!(board.base_read(0x4016), 1);

    handle.release(Button::Start);
    board.base_write(0x4016, 1);
    board.base_write(0x4016, 0);
    for _ in 0..3 {
        board.base_read(0x4016);
    }
    assert_eq!(board.base_read(0x4016), 0);
}
