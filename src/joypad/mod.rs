use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

/// Shared view of one controller's button state. A front end keeps a clone
/// and flips buttons from its own thread while the console polls reads.
#[derive(Clone)]
pub struct JoypadHandle {
    buttons: Arc<Mutex<[bool; 8]>>,
}

impl JoypadHandle {
    pub fn set(&self, button: Button, pressed: bool) {
        let mut buttons = match self.buttons.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        buttons[button as usize] = pressed;
        log::trace!("joypad button {:?} -> {}", button, pressed);
    }

    pub fn press(&self, button: Button) {
        self.set(button, true);
    }

    pub fn release(&self, button: Button) {
        self.set(button, false);
    }
}

/// One controller port. Reads walk a 24-step serial sequence: eight button
/// bits, ten zeros, two signature bits identifying the port, four more
/// zeros, then the counter wraps.
pub struct Joypad {
    port: u8,
    strobe_count: u8,
    last_write: u8,
    buttons: Arc<Mutex<[bool; 8]>>,
}

impl Joypad {
    pub fn new(port: u8) -> Self {
        Joypad {
            port,
            strobe_count: 0,
            last_write: 0,
            buttons: Arc::new(Mutex::new([false; 8])),
        }
    }

    pub fn handle(&self) -> JoypadHandle {
        JoypadHandle {
            buttons: Arc::clone(&self.buttons),
        }
    }

    pub fn reset(&mut self) {
        self.strobe_count = 0;
        self.last_write = 0;
    }

    /// Latch write. A 1-to-0 transition on bit 0 restarts the read sequence.
    pub fn write(&mut self, value: u8) -> bool {
        let restart = (self.last_write & 1) == 1 && (value & 1) == 0;
        self.last_write = value;
        if restart {
            self.strobe_count = 0;
        }
        restart
    }

    pub fn read(&mut self) -> u8 {
        let buttons = match self.buttons.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let value = match self.strobe_count {
            0..=7 => buttons[self.strobe_count as usize] as u8,
            18 => (self.port != 0) as u8,
            19 => (self.port == 0) as u8,
            _ => 0,
        };
        self.strobe_count = (self.strobe_count + 1) % 24;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strobe(pad: &mut Joypad) {
        pad.write(1);
        pad.write(0);
    }

    #[test]
    fn reads_buttons_in_order() {
        let mut pad = Joypad::new(0);
        pad.handle().press(Button::A);
        pad.handle().press(Button::Start);
        strobe(&mut pad);
        let bits: Vec<u8> = (0..8).map(|_| pad.read()).collect();
        assert_eq!(bits, vec![1, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn signature_bits_identify_port() {
        let mut pad0 = Joypad::new(0);
        let mut pad1 = Joypad::new(1);
        strobe(&mut pad0);
        strobe(&mut pad1);
        for _ in 0..18 {
            pad0.read();
            pad1.read();
        }
        assert_eq!((pad0.read(), pad0.read()), (0, 1));
        assert_eq!((pad1.read(), pad1.read()), (1, 0));
    }

    #[test]
    fn sequence_wraps_after_24_reads() {
        let mut pad = Joypad::new(0);
        pad.handle().press(Button::A);
        strobe(&mut pad);
        for _ in 0..24 {
            pad.read();
        }
        // Back at the A button slot.
        assert_eq!(pad.read(), 1);
    }

    #[test]
    fn strobe_edge_restarts_mid_sequence() {
        let mut pad = Joypad::new(0);
        pad.handle().press(Button::B);
        strobe(&mut pad);
        pad.read(); // A
        pad.read(); // B
        pad.read(); // Select
        strobe(&mut pad);
        assert_eq!(pad.read(), 0); // A again
        assert_eq!(pad.read(), 1); // B
    }

    #[test]
    fn write_without_edge_keeps_position() {
        let mut pad = Joypad::new(0);
        pad.handle().press(Button::Select);
        strobe(&mut pad);
        pad.read(); // A
        pad.write(0); // no 1->0 edge
        pad.read(); // B
        assert_eq!(pad.read(), 1); // Select
    }
}
