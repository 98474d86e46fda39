//! Audio register file. Writes are decoded into per-channel parameter
//! state so games that poll 0x4015 see sensible channel status, but no
//! sample synthesis happens here.

#[derive(Default)]
pub struct Pulse {
    pub enabled: bool,
    pub duty: u8,
    pub volume: u8,
    pub constant_volume: bool,
    pub envelope_loop: bool,
    pub envelope_period: u8,
    pub sweep_enabled: bool,
    pub sweep_period: u8,
    pub sweep_negate: bool,
    pub sweep_shift: u8,
    pub timer_period: u16,
    pub length_counter: u8,
}

#[derive(Default)]
pub struct Triangle {
    pub enabled: bool,
    pub linear_counter_period: u8,
    pub linear_control: bool,
    pub timer_period: u16,
    pub length_counter: u8,
}

#[derive(Default)]
pub struct Noise {
    pub enabled: bool,
    pub mode: bool,
    pub volume: u8,
    pub constant_volume: bool,
    pub envelope_loop: bool,
    pub envelope_period: u8,
    pub timer_period: u16,
    pub length_counter: u8,
}

#[derive(Default)]
pub struct Dmc {
    pub enabled: bool,
    pub irq_enabled: bool,
    pub loop_flag: bool,
    pub rate: u8,
    pub output_level: u8,
    pub sample_address: u16,
    pub sample_length: u16,
    pub interrupt: bool,
}

pub struct Apu {
    pub pulse1: Pulse,
    pub pulse2: Pulse,
    pub triangle: Triangle,
    pub noise: Noise,
    pub dmc: Dmc,
    pub frame_mode: u8,
    frame_interrupt_inhibit: bool,
    frame_interrupt: bool,
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

impl Apu {
    pub fn new() -> Self {
        Apu {
            pulse1: Pulse::default(),
            pulse2: Pulse::default(),
            triangle: Triangle::default(),
            noise: Noise::default(),
            dmc: Dmc::default(),
            frame_mode: 0,
            frame_interrupt_inhibit: false,
            frame_interrupt: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Apu::new();
    }

    pub fn read_register(&mut self, addr: u16) -> u8 {
        match addr {
            0x4015 => {
                let mut result = 0u8;
                if self.pulse1.length_counter > 0 {
                    result |= 0x01;
                }
                if self.pulse2.length_counter > 0 {
                    result |= 0x02;
                }
                if self.triangle.length_counter > 0 {
                    result |= 0x04;
                }
                if self.noise.length_counter > 0 {
                    result |= 0x08;
                }
                if self.dmc.enabled {
                    result |= 0x10;
                }
                if self.frame_interrupt {
                    result |= 0x40;
                }
                if self.dmc.interrupt {
                    result |= 0x80;
                }
                self.frame_interrupt = false;
                result
            }
            _ => 0,
        }
    }

    pub fn write_register(&mut self, addr: u16, value: u8) {
        match addr {
            0x4000 => Self::write_pulse_control(&mut self.pulse1, value),
            0x4001 => Self::write_pulse_sweep(&mut self.pulse1, value),
            0x4002 => {
                self.pulse1.timer_period = (self.pulse1.timer_period & 0xFF00) | value as u16;
            }
            0x4003 => Self::write_pulse_high(&mut self.pulse1, value),

            0x4004 => Self::write_pulse_control(&mut self.pulse2, value),
            0x4005 => Self::write_pulse_sweep(&mut self.pulse2, value),
            0x4006 => {
                self.pulse2.timer_period = (self.pulse2.timer_period & 0xFF00) | value as u16;
            }
            0x4007 => Self::write_pulse_high(&mut self.pulse2, value),

            0x4008 => {
                self.triangle.linear_control = (value & 0x80) != 0;
                self.triangle.linear_counter_period = value & 0x7F;
            }
            0x400A => {
                self.triangle.timer_period = (self.triangle.timer_period & 0xFF00) | value as u16;
            }
            0x400B => {
                self.triangle.timer_period =
                    (self.triangle.timer_period & 0x00FF) | ((value as u16 & 0x07) << 8);
                self.triangle.length_counter = LENGTH_TABLE[(value >> 3) as usize];
            }

            0x400C => {
                self.noise.envelope_loop = (value & 0x20) != 0;
                self.noise.constant_volume = (value & 0x10) != 0;
                self.noise.volume = value & 0x0F;
                self.noise.envelope_period = value & 0x0F;
            }
            0x400E => {
                self.noise.mode = (value & 0x80) != 0;
                self.noise.timer_period = NOISE_PERIOD_TABLE[(value & 0x0F) as usize];
            }
            0x400F => {
                self.noise.length_counter = LENGTH_TABLE[(value >> 3) as usize];
            }

            0x4010 => {
                self.dmc.irq_enabled = (value & 0x80) != 0;
                self.dmc.loop_flag = (value & 0x40) != 0;
                self.dmc.rate = value & 0x0F;
            }
            0x4011 => {
                self.dmc.output_level = value & 0x7F;
            }
            0x4012 => {
                self.dmc.sample_address = 0xC000 | ((value as u16) << 6);
            }
            0x4013 => {
                self.dmc.sample_length = ((value as u16) << 4) | 1;
            }

            0x4015 => {
                self.pulse1.enabled = (value & 0x01) != 0;
                self.pulse2.enabled = (value & 0x02) != 0;
                self.triangle.enabled = (value & 0x04) != 0;
                self.noise.enabled = (value & 0x08) != 0;
                self.dmc.enabled = (value & 0x10) != 0;

                if !self.pulse1.enabled {
                    self.pulse1.length_counter = 0;
                }
                if !self.pulse2.enabled {
                    self.pulse2.length_counter = 0;
                }
                if !self.triangle.enabled {
                    self.triangle.length_counter = 0;
                }
                if !self.noise.enabled {
                    self.noise.length_counter = 0;
                }

                self.dmc.interrupt = false;
            }

            0x4017 => {
                self.frame_mode = value >> 7;
                self.frame_interrupt_inhibit = (value & 0x40) != 0;
                if self.frame_interrupt_inhibit {
                    self.frame_interrupt = false;
                }
            }

            _ => {}
        }
    }

    fn write_pulse_control(pulse: &mut Pulse, value: u8) {
        pulse.duty = (value >> 6) & 0x03;
        pulse.envelope_loop = (value & 0x20) != 0;
        pulse.constant_volume = (value & 0x10) != 0;
        pulse.volume = value & 0x0F;
        pulse.envelope_period = value & 0x0F;
    }

    fn write_pulse_sweep(pulse: &mut Pulse, value: u8) {
        pulse.sweep_enabled = (value & 0x80) != 0;
        pulse.sweep_period = (value >> 4) & 0x07;
        pulse.sweep_negate = (value & 0x08) != 0;
        pulse.sweep_shift = value & 0x07;
    }

    fn write_pulse_high(pulse: &mut Pulse, value: u8) {
        pulse.timer_period = (pulse.timer_period & 0x00FF) | ((value as u16 & 0x07) << 8);
        pulse.length_counter = LENGTH_TABLE[(value >> 3) as usize];
    }
}

const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

const NOISE_PERIOD_TABLE: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_control_write_decodes_fields() {
        let mut apu = Apu::new();
        apu.write_register(0x4000, 0b1011_0101);
        assert_eq!(apu.pulse1.duty, 2);
        assert!(apu.pulse1.envelope_loop);
        assert!(apu.pulse1.constant_volume);
        assert_eq!(apu.pulse1.volume, 5);
    }

    #[test]
    fn timer_high_write_loads_length_counter() {
        let mut apu = Apu::new();
        apu.write_register(0x4015, 0x01);
        apu.write_register(0x4002, 0x42);
        apu.write_register(0x4003, 0x0B); // length index 1, timer high 3
        assert_eq!(apu.pulse1.timer_period, 0x0342);
        assert_eq!(apu.pulse1.length_counter, 254);
        assert_eq!(apu.read_register(0x4015) & 0x01, 0x01);
    }

    #[test]
    fn disabling_channel_clears_length_counter() {
        let mut apu = Apu::new();
        apu.write_register(0x4015, 0x08);
        apu.write_register(0x400F, 0x10); // length index 2
        assert_eq!(apu.noise.length_counter, 20);
        apu.write_register(0x4015, 0x00);
        assert_eq!(apu.noise.length_counter, 0);
        assert_eq!(apu.read_register(0x4015) & 0x08, 0);
    }
}
