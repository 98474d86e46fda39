//! 6502 core. The interpreter is table driven: a const 256-entry decode
//! table supplies the operation, addressing mode, byte length, and base
//! cycle cost, and `execute_one` runs exactly one instruction against
//! whatever bus it is handed.

/// Memory access seam between the core and the rest of the machine. Tests
/// run the core against flat memory; the console routes through the active
/// mapper.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Normal,
    Nmi,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    Ill,
}

#[derive(Debug, Clone, Copy)]
pub struct Instr {
    pub op: Op,
    pub mode: Mode,
    pub size: u8,
    pub cycles: u8,
}

const fn instr(op: Op, mode: Mode, size: u8, cycles: u8) -> Instr {
    Instr { op, mode, size, cycles }
}

/// Decode table indexed by opcode byte. Unassigned slots stay `Ill`.
pub const OPCODES: [Instr; 256] = {
    use Mode::*;
    use Op::*;

    // Illegal opcodes must cost at least one cycle: the frame scheduler
    // runs the CPU until its cycle count passes the PPU's, and a
    // zero-cycle instruction would never let it catch up.
    let mut t = [instr(Ill, Implied, 0, 2); 256];

    t[0x69] = instr(Adc, Immediate, 2, 2);
    t[0x65] = instr(Adc, ZeroPage, 2, 3);
    t[0x75] = instr(Adc, ZeroPageX, 2, 4);
    t[0x6D] = instr(Adc, Absolute, 3, 4);
    t[0x7D] = instr(Adc, AbsoluteX, 3, 4);
    t[0x79] = instr(Adc, AbsoluteY, 3, 4);
    t[0x61] = instr(Adc, IndirectX, 2, 6);
    t[0x71] = instr(Adc, IndirectY, 2, 5);

    t[0x29] = instr(And, Immediate, 2, 2);
    t[0x25] = instr(And, ZeroPage, 2, 3);
    t[0x35] = instr(And, ZeroPageX, 2, 4);
    t[0x2D] = instr(And, Absolute, 3, 4);
    t[0x3D] = instr(And, AbsoluteX, 3, 4);
    t[0x39] = instr(And, AbsoluteY, 3, 4);
    t[0x21] = instr(And, IndirectX, 2, 6);
    t[0x31] = instr(And, IndirectY, 2, 5);

    t[0x0A] = instr(Asl, Accumulator, 1, 2);
    t[0x06] = instr(Asl, ZeroPage, 2, 5);
    t[0x16] = instr(Asl, ZeroPageX, 2, 6);
    t[0x0E] = instr(Asl, Absolute, 3, 6);
    t[0x1E] = instr(Asl, AbsoluteX, 3, 7);

    t[0x90] = instr(Bcc, Relative, 2, 2);
    t[0xB0] = instr(Bcs, Relative, 2, 2);
    t[0xF0] = instr(Beq, Relative, 2, 2);
    t[0x30] = instr(Bmi, Relative, 2, 2);
    t[0xD0] = instr(Bne, Relative, 2, 2);
    t[0x10] = instr(Bpl, Relative, 2, 2);
    t[0x50] = instr(Bvc, Relative, 2, 2);
    t[0x70] = instr(Bvs, Relative, 2, 2);

    t[0x24] = instr(Bit, ZeroPage, 2, 3);
    t[0x2C] = instr(Bit, Absolute, 3, 4);

    t[0x00] = instr(Brk, Implied, 1, 7);

    t[0x18] = instr(Clc, Implied, 1, 2);
    t[0xD8] = instr(Cld, Implied, 1, 2);
    t[0x58] = instr(Cli, Implied, 1, 2);
    t[0xB8] = instr(Clv, Implied, 1, 2);

    t[0xC9] = instr(Cmp, Immediate, 2, 2);
    t[0xC5] = instr(Cmp, ZeroPage, 2, 3);
    t[0xD5] = instr(Cmp, ZeroPageX, 2, 4);
    t[0xCD] = instr(Cmp, Absolute, 3, 4);
    t[0xDD] = instr(Cmp, AbsoluteX, 3, 4);
    t[0xD9] = instr(Cmp, AbsoluteY, 3, 4);
    t[0xC1] = instr(Cmp, IndirectX, 2, 6);
    t[0xD1] = instr(Cmp, IndirectY, 2, 5);

    t[0xE0] = instr(Cpx, Immediate, 2, 2);
    t[0xE4] = instr(Cpx, ZeroPage, 2, 3);
    t[0xEC] = instr(Cpx, Absolute, 3, 4);

    t[0xC0] = instr(Cpy, Immediate, 2, 2);
    t[0xC4] = instr(Cpy, ZeroPage, 2, 3);
    t[0xCC] = instr(Cpy, Absolute, 3, 4);

    t[0xC6] = instr(Dec, ZeroPage, 2, 5);
    t[0xD6] = instr(Dec, ZeroPageX, 2, 6);
    t[0xCE] = instr(Dec, Absolute, 3, 6);
    t[0xDE] = instr(Dec, AbsoluteX, 3, 7);

    t[0xCA] = instr(Dex, Implied, 1, 2);
    t[0x88] = instr(Dey, Implied, 1, 2);

    t[0x49] = instr(Eor, Immediate, 2, 2);
    t[0x45] = instr(Eor, ZeroPage, 2, 3);
    t[0x55] = instr(Eor, ZeroPageX, 2, 4);
    t[0x4D] = instr(Eor, Absolute, 3, 4);
    t[0x5D] = instr(Eor, AbsoluteX, 3, 4);
    t[0x59] = instr(Eor, AbsoluteY, 3, 4);
    t[0x41] = instr(Eor, IndirectX, 2, 6);
    t[0x51] = instr(Eor, IndirectY, 2, 5);

    t[0xE6] = instr(Inc, ZeroPage, 2, 5);
    t[0xF6] = instr(Inc, ZeroPageX, 2, 6);
    t[0xEE] = instr(Inc, Absolute, 3, 6);
    t[0xFE] = instr(Inc, AbsoluteX, 3, 7);

    t[0xE8] = instr(Inx, Implied, 1, 2);
    t[0xC8] = instr(Iny, Implied, 1, 2);

    t[0x4C] = instr(Jmp, Absolute, 3, 3);
    t[0x6C] = instr(Jmp, Indirect, 3, 5);
    t[0x20] = instr(Jsr, Absolute, 3, 6);

    t[0xA9] = instr(Lda, Immediate, 2, 2);
    t[0xA5] = instr(Lda, ZeroPage, 2, 3);
    t[0xB5] = instr(Lda, ZeroPageX, 2, 4);
    t[0xAD] = instr(Lda, Absolute, 3, 4);
    t[0xBD] = instr(Lda, AbsoluteX, 3, 4);
    t[0xB9] = instr(Lda, AbsoluteY, 3, 4);
    t[0xA1] = instr(Lda, IndirectX, 2, 6);
    t[0xB1] = instr(Lda, IndirectY, 2, 5);

    t[0xA2] = instr(Ldx, Immediate, 2, 2);
    t[0xA6] = instr(Ldx, ZeroPage, 2, 3);
    t[0xB6] = instr(Ldx, ZeroPageY, 2, 4);
    t[0xAE] = instr(Ldx, Absolute, 3, 4);
    t[0xBE] = instr(Ldx, AbsoluteY, 3, 4);

    t[0xA0] = instr(Ldy, Immediate, 2, 2);
    t[0xA4] = instr(Ldy, ZeroPage, 2, 3);
    t[0xB4] = instr(Ldy, ZeroPageX, 2, 4);
    t[0xAC] = instr(Ldy, Absolute, 3, 4);
    t[0xBC] = instr(Ldy, AbsoluteX, 3, 4);

    t[0x4A] = instr(Lsr, Accumulator, 1, 2);
    t[0x46] = instr(Lsr, ZeroPage, 2, 5);
    t[0x56] = instr(Lsr, ZeroPageX, 2, 6);
    t[0x4E] = instr(Lsr, Absolute, 3, 6);
    t[0x5E] = instr(Lsr, AbsoluteX, 3, 7);

    t[0xEA] = instr(Nop, Implied, 1, 2);

    t[0x09] = instr(Ora, Immediate, 2, 2);
    t[0x05] = instr(Ora, ZeroPage, 2, 3);
    t[0x15] = instr(Ora, ZeroPageX, 2, 4);
    t[0x0D] = instr(Ora, Absolute, 3, 4);
    t[0x1D] = instr(Ora, AbsoluteX, 3, 4);
    t[0x19] = instr(Ora, AbsoluteY, 3, 4);
    t[0x01] = instr(Ora, IndirectX, 2, 6);
    t[0x11] = instr(Ora, IndirectY, 2, 5);

    t[0x48] = instr(Pha, Implied, 1, 3);
    t[0x08] = instr(Php, Implied, 1, 3);
    t[0x68] = instr(Pla, Implied, 1, 4);
    t[0x28] = instr(Plp, Implied, 1, 4);

    t[0x2A] = instr(Rol, Accumulator, 1, 2);
    t[0x26] = instr(Rol, ZeroPage, 2, 5);
    t[0x36] = instr(Rol, ZeroPageX, 2, 6);
    t[0x2E] = instr(Rol, Absolute, 3, 6);
    t[0x3E] = instr(Rol, AbsoluteX, 3, 7);

    t[0x6A] = instr(Ror, Accumulator, 1, 2);
    t[0x66] = instr(Ror, ZeroPage, 2, 5);
    t[0x76] = instr(Ror, ZeroPageX, 2, 6);
    t[0x6E] = instr(Ror, Absolute, 3, 6);
    t[0x7E] = instr(Ror, AbsoluteX, 3, 7);

    t[0x40] = instr(Rti, Implied, 1, 6);
    t[0x60] = instr(Rts, Implied, 1, 6);

    t[0xE9] = instr(Sbc, Immediate, 2, 2);
    t[0xE5] = instr(Sbc, ZeroPage, 2, 3);
    t[0xF5] = instr(Sbc, ZeroPageX, 2, 4);
    t[0xED] = instr(Sbc, Absolute, 3, 4);
    t[0xFD] = instr(Sbc, AbsoluteX, 3, 4);
    t[0xF9] = instr(Sbc, AbsoluteY, 3, 4);
    t[0xE1] = instr(Sbc, IndirectX, 2, 6);
    t[0xF1] = instr(Sbc, IndirectY, 2, 5);

    t[0x38] = instr(Sec, Implied, 1, 2);
    t[0xF8] = instr(Sed, Implied, 1, 2);
    t[0x78] = instr(Sei, Implied, 1, 2);

    t[0x85] = instr(Sta, ZeroPage, 2, 3);
    t[0x95] = instr(Sta, ZeroPageX, 2, 4);
    t[0x8D] = instr(Sta, Absolute, 3, 4);
    t[0x9D] = instr(Sta, AbsoluteX, 3, 5);
    t[0x99] = instr(Sta, AbsoluteY, 3, 5);
    t[0x81] = instr(Sta, IndirectX, 2, 6);
    t[0x91] = instr(Sta, IndirectY, 2, 6);

    t[0x86] = instr(Stx, ZeroPage, 2, 3);
    t[0x96] = instr(Stx, ZeroPageY, 2, 4);
    t[0x8E] = instr(Stx, Absolute, 3, 4);

    t[0x84] = instr(Sty, ZeroPage, 2, 3);
    t[0x94] = instr(Sty, ZeroPageX, 2, 4);
    t[0x8C] = instr(Sty, Absolute, 3, 4);

    t[0xAA] = instr(Tax, Implied, 1, 2);
    t[0xA8] = instr(Tay, Implied, 1, 2);
    t[0xBA] = instr(Tsx, Implied, 1, 2);
    t[0x8A] = instr(Txa, Implied, 1, 2);
    t[0x9A] = instr(Txs, Implied, 1, 2);
    t[0x98] = instr(Tya, Implied, 1, 2);

    t
};

pub struct Cpu {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub pc: u16,
    pub sp: u8,

    pub carry: bool,
    pub zero: bool,
    pub interrupt_disable: bool,
    pub decimal: bool,
    pub brk: bool,
    pub not_used: bool,
    pub overflow: bool,
    pub sign: bool,

    pending_irq: Option<Interrupt>,

    pub cycles: u64,
    pub instructions: u64,
}

impl Cpu {
    pub fn new() -> Self {
        let mut cpu = Cpu {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFF,
            carry: false,
            zero: false,
            interrupt_disable: true,
            decimal: false,
            brk: false,
            not_used: true,
            overflow: false,
            sign: false,
            pending_irq: None,
            cycles: 0,
            instructions: 0,
        };
        cpu.reset();
        cpu
    }

    /// Soft reset: registers return to power-on values and a reset
    /// interrupt is latched so the next step fetches the reset vector.
    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFF;
        self.carry = false;
        self.zero = false;
        self.interrupt_disable = true;
        self.decimal = false;
        self.brk = false;
        self.not_used = true;
        self.overflow = false;
        self.sign = false;
        self.request_irq(Interrupt::Reset);
    }

    /// Reset plus clearing the run counters and any latched interrupt.
    pub fn hard_reset(&mut self) {
        self.cycles = 0;
        self.instructions = 0;
        self.pending_irq = None;
        self.reset();
    }

    /// Latch an interrupt for the next instruction boundary. A maskable
    /// request never displaces one already waiting; NMI and reset do.
    pub fn request_irq(&mut self, kind: Interrupt) {
        match kind {
            Interrupt::Normal if self.pending_irq.is_some() => {
                log::trace!("maskable interrupt dropped, another is pending");
            }
            _ => self.pending_irq = Some(kind),
        }
    }

    pub fn pack_flags(&self) -> u8 {
        (self.carry as u8)
            | (self.zero as u8) << 1
            | (self.interrupt_disable as u8) << 2
            | (self.decimal as u8) << 3
            | (self.brk as u8) << 4
            | (self.not_used as u8) << 5
            | (self.overflow as u8) << 6
            | (self.sign as u8) << 7
    }

    pub fn unpack_flags(&mut self, value: u8) {
        self.carry = value & 0x01 != 0;
        self.zero = value & 0x02 != 0;
        self.interrupt_disable = value & 0x04 != 0;
        self.decimal = value & 0x08 != 0;
        self.brk = value & 0x10 != 0;
        self.not_used = value & 0x20 != 0;
        self.overflow = value & 0x40 != 0;
        self.sign = value & 0x80 != 0;
    }

    fn push(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write(0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | self.sp as u16)
    }

    fn read_vector(&mut self, bus: &mut impl Bus, addr: u16) -> u16 {
        bus.read(addr) as u16 | (bus.read(addr.wrapping_add(1)) as u16) << 8
    }

    fn process_irq(&mut self, bus: &mut impl Bus) {
        let Some(kind) = self.pending_irq.take() else {
            return;
        };
        match kind {
            Interrupt::Normal => {
                if self.interrupt_disable {
                    return;
                }
                let packed = self.pack_flags();
                self.push(bus, (self.pc >> 8) as u8);
                self.push(bus, self.pc as u8);
                self.push(bus, packed);
                self.interrupt_disable = true;
                self.pc = self.read_vector(bus, 0xFFFE);
            }
            Interrupt::Nmi => {
                let packed = self.pack_flags();
                self.push(bus, (self.pc >> 8) as u8);
                self.push(bus, self.pc as u8);
                self.push(bus, packed);
                self.pc = self.read_vector(bus, 0xFFFA);
            }
            Interrupt::Reset => {
                self.pc = self.read_vector(bus, 0xFFFC);
            }
        }
    }

    /// Resolve the operand address, advancing the program counter past the
    /// operand bytes.
    fn operand_address(&mut self, bus: &mut impl Bus, mode: Mode) -> u16 {
        match mode {
            Mode::Implied | Mode::Accumulator => 0,
            Mode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
            Mode::ZeroPage => {
                let addr = bus.read(self.pc) as u16;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
            Mode::ZeroPageX => {
                let addr = (bus.read(self.pc).wrapping_add(self.x)) as u16;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
            Mode::ZeroPageY => {
                let addr = (bus.read(self.pc).wrapping_add(self.y)) as u16;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
            Mode::Absolute => {
                let addr = self.read_vector(bus, self.pc);
                self.pc = self.pc.wrapping_add(2);
                addr
            }
            Mode::AbsoluteX => {
                let base = self.read_vector(bus, self.pc);
                self.pc = self.pc.wrapping_add(2);
                base.wrapping_add(self.x as u16)
            }
            Mode::AbsoluteY => {
                let base = self.read_vector(bus, self.pc);
                self.pc = self.pc.wrapping_add(2);
                base.wrapping_add(self.y as u16)
            }
            Mode::Indirect => {
                let ptr = self.read_vector(bus, self.pc);
                self.pc = self.pc.wrapping_add(2);
                self.read_vector(bus, ptr)
            }
            Mode::IndirectX => {
                let ptr = (self.x.wrapping_add(bus.read(self.pc))) as u16;
                self.pc = self.pc.wrapping_add(1);
                self.read_vector(bus, ptr)
            }
            Mode::IndirectY => {
                let ptr = bus.read(self.pc) as u16;
                self.pc = self.pc.wrapping_add(1);
                self.read_vector(bus, ptr).wrapping_add(self.y as u16)
            }
            Mode::Relative => {
                let offset = bus.read(self.pc) as i32;
                self.pc = self.pc.wrapping_add(1);
                let offset = if offset < 0x80 { offset } else { offset - 0x100 };
                ((self.pc as i32 + offset) & 0xFFFF) as u16
            }
        }
    }

    fn set_nz(&mut self, value: u8) {
        self.sign = value & 0x80 != 0;
        self.zero = value == 0;
    }

    /// Run one instruction (servicing a latched interrupt first) and return
    /// its encoded length in bytes. Unknown opcodes report zero length:
    /// they are logged and skipped as single bytes.
    pub fn execute_one(&mut self, bus: &mut impl Bus) -> u8 {
        self.process_irq(bus);

        let opcode = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);

        let instr = OPCODES[opcode as usize];
        let address = self.operand_address(bus, instr.mode);

        match instr.op {
            Op::Adc => {
                let m = bus.read(address) as i32;
                let temp = m + self.a as i32 + self.carry as i32;
                self.overflow =
                    (self.a as i32 ^ m) & 0x80 == 0 && (self.a as i32 ^ temp) & 0x80 != 0;
                self.carry = temp > 0xFF;
                self.sign = temp & 0x80 != 0;
                self.zero = temp & 0xFF == 0;
                self.a = temp as u8;
            }
            Op::Sbc => {
                let m = bus.read(address) as i32;
                let temp = self.a as i32 - m - (1 - self.carry as i32);
                self.overflow =
                    (self.a as i32 ^ m) & 0x80 != 0 && (self.a as i32 ^ temp) & 0x80 != 0;
                self.carry = temp >= 0;
                self.sign = temp & 0x80 != 0;
                self.zero = temp & 0xFF == 0;
                self.a = temp as u8;
            }
            Op::And => {
                self.a &= bus.read(address);
                self.set_nz(self.a);
            }
            Op::Ora => {
                self.a |= bus.read(address);
                self.set_nz(self.a);
            }
            Op::Eor => {
                self.a ^= bus.read(address);
                self.set_nz(self.a);
            }
            Op::Asl => {
                let value = if instr.mode == Mode::Accumulator {
                    self.a
                } else {
                    bus.read(address)
                };
                self.carry = value & 0x80 != 0;
                let result = value << 1;
                self.set_nz(result);
                if instr.mode == Mode::Accumulator {
                    self.a = result;
                } else {
                    bus.write(address, result);
                }
            }
            Op::Lsr => {
                let value = if instr.mode == Mode::Accumulator {
                    self.a
                } else {
                    bus.read(address)
                };
                self.carry = value & 1 != 0;
                let result = value >> 1;
                self.sign = false;
                self.zero = result == 0;
                if instr.mode == Mode::Accumulator {
                    self.a = result;
                } else {
                    bus.write(address, result);
                }
            }
            Op::Rol => {
                let value = if instr.mode == Mode::Accumulator {
                    self.a
                } else {
                    bus.read(address)
                };
                let new_carry = value & 0x80 != 0;
                let result = (value << 1) | self.carry as u8;
                self.carry = new_carry;
                self.set_nz(result);
                if instr.mode == Mode::Accumulator {
                    self.a = result;
                } else {
                    bus.write(address, result);
                }
            }
            Op::Ror => {
                let value = if instr.mode == Mode::Accumulator {
                    self.a
                } else {
                    bus.read(address)
                };
                let new_carry = value & 1 != 0;
                let result = (value >> 1) | (self.carry as u8) << 7;
                self.carry = new_carry;
                self.set_nz(result);
                if instr.mode == Mode::Accumulator {
                    self.a = result;
                } else {
                    bus.write(address, result);
                }
            }
            Op::Bit => {
                let value = bus.read(address);
                self.sign = value & 0x80 != 0;
                self.overflow = value & 0x40 != 0;
                self.zero = value & self.a == 0;
            }
            Op::Bcc => {
                if !self.carry {
                    self.pc = address;
                }
            }
            Op::Bcs => {
                if self.carry {
                    self.pc = address;
                }
            }
            Op::Beq => {
                if self.zero {
                    self.pc = address;
                }
            }
            Op::Bne => {
                if !self.zero {
                    self.pc = address;
                }
            }
            Op::Bmi => {
                if self.sign {
                    self.pc = address;
                }
            }
            Op::Bpl => {
                if !self.sign {
                    self.pc = address;
                }
            }
            Op::Bvs => {
                if self.overflow {
                    self.pc = address;
                }
            }
            Op::Bvc => {
                if !self.overflow {
                    self.pc = address;
                }
            }
            Op::Brk => {
                // Leaves a byte of padding after the opcode, so RTI resumes
                // two bytes past the BRK.
                self.pc = self.pc.wrapping_add(1);
                let packed = self.pack_flags() | 0x10;
                self.push(bus, (self.pc >> 8) as u8);
                self.push(bus, self.pc as u8);
                self.push(bus, packed);
                self.interrupt_disable = true;
                self.pc = self.read_vector(bus, 0xFFFE);
            }
            Op::Cmp => {
                let temp = self.a as i32 - bus.read(address) as i32;
                self.carry = temp >= 0;
                self.sign = temp & 0x80 != 0;
                self.zero = temp & 0xFF == 0;
            }
            Op::Cpx => {
                let temp = self.x as i32 - bus.read(address) as i32;
                self.carry = temp >= 0;
                self.sign = temp & 0x80 != 0;
                self.zero = temp & 0xFF == 0;
            }
            Op::Cpy => {
                let temp = self.y as i32 - bus.read(address) as i32;
                self.carry = temp >= 0;
                self.sign = temp & 0x80 != 0;
                self.zero = temp & 0xFF == 0;
            }
            Op::Dec => {
                let value = bus.read(address).wrapping_sub(1);
                self.set_nz(value);
                bus.write(address, value);
            }
            Op::Inc => {
                let value = bus.read(address).wrapping_add(1);
                self.set_nz(value);
                bus.write(address, value);
            }
            Op::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.set_nz(self.x);
            }
            Op::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.set_nz(self.y);
            }
            Op::Inx => {
                self.x = self.x.wrapping_add(1);
                self.set_nz(self.x);
            }
            Op::Iny => {
                self.y = self.y.wrapping_add(1);
                self.set_nz(self.y);
            }
            Op::Clc => self.carry = false,
            Op::Sec => self.carry = true,
            Op::Cli => self.interrupt_disable = false,
            Op::Sei => self.interrupt_disable = true,
            Op::Clv => self.overflow = false,
            Op::Cld => self.decimal = false,
            Op::Sed => self.decimal = true,
            Op::Jmp => {
                self.pc = address;
            }
            Op::Jsr => {
                let ret = self.pc.wrapping_sub(1);
                self.push(bus, (ret >> 8) as u8);
                self.push(bus, ret as u8);
                self.pc = address;
            }
            Op::Rts => {
                let lo = self.pull(bus) as u16;
                let hi = self.pull(bus) as u16;
                self.pc = (lo | hi << 8).wrapping_add(1);
            }
            Op::Rti => {
                let packed = self.pull(bus);
                self.unpack_flags(packed);
                let lo = self.pull(bus) as u16;
                let hi = self.pull(bus) as u16;
                self.pc = lo | hi << 8;
            }
            Op::Lda => {
                self.a = bus.read(address);
                self.set_nz(self.a);
            }
            Op::Ldx => {
                self.x = bus.read(address);
                self.set_nz(self.x);
            }
            Op::Ldy => {
                self.y = bus.read(address);
                self.set_nz(self.y);
            }
            Op::Sta => bus.write(address, self.a),
            Op::Stx => bus.write(address, self.x),
            Op::Sty => bus.write(address, self.y),
            Op::Tax => {
                self.x = self.a;
                self.set_nz(self.a);
            }
            Op::Tay => {
                self.y = self.a;
                self.set_nz(self.a);
            }
            Op::Txa => {
                self.a = self.x;
                self.set_nz(self.a);
            }
            Op::Tya => {
                self.a = self.y;
                self.set_nz(self.a);
            }
            Op::Txs => {
                self.sp = self.x;
            }
            Op::Tsx => {
                self.x = self.sp;
                self.set_nz(self.x);
            }
            Op::Pha => {
                let a = self.a;
                self.push(bus, a);
            }
            Op::Pla => {
                self.a = self.pull(bus);
                self.set_nz(self.a);
            }
            Op::Php => {
                let packed = self.pack_flags() | 0x10;
                self.push(bus, packed);
            }
            Op::Plp => {
                let packed = self.pull(bus);
                self.unpack_flags(packed);
            }
            Op::Nop => {}
            Op::Ill => {
                log::error!(
                    "illegal opcode {opcode:#04X} at {:#06X}, skipping",
                    self.pc.wrapping_sub(1)
                );
            }
        }

        self.cycles += instr.cycles as u64;
        self.instructions += 1;

        instr.size
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
