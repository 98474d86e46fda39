use famicore::cpu::{Bus, Cpu, Interrupt};

struct TestBus {
    mem: Vec<u8>,
}

impl TestBus {
    fn new() -> Self {
        TestBus {
            mem: vec![0; 0x10000],
        }
    }

    fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.mem[addr as usize + i] = b;
        }
    }

    fn set_reset_vector(&mut self, addr: u16) {
        self.mem[0xFFFC] = addr as u8;
        self.mem[0xFFFD] = (addr >> 8) as u8;
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.mem[addr as usize] = value;
    }
}

/// Fresh CPU with the reset vector pointing at `pc`. The first
/// `execute_one` call services the latched reset and runs the
/// instruction at `pc`.
fn boot(bus: &mut TestBus, pc: u16) -> Cpu {
    bus.set_reset_vector(pc);
    Cpu::new()
}

#[test]
fn adc_flags_match_signed_arithmetic() {
    for a in 0..=255u8 {
        for m in [0x00, 0x01, 0x0F, 0x3F, 0x40, 0x7F, 0x80, 0x81, 0xC0, 0xFF] {
            for carry_in in [false, true] {
                let mut bus = TestBus::new();
                bus.load(0x0400, &[0x69, m]); // ADC #m
                let mut cpu = boot(&mut bus, 0x0400);
                cpu.a = a;
                cpu.carry = carry_in;
                cpu.execute_one(&mut bus);

                let unsigned = a as u32 + m as u32 + carry_in as u32;
                let signed = a as i8 as i32 + m as i8 as i32 + carry_in as i32;

                assert_eq!(cpu.a, unsigned as u8, "a={a} m={m} c={carry_in}");
                assert_eq!(cpu.carry, unsigned > 0xFF, "carry a={a} m={m} c={carry_in}");
                assert_eq!(
                    cpu.overflow,
                    !(-128..=127).contains(&signed),
                    "overflow a={a} m={m} c={carry_in}"
                );
                assert_eq!(cpu.zero, unsigned as u8 == 0);
                assert_eq!(cpu.sign, unsigned as u8 & 0x80 != 0);
            }
        }
    }
}

#[test]
fn sbc_flags_match_signed_arithmetic() {
    for a in [0x00u8, 0x01, 0x40, 0x7F, 0x80, 0x81, 0xD0, 0xFF] {
        for m in 0..=255u8 {
            for carry_in in [false, true] {
                let mut bus = TestBus::new();
                bus.load(0x0400, &[0xE9, m]); // SBC #m
                let mut cpu = boot(&mut bus, 0x0400);
                cpu.a = a;
                cpu.carry = carry_in;
                cpu.execute_one(&mut bus);

                let borrow = 1 - carry_in as i32;
                let unsigned = a as i32 - m as i32 - borrow;
                let signed = a as i8 as i32 - m as i8 as i32 - borrow;

                assert_eq!(cpu.a, unsigned as u8, "a={a} m={m} c={carry_in}");
                assert_eq!(cpu.carry, unsigned >= 0, "carry a={a} m={m} c={carry_in}");
                assert_eq!(
                    cpu.overflow,
                    !(-128..=127).contains(&signed),
                    "overflow a={a} m={m} c={carry_in}"
                );
            }
        }
    }
}

#[test]
fn relative_branch_reaches_all_offsets() {
    for offset in 0..=255u8 {
        let base: u16 = 0x0400;
        let mut bus = TestBus::new();
        bus.load(base, &[0x90, offset]); // BCC always taken
        let mut cpu = boot(&mut bus, base);
        cpu.execute_one(&mut bus);

        let after = base + 2;
        let target = if offset < 0x80 {
            after + offset as u16
        } else {
            after.wrapping_sub(0x100 - offset as u16)
        };
        assert_eq!(cpu.pc, target, "offset={offset:#04X}");
    }
}

#[test]
fn branch_wraps_around_address_space() {
    let mut bus = TestBus::new();
    bus.load(0xFFF0, &[0x90, 0x7F]); // BCC +127 from 0xFFF2
    let mut cpu = boot(&mut bus, 0xFFF0);
    cpu.execute_one(&mut bus);
    assert_eq!(cpu.pc, 0x0071); // 0xFFF2 + 0x7F wraps past 0xFFFF

    let mut bus = TestBus::new();
    bus.load(0x0000, &[0x90, 0x80]); // BCC -128 from 0x0002
    let mut cpu = boot(&mut bus, 0x0000);
    cpu.execute_one(&mut bus);
    assert_eq!(cpu.pc, 0xFF82);
}

#[test]
fn branch_not_taken_falls_through() {
    let mut bus = TestBus::new();
    bus.load(0x0400, &[0xB0, 0x10]); // BCS with carry clear
    let mut cpu = boot(&mut bus, 0x0400);
    cpu.execute_one(&mut bus);
    assert_eq!(cpu.pc, 0x0402);
}

#[test]
fn stack_push_pull_inverse_with_wraparound() {
    let mut bus = TestBus::new();
    // PHA / LDA #0 / PLA: the accumulator round-trips through the stack.
    bus.load(0x0400, &[0x48, 0xA9, 0x00, 0x68]);
    let mut cpu = boot(&mut bus, 0x0400);
    cpu.a = 0x5A;
    cpu.sp = 0x00; // next push wraps the pointer to 0xFF
    cpu.execute_one(&mut bus); // PHA
    assert_eq!(cpu.sp, 0xFF);
    assert_eq!(bus.mem[0x0100], 0x5A);
    cpu.execute_one(&mut bus); // LDA #0
    assert_eq!(cpu.a, 0x00);
    cpu.execute_one(&mut bus); // PLA
    assert_eq!(cpu.a, 0x5A);
    assert_eq!(cpu.sp, 0x00);
}

#[test]
fn php_sets_pushed_break_bit_only() {
    let mut bus = TestBus::new();
    bus.load(0x0400, &[0x08]); // PHP
    let mut cpu = boot(&mut bus, 0x0400);
    cpu.execute_one(&mut bus);
    let pushed = bus.mem[0x0100 | cpu.sp.wrapping_add(1) as usize];
    assert_ne!(pushed & 0x10, 0);
    assert!(!cpu.brk);
}

#[test]
fn brk_and_rti_round_trip() {
    let mut bus = TestBus::new();
    bus.load(0x0400, &[0x00, 0xFF, 0xEA]); // BRK, padding, NOP
    bus.load(0x0500, &[0x40]); // handler: RTI
    bus.mem[0xFFFE] = 0x00;
    bus.mem[0xFFFF] = 0x05;
    let mut cpu = boot(&mut bus, 0x0400);
    cpu.carry = true;

    cpu.execute_one(&mut bus); // BRK
    assert_eq!(cpu.pc, 0x0500);
    assert!(cpu.interrupt_disable);

    cpu.execute_one(&mut bus); // RTI
    assert_eq!(cpu.pc, 0x0402, "RTI resumes two bytes past the BRK");
    assert!(cpu.carry, "flags restored from the stack");
    cpu.execute_one(&mut bus); // NOP at the resume point
    assert_eq!(cpu.pc, 0x0403);
}

#[test]
fn jsr_rts_round_trip() {
    let mut bus = TestBus::new();
    bus.load(0x0400, &[0x20, 0x00, 0x06, 0xEA]); // JSR $0600, NOP
    bus.load(0x0600, &[0x60]); // RTS
    let mut cpu = boot(&mut bus, 0x0400);
    cpu.execute_one(&mut bus);
    assert_eq!(cpu.pc, 0x0600);
    cpu.execute_one(&mut bus);
    assert_eq!(cpu.pc, 0x0403);
}

#[test]
fn compare_carry_semantics() {
    let cases = [
        (0x10u8, 0x20u8, false, false), // a < m: no carry, not zero
        (0x20, 0x20, true, true),       // a == m
        (0x30, 0x20, true, false),      // a > m
    ];
    for (a, m, carry, zero) in cases {
        let mut bus = TestBus::new();
        bus.load(0x0400, &[0xC9, m]); // CMP #m
        let mut cpu = boot(&mut bus, 0x0400);
        cpu.a = a;
        cpu.execute_one(&mut bus);
        assert_eq!(cpu.carry, carry, "a={a} m={m}");
        assert_eq!(cpu.zero, zero, "a={a} m={m}");
        assert_eq!(cpu.a, a, "compare must not modify the accumulator");
    }
}

#[test]
fn illegal_opcode_is_skipped() {
    let mut bus = TestBus::new();
    bus.load(0x0400, &[0x02, 0xEA]); // undocumented opcode, then NOP
    let mut cpu = boot(&mut bus, 0x0400);
    let len = cpu.execute_one(&mut bus);
    assert_eq!(len, 0);
    assert_eq!(cpu.pc, 0x0401, "only the opcode byte is consumed");
    cpu.execute_one(&mut bus); // NOP executes normally afterwards
    assert_eq!(cpu.pc, 0x0402);
}

#[test]
fn maskable_irq_respects_interrupt_disable() {
    let mut bus = TestBus::new();
    bus.load(0x0400, &[0xEA, 0xEA]);
    bus.mem[0xFFFE] = 0x00;
    bus.mem[0xFFFF] = 0x06;
    let mut cpu = boot(&mut bus, 0x0400);
    cpu.execute_one(&mut bus); // reset leaves interrupts disabled

    cpu.request_irq(Interrupt::Normal);
    cpu.execute_one(&mut bus);
    assert_eq!(cpu.pc, 0x0402, "masked interrupt must not fire");
}

#[test]
fn nmi_fires_regardless_of_interrupt_disable() {
    let mut bus = TestBus::new();
    bus.load(0x0400, &[0xEA, 0xEA]);
    bus.load(0x0700, &[0xEA]);
    bus.mem[0xFFFA] = 0x00;
    bus.mem[0xFFFB] = 0x07;
    let mut cpu = boot(&mut bus, 0x0400);
    cpu.execute_one(&mut bus);

    cpu.request_irq(Interrupt::Nmi);
    cpu.execute_one(&mut bus);
    assert_eq!(cpu.pc & 0xFF00, 0x0700, "vector taken before the fetch");
}

#[test]
fn maskable_request_never_displaces_a_pending_nmi() {
    let mut bus = TestBus::new();
    bus.load(0x0400, &[0xEA]);
    bus.load(0x0700, &[0xEA]);
    bus.mem[0xFFFA] = 0x00;
    bus.mem[0xFFFB] = 0x07;
    bus.mem[0xFFFE] = 0x00;
    bus.mem[0xFFFF] = 0x06;
    let mut cpu = boot(&mut bus, 0x0400);
    cpu.execute_one(&mut bus);
    cpu.interrupt_disable = false;

    cpu.request_irq(Interrupt::Nmi);
    cpu.request_irq(Interrupt::Normal);
    cpu.execute_one(&mut bus);
    assert_eq!(cpu.pc & 0xFF00, 0x0700, "NMI survives a later maskable request");
}

#[test]
fn indexed_zero_page_wraps_within_the_page() {
    let mut bus = TestBus::new();
    bus.load(0x0400, &[0xB5, 0xF0]); // LDA $F0,X
    bus.mem[0x0010] = 0x77; // 0xF0 + 0x20 wraps to 0x10
    let mut cpu = boot(&mut bus, 0x0400);
    cpu.x = 0x20;
    cpu.execute_one(&mut bus);
    assert_eq!(cpu.a, 0x77);
}

#[test]
fn asl_memory_and_accumulator_forms() {
    let mut bus = TestBus::new();
    bus.load(0x0400, &[0x0A, 0x06, 0x10]); // ASL A, ASL $10
    bus.mem[0x0010] = 0x81;
    let mut cpu = boot(&mut bus, 0x0400);
    cpu.a = 0x81;
    cpu.execute_one(&mut bus);
    assert_eq!(cpu.a, 0x02);
    assert!(cpu.carry);
    cpu.execute_one(&mut bus);
    assert_eq!(bus.mem[0x0010], 0x02);
    assert!(cpu.carry);
}
