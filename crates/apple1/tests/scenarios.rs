//! End-to-end scenarios against a full `Apple1` machine: CPU, Apple 1 memory
//! map, and a scripted `Terminal`, exercised together rather than unit by
//! unit.


use apple1::{Flags, StepOutcome};
use sixty502::{Bus, Byte, Word};

#[test]
fn wozmon_image_keeps_pc_inside_its_rom_range_for_fifty_steps() {
    let mut machine = fixture::machine();
    machine.bus_mut().load_wozmon_rom(&[0xEA; 256]); // stand-in image: NOPs, correct size
    machine.bus_mut().load_ram(Word(0xFFFC), &[0x00, 0xFF]); // reset vector -> $FF00
    machine.reset().unwrap();

    for _ in 0..50 {
        machine.step().unwrap();
    }

    assert!((0xFF00..=0xFFFF).contains(&machine.cpu.pc.0));
}

#[test]
fn lda_immediate_then_sta_display_emits_the_character_and_mirrors_it() {
    // LDA #$42; STA $D012; BRK
    let mut machine = fixture::machine_with_program(Word(0x0200), &[0xA9, 0x42, 0x8D, 0x12, 0xD0, 0x00]);

    machine.step().unwrap(); // LDA
    machine.step().unwrap(); // STA

    assert_eq!(machine.cpu.a, Byte(0x42));
    assert_eq!(machine.bus.display_mirror(), Byte(0x42));
    assert_eq!(machine.bus.terminal().output(), b"B");
}

#[test]
fn bcd_adc_of_nine_plus_one_rolls_to_ten_with_carry_clear() {
    // LDA #$09; ADC #$01; BRK, with D=1, C=0 going in.
    let mut machine = fixture::machine_with_program(Word(0x0200), &[0xA9, 0x09, 0x69, 0x01, 0x00]);
    machine.cpu.p.set_decimal_mode(true);
    machine.cpu.p.set_carry(false);

    machine.step().unwrap(); // LDA
    machine.step().unwrap(); // ADC

    assert_eq!(machine.cpu.a, Byte(0x10));
    assert!(!machine.cpu.p.contains(Flags::Carry));
}

#[test]
fn jmp_absolute_to_its_own_address_leaves_pc_unmoved() {
    // JMP $0200, deposited at $0200 itself.
    let mut machine = fixture::machine_with_program(Word(0x0200), &[0x4C, 0x00, 0x02]);

    machine.step().unwrap();

    assert_eq!(machine.cpu.pc, Word(0x0200));
}

#[test]
fn dex_loop_with_branch_counts_down_to_brk_with_x_zero() {
    // LDX #$03; loop: DEX; BNE loop; BRK
    let mut machine = fixture::machine_with_program(Word(0x0200), &[0xA2, 0x03, 0xCA, 0xD0, 0xFD, 0x00]);

    fixture::run_until_brk(&mut machine, 32);

    assert_eq!(machine.cpu.x, Byte::ZERO);
    assert!(machine.cpu.p.contains(Flags::Zero));
}

#[test]
fn indirect_jmp_pointer_on_a_page_boundary_wraps_the_high_byte_fetch() {
    let mut machine = fixture::machine();
    machine.bus_mut().load_ram(Word(0x03FF), &[0x78]); // pointer low byte, at the page's last address
    machine.bus_mut().load_ram(Word(0x0300), &[0x56]); // high byte wraps here instead of $0400
    machine.bus_mut().load_ram(Word(0x0200), &[0x6C, 0xFF, 0x03]); // JMP ($03FF)
    machine.bus_mut().load_ram(Word(0xFFFC), &[0x00, 0x02]);
    machine.reset().unwrap();

    let outcome = machine.step().unwrap();

    assert_eq!(outcome, StepOutcome::Executed);
    assert_eq!(machine.cpu.pc, Word(0x5678));
}
