//! The 151 legal opcodes of the NMOS 6502.
//!
//! No undocumented/illegal opcodes and no 65C02 additions -- those opcode
//! slots are simply left unfilled in [`Mos6502::instruction_table`], so
//! fetching one halts the CPU with an unrecognized-opcode error rather than
//! emulating jam/kill behavior or silicon-specific combined operations.

use sixty502::{Bus, Byte, SimError, Word};

use crate::instruction::{InstructionSet, InstructionTable};
use crate::processor::addressing_mode::{
    AbsoluteX, AbsoluteY, Absolute, AddressingMode, Immediate, Indirect, IndirectX, IndirectY,
    ZeroPage, ZeroPageX, ZeroPageY,
};
use crate::processor::flags::Flags;
use crate::processor::cpu::{IRQ_VECTOR_HI, IRQ_VECTOR_LO};
use crate::processor::Cpu;

pub struct Mos6502;

fn set_nz<B: Bus>(cpu: &mut Cpu<B>, value: Byte) {
    cpu.p.set_zero(value == Byte::ZERO);
    cpu.p.set_signed(value.is_signed());
}

fn shift_left(value: Byte) -> (Byte, bool) {
    (value << 1, value.is_signed())
}

fn shift_right(value: Byte) -> (Byte, bool) {
    let carry_out = value.0 & 0x01 != 0;
    (value >> 1, carry_out)
}

fn rotate_left(value: Byte, carry_in: bool) -> (Byte, bool) {
    let carry_out = value.is_signed();
    let mut result = value << 1;
    if carry_in {
        result |= 0x01;
    }
    (result, carry_out)
}

fn rotate_right(value: Byte, carry_in: bool) -> (Byte, bool) {
    let carry_out = value.0 & 0x01 != 0;
    let mut result = value >> 1;
    if carry_in {
        result |= 0x80;
    }
    (result, carry_out)
}

/// Binary-mode ADC overflow: standard two's-complement formula.
fn binary_overflow(a: u8, operand: u8, result: u8) -> bool {
    (!(a ^ operand) & (a ^ result) & 0x80) != 0
}

/// Decimal-mode ADC/SBC still run this formula on the raw (pre-correction,
/// still BCD-packed) operands -- matching real NMOS silicon, whose overflow
/// flag in decimal mode comes from the ALU's binary adder before the BCD
/// correction logic runs, not from a decimal-aware computation.
fn add_with_carry<B: Bus>(cpu: &mut Cpu<B>, value: Byte) {
    let a = cpu.a.0;
    let v = value.0;
    let carry_in = u8::from(cpu.p.contains(Flags::Carry));

    if cpu.p.contains(Flags::DecimalMode) {
        let raw_sum = a.wrapping_add(v).wrapping_add(carry_in);
        let overflow = binary_overflow(a, v, raw_sum);

        let mut lo = i16::from(a & 0x0F) + i16::from(v & 0x0F) + i16::from(carry_in);
        let mut hi = i16::from(a >> 4) + i16::from(v >> 4);
        if lo > 9 {
            lo -= 10;
            hi += 1;
        }
        let carry_out = if hi > 9 {
            hi -= 10;
            true
        } else {
            false
        };
        let result = Byte((((hi as u8) << 4) | (lo as u8)) & 0xFF);

        cpu.p.set_overflow(overflow);
        cpu.p.set_carry(carry_out);
        set_nz(cpu, result);
        cpu.a = result;
    } else {
        let sum = u16::from(a) + u16::from(v) + u16::from(carry_in);
        let result = Byte(sum as u8);
        cpu.p.set_carry(sum > 0xFF);
        cpu.p.set_overflow(binary_overflow(a, v, result.0));
        set_nz(cpu, result);
        cpu.a = result;
    }
}

fn sub_with_borrow<B: Bus>(cpu: &mut Cpu<B>, value: Byte) {
    let a = cpu.a.0;
    let v = value.0;
    let borrow_in = i16::from(!cpu.p.contains(Flags::Carry));

    if cpu.p.contains(Flags::DecimalMode) {
        let raw_diff = (i16::from(a) - i16::from(v) - borrow_in) as u8;
        let overflow = ((a ^ v) & (a ^ raw_diff) & 0x80) != 0;

        let mut lo = i16::from(a & 0x0F) - i16::from(v & 0x0F) - borrow_in;
        let mut hi = i16::from(a >> 4) - i16::from(v >> 4);
        if lo < 0 {
            lo += 10;
            hi -= 1;
        }
        let carry_out = if hi < 0 {
            hi += 10;
            false
        } else {
            true
        };
        let result = Byte((((hi as u8) << 4) | (lo as u8)) & 0xFF);

        cpu.p.set_overflow(overflow);
        cpu.p.set_carry(carry_out);
        set_nz(cpu, result);
        cpu.a = result;
    } else {
        let diff = i16::from(a) - i16::from(v) - borrow_in;
        let result = Byte(diff as u8);
        cpu.p.set_carry(diff >= 0);
        cpu.p.set_overflow((a ^ v) & (a ^ result.0) & 0x80 != 0);
        set_nz(cpu, result);
        cpu.a = result;
    }
}

fn compare<B: Bus>(cpu: &mut Cpu<B>, register: Byte, operand: Byte) {
    let result = register - operand;
    cpu.p.set_carry(register >= operand);
    cpu.p.set_zero(register == operand);
    cpu.p.set_signed(result.is_signed());
}

fn branch<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B, taken: bool) -> Result<(), SimError> {
    let offset = bus.read(cpu.pc + 1)?;
    cpu.pc += 2u16;
    if taken {
        cpu.pc += offset.0 as i8;
    }
    Ok(())
}

// --- Load/store ---------------------------------------------------------

fn lda<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    cpu.a = value;
    set_nz(cpu, value);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn ldx<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    cpu.x = value;
    set_nz(cpu, value);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn ldy<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    cpu.y = value;
    set_nz(cpu, value);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn sta<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    bus.write(addr, cpu.a)?;
    cpu.pc += AM::BYTES;
    Ok(())
}

fn stx<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    bus.write(addr, cpu.x)?;
    cpu.pc += AM::BYTES;
    Ok(())
}

fn sty<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    bus.write(addr, cpu.y)?;
    cpu.pc += AM::BYTES;
    Ok(())
}

// --- Register transfers --------------------------------------------------

fn tax<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.x = cpu.a;
    set_nz(cpu, cpu.x);
    cpu.pc += 1u16;
    Ok(())
}

fn tay<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.y = cpu.a;
    set_nz(cpu, cpu.y);
    cpu.pc += 1u16;
    Ok(())
}

fn tsx<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.x = cpu.sp;
    set_nz(cpu, cpu.x);
    cpu.pc += 1u16;
    Ok(())
}

fn txa<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.a = cpu.x;
    set_nz(cpu, cpu.a);
    cpu.pc += 1u16;
    Ok(())
}

fn txs<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.sp = cpu.x;
    cpu.pc += 1u16;
    Ok(())
}

fn tya<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.a = cpu.y;
    set_nz(cpu, cpu.a);
    cpu.pc += 1u16;
    Ok(())
}

// --- Stack ----------------------------------------------------------------

fn pha<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    cpu.push(bus, cpu.a)?;
    cpu.pc += 1u16;
    Ok(())
}

fn php<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let pushed = cpu.p | Flags::Break | Flags::Expansion;
    cpu.push(bus, pushed.into())?;
    cpu.pc += 1u16;
    Ok(())
}

fn pla<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let value = cpu.pop(bus)?;
    cpu.a = value;
    set_nz(cpu, value);
    cpu.pc += 1u16;
    Ok(())
}

fn plp<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let value = cpu.pop(bus)?;
    cpu.p = cpu.p.pulled(Flags::from(value));
    cpu.pc += 1u16;
    Ok(())
}

// --- Shifts and rotates ----------------------------------------------------

fn asl<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    let (result, carry) = shift_left(value);
    bus.write(addr, result)?;
    cpu.p.set_carry(carry);
    set_nz(cpu, result);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn asl_a<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    let (result, carry) = shift_left(cpu.a);
    cpu.a = result;
    cpu.p.set_carry(carry);
    set_nz(cpu, result);
    cpu.pc += 1u16;
    Ok(())
}

fn lsr<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    let (result, carry) = shift_right(value);
    bus.write(addr, result)?;
    cpu.p.set_carry(carry);
    set_nz(cpu, result);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn lsr_a<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    let (result, carry) = shift_right(cpu.a);
    cpu.a = result;
    cpu.p.set_carry(carry);
    set_nz(cpu, result);
    cpu.pc += 1u16;
    Ok(())
}

fn rol<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    let (result, carry) = rotate_left(value, cpu.p.contains(Flags::Carry));
    bus.write(addr, result)?;
    cpu.p.set_carry(carry);
    set_nz(cpu, result);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn rol_a<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    let (result, carry) = rotate_left(cpu.a, cpu.p.contains(Flags::Carry));
    cpu.a = result;
    cpu.p.set_carry(carry);
    set_nz(cpu, result);
    cpu.pc += 1u16;
    Ok(())
}

fn ror<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    let (result, carry) = rotate_right(value, cpu.p.contains(Flags::Carry));
    bus.write(addr, result)?;
    cpu.p.set_carry(carry);
    set_nz(cpu, result);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn ror_a<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    let (result, carry) = rotate_right(cpu.a, cpu.p.contains(Flags::Carry));
    cpu.a = result;
    cpu.p.set_carry(carry);
    set_nz(cpu, result);
    cpu.pc += 1u16;
    Ok(())
}

// --- Logic and arithmetic --------------------------------------------------

fn and<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    cpu.a &= value;
    set_nz(cpu, cpu.a);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn ora<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    cpu.a |= value;
    set_nz(cpu, cpu.a);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn eor<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    cpu.a ^= value;
    set_nz(cpu, cpu.a);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn bit<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    cpu.p.set_zero((cpu.a & value) == Byte::ZERO);
    cpu.p.set_overflow(value.0 & 0x40 != 0);
    cpu.p.set_signed(value.is_signed());
    cpu.pc += AM::BYTES;
    Ok(())
}

fn adc<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    add_with_carry(cpu, value);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn sbc<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    sub_with_borrow(cpu, value);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn cmp<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    compare(cpu, cpu.a, value);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn cpx<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    compare(cpu, cpu.x, value);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn cpy<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)?;
    compare(cpu, cpu.y, value);
    cpu.pc += AM::BYTES;
    Ok(())
}

// --- Increment/decrement ----------------------------------------------------

fn dec<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)? - 1u8;
    bus.write(addr, value)?;
    set_nz(cpu, value);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn inc<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let addr = AM::fetch_address(cpu, bus)?;
    let value = bus.read(addr)? + 1u8;
    bus.write(addr, value)?;
    set_nz(cpu, value);
    cpu.pc += AM::BYTES;
    Ok(())
}

fn dex<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.x -= 1u8;
    set_nz(cpu, cpu.x);
    cpu.pc += 1u16;
    Ok(())
}

fn dey<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.y -= 1u8;
    set_nz(cpu, cpu.y);
    cpu.pc += 1u16;
    Ok(())
}

fn inx<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.x += 1u8;
    set_nz(cpu, cpu.x);
    cpu.pc += 1u16;
    Ok(())
}

fn iny<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.y += 1u8;
    set_nz(cpu, cpu.y);
    cpu.pc += 1u16;
    Ok(())
}

// --- Control flow -----------------------------------------------------------

fn jmp<AM: AddressingMode, B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    cpu.pc = AM::fetch_address(cpu, bus)?;
    Ok(())
}

fn jsr<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let target = Absolute::fetch_address(cpu, bus)?;
    let return_addr = cpu.pc + 2u16;
    cpu.push(bus, return_addr.hi())?;
    cpu.push(bus, return_addr.lo())?;
    cpu.pc = target;
    Ok(())
}

fn rts<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let lo = cpu.pop(bus)?;
    let hi = cpu.pop(bus)?;
    let addr: Word = (lo, hi).into();
    cpu.pc = addr + 1u16;
    Ok(())
}

fn brk<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let return_addr = cpu.pc + 2u16;
    cpu.push(bus, return_addr.hi())?;
    cpu.push(bus, return_addr.lo())?;
    let pushed = cpu.p | Flags::Break | Flags::Expansion;
    cpu.push(bus, pushed.into())?;
    cpu.p.set_interrupt_disabled(true);
    let lo = bus.read(IRQ_VECTOR_LO)?;
    let hi = bus.read(IRQ_VECTOR_HI)?;
    cpu.pc = (lo, hi).into();
    Ok(())
}

fn rti<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    let flags_byte = cpu.pop(bus)?;
    cpu.p = cpu.p.pulled(Flags::from(flags_byte));
    let lo = cpu.pop(bus)?;
    let hi = cpu.pop(bus)?;
    cpu.pc = (lo, hi).into();
    Ok(())
}

fn bcc<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    branch(cpu, bus, !cpu.p.contains(Flags::Carry))
}
fn bcs<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    branch(cpu, bus, cpu.p.contains(Flags::Carry))
}
fn beq<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    branch(cpu, bus, cpu.p.contains(Flags::Zero))
}
fn bmi<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    branch(cpu, bus, cpu.p.contains(Flags::Sign))
}
fn bne<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    branch(cpu, bus, !cpu.p.contains(Flags::Zero))
}
fn bpl<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    branch(cpu, bus, !cpu.p.contains(Flags::Sign))
}
fn bvc<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    branch(cpu, bus, !cpu.p.contains(Flags::Overflow))
}
fn bvs<B: Bus>(cpu: &mut Cpu<B>, bus: &mut B) -> Result<(), SimError> {
    branch(cpu, bus, cpu.p.contains(Flags::Overflow))
}

// --- Flag and no-op instructions --------------------------------------------

fn clc<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.p.set_carry(false);
    cpu.pc += 1u16;
    Ok(())
}
fn cld<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.p.set_decimal_mode(false);
    cpu.pc += 1u16;
    Ok(())
}
fn cli<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.p.set_interrupt_disabled(false);
    cpu.pc += 1u16;
    Ok(())
}
fn clv<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.p.set_overflow(false);
    cpu.pc += 1u16;
    Ok(())
}
fn sec<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.p.set_carry(true);
    cpu.pc += 1u16;
    Ok(())
}
fn sed<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.p.set_decimal_mode(true);
    cpu.pc += 1u16;
    Ok(())
}
fn sei<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.p.set_interrupt_disabled(true);
    cpu.pc += 1u16;
    Ok(())
}
fn nop<B: Bus>(cpu: &mut Cpu<B>, _bus: &mut B) -> Result<(), SimError> {
    cpu.pc += 1u16;
    Ok(())
}

impl InstructionSet for Mos6502 {
    fn instruction_table<B: Bus + 'static>() -> InstructionTable<B> {
        InstructionTable::new()
            // ADC
            .with(0x69, adc::<Immediate, B>)
            .with(0x65, adc::<ZeroPage, B>)
            .with(0x75, adc::<ZeroPageX, B>)
            .with(0x6D, adc::<Absolute, B>)
            .with(0x7D, adc::<AbsoluteX, B>)
            .with(0x79, adc::<AbsoluteY, B>)
            .with(0x61, adc::<IndirectX, B>)
            .with(0x71, adc::<IndirectY, B>)
            // AND
            .with(0x29, and::<Immediate, B>)
            .with(0x25, and::<ZeroPage, B>)
            .with(0x35, and::<ZeroPageX, B>)
            .with(0x2D, and::<Absolute, B>)
            .with(0x3D, and::<AbsoluteX, B>)
            .with(0x39, and::<AbsoluteY, B>)
            .with(0x21, and::<IndirectX, B>)
            .with(0x31, and::<IndirectY, B>)
            // ASL
            .with(0x0A, asl_a)
            .with(0x06, asl::<ZeroPage, B>)
            .with(0x16, asl::<ZeroPageX, B>)
            .with(0x0E, asl::<Absolute, B>)
            .with(0x1E, asl::<AbsoluteX, B>)
            // Branches
            .with(0x90, bcc)
            .with(0xB0, bcs)
            .with(0xF0, beq)
            .with(0x30, bmi)
            .with(0xD0, bne)
            .with(0x10, bpl)
            .with(0x50, bvc)
            .with(0x70, bvs)
            // BIT
            .with(0x24, bit::<ZeroPage, B>)
            .with(0x2C, bit::<Absolute, B>)
            // BRK
            .with(0x00, brk)
            // Clear flags
            .with(0x18, clc)
            .with(0xD8, cld)
            .with(0x58, cli)
            .with(0xB8, clv)
            // CMP
            .with(0xC9, cmp::<Immediate, B>)
            .with(0xC5, cmp::<ZeroPage, B>)
            .with(0xD5, cmp::<ZeroPageX, B>)
            .with(0xCD, cmp::<Absolute, B>)
            .with(0xDD, cmp::<AbsoluteX, B>)
            .with(0xD9, cmp::<AbsoluteY, B>)
            .with(0xC1, cmp::<IndirectX, B>)
            .with(0xD1, cmp::<IndirectY, B>)
            // CPX / CPY
            .with(0xE0, cpx::<Immediate, B>)
            .with(0xE4, cpx::<ZeroPage, B>)
            .with(0xEC, cpx::<Absolute, B>)
            .with(0xC0, cpy::<Immediate, B>)
            .with(0xC4, cpy::<ZeroPage, B>)
            .with(0xCC, cpy::<Absolute, B>)
            // DEC / DEX / DEY
            .with(0xC6, dec::<ZeroPage, B>)
            .with(0xD6, dec::<ZeroPageX, B>)
            .with(0xCE, dec::<Absolute, B>)
            .with(0xDE, dec::<AbsoluteX, B>)
            .with(0xCA, dex)
            .with(0x88, dey)
            // EOR
            .with(0x49, eor::<Immediate, B>)
            .with(0x45, eor::<ZeroPage, B>)
            .with(0x55, eor::<ZeroPageX, B>)
            .with(0x4D, eor::<Absolute, B>)
            .with(0x5D, eor::<AbsoluteX, B>)
            .with(0x59, eor::<AbsoluteY, B>)
            .with(0x41, eor::<IndirectX, B>)
            .with(0x51, eor::<IndirectY, B>)
            // INC / INX / INY
            .with(0xE6, inc::<ZeroPage, B>)
            .with(0xF6, inc::<ZeroPageX, B>)
            .with(0xEE, inc::<Absolute, B>)
            .with(0xFE, inc::<AbsoluteX, B>)
            .with(0xE8, inx)
            .with(0xC8, iny)
            // JMP / JSR
            .with(0x4C, jmp::<Absolute, B>)
            .with(0x6C, jmp::<Indirect, B>)
            .with(0x20, jsr)
            // LDA
            .with(0xA9, lda::<Immediate, B>)
            .with(0xA5, lda::<ZeroPage, B>)
            .with(0xB5, lda::<ZeroPageX, B>)
            .with(0xAD, lda::<Absolute, B>)
            .with(0xBD, lda::<AbsoluteX, B>)
            .with(0xB9, lda::<AbsoluteY, B>)
            .with(0xA1, lda::<IndirectX, B>)
            .with(0xB1, lda::<IndirectY, B>)
            // LDX
            .with(0xA2, ldx::<Immediate, B>)
            .with(0xA6, ldx::<ZeroPage, B>)
            .with(0xB6, ldx::<ZeroPageY, B>)
            .with(0xAE, ldx::<Absolute, B>)
            .with(0xBE, ldx::<AbsoluteY, B>)
            // LDY
            .with(0xA0, ldy::<Immediate, B>)
            .with(0xA4, ldy::<ZeroPage, B>)
            .with(0xB4, ldy::<ZeroPageX, B>)
            .with(0xAC, ldy::<Absolute, B>)
            .with(0xBC, ldy::<AbsoluteX, B>)
            // LSR
            .with(0x4A, lsr_a)
            .with(0x46, lsr::<ZeroPage, B>)
            .with(0x56, lsr::<ZeroPageX, B>)
            .with(0x4E, lsr::<Absolute, B>)
            .with(0x5E, lsr::<AbsoluteX, B>)
            // NOP
            .with(0xEA, nop)
            // ORA
            .with(0x09, ora::<Immediate, B>)
            .with(0x05, ora::<ZeroPage, B>)
            .with(0x15, ora::<ZeroPageX, B>)
            .with(0x0D, ora::<Absolute, B>)
            .with(0x1D, ora::<AbsoluteX, B>)
            .with(0x19, ora::<AbsoluteY, B>)
            .with(0x01, ora::<IndirectX, B>)
            .with(0x11, ora::<IndirectY, B>)
            // Stack
            .with(0x48, pha)
            .with(0x08, php)
            .with(0x68, pla)
            .with(0x28, plp)
            // ROL
            .with(0x2A, rol_a)
            .with(0x26, rol::<ZeroPage, B>)
            .with(0x36, rol::<ZeroPageX, B>)
            .with(0x2E, rol::<Absolute, B>)
            .with(0x3E, rol::<AbsoluteX, B>)
            // ROR
            .with(0x6A, ror_a)
            .with(0x66, ror::<ZeroPage, B>)
            .with(0x76, ror::<ZeroPageX, B>)
            .with(0x6E, ror::<Absolute, B>)
            .with(0x7E, ror::<AbsoluteX, B>)
            // RTI / RTS
            .with(0x40, rti)
            .with(0x60, rts)
            // SBC
            .with(0xE9, sbc::<Immediate, B>)
            .with(0xE5, sbc::<ZeroPage, B>)
            .with(0xF5, sbc::<ZeroPageX, B>)
            .with(0xED, sbc::<Absolute, B>)
            .with(0xFD, sbc::<AbsoluteX, B>)
            .with(0xF9, sbc::<AbsoluteY, B>)
            .with(0xE1, sbc::<IndirectX, B>)
            .with(0xF1, sbc::<IndirectY, B>)
            // Set flags
            .with(0x38, sec)
            .with(0xF8, sed)
            .with(0x78, sei)
            // STA
            .with(0x85, sta::<ZeroPage, B>)
            .with(0x95, sta::<ZeroPageX, B>)
            .with(0x8D, sta::<Absolute, B>)
            .with(0x9D, sta::<AbsoluteX, B>)
            .with(0x99, sta::<AbsoluteY, B>)
            .with(0x81, sta::<IndirectX, B>)
            .with(0x91, sta::<IndirectY, B>)
            // STX / STY
            .with(0x86, stx::<ZeroPage, B>)
            .with(0x96, stx::<ZeroPageY, B>)
            .with(0x8E, stx::<Absolute, B>)
            .with(0x84, sty::<ZeroPage, B>)
            .with(0x94, sty::<ZeroPageX, B>)
            .with(0x8C, sty::<Absolute, B>)
            // Register transfers
            .with(0xAA, tax)
            .with(0xA8, tay)
            .with(0xBA, tsx)
            .with(0x8A, txa)
            .with(0x9A, txs)
            .with(0x98, tya)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::cpu::{RESET_VECTOR_LO, Cpu};
    use sixty502::MemoryBus;

    fn cpu_at(bus: &mut MemoryBus, pc: Word) -> Cpu<MemoryBus> {
        bus.load_raw(RESET_VECTOR_LO, &[pc.lo().0, pc.hi().0]);
        let mut cpu: Cpu<MemoryBus> = Cpu::with_instruction_set::<Mos6502>();
        cpu.reset(bus).unwrap();
        cpu
    }

    #[test]
    fn adc_sets_overflow_and_sign_on_signed_overflow() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0x69, 0x01]); // ADC #$01
        let mut cpu = cpu_at(&mut bus, Word(0x8000));
        cpu.a = Byte(0x7F);

        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, Byte(0x80));
        assert!(cpu.p.contains(Flags::Overflow));
        assert!(cpu.p.contains(Flags::Sign));
    }

    #[test]
    fn adc_carry_out_without_signed_overflow() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0x69, 0xFF]); // ADC #$FF
        let mut cpu = cpu_at(&mut bus, Word(0x8000));
        cpu.a = Byte(0x80);

        cpu.step(&mut bus).unwrap();

        assert!(cpu.p.contains(Flags::Carry));
        assert!(cpu.p.contains(Flags::Overflow));
        assert!(!cpu.p.contains(Flags::Sign));
    }

    #[test]
    fn adc_decimal_mode_wraps_past_ninety_nine() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0x69, 0x01]); // ADC #$01
        let mut cpu = cpu_at(&mut bus, Word(0x8000));
        cpu.a = Byte(0x99);
        cpu.p.set_decimal_mode(true);

        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, Byte(0x00));
        assert!(cpu.p.contains(Flags::Carry));
    }

    #[test]
    fn adc_decimal_mode_below_hundred_clears_carry() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0x69, 0x01]); // ADC #$01
        let mut cpu = cpu_at(&mut bus, Word(0x8000));
        cpu.a = Byte(0x09);
        cpu.p.set_decimal_mode(true);

        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, Byte(0x10));
        assert!(!cpu.p.contains(Flags::Carry));
    }

    #[test]
    fn sbc_binary_borrow_wraps_and_sets_sign() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0xE9, 0x01]); // SBC #$01
        let mut cpu = cpu_at(&mut bus, Word(0x8000));
        cpu.a = Byte(0x00);
        cpu.p.set_carry(true);

        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, Byte(0xFF));
        assert!(!cpu.p.contains(Flags::Carry));
        assert!(cpu.p.contains(Flags::Sign));
    }

    #[test]
    fn cmp_equal_sets_zero_and_carry_without_sign() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0xC9, 0x40]); // CMP #$40
        let mut cpu = cpu_at(&mut bus, Word(0x8000));
        cpu.a = Byte(0x40);

        cpu.step(&mut bus).unwrap();

        assert!(cpu.p.contains(Flags::Zero));
        assert!(cpu.p.contains(Flags::Carry));
        assert!(!cpu.p.contains(Flags::Sign));
    }

    #[test]
    fn branch_forward_displacement_sign_extends() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x1000), &[0x10, 0x7F]); // BPL +$7F
        let mut cpu = cpu_at(&mut bus, Word(0x1000));

        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.pc, Word(0x1081));
    }

    #[test]
    fn branch_backward_displacement_sign_extends() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x1000), &[0x10, 0xFF]); // BPL -$01
        let mut cpu = cpu_at(&mut bus, Word(0x1000));

        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.pc, Word(0x1001));
    }

    #[test]
    fn indirect_jmp_reproduces_page_wrap_bug() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x10FF), &[0x00]);
        bus.load_raw(Word(0x1000), &[0x80]); // high byte wraps back to start of page
        bus.load_raw(Word(0x0200), &[0x6C, 0xFF, 0x10]); // JMP ($10FF)
        let mut cpu = cpu_at(&mut bus, Word(0x0200));

        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.pc, Word(0x8000));
    }

    #[test]
    fn pha_pla_round_trips_accumulator() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0x48, 0x68]); // PHA; PLA
        let mut cpu = cpu_at(&mut bus, Word(0x8000));
        cpu.a = Byte(0x42);

        cpu.step(&mut bus).unwrap();
        cpu.a = Byte(0x00);
        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, Byte(0x42));
    }

    #[test]
    fn php_plp_round_trips_condition_bits_and_forces_expansion() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0x08, 0x28]); // PHP; PLP
        let mut cpu = cpu_at(&mut bus, Word(0x8000));
        cpu.p = Flags::Sign | Flags::Overflow | Flags::Zero | Flags::Carry;

        cpu.step(&mut bus).unwrap();
        cpu.p = Flags::empty();
        cpu.step(&mut bus).unwrap();

        assert!(cpu.p.contains(Flags::Sign | Flags::Overflow | Flags::Zero | Flags::Carry));
        assert!(cpu.p.contains(Flags::Expansion));
        assert!(!cpu.p.contains(Flags::Break));
    }

    #[test]
    fn plp_leaves_the_cpus_own_break_bit_untouched() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0x08, 0x28]); // PHP; PLP
        let mut cpu = cpu_at(&mut bus, Word(0x8000));
        cpu.p = Flags::Break;

        cpu.step(&mut bus).unwrap(); // pushes P with Break forced to 1
        cpu.p = Flags::Break; // B was never really clearable to begin with
        cpu.step(&mut bus).unwrap();

        assert!(cpu.p.contains(Flags::Break));
    }
}
