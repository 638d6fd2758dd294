//! 6502 CPU implementation: registers, reset, and the step loop.

use alloc::collections::BTreeSet;
use core::fmt;

use sixty502::{Bus, InterruptTag, SimError, Word};

use crate::instruction::mos6502::Mos6502;
use crate::instruction::{InstructionSet, InstructionTable};
use crate::processor::flags::Flags;

/// IRQ/BRK vector low byte address.
pub const IRQ_VECTOR_LO: Word = Word(0xFFFE);
/// IRQ/BRK vector high byte address.
pub const IRQ_VECTOR_HI: Word = Word(0xFFFF);
/// RESET vector low byte address.
pub const RESET_VECTOR_LO: Word = Word(0xFFFC);
/// RESET vector high byte address.
pub const RESET_VECTOR_HI: Word = Word(0xFFFD);
/// Start of stack space (the 6502 stack grows downward from `$01FF` to `$0100`).
pub const STACK_SPACE_START: Word = Word(0x0100);

/// What happened on the most recent [`Cpu::step`] call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction executed and `pc` advanced.
    Executed,
    /// The bus requested a reset; `I` was set and `pc` was reloaded from
    /// the reset vector. No instruction executed; every other register
    /// is unchanged.
    Reset,
    /// The CPU is halted (via a `HLT` interrupt tag or an unrecognized
    /// opcode) and did nothing.
    Halted,
    /// `pc` sits on an armed breakpoint. The CPU stopped without
    /// executing; calling `step` again at the same `pc` disarms it for
    /// this visit and executes normally.
    Breakpoint,
}

/// The 6502 CPU: registers, status flags, breakpoints, and an instruction
/// dispatch table, generic over whatever [`Bus`] backs its address space.
pub struct Cpu<B: Bus> {
    pub a: sixty502::Byte,
    pub x: sixty502::Byte,
    pub y: sixty502::Byte,
    pub p: Flags,
    /// Stack pointer; the actual stack lives at `0x0100 + sp`.
    pub sp: sixty502::Byte,
    pub pc: Word,
    pub halted: bool,
    /// Opcode fetched by the most recent `step` call, including ones that
    /// failed to decode.
    pub last_opcode: sixty502::Byte,
    breakpoints: BTreeSet<Word>,
    /// The breakpoint address the CPU is currently parked on, or `None`.
    /// See [`StepOutcome::Breakpoint`] for the two-visit protocol this drives.
    armed_breakpoint: Option<Word>,
    table: InstructionTable<B>,
}

impl<B: Bus> fmt::Debug for Cpu<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu")
            .field("a", &self.a)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("p", &self.p)
            .field("sp", &self.sp)
            .field("pc", &self.pc)
            .field("halted", &self.halted)
            .field("last_opcode", &self.last_opcode)
            .finish_non_exhaustive()
    }
}

impl<B: Bus + 'static> Cpu<B> {
    /// Builds a CPU with all registers zeroed, the given instruction set.
    /// Call [`reset`](Self::reset) to set `I` and load `pc` from the reset
    /// vector before stepping.
    #[must_use]
    pub fn with_instruction_set<S: InstructionSet>() -> Self {
        Self {
            a: sixty502::Byte::ZERO,
            x: sixty502::Byte::ZERO,
            y: sixty502::Byte::ZERO,
            p: Flags::empty(),
            sp: sixty502::Byte::ZERO,
            pc: Word::ZERO,
            halted: false,
            last_opcode: sixty502::Byte::ZERO,
            breakpoints: BTreeSet::new(),
            armed_breakpoint: None,
            table: S::instruction_table::<B>(),
        }
    }

    /// Sets the interrupt-disable flag and reloads `pc` from the reset
    /// vector at `$FFFC`/`$FFFD`. Mirrors the hardware RESET line: every
    /// other register and flag bit is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset vector itself can't be read.
    pub fn reset(&mut self, bus: &mut B) -> Result<(), SimError> {
        self.p.set_interrupt_disabled(true);
        self.halted = false;
        self.armed_breakpoint = None;
        let lo = bus.read(RESET_VECTOR_LO)?;
        let hi = bus.read(RESET_VECTOR_HI)?;
        self.pc = (lo, hi).into();
        Ok(())
    }

    /// Arms a breakpoint at `addr`. `step` will stop (without executing)
    /// the first time `pc` lands there.
    pub fn set_breakpoint(&mut self, addr: Word) {
        self.breakpoints.insert(addr);
    }

    /// Removes a single breakpoint, if present.
    pub fn remove_breakpoint(&mut self, addr: Word) {
        self.breakpoints.remove(&addr);
        if self.armed_breakpoint == Some(addr) {
            self.armed_breakpoint = None;
        }
    }

    /// Removes every breakpoint.
    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
        self.armed_breakpoint = None;
    }

    #[must_use]
    pub fn breakpoints(&self) -> &BTreeSet<Word> {
        &self.breakpoints
    }

    /// Executes one step: services a pending bus interrupt, honors an
    /// armed breakpoint, or fetches and dispatches the next opcode.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus rejects a read/write the instruction
    /// needed, if the fetched opcode has no table entry, or if the bus
    /// raised an interrupt tag this CPU doesn't implement servicing for.
    pub fn step(&mut self, bus: &mut B) -> Result<StepOutcome, SimError> {
        if self.halted {
            return Err(SimError::Halted);
        }

        if let Some(tag) = bus.take_interrupt() {
            return match tag {
                InterruptTag::Reset => {
                    self.reset(bus)?;
                    Ok(StepOutcome::Reset)
                }
                InterruptTag::Halt => {
                    self.halted = true;
                    Ok(StepOutcome::Halted)
                }
                InterruptTag::Irq | InterruptTag::Nmi => {
                    Err(SimError::UnimplementedInterrupt(tag.name()))
                }
            };
        }

        if self.breakpoints.contains(&self.pc) {
            if self.armed_breakpoint != Some(self.pc) {
                self.armed_breakpoint = Some(self.pc);
                return Ok(StepOutcome::Breakpoint);
            }
            self.armed_breakpoint = None;
        }

        let pc_at_fetch = self.pc;
        let opcode = bus.read(self.pc)?;
        self.last_opcode = opcode;

        match self.table[usize::from(opcode)] {
            Some(execute) => {
                execute(self, bus)?;
                Ok(StepOutcome::Executed)
            }
            None => {
                self.halted = true;
                Err(SimError::UnrecognizedOpcode(opcode, pc_at_fetch))
            }
        }
    }

    /// Pushes `val` onto the stack; `sp` is decremented afterward.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack page isn't writable.
    pub fn push(&mut self, bus: &mut B, val: sixty502::Byte) -> Result<(), SimError> {
        let addr = STACK_SPACE_START + self.sp;
        bus.write(addr, val)?;
        self.sp -= 1u8;
        Ok(())
    }

    /// Pops a byte from the stack; `sp` is incremented first.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack page isn't readable.
    pub fn pop(&mut self, bus: &mut B) -> Result<sixty502::Byte, SimError> {
        self.sp += 1u8;
        let addr = STACK_SPACE_START + self.sp;
        bus.read(addr)
    }
}

impl<B: Bus + 'static> Default for Cpu<B> {
    fn default() -> Self {
        Self::with_instruction_set::<Mos6502>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::mos6502::Mos6502;
    use sixty502::{Byte, MemoryBus};

    fn prepare_cpu(bus: &mut MemoryBus) -> Cpu<MemoryBus> {
        bus.load_raw(RESET_VECTOR_LO, &[0x00, 0x80]);
        let mut cpu: Cpu<MemoryBus> = Cpu::with_instruction_set::<Mos6502>();
        cpu.reset(bus).unwrap();
        cpu
    }

    #[test]
    fn reset_loads_pc_from_vector_and_sets_interrupt_disable() {
        let mut bus = MemoryBus::new(true);
        let cpu = prepare_cpu(&mut bus);

        assert_eq!(cpu.pc, Word(0x8000));
        assert!(cpu.p.contains(Flags::InterruptDisabled));
        assert_eq!(cpu.sp, Byte::ZERO);
    }

    #[test]
    fn nop_advances_pc_by_one() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0xEA]);
        let mut cpu = prepare_cpu(&mut bus);

        let outcome = cpu.step(&mut bus).unwrap();

        assert_eq!(outcome, StepOutcome::Executed);
        assert_eq!(cpu.pc, Word(0x8001));
    }

    #[test]
    fn unrecognized_opcode_halts_and_reports_error() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0x02]); // not a legal opcode
        let mut cpu = prepare_cpu(&mut bus);

        let err = cpu.step(&mut bus).unwrap_err();

        assert_eq!(err, SimError::UnrecognizedOpcode(Byte(0x02), Word(0x8000)));
        assert!(cpu.halted);
        assert_eq!(cpu.step(&mut bus).unwrap_err(), SimError::Halted);
    }

    #[test]
    fn breakpoint_halts_once_then_executes_on_second_step() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0xEA, 0xEA]);
        let mut cpu = prepare_cpu(&mut bus);
        cpu.set_breakpoint(Word(0x8000));

        assert_eq!(cpu.step(&mut bus).unwrap(), StepOutcome::Breakpoint);
        assert_eq!(cpu.pc, Word(0x8000));

        assert_eq!(cpu.step(&mut bus).unwrap(), StepOutcome::Executed);
        assert_eq!(cpu.pc, Word(0x8001));
    }

    #[test]
    fn reset_interrupt_tag_reinitializes_cpu_mid_run() {
        let mut bus = MemoryBus::new(true);
        bus.load_raw(Word(0x8000), &[0xA9, 0x42]); // LDA #$42
        let mut cpu = prepare_cpu(&mut bus);

        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.a, Byte(0x42));

        bus.request_interrupt(InterruptTag::Reset);
        let outcome = cpu.step(&mut bus).unwrap();

        assert_eq!(outcome, StepOutcome::Reset);
        assert_eq!(cpu.a, Byte(0x42)); // reset only sets I and reloads pc; A is untouched
        assert_eq!(cpu.pc, Word(0x8000));
    }
}
