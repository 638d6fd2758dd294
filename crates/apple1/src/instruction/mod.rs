//! Instruction dispatch table: a 256-entry array of optional opcode handlers.
//!
//! Unlike a full NMOS decode table, slots for illegal/undocumented opcodes
//! are left empty -- fetching one halts the CPU with
//! [`sixty502::SimError::UnrecognizedOpcode`] instead of emulating
//! jam/kill or the undocumented combined operations real silicon performs.

pub mod mos6502;

use sixty502::{Bus, SimError};

use crate::processor::Cpu;

/// An opcode handler: mutates the CPU/bus and advances `pc` itself.
pub type ExecuteFn<B> = fn(&mut Cpu<B>, &mut B) -> Result<(), SimError>;

/// A 256-entry jump table indexed by opcode byte.
pub struct InstructionTable<B: Bus>([Option<ExecuteFn<B>>; 256]);

impl<B: Bus> InstructionTable<B> {
    #[must_use]
    pub const fn new() -> Self {
        InstructionTable([None; 256])
    }

    #[must_use]
    pub const fn with(mut self, opcode: u8, execute: ExecuteFn<B>) -> Self {
        self.0[opcode as usize] = Some(execute);
        self
    }
}

impl<B: Bus> core::ops::Index<usize> for InstructionTable<B> {
    type Output = Option<ExecuteFn<B>>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// A complete (or partial) set of 6502-family opcodes, built once as a
/// const table and specialized per [`Bus`] implementation at instantiation.
pub trait InstructionSet {
    fn instruction_table<B: Bus + 'static>() -> InstructionTable<B>;
}
