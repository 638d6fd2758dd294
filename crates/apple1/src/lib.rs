//! A cycle-approximate MOS 6502 emulator wired to an Apple 1 memory map:
//! RAM, BASIC and WozMon ROM, and the keyboard/display registers at
//! `$D010`-`$D013`.
//!
//! ```
//! use apple1::{Apple1, StepOutcome};
//! use apple1::terminal::RecordingTerminal;
//!
//! let mut machine = Apple1::new(RecordingTerminal::new());
//! machine.bus_mut().load_wozmon_rom(&[0xEA; 256]);
//! machine.reset().unwrap();
//! assert_eq!(machine.step().unwrap(), StepOutcome::Executed);
//! ```

#![no_std]

extern crate alloc;

pub mod instruction;
pub mod processor;
pub mod system_bus;
pub mod terminal;

pub use processor::{Cpu, Flags, StepOutcome};
pub use system_bus::SystemBus;
pub use terminal::Terminal;

use instruction::mos6502::Mos6502;
use sixty502::{SimError, Word};

/// An assembled Apple 1: a 6502 CPU driving a [`SystemBus`].
///
/// Thin by design -- everything interesting lives on `cpu` and `bus`, which
/// remain directly accessible. This wrapper exists only to keep the pair
/// moving in lockstep through reset and stepping.
pub struct Apple1<T: Terminal> {
    pub cpu: Cpu<SystemBus<T>>,
    pub bus: SystemBus<T>,
}

impl<T: Terminal + 'static> Apple1<T> {
    #[must_use]
    pub fn new(terminal: T) -> Self {
        Self {
            cpu: Cpu::with_instruction_set::<Mos6502>(),
            bus: SystemBus::new(terminal),
        }
    }

    #[must_use]
    pub fn bus_mut(&mut self) -> &mut SystemBus<T> {
        &mut self.bus
    }

    /// Sets the interrupt-disable flag and reloads `pc` from the reset
    /// vector, the same way pulling the Apple 1's RESET line would. Every
    /// other register is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset vector itself can't be read (the
    /// WozMon ROM hasn't been loaded, typically).
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.cpu.reset(&mut self.bus)
    }

    /// Executes a single CPU step.
    ///
    /// # Errors
    ///
    /// See [`Cpu::step`].
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        self.cpu.step(&mut self.bus)
    }

    /// Steps until `bound` steps have executed or the CPU halts, whichever
    /// comes first. Returns the number of steps actually taken.
    ///
    /// # Errors
    ///
    /// Returns the first error a step raises; steps already taken still
    /// count toward the returned total up to that point.
    pub fn run(&mut self, bound: usize) -> Result<usize, SimError> {
        for taken in 0..bound {
            match self.step()? {
                StepOutcome::Halted => return Ok(taken),
                _ => continue,
            }
        }
        Ok(bound)
    }

    pub fn set_breakpoint(&mut self, addr: Word) {
        self.cpu.set_breakpoint(addr);
    }
}
