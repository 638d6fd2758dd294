//! Errors surfaced by a [`Bus`](crate::bus::Bus) or a CPU driving one.
//!
//! Draws a line between a simulated-system fault the caller can recover
//! from and a host-level panic: every variant here is something a CPU
//! `step` can legitimately hit and hand back to its caller instead of
//! unwinding.

use core::fmt;

use crate::byte::Byte;
use crate::word::Word;

/// A recoverable fault raised while reading, writing, or decoding on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// `step` was called again after the CPU already halted.
    Halted,
    /// A read targeted an address with no backing device (Apple 1's unused
    /// `$8000-$DFFF` range, for example).
    UnmappedRead(Word),
    /// A write targeted an address that isn't writeable (ROM, or unmapped space).
    ReadOnlyAddress(Word),
    /// The opcode fetched at `pc` has no entry in the instruction table.
    UnrecognizedOpcode(Byte, Word),
    /// An interrupt tag was requested that the CPU does not implement yet.
    UnimplementedInterrupt(&'static str),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Halted => write!(f, "step called on a halted CPU"),
            SimError::UnmappedRead(addr) => {
                write!(f, "read from unmapped address {:#06x}", addr.0)
            }
            SimError::ReadOnlyAddress(addr) => {
                write!(f, "write to read-only address {:#06x}", addr.0)
            }
            SimError::UnrecognizedOpcode(opcode, pc) => {
                write!(f, "unrecognized opcode {:#04x} at {:#06x}", opcode.0, pc.0)
            }
            SimError::UnimplementedInterrupt(tag) => {
                write!(f, "interrupt tag '{tag}' is not implemented")
            }
        }
    }
}
