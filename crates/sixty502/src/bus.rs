//! The memory bus a CPU drives: reads, writes, an interrupt mailbox, and a
//! handful of ROM/data loaders.
//!
//! [`MemoryBus`] is a flat, fully-addressable 64KB RAM with per-byte
//! readable/writable permission bits, the base every concrete memory map
//! narrows down from. A concrete system (Apple 1, say) narrows those
//! permissions and layers I/O register behavior on top; see the `apple1`
//! crate's `SystemBus`.

use alloc::vec;
use alloc::vec::Vec;

use crate::byte::Byte;
use crate::error::SimError;
use crate::word::Word;

const MEMORY_SIZE: usize = 0x1_0000;

/// A pending request for the CPU to service on its next `step`.
///
/// A closed set: `Irq` and `Nmi` are valid tags a bus can raise, but the CPU
/// in this crate only actually services `Reset` and `Halt` -- anything else
/// surfaces as [`SimError::UnimplementedInterrupt`] rather than being
/// silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptTag {
    Reset,
    Halt,
    Irq,
    Nmi,
}

impl InterruptTag {
    pub(crate) fn name(self) -> &'static str {
        match self {
            InterruptTag::Reset => "RES",
            InterruptTag::Halt => "HLT",
            InterruptTag::Irq => "IRQ",
            InterruptTag::Nmi => "NMI",
        }
    }
}

/// The contract a CPU needs from whatever backs its address space.
///
/// Deliberately thin: a `Bus` is just reads, writes, and an interrupt
/// mailbox. Everything else -- keyboards, displays, delay, ROM loading -- is
/// a property of a specific implementation, not of the trait.
pub trait Bus {
    fn read(&mut self, addr: Word) -> Result<Byte, SimError>;
    fn write(&mut self, addr: Word, value: Byte) -> Result<(), SimError>;

    /// Raise an interrupt tag for the CPU to notice on its next `step`.
    ///
    /// A second call before the CPU consumes the first overwrites it --
    /// there is only one mailbox slot, matching real open-collector IRQ
    /// lines where only "pending or not" is preserved, not a count.
    fn request_interrupt(&mut self, tag: InterruptTag);

    /// Take and clear whatever interrupt tag is pending, if any.
    fn take_interrupt(&mut self) -> Option<InterruptTag>;
}

/// A flat 64KB memory with per-address readable/writable permission bits.
///
/// By default every address is both readable and writable; a concrete
/// system narrows that down to the ranges its own memory map allows.
pub struct MemoryBus {
    mem: Vec<Byte>,
    readable: Vec<bool>,
    writable: Vec<bool>,
    /// When `true`, out-of-permission accesses return `Err`. When `false`,
    /// reads of unreadable addresses yield `Byte::ZERO` and writes to
    /// read-only addresses are silently dropped.
    pub strict: bool,
    interrupt: Option<InterruptTag>,
}

impl MemoryBus {
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            mem: vec![Byte::ZERO; MEMORY_SIZE],
            readable: vec![true; MEMORY_SIZE],
            writable: vec![true; MEMORY_SIZE],
            strict,
            interrupt: None,
        }
    }

    /// Marks `[start, end)` as readable or not. Used by overlays (like an
    /// Apple 1 memory map) to carve out unused address ranges.
    pub fn set_readable(&mut self, start: Word, end: Word, readable: bool) {
        for addr in start.as_usize()..end.as_usize() {
            self.readable[addr] = readable;
        }
    }

    /// Marks `[start, end)` as writable or not. Used to install ROM regions.
    pub fn set_writable(&mut self, start: Word, end: Word, writable: bool) {
        for addr in start.as_usize()..end.as_usize() {
            self.writable[addr] = writable;
        }
    }

    fn peek(&self, addr: Word) -> Byte {
        self.mem[addr.as_usize()]
    }

    /// Writes raw bytes starting at `origin`, bypassing the writable mask.
    /// Intended for installing ROM images before the system starts running.
    pub fn load_raw(&mut self, origin: Word, data: &[u8]) {
        let start = origin.as_usize();
        for (offset, byte) in data.iter().enumerate() {
            self.mem[start + offset] = Byte(*byte);
        }
    }

    /// Parses whitespace-separated two-digit hex bytes and writes them
    /// starting at `origin`, bypassing the writable mask.
    ///
    /// # Errors
    ///
    /// Returns an error message if a token isn't valid two-digit hex.
    pub fn load_hex(&mut self, origin: Word, text: &str) -> Result<(), HexParseError> {
        let mut addr = origin.as_usize();
        for token in text.split_whitespace() {
            let value = u8::from_str_radix(token, 16).map_err(|_| HexParseError)?;
            self.mem[addr] = Byte(value);
            addr += 1;
        }
        Ok(())
    }

    /// Parses a WozMon-style echo dump: each line begins with an address
    /// token (discarded -- the loader tracks its own running cursor) followed
    /// by whitespace-separated hex byte tokens, written consecutively
    /// starting at `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error message if a byte token isn't valid two-digit hex.
    pub fn load_woz(&mut self, origin: Word, text: &str) -> Result<(), HexParseError> {
        let mut addr = origin.as_usize();
        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            let Some(_origin_marker) = tokens.next() else {
                continue;
            };
            for token in tokens {
                let value = u8::from_str_radix(token, 16).map_err(|_| HexParseError)?;
                self.mem[addr] = Byte(value);
                addr += 1;
            }
        }
        Ok(())
    }
}

/// A token in a hex/woz source could not be parsed as a two-digit hex byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexParseError;

impl core::fmt::Display for HexParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid two-digit hex byte")
    }
}

impl Bus for MemoryBus {
    fn read(&mut self, addr: Word) -> Result<Byte, SimError> {
        if self.readable[addr.as_usize()] {
            Ok(self.peek(addr))
        } else if self.strict {
            Err(SimError::UnmappedRead(addr))
        } else {
            Ok(Byte::ZERO)
        }
    }

    fn write(&mut self, addr: Word, value: Byte) -> Result<(), SimError> {
        if self.writable[addr.as_usize()] {
            self.mem[addr.as_usize()] = value;
            Ok(())
        } else if self.strict {
            Err(SimError::ReadOnlyAddress(addr))
        } else {
            Ok(())
        }
    }

    fn request_interrupt(&mut self, tag: InterruptTag) {
        self.interrupt = Some(tag);
    }

    fn take_interrupt(&mut self) -> Option<InterruptTag> {
        self.interrupt.take()
    }
}
