//! Pluggable keyboard/display backend for [`crate::system_bus::SystemBus`].
//!
//! The bus only needs to poll for an incoming keystroke and push outgoing
//! display bytes somewhere; how those bytes reach a human (or a test) is
//! none of its business. Concrete front ends (a terminal, a widget, a
//! recorded transcript) implement this trait instead of being wired
//! directly into the bus.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// A keyboard/display peripheral.
pub trait Terminal {
    /// Returns the next raw keystroke byte, if one is waiting. Called once
    /// per `KBDCR` poll; returning `None` means no key is ready yet.
    fn poll_key(&mut self) -> Option<u8>;

    /// Emits one output byte, already stripped of its high bit.
    fn emit(&mut self, ch: u8);
}

/// A terminal with nothing attached: never has a key ready, discards
/// everything written to it. Used wherever a bus is needed but nothing is
/// watching the screen (unit tests, headless fixtures).
#[derive(Default, Debug, Clone, Copy)]
pub struct NullTerminal;

impl Terminal for NullTerminal {
    fn poll_key(&mut self) -> Option<u8> {
        None
    }

    fn emit(&mut self, _ch: u8) {}
}

/// A scripted terminal: keystrokes are queued up front, output bytes are
/// collected for later inspection. Intended for tests that drive a known
/// input script through WozMon or BASIC and assert on what came back.
#[derive(Default, Debug, Clone)]
pub struct RecordingTerminal {
    pending_keys: VecDeque<u8>,
    output: Vec<u8>,
}

impl RecordingTerminal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues raw keystroke bytes to be fed back one at a time as the
    /// simulated program polls `KBDCR`.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending_keys.extend(bytes.iter().copied());
    }

    /// Every byte emitted to the display so far, in order.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

impl Terminal for RecordingTerminal {
    fn poll_key(&mut self) -> Option<u8> {
        self.pending_keys.pop_front()
    }

    fn emit(&mut self, ch: u8) {
        self.output.push(ch);
    }
}
