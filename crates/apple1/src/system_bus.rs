//! The Apple 1 memory map: RAM, the BASIC and WozMon ROMs, and the PIA-style
//! keyboard/display registers at `$D010`-`$D013`.

use sixty502::{Bus, Byte, InterruptTag, MemoryBus, SimError, Word};

use crate::terminal::Terminal;

/// Start of the unused address range carved out between RAM and the ROMs.
/// `$D010`-`$D013` live inside it and are handled by [`SystemBus`] directly
/// rather than by the underlying [`MemoryBus`].
pub const RAM_END: Word = Word(0x8000);
pub const UNUSED_END: Word = Word(0xE000);
pub const BASIC_ROM_START: Word = Word(0xE000);
pub const BASIC_ROM_END: Word = Word(0xF000);
pub const WOZMON_ROM_START: Word = Word(0xFF00);
pub const WOZMON_ROM_END: Word = Word(0x1_0000);

const KBD: Word = Word(0xD010);
const KBD_CR: Word = Word(0xD011);
const DSP: Word = Word(0xD012);
const DSP_CR: Word = Word(0xD013);

/// ASCII DC2 (`Ctrl-R`): the Apple 1's keyboard wiring ties this combination
/// to the RESET line rather than passing it through as a keystroke.
const CTRL_R: u8 = 0x12;
/// ASCII ENQ (`Ctrl-E`): wired to HALT the same way `Ctrl-R` is wired to RESET.
const CTRL_E: u8 = 0x05;

/// An Apple 1 system: RAM, BASIC and WozMon ROM, and the keyboard/display
/// registers, wired to a pluggable [`Terminal`].
pub struct SystemBus<T: Terminal> {
    memory: MemoryBus,
    terminal: T,
    /// The latched keyboard byte, bit 7 set. Reading `$D010` zeroes this;
    /// it stays zero until `$D011` latches a fresh key.
    kbd_latch: Byte,
    /// The raw value most recently written to `$D012`, before masking or
    /// case-folding. `$D012` itself always reads back 0 -- this is exposed
    /// only through [`SystemBus::display_mirror`] for a driver or test to
    /// inspect what was last sent to the display.
    dsp_mirror: Byte,
}

impl<T: Terminal> SystemBus<T> {
    #[must_use]
    pub fn new(terminal: T) -> Self {
        let mut memory = MemoryBus::new(true);
        memory.set_readable(RAM_END, UNUSED_END, false);
        memory.set_writable(RAM_END, UNUSED_END, false);
        memory.set_writable(BASIC_ROM_START, BASIC_ROM_END, false);
        memory.set_writable(WOZMON_ROM_START, WOZMON_ROM_END, false);

        Self {
            memory,
            terminal,
            kbd_latch: Byte::ZERO,
            dsp_mirror: Byte::ZERO,
        }
    }

    #[must_use]
    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    #[must_use]
    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    /// The raw byte most recently written to `$D012`, before masking or
    /// case-folding.
    #[must_use]
    pub fn display_mirror(&self) -> Byte {
        self.dsp_mirror
    }

    /// Installs a BASIC ROM image at `$E000`, bypassing the write-protect
    /// mask installed over that range.
    pub fn load_basic_rom(&mut self, data: &[u8]) {
        self.memory.load_raw(BASIC_ROM_START, data);
    }

    /// Installs a WozMon ROM image at `$FF00` (including the reset and IRQ
    /// vectors at the top of the address space), bypassing the write-protect
    /// mask installed over that range.
    pub fn load_wozmon_rom(&mut self, data: &[u8]) {
        self.memory.load_raw(WOZMON_ROM_START, data);
    }

    /// Loads raw bytes starting at `origin`, bypassing the write mask.
    /// Intended for depositing a small test program before a run.
    pub fn load_ram(&mut self, origin: Word, data: &[u8]) {
        self.memory.load_raw(origin, data);
    }

    /// Non-blocking poll of the host keyboard, run as a side effect of
    /// reading `$D011`. Polls every call, even if a previously latched key
    /// hasn't been consumed via `$D010` yet -- a fresh keystroke simply
    /// overwrites it, matching the hardware's behavior.
    fn poll_keyboard(&mut self) -> Byte {
        let Some(raw) = self.terminal.poll_key() else {
            return Byte::ZERO;
        };

        match raw {
            CTRL_R => {
                self.memory.request_interrupt(InterruptTag::Reset);
                return Byte::ZERO;
            }
            CTRL_E => {
                self.memory.request_interrupt(InterruptTag::Halt);
                return Byte::ZERO;
            }
            _ => {}
        }

        let translated = match raw {
            b'a'..=b'z' => raw & !0x20,
            0x0A => 0x0D,
            0x7F => 0x5F,
            other => other,
        };

        self.kbd_latch = Byte(translated | 0x80);
        Byte(0x80)
    }
}

impl<T: Terminal> Bus for SystemBus<T> {
    fn read(&mut self, addr: Word) -> Result<Byte, SimError> {
        match addr {
            KBD => {
                let value = self.kbd_latch;
                self.kbd_latch = Byte::ZERO;
                Ok(value)
            }
            KBD_CR => Ok(self.poll_keyboard()),
            DSP | DSP_CR => Ok(Byte::ZERO),
            _ => self.memory.read(addr),
        }
    }

    fn write(&mut self, addr: Word, value: Byte) -> Result<(), SimError> {
        match addr {
            KBD | KBD_CR | DSP_CR => Ok(()),
            DSP => {
                self.dsp_mirror = value;
                let masked = value.0 & 0x7F;
                let folded = if masked > 95 { masked - 32 } else { masked };
                if (32..=95).contains(&folded) || folded == 13 {
                    let emitted = if folded == 13 { 10 } else { folded };
                    self.terminal.emit(emitted);
                }
                Ok(())
            }
            _ => self.memory.write(addr, value),
        }
    }

    fn request_interrupt(&mut self, tag: InterruptTag) {
        self.memory.request_interrupt(tag);
    }

    fn take_interrupt(&mut self) -> Option<InterruptTag> {
        self.memory.take_interrupt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::RecordingTerminal;

    fn new_bus() -> SystemBus<RecordingTerminal> {
        SystemBus::new(RecordingTerminal::new())
    }

    #[test]
    fn unused_range_is_unmapped_in_strict_mode() {
        let mut bus = new_bus();
        assert_eq!(bus.read(Word(0x9000)), Err(SimError::UnmappedRead(Word(0x9000))));
    }

    #[test]
    fn ram_is_readable_and_writable() {
        let mut bus = new_bus();
        bus.write(Word(0x0200), Byte(0x42)).unwrap();
        assert_eq!(bus.read(Word(0x0200)), Ok(Byte(0x42)));
    }

    #[test]
    fn basic_rom_is_read_only() {
        let mut bus = new_bus();
        bus.load_basic_rom(&[0xEA]);
        assert_eq!(bus.read(Word(0xE000)), Ok(Byte(0xEA)));
        assert_eq!(
            bus.write(Word(0xE000), Byte(0x00)),
            Err(SimError::ReadOnlyAddress(Word(0xE000)))
        );
    }

    #[test]
    fn keyboard_read_zeroes_the_latch() {
        let mut bus = new_bus();
        bus.terminal_mut().feed(b"a");

        assert_eq!(bus.read(KBD_CR), Ok(Byte(0x80)));
        assert_eq!(bus.read(KBD), Ok(Byte(b'A' | 0x80)));
        assert_eq!(bus.read(KBD_CR), Ok(Byte::ZERO));
        assert_eq!(bus.read(KBD), Ok(Byte::ZERO));
    }

    #[test]
    fn keyboard_translates_linefeed_to_carriage_return() {
        let mut bus = new_bus();
        bus.terminal_mut().feed(&[0x0A]);

        bus.read(KBD_CR).unwrap();
        assert_eq!(bus.read(KBD), Ok(Byte(0x0D | 0x80)));
    }

    #[test]
    fn keyboard_translates_delete_to_underscore() {
        let mut bus = new_bus();
        bus.terminal_mut().feed(&[0x7F]);

        bus.read(KBD_CR).unwrap();
        assert_eq!(bus.read(KBD), Ok(Byte(0x5F | 0x80)));
    }

    #[test]
    fn ctrl_r_requests_reset_instead_of_reaching_kbd() {
        let mut bus = new_bus();
        bus.terminal_mut().feed(&[CTRL_R]);

        assert_eq!(bus.read(KBD_CR), Ok(Byte::ZERO));
        assert_eq!(bus.take_interrupt(), Some(InterruptTag::Reset));
    }

    #[test]
    fn ctrl_e_requests_halt_instead_of_reaching_kbd() {
        let mut bus = new_bus();
        bus.terminal_mut().feed(&[CTRL_E]);

        assert_eq!(bus.read(KBD_CR), Ok(Byte::ZERO));
        assert_eq!(bus.take_interrupt(), Some(InterruptTag::Halt));
    }

    #[test]
    fn display_register_always_reads_back_zero() {
        let mut bus = new_bus();
        bus.write(Word(0xD012), Byte(0x42)).unwrap();
        assert_eq!(bus.read(Word(0xD012)), Ok(Byte::ZERO));
    }

    #[test]
    fn display_write_emits_the_printable_character_and_mirrors_raw_value() {
        let mut bus = new_bus();
        bus.write(DSP, Byte(0x42)).unwrap(); // 'B', as STA $D012 with A=$42 would send it

        assert_eq!(bus.display_mirror(), Byte(0x42));
        assert_eq!(bus.terminal().output(), b"B");
    }

    #[test]
    fn display_write_folds_high_range_into_uppercase() {
        let mut bus = new_bus();
        bus.write(DSP, Byte(0x61)).unwrap(); // 'a' (97), folds to 'A' (65)

        assert_eq!(bus.terminal().output(), b"A");
    }

    #[test]
    fn display_write_converts_carriage_return_to_linefeed_on_emit() {
        let mut bus = new_bus();
        bus.write(DSP, Byte(13)).unwrap();

        assert_eq!(bus.terminal().output(), &[10]);
    }

    #[test]
    fn display_write_outside_printable_and_cr_ranges_emits_nothing() {
        let mut bus = new_bus();
        bus.write(DSP, Byte(1)).unwrap();

        assert_eq!(bus.terminal().output(), b"");
        assert_eq!(bus.display_mirror(), Byte(1));
    }

    #[test]
    fn dsp_cr_is_ignored_on_read_and_write() {
        let mut bus = new_bus();
        bus.write(DSP_CR, Byte(0xFF)).unwrap();
        assert_eq!(bus.read(DSP_CR), Ok(Byte::ZERO));
    }
}
