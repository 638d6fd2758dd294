//! Processor status register (P) flags.
//!
//! The 6502 status register contains 8 condition code and control bits:
//! Carry, Zero, Interrupt Disable, Decimal Mode, Break, Expansion, Overflow, and Sign.

use bitflags::bitflags;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign};
use sixty502::Byte;

bitflags! {
    /// Processor status register (P register).
    ///
    /// # Bit Layout
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N V E B D I Z C
    /// ```
    ///
    /// - N (Negative): set when the result's bit 7 is set
    /// - V (Overflow): set on signed overflow
    /// - E (Expansion): unused, always reads back as 1
    /// - B (Break): distinguishes a pushed BRK from a pushed IRQ/NMI
    /// - D (Decimal): enables BCD mode for ADC/SBC
    /// - I (Interrupt Disable): masks IRQ when set
    /// - Z (Zero): set when the result is zero
    /// - C (Carry): set on carry/borrow
    #[derive(Default, Copy, Clone, Debug)]
    pub struct Flags: u8 {
        const Carry = 0b0000_0001;              // C
        const Zero = 0b0000_0010;               // Z
        const InterruptDisabled = 0b0000_0100;  // I
        const DecimalMode = 0b0000_1000;        // D
        const Break = 0b0001_0000;              // B
        const Expansion = 0b0010_0000;          // E
        const Overflow = 0b0100_0000;           // V
        const Sign = 0b1000_0000;               // N
    }
}

impl Flags {
    #[inline]
    pub fn set_zero(&mut self, zero: bool) {
        self.set(Flags::Zero, zero);
    }

    #[inline]
    pub fn set_signed(&mut self, signed: bool) {
        self.set(Flags::Sign, signed);
    }

    #[inline]
    pub fn set_carry(&mut self, carry: bool) {
        self.set(Flags::Carry, carry);
    }

    #[inline]
    pub fn set_overflow(&mut self, overflow: bool) {
        self.set(Flags::Overflow, overflow);
    }

    #[inline]
    pub fn set_decimal_mode(&mut self, enabled: bool) {
        self.set(Flags::DecimalMode, enabled);
    }

    #[inline]
    pub fn set_interrupt_disabled(&mut self, disabled: bool) {
        self.set(Flags::InterruptDisabled, disabled);
    }

    #[must_use]
    #[inline]
    pub fn bit(self, flag: Flags) -> u8 {
        u8::from(self.contains(flag))
    }

    /// Applies a popped status byte (PLP/RTI) the way real silicon does:
    /// bits 4 and 5 of the popped byte are ignored entirely. Expansion has
    /// no flip-flop and always reads as 1; Break has no flip-flop either,
    /// so it simply keeps whatever value it already held.
    #[must_use]
    #[inline]
    pub fn pulled(self, popped: Flags) -> Flags {
        (popped & !(Flags::Break | Flags::Expansion)) | Flags::Expansion | (self & Flags::Break)
    }
}

impl From<Byte> for Flags {
    fn from(byte: Byte) -> Self {
        Flags::from_bits_truncate(u8::from(byte))
    }
}

impl From<Flags> for Byte {
    fn from(flags: Flags) -> Self {
        Byte(flags.bits())
    }
}

impl PartialEq<Flags> for Byte {
    fn eq(&self, other: &Flags) -> bool {
        self.0 == other.bits()
    }
}

impl PartialEq<Byte> for Flags {
    fn eq(&self, other: &Byte) -> bool {
        self.bits() == other.0
    }
}

impl BitAnd<Flags> for Byte {
    type Output = Byte;

    fn bitand(self, rhs: Flags) -> Byte {
        Byte(self.0 & rhs.bits())
    }
}

impl BitAndAssign<Flags> for Byte {
    fn bitand_assign(&mut self, rhs: Flags) {
        self.0 &= rhs.bits();
    }
}

impl BitOr<Flags> for Byte {
    type Output = Byte;

    fn bitor(self, rhs: Flags) -> Byte {
        Byte(self.0 | rhs.bits())
    }
}

impl BitOrAssign<Flags> for Byte {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.bits();
    }
}

impl BitXor<Flags> for Byte {
    type Output = Byte;

    fn bitxor(self, rhs: Flags) -> Byte {
        Byte(self.0 ^ rhs.bits())
    }
}

impl BitXorAssign<Flags> for Byte {
    fn bitxor_assign(&mut self, rhs: Flags) {
        self.0 ^= rhs.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::Flags;

    #[test]
    fn pulled_forces_expansion_and_ignores_popped_break() {
        let current = Flags::empty();
        let popped = Flags::from_bits_truncate(0b1100_1111);
        assert_eq!(current.pulled(popped).bits(), 0b1100_1111 & !0b0001_0000 | 0b0010_0000);
    }

    #[test]
    fn pulled_preserves_the_break_bit_already_held_by_the_cpu() {
        let current = Flags::Break;
        let popped = Flags::empty();
        assert_eq!(current.pulled(popped), Flags::Break | Flags::Expansion);

        let current = Flags::empty();
        let popped = Flags::Break;
        assert_eq!(current.pulled(popped), Flags::Expansion);
    }
}
