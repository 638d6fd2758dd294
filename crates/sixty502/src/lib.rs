//! Type-safe primitives and a bus abstraction shared by 6502-family emulators.
//!
//! This crate has no opinion about any particular CPU variant or memory map;
//! it provides the building blocks (`Byte`, `Word`, `Nibble`, [`bus::Bus`],
//! [`bus::MemoryBus`], and [`error::SimError`]) that a concrete CPU crate
//! wires together.

#![no_std]

extern crate alloc;

pub mod bus;
pub mod byte;
pub mod error;
pub mod nibble;
pub mod word;

pub use bus::{Bus, InterruptTag, MemoryBus};
pub use byte::Byte;
pub use error::SimError;
pub use nibble::Nibble;
pub use word::Word;
