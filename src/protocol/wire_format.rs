//! Wire format encoding and decoding.
//!
//! Every vector travels as a four-state word: two native-endian 32-bit
//! planes, `aval` first.
//!
//! ```text
//! outbound frame (master -> simulator), 24 bytes
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┬──────────┐
//! │ dat.aval │ dat.bval │ adr.aval │ adr.bval │ ctl.aval │ ctl.bval │
//! └──────────┴──────────┴──────────┴──────────┴──────────┴──────────┘
//!
//! inbound frame (simulator -> master), 16 bytes
//! ┌──────────┬──────────┬──────────┬──────────┐
//! │ dat.aval │ dat.bval │ ctl.aval │ ctl.bval │
//! └──────────┴──────────┴──────────┴──────────┘
//!
//! control scalar, 4 bytes (native-endian i32)
//! ```
//!
//! Per cycle the master writes the outbound frame followed by its control
//! scalar and reads the inbound control scalar followed by the inbound frame.

use bytes::{Buf, BufMut};

use super::four_state::FourStateWord;

/// Size of one four-state word on the wire.
pub const WORD_SIZE: usize = 8;

/// Size of an outbound frame (`dat`, `adr`, `ctl`).
pub const OUTBOUND_FRAME_SIZE: usize = 3 * WORD_SIZE;

/// Size of an inbound frame (`dat`, `ctl`).
pub const INBOUND_FRAME_SIZE: usize = 2 * WORD_SIZE;

/// Size of a control scalar.
pub const SCALAR_SIZE: usize = 4;

/// Bit constants for the outbound `ctl` word.
pub mod ctl_out {
    /// Byte-lane enables, bits `[3:0]`.
    pub const SEL_MASK: u32 = 0b0000_1111;
    /// Bit position of the write enable.
    pub const WEN_SHIFT: u32 = 4;
    /// Write enable.
    pub const WEN: u32 = 1 << WEN_SHIFT;
    /// Request valid.
    pub const REQ: u32 = 0b0010_0000;
    /// Ready to accept read data.
    pub const ACK: u32 = 0b0100_0000;
    /// Flags asserted on every request (`req | ack`).
    pub const ENABLE: u32 = REQ | ACK;
    /// Bits driven unknown while the bus is idle.
    pub const IDLE_MASK: u32 = SEL_MASK | WEN;
}

/// Bit constants for the inbound `ctl` word.
pub mod ctl_in {
    /// Bit index of "read data valid".
    pub const REQ_BIT: u32 = 0;
    /// Bit index of "request accepted".
    pub const ACK_BIT: u32 = 1;
}

/// Append a word to a buffer.
#[inline]
pub fn put_word<B: BufMut>(buf: &mut B, word: FourStateWord) {
    let (aval, bval) = word.planes();
    buf.put_u32_ne(aval);
    buf.put_u32_ne(bval);
}

/// Consume a word from a buffer.
///
/// # Panics
///
/// Panics if fewer than `WORD_SIZE` bytes remain.
#[inline]
pub fn get_word<B: Buf>(buf: &mut B) -> FourStateWord {
    let aval = buf.get_u32_ne();
    let bval = buf.get_u32_ne();
    FourStateWord::from_planes(aval, bval)
}
