//! Byte-lane decoding for a 32-bit bus with byte strobes.
//!
//! Sub-word accesses keep the full address on the bus and pick their bytes
//! with `sel`; the data travels in its lane position within the word.

use crate::error::{CosimError, Result};

/// Lane enables and data shift for one access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneAccess {
    /// Byte-lane enable mask, bits `[3:0]`.
    pub sel: u8,
    /// Byte offset of the access within the bus word.
    pub shift: u32,
}

impl LaneAccess {
    /// Move a value into its lane position.
    #[inline]
    pub fn place(self, value: u32) -> u32 {
        value << (8 * self.shift)
    }

    /// Move a bus word's lanes down to bit 0.
    ///
    /// The caller truncates to the access width.
    #[inline]
    pub fn extract(self, word: u32) -> u32 {
        word >> (8 * self.shift)
    }
}

/// Byte access: one lane selected by `addr & 3`.
pub fn byte_lane(addr: u32) -> LaneAccess {
    let shift = addr & 3;
    LaneAccess {
        sel: 1 << shift,
        shift,
    }
}

/// Half-word access: two lanes starting at `addr & 3`, which must be 0 or 2.
pub fn half_lane(addr: u32) -> Result<LaneAccess> {
    let shift = addr & 3;
    if shift & 1 != 0 {
        return Err(CosimError::Misaligned { addr, width: 16 });
    }
    Ok(LaneAccess {
        sel: 0b11 << shift,
        shift,
    })
}

/// Word access: all four lanes, no shift.
pub fn word_lane(_addr: u32) -> LaneAccess {
    LaneAccess { sel: 0xf, shift: 0 }
}
