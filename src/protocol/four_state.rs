//! Four-state signal values.
//!
//! HDL simulators model each wire as one of `0`, `1`, `X` (unknown) or
//! `Z` (floating). On the wire every bit is carried as a pair of plane bits:
//!
//! ```text
//! value │ a │ b
//! ──────┼───┼───
//!   0   │ 0 │ 0
//!   1   │ 1 │ 0
//!   Z   │ 0 │ 1
//!   X   │ 1 │ 1
//! ```
//!
//! A [`FourStateWord`] holds 32 such values as two 32-bit planes, in the
//! same layout simulators use for vector values.

/// A single four-state signal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FourStateValue {
    /// Driven low.
    Zero,
    /// Driven high.
    One,
    /// Unknown (`X`).
    Unknown,
    /// High impedance (`Z`).
    Floating,
}

impl FourStateValue {
    /// Pack into the `(a, b)` plane bits.
    #[inline]
    pub fn to_planes(self) -> (bool, bool) {
        match self {
            FourStateValue::Zero => (false, false),
            FourStateValue::One => (true, false),
            FourStateValue::Floating => (false, true),
            FourStateValue::Unknown => (true, true),
        }
    }

    /// Unpack from `(a, b)` plane bits.
    #[inline]
    pub fn from_planes(a: bool, b: bool) -> Self {
        match (a, b) {
            (false, false) => FourStateValue::Zero,
            (true, false) => FourStateValue::One,
            (false, true) => FourStateValue::Floating,
            (true, true) => FourStateValue::Unknown,
        }
    }

    /// Check if the value is a driven `0` or `1`.
    #[inline]
    pub fn is_known(self) -> bool {
        matches!(self, FourStateValue::Zero | FourStateValue::One)
    }
}

impl From<bool> for FourStateValue {
    fn from(bit: bool) -> Self {
        if bit {
            FourStateValue::One
        } else {
            FourStateValue::Zero
        }
    }
}

/// 32 parallel four-state values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FourStateWord {
    aval: u32,
    bval: u32,
}

impl FourStateWord {
    /// Width of a word in bits.
    pub const WIDTH: u32 = 32;

    /// A word with every bit driven from `value`.
    #[inline]
    pub const fn known(value: u32) -> Self {
        Self {
            aval: value,
            bval: 0,
        }
    }

    /// A word with every bit unknown.
    #[inline]
    pub const fn unknown() -> Self {
        Self {
            aval: u32::MAX,
            bval: u32::MAX,
        }
    }

    /// A word with every bit floating.
    #[inline]
    pub const fn floating() -> Self {
        Self {
            aval: 0,
            bval: u32::MAX,
        }
    }

    /// Rebuild a word from its wire planes.
    #[inline]
    pub const fn from_planes(aval: u32, bval: u32) -> Self {
        Self { aval, bval }
    }

    /// Wire planes `(aval, bval)`.
    #[inline]
    pub const fn planes(self) -> (u32, u32) {
        (self.aval, self.bval)
    }

    /// Value of bit `index` (0 = least significant).
    ///
    /// # Panics
    ///
    /// Panics if `index >= 32`.
    pub fn bit(self, index: u32) -> FourStateValue {
        assert!(index < Self::WIDTH, "bit index {index} out of range");
        FourStateValue::from_planes(
            (self.aval >> index) & 1 != 0,
            (self.bval >> index) & 1 != 0,
        )
    }

    /// Copy of this word with bit `index` set to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 32`.
    #[must_use]
    pub fn with_bit(self, index: u32, value: FourStateValue) -> Self {
        assert!(index < Self::WIDTH, "bit index {index} out of range");
        self.fill(1 << index, value)
    }

    /// Copy of this word with every bit selected by `mask` set to `value`.
    #[must_use]
    pub fn fill(self, mask: u32, value: FourStateValue) -> Self {
        let (a, b) = value.to_planes();
        let plane = |current: u32, set: bool| {
            if set {
                current | mask
            } else {
                current & !mask
            }
        };
        Self {
            aval: plane(self.aval, a),
            bval: plane(self.bval, b),
        }
    }

    /// Check whether a bit is a driven `1`.
    #[inline]
    pub fn is_high(self, index: u32) -> bool {
        self.bit(index) == FourStateValue::One
    }

    /// Check that every bit is a driven `0` or `1`.
    #[inline]
    pub fn is_known(self) -> bool {
        self.bval == 0
    }

    /// Binary value, or `None` if any bit is `X` or `Z`.
    #[inline]
    pub fn to_u32(self) -> Option<u32> {
        self.is_known().then_some(self.aval)
    }

    /// Binary value with `X` read as `1` and `Z` read as `0`.
    #[inline]
    pub fn to_u32_lossy(self) -> u32 {
        self.aval
    }

    /// Iterate over all 32 bits, least significant first.
    pub fn iter(self) -> impl Iterator<Item = FourStateValue> {
        (0..Self::WIDTH).map(move |i| self.bit(i))
    }
}

impl From<u32> for FourStateWord {
    fn from(value: u32) -> Self {
        Self::known(value)
    }
}

impl FromIterator<FourStateValue> for FourStateWord {
    /// Collect up to 32 values, least significant first; missing bits are `0`.
    fn from_iter<I: IntoIterator<Item = FourStateValue>>(iter: I) -> Self {
        iter.into_iter()
            .take(Self::WIDTH as usize)
            .enumerate()
            .fold(Self::known(0), |word, (i, v)| word.with_bit(i as u32, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [FourStateValue; 4] = [
        FourStateValue::Zero,
        FourStateValue::One,
        FourStateValue::Unknown,
        FourStateValue::Floating,
    ];

    #[test]
    fn test_value_planes_roundtrip() {
        for v in ALL {
            let (a, b) = v.to_planes();
            assert_eq!(FourStateValue::from_planes(a, b), v);
        }
    }

    #[test]
    fn test_value_plane_convention() {
        assert_eq!(FourStateValue::Zero.to_planes(), (false, false));
        assert_eq!(FourStateValue::One.to_planes(), (true, false));
        assert_eq!(FourStateValue::Floating.to_planes(), (false, true));
        assert_eq!(FourStateValue::Unknown.to_planes(), (true, true));
    }

    #[test]
    fn test_known_word() {
        let w = FourStateWord::known(0x8000_0001);
        assert!(w.is_known());
        assert_eq!(w.to_u32(), Some(0x8000_0001));
        assert_eq!(w.bit(0), FourStateValue::One);
        assert_eq!(w.bit(1), FourStateValue::Zero);
        assert_eq!(w.bit(31), FourStateValue::One);
    }

    #[test]
    fn test_unknown_and_floating_words() {
        let x = FourStateWord::unknown();
        assert_eq!(x.planes(), (u32::MAX, u32::MAX));
        assert!(x.iter().all(|v| v == FourStateValue::Unknown));
        assert_eq!(x.to_u32(), None);
        assert_eq!(x.to_u32_lossy(), u32::MAX);

        let z = FourStateWord::floating();
        assert!(z.iter().all(|v| v == FourStateValue::Floating));
        assert_eq!(z.to_u32_lossy(), 0);
    }

    #[test]
    fn test_fill_mask() {
        let w = FourStateWord::known(0xff00).fill(0x1f, FourStateValue::Unknown);
        assert_eq!(w.planes(), (0xff1f, 0x1f));

        let cleared = w.fill(0x1f, FourStateValue::Zero);
        assert_eq!(cleared, FourStateWord::known(0xff00));
    }

    #[test]
    fn test_with_bit_each_state() {
        for v in ALL {
            let w = FourStateWord::known(0).with_bit(7, v);
            assert_eq!(w.bit(7), v);
            assert_eq!(w.bit(6), FourStateValue::Zero);
        }
    }

    #[test]
    fn test_is_high_ignores_unknown() {
        let w = FourStateWord::unknown();
        assert!(!w.is_high(0));
        assert!(FourStateWord::known(2).is_high(1));
    }

    #[test]
    fn test_collect_from_values() {
        let w: FourStateWord = [FourStateValue::One, FourStateValue::Floating]
            .into_iter()
            .collect();
        assert_eq!(w.planes(), (0b01, 0b10));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_bit_index_out_of_range() {
        let _ = FourStateWord::known(0).bit(32);
    }
}
