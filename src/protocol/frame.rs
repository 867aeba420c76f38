//! Bus frames with typed accessors.
//!
//! [`OutboundFrame`] carries a bus request from the master to the simulator,
//! [`InboundFrame`] carries the simulator's handshake flags and read data
//! back, and [`ControlScalar`] rides alongside each of them.
//!
//! # Example
//!
//! ```
//! use zbus_cosim::protocol::{OutboundFrame, OUTBOUND_FRAME_SIZE};
//!
//! let frame = OutboundFrame::request(true, 0x1000, 0xf, 0xcafe_f00d);
//! let bytes = frame.encode();
//! assert_eq!(bytes.len(), OUTBOUND_FRAME_SIZE);
//! assert_eq!(OutboundFrame::decode(&bytes), Some(frame));
//! ```

use super::four_state::{FourStateValue, FourStateWord};
use super::wire_format::{
    ctl_in, ctl_out, get_word, put_word, INBOUND_FRAME_SIZE, OUTBOUND_FRAME_SIZE, SCALAR_SIZE,
};

/// Frame driven by the bus master (`d_o`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundFrame {
    /// Write data.
    pub dat: FourStateWord,
    /// Target address.
    pub adr: FourStateWord,
    /// Control: `sel[3:0]`, `wen`, `req`, `ack`.
    pub ctl: FourStateWord,
}

impl OutboundFrame {
    /// Request frame for a read (`wen == false`) or write.
    ///
    /// Only the low four bits of `sel` are used.
    pub fn request(wen: bool, addr: u32, sel: u8, data: u32) -> Self {
        let ctl = ctl_out::ENABLE
            | (u32::from(wen) << ctl_out::WEN_SHIFT)
            | (u32::from(sel) & ctl_out::SEL_MASK);
        Self {
            dat: FourStateWord::known(data),
            adr: FourStateWord::known(addr),
            ctl: FourStateWord::known(ctl),
        }
    }

    /// Frame driven while no transaction is pending.
    ///
    /// Data and address are all-unknown; `sel` and `wen` are unknown and the
    /// handshake flags are low.
    pub fn idle() -> Self {
        Self {
            dat: FourStateWord::unknown(),
            adr: FourStateWord::unknown(),
            ctl: FourStateWord::known(0).fill(ctl_out::IDLE_MASK, FourStateValue::Unknown),
        }
    }

    /// Check if this frame carries a request (`req` and `ack` driven high).
    pub fn is_request(&self) -> bool {
        self.ctl.is_high(ctl_out::REQ.trailing_zeros())
            && self.ctl.is_high(ctl_out::ACK.trailing_zeros())
    }

    /// Write enable, if driven.
    pub fn wen(&self) -> Option<bool> {
        match self.ctl.bit(ctl_out::WEN_SHIFT) {
            FourStateValue::One => Some(true),
            FourStateValue::Zero => Some(false),
            _ => None,
        }
    }

    /// Byte-lane enables, if all four are driven.
    pub fn sel(&self) -> Option<u8> {
        let lanes = self.ctl.fill(!ctl_out::SEL_MASK, FourStateValue::Zero);
        lanes.to_u32().map(|v| v as u8)
    }

    /// Encode to the 24-byte wire layout.
    pub fn encode(&self) -> [u8; OUTBOUND_FRAME_SIZE] {
        let mut buf = [0u8; OUTBOUND_FRAME_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `OUTBOUND_FRAME_SIZE` (24 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        assert!(buf.len() >= OUTBOUND_FRAME_SIZE);
        let mut out = &mut buf[..OUTBOUND_FRAME_SIZE];
        put_word(&mut out, self.dat);
        put_word(&mut out, self.adr);
        put_word(&mut out, self.ctl);
    }

    /// Decode from bytes.
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < OUTBOUND_FRAME_SIZE {
            return None;
        }
        let mut src = &buf[..OUTBOUND_FRAME_SIZE];
        Some(Self {
            dat: get_word(&mut src),
            adr: get_word(&mut src),
            ctl: get_word(&mut src),
        })
    }
}

impl Default for OutboundFrame {
    fn default() -> Self {
        Self::idle()
    }
}

/// Frame driven by the simulator (`d_i`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundFrame {
    /// Read data.
    pub dat: FourStateWord,
    /// Control: bit 0 = `req` (data valid), bit 1 = `ack` (request accepted).
    pub ctl: FourStateWord,
}

impl InboundFrame {
    /// Build a frame from handshake flags and a data word.
    pub fn new(ack: bool, req: bool, dat: FourStateWord) -> Self {
        let ctl = FourStateWord::known(0)
            .with_bit(ctl_in::ACK_BIT, ack.into())
            .with_bit(ctl_in::REQ_BIT, req.into());
        Self { dat, ctl }
    }

    /// Frame with both flags low and unknown data.
    pub fn quiet() -> Self {
        Self::new(false, false, FourStateWord::unknown())
    }

    /// Check if the simulator accepted the request.
    ///
    /// Sampled on the value plane, so an `X` on the flag counts as asserted
    /// and a `Z` does not.
    #[inline]
    pub fn ack(&self) -> bool {
        self.flag(ctl_in::ACK_BIT)
    }

    /// Check if read data is valid. Sampled like [`ack`](Self::ack).
    #[inline]
    pub fn req(&self) -> bool {
        self.flag(ctl_in::REQ_BIT)
    }

    fn flag(&self, bit: u32) -> bool {
        (self.ctl.planes().0 >> bit) & 1 != 0
    }

    /// Encode to the 16-byte wire layout.
    pub fn encode(&self) -> [u8; INBOUND_FRAME_SIZE] {
        let mut buf = [0u8; INBOUND_FRAME_SIZE];
        let mut out = &mut buf[..];
        put_word(&mut out, self.dat);
        put_word(&mut out, self.ctl);
        buf
    }

    /// Decode from bytes.
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < INBOUND_FRAME_SIZE {
            return None;
        }
        let mut src = &buf[..INBOUND_FRAME_SIZE];
        Some(Self {
            dat: get_word(&mut src),
            ctl: get_word(&mut src),
        })
    }
}

impl Default for InboundFrame {
    fn default() -> Self {
        Self::quiet()
    }
}

/// 32-bit side-band value sent with every frame.
///
/// Outbound it is [`ControlScalar::RUN`] or [`ControlScalar::STOP`]; inbound
/// it is non-zero while the hardware holds reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlScalar(pub i32);

impl ControlScalar {
    /// Keep the simulation running.
    pub const RUN: Self = Self(0);
    /// Finish the simulation.
    pub const STOP: Self = Self(1);

    /// Check for any non-zero value.
    #[inline]
    pub fn is_set(self) -> bool {
        self.0 != 0
    }

    /// Encode as native-endian bytes.
    #[inline]
    pub fn encode(self) -> [u8; SCALAR_SIZE] {
        self.0.to_ne_bytes()
    }

    /// Decode from native-endian bytes.
    #[inline]
    pub fn decode(buf: [u8; SCALAR_SIZE]) -> Self {
        Self(i32::from_ne_bytes(buf))
    }
}
