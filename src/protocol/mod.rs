//! Protocol module - four-state values, wire format, and bus frames.
//!
//! This module implements the per-cycle data exchanged with the simulator:
//! - Four-state values and 32-bit words (two bit-planes each)
//! - Native-endian frame layout and control bit constants
//! - Outbound/inbound frame structs with typed accessors

mod four_state;
mod frame;
mod wire_format;

pub use four_state::{FourStateValue, FourStateWord};
pub use frame::{ControlScalar, InboundFrame, OutboundFrame};
pub use wire_format::{
    ctl_in, ctl_out, get_word, put_word, INBOUND_FRAME_SIZE, OUTBOUND_FRAME_SIZE, SCALAR_SIZE,
    WORD_SIZE,
};
