//! Transport module - byte streams between the bus master and the simulator.
//!
//! Provides:
//! - [`Channel`] and its exchange primitive, over any tokio stream pair
//! - FIFO endpoints (Unix named pipes)

mod channel;
#[cfg(unix)]
mod pipe;

pub use channel::{Channel, SegmentStatus};
#[cfg(unix)]
pub use pipe::{open_master_channel, open_peer_endpoints, open_receiver, open_sender, FifoChannel};
