//! Bus master - protocol engine and memory-mapped accessors.
//!
//! Provides:
//! - [`BusMaster`] - reset, read/write, idle and stop over a [`Channel`](crate::transport::Channel)
//! - [`lanes`] - byte-lane decoding for sub-word accesses
//! - `ioread*`/`iowrite*` methods on [`BusMaster`]
//!
//! # Example
//!
//! ```ignore
//! use zbus_cosim::{BusMaster, SessionConfig};
//!
//! let mut bus = BusMaster::open(&SessionConfig::default()).await?;
//! bus.reset().await?;
//! let id = bus.ioread32(0x0).await?;
//! bus.iowrite32(0x0123_4567, 0x4).await?;
//! bus.stop().await?;
//! ```

mod engine;
pub mod lanes;
mod mmio;

pub use engine::BusMaster;
pub use lanes::LaneAccess;
