//! # zbus-cosim
//!
//! Bus master for lock-step co-simulation with an HDL simulator.
//!
//! The crate plays the CPU side of a memory-mapped bus whose peripherals
//! live in a Verilog/VHDL simulation. Both sides exchange one fixed-size
//! frame per simulated clock edge over a pair of named pipes, so software
//! and hardware advance together.
//!
//! ## Architecture
//!
//! - **Protocol**: four-state bus vectors and the outbound/inbound frames
//! - **Transport**: the FIFO channel and its exchange primitive
//! - **Bus**: the handshake engine (`reset`, `rw`, `idle`, `stop`) and
//!   `ioread*`/`iowrite*` accessors
//! - **Peer**: the simulator's end of the same wire protocol
//!
//! ## Example
//!
//! ```ignore
//! use zbus_cosim::{BusMaster, SessionConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> zbus_cosim::Result<()> {
//!     let mut bus = BusMaster::open(&SessionConfig::from_env()?).await?;
//!     bus.reset().await?;
//!     let status = bus.ioread32(0x0).await?;
//!     bus.iowrite32(status | 1, 0x0).await?;
//!     bus.stop().await
//! }
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod peer;
pub mod protocol;
pub mod transport;

pub use bus::BusMaster;
pub use config::SessionConfig;
pub use error::{CosimError, Result};
pub use peer::SimPort;
