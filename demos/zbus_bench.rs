//! Bench driver - the minimal bus exerciser.
//!
//! This example demonstrates:
//! - Opening a session on the FIFOs named by `ZBUS_OUTPUT` / `ZBUS_INPUT`
//! - Waiting for the simulated reset to release
//! - A few word reads and writes against the device under test
//! - Ending the simulation
//!
//! # Running against a simulator
//!
//! ```text
//! mkfifo tmp/interface-o.fifo tmp/interface-i.fifo
//! vvp -M. -mzbus sim.vvp &              # simulator side opens the same FIFOs
//! RUST_LOG=zbus_cosim=debug cargo run --example zbus_bench
//! ```

use tracing_subscriber::EnvFilter;
use zbus_cosim::{BusMaster, SessionConfig};

const BASE: u32 = 0x0;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = SessionConfig::from_env()?;
    let mut bus = BusMaster::open(&config).await?;

    bus.reset().await?;

    for offset in [0x0, 0x4, 0x8, 0xc] {
        let value = bus.ioread32(BASE + offset).await?;
        tracing::info!("read  {:#010x} -> {:#010x}", BASE + offset, value);
    }

    let pattern = [0x0123_4567, 0x89ab_cdef, 0xa5a5_a5a5, 0x5a5a_5a5a];
    for (offset, value) in [0x0, 0x4, 0x8, 0xc].into_iter().zip(pattern) {
        bus.iowrite32(value, BASE + offset).await?;
        tracing::info!("write {:#010x} <- {:#010x}", BASE + offset, value);
    }

    bus.stop().await?;
    tracing::info!("finished after {} cycles", bus.cycles());

    Ok(())
}
