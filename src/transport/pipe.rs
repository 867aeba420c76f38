//! Named pipe (FIFO) endpoints.
//!
//! The bus master opens its output FIFO write-only and then its input FIFO
//! read-only. The simulator side opens the same two paths in the same order
//! with the complementary directions, so each `open` rendezvous completes
//! before the next begins.
//!
//! Opening a FIFO blocks until the other end shows up; that wait runs on
//! tokio's blocking pool and the file is then registered with the reactor.
//!
//! # Example
//!
//! ```ignore
//! use zbus_cosim::transport::open_master_channel;
//!
//! let channel = open_master_channel("tmp/interface-o.fifo", "tmp/interface-i.fifo").await?;
//! ```

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tokio::net::unix::pipe;

use super::Channel;
use crate::error::{CosimError, Result};

/// Channel backed by a pair of FIFOs.
pub type FifoChannel = Channel<pipe::Sender, pipe::Receiver>;

/// Direction a FIFO is opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Write,
    Read,
}

/// Open a FIFO, waiting for the other end without blocking the runtime.
async fn open_blocking(path: &Path, direction: Direction) -> Result<File> {
    let owned: PathBuf = path.to_path_buf();
    let opened = tokio::task::spawn_blocking(move || {
        let mut options = OpenOptions::new();
        match direction {
            Direction::Write => options.write(true),
            Direction::Read => options.read(true),
        };
        options.open(&owned)
    })
    .await
    .map_err(std::io::Error::other)
    .and_then(|r| r);

    opened.map_err(|source| CosimError::ChannelOpen {
        path: path.to_path_buf(),
        source,
    })
}

/// Open a FIFO write-only.
pub async fn open_sender(path: impl AsRef<Path>) -> Result<pipe::Sender> {
    let path = path.as_ref();
    let file = open_blocking(path, Direction::Write).await?;
    let sender = pipe::Sender::from_file(file).map_err(|source| CosimError::ChannelOpen {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("opened output endpoint {}", path.display());
    Ok(sender)
}

/// Open a FIFO read-only.
pub async fn open_receiver(path: impl AsRef<Path>) -> Result<pipe::Receiver> {
    let path = path.as_ref();
    let file = open_blocking(path, Direction::Read).await?;
    let receiver = pipe::Receiver::from_file(file).map_err(|source| CosimError::ChannelOpen {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("opened input endpoint {}", path.display());
    Ok(receiver)
}

/// Open the bus master's side: `output` write-only, then `input` read-only.
pub async fn open_master_channel(
    output: impl AsRef<Path>,
    input: impl AsRef<Path>,
) -> Result<FifoChannel> {
    let sender = open_sender(output).await?;
    let receiver = open_receiver(input).await?;
    Ok(Channel::new(sender, receiver))
}

/// Open the simulator's side: the master's `output` read-only, then the
/// master's `input` write-only.
///
/// Returns `(reader, writer)`.
pub async fn open_peer_endpoints(
    output: impl AsRef<Path>,
    input: impl AsRef<Path>,
) -> Result<(pipe::Receiver, pipe::Sender)> {
    let receiver = open_receiver(output).await?;
    let sender = open_sender(input).await?;
    Ok((receiver, sender))
}
