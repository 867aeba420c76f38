//! Simulator-side endpoint.
//!
//! The counterpart of [`BusMaster`](crate::BusMaster): a simulator adapter
//! calls [`SimPort::recv_cycle`] once per clock edge to pick up the
//! master's frame, drives its signals, and answers with
//! [`SimPort::respond`]. A cycle carrying the stop scalar gets no answer.
//!
//! # Example
//!
//! ```ignore
//! use zbus_cosim::peer::SimPort;
//! use zbus_cosim::protocol::{ControlScalar, InboundFrame};
//!
//! let mut port = SimPort::open(&config).await?;
//! while let Some(cycle) = port.recv_cycle().await? {
//!     if cycle.is_stop() {
//!         break;
//!     }
//!     port.respond(ControlScalar::RUN, &InboundFrame::quiet()).await?;
//! }
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{CosimError, Result};
use crate::protocol::{
    ControlScalar, FourStateWord, InboundFrame, OutboundFrame, OUTBOUND_FRAME_SIZE, SCALAR_SIZE,
};

/// One clock edge worth of master output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusCycle {
    /// Frame the master is driving.
    pub frame: OutboundFrame,
    /// Side-band scalar sent with it.
    pub scalar: ControlScalar,
}

/// A decoded bus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusRequest {
    /// Write (`true`) or read.
    pub wen: bool,
    /// Target address.
    pub addr: u32,
    /// Byte-lane enables.
    pub sel: u8,
    /// Write data as driven (meaningless for reads).
    pub data: FourStateWord,
}

impl BusCycle {
    /// Check if the master asked the simulation to finish.
    #[inline]
    pub fn is_stop(&self) -> bool {
        self.scalar == ControlScalar::STOP
    }

    /// The request carried by this cycle, if the bus is not idle.
    ///
    /// Returns `None` for idle frames and for requests whose address or
    /// control bits are not fully driven.
    pub fn request(&self) -> Option<BusRequest> {
        if !self.frame.is_request() {
            return None;
        }
        Some(BusRequest {
            wen: self.frame.wen()?,
            addr: self.frame.adr.to_u32()?,
            sel: self.frame.sel()?,
            data: self.frame.dat,
        })
    }
}

/// Simulator's ends of the two streams.
#[derive(Debug)]
pub struct SimPort<R, W> {
    input: R,
    output: W,
    cycles: u64,
}

impl<R, W> SimPort<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wrap the stream the master writes to and the one it reads from.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            cycles: 0,
        }
    }

    /// Number of cycles received so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Receive the master's frame and scalar for the next clock edge.
    ///
    /// Returns `Ok(None)` if the master closed its output between frames.
    pub async fn recv_cycle(&mut self) -> Result<Option<BusCycle>> {
        let mut frame = [0u8; OUTBOUND_FRAME_SIZE];
        match read_full(&mut self.input, &mut frame).await? {
            0 => return Ok(None),
            n if n < OUTBOUND_FRAME_SIZE => return Err(CosimError::ConnectionClosed),
            _ => {}
        }

        let mut scalar = [0u8; SCALAR_SIZE];
        if read_full(&mut self.input, &mut scalar).await? < SCALAR_SIZE {
            return Err(CosimError::ConnectionClosed);
        }

        let frame = OutboundFrame::decode(&frame)
            .ok_or_else(|| CosimError::Protocol("truncated outbound frame".to_string()))?;
        self.cycles += 1;
        Ok(Some(BusCycle {
            frame,
            scalar: ControlScalar::decode(scalar),
        }))
    }

    /// Answer the current cycle with the reset status and bus reply.
    pub async fn respond(&mut self, reset: ControlScalar, frame: &InboundFrame) -> Result<()> {
        self.output.write_all(&reset.encode()).await?;
        self.output.write_all(&frame.encode()).await?;
        self.output.flush().await?;
        Ok(())
    }

    /// Split back into `(input, output)`.
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

#[cfg(unix)]
impl SimPort<tokio::net::unix::pipe::Receiver, tokio::net::unix::pipe::Sender> {
    /// Open the FIFOs named in `config` from the simulator's side.
    pub async fn open(config: &crate::config::SessionConfig) -> Result<Self> {
        let (input, output) =
            crate::transport::open_peer_endpoints(&config.output, &config.input).await?;
        Ok(Self::new(input, output))
    }
}

/// Read until `buf` is full or the stream ends; returns bytes read.
async fn read_full<R: AsyncRead + Unpin>(input: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut done = 0;
    while done < buf.len() {
        match input.read(&mut buf[done..]).await? {
            0 => break,
            n => done += n,
        }
    }
    Ok(done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_recv_cycle_decodes_request() {
        let (mut master_out, sim_in) = duplex(256);
        let (sim_out, _master_in) = duplex(256);
        let mut port = SimPort::new(sim_in, sim_out);

        let sent = OutboundFrame::request(true, 0x30, 0x3, 0xabcd);
        master_out.write_all(&sent.encode()).await.unwrap();
        master_out.write_all(&ControlScalar::RUN.encode()).await.unwrap();

        let cycle = port.recv_cycle().await.unwrap().unwrap();
        assert!(!cycle.is_stop());
        assert_eq!(
            cycle.request(),
            Some(BusRequest {
                wen: true,
                addr: 0x30,
                sel: 0x3,
                data: FourStateWord::known(0xabcd),
            })
        );
        assert_eq!(port.cycles(), 1);
    }

    #[tokio::test]
    async fn test_idle_cycle_has_no_request() {
        let cycle = BusCycle {
            frame: OutboundFrame::idle(),
            scalar: ControlScalar::STOP,
        };
        assert!(cycle.is_stop());
        assert_eq!(cycle.request(), None);
    }

    #[tokio::test]
    async fn test_recv_cycle_clean_eof() {
        let (master_out, sim_in) = duplex(64);
        let (sim_out, _master_in) = duplex(64);
        drop(master_out);
        let mut port = SimPort::new(sim_in, sim_out);

        assert!(port.recv_cycle().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recv_cycle_eof_mid_frame() {
        let (mut master_out, sim_in) = duplex(64);
        let (sim_out, _master_in) = duplex(64);
        master_out.write_all(&[0u8; 10]).await.unwrap();
        drop(master_out);
        let mut port = SimPort::new(sim_in, sim_out);

        assert!(matches!(
            port.recv_cycle().await,
            Err(CosimError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_recv_cycle_eof_before_scalar() {
        let (mut master_out, sim_in) = duplex(64);
        let (sim_out, _master_in) = duplex(64);
        master_out
            .write_all(&OutboundFrame::idle().encode())
            .await
            .unwrap();
        drop(master_out);
        let mut port = SimPort::new(sim_in, sim_out);

        assert!(matches!(
            port.recv_cycle().await,
            Err(CosimError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_respond_writes_scalar_then_frame() {
        let (_master_out, sim_in) = duplex(64);
        let (sim_out, mut master_in) = duplex(64);
        let mut port = SimPort::new(sim_in, sim_out);

        let reply = InboundFrame::new(true, false, FourStateWord::known(9));
        port.respond(ControlScalar(1), &reply).await.unwrap();

        let mut raw = [0u8; SCALAR_SIZE + 16];
        master_in.read_exact(&mut raw).await.unwrap();
        assert_eq!(&raw[..SCALAR_SIZE], &1i32.to_ne_bytes());
        assert_eq!(InboundFrame::decode(&raw[SCALAR_SIZE..]), Some(reply));
    }
}
