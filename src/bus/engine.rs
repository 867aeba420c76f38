//! Bus master protocol engine.
//!
//! Every operation is a polling loop over [`Channel::exchange`]: one
//! exchange is one simulated clock edge, and the loop only moves on once the
//! simulator has answered. The handshake for a transfer runs in two phases:
//!
//! ```text
//! request frame ──► ACK_WAIT ──(ack, write)──────────────────► DONE
//!                   │  ▲
//!                   └──┘ !ack, resend request
//!                   │
//!                   └──(ack, read)──► REQ_WAIT ──(req)──────► DONE
//!                                     │  ▲
//!                                     └──┘ !req, send idle frame
//! ```
//!
//! Writes finish as soon as the command is accepted; reads keep the bus idle
//! until the data is flagged valid.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{CosimError, Result};
use crate::protocol::{ControlScalar, InboundFrame, OutboundFrame, INBOUND_FRAME_SIZE, SCALAR_SIZE};
use crate::transport::Channel;

/// A bus master session.
///
/// Owns the channel and the frames of the cycle in flight. Operations take
/// `&mut self`, so a session drives exactly one transaction at a time.
#[derive(Debug)]
pub struct BusMaster<W, R> {
    channel: Channel<W, R>,
    d_o: OutboundFrame,
    c_o: ControlScalar,
    d_i: InboundFrame,
    c_i: ControlScalar,
    poll_limit: Option<u64>,
    cycles: u64,
}

impl<W, R> BusMaster<W, R>
where
    W: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    /// Start a session over an open channel.
    pub fn new(channel: Channel<W, R>) -> Self {
        Self {
            channel,
            d_o: OutboundFrame::idle(),
            c_o: ControlScalar::RUN,
            d_i: InboundFrame::quiet(),
            c_i: ControlScalar::RUN,
            poll_limit: None,
            cycles: 0,
        }
    }

    /// Bound every polling loop to `limit` cycles.
    ///
    /// A loop that runs out fails with [`CosimError::PollLimitExceeded`].
    /// Intended for test harnesses; real sessions wait for the simulator
    /// however long it takes.
    pub fn with_poll_limit(mut self, limit: u64) -> Self {
        self.poll_limit = Some(limit);
        self
    }

    /// Current polling bound.
    pub fn poll_limit(&self) -> Option<u64> {
        self.poll_limit
    }

    /// Number of exchanges performed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Inbound frame of the most recent exchange.
    pub fn last_inbound(&self) -> &InboundFrame {
        &self.d_i
    }

    /// Inbound control scalar of the most recent exchange.
    pub fn last_scalar(&self) -> ControlScalar {
        self.c_i
    }

    /// End the session and hand back the channel.
    pub fn into_channel(self) -> Channel<W, R> {
        self.channel
    }

    /// Hold the bus idle until the simulator releases reset.
    ///
    /// Exchanges the idle frame once, then again for as long as the inbound
    /// scalar reports reset asserted.
    pub async fn reset(&mut self) -> Result<()> {
        self.d_o = OutboundFrame::idle();
        self.c_o = ControlScalar::RUN;

        let polled = self.poll_until("reset", |_, rst| !rst.is_set()).await?;
        tracing::debug!(cycles = polled, "reset released");
        Ok(())
    }

    /// Run one bus transfer.
    ///
    /// Sends the request until the simulator acknowledges it. A write then
    /// returns `data` unchanged. A read samples `req` on the acknowledging
    /// cycle and, if it is still low, idles the bus until it rises; the data
    /// word of that cycle is returned, with `X` bits read as 1 and `Z` bits
    /// as 0.
    pub async fn rw(&mut self, wen: bool, addr: u32, sel: u8, data: u32) -> Result<u32> {
        self.d_o = OutboundFrame::request(wen, addr, sel, data);
        self.c_o = ControlScalar::RUN;

        let ack_cycles = self.poll_until("ack", |d_i, _| d_i.ack()).await?;

        if wen {
            tracing::debug!(addr, sel, data, cycles = ack_cycles, "write");
            return Ok(data);
        }

        let mut req_cycles = 0;
        if !self.d_i.req() {
            self.d_o = OutboundFrame::idle();
            req_cycles = self.poll_until("req", |d_i, _| d_i.req()).await?;
        }

        let word = self.d_i.dat;
        if !word.is_known() {
            tracing::debug!(addr, planes = ?word.planes(), "read data is not fully driven");
        }
        let value = word.to_u32_lossy();
        tracing::debug!(addr, sel, value, cycles = ack_cycles + req_cycles, "read");
        Ok(value)
    }

    /// Keep the bus idle for `cycles` clock edges, ignoring the replies.
    ///
    /// Never fails; the `Result` keeps the signature in line with the other
    /// bus operations.
    pub async fn idle(&mut self, cycles: u64) -> Result<()> {
        self.d_o = OutboundFrame::idle();
        self.c_o = ControlScalar::RUN;

        for _ in 0..cycles {
            self.cycle().await;
        }
        Ok(())
    }

    /// Ask the simulator to finish.
    ///
    /// Sends the idle frame once with the stop scalar and reads nothing
    /// back.
    pub async fn stop(&mut self) -> Result<()> {
        self.d_o = OutboundFrame::idle();
        self.c_o = ControlScalar::STOP;

        let frame = self.d_o.encode();
        let scalar = self.c_o.encode();
        let errors = self.channel.exchange(&frame, &scalar, &mut [], &mut []).await;
        self.cycles += 1;
        if errors > 0 {
            tracing::warn!(cycle = self.cycles, errors, "transfer length mismatch on stop");
        }
        tracing::debug!(cycle = self.cycles, "stop sent");
        Ok(())
    }

    /// Repeat the current outbound frame until `done` holds for the reply.
    ///
    /// Only a cycle with a complete reply can satisfy `done`. Returns the
    /// number of exchanges, the satisfying one included.
    async fn poll_until<F>(&mut self, phase: &'static str, done: F) -> Result<u64>
    where
        F: Fn(&InboundFrame, ControlScalar) -> bool,
    {
        let mut polled = 0;
        loop {
            if let Some(limit) = self.poll_limit {
                if polled >= limit {
                    return Err(CosimError::PollLimitExceeded { phase, limit });
                }
            }
            let fresh = self.cycle().await;
            polled += 1;
            if fresh && done(&self.d_i, self.c_i) {
                return Ok(polled);
            }
        }
    }

    /// One full exchange: outbound frame and scalar out, scalar and frame in.
    ///
    /// An inbound segment that comes up short leaves the previous value in
    /// place. Returns whether a complete reply arrived.
    async fn cycle(&mut self) -> bool {
        let frame = self.d_o.encode();
        let scalar = self.c_o.encode();
        let mut c_i = [0u8; SCALAR_SIZE];
        let mut d_i = [0u8; INBOUND_FRAME_SIZE];

        let status = self
            .channel
            .exchange_segments(&frame, &scalar, &mut c_i, &mut d_i)
            .await;
        self.cycles += 1;
        let errors = status.errors();
        if errors > 0 {
            tracing::warn!(cycle = self.cycles, errors, "transfer length mismatch");
        }

        if status.in_a {
            self.c_i = ControlScalar::decode(c_i);
        }
        if status.in_b {
            if let Some(inbound) = InboundFrame::decode(&d_i) {
                self.d_i = inbound;
            }
        }
        tracing::trace!(
            cycle = self.cycles,
            ack = self.d_i.ack(),
            req = self.d_i.req(),
            rst = self.c_i.0,
            "cycle"
        );
        status.in_a && status.in_b
    }
}

#[cfg(unix)]
impl BusMaster<tokio::net::unix::pipe::Sender, tokio::net::unix::pipe::Receiver> {
    /// Open the session's FIFOs and apply the configured poll limit.
    pub async fn open(config: &crate::config::SessionConfig) -> Result<Self> {
        let channel = crate::transport::open_master_channel(&config.output, &config.input).await?;
        let mut master = Self::new(channel);
        master.poll_limit = config.poll_limit;
        Ok(master)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{FourStateWord, OUTBOUND_FRAME_SIZE};
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};

    type TestMaster = BusMaster<DuplexStream, DuplexStream>;

    /// Master plus the simulator's ends of both streams.
    fn session() -> (TestMaster, DuplexStream, DuplexStream) {
        let (master_out, sim_in) = duplex(4096);
        let (sim_out, master_in) = duplex(4096);
        let master = BusMaster::new(Channel::new(master_out, master_in)).with_poll_limit(64);
        (master, sim_in, sim_out)
    }

    /// Pre-load replies for `n` cycles.
    async fn queue_replies(sim_out: &mut DuplexStream, replies: &[(i32, InboundFrame)]) {
        for (rst, frame) in replies {
            sim_out
                .write_all(&ControlScalar(*rst).encode())
                .await
                .unwrap();
            sim_out.write_all(&frame.encode()).await.unwrap();
        }
    }

    async fn read_outbound(sim_in: &mut DuplexStream) -> (OutboundFrame, ControlScalar) {
        let mut frame = [0u8; OUTBOUND_FRAME_SIZE];
        let mut scalar = [0u8; SCALAR_SIZE];
        sim_in.read_exact(&mut frame).await.unwrap();
        sim_in.read_exact(&mut scalar).await.unwrap();
        (
            OutboundFrame::decode(&frame).unwrap(),
            ControlScalar::decode(scalar),
        )
    }

    #[tokio::test]
    async fn test_write_acked_first_cycle_echoes_data() {
        let (mut master, mut sim_in, mut sim_out) = session();
        queue_replies(&mut sim_out, &[(0, InboundFrame::new(true, false, FourStateWord::unknown()))]).await;

        let result = master.rw(true, 0x40, 0xf, 0xa5a5_5a5a).await.unwrap();

        assert_eq!(result, 0xa5a5_5a5a);
        assert_eq!(master.cycles(), 1);

        let (sent, scalar) = read_outbound(&mut sim_in).await;
        assert_eq!(sent, OutboundFrame::request(true, 0x40, 0xf, 0xa5a5_5a5a));
        assert_eq!(scalar, ControlScalar::RUN);
    }

    #[tokio::test]
    async fn test_read_with_req_on_ack_cycle() {
        let (mut master, _sim_in, mut sim_out) = session();
        queue_replies(
            &mut sim_out,
            &[(0, InboundFrame::new(true, true, FourStateWord::known(0xfeed)))],
        )
        .await;

        let value = master.rw(false, 0x8, 0xf, 0).await.unwrap();
        assert_eq!(value, 0xfeed);
        assert_eq!(master.cycles(), 1);
    }

    #[tokio::test]
    async fn test_read_switches_to_idle_frame_after_ack() {
        let (mut master, mut sim_in, mut sim_out) = session();
        queue_replies(
            &mut sim_out,
            &[
                (0, InboundFrame::new(true, false, FourStateWord::unknown())),
                (0, InboundFrame::new(false, true, FourStateWord::known(0x42))),
            ],
        )
        .await;

        assert_eq!(master.rw(false, 0x4, 0xf, 0).await.unwrap(), 0x42);

        let (first, _) = read_outbound(&mut sim_in).await;
        let (second, _) = read_outbound(&mut sim_in).await;
        assert!(first.is_request());
        assert_eq!(first.wen(), Some(false));
        assert_eq!(second, OutboundFrame::idle());
    }

    #[tokio::test]
    async fn test_read_unknown_data_is_lossy() {
        let (mut master, _sim_in, mut sim_out) = session();
        let dat = FourStateWord::from_planes(0x0000_00f0, 0x0000_ff00);
        queue_replies(&mut sim_out, &[(0, InboundFrame::new(true, true, dat))]).await;

        assert_eq!(master.rw(false, 0, 0xf, 0).await.unwrap(), 0xf0);
    }

    #[tokio::test]
    async fn test_reset_waits_for_release() {
        let (mut master, mut sim_in, mut sim_out) = session();
        let quiet = InboundFrame::quiet();
        queue_replies(&mut sim_out, &[(1, quiet), (1, quiet), (0, quiet), (1, quiet)]).await;

        master.reset().await.unwrap();
        assert_eq!(master.cycles(), 3);
        assert_eq!(master.last_scalar(), ControlScalar::RUN);

        for _ in 0..3 {
            let (frame, scalar) = read_outbound(&mut sim_in).await;
            assert_eq!(frame, OutboundFrame::idle());
            assert_eq!(scalar, ControlScalar::RUN);
        }
    }

    #[tokio::test]
    async fn test_reset_already_released() {
        let (mut master, _sim_in, mut sim_out) = session();
        queue_replies(&mut sim_out, &[(0, InboundFrame::quiet())]).await;

        master.reset().await.unwrap();
        assert_eq!(master.cycles(), 1);
    }

    #[tokio::test]
    async fn test_idle_counts_cycles_and_ignores_replies() {
        let (mut master, mut sim_in, mut sim_out) = session();
        let busy = InboundFrame::new(true, true, FourStateWord::known(0x1234));
        queue_replies(&mut sim_out, &[(1, busy), (0, busy), (7, busy)]).await;

        master.idle(3).await.unwrap();
        assert_eq!(master.cycles(), 3);

        for _ in 0..3 {
            let (frame, scalar) = read_outbound(&mut sim_in).await;
            assert_eq!(frame, OutboundFrame::idle());
            assert_eq!(scalar, ControlScalar::RUN);
        }
    }

    #[tokio::test]
    async fn test_idle_zero_cycles() {
        let (mut master, _sim_in, _sim_out) = session();
        master.idle(0).await.unwrap();
        assert_eq!(master.cycles(), 0);
    }

    #[tokio::test]
    async fn test_stop_sends_once_and_reads_nothing() {
        let (mut master, mut sim_in, _sim_out) = session();

        master.stop().await.unwrap();
        assert_eq!(master.cycles(), 1);

        let (frame, scalar) = read_outbound(&mut sim_in).await;
        assert_eq!(frame, OutboundFrame::idle());
        assert_eq!(scalar, ControlScalar::STOP);
    }

    #[tokio::test]
    async fn test_poll_limit_on_silent_ack() {
        let (master, _sim_in, mut sim_out) = session();
        let mut master = master.with_poll_limit(3);
        let quiet = InboundFrame::quiet();
        queue_replies(&mut sim_out, &[(0, quiet), (0, quiet), (0, quiet)]).await;

        let err = master.rw(false, 0, 0xf, 0).await.unwrap_err();
        assert!(matches!(
            err,
            CosimError::PollLimitExceeded {
                phase: "ack",
                limit: 3
            }
        ));
        assert_eq!(master.cycles(), 3);
    }

    #[tokio::test]
    async fn test_poll_limit_on_stuck_reset() {
        let (master, _sim_in, mut sim_out) = session();
        let mut master = master.with_poll_limit(2);
        let quiet = InboundFrame::quiet();
        queue_replies(&mut sim_out, &[(1, quiet), (1, quiet)]).await;

        let err = master.reset().await.unwrap_err();
        assert!(matches!(
            err,
            CosimError::PollLimitExceeded { phase: "reset", .. }
        ));
    }

    #[tokio::test]
    async fn test_reset_not_released_by_closed_peer() {
        let (master, _sim_in, mut sim_out) = session();
        let mut master = master.with_poll_limit(50);
        queue_replies(&mut sim_out, &[(1, InboundFrame::quiet())]).await;
        drop(sim_out);

        let err = master.reset().await.unwrap_err();
        assert!(matches!(
            err,
            CosimError::PollLimitExceeded {
                phase: "reset",
                limit: 50
            }
        ));
        assert_eq!(master.last_scalar(), ControlScalar(1));
    }

    #[tokio::test]
    async fn test_truncated_reply_keeps_previous_frame() {
        let (master, _sim_in, mut sim_out) = session();
        let mut master = master.with_poll_limit(4);
        let acked = InboundFrame::new(true, true, FourStateWord::known(0x11));
        queue_replies(&mut sim_out, &[(0, acked)]).await;
        sim_out.write_all(&ControlScalar::RUN.encode()).await.unwrap();
        sim_out.write_all(&[0u8; 6]).await.unwrap();
        drop(sim_out);

        assert_eq!(master.rw(false, 0x0, 0xf, 0).await.unwrap(), 0x11);

        let err = master.rw(false, 0x4, 0xf, 0).await.unwrap_err();
        assert!(matches!(err, CosimError::PollLimitExceeded { phase: "ack", .. }));
        assert_eq!(master.last_inbound(), &acked);
    }

    #[tokio::test]
    async fn test_unknown_ack_accepts_write() {
        let (master, _sim_in, mut sim_out) = session();
        let mut master = master.with_poll_limit(3);
        let unknown_ctl = InboundFrame {
            dat: FourStateWord::known(5),
            ctl: FourStateWord::unknown(),
        };
        queue_replies(&mut sim_out, &[(0, unknown_ctl)]).await;

        assert_eq!(master.rw(true, 0x0, 0xf, 9).await.unwrap(), 9);
        assert_eq!(master.cycles(), 1);
    }

    #[tokio::test]
    async fn test_floating_ack_is_not_accepted() {
        let (master, _sim_in, mut sim_out) = session();
        let mut master = master.with_poll_limit(2);
        let floating_ctl = InboundFrame {
            dat: FourStateWord::known(5),
            ctl: FourStateWord::floating(),
        };
        queue_replies(&mut sim_out, &[(0, floating_ctl), (0, floating_ctl)]).await;

        let err = master.rw(true, 0x0, 0xf, 9).await.unwrap_err();
        assert!(matches!(err, CosimError::PollLimitExceeded { phase: "ack", .. }));
    }
}
