//! Memory-mapped I/O accessors.
//!
//! Kernel-style `ioread*`/`iowrite*` helpers on top of [`BusMaster::rw`].
//! Narrow accesses go through [`lanes`](super::lanes) to pick their byte
//! strobes; the `_rep` forms hit the same address once per element, the way
//! a driver drains or fills a FIFO register.

use tokio::io::{AsyncRead, AsyncWrite};

use super::engine::BusMaster;
use super::lanes::{byte_lane, half_lane, word_lane};
use crate::error::Result;

impl<W, R> BusMaster<W, R>
where
    W: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    /// Read one byte.
    pub async fn ioread8(&mut self, addr: u32) -> Result<u8> {
        let lane = byte_lane(addr);
        let word = self.rw(false, addr, lane.sel, 0).await?;
        Ok(lane.extract(word) as u8)
    }

    /// Read a half-word; `addr & 3` must be 0 or 2.
    pub async fn ioread16(&mut self, addr: u32) -> Result<u16> {
        let lane = half_lane(addr)?;
        let word = self.rw(false, addr, lane.sel, 0).await?;
        Ok(lane.extract(word) as u16)
    }

    /// Read a word.
    pub async fn ioread32(&mut self, addr: u32) -> Result<u32> {
        let lane = word_lane(addr);
        self.rw(false, addr, lane.sel, 0).await
    }

    /// Write one byte.
    pub async fn iowrite8(&mut self, value: u8, addr: u32) -> Result<()> {
        let lane = byte_lane(addr);
        self.rw(true, addr, lane.sel, lane.place(u32::from(value)))
            .await?;
        Ok(())
    }

    /// Write a half-word; `addr & 3` must be 0 or 2.
    pub async fn iowrite16(&mut self, value: u16, addr: u32) -> Result<()> {
        let lane = half_lane(addr)?;
        self.rw(true, addr, lane.sel, lane.place(u32::from(value)))
            .await?;
        Ok(())
    }

    /// Write a word.
    pub async fn iowrite32(&mut self, value: u32, addr: u32) -> Result<()> {
        let lane = word_lane(addr);
        self.rw(true, addr, lane.sel, value).await?;
        Ok(())
    }

    /// Fill `buf` with consecutive byte reads from `addr`.
    pub async fn ioread8_rep(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        for slot in buf.iter_mut() {
            *slot = self.ioread8(addr).await?;
        }
        Ok(())
    }

    /// Fill `buf` with consecutive half-word reads from `addr`.
    pub async fn ioread16_rep(&mut self, addr: u32, buf: &mut [u16]) -> Result<()> {
        half_lane(addr)?;
        for slot in buf.iter_mut() {
            *slot = self.ioread16(addr).await?;
        }
        Ok(())
    }

    /// Fill `buf` with consecutive word reads from `addr`.
    pub async fn ioread32_rep(&mut self, addr: u32, buf: &mut [u32]) -> Result<()> {
        for slot in buf.iter_mut() {
            *slot = self.ioread32(addr).await?;
        }
        Ok(())
    }

    /// Write every byte of `buf` to `addr`.
    pub async fn iowrite8_rep(&mut self, addr: u32, buf: &[u8]) -> Result<()> {
        for &value in buf {
            self.iowrite8(value, addr).await?;
        }
        Ok(())
    }

    /// Write every half-word of `buf` to `addr`.
    pub async fn iowrite16_rep(&mut self, addr: u32, buf: &[u16]) -> Result<()> {
        half_lane(addr)?;
        for &value in buf {
            self.iowrite16(value, addr).await?;
        }
        Ok(())
    }

    /// Write every word of `buf` to `addr`.
    pub async fn iowrite32_rep(&mut self, addr: u32, buf: &[u32]) -> Result<()> {
        for &value in buf {
            self.iowrite32(value, addr).await?;
        }
        Ok(())
    }
}
