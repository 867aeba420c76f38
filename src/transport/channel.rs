//! Channel and exchange primitive.
//!
//! A [`Channel`] pairs an output stream (frames to the peer) with an input
//! stream (frames from the peer). [`Channel::exchange`] moves up to four
//! buffers across it in a fixed order and counts the transfers that came up
//! short instead of failing, so one cycle never leaves the other half of the
//! exchange undone.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Completion of each segment of one exchange.
///
/// Skipped (empty) segments count as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentStatus {
    pub out_a: bool,
    pub out_b: bool,
    pub in_a: bool,
    pub in_b: bool,
}

impl Default for SegmentStatus {
    fn default() -> Self {
        Self {
            out_a: true,
            out_b: true,
            in_a: true,
            in_b: true,
        }
    }
}

impl SegmentStatus {
    /// Number of incomplete segments.
    pub fn errors(&self) -> usize {
        [self.out_a, self.out_b, self.in_a, self.in_b]
            .iter()
            .filter(|done| !**done)
            .count()
    }
}

/// Output and input byte streams of one session.
#[derive(Debug)]
pub struct Channel<W, R> {
    output: W,
    input: R,
}

impl<W, R> Channel<W, R>
where
    W: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    /// Pair an output stream with an input stream.
    pub fn new(output: W, input: R) -> Self {
        Self { output, input }
    }

    /// Write `out_a` then `out_b`, then read `in_a` then `in_b`.
    ///
    /// Empty buffers are skipped without touching the stream. Returns the
    /// number of segments whose transferred byte count differs from the
    /// buffer length; a short segment does not stop the remaining ones.
    pub async fn exchange(
        &mut self,
        out_a: &[u8],
        out_b: &[u8],
        in_a: &mut [u8],
        in_b: &mut [u8],
    ) -> usize {
        self.exchange_segments(out_a, out_b, in_a, in_b)
            .await
            .errors()
    }

    /// Same as [`exchange`](Self::exchange), reporting each segment.
    ///
    /// An incomplete input segment holds whatever bytes arrived before the
    /// stream ended, so callers should not decode it.
    pub async fn exchange_segments(
        &mut self,
        out_a: &[u8],
        out_b: &[u8],
        in_a: &mut [u8],
        in_b: &mut [u8],
    ) -> SegmentStatus {
        let mut status = SegmentStatus::default();

        for (segment, buf, done) in [
            ("out_a", out_a, &mut status.out_a),
            ("out_b", out_b, &mut status.out_b),
        ] {
            if buf.is_empty() {
                continue;
            }
            let moved = write_segment(&mut self.output, buf).await;
            if moved != buf.len() {
                tracing::warn!(segment, moved, expected = buf.len(), "short write");
                *done = false;
            }
        }

        if !(out_a.is_empty() && out_b.is_empty()) {
            if let Err(e) = self.output.flush().await {
                tracing::warn!("flush failed: {}", e);
            }
        }

        for (segment, buf, done) in [
            ("in_a", in_a, &mut status.in_a),
            ("in_b", in_b, &mut status.in_b),
        ] {
            if buf.is_empty() {
                continue;
            }
            let moved = read_segment(&mut self.input, buf).await;
            if moved != buf.len() {
                tracing::warn!(segment, moved, expected = buf.len(), "short read");
                *done = false;
            }
        }

        status
    }

    /// Get a mutable reference to the output stream.
    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    /// Get a mutable reference to the input stream.
    pub fn input_mut(&mut self) -> &mut R {
        &mut self.input
    }

    /// Split back into `(output, input)`.
    pub fn into_parts(self) -> (W, R) {
        (self.output, self.input)
    }
}

/// Write until `buf` is drained, the stream stops accepting bytes, or fails.
async fn write_segment<W: AsyncWrite + Unpin>(output: &mut W, buf: &[u8]) -> usize {
    let mut done = 0;
    while done < buf.len() {
        match output.write(&buf[done..]).await {
            Ok(0) => break,
            Ok(n) => done += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!("write failed after {} bytes: {}", done, e);
                break;
            }
        }
    }
    done
}

/// Read until `buf` is full, the stream ends, or fails.
async fn read_segment<R: AsyncRead + Unpin>(input: &mut R, buf: &mut [u8]) -> usize {
    let mut done = 0;
    while done < buf.len() {
        match input.read(&mut buf[done..]).await {
            Ok(0) => break,
            Ok(n) => done += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!("read failed after {} bytes: {}", done, e);
                break;
            }
        }
    }
    done
}
