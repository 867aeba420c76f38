//! Error types for zbus-cosim.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for all co-simulation operations.
#[derive(Debug, Error)]
pub enum CosimError {
    /// I/O error on the channel outside of a counted transfer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A channel endpoint could not be opened in the required direction.
    #[error("cannot open channel endpoint {}: {source}", path.display())]
    ChannelOpen {
        /// Path of the FIFO that failed to open.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Sub-word access whose address does not fit a byte lane pattern.
    #[error("misaligned {width}-bit access at address {addr:#010x}")]
    Misaligned {
        /// Requested bus address.
        addr: u32,
        /// Access width in bits.
        width: u32,
    },

    /// A polling loop ran past the configured test bound.
    ///
    /// Only produced when a poll limit was set; production sessions wait
    /// forever instead.
    #[error("{phase} not observed within {limit} cycles")]
    PollLimitExceeded {
        /// Handshake phase that was waiting (`reset`, `ack` or `req`).
        phase: &'static str,
        /// The configured bound.
        limit: u64,
    },

    /// Malformed frame or configuration value.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Stream ended in the middle of a frame.
    #[error("Connection closed")]
    ConnectionClosed,
}

/// Result type alias using CosimError.
pub type Result<T> = std::result::Result<T, CosimError>;
