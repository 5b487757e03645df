//! Network error types.

use thiserror::Error;

/// Errors raised while handing packets to the frame loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The frame loop is not keeping up; the packet was not queued.
    #[error("inbound queue full ({capacity} packets)")]
    QueueFull {
        /// Queue capacity.
        capacity: usize,
    },

    /// The frame loop side is gone.
    #[error("inbound queue disconnected")]
    Disconnected,

    /// A packet with no bytes.
    #[error("empty packet")]
    EmptyPacket,
}

/// Result type for network operations.
pub type NetworkResult<T> = Result<T, NetworkError>;
