//! # Britannia Networking
//!
//! The network side of the frame loop. The scheduler calls
//! `NetworkClient::slice` exactly once per frame; everything else (sockets,
//! the wire codec, login) lives behind that call.
//!
//! ## Data Flow
//!
//! ```text
//! transport thread                      frame loop
//! ┌──────────────┐   InboundSender    ┌────────────────────────────┐
//! │ socket read  │ ─────push────────> │ InboundQueue (bounded)     │
//! │ frame decode │                    │          │                 │
//! └──────────────┘                    │   slice(): drain <= N      │
//!                                     │          ▼                 │
//!                                     │   PacketHandler::handle    │
//!                                     └────────────────────────────┘
//! ```

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;
pub mod inbound;
pub mod packet;

pub use client::{
    ChannelNetworkClient, ConnectionState, NetworkClient, OfflineNetworkClient, SliceStats,
};
pub use config::NetworkConfig;
pub use error::{NetworkError, NetworkResult};
pub use inbound::{InboundQueue, InboundSender, Popped};
pub use packet::{Packet, PacketHandler};

/// Packets drained per slice unless configured otherwise.
pub const DEFAULT_MAX_PACKETS_PER_SLICE: usize = 64;

/// Inbound queue capacity unless configured otherwise.
pub const DEFAULT_INBOUND_CAPACITY: usize = 1024;
