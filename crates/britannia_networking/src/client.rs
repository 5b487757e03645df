//! # Network Client
//!
//! `NetworkClient` is what the frame scheduler sees. One `slice` per frame:
//! drain what the transport delivered, up to a budget, and return.

use tracing::{debug, info};

use crate::config::NetworkConfig;
use crate::inbound::{InboundQueue, Popped};
use crate::packet::PacketHandler;
use crate::DEFAULT_MAX_PACKETS_PER_SLICE;

/// Connection state as seen from the frame loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No server; slices do nothing.
    #[default]
    Offline,
    /// Packets may arrive.
    Connected,
    /// The transport went away.
    Disconnected,
}

/// What one slice did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceStats {
    /// Packets handled in this slice.
    pub processed: usize,
    /// Packets still queued when the slice returned.
    pub backlog: usize,
    /// State after the slice.
    pub state: ConnectionState,
}

impl SliceStats {
    /// Returns true if the slice stopped because of its budget.
    #[inline]
    #[must_use]
    pub fn budget_exhausted(&self) -> bool {
        self.backlog > 0
    }
}

/// One bounded, non-blocking unit of network processing.
pub trait NetworkClient {
    /// Processes what is available now, up to the client's budget.
    fn slice(&mut self) -> SliceStats;

    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// Applies loaded limits. Clients without a budget ignore it.
    fn configure(&mut self, _config: &NetworkConfig) {}
}

impl<T: NetworkClient + ?Sized> NetworkClient for Box<T> {
    fn slice(&mut self) -> SliceStats {
        (**self).slice()
    }

    fn state(&self) -> ConnectionState {
        (**self).state()
    }

    fn configure(&mut self, config: &NetworkConfig) {
        (**self).configure(config);
    }
}

/// Drains an `InboundQueue` into a `PacketHandler`.
pub struct ChannelNetworkClient<H> {
    queue: InboundQueue,
    handler: H,
    max_packets: usize,
    state: ConnectionState,
    total_packets: u64,
}

impl<H: PacketHandler> ChannelNetworkClient<H> {
    /// Creates a connected client draining at most `max_packets` per slice.
    #[must_use]
    pub fn new(queue: InboundQueue, handler: H, max_packets: usize) -> Self {
        Self {
            queue,
            handler,
            max_packets: max_packets.max(1),
            state: ConnectionState::Connected,
            total_packets: 0,
        }
    }

    /// Creates a client with the default budget.
    #[must_use]
    pub fn with_default_budget(queue: InboundQueue, handler: H) -> Self {
        Self::new(queue, handler, DEFAULT_MAX_PACKETS_PER_SLICE)
    }

    /// Creates a client over a queue sized by `config`, with its budget.
    #[must_use]
    pub fn from_config(config: &NetworkConfig, handler: H) -> Self {
        Self::new(config.inbound_queue(), handler, config.max_packets_per_slice)
    }

    /// The inbound queue, e.g. to hand out senders.
    #[must_use]
    pub fn queue(&self) -> &InboundQueue {
        &self.queue
    }

    /// Packets dispatched per slice at most.
    #[must_use]
    pub const fn max_packets(&self) -> usize {
        self.max_packets
    }

    /// The packet handler.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The packet handler, mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Packets handled since creation.
    #[must_use]
    pub const fn total_packets(&self) -> u64 {
        self.total_packets
    }
}

impl<H: PacketHandler> NetworkClient for ChannelNetworkClient<H> {
    fn slice(&mut self) -> SliceStats {
        let mut processed = 0;

        if self.state == ConnectionState::Connected {
            while processed < self.max_packets {
                match self.queue.pop() {
                    Popped::Packet(packet) => {
                        self.handler.handle(&packet);
                        processed += 1;
                    }
                    Popped::Empty => break,
                    Popped::Closed => {
                        info!(total = self.total_packets + processed as u64, "transport closed");
                        self.state = ConnectionState::Disconnected;
                        break;
                    }
                }
            }
        }

        self.total_packets += processed as u64;
        let stats = SliceStats {
            processed,
            backlog: self.queue.len(),
            state: self.state,
        };
        if stats.budget_exhausted() {
            debug!(processed, backlog = stats.backlog, "slice budget exhausted");
        }
        stats
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn configure(&mut self, config: &NetworkConfig) {
        self.max_packets = config.max_packets_per_slice.max(1);
        debug!(max_packets = self.max_packets, "slice budget configured");
    }
}

/// A client with no server. Slices are no-ops.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineNetworkClient {
    slices: u64,
}

impl OfflineNetworkClient {
    /// Creates an offline client.
    #[must_use]
    pub const fn new() -> Self {
        Self { slices: 0 }
    }

    /// Slices run so far.
    #[must_use]
    pub const fn slices(&self) -> u64 {
        self.slices
    }
}

impl NetworkClient for OfflineNetworkClient {
    fn slice(&mut self) -> SliceStats {
        self.slices += 1;
        SliceStats::default()
    }

    fn state(&self) -> ConnectionState {
        ConnectionState::Offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;

    #[test]
    fn test_offline_slice_counts() {
        let mut client = OfflineNetworkClient::new();
        let stats = client.slice();

        assert_eq!(stats.processed, 0);
        assert_eq!(stats.state, ConnectionState::Offline);
        assert_eq!(client.slices(), 1);
    }

    #[test]
    fn test_slice_respects_budget() {
        let queue = InboundQueue::new(16);
        let sender = queue.sender().unwrap();
        for id in 0..5 {
            sender.push(Packet::new(vec![id]).unwrap()).unwrap();
        }

        let mut seen = Vec::new();
        let mut client = ChannelNetworkClient::new(queue, |p: &Packet| seen.push(p.id()), 3);

        let first = client.slice();
        assert_eq!((first.processed, first.backlog), (3, 2));
        assert!(first.budget_exhausted());

        let second = client.slice();
        assert_eq!((second.processed, second.backlog), (2, 0));
        assert_eq!(client.total_packets(), 5);
        drop(client);

        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_configure_replaces_budget() {
        let config = NetworkConfig {
            max_packets_per_slice: 2,
            inbound_capacity: 8,
        };
        let mut client =
            ChannelNetworkClient::with_default_budget(config.inbound_queue(), |_: &Packet| {});
        let sender = client.queue().sender().unwrap();
        for id in 0..5 {
            sender.push(Packet::new(vec![id]).unwrap()).unwrap();
        }

        client.configure(&config);
        assert_eq!(client.max_packets(), 2);

        let stats = client.slice();
        assert_eq!((stats.processed, stats.backlog), (2, 3));
    }

    #[test]
    fn test_from_config_sizes_queue() {
        let config = NetworkConfig {
            max_packets_per_slice: 4,
            inbound_capacity: 3,
        };
        let client = ChannelNetworkClient::from_config(&config, |_: &Packet| {});

        assert_eq!(client.queue().capacity(), 3);
        assert_eq!(client.max_packets(), 4);
    }
}
