//! Slice budget and queue sizing, as loaded from `[network]` settings.

use britannia_core::NetworkSettings;

use crate::inbound::InboundQueue;
use crate::{DEFAULT_INBOUND_CAPACITY, DEFAULT_MAX_PACKETS_PER_SLICE};

/// Limits applied to a network client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Packets dispatched by one slice at most.
    pub max_packets_per_slice: usize,
    /// Capacity of the inbound queue.
    pub inbound_capacity: usize,
}

impl NetworkConfig {
    /// A fresh inbound queue sized by this config.
    #[must_use]
    pub fn inbound_queue(&self) -> InboundQueue {
        InboundQueue::new(self.inbound_capacity)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_packets_per_slice: DEFAULT_MAX_PACKETS_PER_SLICE,
            inbound_capacity: DEFAULT_INBOUND_CAPACITY,
        }
    }
}

impl From<&NetworkSettings> for NetworkConfig {
    fn from(settings: &NetworkSettings) -> Self {
        Self {
            max_packets_per_slice: settings.max_packets_per_slice.max(1),
            inbound_capacity: settings.inbound_capacity.max(1),
        }
    }
}
