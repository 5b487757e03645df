//! # Inbound Queue
//!
//! Bounded hand-off from the transport thread to the frame loop. The frame
//! loop owns the `InboundQueue`; the transport holds cloned `InboundSender`s.
//! When every sender is dropped the queue reports the connection as closed.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::error::{NetworkError, NetworkResult};
use crate::packet::Packet;
use crate::DEFAULT_INBOUND_CAPACITY;

/// Result of one non-blocking pop.
#[derive(Debug, PartialEq, Eq)]
pub enum Popped {
    /// A packet was waiting.
    Packet(Packet),
    /// Nothing waiting right now.
    Empty,
    /// Nothing waiting and every sender is gone.
    Closed,
}

/// Transport-side handle.
#[derive(Clone, Debug)]
pub struct InboundSender {
    sender: Sender<Packet>,
    capacity: usize,
}

impl InboundSender {
    /// Queues a packet without blocking.
    ///
    /// # Errors
    ///
    /// `QueueFull` if the frame loop is behind, `Disconnected` if it is gone.
    pub fn push(&self, packet: Packet) -> NetworkResult<()> {
        self.sender.try_send(packet).map_err(|e| match e {
            TrySendError::Full(_) => NetworkError::QueueFull {
                capacity: self.capacity,
            },
            TrySendError::Disconnected(_) => NetworkError::Disconnected,
        })
    }

    /// Queues a packet, waiting for room.
    ///
    /// # Errors
    ///
    /// `Disconnected` if the frame loop is gone.
    pub fn push_blocking(&self, packet: Packet) -> NetworkResult<()> {
        self.sender
            .send(packet)
            .map_err(|_| NetworkError::Disconnected)
    }
}

/// Frame-loop side of the hand-off.
#[derive(Debug)]
pub struct InboundQueue {
    receiver: Receiver<Packet>,
    sender: Option<Sender<Packet>>,
    capacity: usize,
}

impl InboundQueue {
    /// Creates a queue holding at most `capacity` packets.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        Self {
            receiver,
            sender: Some(sender),
            capacity,
        }
    }

    /// A sender for the transport thread.
    ///
    /// Returns `None` once `seal` has been called.
    #[must_use]
    pub fn sender(&self) -> Option<InboundSender> {
        self.sender.as_ref().map(|sender| InboundSender {
            sender: sender.clone(),
            capacity: self.capacity,
        })
    }

    /// Drops the queue's own sender so the queue closes when the transport's
    /// senders are dropped. Call after handing out senders.
    pub fn seal(&mut self) {
        self.sender = None;
    }

    /// Pops one packet without blocking.
    pub fn pop(&self) -> Popped {
        match self.receiver.try_recv() {
            Ok(packet) => Popped::Packet(packet),
            Err(TryRecvError::Empty) => Popped::Empty,
            Err(TryRecvError::Disconnected) => Popped::Closed,
        }
    }

    /// Packets waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns true if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Queue capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self::new(DEFAULT_INBOUND_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(id: u8) -> Packet {
        Packet::new(vec![id]).unwrap()
    }

    #[test]
    fn test_push_and_pop_in_order() {
        let queue = InboundQueue::new(4);
        let sender = queue.sender().unwrap();
        sender.push(packet(1)).unwrap();
        sender.push(packet(2)).unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Popped::Packet(packet(1)));
        assert_eq!(queue.pop(), Popped::Packet(packet(2)));
        assert_eq!(queue.pop(), Popped::Empty);
    }

    #[test]
    fn test_full_queue_rejects() {
        let queue = InboundQueue::new(1);
        let sender = queue.sender().unwrap();
        sender.push(packet(1)).unwrap();

        assert_eq!(sender.push(packet(2)), Err(NetworkError::QueueFull { capacity: 1 }));
    }

    #[test]
    fn test_sealed_queue_closes_with_last_sender() {
        let mut queue = InboundQueue::new(4);
        let sender = queue.sender().unwrap();
        queue.seal();
        assert!(queue.sender().is_none());

        sender.push(packet(9)).unwrap();
        drop(sender);

        // Queued packets are still delivered before the close is reported.
        assert_eq!(queue.pop(), Popped::Packet(packet(9)));
        assert_eq!(queue.pop(), Popped::Closed);
    }
}
