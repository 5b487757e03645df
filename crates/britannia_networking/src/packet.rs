//! Framed packets and the handler they are dispatched to.

use crate::error::{NetworkError, NetworkResult};

/// One framed inbound packet. The first byte is the packet id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    bytes: Vec<u8>,
}

impl Packet {
    /// Wraps framed bytes.
    ///
    /// # Errors
    ///
    /// `EmptyPacket` if `bytes` is empty.
    pub fn new(bytes: Vec<u8>) -> NetworkResult<Self> {
        if bytes.is_empty() {
            return Err(NetworkError::EmptyPacket);
        }
        Ok(Self { bytes })
    }

    /// Packet id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u8 {
        self.bytes[0]
    }

    /// Bytes after the id.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..]
    }

    /// Full framed length.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; a packet has at least its id.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Consumes packets on the frame loop thread.
pub trait PacketHandler {
    /// Handles one packet.
    fn handle(&mut self, packet: &Packet);
}

impl<F> PacketHandler for F
where
    F: FnMut(&Packet),
{
    fn handle(&mut self, packet: &Packet) {
        self(packet);
    }
}
