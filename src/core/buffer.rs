//! Owned packet and frame buffers passed between the stack and the resolver.

use crate::core::repr::{
    Ipv4Address,
    Ipv4Packet,
};
use crate::core::service::InterfaceId;
use crate::Result;

/// An outbound IPv4 packet waiting for a next hop Ethernet address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxPacket {
    interface: InterfaceId,
    buffer: Vec<u8>,
    /// Number of times resolving the next hop has failed so far.
    pub failure_count: u8,
}

impl TxPacket {
    /// Wraps a serialized IPv4 packet leaving through interface.
    pub fn new(interface: InterfaceId, buffer: Vec<u8>) -> TxPacket {
        TxPacket {
            interface,
            buffer,
            failure_count: 0,
        }
    }

    /// Returns the interface the packet leaves through.
    pub fn interface(&self) -> InterfaceId {
        self.interface
    }

    /// Returns the IPv4 destination, failing if the packet lacks a header.
    pub fn dst_addr(&self) -> Result<Ipv4Address> {
        Ok(Ipv4Packet::try_new(&self.buffer[..])?.dst_addr())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// A received Ethernet frame and the interface it arrived on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RxFrame {
    interface: InterfaceId,
    buffer: Vec<u8>,
}

impl RxFrame {
    pub fn new(interface: InterfaceId, buffer: Vec<u8>) -> RxFrame {
        RxFrame { interface, buffer }
    }

    /// Returns the interface the frame arrived on.
    pub fn interface(&self) -> InterfaceId {
        self.interface
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Shortens the frame, keeping the first len bytes.
    pub fn truncate(&mut self, len: usize) {
        self.buffer.truncate(len);
    }
}
