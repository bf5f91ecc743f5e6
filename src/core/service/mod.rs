//! Packet processing services for different network layers.
//!
//! The `service` module deals with ARP resolution, the transmission of
//! resolved packets and the collaborators the resolver relies on.

pub mod arp;
pub mod ethernet;
pub mod ipv4;

use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};

use crate::core::buffer::TxPacket;
use crate::core::dev::Device;
use crate::core::repr::EthernetAddress;

/// Handle to an interface attached to the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceId(usize);

impl From<usize> for InterfaceId {
    fn from(id: usize) -> InterfaceId {
        InterfaceId(id)
    }
}

impl Display for InterfaceId {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "if{}", self.0)
    }
}

/// An interface for sending network packets.
pub struct Interface {
    /// Device for sending raw Ethernet frames.
    pub dev: Box<dyn Device>,
    /// Ethernet address for the interface.
    pub ethernet_addr: EthernetAddress,
}

impl Interface {
    pub fn new(dev: Box<dyn Device>, ethernet_addr: EthernetAddress) -> Interface {
        Interface { dev, ethernet_addr }
    }
}

/// Interfaces attached to the stack, addressed by InterfaceId.
///
/// Ids are never reused, so a stale id simply fails to resolve after its
/// interface is removed.
#[derive(Default)]
pub struct Interfaces {
    slots: Vec<Option<Interface>>,
}

impl Interfaces {
    pub fn new() -> Interfaces {
        Interfaces::default()
    }

    /// Attaches an interface and returns its id.
    pub fn add(&mut self, interface: Interface) -> InterfaceId {
        self.slots.push(Some(interface));
        InterfaceId(self.slots.len() - 1)
    }

    /// Detaches an interface.
    pub fn remove(&mut self, id: InterfaceId) -> Option<Interface> {
        self.slots.get_mut(id.0).and_then(|slot| slot.take())
    }

    pub fn get(&self, id: InterfaceId) -> Option<&Interface> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: InterfaceId) -> Option<&mut Interface> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, id: InterfaceId) -> bool {
        self.get(id).is_some()
    }
}

/// Notifies the sender of a packet that its destination is unreachable.
pub trait Unreachable {
    fn dest_unreachable(&mut self, packet: &TxPacket);
}

impl<F> Unreachable for F
where
    F: FnMut(&TxPacket),
{
    fn dest_unreachable(&mut self, packet: &TxPacket) {
        self(packet)
    }
}
