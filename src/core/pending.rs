use crate::core::buffer::TxPacket;
use crate::core::service::InterfaceId;
use crate::core::storage::Ring;
use crate::Result;

/// State of the timer draining the pending queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainTimer {
    Idle,
    Armed,
}

/// FIFO of outbound packets waiting on ARP resolution.
///
/// Packets are retried one at a time by a single drain timer, which is only
/// armed while there is something to drain.
#[derive(Debug)]
pub struct PendingQueue {
    packets: Ring<TxPacket>,
    drain_timer: DrainTimer,
}

impl PendingQueue {
    /// Creates a queue holding at most capacity packets.
    pub fn new(capacity: usize) -> PendingQueue {
        PendingQueue {
            packets: Ring::new(capacity),
            drain_timer: DrainTimer::Idle,
        }
    }

    /// Parks a packet, returning an error (and dropping it) if the queue is
    /// full.
    pub fn enqueue(&mut self, packet: TxPacket) -> Result<()> {
        self.packets.enqueue(packet)
    }

    /// Takes the oldest packet, if any.
    pub fn dequeue(&mut self) -> Option<TxPacket> {
        self.packets.dequeue().ok()
    }

    /// Flags the drain timer as armed.
    ///
    /// # Returns
    ///
    /// True if the timer was idle, meaning the caller must actually arm it.
    pub fn arm(&mut self) -> bool {
        match self.drain_timer {
            DrainTimer::Idle => {
                self.drain_timer = DrainTimer::Armed;
                true
            }
            DrainTimer::Armed => false,
        }
    }

    /// Flags the drain timer as idle.
    pub fn disarm(&mut self) {
        self.drain_timer = DrainTimer::Idle;
    }

    pub fn drain_timer(&self) -> DrainTimer {
        self.drain_timer
    }

    /// Drops every packet leaving through interface.
    pub fn purge_interface(&mut self, interface: InterfaceId) {
        self.packets.retain(|packet| packet.interface() != interface);
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}
