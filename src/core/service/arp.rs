use std::time::{
    Duration,
    Instant,
};

use crate::core::arp_cache::{
    ArpCache,
    Entry,
    Status,
};
use crate::core::buffer::{
    RxFrame,
    TxPacket,
};
use crate::core::pending::PendingQueue;
use crate::core::repr::{
    eth_types,
    Arp,
    ArpOp,
    EthernetAddress,
    EthernetFrame,
    Ipv4Address,
};
use crate::core::service::ipv4::Ipv4Routes;
use crate::core::service::{
    ethernet,
    Interface,
    InterfaceId,
    Interfaces,
    Unreachable,
};
use crate::core::time::{
    Env,
    SystemEnv,
};
use crate::core::timer::{
    Timer,
    Timers,
};
use crate::{
    Error,
    Result,
};

/// Default number of failed resolutions before a packet is deemed
/// undeliverable.
pub static MAX_ATTEMPTS: u8 = 4;

/// Default number of milliseconds before a cache entry goes stale.
pub static ARP_TIMEOUT_MS: u64 = 600_000;

/// Default number of milliseconds between pending queue retries.
pub static ARP_RETRY_MS: u64 = 300;

/// Default number of packets the pending queue can buffer.
pub static PENDING_PACKETS: usize = 128;

/// Tunables for a Resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// A packet is dropped once resolving its next hop failed this many times.
    pub max_attempts: u8,
    /// Time after which a learned mapping goes stale and is re-requested.
    pub expiry: Duration,
    /// Interval at which pending packets are retried, one per interval.
    pub retry_interval: Duration,
    /// Maximum number of packets waiting on resolution.
    pub pending_capacity: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_attempts: MAX_ATTEMPTS,
            expiry: Duration::from_millis(ARP_TIMEOUT_MS),
            retry_interval: Duration::from_millis(ARP_RETRY_MS),
            pending_capacity: PENDING_PACKETS,
        }
    }
}

/// Outcome of resolving the next hop of a packet.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The next hop is known, the packet is handed back for transmission.
    Resolved(EthernetAddress, TxPacket),
    /// An ARP request for the next hop is in flight and the packet was queued.
    Pending(Ipv4Address),
    /// The next hop could not be resolved in time and the packet was dropped.
    Unreachable(Ipv4Address),
}

/// Resolves IPv4 next hops to Ethernet addresses for every attached
/// interface.
///
/// All state (cache, pending packets, timers) lives here and is only mutated
/// through the resolver. Time driven work happens in `poll(...)`, which the
/// host should call whenever `next_deadline(...)` passes.
pub struct Resolver<R, T = SystemEnv>
where
    R: Ipv4Routes,
    T: Env,
{
    config: Config,
    interfaces: Interfaces,
    routes: R,
    unreachable: Box<dyn Unreachable>,
    arp_cache: ArpCache<T>,
    pending: PendingQueue,
    timers: Timers,
    time_env: T,
}

impl<R: Ipv4Routes, T: Env> Resolver<R, T> {
    pub fn new(
        config: Config,
        interfaces: Interfaces,
        routes: R,
        unreachable: Box<dyn Unreachable>,
        time_env: T,
    ) -> Resolver<R, T> {
        Resolver {
            pending: PendingQueue::new(config.pending_capacity),
            arp_cache: ArpCache::new(time_env.clone()),
            timers: Timers::new(),
            config,
            interfaces,
            routes,
            unreachable,
            time_env,
        }
    }

    /// Tries to retrieve the Ethernet address of the next hop for a packet.
    ///
    /// The next hop may not have an Ethernet mapping yet, in which case an ARP
    /// request is dispatched and the packet parked in the pending queue until
    /// it is retried by the drain timer. Once a packet has failed to resolve
    /// max_attempts times the sender is told its destination is unreachable
    /// and the packet is dropped.
    pub fn resolve(&mut self, mut packet: TxPacket) -> Result<Resolution> {
        if !self.interfaces.contains(packet.interface()) {
            return Err(Error::Interface(packet.interface()));
        }

        let dst_addr = packet.dst_addr()?;
        let next_hop = self.routes.gateway(dst_addr).unwrap_or(dst_addr);

        if let Some(entry) = self.arp_cache.find(next_hop) {
            trace!("{} is at {}.", next_hop, entry.eth_addr());
            return Ok(Resolution::Resolved(entry.eth_addr(), packet));
        }

        packet.failure_count = packet.failure_count.saturating_add(1);

        if packet.failure_count < self.config.max_attempts {
            debug!(
                "ARP required for {} (attempt {}).",
                next_hop, packet.failure_count
            );

            if let Err(err) = self.query(packet.interface(), next_hop) {
                debug!("ARP request for {} failed with {:?}.", next_hop, err);
            }

            self.park(packet)?;
            Ok(Resolution::Pending(next_hop))
        } else {
            warn!(
                "{} unreachable after {} attempts, dropping packet to {}.",
                next_hop, packet.failure_count, dst_addr
            );
            self.unreachable.dest_unreachable(&packet);
            Ok(Resolution::Unreachable(next_hop))
        }
    }

    /// Sends an IPv4 packet in an Ethernet frame addressed to its next hop.
    ///
    /// Fails with `Error::MacResolution` if the packet was queued waiting on
    /// ARP and with `Error::Unreachable` if it was dropped.
    pub fn send_packet(&mut self, packet: TxPacket) -> Result<usize> {
        match self.resolve(packet)? {
            Resolution::Resolved(eth_addr, packet) => {
                let interface = self.interfaces
                    .get_mut(packet.interface())
                    .ok_or(Error::Interface(packet.interface()))?;

                ethernet::send_frame(
                    interface,
                    packet.len(),
                    eth_addr,
                    eth_types::IPV4,
                    |payload| {
                        payload.copy_from_slice(packet.as_bytes());
                        Ok(())
                    },
                )
            }
            Resolution::Pending(next_hop) => Err(Error::MacResolution(next_hop)),
            Resolution::Unreachable(next_hop) => Err(Error::Unreachable(next_hop)),
        }
    }

    /// Receives an ARP packet from an interface.
    ///
    /// The sender's mapping is learned unless a reachable mapping for its
    /// address already exists, and requests for an address owned by the
    /// receiving interface are answered with a reply built in the same frame.
    pub fn receive(&mut self, mut frame: RxFrame) -> Result<()> {
        if !self.interfaces.contains(frame.interface()) {
            return Err(Error::Interface(frame.interface()));
        }

        let arp = match EthernetFrame::try_new(frame.as_bytes())
            .and_then(|eth_frame| Arp::deserialize(eth_frame.payload()))
        {
            Ok(arp) => arp,
            Err(err) => {
                debug!(
                    "Dropping ARP frame received on {} with {:?}.",
                    frame.interface(),
                    err
                );
                return Err(err);
            }
        };

        let Arp::EthernetIpv4 {
            op,
            source_hw_addr,
            source_proto_addr,
            target_proto_addr,
            ..
        } = arp;

        self.learn(source_proto_addr, source_hw_addr, frame.interface());

        if op != ArpOp::Request {
            return Ok(());
        }

        if self.routes.link_find(target_proto_addr) != Some(frame.interface()) {
            debug!(
                "Ignoring ARP request for {} on {}.",
                target_proto_addr,
                frame.interface()
            );
            return Ok(());
        }

        let interface = self.interfaces
            .get_mut(frame.interface())
            .ok_or(Error::Interface(frame.interface()))?;

        let mut reply = arp;
        reply.make_reply(interface.ethernet_addr, target_proto_addr);
        frame.truncate(EthernetFrame::<&[u8]>::buffer_len(reply.buffer_len()));

        {
            let mut eth_frame = EthernetFrame::try_new(frame.as_bytes_mut())?;
            let requester = eth_frame.src_addr();
            eth_frame.set_dst_addr(requester);
            eth_frame.set_src_addr(interface.ethernet_addr);
            reply.serialize(eth_frame.payload_mut())?;
        }

        debug!(
            "Sending ARP reply to {}/{}.",
            source_proto_addr, source_hw_addr
        );

        interface.dev.send(frame.as_bytes())?;
        Ok(())
    }

    /// Broadcasts an ARP request for an address via an interface.
    pub fn query(&mut self, interface: InterfaceId, ipv4_addr: Ipv4Address) -> Result<usize> {
        let source_addr = self.routes.source_addr(ipv4_addr).ok_or(Error::Address)?;
        let interface = self.interfaces
            .get_mut(interface)
            .ok_or(Error::Interface(interface))?;

        let arp = Arp::request(interface.ethernet_addr, source_addr, ipv4_addr);

        debug!("Sending ARP request for {} from {}.", ipv4_addr, source_addr);

        ethernet::send_frame(
            interface,
            arp.buffer_len(),
            EthernetAddress::BROADCAST,
            eth_types::ARP,
            |payload| arp.serialize(payload),
        )
    }

    /// Adds a mapping as Reachable, replacing any mapping for the same
    /// address, and schedules it to go stale after the configured expiry.
    pub fn insert_or_replace(&mut self, entry: Entry) {
        let ipv4_addr = entry.ipv4_addr();
        let generation = self.arp_cache.insert_or_replace(entry);
        let deadline = self.time_env.now_instant() + self.config.expiry;
        self.timers.arm(
            deadline,
            Timer::Expire {
                ipv4_addr,
                generation,
            },
        );
    }

    /// Fires every timer that is due.
    pub fn poll(&mut self) {
        let now = self.time_env.now_instant();

        while let Some(timer) = self.timers.expired(now) {
            match timer {
                Timer::Drain => self.check_pending(),
                Timer::Expire {
                    ipv4_addr,
                    generation,
                } => self.expire(ipv4_addr, generation),
            }
        }
    }

    /// Returns when `poll(...)` next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Detaches an interface, forgetting the mappings learned on it and the
    /// packets waiting to leave through it.
    pub fn remove_interface(&mut self, interface: InterfaceId) -> Option<Interface> {
        let removed = self.interfaces.remove(interface)?;
        let purged = self.arp_cache.purge_interface(interface);
        self.pending.purge_interface(interface);

        debug!(
            "Removed {}, forgot {} ARP mappings learned on it.",
            interface, purged
        );

        Some(removed)
    }

    pub fn cache(&self) -> &ArpCache<T> {
        &self.arp_cache
    }

    /// Returns the number of packets waiting on resolution.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn interfaces(&self) -> &Interfaces {
        &self.interfaces
    }

    /// Gives access to the attached interfaces, e.g. to hot plug a new one.
    ///
    /// Use `remove_interface(...)` to detach one so the state learned on it
    /// is forgotten too.
    pub fn interfaces_mut(&mut self) -> &mut Interfaces {
        &mut self.interfaces
    }

    /// Gives access to the routing collaborator, e.g. to address a newly
    /// attached interface.
    pub fn routes_mut(&mut self) -> &mut R {
        &mut self.routes
    }

    fn park(&mut self, packet: TxPacket) -> Result<()> {
        if let Err(err) = self.pending.enqueue(packet) {
            warn!("Pending queue is full, dropping packet.");
            return Err(err);
        }

        if self.pending.arm() {
            let deadline = self.time_env.now_instant() + self.config.retry_interval;
            self.timers.arm(deadline, Timer::Drain);
        }

        Ok(())
    }

    /// Retries a single pending packet, re-arming the drain timer while there
    /// are packets left to retry.
    fn check_pending(&mut self) {
        let packet = match self.pending.dequeue() {
            Some(packet) => packet,
            None => {
                trace!("Pending queue drained.");
                self.pending.disarm();
                return;
            }
        };

        match self.send_packet(packet) {
            Ok(_) => debug!("Sent pending packet."),
            Err(Error::MacResolution(next_hop)) => trace!("Still waiting on {}.", next_hop),
            Err(err) => debug!("Pending packet dropped with {:?}.", err),
        }

        let deadline = self.time_env.now_instant() + self.config.retry_interval;
        self.timers.arm(deadline, Timer::Drain);
    }

    fn learn(&mut self, ipv4_addr: Ipv4Address, eth_addr: EthernetAddress, interface: InterfaceId) {
        let status = self.arp_cache.lookup(ipv4_addr).map(|entry| entry.status());

        // Reachable mappings are only replaced after going stale, not by
        // whatever traffic claims the address.
        let mut entry = match status {
            None => Entry::new(ipv4_addr, eth_addr, interface),
            Some(Status::Stale) => self.arp_cache
                .remove(ipv4_addr)
                .unwrap_or_else(|| Entry::new(ipv4_addr, eth_addr, interface)),
            Some(Status::Reachable) => {
                trace!("Keeping reachable ARP mapping for {}.", ipv4_addr);
                return;
            }
        };

        entry.relearn(eth_addr, interface);

        debug!(
            "Adding ARP mapping from {} to {} on {}.",
            ipv4_addr, eth_addr, interface
        );

        self.insert_or_replace(entry);
    }

    fn expire(&mut self, ipv4_addr: Ipv4Address, generation: u64) {
        let interface = match self.arp_cache.mark_stale(ipv4_addr, generation) {
            Some(entry) => entry.interface(),
            None => {
                trace!("Ignoring superseded ARP timer for {}.", ipv4_addr);
                return;
            }
        };

        debug!("ARP mapping for {} is stale, refreshing.", ipv4_addr);

        if let Err(err) = self.query(interface, ipv4_addr) {
            debug!("ARP request for {} failed with {:?}.", ipv4_addr, err);
        }
    }
}
