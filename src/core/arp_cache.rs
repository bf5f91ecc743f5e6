use std::collections::btree_map::{
    BTreeMap,
    Values,
};
use std::time::Instant;

use crate::core::repr::{
    EthernetAddress,
    Ipv4Address,
};
use crate::core::service::InterfaceId;
use crate::core::time::{
    Env,
    SystemEnv,
};

/// Lifecycle of a cached mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// The mapping was learned recently and may be used for forwarding.
    Reachable,
    /// The mapping aged out and is waiting to be re-resolved.
    Stale,
}

/// An IPv4 -> Ethernet address mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    ipv4_addr: Ipv4Address,
    eth_addr: EthernetAddress,
    interface: InterfaceId,
    status: Status,
    timestamp: Option<Instant>,
    generation: u64,
}

impl Entry {
    /// Creates a mapping learned on interface. It becomes Reachable once
    /// inserted into a cache.
    pub fn new(ipv4_addr: Ipv4Address, eth_addr: EthernetAddress, interface: InterfaceId) -> Entry {
        Entry {
            ipv4_addr,
            eth_addr,
            interface,
            status: Status::Reachable,
            timestamp: None,
            generation: 0,
        }
    }

    /// Points a detached entry at a newly learned address.
    pub fn relearn(&mut self, eth_addr: EthernetAddress, interface: InterfaceId) {
        self.eth_addr = eth_addr;
        self.interface = interface;
    }

    pub fn ipv4_addr(&self) -> Ipv4Address {
        self.ipv4_addr
    }

    pub fn eth_addr(&self) -> EthernetAddress {
        self.eth_addr
    }

    /// Returns the interface the mapping was learned on.
    pub fn interface(&self) -> InterfaceId {
        self.interface
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns when the entry was inserted, or None if it never was.
    pub fn timestamp(&self) -> Option<Instant> {
        self.timestamp
    }

    /// Returns the token identifying the insertion that produced this entry.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Maintains a set of IPv4 -> ethernet address mappings ordered by IPv4
/// address.
///
/// Entries never expire on their own. Aging is driven by whoever inserts them
/// via `mark_stale(...)`, and stale entries are hidden from `find(...)`.
#[derive(Debug)]
pub struct ArpCache<T = SystemEnv>
where
    T: Env,
{
    entries: BTreeMap<Ipv4Address, Entry>,
    next_generation: u64,
    time_env: T,
}

impl<T: Env> ArpCache<T> {
    /// Creates an empty ARP cache.
    pub fn new(time_env: T) -> ArpCache<T> {
        ArpCache {
            entries: BTreeMap::new(),
            next_generation: 1,
            time_env,
        }
    }

    /// Lookup the reachable mapping for an IPv4 address.
    pub fn find(&self, ipv4_addr: Ipv4Address) -> Option<&Entry> {
        self.lookup(ipv4_addr)
            .filter(|entry| entry.status != Status::Stale)
    }

    /// Lookup the mapping for an IPv4 address, stale or not.
    pub fn lookup(&self, ipv4_addr: Ipv4Address) -> Option<&Entry> {
        self.entries.get(&ipv4_addr)
    }

    /// Lookup the first mapping, stale or not, to an ethernet address.
    pub fn find_by_eth_addr(&self, eth_addr: EthernetAddress) -> Option<&Entry> {
        self.entries
            .values()
            .find(|entry| entry.eth_addr == eth_addr)
    }

    /// Inserts a mapping as Reachable, replacing any mapping for the same IPv4
    /// address.
    ///
    /// # Returns
    ///
    /// The generation token of the inserted entry, used to tell the entry
    /// apart from the one it replaced in `mark_stale(...)`.
    pub fn insert_or_replace(&mut self, mut entry: Entry) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;

        entry.status = Status::Reachable;
        entry.timestamp = Some(self.time_env.now_instant());
        entry.generation = generation;

        if let Some(old) = self.entries.insert(entry.ipv4_addr, entry) {
            trace!(
                "Replaced ARP entry {} -> {} ({:?}).",
                old.ipv4_addr,
                old.eth_addr,
                old.status
            );
        }

        generation
    }

    /// Detaches the mapping for an IPv4 address.
    pub fn remove(&mut self, ipv4_addr: Ipv4Address) -> Option<Entry> {
        self.entries.remove(&ipv4_addr)
    }

    /// Marks the mapping for an IPv4 address stale, provided it is still the
    /// entry produced by the insertion identified by generation.
    pub fn mark_stale(&mut self, ipv4_addr: Ipv4Address, generation: u64) -> Option<&Entry> {
        match self.entries.get_mut(&ipv4_addr) {
            Some(entry) if entry.generation == generation => {
                entry.status = Status::Stale;
                Some(&*entry)
            }
            _ => None,
        }
    }

    /// Removes every mapping learned on an interface.
    ///
    /// # Returns
    ///
    /// The number of mappings removed.
    pub fn purge_interface(&mut self, interface: InterfaceId) -> usize {
        let len = self.entries.len();
        self.entries.retain(|_, entry| entry.interface != interface);
        len - self.entries.len()
    }

    /// Iterates over all mappings in IPv4 address order.
    pub fn iter(&self) -> Values<'_, Ipv4Address, Entry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
