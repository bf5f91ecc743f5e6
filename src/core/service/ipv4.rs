use crate::core::repr::{
    Ipv4Address,
    Ipv4AddressCidr,
};
use crate::core::service::InterfaceId;

/// The routing and addressing decisions ARP depends on.
pub trait Ipv4Routes {
    /// Returns the gateway to reach dst through, or None if dst is on a
    /// directly attached network.
    fn gateway(&self, dst: Ipv4Address) -> Option<Ipv4Address>;

    /// Returns the local address to send from when talking to dst.
    fn source_addr(&self, dst: Ipv4Address) -> Option<Ipv4Address>;

    /// Returns the interface owning a local address.
    fn link_find(&self, addr: Ipv4Address) -> Option<InterfaceId>;
}

/// Routes derived from the addresses assigned to each interface plus an
/// optional default gateway.
#[derive(Clone, Debug, Default)]
pub struct Links {
    links: Vec<(InterfaceId, Ipv4AddressCidr)>,
    default_gateway: Option<Ipv4Address>,
}

impl Links {
    pub fn new() -> Links {
        Links::default()
    }

    /// Assigns an address to an interface.
    pub fn add_link(&mut self, interface: InterfaceId, addr: Ipv4AddressCidr) -> &mut Links {
        self.links.push((interface, addr));
        self
    }

    /// Sets the default gateway for IPv4 packets not on any link's subnet.
    /// This should be on one of the link subnets!
    pub fn set_default_gateway(&mut self, gateway: Ipv4Address) -> &mut Links {
        self.default_gateway = Some(gateway);
        self
    }

    fn link_for(&self, dst: Ipv4Address) -> Option<&Ipv4AddressCidr> {
        self.links
            .iter()
            .map(|(_, addr)| addr)
            .find(|addr| addr.is_member(dst))
    }
}

impl Ipv4Routes for Links {
    fn gateway(&self, dst: Ipv4Address) -> Option<Ipv4Address> {
        if self.link_for(dst).is_some() {
            debug!("{} will be routed through link.", dst);
            None
        } else {
            debug!("{} will be routed through default gateway.", dst);
            self.default_gateway
        }
    }

    fn source_addr(&self, dst: Ipv4Address) -> Option<Ipv4Address> {
        match self.link_for(dst) {
            Some(addr) => Some(**addr),
            None => self.default_gateway
                .and_then(|gateway| self.link_for(gateway))
                .map(|addr| **addr),
        }
    }

    fn link_find(&self, addr: Ipv4Address) -> Option<InterfaceId> {
        self.links
            .iter()
            .find(|(_, link)| **link == addr)
            .map(|(interface, _)| *interface)
    }
}
