use std::cell::RefCell;
use std::rc::Rc;

use usrarp::core::buffer::{
    RxFrame,
    TxPacket,
};
use usrarp::core::dev::MockDevice;
use usrarp::core::repr::{
    eth_types,
    Arp,
    ArpOp,
    EthernetAddress,
    EthernetFrame,
    Ipv4Address,
    Ipv4AddressCidr,
};
use usrarp::core::service::arp::{
    Config,
    Resolver,
};
use usrarp::core::service::ipv4::Links;
use usrarp::core::service::{
    Interface,
    InterfaceId,
    Interfaces,
};
use usrarp::core::time::MockEnv;

lazy_static! {
    /// Interface IPv4 address.
    pub static ref LOCAL_IPV4_ADDR: Ipv4Address = Ipv4Address::new([10, 0, 0, 1]);

    /// Interface MAC address.
    pub static ref LOCAL_ETH_ADDR: EthernetAddress = {
        EthernetAddress::new([0x06, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA])
    };

    /// A neighbour on the interface subnet.
    pub static ref REMOTE_IPV4_ADDR: Ipv4Address = Ipv4Address::new([10, 0, 0, 2]);

    pub static ref REMOTE_ETH_ADDR: EthernetAddress = {
        EthernetAddress::new([0x06, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB])
    };

    /// Some other card claiming to be the neighbour.
    pub static ref OTHER_ETH_ADDR: EthernetAddress = {
        EthernetAddress::new([0x06, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC])
    };

    /// Default gateway for anything off the interface subnet.
    pub static ref GATEWAY_IPV4_ADDR: Ipv4Address = Ipv4Address::new([10, 0, 0, 254]);
}

pub struct Context {
    pub resolver: Resolver<Links, MockEnv>,
    pub interface: InterfaceId,
    pub dev: MockDevice,
    pub time_env: MockEnv,
    /// Packets handed to the unreachable notifier.
    pub unreachable: Rc<RefCell<Vec<TxPacket>>>,
}

/// Creates a resolver with a single 10.0.0.1/24 interface and an empty cache.
pub fn context() -> Context {
    let _ = env_logger::try_init();

    let dev = MockDevice::new();
    let time_env = MockEnv::new();
    let unreachable = Rc::new(RefCell::new(Vec::new()));

    let mut interfaces = Interfaces::new();
    let interface = interfaces.add(Interface::new(Box::new(dev.clone()), *LOCAL_ETH_ADDR));

    let mut links = Links::new();
    links
        .add_link(interface, Ipv4AddressCidr::new(*LOCAL_IPV4_ADDR, 24))
        .set_default_gateway(*GATEWAY_IPV4_ADDR);

    let notified = unreachable.clone();
    let resolver = Resolver::new(
        Config::default(),
        interfaces,
        links,
        Box::new(move |packet: &TxPacket| notified.borrow_mut().push(packet.clone())),
        time_env.clone(),
    );

    Context {
        resolver,
        interface,
        dev,
        time_env,
        unreachable,
    }
}

/// Creates a UDP-ish IPv4 packet from the interface to dst.
pub fn ipv4_packet(interface: InterfaceId, dst: Ipv4Address) -> TxPacket {
    let mut buffer = vec![0; 28];
    buffer[0] = 0x45;
    buffer[3] = 28;
    buffer[8] = 64;
    buffer[9] = 17;
    buffer[12 .. 16].copy_from_slice(LOCAL_IPV4_ADDR.as_bytes());
    buffer[16 .. 20].copy_from_slice(dst.as_bytes());
    buffer[20 ..].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 0]);
    TxPacket::new(interface, buffer)
}

/// Creates a received frame carrying an ARP message from sender.
///
/// Requests are broadcast, replies are addressed to the interface.
pub fn arp_frame(
    interface: InterfaceId,
    op: ArpOp,
    sender: (Ipv4Address, EthernetAddress),
    target_ipv4_addr: Ipv4Address,
) -> RxFrame {
    let (target_hw_addr, eth_dst_addr) = match op {
        ArpOp::Request => (EthernetAddress::BROADCAST, EthernetAddress::BROADCAST),
        ArpOp::Reply => (*LOCAL_ETH_ADDR, *LOCAL_ETH_ADDR),
    };

    let arp = Arp::EthernetIpv4 {
        op,
        source_hw_addr: sender.1,
        source_proto_addr: sender.0,
        target_hw_addr,
        target_proto_addr: target_ipv4_addr,
    };

    // Minimum Ethernet payload, the tail is padding.
    let mut buffer = vec![0; EthernetFrame::<&[u8]>::buffer_len(46)];

    {
        let mut eth_frame = EthernetFrame::try_new(&mut buffer[..]).unwrap();
        eth_frame.set_dst_addr(eth_dst_addr);
        eth_frame.set_src_addr(sender.1);
        eth_frame.set_payload_type(eth_types::ARP);
        arp.serialize(eth_frame.payload_mut()).unwrap();
    }

    RxFrame::new(interface, buffer)
}

/// Creates a reply from the remote neighbour.
pub fn remote_reply(interface: InterfaceId, eth_addr: EthernetAddress) -> RxFrame {
    arp_frame(
        interface,
        ArpOp::Reply,
        (*REMOTE_IPV4_ADDR, eth_addr),
        *LOCAL_IPV4_ADDR,
    )
}

/// Parses a transmitted frame as an ARP message, returning the Ethernet
/// destination too.
pub fn sent_arp(buffer: &[u8]) -> (EthernetAddress, Arp) {
    let eth_frame = EthernetFrame::try_new(buffer).unwrap();
    assert_eq!(eth_frame.payload_type(), eth_types::ARP);
    assert_eq!(eth_frame.src_addr(), *LOCAL_ETH_ADDR);
    (eth_frame.dst_addr(), Arp::deserialize(eth_frame.payload()).unwrap())
}

/// Returns the broadcast ARP requests among frames, as target addresses.
pub fn requested(frames: &[Vec<u8>]) -> Vec<Ipv4Address> {
    frames
        .iter()
        .filter(|frame| EthernetFrame::try_new(&frame[..]).unwrap().payload_type() == eth_types::ARP)
        .map(|frame| sent_arp(frame))
        .filter_map(|(eth_dst_addr, arp)| match arp {
            Arp::EthernetIpv4 {
                op: ArpOp::Request,
                source_hw_addr,
                source_proto_addr,
                target_proto_addr,
                ..
            } => {
                assert_eq!(eth_dst_addr, EthernetAddress::BROADCAST);
                assert_eq!(source_hw_addr, *LOCAL_ETH_ADDR);
                assert_eq!(source_proto_addr, *LOCAL_IPV4_ADDR);
                Some(target_proto_addr)
            }
            _ => None,
        })
        .collect()
}
