use std::io::{
    Cursor,
    Read,
    Write,
};

use byteorder::{
    NetworkEndian,
    ReadBytesExt,
    WriteBytesExt,
};

use crate::core::repr::{
    EthernetAddress,
    Ipv4Address,
};
use crate::{
    Error,
    Result,
};

#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
// https://www.iana.org/assignments/arp-parameters/arp-parameters.xhtml#arp-parameters-1
pub enum Op {
    Request = 0x0001,
    Reply = 0x0002,
}

/// https://www.iana.org/assignments/arp-parameters/arp-parameters.xhtml#arp-parameters-2
pub mod hw_types {
    pub const ETHERNET: u16 = 0x0001;
}

/// https://www.iana.org/assignments/arp-parameters/arp-parameters.xhtml#arp-parameters-3
pub mod proto_types {
    pub const IPV4: u16 = 0x0800;
}

/// An [ARP](https://tools.ietf.org/html/rfc826) message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arp {
    EthernetIpv4 {
        op: Op,
        source_hw_addr: EthernetAddress,
        source_proto_addr: Ipv4Address,
        target_hw_addr: EthernetAddress,
        target_proto_addr: Ipv4Address,
    },
}

impl Arp {
    /// Creates a request asking who owns target_proto_addr.
    ///
    /// The target hardware address is meaningless in a request and is set to
    /// broadcast.
    pub fn request(
        source_hw_addr: EthernetAddress,
        source_proto_addr: Ipv4Address,
        target_proto_addr: Ipv4Address,
    ) -> Arp {
        Arp::EthernetIpv4 {
            op: Op::Request,
            source_hw_addr,
            source_proto_addr,
            target_hw_addr: EthernetAddress::BROADCAST,
            target_proto_addr,
        }
    }

    /// Returns the size of the ARP packet when serialized to a buffer.
    pub fn buffer_len(&self) -> usize {
        8 + match *self {
            Arp::EthernetIpv4 { .. } => 20,
        }
    }

    /// Turns a received request into the reply answering it.
    ///
    /// The sender becomes the target and hw_addr/proto_addr become the
    /// sender.
    pub fn make_reply(&mut self, hw_addr: EthernetAddress, proto_addr: Ipv4Address) {
        match *self {
            Arp::EthernetIpv4 {
                ref mut op,
                ref mut source_hw_addr,
                ref mut source_proto_addr,
                ref mut target_hw_addr,
                ref mut target_proto_addr,
            } => {
                *op = Op::Reply;
                *target_hw_addr = *source_hw_addr;
                *target_proto_addr = *source_proto_addr;
                *source_hw_addr = hw_addr;
                *source_proto_addr = proto_addr;
            }
        }
    }

    /// Attempts to deserialize a buffer into an ARP packet.
    pub fn deserialize(buffer: &[u8]) -> Result<Arp> {
        if buffer.len() < 28 {
            return Err(Error::Malformed);
        }

        let mut reader = Cursor::new(buffer);
        let hw_type = reader.read_u16::<NetworkEndian>()?;
        let proto_type = reader.read_u16::<NetworkEndian>()?;
        let hw_len = reader.read_u8()?;
        let proto_len = reader.read_u8()?;
        let op = match reader.read_u16::<NetworkEndian>()? {
            0x0001 => Op::Request,
            0x0002 => Op::Reply,
            _ => return Err(Error::Malformed),
        };

        if hw_type != hw_types::ETHERNET || proto_type != proto_types::IPV4 || hw_len != 6
            || proto_len != 4
        {
            return Err(Error::Malformed);
        }

        let mut hw_addr = [0; 6];
        let mut proto_addr = [0; 4];

        reader.read_exact(&mut hw_addr)?;
        reader.read_exact(&mut proto_addr)?;
        let (source_hw_addr, source_proto_addr) =
            (EthernetAddress::new(hw_addr), Ipv4Address::new(proto_addr));

        reader.read_exact(&mut hw_addr)?;
        reader.read_exact(&mut proto_addr)?;
        let (target_hw_addr, target_proto_addr) =
            (EthernetAddress::new(hw_addr), Ipv4Address::new(proto_addr));

        Ok(Arp::EthernetIpv4 {
            op,
            source_hw_addr,
            source_proto_addr,
            target_hw_addr,
            target_proto_addr,
        })
    }

    /// Serializes the ARP packet into a buffer.
    ///
    /// You should ensure buffer has at least buffer_len() bytes to avoid errors.
    pub fn serialize(&self, buffer: &mut [u8]) -> Result<()> {
        if self.buffer_len() > buffer.len() {
            return Err(Error::Exhausted);
        }

        match *self {
            Arp::EthernetIpv4 {
                op,
                ref source_hw_addr,
                ref source_proto_addr,
                ref target_hw_addr,
                ref target_proto_addr,
            } => {
                let mut writer = Cursor::new(buffer);
                writer.write_u16::<NetworkEndian>(hw_types::ETHERNET)?;
                writer.write_u16::<NetworkEndian>(proto_types::IPV4)?;
                writer.write_u8(6)?;
                writer.write_u8(4)?;
                writer.write_u16::<NetworkEndian>(op as u16)?;
                writer.write_all(source_hw_addr.as_bytes())?;
                writer.write_all(source_proto_addr.as_bytes())?;
                writer.write_all(target_hw_addr.as_bytes())?;
                writer.write_all(target_proto_addr.as_bytes())?;
            }
        };

        Ok(())
    }
}
