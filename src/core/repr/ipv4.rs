use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};
use std::ops::Deref;
use std::result::Result as StdResult;
use std::str::FromStr;

use byteorder::{
    ByteOrder,
    NetworkEndian,
};

use crate::{
    Error,
    Result,
};

/// [IPv4 address](https://en.wikipedia.org/wiki/IPv4) in network byte order.
///
/// Addresses order the same way as their big-endian `u32` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 4]);

impl Address {
    pub const UNSPECIFIED: Address = Address([0; 4]);

    /// Creates an IPv4 address from a network byte order buffer.
    pub fn new(addr: [u8; 4]) -> Address {
        Address(addr)
    }

    /// Tries to create an IPv4 address from a network byte order slice.
    pub fn try_new(addr: &[u8]) -> Result<Address> {
        if addr.len() != 4 {
            return Err(Error::Exhausted);
        }

        let mut _addr: [u8; 4] = [0; 4];
        _addr.copy_from_slice(addr);
        Ok(Address(_addr))
    }

    /// Returns a reference to the network byte order representation of the address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the address as a host order integer.
    pub fn as_u32(&self) -> u32 {
        NetworkEndian::read_u32(&self.0)
    }

    /// Checks if this is the unspecified (0.0.0.0) address.
    pub fn is_unspecified(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl From<u32> for Address {
    fn from(addr: u32) -> Address {
        let mut bytes = [0; 4];
        NetworkEndian::write_u32(&mut bytes, addr);
        Address(bytes)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl FromStr for Address {
    type Err = ();

    /// Parses an Ipv4 address from an A.B.C.D style string.
    fn from_str(addr: &str) -> StdResult<Address, Self::Err> {
        let bytes = addr.split('.')
            .map(|token| token.parse::<u8>())
            .collect::<StdResult<Vec<_>, _>>()
            .map_err(|_| ())?;

        Address::try_new(&bytes).map_err(|_| ())
    }
}

/// An IPv4 address with a subnet mask, e.g. 10.0.0.1/24.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressCidr {
    address: Address,
    subnet_len: u32,
}

impl AddressCidr {
    /// Creates an address with a subnet of subnet_len bits.
    ///
    /// # Panics
    ///
    /// Causes a panic if subnet_len is greater than 32.
    pub fn new(address: Address, subnet_len: u32) -> AddressCidr {
        assert!(subnet_len <= 32);
        AddressCidr {
            address,
            subnet_len,
        }
    }

    /// Returns the subnet mask as a host order integer.
    pub fn subnet_mask(&self) -> u32 {
        match self.subnet_len {
            0 => 0,
            n => !0u32 << (32 - n),
        }
    }

    /// Checks if an address is in the same subnet.
    pub fn is_member(&self, address: Address) -> bool {
        let mask = self.subnet_mask();
        (self.address.as_u32() & mask) == (address.as_u32() & mask)
    }
}

impl Deref for AddressCidr {
    type Target = Address;

    fn deref(&self) -> &Address {
        &self.address
    }
}

impl Display for AddressCidr {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}/{}", self.address, self.subnet_len)
    }
}

/// View of a byte buffer as an IPv4 packet.
///
/// Only the header fields needed to pick a next hop are exposed.
#[derive(Debug)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> AsRef<[u8]> for Packet<T> {
    fn as_ref(&self) -> &[u8] {
        self.buffer.as_ref()
    }
}

impl<T: AsRef<[u8]>> Packet<T> {
    pub const MIN_HEADER_LEN: usize = 20;

    /// Tries to create an IPv4 packet view over a byte buffer.
    ///
    /// Fails if the buffer cannot hold the header it claims to carry.
    pub fn try_new(buffer: T) -> Result<Packet<T>> {
        let buffer_len = buffer.as_ref().len();

        if buffer_len < Self::MIN_HEADER_LEN {
            return Err(Error::Exhausted);
        }

        let packet = Packet { buffer };

        if packet.ip_version() != 4 || (packet.header_len() as usize) < Self::MIN_HEADER_LEN
            || (packet.header_len() as usize) > buffer_len
        {
            return Err(Error::Malformed);
        }

        Ok(packet)
    }

    pub fn ip_version(&self) -> u8 {
        (self.buffer.as_ref()[0] & 0xF0) >> 4
    }

    pub fn header_len(&self) -> u8 {
        (self.buffer.as_ref()[0] & 0x0F) * 4
    }

    pub fn dst_addr(&self) -> Address {
        let mut addr = [0; 4];
        addr.copy_from_slice(&self.buffer.as_ref()[16 .. 20]);
        Address(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_order_matches_integer_order() {
        let low = Address::new([9, 255, 255, 255]);
        let high = Address::new([10, 0, 0, 1]);
        assert!(low < high);
        assert!(low.as_u32() < high.as_u32());
        assert_eq!(Address::from(high.as_u32()), high);
    }

    #[test]
    fn test_parse_address() {
        assert_eq!("10.0.0.1".parse::<Address>().unwrap(), Address::new([10, 0, 0, 1]));
        assert_matches!("10.0.0".parse::<Address>(), Err(()));
        assert_matches!("10.0.0.256".parse::<Address>(), Err(()));
    }

    #[test]
    fn test_cidr_membership() {
        let cidr = AddressCidr::new(Address::new([10, 0, 0, 1]), 24);
        assert!(cidr.is_member(Address::new([10, 0, 0, 200])));
        assert!(!cidr.is_member(Address::new([10, 0, 1, 1])));
        assert_eq!(*cidr, Address::new([10, 0, 0, 1]));
        assert_eq!(cidr.to_string(), "10.0.0.1/24");

        let any = AddressCidr::new(Address::new([10, 0, 0, 1]), 0);
        assert!(any.is_member(Address::new([192, 168, 1, 1])));
    }

    #[test]
    fn test_packet_buffer_less_than_min_header() {
        let buffer: [u8; 1] = [0; 1];
        assert_matches!(Packet::try_new(&buffer[..]), Err(Error::Exhausted));
    }

    #[test]
    fn test_packet_buffer_less_than_header() {
        // 0x0F = 15 words = 60 bytes
        let mut buffer = [0; 20];
        buffer[0] = 0x4F;
        assert_matches!(Packet::try_new(&buffer[..]), Err(Error::Malformed));
    }

    #[test]
    fn test_packet_with_valid_buffer() {
        let buffer: [u8; 24] = [
            0x45, 0x00, 0x00, 0x18, 0x00, 0x00, 0x00, 0x00, 0x40, 0x11, 0x00, 0x00, 0x0A, 0x00,
            0x00, 0x01, 0x0A, 0x00, 0x00, 0x02, 0x01, 0x02, 0x03, 0x04,
        ];

        let packet = Packet::try_new(&buffer[..]).unwrap();
        assert_eq!(4, packet.ip_version());
        assert_eq!(20, packet.header_len());
        assert_eq!(Address::new([10, 0, 0, 2]), packet.dst_addr());
    }
}
