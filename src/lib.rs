#[cfg(test)]
#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate log;

pub mod core;

use crate::core::repr::Ipv4Address;
use crate::core::service::InterfaceId;

#[derive(Debug)]
pub enum Error {
    /// Indicates an error where an address could not be resolved or selected.
    Address,
    /// Indicates an error where a buffer, queue, etc. is full or empty.
    Exhausted,
    /// Indicates an error where a packet or frame is malformed.
    Malformed,
    /// Indicates an error where an interface is not attached to the stack.
    Interface(InterfaceId),
    /// Indicates an ARP request is in flight and the packet was queued.
    MacResolution(Ipv4Address),
    /// Indicates an address could not be resolved after all retries.
    Unreachable(Ipv4Address),
    /// Indicates a generic IO error.
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
