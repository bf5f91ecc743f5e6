//! Bounded storage used for queueing packets.

mod ring;

pub use self::ring::Ring;
