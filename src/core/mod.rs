//! Core, platform independent address resolution code.

pub mod arp_cache;
pub mod buffer;
pub mod dev;
pub mod pending;
pub mod repr;
pub mod service;
pub mod storage;
pub mod time;
pub mod timer;
