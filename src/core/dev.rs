use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::Result;

/// A low level interface for sending frames across a link.
///
/// The resolver only ever transmits, receiving is driven by the host stack
/// which hands frames to `Resolver::receive(...)`.
pub trait Device {
    /// Sends a raw Ethernet frame and returns the number of bytes written.
    fn send(&mut self, buffer: &[u8]) -> Result<usize>;
}

/// A Device which records frames instead of transmitting them.
///
/// Clones share the same record, so a test can inspect what a device owned by
/// the stack has sent.
#[derive(Clone, Debug, Default)]
pub struct MockDevice {
    sent: Rc<RefCell<Vec<Vec<u8>>>>,
    failing: Rc<RefCell<bool>>,
}

impl MockDevice {
    pub fn new() -> MockDevice {
        MockDevice::default()
    }

    /// Makes subsequent sends fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        *self.failing.borrow_mut() = failing;
    }

    /// Returns and forgets the frames sent so far.
    pub fn take_sent(&self) -> Vec<Vec<u8>> {
        self.sent.borrow_mut().drain(..).collect()
    }

    /// Returns the number of frames sent and not yet taken.
    pub fn sent_len(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl Device for MockDevice {
    fn send(&mut self, buffer: &[u8]) -> Result<usize> {
        if *self.failing.borrow() {
            return Err(io::Error::new(io::ErrorKind::Other, "link down").into());
        }

        self.sent.borrow_mut().push(buffer.to_vec());
        Ok(buffer.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_mock_device_records_frames() {
        let dev = MockDevice::new();
        let mut handle = dev.clone();

        assert_eq!(handle.send(&[1, 2, 3]).unwrap(), 3);
        assert_eq!(dev.sent_len(), 1);
        assert_eq!(dev.take_sent(), vec![vec![1, 2, 3]]);
        assert_eq!(dev.sent_len(), 0);
    }

    #[test]
    fn test_mock_device_failing() {
        let dev = MockDevice::new();
        let mut handle = dev.clone();

        dev.set_failing(true);
        assert_matches!(handle.send(&[1]), Err(Error::IO(_)));
        assert_eq!(dev.sent_len(), 0);
    }
}
