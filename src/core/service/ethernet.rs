use crate::core::repr::{
    EthernetAddress,
    EthernetFrame,
};
use crate::core::service::Interface;
use crate::Result;

/// Send an Ethernet frame via an interface.
///
/// f fills in the payload of payload_len bytes, the header is written here.
/// The frame buffer is released before returning whatever the outcome.
pub fn send_frame<F>(
    interface: &mut Interface,
    payload_len: usize,
    dst_addr: EthernetAddress,
    payload_type: u16,
    f: F,
) -> Result<usize>
where
    F: FnOnce(&mut [u8]) -> Result<()>,
{
    let mut eth_buffer = vec![0; EthernetFrame::<&[u8]>::buffer_len(payload_len)];
    let mut eth_frame = EthernetFrame::try_new(&mut eth_buffer[..])?;
    eth_frame.set_dst_addr(dst_addr);
    eth_frame.set_src_addr(interface.ethernet_addr);
    eth_frame.set_payload_type(payload_type);
    f(eth_frame.payload_mut())?;
    interface.dev.send(eth_frame.as_ref())
}
