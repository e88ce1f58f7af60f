//! Interface between USB function drivers (gadgets) and a USB device controller.
//!
//! The controller driver owns enumeration, endpoint queues and interrupt delivery. Function
//! drivers only see the narrow set of endpoint primitives described by [UDCAdapter].

use syscall::Result;

/// Direction bit of an endpoint address (set for IN endpoints).
pub const ENDP_DIR_IN: u8 = 0x80;
/// Endpoint number field of an endpoint address.
pub const ENDP_NUM_MASK: u8 = 0x0F;

/// Max packet size of endpoint 0, and of the control data stage.
pub const EP0_MAX_PACKET_SIZE: u16 = 64;

pub const fn endp_num(address: u8) -> u8 {
    address & ENDP_NUM_MASK
}

pub const fn endp_is_in(address: u8) -> bool {
    address & ENDP_DIR_IN != 0
}

/// Bus speed negotiated by the controller after reset.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UsbSpeed {
    Full,
    High,
    /// The alternate speed, as described by the other-speed configuration descriptor.
    Other,
}

impl UsbSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::High => "high",
            Self::Other => "other",
        }
    }
}

/// USB2 9.1 visible device states, as tracked by the controller.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DeviceState {
    Default,
    Addressed,
    Configured,
    Suspended,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EndpointTy {
    Ctrl = 0,
    Isoch = 1,
    Bulk = 2,
    Interrupt = 3,
}

/// Endpoint primitives a device controller exposes to function drivers.
///
/// Every call is made from the controller's own event dispatch, so implementations never see
/// concurrent use.
pub trait UDCAdapter {
    fn device_state(&self) -> DeviceState;

    fn open_ep(&mut self, address: u8, ty: EndpointTy, max_packet_size: u16) -> Result<()>;
    fn close_ep(&mut self, address: u8) -> Result<()>;

    /// Queue `buf` on an IN endpoint. An empty slice sends a zero-length packet.
    fn transmit(&mut self, address: u8, buf: &[u8]) -> Result<()>;
    /// Arm an OUT endpoint to accept up to `len` bytes.
    fn prepare_receive(&mut self, address: u8, len: usize) -> Result<()>;
    /// Copy the last completed OUT transfer into `buf` and return the number of bytes the
    /// controller received.
    fn read_ep(&mut self, address: u8, buf: &mut [u8]) -> Result<usize>;

    /// Send the data stage of the current control transfer.
    fn ctl_send_data(&mut self, buf: &[u8]) -> Result<()>;
    /// Accept a host-to-device control data stage of `len` bytes.
    fn ctl_prepare_rx(&mut self, len: usize) -> Result<()>;
    /// Stall endpoint 0 for the current control transfer.
    fn ctl_error(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_address_fields() {
        assert!(endp_is_in(0x81));
        assert!(!endp_is_in(0x01));
        assert_eq!(endp_num(0x83), 3);
        assert_eq!(endp_num(0x0F), 15);
    }
}
