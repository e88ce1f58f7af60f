//! Interface between a USB device controller and the function drivers (gadgets) bound to it.
//!
//! The controller driver decodes bus events and forwards the ones that concern a function to its
//! [USBGadget] implementation. Each call runs to completion on the controller's event thread
//! before the next event is delivered, so gadgets keep plain `&mut self` state and never block.

pub mod setup;

pub use driver_udc::{DeviceState, EndpointTy, UDCAdapter, UsbSpeed};
pub use setup::{ReqDirection, ReqRecipient, ReqType, Setup, StandardReq};

pub trait USBGadget<U: UDCAdapter> {
    type Error;

    /// The host selected a configuration containing this function.
    fn activate(&mut self, udc: &mut U, speed: UsbSpeed) -> Result<(), Self::Error>;
    /// The configuration was cleared, or the bus was reset or disconnected.
    fn deactivate(&mut self, udc: &mut U) -> Result<(), Self::Error>;

    /// A SETUP packet addressed to this function's interface.
    fn setup(&mut self, udc: &mut U, setup: &Setup) -> Result<(), Self::Error>;
    /// The host-to-device data stage of the last control request completed.
    fn ep0_rx_ready(&mut self, udc: &mut U, data: &[u8]) -> Result<(), Self::Error> {
        let _ = (udc, data);
        Ok(())
    }

    /// A transfer queued on IN endpoint `ep` completed.
    fn data_in(&mut self, udc: &mut U, ep: u8) -> Result<(), Self::Error>;
    /// A transfer armed on OUT endpoint `ep` completed.
    fn data_out(&mut self, udc: &mut U, ep: u8) -> Result<(), Self::Error>;

    fn config_descriptor(&self, speed: UsbSpeed) -> &[u8];
    fn device_qualifier_descriptor(&self) -> &[u8];
}
