use driver_gadget::{EndpointTy, Setup, UDCAdapter, USBGadget, UsbSpeed};
use log::{debug, warn};

use crate::config::PrinterConfig;
use crate::descriptor::{max_packet_size, InterfaceConfig, PrinterDescriptors};
use crate::error::{PrinterError, Result};
use crate::instance::{ClassInstance, InstanceSlot};
use crate::interface::PrinterInterface;

/// A printer function bound to one device.
///
/// The application lends its callbacks and its receive buffer for `'a`; neither is copied.
pub struct PrinterGadget<'a> {
    pub(crate) descriptors: PrinterDescriptors,
    pub(crate) interface: Option<&'a mut dyn PrinterInterface>,
    pub(crate) rx_buffer: Option<&'a mut [u8]>,
    pub(crate) instance: InstanceSlot,
}

impl<'a> PrinterGadget<'a> {
    pub fn new(descriptors: PrinterDescriptors) -> Self {
        Self {
            descriptors,
            interface: None,
            rx_buffer: None,
            instance: InstanceSlot::default(),
        }
    }

    pub fn from_config(config: &PrinterConfig) -> Self {
        let mut descriptors = PrinterDescriptors::new(config.attributes(), config.max_power());
        descriptors.patch(
            config.interface_number,
            config.in_endpoint,
            config.out_endpoint,
            config.string_index,
        );
        Self::new(descriptors)
    }

    pub fn register_interface(&mut self, interface: &'a mut dyn PrinterInterface) {
        self.interface = Some(interface);
    }

    pub fn set_rx_buffer(&mut self, buf: &'a mut [u8]) {
        self.rx_buffer = Some(buf);
    }

    /// Move the interface number, endpoint addresses and string index. Takes effect on the
    /// next activation.
    pub fn patch_descriptor(&mut self, interface_number: u8, in_ep: u8, out_ep: u8, str_idx: u8) {
        if self.instance.is_bound() {
            warn!("printer: patching descriptors of an active function");
        }
        self.descriptors.patch(interface_number, in_ep, out_ep, str_idx);
    }

    pub fn descriptors(&self) -> &PrinterDescriptors {
        &self.descriptors
    }

    pub fn interface_config(&self) -> InterfaceConfig {
        self.descriptors.interface_config()
    }

    pub fn instance(&self) -> Option<&ClassInstance> {
        self.instance.get()
    }

    pub fn is_active(&self) -> bool {
        self.instance.is_bound()
    }

    fn close_endpoints<U: UDCAdapter>(udc: &mut U, addresses: &[u8]) {
        for &address in addresses {
            if let Err(err) = udc.close_ep(address) {
                warn!("printer: failed to close endpoint {:#04x}: {}", address, err);
            }
        }
    }

    fn init_class<U: UDCAdapter>(&mut self, udc: &mut U, speed: UsbSpeed) -> Result<()> {
        let interface = self
            .interface
            .as_deref_mut()
            .ok_or(PrinterError::NoInterfaceBound)?;
        self.instance.bind(speed)?;

        let config = self.descriptors.interface_config();
        let mps = max_packet_size(speed);
        debug!(
            "printer: activating at {} speed, interface {}, IN {:#04x}, OUT {:#04x}, mps {}",
            speed.as_str(),
            config.interface_number,
            config.in_endpoint,
            config.out_endpoint,
            mps
        );

        if let Err(err) = udc.open_ep(config.in_endpoint, EndpointTy::Bulk, mps) {
            self.instance.release();
            return Err(err.into());
        }
        if let Err(err) = udc.open_ep(config.out_endpoint, EndpointTy::Bulk, mps) {
            Self::close_endpoints(udc, &[config.in_endpoint]);
            self.instance.release();
            return Err(err.into());
        }

        interface.init();

        match &self.rx_buffer {
            Some(buf) if buf.len() < usize::from(mps) => warn!(
                "printer: receive buffer of {} bytes is smaller than the {} byte packet size",
                buf.len(),
                mps
            ),
            Some(_) => (),
            None => warn!("printer: activated without a receive buffer"),
        }

        if let Err(err) = udc.prepare_receive(config.out_endpoint, usize::from(mps)) {
            Self::close_endpoints(udc, &[config.in_endpoint, config.out_endpoint]);
            self.instance.release();
            interface.deinit();
            return Err(err.into());
        }
        Ok(())
    }

    fn deinit_class<U: UDCAdapter>(&mut self, udc: &mut U) -> Result<()> {
        let config = self.descriptors.interface_config();

        // Both endpoints are closed even if the first close fails.
        let closed_in = udc.close_ep(config.in_endpoint);
        let closed_out = udc.close_ep(config.out_endpoint);

        if self.instance.release().is_some() {
            debug!("printer: deactivated");
            match self.interface.as_deref_mut() {
                Some(interface) => interface.deinit(),
                None => return Err(PrinterError::NoInterfaceBound),
            }
        }

        closed_in?;
        closed_out?;
        Ok(())
    }
}

impl<'a> Default for PrinterGadget<'a> {
    fn default() -> Self {
        Self::new(PrinterDescriptors::default())
    }
}

impl<'a, U: UDCAdapter> USBGadget<U> for PrinterGadget<'a> {
    type Error = PrinterError;

    fn activate(&mut self, udc: &mut U, speed: UsbSpeed) -> Result<()> {
        self.init_class(udc, speed)
    }

    fn deactivate(&mut self, udc: &mut U) -> Result<()> {
        self.deinit_class(udc)
    }

    fn setup(&mut self, udc: &mut U, setup: &Setup) -> Result<()> {
        self.handle_setup(udc, setup)
    }

    fn ep0_rx_ready(&mut self, udc: &mut U, data: &[u8]) -> Result<()> {
        self.handle_ep0_rx_ready(udc, data)
    }

    fn data_in(&mut self, udc: &mut U, ep: u8) -> Result<()> {
        self.handle_data_in(udc, ep)
    }

    fn data_out(&mut self, udc: &mut U, ep: u8) -> Result<()> {
        self.handle_data_out(udc, ep)
    }

    fn config_descriptor(&self, speed: UsbSpeed) -> &[u8] {
        self.descriptors.get_descriptor(speed)
    }

    fn device_qualifier_descriptor(&self) -> &[u8] {
        self.descriptors.device_qualifier()
    }
}
