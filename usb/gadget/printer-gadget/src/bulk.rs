//! Bulk data path: IN completion with ZLP termination, OUT hand-off and re-arm.

use driver_gadget::UDCAdapter;
use log::trace;

use crate::descriptor::max_packet_size;
use crate::error::{PrinterError, Result};
use crate::gadget::PrinterGadget;
use crate::instance::TxState;

impl<'a> PrinterGadget<'a> {
    /// Queue `data` on the bulk IN endpoint. Refused while a previous transfer is in flight.
    pub fn transmit_packet<U: UDCAdapter>(&mut self, udc: &mut U, data: &[u8]) -> Result<()> {
        let in_endpoint = self.descriptors.interface_config().in_endpoint;
        let instance = self.instance.get_mut().ok_or(PrinterError::NotActive)?;
        if instance.tx_state != TxState::Idle {
            return Err(PrinterError::Busy);
        }

        instance.tx_state = TxState::Sending {
            total_length: data.len(),
        };
        if let Err(err) = udc.transmit(in_endpoint, data) {
            instance.tx_state = TxState::Idle;
            return Err(err.into());
        }
        Ok(())
    }

    /// Arm the bulk OUT endpoint for one packet of the negotiated size.
    ///
    /// Must not be called while a receive is still armed.
    pub fn receive_packet<U: UDCAdapter>(&mut self, udc: &mut U) -> Result<()> {
        let out_endpoint = self.descriptors.interface_config().out_endpoint;
        let instance = self.instance.get().ok_or(PrinterError::NotActive)?;
        udc.prepare_receive(out_endpoint, usize::from(max_packet_size(instance.speed)))?;
        Ok(())
    }

    pub fn is_tx_idle(&self) -> bool {
        self.instance
            .get()
            .map_or(true, |instance| instance.tx_state == TxState::Idle)
    }

    pub fn rx_length(&self) -> usize {
        self.instance.get().map_or(0, |instance| instance.rx_length)
    }

    pub(crate) fn handle_data_in<U: UDCAdapter>(&mut self, udc: &mut U, ep: u8) -> Result<()> {
        let instance = self.instance.get_mut().ok_or(PrinterError::NotActive)?;
        let mps = usize::from(instance.max_packet_size);

        match instance.tx_state {
            TxState::Sending { total_length } if total_length > 0 && total_length % mps == 0 => {
                // The last packet was full, so the host cannot tell the transfer ended.
                trace!("printer: {} bytes sent on {:#04x}, terminating with ZLP", total_length, ep);
                instance.tx_state = TxState::Sending { total_length: 0 };
                udc.transmit(ep, &[])?;
            }
            _ => instance.tx_state = TxState::Idle,
        }
        Ok(())
    }

    pub(crate) fn handle_data_out<U: UDCAdapter>(&mut self, udc: &mut U, ep: u8) -> Result<()> {
        let instance = self.instance.get_mut().ok_or(PrinterError::NotActive)?;
        let interface = self
            .interface
            .as_deref_mut()
            .ok_or(PrinterError::NoInterfaceBound)?;
        let buf = self
            .rx_buffer
            .as_deref_mut()
            .ok_or(PrinterError::NoReceiveBuffer)?;

        instance.rx_length = udc.read_ep(ep, buf)?;
        trace!("printer: received {} bytes on {:#04x}", instance.rx_length, ep);

        // The endpoint keeps NAKing until the application re-arms it.
        interface.receive(buf, &mut instance.rx_length);
        Ok(())
    }
}
