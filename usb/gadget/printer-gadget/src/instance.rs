use driver_udc::UsbSpeed;

use crate::descriptor::{max_packet_size, DATA_HS_MAX_PACKET_SIZE};
use crate::error::{PrinterError, Result};

/// Size of the control data buffer. Class data stages are clamped to it.
pub const PRINTER_DATA_BUFFER_SIZE: usize = DATA_HS_MAX_PACKET_SIZE as usize;

/// State of the bulk IN endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TxState {
    Idle,
    /// A transfer of `total_length` bytes is queued. Zero while the terminating ZLP is in flight.
    Sending { total_length: usize },
}

/// Runtime state of an active printer function. Exists from activation to deactivation.
#[derive(Debug)]
pub struct ClassInstance {
    pub(crate) data: [u8; PRINTER_DATA_BUFFER_SIZE],
    pub(crate) rx_length: usize,
    pub(crate) tx_state: TxState,
    pub(crate) alt_setting: u8,
    pub(crate) speed: UsbSpeed,
    pub(crate) max_packet_size: u16,
    /// Class request code waiting for its host-to-device data stage.
    pub(crate) pending_request: Option<u8>,
}

impl ClassInstance {
    fn new(speed: UsbSpeed) -> Self {
        Self {
            data: [0; PRINTER_DATA_BUFFER_SIZE],
            rx_length: 0,
            tx_state: TxState::Idle,
            alt_setting: 0,
            speed,
            max_packet_size: max_packet_size(speed),
            pending_request: None,
        }
    }

    pub fn speed(&self) -> UsbSpeed {
        self.speed
    }

    pub fn max_packet_size(&self) -> u16 {
        self.max_packet_size
    }

    pub fn rx_length(&self) -> usize {
        self.rx_length
    }

    pub fn tx_state(&self) -> TxState {
        self.tx_state
    }

    pub fn alt_setting(&self) -> u8 {
        self.alt_setting
    }
}

/// Storage for the single printer instance of a device.
#[derive(Debug, Default)]
pub struct InstanceSlot {
    inner: Option<ClassInstance>,
}

impl InstanceSlot {
    pub fn bind(&mut self, speed: UsbSpeed) -> Result<&mut ClassInstance> {
        if self.inner.is_some() {
            return Err(PrinterError::ResourceUnavailable);
        }
        Ok(self.inner.insert(ClassInstance::new(speed)))
    }

    pub fn release(&mut self) -> Option<ClassInstance> {
        self.inner.take()
    }

    pub fn get(&self) -> Option<&ClassInstance> {
        self.inner.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut ClassInstance> {
        self.inner.as_mut()
    }

    pub fn is_bound(&self) -> bool {
        self.inner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_once() {
        let mut slot = InstanceSlot::default();
        let instance = slot.bind(UsbSpeed::High).unwrap();
        assert_eq!(instance.max_packet_size(), 512);
        assert_eq!(instance.tx_state(), TxState::Idle);
        assert!(matches!(
            slot.bind(UsbSpeed::Full),
            Err(PrinterError::ResourceUnavailable)
        ));

        assert!(slot.release().is_some());
        assert!(!slot.is_bound());
        assert!(slot.release().is_none());
        assert_eq!(slot.bind(UsbSpeed::Full).unwrap().max_packet_size(), 64);
    }
}
